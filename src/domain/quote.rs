//! Ephemeral price quotes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Price and one-line rationale for a prospective ride.
///
/// Never persisted; it lives in the workflow until the order is confirmed
/// or the transaction is reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Quote {
    /// Suggested price in BRL. Never negative.
    #[schema(value_type = f64)]
    pub price: Decimal,
    /// Short explanation of the price.
    pub reasoning: String,
}

impl Quote {
    /// Creates a quote.
    #[must_use]
    pub fn new(price: Decimal, reasoning: impl Into<String>) -> Self {
        Self {
            price,
            reasoning: reasoning.into(),
        }
    }
}
