//! OpenAPI document for the REST API.

use utoipa::OpenApi;

use crate::api::dto::{
    DriverDto, DriverListResponse, LoginRequest, RegisterRequest, RideListResponse, SelectDriverRequest,
    SessionDto, StateResponse, TransactionDto,
};
use crate::api::handlers::{auth, drivers, rides, system, workflow};
use crate::domain::{
    AccountKind, Driver, DriverId, DriverRegistration, PaymentMethod, Phase, Position, Quote,
    Ride, RideId, RideStatus, ServiceType, UserRegistration, VehicleType,
};
use crate::error::{ErrorBody, ErrorResponse};
use crate::service::{DriverDashboard, TripEdit};

/// OpenAPI document served by Swagger UI.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Amparo rides API",
        description = "Ride and delivery requests for a small town: driver directory, quotes, and orders."
    ),
    paths(
        system::health_handler,
        auth::login,
        auth::register,
        auth::logout,
        drivers::list_drivers,
        workflow::get_state,
        workflow::select_driver,
        workflow::edit_trip,
        workflow::request_quote,
        workflow::confirm_order,
        rides::list_rides,
        rides::dashboard,
    ),
    components(schemas(
        system::HealthResponse,
        LoginRequest,
        RegisterRequest,
        SelectDriverRequest,
        TripEdit,
        StateResponse,
        SessionDto,
        TransactionDto,
        DriverDto,
        DriverListResponse,
        RideListResponse,
        DriverDashboard,
        ErrorResponse,
        ErrorBody,
        AccountKind,
        Driver,
        DriverId,
        DriverRegistration,
        PaymentMethod,
        Phase,
        Position,
        Quote,
        Ride,
        RideId,
        RideStatus,
        ServiceType,
        UserRegistration,
        VehicleType,
    )),
    tags(
        (name = "System", description = "Health"),
        (name = "Auth", description = "Login, registration, and logout"),
        (name = "Drivers", description = "Driver directory"),
        (name = "Workflow", description = "Building and placing a request"),
        (name = "Rides", description = "Ride history and driver earnings"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/v1/state",
            "/api/v1/auth/{kind}/login",
            "/api/v1/auth/{kind}/register",
            "/api/v1/auth/logout",
            "/api/v1/drivers",
            "/api/v1/workflow/driver",
            "/api/v1/workflow/trip",
            "/api/v1/workflow/quote",
            "/api/v1/workflow/confirm",
            "/api/v1/rides",
            "/api/v1/dashboard",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
