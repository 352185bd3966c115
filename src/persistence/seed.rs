//! Starter driver roster for stores that begin empty.

use crate::domain::{Driver, Position, VehicleType};

type RosterEntry = (
    &'static str,
    &'static str,
    VehicleType,
    &'static str,
    &'static str,
    &'static str,
    f64,
    u32,
    &'static str,
    (f64, f64),
);

const ROSTER: [RosterEntry; 5] = [
    ("1", "João Silva", VehicleType::Moto, "Honda CG 160", "ABC-1234", "12345678900", 4.8, 1240, "(35) 99901-0001", (45.0, 55.0)),
    ("2", "Maria Oliveira", VehicleType::Carro, "Fiat Mobi", "XYZ-9876", "98765432100", 4.9, 850, "(35) 99901-0002", (60.0, 40.0)),
    ("3", "Carlos Santos", VehicleType::Moto, "Yamaha Fazer", "DEF-5678", "11223344556", 4.7, 2100, "(35) 99901-0003", (30.0, 70.0)),
    ("4", "Ana Pereira", VehicleType::Van, "Renault Master", "GHI-4321", "66778899001", 5.0, 320, "(35) 99901-0004", (75.0, 25.0)),
    ("5", "Pedro Costa", VehicleType::Carro, "Chevrolet Onix", "JKL-8765", "55443322110", 4.6, 940, "(35) 99901-0005", (20.0, 35.0)),
];

/// The five founding drivers of the town roster.
#[must_use]
pub fn initial_drivers() -> Vec<Driver> {
    ROSTER
        .iter()
        .map(
            |&(id, name, vehicle_type, model, plate, cnh, rating, trips, phone, (x, y))| Driver {
                id: id.into(),
                name: name.to_string(),
                vehicle_type,
                vehicle_model: model.to_string(),
                license_plate: plate.to_string(),
                cnh: cnh.to_string(),
                rating,
                available: true,
                trips,
                phone: phone.to_string(),
                coords: Position::new(x, y),
            },
        )
        .collect()
}
