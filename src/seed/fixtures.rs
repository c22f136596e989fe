//! Known-good sensor documents for development and testing databases.

use std::{fmt, str::FromStr};

use anyhow::anyhow;

use crate::db::models::{SensorRecord, SensorState, SensorType};

pub const PRIMARY_SERIAL: &str = "000006c01f0b";
pub const TESTING_SERIAL: &str = "testing";
pub const RELOCATED_ADDRESS: &str = "4102 Drew Hill Lane, Chapel Hill, NC - USA";

const GEOLOCATION: &str = "51.5033630,-0.1276250";
const LOCATION: &str = "Living Room";
const ADDRESS: &str = "2800 BRAZOS BLVD, EULESS, TX - USA";
const MODEL: &str = "DS18B20";
const DESCRIPTION: &str = "Dallas Semiconductor digital temperature sensor";

/// Named groups of fixtures that can be seeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeedSet {
    /// Fresh collection holding the two living-room sensors.
    #[default]
    Initial,
    /// The primary sensor re-registered at a new address.
    Relocation,
}

impl SeedSet {
    pub fn records(self) -> Vec<SensorRecord> {
        match self {
            SeedSet::Initial => initial(),
            SeedSet::Relocation => relocation(),
        }
    }

    /// Whether this set starts from an empty collection.
    pub fn resets_collection(self) -> bool {
        matches!(self, SeedSet::Initial)
    }
}

impl FromStr for SeedSet {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "initial" => Ok(Self::Initial),
            "relocation" => Ok(Self::Relocation),
            other => Err(anyhow!("unknown seed set: {other:?}")),
        }
    }
}

impl fmt::Display for SeedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedSet::Initial => f.write_str("initial"),
            SeedSet::Relocation => f.write_str("relocation"),
        }
    }
}

fn living_room_ds18b20(serial: &str) -> SensorRecord {
    SensorRecord::new(serial, MODEL, SensorState::Up, SensorType::Temperature)
        .with_geolocation(GEOLOCATION)
        .with_location(LOCATION)
        .with_address(ADDRESS)
        .with_description(DESCRIPTION)
}

pub fn initial() -> Vec<SensorRecord> {
    vec![
        living_room_ds18b20(PRIMARY_SERIAL),
        living_room_ds18b20(TESTING_SERIAL),
    ]
}

pub fn relocation() -> Vec<SensorRecord> {
    vec![living_room_ds18b20(PRIMARY_SERIAL).with_address(RELOCATED_ADDRESS)]
}
