use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Mirrors the `sensor_state` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "sensor_state", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SensorState {
    Up,
    Down,
    Disconnected,
    Unknown,
}

impl fmt::Display for SensorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SensorState::Up => "UP",
            SensorState::Down => "DOWN",
            SensorState::Disconnected => "DISCONNECTED",
            SensorState::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Mirrors the `sensor_type` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "sensor_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SensorType {
    Temperature,
    Humidity,
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SensorType::Temperature => "TEMPERATURE",
            SensorType::Humidity => "HUMIDITY",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Blank(&'static str),
    #[error("id [{id}] does not match serial [{serial}]")]
    IdSerialMismatch { id: String, serial: String },
    #[error("geolocation [{0}] must be 'latitude,longitude'")]
    Geolocation(String),
}

/// Metadata describing one physical sensor device.
///
/// Serialized as a document keyed by `_id`; the `id` always equals the
/// device `serial`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct SensorRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub serial: String,
    /// `"latitude,longitude"` in decimal degrees.
    pub geolocation: String,
    pub location: String,
    pub address: String,
    pub state: SensorState,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub sensor_type: SensorType,
    pub description: String,
}

impl SensorRecord {
    /// Builds a record with everything but the identity left empty.
    pub fn new(serial: &str, name: &str, state: SensorState, sensor_type: SensorType) -> Self {
        Self {
            id: serial.to_owned(),
            serial: serial.to_owned(),
            geolocation: String::new(),
            location: String::new(),
            address: String::new(),
            state,
            name: name.to_owned(),
            sensor_type,
            description: String::new(),
        }
    }

    pub fn with_geolocation(mut self, geolocation: &str) -> Self {
        self.geolocation = geolocation.to_owned();
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = location.to_owned();
        self
    }

    pub fn with_address(mut self, address: &str) -> Self {
        self.address = address.to_owned();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.serial.trim().is_empty() {
            return Err(ValidationError::Blank("serial"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::Blank("name"));
        }
        if self.id != self.serial {
            return Err(ValidationError::IdSerialMismatch {
                id: self.id.clone(),
                serial: self.serial.clone(),
            });
        }
        if !self.geolocation.is_empty() {
            self.geolocation.parse::<GeoPoint>()?;
        }
        Ok(())
    }
}

/// A parsed `"latitude,longitude"` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl FromStr for GeoPoint {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::Geolocation(s.to_owned());
        let (lat, long) = s.split_once(',').ok_or_else(invalid)?;
        let latitude: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let longitude: f64 = long.trim().parse().map_err(|_| invalid())?;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(invalid());
        }
        Ok(Self { latitude, longitude })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ds18b20(serial: &str) -> SensorRecord {
        SensorRecord::new(serial, "DS18B20", SensorState::Up, SensorType::Temperature)
            .with_geolocation("51.5033630,-0.1276250")
    }

    #[test]
    fn new_derives_id_from_serial() {
        let r = ds18b20("000006c01f0b");
        assert_eq!(r.id, "000006c01f0b");
        assert_eq!(r.id, r.serial);
        assert!(r.validate().is_ok());
    }

    #[test]
    fn validate_rejects_id_serial_mismatch() {
        let mut r = ds18b20("abc");
        r.id = "xyz".to_owned();
        assert!(matches!(
            r.validate(),
            Err(ValidationError::IdSerialMismatch { .. })
        ));
    }

    #[test]
    fn validate_rejects_blank_serial_and_name() {
        assert_eq!(ds18b20("  ").validate(), Err(ValidationError::Blank("serial")));

        let mut r = ds18b20("abc");
        r.name = String::new();
        assert_eq!(r.validate(), Err(ValidationError::Blank("name")));
    }

    #[test]
    fn validate_rejects_bad_geolocation() {
        let r = ds18b20("abc").with_geolocation("north pole");
        assert!(matches!(r.validate(), Err(ValidationError::Geolocation(_))));

        let r = ds18b20("abc").with_geolocation("91.0,10.0");
        assert!(matches!(r.validate(), Err(ValidationError::Geolocation(_))));
    }

    #[test]
    fn empty_geolocation_is_allowed() {
        let r = SensorRecord::new("abc", "DS18B20", SensorState::Down, SensorType::Humidity);
        assert!(r.validate().is_ok());
    }

    #[test]
    fn geo_point_parses_with_whitespace() {
        let p: GeoPoint = " 51.5033630 , -0.1276250 ".parse().unwrap();
        assert_eq!(p.latitude, 51.503363);
        assert_eq!(p.longitude, -0.127625);
    }

    #[test]
    fn serializes_as_sensor_document() {
        let doc = serde_json::to_value(ds18b20("testing")).unwrap();
        assert_eq!(doc["_id"], "testing");
        assert_eq!(doc["serial"], "testing");
        assert_eq!(doc["state"], "UP");
        assert_eq!(doc["type"], "TEMPERATURE");
        assert!(doc.get("id").is_none());
        assert!(doc.get("sensor_type").is_none());
    }

    #[test]
    fn display_matches_serialized_names() {
        assert_eq!(SensorState::Disconnected.to_string(), "DISCONNECTED");
        assert_eq!(SensorType::Humidity.to_string(), "HUMIDITY");
    }
}
