//! Environmental sample model and its documented field ranges

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Location;
use crate::AeroSenseError;

pub const TEMPERATURE_C: RangeInclusive<f64> = 15.0..=35.0;
pub const HUMIDITY_PCT: RangeInclusive<f64> = 20.0..=80.0;
pub const POLLEN_INDEX: RangeInclusive<f64> = 0.0..=100.0;
pub const PM25_UGM3: RangeInclusive<f64> = 0.0..=150.0;
pub const UV_INDEX: RangeInclusive<u8> = 0..=10;
pub const WIND_SPEED_KMH: RangeInclusive<f64> = 0.0..=30.0;
pub const AIR_PRESSURE_HPA: RangeInclusive<f64> = 1000.0..=1050.0;
pub const CO2_PPM: RangeInclusive<f64> = 350.0..=600.0;
pub const NO2_PPB: RangeInclusive<f64> = 0.0..=100.0;
pub const OZONE_PPB: RangeInclusive<f64> = 0.0..=120.0;

/// Which path produced a sample
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Taken from the remote atmospheric data source
    Real,
    /// Drawn by the local generator
    Simulated,
}

impl Provenance {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Real => "real",
            Provenance::Simulated => "simulated",
        }
    }
}

/// Raw field values before range validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Readings {
    pub temperature: f64,
    pub humidity: f64,
    pub pollen_index: f64,
    pub pm25: f64,
    pub uv_index: u8,
    pub wind_speed: f64,
    pub air_pressure: f64,
    pub co2: Option<f64>,
    pub no2: Option<f64>,
    pub ozone: Option<f64>,
}

/// One bundle of environmental readings.
///
/// Fields are private: a sample can only be built through [`EnvironmentalSample::new`],
/// which rejects any value outside its documented range, and is never mutated afterwards.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct EnvironmentalSample {
    temperature: f64,
    humidity: f64,
    pollen_index: f64,
    pm25: f64,
    uv_index: u8,
    wind_speed: f64,
    air_pressure: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    co2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    no2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ozone: Option<f64>,
    provenance: Provenance,
    location: Location,
    taken_at: DateTime<Utc>,
}

fn check(name: &str, value: f64, range: &RangeInclusive<f64>) -> Result<(), AeroSenseError> {
    if value.is_finite() && range.contains(&value) {
        Ok(())
    } else {
        Err(AeroSenseError::validation(format!(
            "{name} {value} outside {}..={}",
            range.start(),
            range.end()
        )))
    }
}

fn check_optional(
    name: &str,
    value: Option<f64>,
    range: &RangeInclusive<f64>,
) -> Result<(), AeroSenseError> {
    value.map_or(Ok(()), |v| check(name, v, range))
}

impl EnvironmentalSample {
    /// Build a sample, validating every field against its range
    pub fn new(
        readings: Readings,
        provenance: Provenance,
        location: Location,
    ) -> Result<Self, AeroSenseError> {
        check("temperature", readings.temperature, &TEMPERATURE_C)?;
        check("humidity", readings.humidity, &HUMIDITY_PCT)?;
        check("pollen_index", readings.pollen_index, &POLLEN_INDEX)?;
        check("pm25", readings.pm25, &PM25_UGM3)?;
        check("wind_speed", readings.wind_speed, &WIND_SPEED_KMH)?;
        check("air_pressure", readings.air_pressure, &AIR_PRESSURE_HPA)?;
        check_optional("co2", readings.co2, &CO2_PPM)?;
        check_optional("no2", readings.no2, &NO2_PPB)?;
        check_optional("ozone", readings.ozone, &OZONE_PPB)?;
        if !UV_INDEX.contains(&readings.uv_index) {
            return Err(AeroSenseError::validation(format!(
                "uv_index {} outside 0..=10",
                readings.uv_index
            )));
        }

        Ok(Self {
            temperature: readings.temperature,
            humidity: readings.humidity,
            pollen_index: readings.pollen_index,
            pm25: readings.pm25,
            uv_index: readings.uv_index,
            wind_speed: readings.wind_speed,
            air_pressure: readings.air_pressure,
            co2: readings.co2,
            no2: readings.no2,
            ozone: readings.ozone,
            provenance,
            location,
            taken_at: Utc::now(),
        })
    }

    /// Build a sample from readings already drawn inside their ranges
    pub(crate) fn from_generated(readings: Readings, location: Location) -> Self {
        debug_assert!(
            Self::new(readings.clone(), Provenance::Simulated, location.clone()).is_ok(),
            "generator produced out-of-range readings: {readings:?}"
        );
        Self {
            temperature: readings.temperature,
            humidity: readings.humidity,
            pollen_index: readings.pollen_index,
            pm25: readings.pm25,
            uv_index: readings.uv_index,
            wind_speed: readings.wind_speed,
            air_pressure: readings.air_pressure,
            co2: readings.co2,
            no2: readings.no2,
            ozone: readings.ozone,
            provenance: Provenance::Simulated,
            location,
            taken_at: Utc::now(),
        }
    }

    /// Temperature in °C
    #[must_use]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Relative humidity in %
    #[must_use]
    pub fn humidity(&self) -> f64 {
        self.humidity
    }

    #[must_use]
    pub fn pollen_index(&self) -> f64 {
        self.pollen_index
    }

    /// Fine particulate matter in µg/m³
    #[must_use]
    pub fn pm25(&self) -> f64 {
        self.pm25
    }

    #[must_use]
    pub fn uv_index(&self) -> u8 {
        self.uv_index
    }

    /// Wind speed in km/h
    #[must_use]
    pub fn wind_speed(&self) -> f64 {
        self.wind_speed
    }

    /// Air pressure in hPa
    #[must_use]
    pub fn air_pressure(&self) -> f64 {
        self.air_pressure
    }

    #[must_use]
    pub fn co2(&self) -> Option<f64> {
        self.co2
    }

    #[must_use]
    pub fn no2(&self) -> Option<f64> {
        self.no2
    }

    #[must_use]
    pub fn ozone(&self) -> Option<f64> {
        self.ozone
    }

    #[must_use]
    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    #[must_use]
    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    #[must_use]
    pub fn is_simulated(&self) -> bool {
        self.provenance == Provenance::Simulated
    }
}

#[cfg(test)]
pub(crate) fn readings(pollen_index: f64, pm25: f64) -> Readings {
    Readings {
        temperature: 25.0,
        humidity: 40.0,
        pollen_index,
        pm25,
        uv_index: 5,
        wind_speed: 10.0,
        air_pressure: 1013.0,
        ..Readings::default()
    }
}
