//! Local sample generator
//!
//! Every field is an independent uniform draw over its documented range.
//! Temperature and humidity are not correlated here even though they are
//! physically; that is a known simplification of the simulation.

use std::ops::RangeInclusive;

use rand::RngExt;

use crate::models::sample::{
    AIR_PRESSURE_HPA, CO2_PPM, HUMIDITY_PCT, NO2_PPB, OZONE_PPB, PM25_UGM3, POLLEN_INDEX,
    TEMPERATURE_C, UV_INDEX, WIND_SPEED_KMH,
};
use crate::models::{EnvironmentalSample, Location, Readings};

/// Draws simulated samples
#[derive(Debug, Clone, Default)]
pub struct SampleGenerator {
    /// Also draw CO2, NO2 and ozone
    pub include_trace_gases: bool,
}

// One decimal place; bounds of every range have at most one, so rounding stays inside.
fn draw<R: RngExt + ?Sized>(rng: &mut R, range: RangeInclusive<f64>) -> f64 {
    (rng.random_range(range) * 10.0).round() / 10.0
}

impl SampleGenerator {
    #[must_use]
    pub fn new(include_trace_gases: bool) -> Self {
        Self {
            include_trace_gases,
        }
    }

    /// Draw a sample using the thread-local RNG
    #[must_use]
    pub fn generate(&self, location: &Location) -> EnvironmentalSample {
        self.generate_with(&mut rand::rng(), location)
    }

    /// Draw a sample from the given RNG
    pub fn generate_with<R: RngExt + ?Sized>(
        &self,
        rng: &mut R,
        location: &Location,
    ) -> EnvironmentalSample {
        let (co2, no2, ozone) = if self.include_trace_gases {
            (
                Some(draw(rng, CO2_PPM)),
                Some(draw(rng, NO2_PPB)),
                Some(draw(rng, OZONE_PPB)),
            )
        } else {
            (None, None, None)
        };

        let readings = Readings {
            temperature: draw(rng, TEMPERATURE_C),
            humidity: draw(rng, HUMIDITY_PCT),
            pollen_index: draw(rng, POLLEN_INDEX),
            pm25: draw(rng, PM25_UGM3),
            uv_index: rng.random_range(UV_INDEX),
            wind_speed: draw(rng, WIND_SPEED_KMH),
            air_pressure: draw(rng, AIR_PRESSURE_HPA),
            co2,
            no2,
            ozone,
        };
        tracing::debug!(?readings, "Generated simulated readings");

        EnvironmentalSample::from_generated(readings, location.clone())
    }
}
