//! Remote atmospheric data sources
//!
//! A source either returns a complete, in-range sample tagged
//! [`Provenance::Real`](crate::models::Provenance::Real) or an error. It never
//! returns a partially filled sample; the caller decides what to do on error.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{EnvironmentalSample, Location};

pub mod power;

pub use power::PowerClient;

#[async_trait]
pub trait AtmosphericSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Fetch one complete sample for the location
    async fn fetch(&self, location: &Location) -> Result<EnvironmentalSample>;
}
