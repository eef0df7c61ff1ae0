//! Two-stage sample pipeline: remote source first, local generator on failure

use tracing::{debug, warn};

use crate::generator::SampleGenerator;
use crate::models::{EnvironmentalSample, Location};
use crate::remote::AtmosphericSource;

pub struct SamplePipeline {
    remote: Option<Box<dyn AtmosphericSource>>,
    generator: SampleGenerator,
}

impl SamplePipeline {
    #[must_use]
    pub fn new(remote: Option<Box<dyn AtmosphericSource>>, generator: SampleGenerator) -> Self {
        Self { remote, generator }
    }

    /// Simulation only
    #[must_use]
    pub fn offline(generator: SampleGenerator) -> Self {
        Self::new(None, generator)
    }

    #[must_use]
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Always yields a complete sample. The provenance tag tells which stage
    /// produced it; remote errors are logged and go no further.
    pub async fn sample(&self, location: &Location) -> EnvironmentalSample {
        if let Some(remote) = &self.remote {
            match remote.fetch(location).await {
                Ok(sample) => {
                    debug!(source = remote.name(), "Using remote atmospheric data");
                    return sample;
                }
                Err(e) => {
                    warn!(source = remote.name(), "Remote data unavailable, simulating: {e:#}");
                }
            }
        }
        self.generator.generate(location)
    }
}
