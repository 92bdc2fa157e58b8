use std::path::PathBuf;

use trestle_base::{Error, LengthUnit, Result};
use trestle_io::UpAxis;

use crate::measure::DistanceFormat;
use crate::viewer::ProjectionKind;

/// Startup options for the viewer, after command-line parsing.
#[derive(Clone, Debug, Default)]
pub struct ViewerConfig {
    pub model: Option<PathBuf>,
    pub texture: Option<PathBuf>,
    pub up_axis: UpAxis,
    pub projection: ProjectionKind,
    pub distance_format: DistanceFormat,
}

impl ViewerConfig {
    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.distance_format = DistanceFormat::new(decimals, LengthUnit::Meter);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.texture.is_some() && self.model.is_none() {
            return Err(Error::InvalidParameter(
                "a texture needs a model to be applied to".to_string(),
            ));
        }
        for path in self.model.iter().chain(self.texture.iter()) {
            if !path.is_file() {
                return Err(Error::InvalidParameter(format!(
                    "file not found: {}",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}
