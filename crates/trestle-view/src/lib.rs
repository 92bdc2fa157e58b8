pub mod config;
pub mod measure;
pub mod viewer;

pub use config::ViewerConfig;
pub use measure::{MeasureController, MeasureState, RecordOutcome};
