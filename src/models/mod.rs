pub mod config;
pub mod mapping;
pub mod results;

pub use config::{CustomPattern, MaskingConfiguration, SavedConfigEntry, SavedConfigSummary};
pub use mapping::MappingArtifact;
pub use results::{
    MaskOperationResult, MaskOutcome, OperationResult, PatternTestResult, UnmaskOperationResult,
};
