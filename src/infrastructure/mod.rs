pub mod error;
pub mod logging;
pub mod network;

pub use error::{CloudMaskError, ErrorCategory, Result};
pub use logging::{setup_logging, LogOutput, LoggingConfig, OperationTracker};
pub use network::{build_client, NetworkConfig};
