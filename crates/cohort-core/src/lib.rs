pub mod config;
pub mod types;

pub use config::CohortConfig;
pub use types::*;
