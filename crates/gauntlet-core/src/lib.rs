pub mod config;
pub mod error;
pub mod profile;

pub use config::TestConfig;
pub use error::{Error, Result};
pub use profile::DriverProfile;
