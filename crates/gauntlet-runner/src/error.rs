use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No driver defined to run tests")]
    NoDriversConfigured,

    #[error("No tests remain after filtering")]
    NoTestsRemain,

    #[error(transparent)]
    Driver(#[from] gauntlet_browser::Error),
}

/// Raised when a test marked as not yet implemented passes: the
/// functionality works and the marker should be removed.
#[derive(Error, Debug)]
#[error("Test is marked as not yet implemented but is already working")]
pub struct WorksAlreadyError;

pub type Result<T> = std::result::Result<T, Error>;
