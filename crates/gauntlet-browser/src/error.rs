use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown webdriver: {0}")]
    UnknownDriver(String),

    #[error("No remote capability mapping for driver: {0}")]
    RemoteUnsupported(String),

    #[error("Invalid remote webdriver url {url}: {source}")]
    InvalidRemoteUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("WebDriver session error: {0}")]
    Session(String),

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error("Page error: {0}")]
    Page(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<fantoccini::error::NewSessionError> for Error {
    fn from(err: fantoccini::error::NewSessionError) -> Self {
        Error::Session(err.to_string())
    }
}

impl From<fantoccini::error::CmdError> for Error {
    fn from(err: fantoccini::error::CmdError) -> Self {
        Error::Session(err.to_string())
    }
}

impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
