use std::{error, fmt, io};

#[derive(Debug)]
pub enum Error {
    /// Startup configuration is unusable.
    Configuration(String),
    /// Input was rejected but processing may continue.
    Validation(String),
    /// Delivery to a subscriber failed.
    Transport(String),
    /// A tick produced an inconsistent record.
    Generation(String),
    /// Underlying I/O error.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(e) => write!(f, "Configuration error: {}", e),
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::Transport(e) => write!(f, "Transport error: {}", e),
            Error::Generation(e) => write!(f, "Generation fault: {}", e),
            Error::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
