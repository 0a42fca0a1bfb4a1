use crate::errors::{FileOperation, IoError};
use std::{
    fmt, fs,
    io::{self, Read},
    path::PathBuf,
};

/// Command line spelling of the standard streams.
pub const STDIO: &str = "-";

/// Where the template source is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}
impl From<&str> for Input {
    fn from(value: &str) -> Self {
        if value == STDIO {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(value))
        }
    }
}
impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => write!(f, "<stdin>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}
impl Input {
    /// Opens the input. The handle is closed when the returned reader is dropped.
    pub fn open(&self) -> Result<Box<dyn Read>, IoError> {
        match self {
            Self::Stdin => Ok(Box::new(io::stdin())),
            Self::File(path) => {
                let file = fs::File::open(path)
                    .map_err(|error| IoError::new(FileOperation::Open, path.clone(), error))?;

                Ok(Box::new(file))
            }
        }
    }
}

/// Where rendered output is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}
impl From<&str> for Destination {
    fn from(value: &str) -> Self {
        if value == STDIO {
            Self::Stdout
        } else {
            Self::File(PathBuf::from(value))
        }
    }
}
impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => write!(f, "<stdout>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}
