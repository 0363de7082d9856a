use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Setup-time failures. Nothing in the fixed tick returns one of these.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: Option<PathBuf>,
        source: serde_json::Error,
    },
    Validation(String),
    MissingCollaborator(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
            Self::Parse { path: Some(path), source } => {
                write!(f, "failed to parse `{}`: {source}", path.display())
            }
            Self::Parse { path: None, source } => {
                write!(f, "failed to parse drift config: {source}")
            }
            Self::Validation(message) => write!(f, "{message}"),
            Self::MissingCollaborator(what) => write!(f, "missing required collaborator: {what}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Validation(_) | Self::MissingCollaborator(_) => None,
        }
    }
}

pub(crate) fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation(message.into())
}
