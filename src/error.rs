use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Menu is already running")]
    AlreadyRunning,
    #[error("Menu was never started")]
    NotStarted,
    #[error("Command `{command}` could not be run: {source}")]
    Command {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("Menu loop panicked")]
    LoopPanicked,
    #[error("Menu state lock was poisoned")]
    Poisoned,
}

impl<T> From<std::sync::PoisonError<T>> for MenuError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        MenuError::Poisoned
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] json5::Error),
    #[error("Unknown file extension of {0:?}")]
    UnknownExtension(std::path::PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_are_not_blamed_on_the_terminal() {
        let err = MenuError::from(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
        assert_eq!(err.to_string(), "IO error: stdin closed");
    }
}
