use thiserror::Error;

// Errors raised while building a report line; always suppressed by the logging wrappers
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Malformed calculated room type: {0:?}")]
    MalformedRoomType(String),

    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Sink closed: {0}")]
    Closed(String),

    #[error("Write error: {0}")]
    Write(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
