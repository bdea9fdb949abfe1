//! Error types
//!
//! Defines domain-specific error types for the storage and server layers.

use std::fmt;
use std::io;

/// Storage layer errors.
///
/// `NotFound` and `InvalidRequest` are caller-correctable; `Storage` is a
/// systemic fault that the caller cannot fix by changing the request.
/// `Initialization` can only occur while opening the store.
#[derive(Debug)]
pub enum StoreError {
    Initialization(String),
    NotFound(String),
    InvalidRequest(String),
    Storage(io::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Initialization(msg) => {
                write!(f, "Could not initialize the storage: {}", msg)
            }
            StoreError::NotFound(path) => write!(f, "No such file or directory: {}", path),
            StoreError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            StoreError::Storage(e) => write!(f, "Storage fault: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(error: io::Error) -> Self {
        StoreError::Storage(error)
    }
}

/// Protocol module errors
#[derive(Debug)]
pub enum ProtocolError {
    CommandTooLong(usize),
    PayloadTooLarge(u64),
    MalformedCommand(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::CommandTooLong(len) => write!(f, "Command too long: {} bytes", len),
            ProtocolError::PayloadTooLarge(size) => {
                write!(f, "Upload payload too large: {} bytes", size)
            }
            ProtocolError::MalformedCommand(line) => write!(f, "Malformed command: {}", line),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// General server error that encompasses all error types
#[derive(Debug)]
pub enum ServerError {
    Store(StoreError),
    Protocol(ProtocolError),
    Config(config::ConfigError),
    Io(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Store(e) => write!(f, "Storage error: {}", e),
            ServerError::Protocol(e) => write!(f, "Protocol error: {}", e),
            ServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ServerError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<StoreError> for ServerError {
    fn from(error: StoreError) -> Self {
        ServerError::Store(error)
    }
}

impl From<ProtocolError> for ServerError {
    fn from(error: ProtocolError) -> Self {
        ServerError::Protocol(error)
    }
}

impl From<config::ConfigError> for ServerError {
    fn from(error: config::ConfigError) -> Self {
        ServerError::Config(error)
    }
}

impl From<io::Error> for ServerError {
    fn from(error: io::Error) -> Self {
        ServerError::Io(error)
    }
}
