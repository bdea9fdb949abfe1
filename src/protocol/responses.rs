//! Response handling
//!
//! Defines numeric response codes and formatting.

use crate::error::StoreError;

/// Standard response codes
pub const DATA_OPEN: u16 = 150;
pub const OK: u16 = 200;
pub const READY: u16 = 220;
pub const GOODBYE: u16 = 221;
pub const TRANSFER_COMPLETE: u16 = 226;
pub const ACTION_COMPLETED: u16 = 250;
pub const PATH_CREATED: u16 = 257;
pub const TOO_MANY_CONNECTIONS: u16 = 421;
pub const STORAGE_FAULT: u16 = 451;
pub const UNKNOWN_COMMAND: u16 = 500;
pub const SYNTAX_ERROR: u16 = 501;
pub const NOT_FOUND: u16 = 550;
pub const INVALID_REQUEST: u16 = 553;

/// Format a response message
pub fn format_response(code: u16, message: &str) -> String {
    format!("{} {}\r\n", code, message)
}

/// Map a storage error onto its response code class.
///
/// Not-found and invalid-request failures are caller-correctable client
/// errors; everything else is a server-side storage fault.
pub fn store_error_code(error: &StoreError) -> u16 {
    match error {
        StoreError::NotFound(_) => NOT_FOUND,
        StoreError::InvalidRequest(_) => INVALID_REQUEST,
        StoreError::Initialization(_) | StoreError::Storage(_) => STORAGE_FAULT,
    }
}

/// Render a storage error as a complete response line.
pub fn error_response(error: &StoreError) -> String {
    format_response(store_error_code(error), &error.to_string())
}
