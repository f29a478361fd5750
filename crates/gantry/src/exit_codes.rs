//! Process exit codes, aligned with `GantryError::exit_code`

#![allow(dead_code)]

/// Success
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Invalid input or configuration value
pub const INVALID_INPUT: i32 = 2;

/// Security violation detected
pub const SECURITY_VIOLATION: i32 = 3;

/// Build output verification failed
pub const VERIFICATION_FAILED: i32 = 4;

/// IO error
pub const IO_ERROR: i32 = 5;

/// Serialization error
pub const SERIALIZATION_ERROR: i32 = 6;
