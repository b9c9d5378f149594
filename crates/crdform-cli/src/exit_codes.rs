//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Validation error - configuration or attribute values rejected
pub const VALIDATION_ERROR: i32 = 2;

/// Kubernetes error - the API server refused or could not be reached
pub const KUBE_ERROR: i32 = 3;

/// Wait timeout - a wait condition or deletion did not complete in time
pub const TIMEOUT_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
