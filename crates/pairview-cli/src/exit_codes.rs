//! Exit codes for the pairview CLI.
//! Library errors map onto these through their `exit_code()` methods.

pub const SUCCESS: i32 = 0;
#[allow(dead_code)] // Reached through `exit_code()`
pub const LOAD_FAILED: i32 = 1; // Comparison file not JSON or not an array
pub const INTERNAL_ERROR: i32 = 2; // Bad flags, config, or unreadable files
#[allow(dead_code)] // Reached through `exit_code()`
pub const FETCH_FAILED: i32 = 3; // Network or bucket storage failure
#[allow(dead_code)] // Reached through `exit_code()`
pub const LIFECYCLE_ERROR: i32 = 4; // Worker step run out of order
