/// Exit codes of the pagekeep CLI, following the BSD `sysexits` convention
/// where one applies.
///
/// Successful termination
pub const SUCCESS: i32 = 0;

/// Usage error or a failed command
pub const USAGE: i32 = 64;

/// Operation was cancelled by the user
pub const CANCEL: i32 = 130;
