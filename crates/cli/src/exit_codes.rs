//! CLI Exit Code Registry
//!
//! Single source of truth for `jobsettings` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                        |
//! |------|------------------------------------------------|
//! | 0    | Success                                        |
//! | 1    | General error (unreadable input, write failure) |
//! | 2    | Usage error (bad arguments)                    |
//! | 3    | Settings document could not be parsed          |
//! | 4    | Settings parsed but failed validation          |
//! | 5    | Binary payload could not be decoded            |
//! | 6    | Limits file missing, unreadable or invalid     |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - I/O failure reading input or writing output.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments. clap uses this code for its own errors too.
pub const EXIT_USAGE: u8 = 2;

/// Unknown field, wrong type, or malformed JSON.
pub const EXIT_PARSE: u8 = 3;

/// One or more range violations.
pub const EXIT_VALIDATION: u8 = 4;

/// Truncated or corrupt binary payload, or bad base64.
pub const EXIT_DECODE: u8 = 5;

/// `--limits` file problem.
pub const EXIT_LIMITS: u8 = 6;
