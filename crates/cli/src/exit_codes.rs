//! CLI exit codes.
//!
//! | Code | Meaning                                   |
//! |------|-------------------------------------------|
//! | 0    | Success                                   |
//! | 1    | General error                             |
//! | 2    | Usage error (bad unit, range, separator)  |
//! | 3    | File could not be read or written         |
//! | 4    | `find` found no match                     |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - unknown unit or quantity, malformed range or separator.
pub const EXIT_USAGE: u8 = 2;

/// Input could not be read or output could not be written.
pub const EXIT_IO: u8 = 3;

/// Search ran to completion without a hit. Like `grep(1)`, not an error
/// message, just a status.
pub const EXIT_NOT_FOUND: u8 = 4;
