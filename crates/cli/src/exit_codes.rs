//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: schedulers rely on them.
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | Success                                          |
//! | 2    | CLI usage error (bad args, unreadable config)    |
//! | 10   | Config failed to parse or validate               |
//! | 11   | Advertising or sales fetch failed                |
//! | 12   | Runtime error (output write, serialization)      |
//! | 13   | Date window is empty (start after end)           |

use shelfsync_recon::{ReconError, SyncStage};

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing config file.
pub const EXIT_USAGE: u8 = 2;

/// Config is not valid TOML, or fails validation.
pub const EXIT_INVALID_CONFIG: u8 = 10;

/// A data source fetch failed; nothing was produced.
pub const EXIT_FETCH_FAILED: u8 = 11;

/// Anything after the fetch that failed (output file, JSON encoding).
pub const EXIT_RUNTIME: u8 = 12;

/// The requested window has its start after its end.
pub const EXIT_EMPTY_WINDOW: u8 = 13;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::EmptyWindow { .. } => EXIT_EMPTY_WINDOW,
        ReconError::StageFailed { stage: SyncStage::FetchAds | SyncStage::FetchSales, .. } => {
            EXIT_FETCH_FAILED
        }
        ReconError::StageFailed { .. }
        | ReconError::MalformedRecord { .. }
        | ReconError::Csv(_)
        | ReconError::Io(_) => EXIT_RUNTIME,
    }
}
