//! Subcommand handlers.
//!
//! Each file in this module corresponds to one user-facing command:
//!
//! | File          | Invocation                       | Description                       |
//! |---------------|----------------------------------|-----------------------------------|
//! | `create.rs`   | `backup-jenkins create`          | Archive Jenkins home and upload   |
//! | `list.rs`     | `backup-jenkins list`            | Print backup ids, latest first    |
//! | `delete.rs`   | `backup-jenkins delete ID`       | Delete one backup                 |
//! | `prune.rs`    | `backup-jenkins prune KEEP`      | Keep only the KEEP latest backups |
//! | `restore.rs`  | `backup-jenkins restore ID`      | Download and extract a backup     |
//!
//! Handlers return the process exit code.  Errors they return have not been
//! reported yet; `main` logs them once and exits 1.

pub mod create;
pub mod delete;
pub mod list;
pub mod prune;
pub mod restore;

#[cfg(test)]
pub mod fixtures;

use crate::ui::Reporter;

pub const EXIT_SUCCESS: u8 = 0;

/// State shared by every handler.
#[derive(Clone)]
pub struct Context {
    pub log: Reporter,
    /// `bucket/prefix` of the configured store, for status lines.
    pub location: String,
}

impl Context {
    pub fn new(log: Reporter, location: String) -> Self {
        Self { log, location }
    }
}

/// Map a child exit code onto a process exit code.
pub fn exit_code(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(u8::MAX)
}
