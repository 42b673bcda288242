//! `create` — archive the Jenkins home and upload it as a new backup.
//!
//! # Steps
//!
//! | # | Step     | Skipped by   | On failure                                  |
//! |---|----------|--------------|---------------------------------------------|
//! | 1 | Archive  | —            | exit with tar's code, store never contacted |
//! | 2 | Name     | —            | —                                           |
//! | 3 | Upload   | `--dry-run`  | error, id not reported                      |
//!
//! The temporary archive is removed on every path, including dry-run.

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::{Context, EXIT_SUCCESS, exit_code};
use crate::{
    archiver::{Archiver, TempArchive, is_failure},
    backup_id::BackupId,
    runner::Exclusions,
    store::{BackupStore, ObjectStore},
    ui,
};

#[derive(Debug)]
pub struct CreateOptions {
    pub jenkins_home: PathBuf,
    pub tmp: PathBuf,
    pub exclusions: Exclusions,
    pub dry_run: bool,
}

/// Run `create`.
///
/// `connect` is only called once the archive exists and the run is not a
/// dry-run.
pub fn run<A, S, F>(ctx: &Context, opts: &CreateOptions, archiver: &A, connect: F) -> Result<u8>
where
    A: Archiver,
    S: ObjectStore,
    F: FnOnce() -> Result<BackupStore<S>>,
{
    ctx.log.info(format!(
        "Backing up {} to {}",
        opts.jenkins_home.display(),
        ctx.location
    ));

    let archive = TempArchive::new(&opts.tmp, ctx.log.clone());
    let code = archiver.create_archive(&opts.jenkins_home, archive.path(), &opts.exclusions)?;
    if is_failure(code) {
        ctx.log.critical(format!(
            "Creating tar archive failed with error code {code}."
        ));
        return Ok(exit_code(code));
    }
    ctx.log.debug("Successfully created tar archive");

    let backup_id = BackupId::now();

    if opts.dry_run {
        ctx.log.success(format!(
            "Would have created backup id {backup_id} from {}",
            opts.tmp.display()
        ));
        return Ok(EXIT_SUCCESS);
    }

    let store = connect()?;
    ui::with_spinner("Uploading", || store.put(archive.path(), &backup_id))
        .with_context(|| format!("uploading backup {backup_id} to {}", store.location()))?;
    drop(archive);

    ctx.log.success(format!("Created backup id {backup_id}"));
    Ok(EXIT_SUCCESS)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
