//! `restore` — download a backup and extract it into the Jenkins home.
//!
//! # Steps
//!
//! | # | Step      | Skipped by   | On failure                          |
//! |---|-----------|--------------|-------------------------------------|
//! | 1 | Resolve   | explicit id  | no backups → exit 0                 |
//! | 2 | Download  | —            | error                               |
//! | 3 | Extract   | `--dry-run`  | exit with tar's code when ≥ 2       |
//!
//! The temporary archive is removed on every path.

use std::{fmt, path::PathBuf, str::FromStr};

use anyhow::{Context as _, Result};

use super::{Context, EXIT_SUCCESS, exit_code};
use crate::{
    archiver::{Archiver, TempArchive, is_failure},
    backup_id::{BackupId, InvalidBackupId},
    store::{BackupStore, ObjectStore},
    ui,
};

/// What to restore: the newest backup or a specific one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreTarget {
    Latest,
    Backup(BackupId),
}

impl FromStr for RestoreTarget {
    type Err = InvalidBackupId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "latest" {
            Ok(Self::Latest)
        } else {
            s.parse().map(Self::Backup)
        }
    }
}

impl fmt::Display for RestoreTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Backup(id) => id.fmt(f),
        }
    }
}

#[derive(Debug)]
pub struct RestoreOptions {
    pub target: RestoreTarget,
    pub jenkins_home: PathBuf,
    pub tmp: PathBuf,
    pub dry_run: bool,
}

pub fn run<A, S>(
    ctx: &Context,
    store: &BackupStore<S>,
    archiver: &A,
    opts: &RestoreOptions,
) -> Result<u8>
where
    A: Archiver,
    S: ObjectStore,
{
    ctx.log.info(format!(
        "Attempting to restore backup by criteria '{}'...",
        opts.target
    ));

    let backup_id = match &opts.target {
        RestoreTarget::Backup(id) => id.clone(),
        RestoreTarget::Latest => {
            let latest = store
                .latest()
                .with_context(|| format!("finding the latest backup in {}", store.location()))?;
            let Some(id) = latest else {
                ctx.log.info("No backups found.");
                return Ok(EXIT_SUCCESS);
            };
            id
        },
    };

    ctx.log.info(format!(
        "Restoring {} from {}/{backup_id}...",
        opts.jenkins_home.display(),
        store.location()
    ));

    let archive = TempArchive::new(&opts.tmp, ctx.log.clone());
    ui::with_spinner("Downloading", || store.get(&backup_id, archive.path()))
        .with_context(|| format!("downloading backup {backup_id}"))?;

    if opts.dry_run {
        ctx.log.info(format!(
            "Would have restored {} from {}",
            opts.jenkins_home.display(),
            opts.tmp.display()
        ));
        return Ok(EXIT_SUCCESS);
    }

    let code = archiver.extract_archive(archive.path(), &opts.jenkins_home)?;
    drop(archive);

    if is_failure(code) {
        ctx.log.critical(format!(
            "Restoring tar archive failed with error code {code}."
        ));
        return Ok(exit_code(code));
    }

    ctx.log.success(format!(
        "Restored {backup_id} into {}",
        opts.jenkins_home.display()
    ));
    Ok(EXIT_SUCCESS)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
