//! `delete` — remove one backup.
//!
//! [`delete_one`] is shared with `prune`, which calls it once per candidate.

use anyhow::{Context as _, Result};

use super::{Context, EXIT_SUCCESS};
use crate::{
    backup_id::BackupId,
    store::{BackupStore, ObjectStore},
};

pub fn run<S: ObjectStore>(
    ctx: &Context,
    store: &BackupStore<S>,
    backup_id: &BackupId,
    dry_run: bool,
) -> Result<u8> {
    delete_one(ctx, store, backup_id, dry_run)?;
    Ok(EXIT_SUCCESS)
}

/// Delete `backup_id`, or only report it under dry-run.
pub fn delete_one<S: ObjectStore>(
    ctx: &Context,
    store: &BackupStore<S>,
    backup_id: &BackupId,
    dry_run: bool,
) -> Result<()> {
    ctx.log.info(format!(
        "Deleting backup {backup_id} in {}...",
        store.location()
    ));

    if dry_run {
        ctx.log.info(format!("Would have deleted {backup_id}"));
        return Ok(());
    }

    store
        .delete(backup_id)
        .with_context(|| format!("deleting backup {backup_id}"))?;
    ctx.log.success(format!("Deleted {backup_id}"));
    Ok(())
}
