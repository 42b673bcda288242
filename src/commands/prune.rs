//! `prune` — keep the `keep` most recent backups, delete the rest.

use anyhow::{Context as _, Result};

use super::{Context, EXIT_SUCCESS, delete::delete_one};
use crate::{
    backup_id::BackupId,
    store::{BackupStore, ObjectStore},
};

/// Everything after the first `keep` entries of a latest-first listing.
pub fn candidates(backups: &[BackupId], keep: usize) -> &[BackupId] {
    backups.get(keep..).unwrap_or_default()
}

pub fn run<S: ObjectStore>(
    ctx: &Context,
    store: &BackupStore<S>,
    keep: usize,
    dry_run: bool,
) -> Result<u8> {
    ctx.log
        .info(format!("Pruning backups in {}...", store.location()));

    let backups = store
        .list()
        .with_context(|| format!("listing backups in {}", store.location()))?;
    let doomed = candidates(&backups, keep);

    if doomed.is_empty() {
        ctx.log.info(format!(
            "Nothing to prune: {} backup(s), keeping {keep}",
            backups.len()
        ));
    }
    for backup_id in doomed {
        delete_one(ctx, store, backup_id, dry_run)?;
    }
    Ok(EXIT_SUCCESS)
}
