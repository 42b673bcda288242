//! `list` — print every backup id, latest first.
//!
//! Ids go to `out` (stdout in the binary), one per line, so the output can be
//! piped.  Status lines go through the logger.

use std::io::Write;

use anyhow::{Context as _, Result};

use super::{Context, EXIT_SUCCESS};
use crate::store::{BackupStore, ObjectStore};

pub fn run<S: ObjectStore>(
    ctx: &Context,
    store: &BackupStore<S>,
    out: &mut impl Write,
) -> Result<u8> {
    ctx.log
        .info(format!("All backups for {}...", store.location()));
    ctx.log.info("------------------------");

    let backups = store
        .list()
        .with_context(|| format!("listing backups in {}", store.location()))?;

    if backups.is_empty() {
        ctx.log.info("No backups found.");
    }
    for id in &backups {
        writeln!(out, "{id}").context("writing backup list")?;
    }
    Ok(EXIT_SUCCESS)
}
