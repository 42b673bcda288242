//! Test doubles shared by the command tests.

use std::{cell::Cell, fs, path::Path};

use anyhow::Result;

use super::Context;
use crate::{
    archiver::Archiver,
    runner::Exclusions,
    store::{BackupStore, memory::MemoryStore},
    ui::{LogCapture, LogLevel, Reporter},
};

pub const OLDER: &str = "jenkins-backups/2024-01-01_00:00:00__jenkins-backup.tar.gz";
pub const NEWER: &str = "jenkins-backups/2024-01-02_00:00:00__jenkins-backup.tar.gz";

pub fn context() -> (Context, LogCapture) {
    let sink = LogCapture::default();
    let log = Reporter::with_writer(LogLevel::Debug, sink.clone());
    (Context::new(log, "bucket/jenkins-backups".into()), sink)
}

pub fn store<'a>(ctx: &Context, mem: &'a MemoryStore) -> BackupStore<&'a MemoryStore> {
    BackupStore::new(mem, "bucket", "jenkins-backups", ctx.log.clone())
}

/// Archiver that writes a stub archive and returns canned exit codes.
pub struct FakeArchiver {
    pub create_code: i32,
    pub extract_code: i32,
    pub creates: Cell<usize>,
    pub extracts: Cell<usize>,
}

impl FakeArchiver {
    pub fn exiting(create_code: i32, extract_code: i32) -> Self {
        Self {
            create_code,
            extract_code,
            creates: Cell::new(0),
            extracts: Cell::new(0),
        }
    }

    pub fn ok() -> Self {
        Self::exiting(0, 0)
    }
}

impl Archiver for FakeArchiver {
    fn create_archive(
        &self,
        _source_dir: &Path,
        archive: &Path,
        _exclusions: &Exclusions,
    ) -> Result<i32> {
        self.creates.set(self.creates.get() + 1);
        // tar opens the output before it fails, so a failed run still leaves
        // a partial file behind.
        fs::write(archive, b"partial or complete archive")?;
        Ok(self.create_code)
    }

    fn extract_archive(&self, archive: &Path, _target_dir: &Path) -> Result<i32> {
        self.extracts.set(self.extracts.get() + 1);
        assert!(archive.exists(), "extract called without a downloaded archive");
        Ok(self.extract_code)
    }
}
