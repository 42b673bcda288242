//! `backup-jenkins` — back up a Jenkins home directory to S3 and restore it.
//!
//! # Overview
//!
//! Backups are gzipped tar archives of the Jenkins home, stored in one bucket
//! under `<prefix>/<backup id>__jenkins-backup.tar.gz`.  The backup id is the
//! local creation time, so listing order is chronological.
//!
//! # Usage
//!
//! ```text
//! backup-jenkins --bucket ci-backups create           # archive + upload
//! backup-jenkins --bucket ci-backups list             # ids, latest first
//! backup-jenkins --bucket ci-backups delete ID        # delete one backup
//! backup-jenkins --bucket ci-backups prune 10         # keep the 10 latest
//! backup-jenkins --bucket ci-backups restore latest   # download + extract
//! ```
//!
//! # Module layout
//!
//! | Module                   | Responsibility                              |
//! |--------------------------|---------------------------------------------|
//! | [`cli`]                  | Argument types parsed by clap               |
//! | [`config`]               | Config file + layered settings resolution   |
//! | [`backup_id`]            | Timestamp identifiers                       |
//! | [`store`]                | Object store trait, S3 adapter, key naming  |
//! | [`runner`]               | tar argument construction                   |
//! | [`archiver`]             | tar execution, temp archive cleanup         |
//! | [`ui`]                   | Logger, spinner, captured execution         |
//! | [`commands`]             | One handler per subcommand                  |

mod archiver;
mod backup_id;
mod cli;
mod commands;
mod config;
mod runner;
mod store;
mod ui;

use std::{io, process::ExitCode};

use anyhow::{Context as _, Result};
use archiver::TarArchiver;
use clap::Parser;
use cli::{Cli, Command};
use commands::{Context, create::CreateOptions, restore::RestoreOptions};
use config::{FileConfig, StoreSettings};
use store::{BackupStore, s3::S3Store};
use ui::Reporter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let log = Reporter::new(cli.log_level);

    match run(&cli, &log) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            log.critical(format!("{e:#}"));
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli, log: &Reporter) -> Result<u8> {
    let file = config::load(cli.config.as_deref())?;
    let settings = StoreSettings::resolve(&cli.store, &file)?;
    let ctx = Context::new(log.clone(), settings.location());

    match &cli.command {
        // ── create ────────────────────────────────────────────────────────────
        Command::Create(args) => {
            let tar =
                config::tar_program(args.tar.as_deref(), &file, config::DEFAULT_CREATE_TAR);
            let archiver = TarArchiver::new(&tar, &args.tar_opts, log.clone());
            let opts = CreateOptions {
                jenkins_home: config::jenkins_home(args.jenkins_home.as_deref(), &file),
                tmp: config::tmp_path(args.tmp.as_deref(), &file),
                exclusions: args.toggles.to_exclusions(exclude_patterns(&file, &args.exclude)),
                dry_run: args.dry_run,
            };
            commands::create::run(&ctx, &opts, &archiver, || connect(&settings, log))
        },

        // ── list ──────────────────────────────────────────────────────────────
        Command::List => {
            let store = connect(&settings, log)?;
            commands::list::run(&ctx, &store, &mut io::stdout().lock())
        },

        // ── delete ────────────────────────────────────────────────────────────
        Command::Delete { backup_id, dry_run } => {
            let store = connect(&settings, log)?;
            commands::delete::run(&ctx, &store, backup_id, *dry_run)
        },

        // ── prune ─────────────────────────────────────────────────────────────
        Command::Prune { keep, dry_run } => {
            let store = connect(&settings, log)?;
            commands::prune::run(&ctx, &store, *keep, *dry_run)
        },

        // ── restore ───────────────────────────────────────────────────────────
        Command::Restore(args) => {
            let tar =
                config::tar_program(args.tar.as_deref(), &file, config::DEFAULT_RESTORE_TAR);
            let archiver = TarArchiver::new(&tar, &args.tar_opts, log.clone());
            let opts = RestoreOptions {
                target: args.backup_id.clone(),
                jenkins_home: config::jenkins_home(args.jenkins_home.as_deref(), &file),
                tmp: config::tmp_path(args.tmp.as_deref(), &file),
                dry_run: args.dry_run,
            };
            let store = connect(&settings, log)?;
            commands::restore::run(&ctx, &store, &archiver, &opts)
        },
    }
}

/// Config-file patterns first, then `--exclude` flags.
fn exclude_patterns(file: &FileConfig, flags: &[String]) -> Vec<String> {
    file.jenkins
        .exclude
        .iter()
        .chain(flags)
        .cloned()
        .collect()
}

fn connect(settings: &StoreSettings, log: &Reporter) -> Result<BackupStore<S3Store>> {
    log.debug(format!(
        "Connecting to bucket {} in {}",
        settings.bucket, settings.region
    ));
    let s3 = S3Store::connect(&settings.bucket, &settings.region)
        .with_context(|| format!("connecting to bucket {}", settings.bucket))?;
    Ok(BackupStore::new(
        s3,
        &settings.bucket,
        &settings.prefix,
        log.clone(),
    ))
}
