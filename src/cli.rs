//! Command-line interface definition.
//!
//! All argument parsing lives here so the rest of the codebase can stay
//! agnostic to `clap`.  The `Cli` struct is parsed once in `main` and then
//! turned into plain option structs for the command handlers.
//!
//! Store flags are global: they may appear before or after the subcommand.

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::{
    backup_id::BackupId, commands::restore::RestoreTarget, config, runner::Exclusions,
    ui::LogLevel,
};

/// Top-level CLI arguments, shared across every subcommand.
#[derive(Parser, Debug)]
#[command(
    name    = "backup-jenkins",
    about   = "Manage Jenkins backups to S3",
    version,
    // Show a compact two-column help layout.
    help_template = "\
{before-help}{name} {version}
{about}

{usage-heading} {usage}

{all-args}{after-help}"
)]
pub struct Cli {
    /// Path to a TOML config file.
    ///
    /// Defaults to `jenkins-backup-s3/config.toml` under the user config
    /// directory, which is skipped when absent.  A path given here must
    /// exist.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Minimum level of status messages: debug, info, warning, error, critical.
    #[arg(
        long,
        global = true,
        env = "JENKINS_BACKUP_LOG_LEVEL",
        default_value = "info"
    )]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

/// Where backups live.  Resolved against the config file in
/// [`crate::config::StoreSettings::resolve`].
#[derive(Args, Debug, Default)]
pub struct StoreArgs {
    /// S3 bucket to store backups in (required).
    #[arg(long, global = true, env = "JENKINS_BACKUP_BUCKET")]
    pub bucket: Option<String>,

    /// S3 key prefix [default: jenkins-backups].
    #[arg(long, global = true, env = "JENKINS_BACKUP_BUCKET_PREFIX")]
    pub bucket_prefix: Option<String>,

    /// S3 bucket region [default: us-east-1].
    #[arg(long, global = true, env = "JENKINS_BACKUP_BUCKET_REGION")]
    pub bucket_region: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Create a backup.
    Create(CreateArgs),

    /// List available backups, latest first.
    List,

    /// Delete a backup by BACKUP_ID.
    Delete {
        backup_id: BackupId,

        /// Report the delete candidate, do not delete it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete every backup older than the latest KEEP backups.
    Prune {
        /// Number of most recent backups to keep.
        keep: usize,

        /// Report the delete candidates, do not delete them.
        #[arg(long)]
        dry_run: bool,
    },

    /// Restore a backup by BACKUP_ID or 'latest'.
    Restore(RestoreArgs),
}

// ─── create ───────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct CreateArgs {
    /// Jenkins home directory [default: /var/lib/jenkins].
    #[arg(long)]
    pub jenkins_home: Option<PathBuf>,

    /// Temporary archive path [default: /tmp/jenkins-backup.tar.gz].
    #[arg(long)]
    pub tmp: Option<PathBuf>,

    /// tar executable [default: /bin/tar].
    #[arg(long)]
    pub tar: Option<String>,

    /// tar options, passed as one argument.
    #[arg(long, default_value = config::DEFAULT_CREATE_TAR_OPTS)]
    pub tar_opts: String,

    #[command(flatten)]
    pub toggles: ExclusionToggles,

    /// Additional pattern to exclude from the backup (repeatable).
    #[arg(short = 'e', long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Build the archive and report the backup id without uploading; the
    /// archive is then removed.
    #[arg(long)]
    pub dry_run: bool,
}

/// `--exclude-X` / `--include-X` pairs.  For each pair the flag given last
/// wins; with neither, the exclusion is on.
#[derive(Args, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ExclusionToggles {
    /// Exclude jenkins.war (default).
    #[arg(long, overrides_with = "include_jenkins_war")]
    pub exclude_jenkins_war: bool,
    /// Include jenkins.war.
    #[arg(long, overrides_with = "exclude_jenkins_war")]
    pub include_jenkins_war: bool,

    /// Exclude VCS metadata directories (default).
    #[arg(long, overrides_with = "include_vcs")]
    pub exclude_vcs: bool,
    /// Include VCS metadata directories.
    #[arg(long, overrides_with = "exclude_vcs")]
    pub include_vcs: bool,

    /// Let tar skip files it cannot read (default).
    #[arg(long, overrides_with = "dont_ignore_fail")]
    pub ignore_fail: bool,
    /// Make unreadable files an error.
    #[arg(long, overrides_with = "ignore_fail")]
    pub dont_ignore_fail: bool,

    /// Exclude `archive` directories (default).
    #[arg(long, overrides_with = "include_archive")]
    pub exclude_archive: bool,
    /// Include `archive` directories.
    #[arg(long, overrides_with = "exclude_archive")]
    pub include_archive: bool,

    /// Exclude `target` directories (default).
    #[arg(long, overrides_with = "include_target")]
    pub exclude_target: bool,
    /// Include `target` directories.
    #[arg(long, overrides_with = "exclude_target")]
    pub include_target: bool,

    /// Exclude job build directories (default).
    #[arg(long, overrides_with = "include_builds")]
    pub exclude_builds: bool,
    /// Include job build directories.
    #[arg(long, overrides_with = "exclude_builds")]
    pub include_builds: bool,

    /// Exclude job workspaces (default).
    #[arg(long, overrides_with = "include_workspace")]
    pub exclude_workspace: bool,
    /// Include job workspaces.
    #[arg(long, overrides_with = "exclude_workspace")]
    pub include_workspace: bool,

    /// Exclude the maven repository `.m2/repository` (default).
    #[arg(long, overrides_with = "include_maven")]
    pub exclude_maven: bool,
    /// Include the maven repository.
    #[arg(long, overrides_with = "exclude_maven")]
    pub include_maven: bool,

    /// Exclude `*.log` files (default).
    #[arg(long, overrides_with = "include_logs")]
    pub exclude_logs: bool,
    /// Include `*.log` files.
    #[arg(long, overrides_with = "exclude_logs")]
    pub include_logs: bool,
}

impl ExclusionToggles {
    /// Built-in toggles plus `patterns`, in order.
    pub fn to_exclusions(&self, patterns: Vec<String>) -> Exclusions {
        Exclusions {
            jenkins_war: self.exclude_jenkins_war || !self.include_jenkins_war,
            vcs: self.exclude_vcs || !self.include_vcs,
            ignore_failed_read: self.ignore_fail || !self.dont_ignore_fail,
            archive: self.exclude_archive || !self.include_archive,
            target: self.exclude_target || !self.include_target,
            builds: self.exclude_builds || !self.include_builds,
            workspace: self.exclude_workspace || !self.include_workspace,
            maven: self.exclude_maven || !self.include_maven,
            logs: self.exclude_logs || !self.include_logs,
            patterns,
        }
    }
}

// ─── restore ──────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Backup id to restore, or `latest`.
    pub backup_id: RestoreTarget,

    /// Jenkins home directory to restore into [default: /var/lib/jenkins].
    #[arg(long)]
    pub jenkins_home: Option<PathBuf>,

    /// Temporary archive path [default: /tmp/jenkins-backup.tar.gz].
    #[arg(long)]
    pub tmp: Option<PathBuf>,

    /// tar executable [default: tar].
    #[arg(long)]
    pub tar: Option<String>,

    /// tar options, passed as one argument.
    #[arg(long, default_value = config::DEFAULT_RESTORE_TAR_OPTS)]
    pub tar_opts: String,

    /// Download the archive without extracting it; the download is then
    /// removed.
    #[arg(long)]
    pub dry_run: bool,
}

// ─── Tests ────────────────────────────────────────────────────────────────────
