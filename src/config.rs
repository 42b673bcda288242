//! Configuration types and loading logic.
//!
//! Every setting can come from four places.  The first one that provides a
//! value wins:
//!
//! 1. command-line flag
//! 2. environment variable (`JENKINS_BACKUP_BUCKET`, `…_BUCKET_PREFIX`, `…_BUCKET_REGION`)
//! 3. config file
//! 4. built-in default
//!
//! Flags and environment variables are both handled by clap (see
//! [`crate::cli`]); this module supplies layers 3 and 4.
//!
//! # File format
//!
//! The file is optional, as is every key in it.  By default it is read from
//! `<config dir>/jenkins-backup-s3/config.toml` (e.g.
//! `~/.config/jenkins-backup-s3/config.toml` on Linux).
//!
//! ```toml
//! [bucket]
//! name   = "ci-backups"
//! prefix = "jenkins-backups"
//! region = "eu-west-1"
//!
//! [jenkins]
//! home    = "/var/lib/jenkins"
//! tmp     = "/tmp/jenkins-backup.tar.gz"
//! tar     = "/usr/bin/tar"
//! exclude = ["plugins/*.bak"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::cli::StoreArgs;

// ─── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_BUCKET_PREFIX: &str = "jenkins-backups";
pub const DEFAULT_BUCKET_REGION: &str = "us-east-1";
pub const DEFAULT_JENKINS_HOME: &str = "/var/lib/jenkins";
pub const DEFAULT_TMP: &str = "/tmp/jenkins-backup.tar.gz";
pub const DEFAULT_CREATE_TAR: &str = "/bin/tar";
pub const DEFAULT_CREATE_TAR_OPTS: &str = "cvfz";
pub const DEFAULT_RESTORE_TAR: &str = "tar";
pub const DEFAULT_RESTORE_TAR_OPTS: &str = "xzf";

/// Directory under the user config dir holding `config.toml`.
const CONFIG_DIR_NAME: &str = "jenkins-backup-s3";

// ─── File config ──────────────────────────────────────────────────────────────

/// Root of the config file.  Both sections are optional.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub bucket: BucketConfig,

    #[serde(default)]
    pub jenkins: JenkinsConfig,
}

/// `[bucket]`: where backups are stored.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BucketConfig {
    pub name: Option<String>,
    pub prefix: Option<String>,
    pub region: Option<String>,
}

/// `[jenkins]`: what is archived and how.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct JenkinsConfig {
    pub home: Option<PathBuf>,
    pub tmp: Option<PathBuf>,
    /// tar executable for both `create` and `restore`.
    pub tar: Option<String>,
    /// Extra exclusion patterns for `create`, applied before any `--exclude`.
    #[serde(default)]
    pub exclude: Vec<String>,
}

// ─── Resolved settings ────────────────────────────────────────────────────────

/// Store location after all layers have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub bucket: String,
    pub prefix: String,
    pub region: String,
}

impl StoreSettings {
    pub fn resolve(args: &StoreArgs, file: &FileConfig) -> Result<Self> {
        let Some(bucket) = args.bucket.clone().or_else(|| file.bucket.name.clone()) else {
            bail!(
                "no bucket configured: pass --bucket, set JENKINS_BACKUP_BUCKET, \
                 or add `name` to the [bucket] section of the config file"
            );
        };

        Ok(Self {
            bucket,
            prefix: args
                .bucket_prefix
                .clone()
                .or_else(|| file.bucket.prefix.clone())
                .unwrap_or_else(|| DEFAULT_BUCKET_PREFIX.into()),
            region: args
                .bucket_region
                .clone()
                .or_else(|| file.bucket.region.clone())
                .unwrap_or_else(|| DEFAULT_BUCKET_REGION.into()),
        })
    }

    /// `bucket/prefix`, for status lines.
    pub fn location(&self) -> String {
        format!("{}/{}", self.bucket, self.prefix)
    }
}

/// Jenkins home directory, with the default applied.
pub fn jenkins_home(flag: Option<&Path>, file: &FileConfig) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| file.jenkins.home.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_JENKINS_HOME))
}

pub fn tmp_path(flag: Option<&Path>, file: &FileConfig) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| file.jenkins.tmp.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TMP))
}

/// tar executable: flag, then file, then the command's own default.
pub fn tar_program(flag: Option<&str>, file: &FileConfig, default: &str) -> String {
    flag.map(str::to_owned)
        .or_else(|| file.jenkins.tar.clone())
        .unwrap_or_else(|| default.to_owned())
}

// ─── Loader ───────────────────────────────────────────────────────────────────

/// `<config dir>/jenkins-backup-s3/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join("config.toml"))
}

/// Load the config file.
///
/// An explicit `path` must exist.  Without one, the default location is
/// tried and silently skipped when absent.
pub fn load(path: Option<&Path>) -> Result<FileConfig> {
    match path {
        Some(p) => load_config(p),
        None => match default_config_path() {
            Some(p) if p.exists() => load_config(&p),
            _ => Ok(FileConfig::default()),
        },
    }
}

/// Read and parse a [`FileConfig`] from `path`.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
