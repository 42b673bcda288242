//! tar argument construction helpers.
//!
//! This module only *builds* argument lists; execution lives in
//! [`crate::archiver`] and [`crate::ui`].  Every function here is pure, so the
//! exact command lines are pinned down by unit and snapshot tests without
//! spawning anything.
//!
//! # Exclusion order
//!
//! Built-in exclusions are emitted in a fixed order, followed by extra
//! patterns in the order they were given:
//!
//! | # | Toggle               | tar flag                          |
//! |---|----------------------|-----------------------------------|
//! | 1 | `jenkins_war`        | `--exclude=jenkins.war`           |
//! | 2 | `vcs`                | `--exclude-vcs`                   |
//! | 3 | `ignore_failed_read` | `--ignore-failed-read`            |
//! | 4 | `archive`            | `--exclude=archive`               |
//! | 5 | `target`             | `--exclude=target`                |
//! | 6 | `builds`             | `--exclude=jobs/*/builds/*`       |
//! | 7 | `workspace`          | `--exclude=jobs/*/workspace/*`    |
//! | 8 | `maven`              | `--exclude=.m2/repository`        |
//! | 9 | `logs`               | `--exclude=*.log`                 |

use std::path::Path;

// ─── Exclusions ───────────────────────────────────────────────────────────────

/// Which parts of the Jenkins home are left out of an archive.
///
/// Every toggle defaults to `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Exclusions {
    pub jenkins_war: bool,
    pub vcs: bool,
    /// Not an exclusion as such: tells tar to keep going past unreadable files.
    pub ignore_failed_read: bool,
    pub archive: bool,
    pub target: bool,
    pub builds: bool,
    pub workspace: bool,
    pub maven: bool,
    pub logs: bool,
    /// Extra `--exclude` patterns, appended after the built-ins.
    pub patterns: Vec<String>,
}

impl Default for Exclusions {
    fn default() -> Self {
        Self {
            jenkins_war: true,
            vcs: true,
            ignore_failed_read: true,
            archive: true,
            target: true,
            builds: true,
            workspace: true,
            maven: true,
            logs: true,
            patterns: vec![],
        }
    }
}

impl Exclusions {
    /// The tar flags for this set, in the documented order.
    pub fn to_args(&self) -> Vec<String> {
        let built_in = [
            (self.jenkins_war, "--exclude=jenkins.war"),
            (self.vcs, "--exclude-vcs"),
            (self.ignore_failed_read, "--ignore-failed-read"),
            (self.archive, "--exclude=archive"),
            (self.target, "--exclude=target"),
            (self.builds, "--exclude=jobs/*/builds/*"),
            (self.workspace, "--exclude=jobs/*/workspace/*"),
            (self.maven, "--exclude=.m2/repository"),
            (self.logs, "--exclude=*.log"),
        ];

        built_in
            .into_iter()
            .filter(|(enabled, _)| *enabled)
            .map(|(_, flag)| flag.to_owned())
            .chain(self.patterns.iter().map(|p| format!("--exclude={p}")))
            .collect()
    }
}

// ─── tar command lines ────────────────────────────────────────────────────────

/// `<tar> <opts> <archive> -C <source> <exclusions…> .`
pub fn create_args(
    tar: &str,
    tar_opts: &str,
    archive: &Path,
    source_dir: &Path,
    exclusions: &Exclusions,
) -> Vec<String> {
    let mut cmd: Vec<String> = vec![
        tar.into(),
        tar_opts.into(),
        archive.to_string_lossy().into_owned(),
        "-C".into(),
        source_dir.to_string_lossy().into_owned(),
    ];
    cmd.extend(exclusions.to_args());
    cmd.push(".".into());
    cmd
}

/// `<tar> <opts> <archive> -C <target>`
pub fn extract_args(tar: &str, tar_opts: &str, archive: &Path, target_dir: &Path) -> Vec<String> {
    vec![
        tar.into(),
        tar_opts.into(),
        archive.to_string_lossy().into_owned(),
        "-C".into(),
        target_dir.to_string_lossy().into_owned(),
    ]
}

// ─── Tests ────────────────────────────────────────────────────────────────────
