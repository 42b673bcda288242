//! Creating and extracting the backup tarball with an external `tar`.
//!
//! The archive's contents are never interpreted here.  Both operations
//! return tar's exit code and leave the decision to the caller:
//!
//! | Code | Meaning                                           |
//! |------|---------------------------------------------------|
//! | 0    | success                                           |
//! | 1    | warnings (e.g. files changed while being read)    |
//! | ≥ 2  | failure, see [`is_failure`]                       |

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::Result;

use crate::{
    runner::{self, Exclusions},
    ui::{self, Reporter},
};

/// tar exit codes at or above this value mean the archive is unusable.
pub const FAILURE_THRESHOLD: i32 = 2;

pub const fn is_failure(code: i32) -> bool {
    code >= FAILURE_THRESHOLD
}

// ─── Archiver ─────────────────────────────────────────────────────────────────

pub trait Archiver {
    /// Archive the contents of `source_dir` into `archive`.
    fn create_archive(
        &self,
        source_dir: &Path,
        archive: &Path,
        exclusions: &Exclusions,
    ) -> Result<i32>;

    /// Unpack `archive` into `target_dir`.
    fn extract_archive(&self, archive: &Path, target_dir: &Path) -> Result<i32>;
}

/// [`Archiver`] that shells out to a tar executable.
pub struct TarArchiver {
    program: String,
    options: String,
    log: Reporter,
}

impl TarArchiver {
    /// `options` is passed to tar as a single argument, e.g. `cvfz`.
    pub fn new(program: &str, options: &str, log: Reporter) -> Self {
        Self {
            program: program.to_owned(),
            options: options.to_owned(),
            log,
        }
    }

    fn execute(&self, label: &str, args: &[String]) -> Result<i32> {
        self.log
            .info(format!("Executing command \"{}\"", args.join(" ")));

        let out = ui::run_stage(label, args)?;
        // Verbose tar lists every member on stdout.
        for line in out.stdout.lines() {
            self.log.debug(line);
        }
        if out.code != 0 {
            self.log
                .warn(format!("{} exited with code {}", self.program, out.code));
            self.replay(&out.stderr);
        }
        Ok(out.code)
    }

    fn replay(&self, stderr: &str) {
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            self.log.warn(format!("  {line}"));
        }
    }
}

impl Archiver for TarArchiver {
    fn create_archive(
        &self,
        source_dir: &Path,
        archive: &Path,
        exclusions: &Exclusions,
    ) -> Result<i32> {
        let args = runner::create_args(
            &self.program,
            &self.options,
            archive,
            source_dir,
            exclusions,
        );
        self.execute("Archiving", &args)
    }

    fn extract_archive(&self, archive: &Path, target_dir: &Path) -> Result<i32> {
        let args = runner::extract_args(&self.program, &self.options, archive, target_dir);
        self.execute("Extracting", &args)
    }
}

// ─── Temporary archive ────────────────────────────────────────────────────────

/// Owns the temporary archive path for one command run.
///
/// The file is removed when the guard is dropped, whichever way the command
/// exits.  A file that was never created is not an error.
pub struct TempArchive {
    path: PathBuf,
    log: Reporter,
}

impl TempArchive {
    pub fn new(path: impl Into<PathBuf>, log: Reporter) -> Self {
        Self {
            path: path.into(),
            log,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempArchive {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {},
            Err(e) if e.kind() == io::ErrorKind::NotFound => {},
            Err(e) => self.log.warn(format!(
                "Could not remove temporary archive {}: {e}",
                self.path.display()
            )),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::process::Command;

    use super::*;
    use crate::ui::{LogCapture, LogLevel};

    /// The exclusion flags are GNU tar options.
    fn tar_available() -> bool {
        Command::new("tar")
            .arg("--version")
            .output()
            .is_ok_and(|o| {
                o.status.success() && String::from_utf8_lossy(&o.stdout).contains("GNU tar")
            })
    }

    fn quiet() -> Reporter {
        Reporter::with_writer(LogLevel::Info, LogCapture::default())
    }

    fn archiver(opts: &str) -> (TarArchiver, LogCapture) {
        let sink = LogCapture::default();
        let log = Reporter::with_writer(LogLevel::Debug, sink.clone());
        (TarArchiver::new("tar", opts, log), sink)
    }

    // ── is_failure ────────────────────────────────────────────────────────────

    #[test]
    fn warnings_are_not_failures() {
        assert!(!is_failure(0));
        assert!(!is_failure(1));
        assert!(is_failure(2));
        assert!(is_failure(127));
    }

    // ── TempArchive ───────────────────────────────────────────────────────────

    #[test]
    fn temp_archive_removes_file_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.tar.gz");
        {
            let guard = TempArchive::new(&path, quiet());
            fs::write(guard.path(), b"partial").unwrap();
        }
        assert!(!path.exists());
    }

    #[test]
    fn temp_archive_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        drop(TempArchive::new(dir.path().join("never-written"), quiet()));
    }

    #[test]
    fn temp_archive_reports_failed_removal_through_the_logger() {
        let dir = tempfile::tempdir().unwrap();
        // remove_file refuses directories, so the guard cannot clean this up.
        let path = dir.path().join("not-a-file");
        fs::create_dir(&path).unwrap();
        let sink = LogCapture::default();

        drop(TempArchive::new(&path, Reporter::with_writer(LogLevel::Info, sink.clone())));

        let out = sink.contents();
        assert!(out.contains("WARN"), "{out}");
        assert!(out.contains("Could not remove temporary archive"), "{out}");
    }

    // ── TarArchiver ───────────────────────────────────────────────────────────

    #[test]
    fn create_and_extract_with_real_tar() {
        if !tar_available() {
            return;
        }
        let root = tempfile::tempdir().unwrap();
        let home = root.path().join("home");
        let restored = root.path().join("restored");
        fs::create_dir_all(home.join("jobs/app/builds/1")).unwrap();
        fs::create_dir_all(&restored).unwrap();
        fs::write(home.join("config.xml"), "<hudson/>").unwrap();
        fs::write(home.join("jobs/app/config.xml"), "<project/>").unwrap();
        fs::write(home.join("jobs/app/builds/1/log"), "build log").unwrap();
        fs::write(home.join("jenkins.war"), "war").unwrap();
        fs::write(home.join("debug.log"), "noise").unwrap();

        let archive = root.path().join("backup.tar.gz");
        let (create, _) = archiver("czf");
        let code = create
            .create_archive(&home, &archive, &Exclusions::default())
            .unwrap();
        assert_eq!(code, 0);
        assert!(archive.exists());

        let (extract, _) = archiver("xzf");
        assert_eq!(extract.extract_archive(&archive, &restored).unwrap(), 0);

        assert!(restored.join("config.xml").exists());
        assert!(restored.join("jobs/app/config.xml").exists());
        assert!(!restored.join("jobs/app/builds/1/log").exists());
        assert!(!restored.join("jenkins.war").exists());
        assert!(!restored.join("debug.log").exists());
    }

    #[test]
    fn missing_source_dir_is_a_failure_code() {
        if !tar_available() {
            return;
        }
        let root = tempfile::tempdir().unwrap();
        let (create, sink) = archiver("czf");
        let code = create
            .create_archive(
                &root.path().join("no-such-home"),
                &root.path().join("out.tar.gz"),
                &Exclusions::default(),
            )
            .unwrap();
        assert!(is_failure(code), "tar exited {code}");
        assert!(sink.contents().contains("Executing command"));
    }

    #[test]
    fn failed_extract_replays_tar_stderr() {
        if !tar_available() {
            return;
        }
        let root = tempfile::tempdir().unwrap();
        let (extract, sink) = archiver("xzf");

        let code = extract
            .extract_archive(&root.path().join("missing.tar.gz"), root.path())
            .unwrap();

        assert!(is_failure(code), "tar exited {code}");
        let out = sink.contents();
        assert!(out.contains(&format!("tar exited with code {code}")), "{out}");
        assert!(out.contains("missing.tar.gz: Cannot open"), "{out}");
    }

    #[test]
    fn unspawnable_program_is_an_error() {
        let log = Reporter::with_writer(LogLevel::Info, LogCapture::default());
        let tar = TarArchiver::new("/definitely/not/tar", "xzf", log);
        let dir = tempfile::tempdir().unwrap();
        assert!(
            tar.extract_archive(&dir.path().join("a.tar.gz"), dir.path())
                .is_err()
        );
    }
}
