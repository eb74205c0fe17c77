//! Finds the article files touched by the most recent commit. The
//! [`ChangeSource`] trait is the seam between the deploy pipeline and git so
//! the pipeline can run against a fixed list of paths instead.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

/// Produces the ordered list of changed files under a scope directory.
pub trait ChangeSource {
    /// Returns the changed files under `scope`, relative to the repository
    /// root. An empty list is a normal outcome.
    fn changed_files(&self, scope: &Path) -> Result<Vec<PathBuf>>;
}

/// Asks the system `git` for the files that differ between two revisions.
pub struct GitChangeSource {
    /// The repository's working directory. `git` runs here, so scopes and
    /// returned paths are relative to it.
    repo: PathBuf,

    /// The newer revision (`HEAD` by default).
    head: String,

    /// The older revision (`HEAD~1` by default).
    base: String,
}

impl GitChangeSource {
    /// Compares `HEAD` against its parent in `repo`.
    pub fn new(repo: impl Into<PathBuf>) -> GitChangeSource {
        GitChangeSource {
            repo: repo.into(),
            head: String::from("HEAD"),
            base: String::from("HEAD~1"),
        }
    }

    /// Overrides the revisions being compared.
    pub fn with_revisions(
        mut self,
        head: impl Into<String>,
        base: impl Into<String>,
    ) -> GitChangeSource {
        self.head = head.into();
        self.base = base.into();
        self
    }

    fn diff_command(&self, scope: &Path) -> Command {
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.repo)
            // keep non-ASCII paths unescaped so they can be opened as-is
            .args(&["-c", "core.quotePath=false"])
            .args(&["diff", "--name-only"])
            .arg(&self.head)
            .arg(&self.base)
            .arg("--")
            .arg(scope);
        cmd
    }
}

impl ChangeSource for GitChangeSource {
    fn changed_files(&self, scope: &Path) -> Result<Vec<PathBuf>> {
        debug!(
            repo = %self.repo.display(),
            head = %self.head,
            base = %self.base,
            scope = %scope.display(),
            "listing changed files"
        );
        let output = self.diff_command(scope).output().map_err(Error::Spawn)?;
        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: format!(
                    "git diff --name-only {} {} -- {}",
                    self.head,
                    self.base,
                    scope.display()
                ),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        let stdout = String::from_utf8(output.stdout).map_err(Error::InvalidOutput)?;
        Ok(parse_name_list(&stdout))
    }
}

/// A fixed list of paths. Used when the files to deploy are named
/// explicitly rather than discovered.
pub struct StaticChangeSource(Vec<PathBuf>);

impl StaticChangeSource {
    pub fn new(paths: Vec<PathBuf>) -> StaticChangeSource {
        StaticChangeSource(paths)
    }
}

impl ChangeSource for StaticChangeSource {
    fn changed_files(&self, _scope: &Path) -> Result<Vec<PathBuf>> {
        Ok(self.0.clone())
    }
}

// Splits `git diff --name-only` output into paths, dropping blank lines.
fn parse_name_list(output: &str) -> Vec<PathBuf> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}

pub type Result<T> = std::result::Result<T, Error>;

/// Returned when the list of changed files can't be determined. This is
/// fatal for a deploy run.
#[derive(Debug)]
pub enum Error {
    /// `git` couldn't be started at all.
    Spawn(std::io::Error),

    /// `git` ran but exited unsuccessfully, e.g. because the repository has
    /// fewer than two commits.
    CommandFailed { command: String, stderr: String },

    /// `git` printed something that isn't UTF-8.
    InvalidOutput(std::string::FromUtf8Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Spawn(err) => write!(f, "Running git: {}", err),
            Error::CommandFailed { command, stderr } => {
                write!(f, "`{}` failed: {}", command, stderr)
            }
            Error::InvalidOutput(err) => {
                write!(f, "Reading git output: {}", err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Spawn(err) => Some(err),
            Error::CommandFailed { .. } => None,
            Error::InvalidOutput(err) => Some(err),
        }
    }
}
