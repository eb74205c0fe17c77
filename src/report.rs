//! The console lines a deploy run prints for each article. These are the
//! user-facing output of the tool and are printed regardless of the tracing
//! verbosity.

use std::error::Error;
use std::path::Path;

/// Receives the outcome of each step of a deploy run.
pub trait Reporter {
    /// The change set was empty.
    fn no_articles(&self);

    /// The article is marked published and is about to be sent.
    fn published(&self, title: &str);

    /// The article isn't marked published.
    fn skipped(&self, title: &str);

    /// The publishing platform answered for the article at `path`.
    fn response(&self, path: &Path, response: &serde_json::Value);

    /// Reading, parsing, or publishing the article at `path` failed.
    fn failed(&self, path: &Path, err: &dyn Error);
}

/// Prints progress to stdout and failures to stderr.
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn no_articles(&self) {
        println!("{}", no_articles_line());
    }

    fn published(&self, title: &str) {
        println!("{}", published_line(title));
    }

    fn skipped(&self, title: &str) {
        println!("{}", skipped_line(title));
    }

    fn response(&self, _path: &Path, response: &serde_json::Value) {
        println!("{:#}", response);
    }

    fn failed(&self, path: &Path, err: &dyn Error) {
        eprintln!("{}", failed_line(path, err));
    }
}

pub fn no_articles_line() -> &'static str {
    "No Articles."
}

pub fn published_line(title: &str) -> String {
    format!("Article {} published. Deploying to dev.to", title)
}

pub fn skipped_line(title: &str) -> String {
    format!("Article {} NOT published. Skipping.", title)
}

pub fn failed_line(path: &Path, err: &dyn Error) -> String {
    format!("Error processing {}: {}", path.display(), err)
}
