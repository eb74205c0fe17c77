//! Exports the [`deploy`] function which stitches together the steps of a
//! run: listing the changed articles ([`crate::changes`]), parsing each one
//! ([`crate::article`]), publishing the ones marked published
//! ([`crate::publish`]), and reporting every outcome ([`crate::report`]).

use crate::article::Article;
use crate::changes::{ChangeSource, Error as ChangesError};
use crate::config::Config;
use crate::publish::{Error as PublishError, PublishClient, PublishRequest};
use crate::report::Reporter;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// Counts of per-article outcomes for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Summary {
    /// Articles the platform answered for.
    pub published: usize,

    /// Articles not marked published.
    pub skipped: usize,

    /// Articles that couldn't be read, parsed, or sent.
    pub failed: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} published, {} skipped, {} failed",
            self.published, self.skipped, self.failed
        )
    }
}

/// Deploys every article `source` reports as changed under
/// `config.articles_directory`.
///
/// Articles are read and reported in the order `source` lists them. Publish
/// calls run as background tasks while the remaining articles are processed,
/// and this function only returns once every one of them has settled. Only a
/// failure of `source` itself is returned as an error; per-article failures
/// go to `reporter` and are counted in the [`Summary`].
pub async fn deploy<S, R>(
    config: &Config,
    source: &S,
    client: Arc<dyn PublishClient>,
    reporter: &R,
) -> Result<Summary>
where
    S: ChangeSource + ?Sized,
    R: Reporter + ?Sized,
{
    let paths = source.changed_files(&config.articles_directory)?;
    info!(count = paths.len(), "found changed articles");

    let mut summary = Summary::default();
    if paths.is_empty() {
        reporter.no_articles();
        return Ok(summary);
    }

    let mut in_flight = JoinSet::new();
    for path in paths {
        let article = match Article::load(&config.root_directory, &path) {
            Ok(article) => article,
            Err(err) => {
                reporter.failed(&path, &err);
                summary.failed += 1;
                continue;
            }
        };

        let title = article.display_title();
        if !article.is_published() {
            reporter.skipped(&title);
            summary.skipped += 1;
            continue;
        }

        reporter.published(&title);
        debug!(path = %path.display(), "dispatching publish");
        let request = PublishRequest::new(article.into_raw());
        let client = Arc::clone(&client);
        in_flight.spawn(async move {
            // The inner task keeps a panicking client from losing `path`.
            let publishing = tokio::spawn(async move { client.publish(&request).await });
            let result = match publishing.await {
                Ok(result) => result,
                Err(err) => Err(PublishError::from(err)),
            };
            (path, result)
        });
    }

    while let Some(joined) = in_flight.join_next().await {
        match joined {
            Ok((path, Ok(response))) => {
                reporter.response(&path, &response);
                summary.published += 1;
            }
            Ok((path, Err(err))) => {
                reporter.failed(&path, &err);
                summary.failed += 1;
            }
            Err(err) => {
                error!(error = %err, "publish task did not complete");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for a deploy run. Everything that goes wrong with a single
/// article is reported and counted instead.
#[derive(Debug)]
pub enum Error {
    /// Returned when the changed files couldn't be listed.
    Changes(ChangesError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Changes(err) => write!(f, "Detecting changed articles: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Changes(err) => Some(err),
        }
    }
}

impl From<ChangesError> for Error {
    /// Converts [`ChangesError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: ChangesError) -> Error {
        Error::Changes(err)
    }
}
