//! Command-line and environment configuration for a deploy run.

use crate::publish::{ApiToken, DEFAULT_ENDPOINT, TOKEN_VARIABLE};
use clap::{crate_version, App, Arg, ArgMatches};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// The directory, relative to the repository root, that holds articles.
pub const DEFAULT_ARTICLES_DIRECTORY: &str = "content/articles";

pub struct Config {
    /// The repository root. Git runs here and article paths are resolved
    /// against it.
    pub root_directory: PathBuf,

    /// The directory, relative to `root_directory`, whose changes are
    /// deployed.
    pub articles_directory: PathBuf,

    /// The articles API endpoint.
    pub endpoint: Url,

    /// The newer of the two revisions being compared.
    pub head: String,

    /// The older of the two revisions being compared.
    pub base: String,

    /// The API key, if one was supplied.
    pub token: Option<ApiToken>,

    /// Files to deploy instead of asking git. Empty unless `--file` was
    /// given.
    pub files: Vec<PathBuf>,
}

/// Builds the command-line interface.
pub fn app<'a, 'b>() -> App<'a, 'b> {
    App::new("devto-deploy")
        .version(crate_version!())
        .about("Publishes articles changed in the latest commit to dev.to")
        .after_help("The API key is read from the DEV_TOKEN environment variable.")
        .arg(
            Arg::with_name("root")
                .long("root")
                .value_name("DIR")
                .takes_value(true)
                .default_value(".")
                .help("The repository root"),
        )
        .arg(
            Arg::with_name("articles")
                .long("articles")
                .value_name("DIR")
                .takes_value(true)
                .default_value(DEFAULT_ARTICLES_DIRECTORY)
                .help("The articles directory, relative to the repository root"),
        )
        .arg(
            Arg::with_name("endpoint")
                .long("endpoint")
                .value_name("URL")
                .takes_value(true)
                .default_value(DEFAULT_ENDPOINT)
                .help("The articles API endpoint"),
        )
        .arg(
            Arg::with_name("head")
                .long("head")
                .value_name("REV")
                .takes_value(true)
                .default_value("HEAD")
                .help("The newer revision to compare"),
        )
        .arg(
            Arg::with_name("base")
                .long("base")
                .value_name("REV")
                .takes_value(true)
                .default_value("HEAD~1")
                .help("The older revision to compare"),
        )
        .arg(
            Arg::with_name("file")
                .long("file")
                .value_name("PATH")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .help("Deploys this file instead of the ones changed in git (repeatable)"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .help("Increases log verbosity (repeatable)"),
        )
}

impl Config {
    /// Builds a [`Config`] from parsed arguments and the raw value of the
    /// token environment variable. A blank token is treated as absent.
    pub fn from_matches(matches: &ArgMatches, token: Option<String>) -> Result<Config> {
        // every argument read here has a default value
        fn value<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
            matches.value_of(name).unwrap_or_default()
        }

        let endpoint = value(matches, "endpoint");
        Ok(Config {
            root_directory: PathBuf::from(value(matches, "root")),
            articles_directory: PathBuf::from(value(matches, "articles")),
            endpoint: Url::parse(endpoint).map_err(|err| Error::InvalidEndpoint {
                endpoint: endpoint.to_owned(),
                err,
            })?,
            head: value(matches, "head").to_owned(),
            base: value(matches, "base").to_owned(),
            token: token.and_then(|t| ApiToken::new(t).ok()),
            files: matches
                .values_of("file")
                .map(|files| files.map(PathBuf::from).collect())
                .unwrap_or_default(),
        })
    }

    /// Reads the API key from the environment.
    pub fn token_from_env() -> Option<String> {
        std::env::var(TOKEN_VARIABLE).ok()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Returned when `--endpoint` isn't a valid URL.
    InvalidEndpoint {
        endpoint: String,
        err: url::ParseError,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidEndpoint { endpoint, err } => {
                write!(f, "Invalid endpoint `{}`: {}", endpoint, err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidEndpoint { endpoint: _, err } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn config(args: &[&str], token: Option<&str>) -> Result<Config> {
        let argv = std::iter::once("devto-deploy").chain(args.iter().copied());
        let matches = app().get_matches_from(argv);
        Config::from_matches(&matches, token.map(str::to_owned))
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let config = config(&[], Some("secret"))?;
        assert_eq!(config.root_directory, PathBuf::from("."));
        assert_eq!(config.articles_directory, PathBuf::from("content/articles"));
        assert_eq!(config.endpoint.as_str(), "https://dev.to/api/articles");
        assert_eq!(config.head, "HEAD");
        assert_eq!(config.base, "HEAD~1");
        assert_eq!(config.token.as_ref().map(ApiToken::as_str), Some("secret"));
        assert!(config.files.is_empty());
        Ok(())
    }

    #[test]
    fn test_overrides() -> Result<()> {
        let config = config(
            &[
                "--root",
                "/srv/blog",
                "--articles",
                "posts",
                "--endpoint",
                "http://localhost:3000/api/articles",
                "--base",
                "main",
                "--file",
                "posts/a.md",
                "--file",
                "posts/b.md",
            ],
            None,
        )?;
        assert_eq!(config.root_directory, PathBuf::from("/srv/blog"));
        assert_eq!(config.articles_directory, PathBuf::from("posts"));
        assert_eq!(config.endpoint.as_str(), "http://localhost:3000/api/articles");
        assert_eq!(config.base, "main");
        assert_eq!(
            config.files,
            vec![PathBuf::from("posts/a.md"), PathBuf::from("posts/b.md")]
        );
        assert!(config.token.is_none());
        Ok(())
    }

    #[test]
    fn test_blank_token_is_absent() -> Result<()> {
        assert!(config(&[], Some("   "))?.token.is_none());
        Ok(())
    }

    #[test]
    fn test_invalid_endpoint() {
        match config(&["--endpoint", "not a url"], None) {
            Err(Error::InvalidEndpoint { endpoint, .. }) => assert_eq!(endpoint, "not a url"),
            Ok(_) => panic!("expected an invalid endpoint error"),
        }
    }
}
