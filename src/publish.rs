//! Support for sending articles to the dev.to articles API. The
//! [`PublishClient`] trait lets the deploy pipeline run without a network.

use std::fmt;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::debug;
use url::Url;

/// The articles endpoint used unless another one is configured.
pub const DEFAULT_ENDPOINT: &str = "https://dev.to/api/articles";

/// The environment variable holding the dev.to API key.
pub const TOKEN_VARIABLE: &str = "DEV_TOKEN";

/// The JSON body of a publish call:
/// `{"article": {"body_markdown": "..."}}`.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct PublishRequest {
    article: ArticlePayload,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
struct ArticlePayload {
    body_markdown: String,
}

impl PublishRequest {
    /// Wraps the full article source, frontmatter included. dev.to reads
    /// the title and publication state from the frontmatter itself.
    pub fn new(markdown: impl Into<String>) -> PublishRequest {
        PublishRequest {
            article: ArticlePayload {
                body_markdown: markdown.into(),
            },
        }
    }

    pub fn body_markdown(&self) -> &str {
        &self.article.body_markdown
    }
}

/// A non-empty API key.
#[derive(Clone)]
pub struct ApiToken(String);

impl ApiToken {
    /// Fails with [`Error::MissingCredential`] for empty or blank tokens.
    pub fn new(token: impl Into<String>) -> Result<ApiToken> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::MissingCredential);
        }
        Ok(ApiToken(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

/// Sends one article to the publishing platform and hands back whatever
/// JSON it answered with.
#[async_trait]
pub trait PublishClient: Send + Sync {
    async fn publish(&self, request: &PublishRequest) -> Result<serde_json::Value>;
}

/// Talks to the dev.to articles API.
pub struct DevToClient {
    http: reqwest::Client,
    endpoint: Url,
    token: Option<ApiToken>,
}

impl DevToClient {
    /// Constructs a client for `endpoint`. A missing token isn't an error
    /// until something is actually published.
    pub fn new(endpoint: Url, token: Option<ApiToken>) -> DevToClient {
        DevToClient {
            http: reqwest::Client::new(),
            endpoint,
            token,
        }
    }
}

#[async_trait]
impl PublishClient for DevToClient {
    async fn publish(&self, request: &PublishRequest) -> Result<serde_json::Value> {
        let token = self.token.as_ref().ok_or(Error::MissingCredential)?;

        debug!(endpoint = %self.endpoint, "posting article");
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header("api-key", token.as_str())
            .json(request)
            .send()
            .await?;

        // Error statuses still carry a JSON body describing the failure.
        debug!(status = response.status().as_u16(), "dev.to responded");
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error publishing a single article.
#[derive(Debug)]
pub enum Error {
    /// Returned when no API key is configured (or it is blank).
    MissingCredential,

    /// Returned for transport-level failures.
    Http(reqwest::Error),

    /// Returned when the response body isn't JSON.
    DecodeResponse(serde_json::Error),

    /// Returned when the publish task panicked or was cancelled.
    Interrupted(tokio::task::JoinError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingCredential => {
                write!(f, "Missing API key: set `{}`", TOKEN_VARIABLE)
            }
            Error::Http(err) => write!(f, "Calling the publishing API: {}", err),
            Error::DecodeResponse(err) => {
                write!(f, "Decoding the publishing API response: {}", err)
            }
            Error::Interrupted(err) => write!(f, "Publishing was interrupted: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingCredential => None,
            Error::Http(err) => Some(err),
            Error::DecodeResponse(err) => Some(err),
            Error::Interrupted(err) => Some(err),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Error {
        Error::Http(err)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Error {
        Error::Interrupted(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::DecodeResponse(err)
    }
}
