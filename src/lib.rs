//! The library code for `devto-deploy`, which publishes the articles touched
//! by the latest commit of a blog repository to dev.to. A run is a single
//! pass through three steps:
//!
//! 1. Listing the article files that changed between `HEAD~1` and `HEAD`
//!    ([`crate::changes`])
//! 2. Parsing each article's frontmatter and, if it is marked `published`,
//!    posting the whole source file to the articles API
//!    ([`crate::article`], [`crate::publish`])
//! 3. Printing a line per article describing what happened
//!    ([`crate::report`])
//!
//! [`crate::deploy`] stitches these together. Publish calls for different
//! articles overlap, but the run doesn't finish until all of them have
//! settled. A problem with one article never stops the others; only failing
//! to list the changed files ends the run early.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod article;
pub mod changes;
pub mod config;
pub mod deploy;
pub mod publish;
pub mod report;
