//! Defines the [`Article`] and [`Error`] types along with the logic for
//! splitting an article source file into its YAML frontmatter and its body.
//! Each article file must be structured as follows:
//!
//! 1. Initial frontmatter fence (`---`) on the first line
//! 2. YAML frontmatter, typically with `title` and `published` fields
//! 3. Terminal frontmatter fence (`---`) on a line of its own
//! 4. Article body
//!
//! For example:
//!
//! ```md
//! ---
//! title: Hello
//! published: true
//! tags: [rust]
//! ---
//! Body text.
//! ```

use std::{
    collections::BTreeMap,
    fmt,
    fs::File,
    path::{Path, PathBuf},
};

use serde_yaml::Value;

/// The parsed frontmatter of an [`Article`]. Keys we don't care about are
/// kept as-is.
pub type Metadata = BTreeMap<String, Value>;

/// An article source file, read fresh from disk on each run.
#[derive(Clone, Debug, PartialEq)]
pub struct Article {
    /// The path of the file relative to the repository root. This is the
    /// article's only identity.
    pub path: PathBuf,

    /// The full file contents, frontmatter included. This is what gets
    /// published.
    pub raw: String,

    /// The parsed frontmatter.
    pub metadata: Metadata,

    /// Everything after the terminal frontmatter fence.
    pub body: String,
}

impl Article {
    /// Reads `{root}/{path}` and parses it. The resulting article is
    /// identified by `path`, not by the joined path.
    pub fn load(root: &Path, path: &Path) -> Result<Article> {
        use std::io::Read;
        let mut raw = String::new();
        File::open(root.join(path))?.read_to_string(&mut raw)?;
        Article::parse(path, raw)
    }

    /// Parses an article from its raw source text.
    pub fn parse(path: &Path, raw: String) -> Result<Article> {
        let (yaml_start, yaml_stop, body_start) = frontmatter_indices(&raw)?;
        let yaml = &raw[yaml_start..yaml_stop];
        let metadata: Metadata = if yaml.trim().is_empty() {
            Metadata::new()
        } else {
            serde_yaml::from_str(yaml)?
        };
        let body = raw[body_start..].to_owned();
        Ok(Article {
            path: path.to_owned(),
            raw,
            metadata,
            body,
        })
    }

    /// Returns the `title` field rendered as text, if it is a scalar.
    pub fn title(&self) -> Option<String> {
        match self.metadata.get("title")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Returns the title for console output, falling back to the file path
    /// for untitled articles.
    pub fn display_title(&self) -> String {
        self.title().unwrap_or_else(|| self.path.display().to_string())
    }

    /// Reports whether the `published` field is truthy. Absent, `null`,
    /// `false` (in any of its YAML spellings), zero, NaN and the empty string
    /// are all falsy.
    pub fn is_published(&self) -> bool {
        self.metadata.get("published").map_or(false, truthy)
    }

    /// Consumes the article, returning the raw file contents.
    pub fn into_raw(self) -> String {
        self.raw
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(_) | Value::Mapping(_) => true,
        Value::Tagged(tagged) => truthy(&tagged.value),
    }
}

// Returns (yaml_start, yaml_stop, body_start). Fences must occupy a whole
// line; a trailing `\r` and a leading byte order mark are tolerated.
fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
    const FENCE: &str = "---";
    const BOM: char = '\u{feff}';

    let start = if input.starts_with(BOM) { BOM.len_utf8() } else { 0 };
    let first_line_end = input[start..]
        .find('\n')
        .map_or(input.len(), |i| start + i + 1);
    if input[start..first_line_end].trim_end() != FENCE {
        return Err(Error::FrontmatterMissingStartFence);
    }

    let mut offset = first_line_end;
    for line in input[first_line_end..].split_inclusive('\n') {
        if line.trim_end() == FENCE {
            return Ok((first_line_end, offset, offset + line.len()));
        }
        offset += line.len();
    }
    Err(Error::FrontmatterMissingEndFence)
}

/// Represents the result of an [`Article`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error reading or parsing an [`Article`].
#[derive(Debug)]
pub enum Error {
    /// Returned when an article source file doesn't begin with a frontmatter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when the starting fence was found but the terminal one was
    /// missing.
    FrontmatterMissingEndFence,

    /// Returned when the frontmatter isn't a YAML mapping.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when the file can't be opened or isn't valid UTF-8.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "Article must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => {
                write!(f, "Parsing frontmatter: {}", err)
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    // use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
