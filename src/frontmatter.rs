//! Defines the [`Frontmatter`] record and the logic for splitting it off the
//! top of a markdown source file. A frontmatter block is a `---` line, a YAML
//! mapping, and a closing `---` line, anchored at the very start of the file:
//!
//! ```md
//! ---
//! title: Hello, world!
//! date: 2021-04-16
//! tags: [greet, meta]
//! ---
//! # Hello
//! ```
//!
//! Only `title`, `date`, and `tags` are interpreted; any other keys are
//! ignored.

use log::warn;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

const FENCE: &str = "---";

/// The metadata parsed from a document's frontmatter block. Every field is
/// optional; see [`Frontmatter::title`], [`Frontmatter::date`], and
/// [`Frontmatter::tags`] for how missing values default.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Frontmatter {
    #[serde(default)]
    title: Option<Scalar>,

    #[serde(default)]
    date: Option<Scalar>,

    #[serde(default)]
    tags: Option<Tags>,
}

/// A YAML scalar. Authors write `title: 1984` or `date: 2024-01-01` without
/// quoting, so every scalar type is accepted and rendered back as text.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Scalar::Bool(b) => b.fmt(f),
            Scalar::Integer(i) => i.fmt(f),
            Scalar::Float(x) => x.fmt(f),
            Scalar::String(s) => s.fmt(f),
        }
    }
}

/// The `tags` key accepts either a YAML list or a single comma-separated
/// string (`tags: "rust, web"`).
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Tags {
    List(Vec<Scalar>),
    Single(Scalar),
}

impl Frontmatter {
    /// The declared title, if any.
    pub fn title(&self) -> Option<String> {
        self.title.as_ref().map(Scalar::to_string)
    }

    /// The declared date, if any. No filesystem timestamp is ever substituted.
    pub fn date(&self) -> Option<String> {
        self.date.as_ref().map(Scalar::to_string)
    }

    /// The declared tags normalized to a list: comma-separated strings are
    /// split, every name is whitespace-trimmed, empty names are dropped, and
    /// repeats collapse onto their first occurrence.
    pub fn tags(&self) -> Vec<String> {
        let names: Vec<String> = match &self.tags {
            None => Vec::new(),
            Some(Tags::List(items)) => {
                items.iter().map(|s| s.to_string()).collect()
            }
            Some(Tags::Single(Scalar::String(s))) => {
                s.split(',').map(str::to_owned).collect()
            }
            Some(Tags::Single(scalar)) => vec![scalar.to_string()],
        };

        let mut tags: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.trim();
            if !name.is_empty() && !tags.iter().any(|t| t == name) {
                tags.push(name.to_owned());
            }
        }
        tags
    }
}

/// Splits `input` into the raw YAML between the fences and the body that
/// follows the closing fence. Returns `None` when the file doesn't open with a
/// fence line or when the closing fence is missing.
pub fn split(input: &str) -> Option<(&str, &str)> {
    let first_end = input.find('\n')?;
    if input[..first_end].trim_end() != FENCE {
        return None;
    }

    let rest = &input[first_end + 1..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Parses the YAML between the fences. A block holding nothing but blank
/// lines, comments, or a null is an empty [`Frontmatter`].
pub fn parse(yaml: &str) -> Result<Frontmatter, serde_yaml::Error> {
    if is_blank(yaml) {
        return Ok(Frontmatter::default());
    }
    let frontmatter: Option<Frontmatter> = serde_yaml::from_str(yaml)?;
    Ok(frontmatter.unwrap_or_default())
}

/// Reports whether a YAML document has no content at all, i.e. every line is
/// blank or a comment. serde_yaml rejects such documents with an
/// end-of-stream error rather than reading them as null.
pub(crate) fn is_blank(yaml: &str) -> bool {
    yaml.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

/// Extracts the frontmatter from a source file's contents. Never fails: a
/// file without a (balanced) frontmatter block yields empty metadata and the
/// whole input as body, and a block that doesn't parse as YAML is logged and
/// likewise treated as absent. `path` is only used for the diagnostic.
pub fn extract<'a>(path: &Path, input: &'a str) -> (Frontmatter, &'a str) {
    match split(input) {
        None => (Frontmatter::default(), input),
        Some((yaml, body)) => match parse(yaml) {
            Ok(frontmatter) => (frontmatter, body),
            Err(err) => {
                warn!("Parsing frontmatter in `{}`: {}", path.display(), err);
                (Frontmatter::default(), input)
            }
        },
    }
}
