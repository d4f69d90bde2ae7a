//! Defines the [`Loader`] and its [`Error`] type: the logic for walking a
//! content root and turning every markdown file beneath it into a
//! [`Document`].

use crate::document::{Document, DocumentKind};
use crate::{frontmatter, markdown};
use log::{debug, info};
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Loads [`Document`]s of a single [`DocumentKind`] from a content root.
pub struct Loader {
    kind: DocumentKind,
}

impl Loader {
    /// Constructs a loader whose documents are all of `kind`.
    pub fn new(kind: DocumentKind) -> Loader {
        Loader { kind }
    }

    /// Recursively searches `root` for markdown files and loads each of them.
    /// Files are visited in file-name order so repeated runs see the same
    /// load order. Symlinked files are loaded; symlinked directories aren't
    /// descended into. A missing `root` yields no documents.
    pub fn load(&self, root: &Path) -> Result<Vec<Document>> {
        if !root.is_dir() {
            info!(
                "{} directory `{}` not found, skipping",
                self.kind,
                root.display()
            );
            return Ok(Vec::new());
        }

        let mut documents = Vec::new();
        let walker =
            WalkDir::new(root).sort_by(|a, b| a.file_name().cmp(b.file_name()));
        for result in walker {
            let entry = result?;
            // path().is_file() follows symlinks; file_type() doesn't.
            if entry.path().is_file() && is_markdown(entry.path()) {
                documents.push(self.load_document(entry.path())?);
            }
        }
        Ok(documents)
    }

    /// Reads and converts a single markdown file. The slug is the file stem;
    /// the title falls back to the slug and the date to the empty string.
    pub fn load_document(&self, path: &Path) -> Result<Document> {
        let slug = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| Error::InvalidFileName(path.to_owned()))?
            .to_owned();

        let contents = std::fs::read_to_string(path).map_err(|err| Error::Read {
            path: path.to_owned(),
            err,
        })?;
        Ok(self.parse_document(path, slug, &contents))
    }

    fn parse_document(&self, path: &Path, slug: String, contents: &str) -> Document {
        let (frontmatter, body) = frontmatter::extract(path, contents);

        let mut body_html = String::new();
        markdown::to_html(&mut body_html, body);

        let document = Document {
            title: frontmatter.title().unwrap_or_else(|| slug.clone()),
            date: frontmatter.date().unwrap_or_default(),
            tags: frontmatter.tags(),
            body_html,
            url: Document::url_for(self.kind, &slug),
            kind: self.kind,
            slug,
            source: path.to_owned(),
        };
        debug!(
            "Loaded {} `{}` from `{}`",
            document.kind,
            document.slug,
            path.display()
        );
        document
    }
}

fn is_markdown(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => MARKDOWN_EXTENSIONS.contains(&ext),
        None => false,
    }
}

/// Represents the result of a [`Document`]-load operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading [`Document`]s. Every variant is fatal for the
/// run.
#[derive(Debug)]
pub enum Error {
    /// Returned when a source file can't be read or isn't valid UTF-8.
    Read { path: PathBuf, err: std::io::Error },

    /// Returned when a source file's name isn't valid UTF-8.
    InvalidFileName(PathBuf),

    /// Returned for errors walking a content root.
    WalkDir(walkdir::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Read { path, err } => {
                write!(f, "Reading document `{}`: {}", path.display(), err)
            }
            Error::InvalidFileName(path) => {
                write!(f, "invalid file name: {:?}", path)
            }
            Error::WalkDir(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read { path: _, err } => Some(err),
            Error::InvalidFileName(_) => None,
            Error::WalkDir(err) => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator while walking content roots.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}
