//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: loading the posts and nav
//! documents ([`crate::loader`]), indexing the posts by tag
//! ([`crate::tag`]), rendering every page ([`crate::write`]), and copying
//! the static source directory into the output directory.

use crate::config::Config;
use crate::document::{sort_newest_first, DocumentKind};
use crate::loader::{Error as LoadError, Loader};
use crate::tag::{self, TagIndex};
use crate::template::{Error as TemplateError, PageTemplate};
use crate::value;
use crate::write::{Error as WriteError, Templates, Writer};
use log::info;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What a build produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    pub posts: usize,
    pub nav: usize,
    pub tags: usize,
    pub pages: usize,
}

/// Builds the site described by `config`. The output directory is deleted
/// and regenerated from scratch, so two builds must never target the same
/// output directory at the same time.
pub fn build_site(config: &Config) -> Result<Summary> {
    // collect all documents
    let mut posts = Loader::new(DocumentKind::Post).load(&config.content_dir)?;
    let nav = Loader::new(DocumentKind::Nav).load(&config.nav_dir)?;
    sort_newest_first(&mut posts);

    let metadata = tag::load_metadata(&config.tags_file);
    let index = TagIndex::build(&posts, &metadata);

    // Parse the template files before touching the output directory.
    let templates = load_templates(config)?;

    rmdir(&config.output_dir)?;
    std::fs::create_dir_all(&config.output_dir).map_err(|err| Error::Clean {
        path: config.output_dir.clone(),
        err,
    })?;

    let writer = Writer {
        templates: &templates,
        site: value::site(config),
        output_directory: &config.output_dir,
    };
    let pages = writer.write_site(&posts, &nav, &index)?;

    publish_static(&config.static_dir, &config.output_dir.join("static"))?;

    Ok(Summary {
        posts: posts.len(),
        nav: nav.len(),
        tags: index.tags().len(),
        pages,
    })
}

fn load_templates(config: &Config) -> Result<Templates> {
    let load = |name: &str| PageTemplate::load(&config.template_path(name));

    let tags_path = config.template_path(&config.tags_template);
    let tags = if tags_path.is_file() {
        Some(PageTemplate::load(&tags_path)?)
    } else {
        info!(
            "Tags template `{}` not found, skipping the tags overview page",
            tags_path.display()
        );
        None
    };

    Ok(Templates {
        post: load(&config.post_template)?,
        nav: load(&config.nav_template)?,
        tag: load(&config.tag_template)?,
        index: load(&config.index_template)?,
        tags,
    })
}

/// Recursively copies the contents of `src` into `dst`, overwriting files
/// that already exist. A missing `src` is skipped.
pub fn publish_static(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_dir() {
        info!(
            "Static directory `{}` not found, skipping",
            src.display()
        );
        return Ok(());
    }

    for result in WalkDir::new(src).sort_by(|a, b| a.file_name().cmp(b.file_name())) {
        let entry = result.map_err(Error::WalkDir)?;
        // strip_prefix() can't fail; every entry lives beneath `src`
        let target = match entry.path().strip_prefix(src) {
            Ok(relative) => dst.join(relative),
            Err(_) => continue,
        };
        let copied = if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)
        } else {
            std::fs::copy(entry.path(), &target).map(|_| ())
        };
        copied.map_err(|err| Error::Copy {
            path: entry.path().to_owned(),
            err,
        })?;
    }
    info!("Copied static files from `{}`", src.display());
    Ok(())
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during loading,
/// templating, writing, cleaning the output directory, and copying static
/// files.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading documents.
    Load(LoadError),

    /// Returned for errors loading or parsing template files.
    Template(TemplateError),

    /// Returned for errors writing pages to disk.
    Write(WriteError),

    /// Returned for I/O problems while cleaning the output directory.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while copying static files.
    Copy { path: PathBuf, err: std::io::Error },

    /// Returned for errors walking the static directory.
    WalkDir(walkdir::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Load(err) => err.fmt(f),
            Error::Template(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::Copy { path, err } => {
                write!(f, "Copying static file '{}': {}", path.display(), err)
            }
            Error::WalkDir(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Load(err) => Some(err),
            Error::Template(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::Copy { path: _, err } => Some(err),
            Error::WalkDir(err) => Some(err),
        }
    }
}

impl From<LoadError> for Error {
    /// Converts [`LoadError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: LoadError) -> Error {
        Error::Load(err)
    }
}

impl From<TemplateError> for Error {
    /// Converts [`TemplateError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: TemplateError) -> Error {
        Error::Template(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}
