//! Defines the [`Writer`], which templates and writes every page of the site:
//! one page per post and nav document, one archive page per tag, the index
//! page, and the optional tags overview page.

use crate::document::{output_path, sort_newest_first, Document};
use crate::tag::TagIndex;
use crate::template::{Error as TemplateError, PageTemplate};
use crate::value;
use gtmpl_value::Value;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The templates for each kind of page.
pub struct Templates {
    pub post: PageTemplate,
    pub nav: PageTemplate,
    pub tag: PageTemplate,
    pub index: PageTemplate,

    /// `None` when the site has no tags overview page.
    pub tags: Option<PageTemplate>,
}

/// Responsible for templating and writing HTML pages to disk from
/// [`Document`] sources.
pub struct Writer<'a> {
    pub templates: &'a Templates,

    /// The `site` binding, shared by every page.
    pub site: Value,

    /// The root of the output tree. Page URLs are joined onto it.
    pub output_directory: &'a Path,
}

impl Writer<'_> {
    /// Writes all pages. `posts` must already be sorted newest first; `nav`
    /// is written in load order. Returns the number of pages written.
    pub fn write_site(
        &self,
        posts: &[Document],
        nav: &[Document],
        index: &TagIndex,
    ) -> Result<usize> {
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        let mut written: HashMap<PathBuf, String> = HashMap::new();
        let pages = self.pages(posts, nav, index);
        let count = pages.len();

        for page in pages {
            if let Some(dir) = page.file_path.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    std::fs::create_dir_all(dir).map_err(|err| Error::Io {
                        path: dir.to_owned(),
                        err,
                    })?;
                }
            }
            let previous =
                written.insert(page.file_path.clone(), page.source.clone());
            if let Some(previous) = previous {
                warn!(
                    "{} overwrites {} at `{}`",
                    page.source,
                    previous,
                    page.file_path.display()
                );
            }
            self.write_page(&page)?;
        }
        Ok(count)
    }

    /// Takes a single [`Page`], templates it, and writes it to disk.
    fn write_page(&self, page: &Page) -> Result<()> {
        let html = page.template.render(page.value.clone()).map_err(|err| Error::Render {
            page: page.file_path.clone(),
            err,
        })?;
        std::fs::write(&page.file_path, html).map_err(|err| Error::Io {
            path: page.file_path.clone(),
            err,
        })?;
        debug!("Wrote `{}`", page.file_path.display());
        Ok(())
    }

    /// Builds every [`Page`] of the site. The bindings shared by all pages
    /// (`site`, `posts`, `tags`, `nav`) are converted once up front.
    fn pages<'p>(
        &'p self,
        posts: &[Document],
        nav: &[Document],
        index: &TagIndex,
    ) -> Vec<Page<'p>> {
        let common = Bindings {
            site: self.site.clone(),
            posts: value::documents(posts, index),
            tags: value::tags(index.tags()),
            nav: value::documents(nav, index),
        };

        let mut pages =
            Vec::with_capacity(posts.len() + nav.len() + index.tags().len() + 2);

        let kinds = [(posts, &self.templates.post), (nav, &self.templates.nav)];
        for (documents, template) in kinds {
            for document in documents {
                let mut m = common.to_map();
                m.insert("post".to_owned(), value::document(document, index));
                pages.push(Page {
                    value: Value::Object(m),
                    file_path: document.output_path(self.output_directory),
                    template,
                    source: format!("{} `{}`", document.kind, document.source.display()),
                });
            }
        }

        for tag in index.tags() {
            let mut members = index.posts(&tag.name).to_vec();
            sort_newest_first(&mut members);

            let mut m = common.to_map();
            m.insert("tag".to_owned(), Value::from(tag));
            m.insert("all_posts".to_owned(), common.posts.clone());
            m.insert("posts".to_owned(), value::documents(members, index));
            pages.push(Page {
                value: Value::Object(m),
                file_path: output_path(self.output_directory, &tag.url),
                template: &self.templates.tag,
                source: format!("tag `{}`", tag.name),
            });
        }

        pages.push(Page {
            value: Value::Object(common.to_map()),
            file_path: self.output_directory.join("index.html"),
            template: &self.templates.index,
            source: String::from("index page"),
        });

        if let Some(template) = &self.templates.tags {
            pages.push(Page {
                value: Value::Object(common.to_map()),
                file_path: self.output_directory.join("tags.html"),
                template,
                source: String::from("tags overview page"),
            });
        }

        pages
    }
}

/// The template bindings every page receives.
struct Bindings {
    site: Value,
    posts: Value,
    tags: Value,
    nav: Value,
}

impl Bindings {
    fn to_map(&self) -> HashMap<String, Value> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("site".to_owned(), self.site.clone());
        m.insert("posts".to_owned(), self.posts.clone());
        m.insert("tags".to_owned(), self.tags.clone());
        m.insert("nav".to_owned(), self.nav.clone());
        m
    }
}

/// An output HTML file: the value to template, where to write the result,
/// and which template to apply.
struct Page<'a> {
    value: Value,
    file_path: PathBuf,
    template: &'a PageTemplate,

    /// Describes what produced the page, for diagnostics.
    source: String,
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error applying a template to a page.
    Render { page: PathBuf, err: TemplateError },

    /// An error writing an output file or creating its directory.
    Io { path: PathBuf, err: io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Render { page, err } => {
                write!(f, "Rendering `{}`: {}", page.display(), err)
            }
            Error::Io { path, err } => write!(f, "Writing `{}`: {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Render { page: _, err } => Some(err),
            Error::Io { path: _, err } => Some(err),
        }
    }
}
