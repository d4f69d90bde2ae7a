//! Defines the [`Document`] type, the in-memory form of one markdown source
//! file, along with the URL scheme and the date ordering used for listings.

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

/// Which content root a [`Document`] was loaded from. The kind decides the
/// document's URL and whether it takes part in tag indexing and the main
/// chronological listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    /// A dated post, listed on the index and on its tags' archive pages.
    Post,

    /// A standalone page such as "About". Nav documents are never indexed.
    Nav,
}

impl DocumentKind {
    /// The kind's name as exposed to templates.
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Post => "post",
            DocumentKind::Nav => "nav",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single markdown source file after loading.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// The title from the frontmatter, or the slug when none is declared.
    pub title: String,

    /// The source file's name without its extension.
    pub slug: String,

    /// The date from the frontmatter (typically `YYYY-MM-DD`), or empty.
    pub date: String,

    /// The tag names from the frontmatter, trimmed and without repeats.
    pub tags: Vec<String>,

    /// The body rendered to HTML.
    pub body_html: String,

    /// The site-relative URL of the rendered page; see [`Document::url_for`].
    pub url: String,

    pub kind: DocumentKind,

    /// The file this document was loaded from. Used for diagnostics.
    pub source: PathBuf,
}

impl Document {
    /// The URL for a document of `kind` with `slug`: posts live at
    /// `/posts/{slug}.html` and nav documents at `/{slug}.html`.
    pub fn url_for(kind: DocumentKind, slug: &str) -> String {
        match kind {
            DocumentKind::Post => format!("/posts/{}.html", slug),
            DocumentKind::Nav => format!("/{}.html", slug),
        }
    }

    /// The file the rendered page is written to beneath `output_root`.
    pub fn output_path(&self, output_root: &Path) -> PathBuf {
        output_path(output_root, &self.url)
    }
}

/// Joins a site-relative `url` onto `output_root`.
pub fn output_path(output_root: &Path, url: &str) -> PathBuf {
    output_root.join(url.trim_start_matches('/'))
}

/// Orders documents newest first. Dates compare as plain strings, which is
/// chronological for `YYYY-MM-DD`; the empty date is the smallest string, so
/// undated documents land after every dated one. Use with a stable sort so
/// ties keep their load order.
pub fn newest_first(a: &Document, b: &Document) -> Ordering {
    b.date.cmp(&a.date)
}

/// Sorts `documents` newest first in place, keeping load order among equal
/// dates.
pub fn sort_newest_first<D: AsRef<Document>>(documents: &mut [D]) {
    documents.sort_by(|a, b| newest_first(a.as_ref(), b.as_ref()));
}

impl AsRef<Document> for Document {
    fn as_ref(&self) -> &Document {
        self
    }
}

#[cfg(test)]
pub(crate) fn doc(slug: &str, date: &str, tags: &[&str]) -> Document {
    Document {
        title: slug.to_owned(),
        slug: slug.to_owned(),
        date: date.to_owned(),
        tags: tags.iter().map(|t| (*t).to_owned()).collect(),
        body_html: String::new(),
        url: Document::url_for(DocumentKind::Post, slug),
        kind: DocumentKind::Post,
        source: PathBuf::from(format!("{}.md", slug)),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_urls() {
        assert_eq!("/posts/hello.html", Document::url_for(DocumentKind::Post, "hello"));
        assert_eq!("/about.html", Document::url_for(DocumentKind::Nav, "about"));
    }

    #[test]
    fn test_output_path_strips_leading_slash() {
        assert_eq!(
            PathBuf::from("site/posts/hello.html"),
            output_path(Path::new("site"), "/posts/hello.html")
        );
    }

    #[test]
    fn test_sort_undated_last() {
        let mut docs = vec![
            doc("a", "2024-01-01", &[]),
            doc("b", "2024-06-01", &[]),
            doc("c", "", &[]),
        ];
        sort_newest_first(&mut docs);
        let dates: Vec<&str> = docs.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(vec!["2024-06-01", "2024-01-01", ""], dates);
    }

    #[test]
    fn test_sort_is_stable_for_equal_dates() {
        let mut docs = vec![
            doc("first", "2024-01-01", &[]),
            doc("undated-1", "", &[]),
            doc("second", "2024-01-01", &[]),
            doc("undated-2", "", &[]),
            doc("newer", "2024-02-01", &[]),
        ];
        sort_newest_first(&mut docs);
        let slugs: Vec<&str> = docs.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(vec!["newer", "first", "second", "undated-1", "undated-2"], slugs);
    }

    #[test]
    fn test_sort_references() {
        let a = doc("a", "2023-12-31", &[]);
        let b = doc("b", "2024-01-01", &[]);
        let mut refs = vec![&a, &b];
        sort_newest_first(&mut refs);
        assert_eq!("b", refs[0].slug);
    }
}
