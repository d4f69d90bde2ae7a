//! Defines the [`Tag`] type, the optional tag metadata table, and the
//! [`TagIndex`] which groups posts by the tags they carry.

use crate::document::{Document, DocumentKind};
use crate::frontmatter::is_blank;
use log::{error, info};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// The sort weight for tags without a declared `order`.
pub const DEFAULT_ORDER: i64 = 999;

/// Converts a tag name into its URL slug: lowercase, with every space
/// replaced by a hyphen. Slugifying a slug returns it unchanged.
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// The URL of the archive page for the tag with `slug`.
pub fn url_for(slug: &str) -> String {
    format!("/tags/{}.html", slug)
}

/// Display overrides for a tag, as declared in the tags file. Every field is
/// optional.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct TagMetadata {
    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub color: Option<String>,

    #[serde(default)]
    pub icon: Option<String>,

    #[serde(default)]
    pub featured: bool,

    #[serde(default = "default_order")]
    pub order: i64,
}

fn default_order() -> i64 {
    DEFAULT_ORDER
}

/// Tag metadata keyed by exact tag name. Names are matched case-sensitively,
/// so `Go` in a post never picks up an entry declared as `go`.
pub type TagMetadataTable = BTreeMap<String, TagMetadata>;

/// Loads the tag metadata table from the YAML file at `path`. The file is
/// optional: a missing file is logged and yields an empty table, and so does
/// a file that can't be read or parsed.
pub fn load_metadata(path: &Path) -> TagMetadataTable {
    if !path.is_file() {
        info!(
            "Tags file `{}` not found, proceeding without tag metadata",
            path.display()
        );
        return TagMetadataTable::new();
    }

    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|contents| parse_metadata(&contents).map_err(|e| e.to_string()));
    match parsed {
        Ok(table) => {
            info!(
                "Loaded metadata for {} tags from `{}`",
                table.len(),
                path.display()
            );
            table
        }
        Err(err) => {
            error!("Loading tag metadata from `{}`: {}", path.display(), err);
            TagMetadataTable::new()
        }
    }
}

/// Parses a tag metadata table from YAML. An empty or comment-only document
/// is an empty table.
pub fn parse_metadata(yaml: &str) -> Result<TagMetadataTable, serde_yaml::Error> {
    if is_blank(yaml) {
        return Ok(TagMetadataTable::new());
    }
    let table: Option<TagMetadataTable> = serde_yaml::from_str(yaml)?;
    Ok(table.unwrap_or_default())
}

/// A tag used by at least one post.
#[derive(Clone, Debug, PartialEq)]
pub struct Tag {
    /// The tag's name exactly as written in the posts.
    pub name: String,

    /// See [`slugify`].
    pub slug: String,

    /// The declared display name, or the tag's name.
    pub display_name: String,

    /// The declared description, or empty.
    pub description: String,

    pub color: Option<String>,

    pub icon: Option<String>,

    pub featured: bool,

    /// A sort weight for templates. The tag list itself is never sorted by
    /// it.
    pub order: i64,

    /// The number of posts carrying this tag.
    pub count: usize,

    /// The archive page URL; see [`url_for`].
    pub url: String,
}

impl Tag {
    /// Builds the tag for `name`, applying the overrides in `metadata` where
    /// present. The count starts at zero.
    pub fn new(name: &str, metadata: Option<&TagMetadata>) -> Tag {
        let slug = slugify(name);
        Tag {
            name: name.to_owned(),
            url: url_for(&slug),
            slug,
            display_name: metadata
                .and_then(|m| m.display_name.clone())
                .unwrap_or_else(|| name.to_owned()),
            description: metadata
                .and_then(|m| m.description.clone())
                .unwrap_or_default(),
            color: metadata.and_then(|m| m.color.clone()),
            icon: metadata.and_then(|m| m.icon.clone()),
            featured: metadata.map_or(false, |m| m.featured),
            order: metadata.map_or(DEFAULT_ORDER, |m| m.order),
            count: 0,
        }
    }
}

/// Every tag used by a set of posts, together with the posts carrying each
/// tag. Tags keep the order in which they were first seen.
pub struct TagIndex<'a> {
    tags: Vec<Tag>,
    posts: HashMap<String, Vec<&'a Document>>,
}

impl<'a> TagIndex<'a> {
    /// Indexes `documents` by tag name. Only [`DocumentKind::Post`]
    /// documents are indexed, and only tags that at least one post uses are
    /// emitted; metadata entries for unused tags are ignored.
    pub fn build(documents: &'a [Document], metadata: &TagMetadataTable) -> TagIndex<'a> {
        let mut tags: Vec<Tag> = Vec::new();
        let mut posts: HashMap<String, Vec<&'a Document>> = HashMap::new();

        for document in documents.iter().filter(|d| d.kind == DocumentKind::Post) {
            for name in document.tags.iter() {
                match posts.get_mut(name) {
                    Some(members) => members.push(document),
                    None => {
                        tags.push(Tag::new(name, metadata.get(name)));
                        posts.insert(name.to_owned(), vec![document]);
                    }
                }
            }
        }

        for tag in tags.iter_mut() {
            tag.count = posts.get(&tag.name).map_or(0, Vec::len);
        }

        TagIndex { tags, posts }
    }

    /// All tags in first-seen order.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name == name)
    }

    /// The posts carrying the tag `name`, in load order.
    pub fn posts(&self, name: &str) -> &[&'a Document] {
        match self.posts.get(name) {
            Some(members) => members.as_slice(),
            None => &[],
        }
    }

    /// Looks up the [`Tag`]s for a document's tag names, skipping names that
    /// aren't indexed (e.g., the tags of a nav document that no post uses).
    pub fn resolve(&self, names: &[String]) -> Vec<&Tag> {
        names.iter().filter_map(|name| self.get(name)).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::doc;

    #[test]
    fn test_slugify() {
        assert_eq!("machine-learning", slugify("Machine Learning"));
        assert_eq!("rust", slugify("Rust"));
        for name in &["Machine Learning", "a  b", "C++ Tips", "already-slugged"] {
            let slug = slugify(name);
            assert_eq!(slug, slugify(&slug));
        }
    }

    #[test]
    fn test_counts_and_membership() {
        let posts = vec![doc("a", "2024-03-01", &["x", "y"]), doc("b", "", &["x"])];
        let index = TagIndex::build(&posts, &TagMetadataTable::new());

        let names: Vec<&str> = index.tags().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(vec!["x", "y"], names);
        assert_eq!(2, index.get("x").unwrap().count);
        assert_eq!(1, index.get("y").unwrap().count);

        let members: Vec<&str> =
            index.posts("y").iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(vec!["a"], members);
        assert!(index.posts("z").is_empty());
    }

    #[test]
    fn test_counts_are_case_sensitive() {
        let posts = vec![
            doc("a", "", &["Go"]),
            doc("b", "", &["go"]),
            doc("c", "", &["go"]),
        ];
        let index = TagIndex::build(&posts, &TagMetadataTable::new());
        assert_eq!(1, index.get("Go").unwrap().count);
        assert_eq!(2, index.get("go").unwrap().count);
    }

    #[test]
    fn test_untagged_and_nav_documents_not_indexed() {
        let mut about = doc("about", "", &["x"]);
        about.kind = DocumentKind::Nav;
        let posts = vec![doc("plain", "", &[]), about];
        let index = TagIndex::build(&posts, &TagMetadataTable::new());
        assert!(index.tags().is_empty());
    }

    #[test]
    fn test_metadata_merge() -> Result<(), serde_yaml::Error> {
        let metadata = parse_metadata(concat!(
            "Rust:\n",
            "  display_name: The Rust Language\n",
            "  color: \"#dea584\"\n",
            "  featured: true\n",
            "  order: 1\n",
            "rust:\n",
            "  description: lowercase entry\n",
            "unused:\n",
            "  description: nobody uses me\n",
        ))?;
        let posts = vec![doc("a", "", &["Rust", "web dev"])];
        let index = TagIndex::build(&posts, &metadata);

        let rust = index.get("Rust").unwrap();
        assert_eq!("The Rust Language", rust.display_name);
        assert_eq!("", rust.description);
        assert_eq!(Some(String::from("#dea584")), rust.color);
        assert!(rust.featured);
        assert_eq!(1, rust.order);
        assert_eq!("/tags/rust.html", rust.url);

        let web = index.get("web dev").unwrap();
        assert_eq!("web dev", web.display_name);
        assert_eq!("web-dev", web.slug);
        assert_eq!(None, web.icon);
        assert!(!web.featured);
        assert_eq!(DEFAULT_ORDER, web.order);

        assert!(index.get("unused").is_none());
        Ok(())
    }

    #[test]
    fn test_empty_metadata_file() -> Result<(), serde_yaml::Error> {
        assert!(parse_metadata("").unwrap().is_empty());
        assert!(parse_metadata("~\n")?.is_empty());
        assert!(parse_metadata("# no tags declared yet\n")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_comment_only_metadata_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tags.yaml");
        std::fs::write(&path, "# rust:\n#   display_name: Rust\n")?;
        assert!(load_metadata(&path).is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_metadata_file() {
        assert!(load_metadata(Path::new("does/not/exist.yaml")).is_empty());
    }

    #[test]
    fn test_resolve_skips_unknown() {
        let posts = vec![doc("a", "", &["x"])];
        let index = TagIndex::build(&posts, &TagMetadataTable::new());
        let names = vec![String::from("x"), String::from("nope")];
        let resolved: Vec<&str> =
            index.resolve(&names).iter().map(|t| t.name.as_str()).collect();
        assert_eq!(vec!["x"], resolved);
    }
}
