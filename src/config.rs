//! Defines the site [`Config`]. Every option has a default; a `site.yaml`
//! project file may override any of them, and relative paths in it resolve
//! against the file's directory.

use crate::frontmatter::is_blank;
use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The project file [`Config::from_directory`] searches for.
pub const PROJECT_FILE: &str = "site.yaml";

/// Build options. Constructed once at startup and only ever read after that.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// The root searched recursively for post documents.
    pub content_dir: PathBuf,

    /// The root searched recursively for standalone nav documents.
    pub nav_dir: PathBuf,

    /// Copied verbatim to `{output_dir}/static` when it exists.
    pub static_dir: PathBuf,

    /// Deleted and regenerated on every build.
    pub output_dir: PathBuf,

    pub template_dir: PathBuf,

    /// Template file names, relative to `template_dir`.
    pub post_template: String,
    pub nav_template: String,
    pub tag_template: String,
    pub index_template: String,

    /// The tags overview page is only rendered when this template exists.
    pub tags_template: String,

    pub site_title: String,
    pub site_description: String,
    pub site_url: String,

    /// Made available to templates as `.site.date_format`.
    pub date_format: String,

    /// The optional tag metadata table.
    pub tags_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            content_dir: PathBuf::from("content/posts"),
            nav_dir: PathBuf::from("content/nav"),
            static_dir: PathBuf::from("static"),
            output_dir: PathBuf::from("site"),
            template_dir: PathBuf::from("templates"),
            post_template: String::from("post.html"),
            nav_template: String::from("post.html"),
            tag_template: String::from("tag.html"),
            index_template: String::from("index.html"),
            tags_template: String::from("tags.html"),
            site_title: String::from("My Website"),
            site_description: String::from("A tagged website"),
            site_url: String::from("https://example.com"),
            date_format: String::from("%Y-%m-%d"),
            tags_file: PathBuf::from("tags.yaml"),
        }
    }
}

impl Config {
    /// Looks for a [`PROJECT_FILE`] in `dir` and then in each of its
    /// ancestors, loading the first one found. Without a project file the
    /// defaults apply, relative to `dir`.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        for ancestor in dir.ancestors() {
            let path = ancestor.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path);
            }
        }
        Ok(Config::default().rooted_at(dir))
    }

    /// Loads the project file at `path`.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Opening project file `{}`: {}", path.display(), e))?;
        let config = Config::from_yaml(&contents).map_err(|e| {
            anyhow!("Loading configuration from `{}`: {}", path.display(), e)
        })?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Ok(config.rooted_at(project_root)),
        }
    }

    /// Parses options from YAML, filling in defaults for anything missing.
    /// Unknown keys are ignored.
    pub fn from_yaml(yaml: &str) -> Result<Config> {
        if is_blank(yaml) {
            return Ok(Config::default());
        }
        let config: Option<Config> = serde_yaml::from_str(yaml)?;
        Ok(config.unwrap_or_default())
    }

    /// Resolves every relative path against `root`.
    pub fn rooted_at(mut self, root: &Path) -> Config {
        for path in [
            &mut self.content_dir,
            &mut self.nav_dir,
            &mut self.static_dir,
            &mut self.output_dir,
            &mut self.template_dir,
            &mut self.tags_file,
        ] {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
        self
    }

    /// The path of the template file called `name`.
    pub fn template_path(&self, name: &str) -> PathBuf {
        self.template_dir.join(name)
    }
}
