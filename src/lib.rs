//! The library code for the `tagsite` static site generator. A build is a
//! single pass through four steps, driven by [`build::build_site`]:
//!
//! 1. Loading documents from disk ([`crate::loader`]). Each markdown file has
//!    its frontmatter split off ([`crate::frontmatter`]) and its body
//!    converted to HTML ([`crate::markdown`]).
//! 2. Indexing the posts by tag ([`crate::tag`]), merging in the optional tag
//!    metadata table.
//! 3. Rendering pages through templates ([`crate::write`]): a page per post
//!    and nav document, an archive page per tag, the index page, and an
//!    optional tags overview page. Templates can call the `date` and
//!    `excerpt` functions ([`crate::template`], [`crate::excerpt`]).
//! 4. Copying the static assets directory into the output tree.
//!
//! Nothing is cached between runs; the output directory is rebuilt from
//! scratch every time.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod document;
pub mod excerpt;
pub mod frontmatter;
pub mod loader;
pub mod markdown;
pub mod tag;
pub mod template;
pub mod value;
pub mod write;
