//! Conversions from documents, tags, and site options into template
//! [`Value`]s.

use crate::config::Config;
use crate::document::Document;
use crate::tag::{Tag, TagIndex};
use gtmpl_value::Value;
use std::collections::HashMap;

fn string(s: &str) -> Value {
    Value::String(s.to_owned())
}

fn optional(s: &Option<String>) -> Value {
    match s {
        Some(s) => string(s),
        None => Value::Nil,
    }
}

impl From<&Tag> for Value {
    /// Converts [`Tag`]s into [`Value`]s for templating.
    fn from(t: &Tag) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("name".to_owned(), string(&t.name));
        m.insert("slug".to_owned(), string(&t.slug));
        m.insert("display_name".to_owned(), string(&t.display_name));
        m.insert("description".to_owned(), string(&t.description));
        m.insert("color".to_owned(), optional(&t.color));
        m.insert("icon".to_owned(), optional(&t.icon));
        m.insert("featured".to_owned(), Value::Bool(t.featured));
        m.insert("order".to_owned(), Value::from(t.order));
        m.insert("count".to_owned(), Value::from(t.count as u64));
        m.insert("url".to_owned(), string(&t.url));
        Value::Object(m)
    }
}

/// Converts a list of tags.
pub fn tags(tags: &[Tag]) -> Value {
    Value::Array(tags.iter().map(Value::from).collect())
}

/// Converts a [`Document`], resolving its tag names against `index` into
/// the `processed_tags` field.
pub fn document(d: &Document, index: &TagIndex) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("title".to_owned(), string(&d.title));
    m.insert("slug".to_owned(), string(&d.slug));
    m.insert("date".to_owned(), string(&d.date));
    m.insert(
        "tags".to_owned(),
        Value::Array(d.tags.iter().map(|t| string(t)).collect()),
    );
    m.insert(
        "processed_tags".to_owned(),
        Value::Array(index.resolve(&d.tags).into_iter().map(Value::from).collect()),
    );
    m.insert("content".to_owned(), string(&d.body_html));
    m.insert("url".to_owned(), string(&d.url));
    m.insert("kind".to_owned(), string(d.kind.as_str()));
    Value::Object(m)
}

/// Converts a list of documents, keeping their order.
pub fn documents<'d, I>(documents: I, index: &TagIndex) -> Value
where
    I: IntoIterator<Item = &'d Document>,
{
    Value::Array(documents.into_iter().map(|d| document(d, index)).collect())
}

/// The `site` binding: the site's title, description, URL, and date format.
pub fn site(config: &Config) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("title".to_owned(), string(&config.site_title));
    m.insert("description".to_owned(), string(&config.site_description));
    m.insert("url".to_owned(), string(&config.site_url));
    m.insert("date_format".to_owned(), string(&config.date_format));
    Value::Object(m)
}
