//! Loads page templates and defines the functions every template can call.
//!
//! Templates use [`gtmpl`]'s Go-style syntax. Two functions are registered
//! on top of the builtins:
//!
//! * `date VALUE [PATTERN]` formats a `YYYY-MM-DD` date (or a
//!   `YYYY-MM-DDTHH:MM:SS` timestamp) with a strftime-style pattern, e.g.
//!   `{{ date .post.date "%B %e, %Y" }}`. Anything that doesn't parse is
//!   returned unchanged.
//! * `excerpt HTML [BUDGET]` returns an HTML-safe excerpt of roughly
//!   `BUDGET` visible characters (default [`DEFAULT_EXCERPT_LENGTH`]), e.g.
//!   `{{ excerpt .content 300 }}`. See [`crate::excerpt`].

use crate::excerpt::truncate_html;
use chrono::{NaiveDate, NaiveDateTime};
use gtmpl::{Context, Template};
use gtmpl_value::{Func, Value};
use std::fmt;
use std::path::{Path, PathBuf};

/// The pattern `date` uses when none is passed.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// The budget `excerpt` uses when none is passed.
pub const DEFAULT_EXCERPT_LENGTH: usize = 200;

const FUNCS: &[(&str, Func)] = &[("date", date as Func), ("excerpt", excerpt as Func)];

/// A parsed template along with the file it came from.
pub struct PageTemplate {
    path: PathBuf,
    template: Template,
}

impl PageTemplate {
    /// Reads and parses the template file at `path`, registering the `date`
    /// and `excerpt` functions first so the parser can resolve them.
    pub fn load(path: &Path) -> Result<PageTemplate> {
        let contents = std::fs::read_to_string(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        PageTemplate::parse(path, &contents)
    }

    /// Parses template source text. `path` only identifies the template in
    /// errors.
    pub fn parse(path: &Path, contents: &str) -> Result<PageTemplate> {
        let mut template = Template::default();
        for (name, func) in FUNCS {
            template.add_func(name, *func);
        }
        template.parse(contents).map_err(|err| Error::Parse {
            path: path.to_owned(),
            err,
        })?;
        Ok(PageTemplate {
            path: path.to_owned(),
            template,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies the template to `value`.
    pub fn render(&self, value: Value) -> Result<String> {
        let execute_error = |err| Error::Execute {
            path: self.path.clone(),
            err,
        };
        let context = Context::from(value).map_err(execute_error)?;
        self.template.render(&context).map_err(execute_error)
    }
}

/// Formats `value` as a date using the strftime-style `pattern`. Values that
/// aren't a `YYYY-MM-DD` date or a `YYYY-MM-DDTHH:MM:SS` timestamp, and
/// patterns chrono can't format, leave `value` unchanged.
pub fn format_date(value: &str, pattern: &str) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let written = if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        write!(out, "{}", date.format(pattern))
    } else if let Ok(datetime) =
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
    {
        write!(out, "{}", datetime.format(pattern))
    } else {
        return value.to_owned();
    };

    match written {
        Ok(()) => out,
        Err(_) => value.to_owned(),
    }
}

/// The `date` template function. Non-string values pass through.
fn date(args: &[Value]) -> std::result::Result<Value, String> {
    let value = args
        .get(0)
        .ok_or_else(|| String::from("date: expected a value to format"))?;
    let pattern = match args.get(1) {
        None => DEFAULT_DATE_FORMAT,
        Some(Value::String(pattern)) => pattern.as_str(),
        Some(_) => return Err(String::from("date: pattern must be a string")),
    };
    Ok(match value {
        Value::String(s) => Value::String(format_date(s, pattern)),
        other => other.clone(),
    })
}

/// The `excerpt` template function.
fn excerpt(args: &[Value]) -> std::result::Result<Value, String> {
    let html = match args.get(0) {
        Some(Value::String(html)) => html.as_str(),
        Some(Value::Nil) => "",
        _ => return Err(String::from("excerpt: expected HTML text")),
    };
    let budget = match args.get(1) {
        None => DEFAULT_EXCERPT_LENGTH,
        Some(Value::Number(n)) => match n.as_u64() {
            Some(budget) => budget as usize,
            None => return Err(String::from("excerpt: length must be a whole number")),
        },
        Some(_) => return Err(String::from("excerpt: length must be a number")),
    };
    Ok(Value::String(truncate_html(html, budget)))
}

/// The result of a fallible template operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or applying a template. Always fatal for the
/// run.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while opening template files.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned for syntax errors in template files.
    Parse { path: PathBuf, err: String },

    /// Returned when applying a template fails, e.g. on a missing field.
    Execute { path: PathBuf, err: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "Opening template file `{}`: {}", path.display(), err)
            }
            Error::Parse { path, err } => {
                write!(f, "Parsing template `{}`: {}", path.display(), err)
            }
            Error::Execute { path, err } => {
                write!(f, "Executing template `{}`: {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::Parse { .. } => None,
            Error::Execute { .. } => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn render(source: &str, fields: Vec<(&str, Value)>) -> Result<String> {
        let template = PageTemplate::parse(Path::new("test.html"), source)?;
        let mut m: HashMap<String, Value> = HashMap::new();
        for (k, v) in fields {
            m.insert(k.to_owned(), v);
        }
        template.render(Value::Object(m))
    }

    #[test]
    fn test_format_date() {
        assert_eq!("March 01, 2024", format_date("2024-03-01", "%B %d, %Y"));
        assert_eq!(
            "2024/03/01 09:30",
            format_date("2024-03-01T09:30:00", "%Y/%m/%d %H:%M")
        );
    }

    #[test]
    fn test_format_date_passes_through() {
        assert_eq!("", format_date("", "%Y"));
        assert_eq!("last spring", format_date("last spring", "%Y"));
        assert_eq!("2024-13-01", format_date("2024-13-01", "%Y"));
    }

    #[test]
    fn test_date_func() -> Result<()> {
        let out = render(
            r#"{{ date .d "%d.%m.%Y" }}|{{ date .d }}|{{ date .bad "%Y" }}"#,
            vec![
                ("d", Value::String(String::from("2024-03-01"))),
                ("bad", Value::String(String::from("soon"))),
            ],
        )?;
        assert_eq!("01.03.2024|2024-03-01|soon", out);
        Ok(())
    }

    #[test]
    fn test_excerpt_func() -> Result<()> {
        let html = "<p>Hello <b>world</b> this is long text</p>";
        let out = render(
            "{{ excerpt .html 10 }}",
            vec![("html", Value::String(String::from(html)))],
        )?;
        assert_eq!("<p>Hello <b>...</b></p>", out);
        Ok(())
    }

    #[test]
    fn test_parse_error_names_template() {
        let source = "{{ if .x }}never closed";
        match PageTemplate::parse(Path::new("broken.html"), source) {
            Err(Error::Parse { path, .. }) => {
                assert_eq!(Path::new("broken.html"), path)
            }
            _ => panic!("expected a parse error"),
        }
    }

    #[test]
    fn test_missing_template_file() {
        let missing = Path::new("does/not/exist.html");
        match PageTemplate::load(missing) {
            Err(Error::Open { path, .. }) => assert_eq!(missing, path),
            _ => panic!("expected an open error"),
        }
    }
}
