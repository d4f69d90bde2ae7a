//! Converts markdown document bodies to HTML with [`pulldown_cmark`].
//!
//! Fenced code blocks are part of CommonMark and tables are enabled
//! explicitly. Single newlines inside a paragraph are preserved as `<br />`
//! line breaks instead of being folded into spaces.

use pulldown_cmark::{html, Event, Options, Parser};

/// Converts `markdown` to HTML, appending the result to `out`.
pub fn to_html(out: &mut String, markdown: &str) {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let event_converter = EventConverter;
    html::push_html(
        out,
        Parser::new_ext(markdown, options).map(|ev| event_converter.convert(ev)),
    );
}

/// Rewrites parser events before they reach the HTML writer.
struct EventConverter;

impl EventConverter {
    fn convert<'a>(&self, ev: Event<'a>) -> Event<'a> {
        match ev {
            // A newline in the source is a line break in the output.
            Event::SoftBreak => Event::HardBreak,
            _ => ev,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn render(markdown: &str) -> String {
        let mut out = String::new();
        to_html(&mut out, markdown);
        out
    }

    #[test]
    fn test_line_breaks_preserved() {
        assert_eq!("<p>one<br />\ntwo</p>\n", render("one\ntwo\n"));
    }

    #[test]
    fn test_fenced_code() {
        assert_eq!(
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n",
            render("```rust\nfn main() {}\n```\n")
        );
    }

    #[test]
    fn test_tables() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.starts_with("<table>"));
        assert!(html.contains("<td>1</td>"));
    }
}
