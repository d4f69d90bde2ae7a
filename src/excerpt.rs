//! Produces HTML-safe excerpts of rendered document bodies.
//!
//! [`truncate_html`] keeps a prefix of some HTML worth roughly a budget of
//! visible characters and guarantees that the result is well formed: no tag is
//! cut in half and every element left open by the cut is closed again.
//! Code is never split: a `<pre>` block always costs [`CODE_BLOCK_COST`] and
//! shows at most [`CODE_BLOCK_PREVIEW_LINES`] lines, and an inline `<code>`
//! span is kept or dropped as a whole. Plain text is cut at a word boundary and
//! followed by [`ELLIPSIS`]. Scripts, styles, iframes, and `<head>` blocks are
//! removed before anything is counted.
//!
//! Input is lexed up front into a sequence of [`Segment`]s by a small state
//! machine, and the budget is then spent walking that sequence. Neither pass
//! can fail; malformed markup just produces a shorter excerpt.

/// What a `<pre>` block is charged against the budget, whatever its length.
pub const CODE_BLOCK_COST: usize = 50;

/// How many lines of a `<pre>` block make it into an excerpt.
pub const CODE_BLOCK_PREVIEW_LINES: usize = 3;

/// Appended wherever content was cut off.
pub const ELLIPSIS: &str = "...";

/// Elements removed along with everything inside them.
const DROPPED_ELEMENTS: &[&str] = &["script", "style", "iframe", "head"];

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link",
    "meta", "source", "track", "wbr",
];

/// Truncates `html` to about `budget` visible characters. See the module
/// documentation for the rules.
pub fn truncate_html(html: &str, budget: usize) -> String {
    let segments = lex(html);
    let mut truncator = Truncator {
        out: String::new(),
        open: Vec::new(),
        used: 0,
        budget,
    };

    for (i, segment) in segments.iter().enumerate() {
        if !truncator.push(segment) {
            truncator.out.push_str(ELLIPSIS);
            break;
        }
        // The budget ran out exactly at a segment boundary. Only mark the cut
        // if something visible was actually left behind.
        if truncator.used >= budget
            && segment.is_visible()
            && segments[i + 1..].iter().any(Segment::is_visible)
        {
            truncator.out.push_str(ELLIPSIS);
            break;
        }
    }

    truncator.finish()
}

/// One lexical unit of the input.
#[derive(Clone, Debug, PartialEq)]
enum Segment<'a> {
    /// Character data between tags, entities left encoded.
    Text(&'a str),

    /// An opening tag that expects a matching closing tag.
    Open { name: String, raw: &'a str },

    /// A void or self-closing tag, copied as is.
    Void(&'a str),

    /// A closing tag.
    Close(String),

    /// A `<pre>` element: its opening tag and everything up to `</pre>`.
    CodeBlock { open: &'a str, inner: &'a str },

    /// An inline `<code>` element: its opening tag and its contents.
    CodeSpan { open: &'a str, inner: &'a str },
}

impl Segment<'_> {
    /// What the segment is charged against the budget.
    fn cost(&self) -> usize {
        match self {
            Segment::Text(text) => text_cost(text),
            Segment::CodeBlock { .. } => CODE_BLOCK_COST,
            Segment::CodeSpan { inner, .. } => unit_ends(inner).len(),
            _ => 0,
        }
    }

    fn is_visible(&self) -> bool {
        match self {
            Segment::CodeBlock { .. } | Segment::CodeSpan { .. } => true,
            Segment::Text(_) => self.cost() > 0,
            _ => false,
        }
    }
}

struct Truncator {
    out: String,
    open: Vec<String>,
    used: usize,
    budget: usize,
}

impl Truncator {
    /// Emits `segment` if it fits. Returns `false` once the budget is spent
    /// and the excerpt must end here.
    fn push(&mut self, segment: &Segment) -> bool {
        let remaining = self.budget.saturating_sub(self.used);
        match segment {
            Segment::Open { name, raw } => {
                self.out.push_str(raw);
                self.open.push(name.clone());
            }
            Segment::Void(raw) => self.out.push_str(raw),
            Segment::Close(name) => self.close(name),
            Segment::Text(text) => {
                let cost = segment.cost();
                if cost > remaining {
                    let cut = cut_text(text, remaining, self.used > 0);
                    self.out.push_str(cut);
                    return false;
                }
                self.out.push_str(text);
                self.used += cost;
            }
            Segment::CodeBlock { open, inner } => {
                if CODE_BLOCK_COST > remaining {
                    return false;
                }
                push_code_block_preview(&mut self.out, open, inner);
                self.used += CODE_BLOCK_COST;
            }
            Segment::CodeSpan { open, inner } => {
                let cost = segment.cost();
                if cost > remaining {
                    return false;
                }
                self.out.push_str(open);
                self.out.push_str(inner);
                self.out.push_str("</code>");
                self.used += cost;
            }
        }
        true
    }

    /// Closes the innermost open element called `name`, closing anything
    /// opened inside it first. Stray closing tags are dropped.
    fn close(&mut self, name: &str) {
        if let Some(i) = self.open.iter().rposition(|open| open == name) {
            for open in self.open.drain(i..).rev() {
                self.out.push_str("</");
                self.out.push_str(&open);
                self.out.push('>');
            }
        }
    }

    fn finish(mut self) -> String {
        while let Some(open) = self.open.pop() {
            self.out.push_str("</");
            self.out.push_str(&open);
            self.out.push('>');
        }
        self.out
    }
}

/// Lexer states.
#[derive(Clone, Copy, Debug, PartialEq)]
enum State {
    /// Reading character data.
    Text,
    /// Positioned on a `<`.
    InTag,
    /// Just past a `<pre>` opening tag.
    InPre,
    /// Just past a `<code>` opening tag outside of any `<pre>`.
    InCode,
}

/// The kinds of markup [`classify`] recognizes.
enum Markup {
    Open(String),
    SelfClosing(String),
    Close(String),
    /// Comments, doctypes, processing instructions.
    Declaration,
    /// A `<` that doesn't start a tag.
    Invalid,
}

fn lex(html: &str) -> Vec<Segment<'_>> {
    // ASCII lowercasing keeps byte offsets identical, so positions found in
    // `lower` index straight into `html`.
    let lower = html.to_ascii_lowercase();
    let mut segments = Vec::new();
    let mut state = State::Text;
    let mut pos = 0;
    let mut open_tag = 0..0;

    while pos < html.len() {
        match state {
            State::Text => match html[pos..].find('<') {
                Some(offset) => {
                    if offset > 0 {
                        segments.push(Segment::Text(&html[pos..pos + offset]));
                    }
                    pos += offset;
                    state = State::InTag;
                }
                None => {
                    segments.push(Segment::Text(&html[pos..]));
                    pos = html.len();
                }
            },
            State::InTag => {
                state = State::Text;
                if lower[pos..].starts_with("<!--") {
                    pos = match lower[pos..].find("-->") {
                        Some(offset) => pos + offset + 3,
                        None => html.len(),
                    };
                    continue;
                }

                let starts_tag = html[pos + 1..].starts_with(|c: char| {
                    c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?')
                });
                if !starts_tag {
                    segments.push(Segment::Text(&html[pos..pos + 1]));
                    pos += 1;
                    continue;
                }

                // An unterminated tag at the end of the input is dropped.
                let end = match tag_end(&html[pos..]) {
                    Some(offset) => pos + offset,
                    None => break,
                };
                let raw = &html[pos..end];
                match classify(raw) {
                    Markup::Invalid => {
                        segments.push(Segment::Text(&html[pos..pos + 1]));
                        pos += 1;
                        continue;
                    }
                    Markup::Declaration => {}
                    Markup::Open(name) if DROPPED_ELEMENTS.contains(&name.as_str()) => {
                        pos = match find_closing_tag(&lower, end, &name) {
                            Some((_, after)) => after,
                            None => html.len(),
                        };
                        continue;
                    }
                    Markup::SelfClosing(name) | Markup::Close(name)
                        if DROPPED_ELEMENTS.contains(&name.as_str()) => {}
                    Markup::Open(name) if name == "pre" => {
                        open_tag = pos..end;
                        state = State::InPre;
                    }
                    Markup::Open(name) if name == "code" => {
                        open_tag = pos..end;
                        state = State::InCode;
                    }
                    Markup::Open(name) => {
                        if VOID_ELEMENTS.contains(&name.as_str()) {
                            segments.push(Segment::Void(raw));
                        } else {
                            segments.push(Segment::Open { name, raw });
                        }
                    }
                    Markup::SelfClosing(_) => segments.push(Segment::Void(raw)),
                    Markup::Close(name) => segments.push(Segment::Close(name)),
                }
                pos = end;
            }
            State::InPre | State::InCode => {
                let name = if state == State::InPre { "pre" } else { "code" };
                let (inner_end, after) = find_closing_tag(&lower, pos, name)
                    .unwrap_or((html.len(), html.len()));
                let open = &html[open_tag.clone()];
                let inner = &html[pos..inner_end];
                segments.push(match state {
                    State::InPre => Segment::CodeBlock { open, inner },
                    _ => Segment::CodeSpan { open, inner },
                });
                pos = after;
                state = State::Text;
            }
        }
    }

    // A `<pre>` or `<code>` opening tag at the very end of the input.
    match state {
        State::InPre => segments.push(Segment::CodeBlock {
            open: &html[open_tag],
            inner: "",
        }),
        State::InCode => segments.push(Segment::CodeSpan {
            open: &html[open_tag],
            inner: "",
        }),
        _ => {}
    }

    segments
}

/// Returns the length of the tag at the start of `tag`, through its closing
/// `>`. A `>` inside a quoted attribute value doesn't end the tag; a quote
/// only opens a value when it directly follows an `=`.
fn tag_end(tag: &str) -> Option<usize> {
    let mut quote = None;
    let mut previous = '<';
    for (i, c) in tag.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '>' => return Some(i + 1),
            None if (c == '"' || c == '\'') && previous == '=' => quote = Some(c),
            None => {}
        }
        if !c.is_whitespace() {
            previous = c;
        }
    }
    None
}

/// Classifies a complete `<...>` tag.
fn classify(raw: &str) -> Markup {
    let inner = &raw[1..raw.len() - 1];
    if inner.starts_with('!') || inner.starts_with('?') {
        return Markup::Declaration;
    }

    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let name: String = inner
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase();
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Markup::Invalid;
    }

    if closing {
        Markup::Close(name)
    } else if inner.trim_end().ends_with('/') {
        Markup::SelfClosing(name)
    } else {
        Markup::Open(name)
    }
}

/// Finds the closing tag for `name` at or after `from` in the lowercased
/// input. Returns where the closing tag starts and the offset just past it.
fn find_closing_tag(lower: &str, from: usize, name: &str) -> Option<(usize, usize)> {
    let needle = format!("</{}", name);
    let mut search = from;
    while let Some(offset) = lower[search..].find(&needle) {
        let start = search + offset;
        let after_name = start + needle.len();
        match lower[after_name..].chars().next() {
            Some(c) if c == '>' || c.is_ascii_whitespace() => {
                let after = match lower[after_name..].find('>') {
                    Some(gt) => after_name + gt + 1,
                    None => lower.len(),
                };
                return Some((start, after));
            }
            None => return Some((start, lower.len())),
            Some(_) => search = after_name,
        }
    }
    None
}

/// Writes a `<pre>` block showing at most its first
/// [`CODE_BLOCK_PREVIEW_LINES`] lines, keeping an inner `<code>` wrapper
/// intact.
fn push_code_block_preview(out: &mut String, open: &str, inner: &str) {
    let lower = inner.to_ascii_lowercase();
    let (code_open, code, code_close) = match lower.starts_with("<code") {
        true => match inner.find('>') {
            Some(gt) => {
                let body_end = lower
                    .rfind("</code")
                    .filter(|end| *end > gt)
                    .unwrap_or(inner.len());
                (&inner[..=gt], &inner[gt + 1..body_end], "</code>")
            }
            None => ("", inner, ""),
        },
        false => ("", inner, ""),
    };

    let code = match code.match_indices('\n').nth(CODE_BLOCK_PREVIEW_LINES - 1) {
        Some((i, _)) if !code[i + 1..].trim().is_empty() => &code[..=i],
        _ => code,
    };

    out.push_str(open);
    out.push_str(code_open);
    out.push_str(code);
    out.push_str(code_close);
    out.push_str("</pre>");
}

/// Visible characters in a text segment. Whitespace between elements is
/// free.
fn text_cost(text: &str) -> usize {
    if text.trim().is_empty() {
        0
    } else {
        unit_ends(text).len()
    }
}

/// The byte offset just past each visible character in `text`. A character
/// reference such as `&amp;` is a single character.
fn unit_ends(text: &str) -> Vec<usize> {
    let mut ends = Vec::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        i += match entity_len(rest) {
            Some(len) => len,
            None => rest.chars().next().map_or(1, char::len_utf8),
        };
        ends.push(i);
    }
    ends
}

/// The length of the character reference at the start of `s`, if any.
fn entity_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'&') {
        return None;
    }
    let semicolon = bytes.iter().take(12).position(|b| *b == b';')?;
    let name = &bytes[1..semicolon];
    let valid = !name.is_empty()
        && name.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'#');
    match valid {
        true => Some(semicolon + 1),
        false => None,
    }
}

/// Cuts `text` down to at most `remaining` visible characters, backing up to
/// the last word boundary. A single word that doesn't fit is dropped, unless
/// nothing visible has been emitted yet (`emitted` is false), in which case it
/// is cut mid-word rather than leaving the excerpt empty.
fn cut_text(text: &str, remaining: usize, emitted: bool) -> &str {
    let ends = unit_ends(text);
    let hard = match remaining {
        0 => 0,
        n => ends[(n - 1).min(ends.len() - 1)],
    };
    let prefix = &text[..hard];

    let at_boundary = prefix.ends_with(char::is_whitespace)
        || text[hard..].starts_with(char::is_whitespace);
    let cut = if at_boundary {
        prefix
    } else {
        match prefix.rfind(char::is_whitespace) {
            Some(i) => &prefix[..i],
            None if emitted => "",
            None => prefix,
        }
    };
    cut.trim_end()
}
