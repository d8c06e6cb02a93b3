//! HTML pretty-printer for the source view
//!
//! `format_html` re-lays out a document for reading: one tag per line,
//! two spaces per nesting level, collapsed text whitespace. It never
//! changes what is exported; only the source view and `/copy` use it.
//!
//! Content of `<pre>` and `<textarea>` is kept byte for byte. Content of
//! `<script>` and `<style>` keeps its relative indentation and is shifted
//! to sit one level below its tag. Comments and declarations are printed
//! as they appear. Formatting formatted output returns it unchanged.

use crate::error::SitewrightError;
use thiserror::Error;

const INDENT: &str = "  ";
const PRINT_WIDTH: usize = 80;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is not parsed as markup
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "pre", "textarea"];

/// Elements whose content is printed exactly as written
const VERBATIM_ELEMENTS: &[&str] = &["pre", "textarea"];

/// Reasons the formatter gives up on a document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unterminated tag at byte {0}")]
    UnterminatedTag(usize),

    #[error("unterminated comment at byte {0}")]
    UnterminatedComment(usize),

    #[error("unterminated <{name}> element starting at byte {offset}")]
    UnterminatedElement { name: String, offset: usize },

    #[error("end tag </{name}> at byte {offset} has no open element")]
    UnexpectedEndTag { name: String, offset: usize },
}

impl From<FormatError> for SitewrightError {
    fn from(error: FormatError) -> Self {
        SitewrightError::Format(error.to_string())
    }
}

#[derive(Debug)]
enum Node {
    Text(String),
    /// Comment or declaration, printed as found
    Verbatim(String),
    Element(Element),
}

#[derive(Debug)]
struct Element {
    name: String,
    open_tag: String,
    children: Vec<Node>,
    raw: Option<String>,
    void: bool,
    closed: bool,
}

/// Pretty-print an HTML document
///
/// # Errors
///
/// Returns `FormatError` on an unterminated tag, comment or raw-text
/// element, or an end tag that matches no open element.
///
/// # Examples
///
/// ```
/// use sitewright::formatter::format_html;
///
/// let formatted = format_html("<ul><li>One</li><li>Two</li></ul>").unwrap();
/// assert_eq!(formatted, "<ul>\n  <li>One</li>\n  <li>Two</li>\n</ul>\n");
/// ```
pub fn format_html(source: &str) -> Result<String, FormatError> {
    let nodes = Parser::new(source).parse()?;

    let mut lines = Vec::new();
    for node in &nodes {
        print_node(node, 0, &mut lines);
    }

    if lines.is_empty() {
        return Ok(String::new());
    }
    let mut output = lines.join("\n");
    output.push('\n');
    Ok(output)
}

/// Text shown in the source view: formatted when possible, raw otherwise
pub fn display_source(source: &str) -> String {
    match format_html(source) {
        Ok(formatted) => formatted,
        Err(e) => {
            tracing::warn!("Showing unformatted source: {}", e);
            source.to_string()
        }
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn parse(mut self) -> Result<Vec<Node>, FormatError> {
        let mut root = Vec::new();
        let mut stack: Vec<Element> = Vec::new();

        while self.pos < self.src.len() {
            let rest = &self.src[self.pos..];

            if rest.starts_with("<!--") {
                let raw = self.comment()?;
                attach(&mut stack, &mut root, Node::Verbatim(raw));
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                let raw = self.declaration()?;
                attach(&mut stack, &mut root, Node::Verbatim(raw));
            } else if rest.starts_with("</") && starts_name(&rest[2..]) {
                let offset = self.pos;
                let name = self.end_tag()?;
                close(&mut stack, &mut root, &name, offset)?;
            } else if rest.starts_with('<') && starts_name(&rest[1..]) {
                let offset = self.pos;
                let mut element = self.start_tag()?;
                if element.void {
                    attach(&mut stack, &mut root, Node::Element(element));
                } else if RAW_TEXT_ELEMENTS.contains(&element.name.as_str()) {
                    element.raw = Some(self.raw_text(&element.name, offset)?);
                    element.closed = true;
                    attach(&mut stack, &mut root, Node::Element(element));
                } else {
                    stack.push(element);
                }
            } else {
                let text = collapse_whitespace(self.text());
                if !text.is_empty() {
                    attach(&mut stack, &mut root, Node::Text(text));
                }
            }
        }

        // Anything still open ends with the document
        while let Some(element) = stack.pop() {
            attach(&mut stack, &mut root, Node::Element(element));
        }

        Ok(root)
    }

    fn comment(&mut self) -> Result<String, FormatError> {
        let start = self.pos;
        let end = self.src[start + 4..]
            .find("-->")
            .ok_or(FormatError::UnterminatedComment(start))?;
        self.pos = start + 4 + end + 3;
        Ok(self.src[start..self.pos].to_string())
    }

    fn declaration(&mut self) -> Result<String, FormatError> {
        let start = self.pos;
        let end = self.src[start..]
            .find('>')
            .ok_or(FormatError::UnterminatedTag(start))?;
        self.pos = start + end + 1;
        Ok(self.src[start..self.pos].to_string())
    }

    fn end_tag(&mut self) -> Result<String, FormatError> {
        let start = self.pos;
        let inner = &self.src[start + 2..];
        let end = inner.find('>').ok_or(FormatError::UnterminatedTag(start))?;
        let name = tag_name(inner);
        self.pos = start + 2 + end + 1;
        Ok(name)
    }

    fn start_tag(&mut self) -> Result<Element, FormatError> {
        let start = self.pos;
        let mut quote: Option<char> = None;
        let mut end = None;

        for (i, c) in self.src[start + 1..].char_indices() {
            match quote {
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None if c == '"' || c == '\'' => quote = Some(c),
                None if c == '>' => {
                    end = Some(start + 1 + i);
                    break;
                }
                None => {}
            }
        }

        let end = end.ok_or(FormatError::UnterminatedTag(start))?;
        self.pos = end + 1;

        let mut inner = normalize_tag_body(&self.src[start + 1..end]);
        let self_closing = inner.ends_with('/');
        if self_closing {
            inner.pop();
            inner.truncate(inner.trim_end().len());
        }

        let name = tag_name(&inner);
        let open_tag = if self_closing {
            format!("<{} />", inner)
        } else {
            format!("<{}>", inner)
        };

        Ok(Element {
            void: self_closing || VOID_ELEMENTS.contains(&name.as_str()),
            name,
            open_tag,
            children: Vec::new(),
            raw: None,
            closed: false,
        })
    }

    fn raw_text(&mut self, name: &str, offset: usize) -> Result<String, FormatError> {
        let unterminated = || FormatError::UnterminatedElement {
            name: name.to_string(),
            offset,
        };

        // ASCII lowercasing keeps byte offsets aligned with `src`
        let rest = &self.src[self.pos..];
        let lowered = rest.to_ascii_lowercase();
        let close_at = lowered
            .find(&format!("</{}", name))
            .ok_or_else(unterminated)?;
        let gt = rest[close_at..].find('>').ok_or_else(unterminated)?;

        let content = rest[..close_at].to_string();
        self.pos += close_at + gt + 1;
        Ok(content)
    }

    fn text(&mut self) -> &'a str {
        let start = self.pos;
        // Always consume at least one character so a lone '<' makes progress
        let mut cursor = start + self.src[start..].chars().next().map_or(1, char::len_utf8);

        loop {
            match self.src[cursor..].find('<') {
                None => {
                    cursor = self.src.len();
                    break;
                }
                Some(i) => {
                    cursor += i;
                    if is_markup_start(&self.src[cursor..]) {
                        break;
                    }
                    cursor += 1;
                }
            }
        }

        self.pos = cursor;
        &self.src[start..cursor]
    }
}

fn attach(stack: &mut [Element], root: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => root.push(node),
    }
}

fn close(
    stack: &mut Vec<Element>,
    root: &mut Vec<Node>,
    name: &str,
    offset: usize,
) -> Result<(), FormatError> {
    let index = stack
        .iter()
        .rposition(|element| element.name == name)
        .ok_or_else(|| FormatError::UnexpectedEndTag {
            name: name.to_string(),
            offset,
        })?;

    while stack.len() > index + 1 {
        if let Some(unclosed) = stack.pop() {
            attach(stack, root, Node::Element(unclosed));
        }
    }
    if let Some(mut element) = stack.pop() {
        element.closed = true;
        attach(stack, root, Node::Element(element));
    }
    Ok(())
}

fn starts_name(rest: &str) -> bool {
    rest.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

fn is_markup_start(rest: &str) -> bool {
    rest.starts_with("<!")
        || rest.starts_with("<?")
        || (rest.starts_with("</") && starts_name(&rest[2..]))
        || (rest.starts_with('<') && starts_name(&rest[1..]))
}

fn tag_name(inner: &str) -> String {
    inner
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | ':' | '_' | '.'))
        .collect::<String>()
        .to_ascii_lowercase()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse whitespace between attributes; quoted values are untouched
fn normalize_tag_body(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut quote: Option<char> = None;
    let mut pending_space = false;

    for c in body.chars() {
        match quote {
            Some(q) => {
                out.push(c);
                if c == q {
                    quote = None;
                }
            }
            None if c.is_ascii_whitespace() => pending_space = true,
            None => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                if c == '"' || c == '\'' {
                    quote = Some(c);
                }
                out.push(c);
            }
        }
    }

    out
}

fn print_node(node: &Node, depth: usize, lines: &mut Vec<String>) {
    let indent = INDENT.repeat(depth);
    match node {
        Node::Text(text) => lines.push(format!("{}{}", indent, text)),
        Node::Verbatim(raw) => lines.push(format!("{}{}", indent, raw)),
        Node::Element(element) => print_element(element, depth, &indent, lines),
    }
}

fn print_element(element: &Element, depth: usize, indent: &str, lines: &mut Vec<String>) {
    if element.void {
        lines.push(format!("{}{}", indent, element.open_tag));
        return;
    }

    let close_tag = format!("</{}>", element.name);

    if let Some(raw) = &element.raw {
        if VERBATIM_ELEMENTS.contains(&element.name.as_str()) {
            lines.push(format!("{}{}{}{}", indent, element.open_tag, raw, close_tag));
            return;
        }

        let body = reindent(raw, depth + 1);
        if body.is_empty() {
            lines.push(format!("{}{}{}", indent, element.open_tag, close_tag));
        } else {
            lines.push(format!("{}{}", indent, element.open_tag));
            lines.extend(body);
            lines.push(format!("{}{}", indent, close_tag));
        }
        return;
    }

    if element.children.is_empty() {
        if element.closed {
            lines.push(format!("{}{}{}", indent, element.open_tag, close_tag));
        } else {
            lines.push(format!("{}{}", indent, element.open_tag));
        }
        return;
    }

    if let [Node::Text(text)] = element.children.as_slice() {
        let inline = format!("{}{}{}{}", indent, element.open_tag, text, close_tag);
        if element.closed && !inline.contains('\n') && inline.chars().count() <= PRINT_WIDTH {
            lines.push(inline);
            return;
        }
    }

    lines.push(format!("{}{}", indent, element.open_tag));
    for child in &element.children {
        print_node(child, depth + 1, lines);
    }
    if element.closed {
        lines.push(format!("{}{}", indent, close_tag));
    }
}

/// Shift script or style content so its least-indented line sits at `depth`
fn reindent(raw: &str, depth: usize) -> Vec<String> {
    let source: Vec<&str> = raw.lines().collect();
    let Some(first) = source.iter().position(|line| !line.trim().is_empty()) else {
        return Vec::new();
    };
    let last = source
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .unwrap_or(first);
    let body = &source[first..=last];

    let common = body
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    let indent = INDENT.repeat(depth);
    body.iter()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                let stripped = line
                    .char_indices()
                    .nth(common)
                    .map_or("", |(i, _)| &line[i..]);
                format!("{}{}", indent, stripped.trim_end())
            }
        })
        .collect()
}
