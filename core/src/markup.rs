//! Minimal HTML fragment tree for entry content blobs.
//!
//! Content is authored HTML (`<p>`, `<strong>`, `<ul>`, …). We parse it into
//! a small node tree so the search indexer can take its text content and the
//! glossary annotator can rewrite text nodes without a DOM. The parser is
//! tolerant: stray closing tags are dropped and unclosed elements are closed
//! at the end of input.

use std::fmt::Write;

/// Class carried by rendered glossary term controls.
pub const TERM_CLASS: &str = "key-term";

const VOID_ELEMENTS: &[&str] = &[
    "area", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    Text(String),
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<Markup>,
    },
    /// An annotated glossary term; the key is also the displayed text.
    Term(String),
}

impl Markup {
    /// True for nodes the glossary annotator must not descend into.
    pub fn is_term_control(&self) -> bool {
        match self {
            Markup::Term(_) => true,
            Markup::Element { tag, attrs, .. } => {
                tag == "button"
                    && attrs.iter().any(|(name, value)| {
                        name == "class" && value.split_whitespace().any(|c| c == TERM_CLASS)
                    })
            }
            Markup::Text(_) => false,
        }
    }
}

/// An open element while parsing: tag, attributes, children so far.
type Frame = (String, Vec<(String, String)>, Vec<Markup>);

/// Parse an HTML fragment.
pub fn parse(html: &str) -> Vec<Markup> {
    // The bottom frame is the fragment root.
    let mut stack: Vec<Frame> = vec![(String::new(), Vec::new(), Vec::new())];
    let mut rest = html;

    while !rest.is_empty() {
        let Some(lt) = rest.find('<') else {
            push_text(&mut stack, rest);
            break;
        };
        if lt > 0 {
            push_text(&mut stack, &rest[..lt]);
            rest = &rest[lt..];
        }

        if let Some(after) = rest.strip_prefix("<!--") {
            rest = match after.find("-->") {
                Some(end) => &after[end + 3..],
                None => "",
            };
            continue;
        }

        if let Some(after) = rest.strip_prefix("</") {
            let Some(gt) = after.find('>') else {
                push_text(&mut stack, rest);
                break;
            };
            let name = after[..gt].trim().to_ascii_lowercase();
            rest = &after[gt + 1..];
            close_element(&mut stack, &name);
            continue;
        }

        let starts_tag = rest[1..].chars().next().is_some_and(|c| c.is_ascii_alphabetic());
        if !starts_tag {
            push_text(&mut stack, "<");
            rest = &rest[1..];
            continue;
        }

        match parse_open_tag(&rest[1..]) {
            Some((tag, attrs, self_closing, consumed)) => {
                rest = &rest[1 + consumed..];
                if self_closing || VOID_ELEMENTS.contains(&tag.as_str()) {
                    push_node(
                        &mut stack,
                        Markup::Element {
                            tag,
                            attrs,
                            children: Vec::new(),
                        },
                    );
                } else {
                    stack.push((tag, attrs, Vec::new()));
                }
            }
            None => {
                // Unterminated tag: keep the remainder as text.
                push_text(&mut stack, rest);
                break;
            }
        }
    }

    while stack.len() > 1 {
        pop_element(&mut stack);
    }
    stack.pop().map(|(_, _, children)| children).unwrap_or_default()
}

/// Parse `tag attr="v" ...>` (the leading `<` already stripped).
/// Returns the tag, attributes, whether it was self-closing, and bytes consumed.
fn parse_open_tag(s: &str) -> Option<(String, Vec<(String, String)>, bool, usize)> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' && bytes[i] != b'/'
    {
        i += 1;
    }
    let tag = s[..i].to_ascii_lowercase();
    let mut attrs = Vec::new();

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match *bytes.get(i)? {
            b'>' => return Some((tag, attrs, false, i + 1)),
            b'/' => {
                i += 1;
                if bytes.get(i) == Some(&b'>') {
                    return Some((tag, attrs, true, i + 1));
                }
                continue;
            }
            _ => {}
        }

        let name_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        let name = s[name_start..i].to_ascii_lowercase();

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let mut value = String::new();
        if bytes.get(i) == Some(&b'=') {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            match *bytes.get(i)? {
                quote @ (b'"' | b'\'') => {
                    let quote = quote as char;
                    let end = s[i + 1..].find(quote)?;
                    value = decode_entities(&s[i + 1..i + 1 + end]);
                    i += end + 2;
                }
                _ => {
                    let value_start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                        i += 1;
                    }
                    value = decode_entities(&s[value_start..i]);
                }
            }
        }
        if !name.is_empty() {
            attrs.push((name, value));
        }
    }
}

fn push_text(stack: &mut [Frame], raw: &str) {
    let text = decode_entities(raw);
    if text.is_empty() {
        return;
    }
    let Some((_, _, children)) = stack.last_mut() else {
        return;
    };
    if let Some(Markup::Text(prev)) = children.last_mut() {
        prev.push_str(&text);
    } else {
        children.push(Markup::Text(text));
    }
}

fn push_node(stack: &mut [Frame], node: Markup) {
    if let Some((_, _, children)) = stack.last_mut() {
        children.push(node);
    }
}

fn pop_element(stack: &mut Vec<Frame>) {
    if let Some((tag, attrs, children)) = stack.pop() {
        push_node(
            stack,
            Markup::Element {
                tag,
                attrs,
                children,
            },
        );
    }
}

fn close_element(stack: &mut Vec<Frame>, name: &str) {
    // Ignore closing tags with no matching open element.
    let Some(pos) = stack.iter().skip(1).rposition(|(tag, _, _)| tag == name) else {
        return;
    };
    let depth = pos + 1;
    while stack.len() > depth {
        pop_element(stack);
    }
}

/// Decode the character references authored content actually uses.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let name = &rest[1..semi];
            let ch = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                "mdash" => Some('\u{2014}'),
                "ndash" => Some('\u{2013}'),
                "times" => Some('\u{d7}'),
                _ => name
                    .strip_prefix("#x")
                    .or_else(|| name.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| name.strip_prefix('#').and_then(|d| d.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, semi))
        });
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Concatenated text of the tree, like a DOM `textContent`.
pub fn text_content(nodes: &[Markup]) -> String {
    let mut out = String::new();
    collect_text(nodes, &mut out);
    out
}

fn collect_text(nodes: &[Markup], out: &mut String) {
    for node in nodes {
        match node {
            Markup::Text(t) | Markup::Term(t) => out.push_str(t),
            Markup::Element { children, .. } => collect_text(children, out),
        }
    }
}

/// Serialize back to HTML. Term nodes become `button.key-term` controls.
pub fn to_html(nodes: &[Markup]) -> String {
    let mut out = String::new();
    write_html(nodes, &mut out);
    out
}

fn write_html(nodes: &[Markup], out: &mut String) {
    for node in nodes {
        match node {
            Markup::Text(t) => out.push_str(&escape_text(t)),
            Markup::Term(key) => {
                let _ = write!(
                    out,
                    r#"<button class="{TERM_CLASS}" data-term="{}">{}</button>"#,
                    escape_attr(key),
                    escape_text(key)
                );
            }
            Markup::Element {
                tag,
                attrs,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    let _ = write!(out, r#" {name}="{}""#, escape_attr(value));
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    continue;
                }
                write_html(children, out);
                let _ = write!(out, "</{tag}>");
            }
        }
    }
}

pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

pub fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}
