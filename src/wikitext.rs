//! Minimal MediaWiki markup model: template invocations, section headings and a
//! plain-text projection. One [`ParsedDocument`] is built per page and dropped with it.

use crate::config::MAX_TEMPLATE_DEPTH;
use crate::error::{Error, Result};
use memchr::memmem;
use once_cell::sync::Lazy;
use regex::Regex;

static SECTION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(={1,6})\s*(.+?)\s*={1,6}\s*$").unwrap());

static COMMENT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static REF_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<ref[^>]*/>|<ref[^>]*>.*?</ref>").unwrap());

static WIKILINK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[(?:[^\[\]|]*\|)*([^\[\]|]*)\]\]").unwrap());

static EXTERNAL_LINK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(?:https?:)?//[^\s\]]+\s*([^\]]*)\]").unwrap());

static EMPHASIS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"'{2,}").unwrap());

static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[A-Za-z][^>]*>").unwrap());

static TEMPLATE_NAMESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:шаблон|template)\s*:\s*").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    /// `None` for positional arguments.
    pub name: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub arguments: Vec<Argument>,
}

impl Template {
    /// Trimmed, lowercased name with `_` read as space and any `Шаблон:` prefix dropped.
    pub fn normalized_name(&self) -> String {
        let name = self.name.trim().trim_start_matches(':').replace('_', " ");
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
        TEMPLATE_NAMESPACE_REGEX
            .replace(&name, "")
            .trim()
            .to_lowercase()
    }

    /// Unnamed arguments in order of appearance.
    pub fn positional(&self) -> impl Iterator<Item = &str> {
        self.arguments
            .iter()
            .filter(|a| a.name.is_none())
            .map(|a| a.value.as_str())
    }

    /// Value of positional parameter `index` (1-based), as MediaWiki resolves it:
    /// unnamed arguments are numbered in order, `|2=x` sets parameter 2 explicitly,
    /// and a later definition of the same index wins.
    pub fn positional_at(&self, index: usize) -> Option<&str> {
        let mut next_implicit = 0;
        let mut found = None;
        for argument in &self.arguments {
            let slot = match argument.name.as_deref() {
                None => {
                    next_implicit += 1;
                    next_implicit
                }
                Some(name) => match name.parse::<usize>() {
                    Ok(n) if n > 0 => n,
                    _ => continue,
                },
            };
            if slot == index {
                found = Some(argument.value.as_str());
            }
        }
        found
    }

    pub fn named(&self) -> impl Iterator<Item = (&str, &str)> {
        self.arguments
            .iter()
            .filter_map(|a| a.name.as_deref().map(|n| (n, a.value.as_str())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub level: usize,
    pub title: String,
}

#[derive(Debug)]
pub struct ParsedDocument {
    source: String,
    templates: Vec<Template>,
    sections: Vec<Section>,
}

impl ParsedDocument {
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let mut templates = Vec::new();
        collect_templates(&source, 0, &mut templates)?;
        let sections = SECTION_REGEX
            .captures_iter(&source)
            .map(|c| Section {
                level: c[1].len(),
                title: c[2].trim().to_string(),
            })
            .collect();
        Ok(Self {
            source,
            templates,
            sections,
        })
    }

    /// Every template invocation in document order, nested ones included.
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// The markup exactly as it was parsed.
    pub fn markup(&self) -> &str {
        &self.source
    }

    /// Readable text: comments, references, templates and tags removed, links reduced
    /// to their label.
    pub fn plain_text(&self) -> String {
        let text = COMMENT_REGEX.replace_all(&self.source, "");
        let text = REF_REGEX.replace_all(&text, "");
        let text = strip_templates(&text);
        let text = WIKILINK_REGEX.replace_all(&text, "$1");
        let text = EXTERNAL_LINK_REGEX.replace_all(&text, "$1");
        let text = EMPHASIS_REGEX.replace_all(&text, "");
        TAG_REGEX.replace_all(&text, "").into_owned()
    }
}

fn collect_templates(text: &str, depth: usize, out: &mut Vec<Template>) -> Result<()> {
    if depth > MAX_TEMPLATE_DEPTH {
        return Err(Error::TemplateNestingTooDeep {
            limit: MAX_TEMPLATE_DEPTH,
        });
    }

    let bytes = text.as_bytes();
    let mut search_from = 0;

    while let Some(pos) = memmem::find(&bytes[search_from..], b"{{") {
        let abs_pos = search_from + pos;
        match find_matching_close(bytes, abs_pos) {
            Some(close_pos) => {
                let inner = &text[abs_pos + 2..close_pos];
                if let Some(template) = parse_template_inner(inner) {
                    out.push(template);
                }
                collect_templates(inner, depth + 1, out)?;
                search_from = close_pos + 2;
            }
            None => search_from = abs_pos + 2,
        }
    }

    Ok(())
}

fn find_matching_close(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth: i32 = 0;
    let mut i = start;
    while i + 1 < bytes.len() {
        if bytes[i] == b'{' && bytes[i + 1] == b'{' {
            depth += 1;
            i += 2;
        } else if bytes[i] == b'}' && bytes[i + 1] == b'}' {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
            i += 2;
        } else {
            i += 1;
        }
    }
    None
}

fn parse_template_inner(inner: &str) -> Option<Template> {
    let segments = split_at_depth_zero(inner, b'|');
    let name = COMMENT_REGEX.replace_all(segments[0], "").trim().to_string();
    // `{{{param}}}` leaves a leading brace behind; those are not invocations.
    if name.is_empty() || name.starts_with('{') {
        return None;
    }

    let arguments = segments[1..]
        .iter()
        .map(|segment| {
            let parts = split_at_depth_zero(segment, b'=');
            if parts.len() > 1 {
                Argument {
                    name: Some(parts[0].trim().to_string()),
                    value: segment[parts[0].len() + 1..].trim().to_string(),
                }
            } else {
                Argument {
                    name: None,
                    value: segment.trim().to_string(),
                }
            }
        })
        .collect();

    Some(Template { name, arguments })
}

/// Splits on `sep` outside nested `{{ }}` and `[[ ]]`.
fn split_at_depth_zero(content: &str, sep: u8) -> Vec<&str> {
    let mut segments = Vec::new();
    let bytes = content.as_bytes();
    let mut depth: i32 = 0;
    let mut last_split = 0;
    let mut i = 0;

    while i < bytes.len() {
        let pair = i + 1 < bytes.len() && bytes[i] == bytes[i + 1];
        if pair && (bytes[i] == b'{' || bytes[i] == b'[') {
            depth += 1;
            i += 2;
        } else if pair && (bytes[i] == b'}' || bytes[i] == b']') {
            depth -= 1;
            i += 2;
        } else if bytes[i] == sep && depth <= 0 {
            segments.push(&content[last_split..i]);
            last_split = i + 1;
            i += 1;
        } else {
            i += 1;
        }
    }
    segments.push(&content[last_split..]);
    segments
}

fn strip_templates(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut i = 0;
    let mut run_start = 0;

    while i < bytes.len() {
        if i + 1 < bytes.len() && bytes[i] == b'{' && bytes[i + 1] == b'{' {
            if run_start < i {
                result.push_str(&text[run_start..i]);
            }
            let mut depth: i32 = 0;
            while i + 1 < bytes.len() {
                if bytes[i] == b'{' && bytes[i + 1] == b'{' {
                    depth += 1;
                    i += 2;
                } else if bytes[i] == b'}' && bytes[i + 1] == b'}' {
                    depth -= 1;
                    i += 2;
                    if depth == 0 {
                        break;
                    }
                } else {
                    i += 1;
                }
            }
            // An unclosed template swallows the rest of the text.
            if depth > 0 {
                i = bytes.len();
            }
            run_start = i;
        } else {
            i += 1;
        }
    }

    if run_start < bytes.len() {
        result.push_str(&text[run_start..]);
    }

    result
}
