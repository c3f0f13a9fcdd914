use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::str;

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

#[derive(Debug)]
pub enum ConvertError {
    Utf8(str::Utf8Error),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Utf8(err) => write!(f, "page content is not valid UTF-8: {}", err),
        }
    }
}

impl Error for ConvertError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConvertError::Utf8(err) => Some(err),
        }
    }
}

impl From<str::Utf8Error> for ConvertError {
    fn from(err: str::Utf8Error) -> Self {
        ConvertError::Utf8(err)
    }
}

// One fixed option set per build. Bare-URL autolinking is the one GFM
// extension pulldown does not offer; `<...>` autolinks still work.
fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_GFM);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options
}

/// Convert raw page bytes to an HTML fragment. Embedded HTML passes
/// through unsanitized (page sources are trusted), every soft line break
/// renders as a hard break, and headings without an explicit `{#id}`
/// attribute get one derived from their text.
pub fn to_html(content: &[u8]) -> Result<String, ConvertError> {
    let text = str::from_utf8(content)?;
    let events: Vec<Event> = Parser::new_ext(text, options()).collect();
    let events = assign_heading_ids(events);

    let mut out = String::new();
    html::push_html(
        &mut out,
        events.into_iter().map(|event| match event {
            Event::SoftBreak => Event::HardBreak,
            other => other,
        }),
    );
    Ok(out)
}

// Give every id-less heading a slug of its text, with `-N` suffixes for
// repeats so anchors stay unique within one document.
fn assign_heading_ids(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut processed = Vec::with_capacity(events.len());
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut i = 0;

    while i < events.len() {
        match &events[i] {
            Event::Start(Tag::Heading {
                level,
                id: None,
                classes,
                attrs,
            }) => {
                // Look ahead to the matching end tag for the heading text.
                let mut text = String::new();
                let mut j = i + 1;
                while j < events.len() {
                    match &events[j] {
                        Event::End(TagEnd::Heading(_)) => break,
                        Event::Text(t) => text.push_str(t),
                        Event::Code(t) => text.push_str(t),
                        _ => {}
                    }
                    j += 1;
                }

                let mut slug = slugify(&text);
                if slug.is_empty() {
                    slug = "heading".to_string();
                }
                let id = match seen.get_mut(&slug) {
                    Some(count) => {
                        *count += 1;
                        format!("{}-{}", slug, count)
                    }
                    None => {
                        seen.insert(slug.clone(), 0);
                        slug
                    }
                };

                processed.push(Event::Start(Tag::Heading {
                    level: *level,
                    id: Some(CowStr::from(id)),
                    classes: classes.clone(),
                    attrs: attrs.clone(),
                }));
            }
            other => processed.push(other.clone()),
        }
        i += 1;
    }

    processed
}

/// Lowercase the text and join its alphanumeric runs with single hyphens.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            for lc in c.to_lowercase() {
                slug.push(lc);
            }
            pending_dash = false;
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }
    slug
}
