//! Tag-event stream shared by the page extractors.
//!
//! The html5ever tokenizer runs without a tree builder; a [`TokenSink`]
//! flattens its tokens into [`Event`]s in document order.

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, CharacterTokens, CommentToken, DoctypeToken, EOFToken, EndTag,
    NullCharacterToken, ParseError, StartTag, TagToken, Token, TokenSink, TokenSinkResult,
    Tokenizer, TokenizerOpts,
};

/// One markup occurrence, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    StartTag {
        name: String,
        /// Attributes as `(key, value)` pairs, in source order
        attrs: Vec<(String, String)>,
    },
    EndTag {
        name: String,
    },
    Text(String),
    /// A named or numeric character reference, without `&` and `;`
    EntityRef(String),
}

#[cfg(test)]
impl Event {
    pub(crate) fn start(name: &str, attrs: &[(&str, &str)]) -> Self {
        Event::StartTag {
            name: name.to_string(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub(crate) fn end(name: &str) -> Self {
        Event::EndTag {
            name: name.to_string(),
        }
    }

    pub(crate) fn text(content: &str) -> Self {
        Event::Text(content.to_string())
    }
}

struct EventSink<'a> {
    source: &'a str,
    /// Byte offset just past the chunk being fed; every chunk ends with `>`
    chunk_end: usize,
    duplicate_attrs: bool,
    events: Vec<Event>,
    text: String,
}

impl<'a> EventSink<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chunk_end: 0,
            duplicate_attrs: false,
            events: vec![],
            text: String::new(),
        }
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.events.push(Event::Text(std::mem::take(&mut self.text)));
        }
    }

    /// Re-reads the start tag that closes at `chunk_end` straight from the
    /// source, keeping the repeated attributes the tokenizer dropped.
    fn rescan_attrs(&self, name: &str) -> Option<Vec<(String, String)>> {
        self.source[..self.chunk_end]
            .match_indices('<')
            .rev()
            .find_map(|(start, _)| {
                let (tag, attrs, len) = scan_start_tag(&self.source[start..])?;
                (start + len == self.chunk_end && tag.eq_ignore_ascii_case(name)).then_some(attrs)
            })
    }
}

impl TokenSink for EventSink<'_> {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line: u64) -> TokenSinkResult<Self::Handle> {
        match token {
            CharacterTokens(text) => self.text.push_str(&text),
            NullCharacterToken => self.text.push('\0'),
            TagToken(tag) => {
                self.flush_text();
                let duplicates = std::mem::take(&mut self.duplicate_attrs);
                let name = tag.name.to_string();
                match tag.kind {
                    StartTag => {
                        let rescanned = if duplicates {
                            self.rescan_attrs(&name)
                        } else {
                            None
                        };
                        let attrs = rescanned.unwrap_or_else(|| {
                            tag.attrs
                                .iter()
                                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                                .collect()
                        });
                        self.events.push(Event::StartTag {
                            name: name.clone(),
                            attrs,
                        });

                        if tag.self_closing {
                            self.events.push(Event::EndTag { name });
                        } else if let Some(kind) = raw_kind(&name) {
                            return TokenSinkResult::RawData(kind);
                        }
                    }
                    EndTag => self.events.push(Event::EndTag { name }),
                }
            }
            CommentToken(_) | DoctypeToken(_) | EOFToken => self.flush_text(),
            // html5ever keeps only the first of a repeated attribute
            ParseError(msg) => {
                if msg == "Duplicate attribute" {
                    self.duplicate_attrs = true;
                }
            }
        }
        TokenSinkResult::Continue
    }
}

// script and style bodies are never markup
fn raw_kind(name: &str) -> Option<RawKind> {
    match name {
        "script" => Some(RawKind::ScriptData),
        "style" => Some(RawKind::Rawtext),
        _ => None,
    }
}

/// Reads `<name key=value ...>` from the start of `raw`.
///
/// Returns the tag name, every attribute in source order (repeats included,
/// keys lowercased, references in values decoded) and the byte length of
/// the tag including `>`.
fn scan_start_tag(raw: &str) -> Option<(&str, Vec<(String, String)>, usize)> {
    let is_space = |c: char| c.is_ascii_whitespace();
    let rest = raw.strip_prefix('<')?;
    let name_len = rest.find(|c: char| is_space(c) || c == '/' || c == '>')?;
    if name_len == 0 {
        return None;
    }
    let name = &rest[..name_len];

    let mut pos = 1 + name_len;
    let mut attrs = vec![];
    loop {
        let rest = raw[pos..].trim_start_matches(|c: char| is_space(c) || c == '/');
        pos = raw.len() - rest.len();
        if rest.starts_with('>') {
            return Some((name, attrs, pos + 1));
        }

        let key_len = rest.find(|c: char| is_space(c) || matches!(c, '/' | '>' | '='))?;
        if key_len == 0 {
            return None;
        }
        let key = rest[..key_len].to_ascii_lowercase();
        pos += key_len;

        let mut value = "";
        if let Some(after) = raw[pos..].trim_start_matches(is_space).strip_prefix('=') {
            let v = after.trim_start_matches(is_space);
            pos = raw.len() - v.len();
            match v.chars().next()? {
                quote @ ('"' | '\'') => {
                    let close = v[1..].find(quote)?;
                    value = &v[1..close + 1];
                    pos += close + 2;
                }
                _ => {
                    let len = v.find(|c: char| is_space(c) || c == '>').unwrap_or(v.len());
                    value = &v[..len];
                    pos += len;
                }
            }
        }
        attrs.push((key, unescape(value)));
    }
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        match tail.find(';') {
            Some(semi)
                if semi > 0
                    && tail[..semi]
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '#') =>
            {
                out.push_str(&decode_entity(&tail[..semi]));
                rest = &tail[semi + 1..];
            }
            _ => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Tokenizes a complete HTML document into an event stream.
///
/// Adjacent character data is merged into a single [`Event::Text`], and
/// character references are already decoded inside it. Self-closing tags
/// such as `<br />` produce a start tag immediately followed by an end tag.
/// Repeated attributes on a start tag are all kept, in source order.
pub fn tokenize(html: &str) -> Vec<Event> {
    let mut tokenizer = Tokenizer::new(EventSink::new(html), TokenizerOpts::default());
    let mut input = BufferQueue::new();

    // a tag is emitted when its `>` is consumed, so each start tag closes
    // exactly at the end of the chunk being fed
    for chunk in html.split_inclusive('>') {
        tokenizer.sink.chunk_end += chunk.len();
        input.push_back(StrTendril::from_slice(chunk));
        let _ = tokenizer.feed(&mut input);
    }
    tokenizer.end();

    tokenizer.sink.events
}

/// Decodes the body of a character reference (`amp`, `#38`, `#x26`).
///
/// Unknown references are returned as written.
pub fn decode_entity(name: &str) -> String {
    let decoded = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => name.strip_prefix('#').and_then(|num| {
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => num.parse::<u32>().ok(),
            };
            code.and_then(char::from_u32)
        }),
    };

    match decoded {
        Some(ch) => ch.to_string(),
        None => format!("&{};", name),
    }
}
