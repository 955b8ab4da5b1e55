//! Allowlist sanitizer for rich-text content.
//!
//! Content is tokenized with html5ever's error-tolerant tokenizer and
//! re-serialized, keeping only allowlisted formatting tags:
//! - disallowed tags are stripped and their text kept
//! - raw-text elements (`script`, `style`, ...) are dropped together with
//!   their content
//! - event handlers and `javascript:`/`vbscript:`/`data:` links are removed
//! - output tags are always balanced
//!
//! Sanitizing never fails: malformed markup degrades to its text.

use std::cell::{Cell, RefCell};

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use html5ever::tokenizer::states::RawKind;

/// Which tags survive sanitizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allowlist {
    /// Inline formatting only (headings).
    Inline,
    /// Inline formatting plus paragraphs and lists (body text).
    Body,
    /// No tags at all; text only.
    None,
}

const INLINE_TAGS: &[&str] = &["b", "strong", "i", "em", "u", "s", "strike", "a", "br", "span"];
const BODY_TAGS: &[&str] = &["ul", "ol", "li", "p"];

impl Allowlist {
    fn allows(self, tag: &str) -> bool {
        match self {
            Allowlist::Inline => INLINE_TAGS.contains(&tag),
            Allowlist::Body => INLINE_TAGS.contains(&tag) || BODY_TAGS.contains(&tag),
            Allowlist::None => false,
        }
    }
}

/// Elements removed together with everything inside them.
///
/// Each switches the tokenizer to a raw-text state that only the matching
/// end tag leaves. Other unsafe elements (`svg`, `object`, ...) are
/// stripped like any disallowed tag.
const DROPPED_WITH_CONTENT: &[&str] = &[
    "script", "style", "iframe", "noscript", "noembed", "noframes", "textarea", "title", "xmp",
];

const VOID_TAGS: &[&str] = &["br"];

/// Sanitize `html` against `allow`, returning safe HTML.
pub fn sanitize(html: &str, allow: Allowlist) -> String {
    if !html.contains(['<', '&', '>', '"', '\'']) {
        return html.to_string();
    }
    let sink = SanitizeSink::new(allow);
    let tokenizer = Tokenizer::new(sink, TokenizerOpts::default());
    let queue = BufferQueue::default();
    queue.push_back(StrTendril::from(html));
    let _ = tokenizer.feed(&queue);
    tokenizer.end();
    tokenizer.sink.finish()
}

/// Strip every tag, returning escaped plain text.
pub fn strip_tags(html: &str) -> String {
    sanitize(html, Allowlist::None)
}

/// Strip every tag and decode entities, returning raw text.
pub fn plain_text(html: &str) -> String {
    let sink = SanitizeSink::new(Allowlist::None);
    sink.raw_text.set(true);
    let tokenizer = Tokenizer::new(sink, TokenizerOpts::default());
    let queue = BufferQueue::default();
    queue.push_back(StrTendril::from(html));
    let _ = tokenizer.feed(&queue);
    tokenizer.end();
    tokenizer.sink.finish()
}

/// Escape text for use in element content or a quoted attribute.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Whether a link target uses a scheme that can run code.
pub fn is_unsafe_url(url: &str) -> bool {
    // Browsers ignore embedded whitespace and control characters in schemes.
    let compact: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    ["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|scheme| compact.starts_with(scheme))
}

/// Token sink that re-serializes allowed tokens.
///
/// The tokenizer drives the sink through `&self`, so state lives in cells.
struct SanitizeSink {
    allow: Allowlist,
    out: RefCell<String>,
    open: RefCell<Vec<String>>,
    drop_depth: Cell<usize>,
    raw_text: Cell<bool>,
}

impl SanitizeSink {
    fn new(allow: Allowlist) -> Self {
        Self {
            allow,
            out: RefCell::new(String::new()),
            open: RefCell::new(Vec::new()),
            drop_depth: Cell::new(0),
            raw_text: Cell::new(false),
        }
    }

    fn finish(&self) -> String {
        let mut out = self.out.take();
        for tag in self.open.take().iter().rev() {
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        out
    }

    fn start_tag(&self, tag: &Tag) -> TokenSinkResult<()> {
        let name: &str = &tag.name;
        if DROPPED_WITH_CONTENT.contains(&name) {
            if !tag.self_closing {
                self.drop_depth.set(self.drop_depth.get() + 1);
                return match name {
                    "script" => TokenSinkResult::RawData(RawKind::ScriptData),
                    "textarea" | "title" => TokenSinkResult::RawData(RawKind::Rcdata),
                    _ => TokenSinkResult::RawData(RawKind::Rawtext),
                };
            }
            return TokenSinkResult::Continue;
        }
        if self.drop_depth.get() > 0 || !self.allow.allows(name) {
            return TokenSinkResult::Continue;
        }

        let mut out = self.out.borrow_mut();
        out.push('<');
        out.push_str(name);
        for attr in &tag.attrs {
            let attr_name: &str = &attr.name.local;
            let value: &str = &attr.value;
            if !is_allowed_attribute(name, attr_name, value) {
                continue;
            }
            out.push(' ');
            out.push_str(attr_name);
            out.push_str("=\"");
            out.push_str(&escape_html(value));
            out.push('"');
        }
        out.push('>');

        if !VOID_TAGS.contains(&name) && !tag.self_closing {
            self.open.borrow_mut().push(name.to_string());
        }
        TokenSinkResult::Continue
    }

    fn end_tag(&self, tag: &Tag) {
        let name: &str = &tag.name;
        if DROPPED_WITH_CONTENT.contains(&name) {
            self.drop_depth.set(self.drop_depth.get().saturating_sub(1));
            return;
        }
        if self.drop_depth.get() > 0 {
            return;
        }

        let mut open = self.open.borrow_mut();
        // Unmatched end tags are ignored; a matched one closes anything
        // still open inside it.
        let Some(pos) = open.iter().rposition(|t| t == name) else {
            return;
        };
        let mut out = self.out.borrow_mut();
        for closing in open.drain(pos..).rev() {
            out.push_str("</");
            out.push_str(&closing);
            out.push('>');
        }
    }

    fn text(&self, text: &str) {
        if self.drop_depth.get() > 0 {
            return;
        }
        let mut out = self.out.borrow_mut();
        if self.raw_text.get() {
            out.push_str(text);
        } else {
            out.push_str(&escape_html(text));
        }
    }
}

fn is_allowed_attribute(tag: &str, name: &str, value: &str) -> bool {
    if name.starts_with("on") {
        return false;
    }
    match name {
        "class" | "title" => true,
        "href" => tag == "a" && !is_unsafe_url(value),
        "target" | "rel" => tag == "a",
        _ => false,
    }
}

impl TokenSink for SanitizeSink {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => return self.start_tag(&tag),
                TagKind::EndTag => self.end_tag(&tag),
            },
            Token::CharacterTokens(text) => self.text(&text),
            // Comments, doctypes and parse errors
            _ => {}
        }
        TokenSinkResult::Continue
    }
}
