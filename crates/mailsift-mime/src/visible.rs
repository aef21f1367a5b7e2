//! Visible-text extraction from HTML bodies.
//!
//! The document is run through the html5ever tokenizer as a flat stream of
//! tags and text; no tree is built. [`visible_text`] drops the text inside
//! non-visible elements using a single on/off flag. Nesting of the same
//! element is not tracked: the first matching end tag turns the flag off
//! again.

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};

/// Start tags that hide the text following them until the matching end tag.
pub const NON_VISIBLE_TAGS: [&str; 8] = [
    "style",
    "script",
    "head",
    "meta",
    "doctype",
    "v:shape",
    "v:imagedata",
    "!",
];

/// Elements whose content is one text token with no markup inside.
fn raw_kind(name: &str) -> Option<RawKind> {
    match name {
        "script" => Some(RawKind::ScriptData),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => Some(RawKind::Rawtext),
        "textarea" | "title" => Some(RawKind::Rcdata),
        _ => None,
    }
}

/// Collects visible text runs while the tokenizer feeds it.
#[derive(Debug, Default)]
struct VisibleSink {
    chunks: Vec<String>,
    pending: String,
    suppress: bool,
}

impl VisibleSink {
    /// Ends the current text run. html5ever splits one run into several
    /// character tokens (around references, for example), so text is only
    /// emitted once a non-text token arrives.
    fn flush(&mut self) {
        if !self.suppress {
            let text = self.pending.trim();
            if !text.is_empty() {
                self.chunks.push(text.to_string());
            }
        }
        self.pending.clear();
    }

    fn tag(&mut self, tag: &Tag) -> TokenSinkResult<()> {
        let name = &*tag.name;
        let hides = NON_VISIBLE_TAGS.contains(&name);
        match tag.kind {
            TagKind::StartTag if tag.self_closing => TokenSinkResult::Continue,
            TagKind::StartTag => {
                if hides {
                    self.suppress = true;
                }
                raw_kind(name).map_or(TokenSinkResult::Continue, TokenSinkResult::RawData)
            }
            TagKind::EndTag => {
                if hides {
                    self.suppress = false;
                }
                TokenSinkResult::Continue
            }
        }
    }
}

impl TokenSink for VisibleSink {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::CharacterTokens(text) => {
                self.pending.push_str(&text);
                TokenSinkResult::Continue
            }
            // Recoverable; the tokenizer carries on the way a browser would.
            Token::NullCharacterToken | Token::ParseError(_) => TokenSinkResult::Continue,
            Token::TagToken(tag) => {
                self.flush();
                self.tag(&tag)
            }
            Token::CommentToken(_) | Token::DoctypeToken(_) | Token::EOFToken => {
                self.flush();
                TokenSinkResult::Continue
            }
        }
    }
}

/// Returns the human-visible text chunks of an HTML document, in order.
///
/// Each text run outside a non-visible element is trimmed; empty chunks are
/// dropped. Character references are decoded. Malformed markup is recovered
/// from rather than reported, so extraction always yields a result; use
/// [`DecodedBody::html_text`](crate::DecodedBody::html_text) to get the
/// document as text in its declared charset.
#[must_use]
pub fn visible_text(html: &str) -> Vec<String> {
    let mut input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(html));

    let mut tokenizer = Tokenizer::new(VisibleSink::default(), TokenizerOpts::default());
    let _ = tokenizer.feed(&mut input);
    tokenizer.end();
    tokenizer.sink.chunks
}
