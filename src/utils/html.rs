// src/utils/html.rs

//! Feed HTML to Telegram HTML conversion.
//!
//! Telegram accepts a small set of formatting tags. [`normalize`] runs the
//! fragment through an HTML tokenizer once, keeps that set, flattens
//! everything else to its text, and stops reading input once the output
//! reaches [`MAX_LEN`] bytes.

use std::cell::RefCell;
use std::ops::ControlFlow;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token as HtmlToken, TokenSink, TokenSinkResult, Tokenizer,
    TokenizerOpts,
};

/// Output size after which conversion stops.
pub const MAX_LEN: usize = 2500;

/// Input is handed to the tokenizer in pieces of about this many bytes.
const CHUNK_LEN: usize = 1024;

/// Tags whose text content is never emitted.
const NON_RENDERING: [&str; 2] = ["script", "style"];

/// Formatting tags preserved in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    LineBreak,
    Image,
    Bold,
    Strong,
    Italic,
    Emphasis,
    Code,
    Pre,
    S,
    Strike,
    Del,
    Underline,
}

impl Format {
    fn from_tag(tag: &str) -> Option<Self> {
        let format = match tag {
            "br" => Self::LineBreak,
            "img" => Self::Image,
            "b" => Self::Bold,
            "strong" => Self::Strong,
            "i" => Self::Italic,
            "em" => Self::Emphasis,
            "code" => Self::Code,
            "pre" => Self::Pre,
            "s" => Self::S,
            "strike" => Self::Strike,
            "del" => Self::Del,
            "u" => Self::Underline,
            _ => return None,
        };
        Some(format)
    }

    fn tag(self) -> &'static str {
        match self {
            Self::LineBreak => "br",
            Self::Image => "img",
            Self::Bold => "b",
            Self::Strong => "strong",
            Self::Italic => "i",
            Self::Emphasis => "em",
            Self::Code => "code",
            Self::Pre => "pre",
            Self::S => "s",
            Self::Strike => "strike",
            Self::Del => "del",
            Self::Underline => "u",
        }
    }

    /// Line breaks and images never take a closing tag.
    fn is_void(self) -> bool {
        matches!(self, Self::LineBreak | Self::Image)
    }
}

/// One token of the fragment, as seen by the writer.
#[derive(Debug, Clone, Copy)]
enum Token<'a> {
    Start { name: &'a str, src: Option<&'a str> },
    SelfClosing { name: &'a str },
    End { name: &'a str },
    Text(&'a str),
}

/// Streaming writer that turns tokens into Telegram HTML.
#[derive(Debug, Default)]
struct TelegramWriter {
    out: String,
    /// Name of the most recent start tag, whitelisted or not
    last_start: Option<String>,
    stopped: bool,
}

impl TelegramWriter {
    /// Feed one token. Once this returns `Break` every later token is ignored.
    fn push(&mut self, token: Token<'_>) -> ControlFlow<()> {
        if self.stopped {
            return ControlFlow::Break(());
        }
        let flow = self.step(token);
        self.stopped = flow.is_break();
        flow
    }

    fn step(&mut self, token: Token<'_>) -> ControlFlow<()> {
        match token {
            Token::Start { name, src } => match Format::from_tag(name) {
                Some(Format::LineBreak) => self.start(name, "\n"),
                Some(Format::Image) => match src {
                    Some(src) => self.start(name, &format!("{} ", src)),
                    None => self.start(name, ""),
                },
                Some(format) => self.start(name, &format!(" <{}>", format.tag())),
                None => {
                    self.last_start = Some(name.to_string());
                    ControlFlow::Continue(())
                }
            },
            Token::SelfClosing { name } => match Format::from_tag(name) {
                Some(Format::LineBreak) => self.emit("\n", false),
                _ => ControlFlow::Continue(()),
            },
            Token::End { name } => match Format::from_tag(name) {
                Some(format) if !format.is_void() => {
                    self.emit(&format!("</{}> ", format.tag()), false)
                }
                _ => ControlFlow::Continue(()),
            },
            Token::Text(text) => {
                if self
                    .last_start
                    .as_deref()
                    .is_some_and(|tag| NON_RENDERING.contains(&tag))
                {
                    return ControlFlow::Continue(());
                }
                let text = text.trim();
                if text.is_empty() {
                    return ControlFlow::Continue(());
                }
                self.emit(text, true)
            }
        }
    }

    /// Emit the marker for a whitelisted start tag and remember it.
    fn start(&mut self, name: &str, marker: &str) -> ControlFlow<()> {
        self.emit(marker, false)?;
        self.last_start = Some(name.to_string());
        ControlFlow::Continue(())
    }

    /// Append `piece`, or cut the output off if it would pass [`MAX_LEN`].
    ///
    /// Text may be split at a char boundary; markers are kept whole or dropped.
    fn emit(&mut self, piece: &str, splittable: bool) -> ControlFlow<()> {
        if self.out.len() + piece.len() <= MAX_LEN {
            self.out.push_str(piece);
            return ControlFlow::Continue(());
        }

        if splittable {
            let mut cut = MAX_LEN - self.out.len();
            while !piece.is_char_boundary(cut) {
                cut -= 1;
            }
            self.out.push_str(&piece[..cut]);
        }
        self.close_truncated();
        ControlFlow::Break(())
    }

    /// Close the most recently opened tag (only that one) and add an ellipsis.
    fn close_truncated(&mut self) {
        let open = self
            .last_start
            .as_deref()
            .and_then(Format::from_tag)
            .filter(|format| !format.is_void());

        match open {
            Some(format) => {
                self.out.push_str(&format!("</{}> ...", format.tag()));
            }
            None => self.out.push_str(" ..."),
        }
    }

    /// Bytes that can still be appended before truncation kicks in.
    fn remaining(&self) -> usize {
        MAX_LEN.saturating_sub(self.out.len())
    }
}

/// Tokenizer sink that forwards tokens to a [`TelegramWriter`].
///
/// The tokenizer reports a text run in several pieces, so character data is
/// collected until the next tag, comment or end of input.
#[derive(Debug, Default)]
struct WriterSink {
    writer: RefCell<TelegramWriter>,
    text: RefCell<String>,
}

impl WriterSink {
    fn flush_text(&self) {
        let text = std::mem::take(&mut *self.text.borrow_mut());
        if !text.is_empty() {
            let _ = self.writer.borrow_mut().push(Token::Text(&text));
        }
    }

    fn push_text(&self, chars: &str) {
        let overflowing = {
            let mut text = self.text.borrow_mut();
            text.push_str(chars);
            text.trim().len() > self.writer.borrow().remaining()
        };
        // the run can only grow, so it will be cut at this point anyway
        if overflowing {
            self.flush_text();
        }
    }

    fn push_tag(&self, kind: TagKind, name: &str, self_closing: bool, src: Option<&str>) {
        self.flush_text();
        let token = match kind {
            TagKind::StartTag if self_closing => Token::SelfClosing { name },
            TagKind::StartTag => Token::Start { name, src },
            TagKind::EndTag => Token::End { name },
        };
        let _ = self.writer.borrow_mut().push(token);
    }

    fn is_stopped(&self) -> bool {
        self.writer.borrow().stopped
    }

    fn take_output(&self) -> String {
        std::mem::take(&mut self.writer.borrow_mut().out)
    }
}

/// How the tokenizer must read the content of a start tag.
fn content_kind(name: &str) -> TokenSinkResult<()> {
    match name {
        "script" => TokenSinkResult::RawData(RawKind::ScriptData),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" => {
            TokenSinkResult::RawData(RawKind::Rawtext)
        }
        "title" | "textarea" => TokenSinkResult::RawData(RawKind::Rcdata),
        "plaintext" => TokenSinkResult::Plaintext,
        _ => TokenSinkResult::Continue,
    }
}

impl TokenSink for WriterSink {
    type Handle = ();

    fn process_token(&self, token: HtmlToken, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            HtmlToken::CharacterTokens(chars) => self.push_text(&chars),
            HtmlToken::NullCharacterToken => self.push_text("\u{fffd}"),
            HtmlToken::TagToken(tag) => {
                let src = tag
                    .attrs
                    .iter()
                    .find(|attr| &*attr.name.local == "src")
                    .map(|attr| &*attr.value);
                self.push_tag(tag.kind, &tag.name, tag.self_closing, src);

                if tag.kind == TagKind::StartTag && !tag.self_closing {
                    return content_kind(&tag.name);
                }
            }
            HtmlToken::ParseError(_) => {}
            HtmlToken::CommentToken(_) | HtmlToken::DoctypeToken(_) | HtmlToken::EOFToken => {
                self.flush_text()
            }
        }
        TokenSinkResult::Continue
    }
}

/// Convert an HTML fragment into Telegram HTML of bounded length.
///
/// Output never exceeds [`MAX_LEN`] plus one `"</tag> ..."` suffix. Markup
/// is taken token by token: unbalanced or stray tags are passed through as
/// they appear, never repaired.
pub fn normalize(fragment: &str) -> String {
    let tokenizer = Tokenizer::new(WriterSink::default(), TokenizerOpts::default());
    let input = BufferQueue::default();

    let mut rest = fragment;
    while !rest.is_empty() {
        let mut cut = CHUNK_LEN.min(rest.len());
        while !rest.is_char_boundary(cut) {
            cut += 1;
        }
        let (chunk, tail) = rest.split_at(cut);
        rest = tail;

        input.push_back(StrTendril::from_slice(chunk));
        let _ = tokenizer.feed(&input);
        if tokenizer.sink.is_stopped() {
            return tokenizer.sink.take_output();
        }
    }

    tokenizer.end();
    tokenizer.sink.take_output()
}

/// Decode HTML entities, leaving the input untouched if it has malformed ones.
pub fn decode_entities(input: &str) -> String {
    htmlescape::decode_html(input).unwrap_or_else(|e| {
        log::debug!("Keeping undecoded text ({:?})", e);
        input.to_string()
    })
}

/// Escape text for use inside Telegram HTML.
pub fn escape(text: &str) -> String {
    htmlescape::encode_minimal(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Longest possible truncation suffix.
    const MAX_SUFFIX: usize = "</strike> ...".len();

    #[test]
    fn test_plain_text_is_trimmed() {
        assert_eq!(normalize("  hello world \n"), "hello world");
    }

    #[test]
    fn test_whitelisted_tags_are_kept() {
        assert_eq!(
            normalize("<b>bold</b><i>it</i>"),
            " <b>bold</b>  <i>it</i> "
        );
        assert_eq!(normalize("<s>a</s><strike>b</strike>"), " <s>a</s>  <strike>b</strike> ");
    }

    #[test]
    fn test_line_break_variants() {
        assert_eq!(normalize("a<br>b"), "a\nb");
        assert_eq!(normalize("a<br/>b"), "a\nb");
    }

    #[test]
    fn test_image_emits_source() {
        assert_eq!(
            normalize(r#"<img alt="x" src="https://example.com/p.png">caption"#),
            "https://example.com/p.png caption"
        );
        assert_eq!(normalize("<img alt=\"no source\">text"), "text");
    }

    #[test]
    fn test_unknown_tags_are_stripped_but_text_kept() {
        let out = normalize(r#"<div><p>Hello <a href="https://x.y">link</a></p><span>there</span></div>"#);
        assert_eq!(out, "Hellolinkthere");
        assert!(!out.contains("<div>"));
        assert!(!out.contains("<a"));
        assert!(!out.contains("<p>"));
    }

    #[test]
    fn test_nested_unknown_inside_whitelisted() {
        assert_eq!(
            normalize("<b><span>inner</span></b>"),
            " <b>inner</b> "
        );
    }

    #[test]
    fn test_script_and_style_text_dropped() {
        assert_eq!(normalize("<script>alert(1)</script>"), "");
        assert_eq!(normalize("before<style>p { color: red }</style>"), "before");
    }

    #[test]
    fn test_text_after_script_is_dropped_until_next_start_tag() {
        assert_eq!(
            normalize("<script>x()</script>tail<b>kept</b>"),
            " <b>kept</b> "
        );
    }

    #[test]
    fn test_entities_decoded_in_text() {
        assert_eq!(normalize("Fish &amp; Chips &quot;today&quot;"), "Fish & Chips \"today\"");
    }

    #[test]
    fn test_malformed_markup_terminates() {
        assert_eq!(normalize("<b>unclosed <i>nested"), " <b>unclosed <i>nested");
        assert_eq!(normalize("<<<>>>"), "<<<>>>");
        assert_eq!(normalize("<b"), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_tags_are_not_repaired() {
        assert_eq!(normalize("<p>Hello <b>world</p> more"), "Hello <b>worldmore");
        assert_eq!(
            normalize("<b>a<i>b</b>c</i>"),
            " <b>a <i>b</b> c</i> "
        );
    }

    #[test]
    fn test_stray_end_tag_is_kept() {
        assert_eq!(normalize("x</i>y"), "x</i> y");
        assert_eq!(normalize("x</br>y"), "xy");
    }

    #[test]
    fn test_self_closing_tags() {
        assert_eq!(normalize("<b/>text"), "text");
        assert_eq!(normalize(r#"<img src="u"/>after"#), "after");
    }

    #[test]
    fn test_script_content_is_not_tokenized() {
        assert_eq!(
            normalize("<script>if (a<b) { x(\"</i>\") }</script><i>ok</i>"),
            " <i>ok</i> "
        );
    }

    #[test]
    fn test_text_run_split_by_entities_and_chunks() {
        let fragment = format!("{}&amp;{}", "a".repeat(CHUNK_LEN - 2), "b".repeat(10));
        let expected = format!("{}&{}", "a".repeat(CHUNK_LEN - 2), "b".repeat(10));
        assert_eq!(normalize(&fragment), expected);
    }

    #[test]
    fn test_comment_separates_text() {
        assert_eq!(normalize("one <!-- note --> two"), "onetwo");
    }

    #[test]
    fn test_short_input_is_not_truncated() {
        let out = normalize(&"a".repeat(MAX_LEN));
        assert_eq!(out.len(), MAX_LEN);
        assert!(!out.ends_with("..."));
    }

    #[test]
    fn test_long_text_truncated_with_ellipsis() {
        let out = normalize(&"a".repeat(10_000));
        assert!(out.ends_with(" ..."));
        assert_eq!(out.len(), MAX_LEN + " ...".len());
    }

    #[test]
    fn test_truncation_closes_most_recent_tag() {
        let fragment = format!("<p>intro</p><b>{}</b>", "x".repeat(5000));
        let out = normalize(&fragment);
        assert!(out.ends_with("</b> ..."));
        assert!(out.starts_with("intro <b>"));
    }

    #[test]
    fn test_truncation_does_not_close_image_or_unknown() {
        let after_image = format!(r#"<img src="u">{}"#, "y".repeat(4000));
        assert!(normalize(&after_image).ends_with("y ..."));

        let after_unknown = format!("<b>b</b><p>{}</p>", "z".repeat(4000));
        assert!(normalize(&after_unknown).ends_with("z ..."));
    }

    #[test]
    fn test_truncation_respects_multibyte_text() {
        let out = normalize(&"é".repeat(3000));
        assert!(out.ends_with(" ..."));
        assert!(out.len() <= MAX_LEN + MAX_SUFFIX);
    }

    #[test]
    fn test_input_after_truncation_is_ignored() {
        let fragment = format!("{}<b>late</b>", "w ".repeat(3000));
        let out = normalize(&fragment);
        assert!(out.ends_with(" ..."));
        assert!(!out.contains("late"));
        assert!(out.len() <= MAX_LEN + MAX_SUFFIX);
    }

    #[test]
    fn test_output_bound_for_many_tags() {
        let fragment = "<strike>word</strike> <em>more</em> ".repeat(1000);
        let out = normalize(&fragment);
        assert!(out.len() <= MAX_LEN + MAX_SUFFIX);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("&lt;b&gt;x&lt;/b&gt;"), "<b>x</b>");
        assert_eq!(decode_entities("plain"), "plain");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("A & B <c>"), "A &amp; B &lt;c&gt;");
    }
}
