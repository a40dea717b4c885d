//! Lexer for snippet templates using logos
//!
//! Lexing happens in two layers. [`Segment`] splits a template body into
//! literal text and the delimiters of `{{ ... }}` tags and `{# ... #}`
//! comments. The inside of each tag is then lexed into [`Token`]s for the
//! grammar.

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Top-level pieces of a template body
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    #[token("{{")]
    TagOpen,
    #[token("}}")]
    TagClose,
    #[token("{#")]
    CommentOpen,
    #[token("#}")]
    CommentClose,

    #[regex(r"[^{}#]+")]
    Text,

    // A lone brace or hash that does not form a delimiter
    #[regex(r"[{}#]")]
    Punct,
}

/// Pieces of a tag body, scanned only to find where the tag closes
///
/// String literals are matched whole so that a `}}` inside quotes does not
/// end the tag.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum TagPart {
    #[token("}}")]
    Close,
    #[token("{{")]
    Open,

    #[regex(r#""([^"\\]|\\.)*""#)]
    Quoted,
    #[regex(r#"[^{}"]+"#)]
    Other,

    // An unterminated quote or a lone brace
    #[regex(r#"[{}"]"#)]
    Punct,
}

/// Tokens inside a `{{ ... }}` tag
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    // Statement keywords
    #[token("field")]
    Field,
    #[token("data")]
    Data,
    #[token("include")]
    Include,

    // Delimiters
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,

    // Literals - identifiers must come after keywords
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    String(String),
}

/// Strip the quotes from a string literal and resolve its escapes
fn unescape(literal: &str) -> String {
    let inner = &literal[1..literal.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Split a template body into segments with spans
///
/// After a `{{` the lexer morphs into [`TagPart`] until the matching `}}`,
/// and the whole tag body comes through as one `Text` segment.
pub fn segments(input: &str) -> impl Iterator<Item = (Segment, Span)> + '_ {
    let mut out = Vec::new();
    let mut body = Segment::lexer(input);

    while let Some(seg) = body.next() {
        // Every byte is covered by Text or Punct, so lexing cannot fail here
        let seg = seg.unwrap_or(Segment::Text);
        out.push((seg, body.span()));
        if seg != Segment::TagOpen {
            continue;
        }

        let mut tag = body.morph::<TagPart>();
        let mut text: Option<Span> = None;
        while let Some(part) = tag.next() {
            let span = tag.span();
            match part {
                Ok(TagPart::Close) => {
                    flush_text(&mut out, text.take());
                    out.push((Segment::TagClose, span));
                    break;
                }
                Ok(TagPart::Open) => {
                    flush_text(&mut out, text.take());
                    out.push((Segment::TagOpen, span));
                }
                _ => {
                    text = Some(match text {
                        Some(prev) => prev.start..span.end,
                        None => span,
                    });
                }
            }
        }
        flush_text(&mut out, text);
        body = tag.morph();
    }

    out.into_iter()
}

fn flush_text(out: &mut Vec<(Segment, Span)>, text: Option<Span>) {
    if let Some(span) = text {
        out.push((Segment::Text, span));
    }
}

/// Lex the inside of a tag into tokens with spans
///
/// Unrecognised characters come through as `Err(())` so the grammar can
/// report them instead of skipping them.
pub fn lex(input: &str) -> impl Iterator<Item = (Result<Token, ()>, Span)> + '_ {
    Token::lexer(input).spanned()
}
