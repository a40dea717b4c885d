//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::ParseError;
use crate::parser::ast::*;
use crate::parser::lexer::{self, Segment, Token};

/// Where the segment walker currently is
#[derive(Clone, Copy)]
enum Position {
    Body,
    /// Inside a tag that opened at the given offset
    Tag(usize),
    /// Inside a comment that opened at the given offset
    Comment(usize),
}

/// Parse snippet template source into an AST
///
/// All syntax errors in the template are collected before returning.
pub fn parse(input: &str) -> Result<Template, Vec<ParseError>> {
    let mut nodes: Vec<Spanned<Node>> = Vec::new();
    let mut errors = Vec::new();
    let mut position = Position::Body;

    for (segment, span) in lexer::segments(input) {
        match (position, segment) {
            (Position::Body, Segment::TagOpen) => position = Position::Tag(span.start),
            (Position::Body, Segment::CommentOpen) => position = Position::Comment(span.start),
            (Position::Body, _) => push_text(&mut nodes, &input[span.clone()], span),
            (Position::Tag(start), Segment::TagClose) => {
                let inner = start + 2..span.start;
                match parse_tag(&input[inner.clone()], inner.start) {
                    Ok(node) => nodes.push(Spanned::new(node, start..span.end)),
                    Err(errs) => errors.extend(errs),
                }
                position = Position::Body;
            }
            (Position::Tag(start), Segment::TagOpen) => {
                errors.push(ParseError::Syntax {
                    span: start..span.end,
                    message: "Tags cannot be nested".to_string(),
                    expected: vec!["'}}'".to_string()],
                });
                position = Position::Tag(span.start);
            }
            (Position::Comment(_), Segment::CommentClose) => position = Position::Body,
            (Position::Tag(_), _) | (Position::Comment(_), _) => {}
        }
    }

    match position {
        Position::Body => {}
        Position::Tag(start) => errors.push(ParseError::Syntax {
            span: start..input.len(),
            message: "Unclosed tag".to_string(),
            expected: vec!["'}}'".to_string()],
        }),
        Position::Comment(start) => errors.push(ParseError::Syntax {
            span: start..input.len(),
            message: "Unclosed comment".to_string(),
            expected: vec!["'#}'".to_string()],
        }),
    }

    if errors.is_empty() {
        Ok(Template { nodes })
    } else {
        Err(errors)
    }
}

/// Append literal text, merging with a preceding text node
fn push_text(nodes: &mut Vec<Spanned<Node>>, text: &str, span: Span) {
    if let Some(Spanned {
        node: Node::Text(prev),
        span: prev_span,
    }) = nodes.last_mut()
    {
        if prev_span.end == span.start {
            prev.push_str(text);
            prev_span.end = span.end;
            return;
        }
    }
    nodes.push(Spanned::new(Node::Text(text.to_string()), span));
}

/// Parse the inside of one tag; `offset` is its position in the template
fn parse_tag(source: &str, offset: usize) -> Result<Node, Vec<ParseError>> {
    let mut tokens = Vec::new();
    for (tok, span) in lexer::lex(source) {
        let span = span.start + offset..span.end + offset;
        match tok {
            Ok(tok) => tokens.push((tok, SimpleSpan::from(span))),
            Err(()) => {
                return Err(vec![ParseError::Syntax {
                    message: format!(
                        "Unexpected character '{}'",
                        &source[span.start - offset..span.end - offset]
                    ),
                    span,
                    expected: vec![],
                }])
            }
        }
    }

    let end = offset + source.len();
    let token_stream = Stream::from_iter(tokens.into_iter())
        // Split (Token, SimpleSpan) into token and span parts
        .map((end..end).into(), |(t, s): (_, _)| (t, s));

    tag_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn tag_parser<'a, I>() -> impl Parser<'a, I, Node, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let string_literal = select! {
        Token::String(s) => s,
    }
    .map_with(|s, e| Spanned::new(s, span_range(&e.span())));

    let modifier_key = select! {
        Token::Ident(s) => s,
    }
    .try_map(|key, span: SimpleSpan| {
        let node = match key.as_str() {
            "display" => ModifierKey::Display,
            "type" => ModifierKey::Type,
            "description" => ModifierKey::Description,
            other => {
                return Err(Rich::custom(
                    span,
                    format!("Unknown field modifier '{}'", other),
                ))
            }
        };
        Ok(Spanned::new(node, span_range(&span)))
    });

    let modifier = modifier_key
        .then_ignore(just(Token::Colon))
        .then(string_literal.clone())
        .map_with(|(key, value), e| Spanned::new(Modifier { key, value }, span_range(&e.span())));

    let modifier_block = modifier
        .separated_by(just(Token::Comma))
        .allow_trailing()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::BracketOpen), just(Token::BracketClose));

    let field = just(Token::Field)
        .ignore_then(string_literal.clone())
        .then(modifier_block.or_not())
        .map(|(name, modifiers)| {
            Node::Field(FieldDecl {
                name,
                modifiers: modifiers.unwrap_or_default(),
            })
        });

    let data = just(Token::Data)
        .ignore_then(string_literal.clone())
        .map(Node::Data);

    let include = just(Token::Include)
        .ignore_then(string_literal)
        .map(Node::Include);

    choice((field, data, include)).then_ignore(end())
}
