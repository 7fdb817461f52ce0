//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::parser::ast::*;
use crate::parser::lexer::Token;

/// Trailing part of a literal: language tag or datatype
#[derive(Debug, Clone)]
enum LiteralSuffix {
    Language(String),
    Datatype(String),
}

/// Parse N-Triples source into a document
pub fn parse(input: &str) -> Result<Document, Vec<crate::ParseError>> {
    let len = input.len();

    // Create a logos lexer and convert to token stream
    let token_iter = crate::parser::lexer::lex(input).map(|(tok, span)| (tok, span.into()));

    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    document_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn document_parser<'a, I>() -> impl Parser<'a, I, Document, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let iri = select! {
        Token::Iri(s) => s,
    };

    let resource = choice((
        iri.clone().map(Term::Iri),
        select! { Token::BlankNode(s) => Term::BlankNode(s) },
    ));

    let suffix = choice((
        select! { Token::LangTag(l) => LiteralSuffix::Language(l) },
        just(Token::DoubleCaret)
            .ignore_then(iri.clone())
            .map(LiteralSuffix::Datatype),
    ));

    let literal = select! { Token::String(s) => s }
        .then(suffix.or_not())
        .map(|(lexical, suffix)| {
            let literal = match suffix {
                None => Literal::plain(lexical),
                Some(LiteralSuffix::Language(lang)) => Literal::tagged(lexical, lang),
                Some(LiteralSuffix::Datatype(dt)) => Literal::typed(lexical, dt),
            };
            Term::Literal(literal)
        });

    let object = choice((resource.clone(), literal));

    let triple = resource
        .then(iri)
        .then(object)
        .then_ignore(just(Token::Dot))
        .map_with(|((subject, predicate), object), e| {
            Spanned::new(
                Triple {
                    subject,
                    predicate,
                    object,
                },
                span_range(&e.span()),
            )
        });

    triple
        .repeated()
        .collect()
        .then_ignore(end())
        .map(|triples| Document { triples })
}
