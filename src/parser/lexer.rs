//! Lexer for N-Triples input using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    // Terms
    #[regex(r#"<[^<>"{}|^`\\ \t\r\n]*>"#, |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    Iri(String),

    #[regex(r"_:[A-Za-z0-9_\-]+", |lex| lex.slice()[2..].to_string())]
    BlankNode(String),

    #[regex(r#""([^"\\\r\n]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape(&s[1..s.len()-1])
    })]
    String(String),

    #[regex(r"@[a-zA-Z]+(-[a-zA-Z0-9]+)*", |lex| lex.slice()[1..].to_string())]
    LangTag(String),

    // Punctuation
    #[token("^^")]
    DoubleCaret,
    #[token(".")]
    Dot,

    // Comments (skip)
    #[regex(r"#[^\n]*", logos::skip)]
    Comment,
}

/// Resolve N-Triples string escapes (`\t`, `\n`, `\"`, `\uXXXX`, ...)
///
/// Unknown or malformed escapes are kept verbatim.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some(u @ ('u' | 'U')) => {
                let width = if u == 'u' { 4 } else { 8 };
                let hex: String = chars.by_ref().take(width).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == width => out.push(decoded),
                    _ => {
                        out.push('\\');
                        out.push(u);
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Lex input string into tokens with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}
