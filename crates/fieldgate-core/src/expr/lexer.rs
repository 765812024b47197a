///
/// Lexer
///
/// Splits a filter source into grouping, operator and clause tokens.
/// Clause text is everything between two structural tokens, trimmed of
/// surrounding whitespace; whitespace-only runs produce no token.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum TokenKind<'a> {
    Open,
    Close,
    And,
    Or,
    Clause(&'a str),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Token<'a> {
    pub(crate) kind: TokenKind<'a>,
    /// Byte offset of the token in the source.
    pub(crate) offset: usize,
}

pub(crate) fn tokenize(source: &str) -> Vec<Token<'_>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut clause_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let (kind, width) = match bytes[i] {
            b'(' => (TokenKind::Open, 1),
            b')' => (TokenKind::Close, 1),
            b'&' if bytes.get(i + 1) == Some(&b'&') => (TokenKind::And, 2),
            b'|' if bytes.get(i + 1) == Some(&b'|') => (TokenKind::Or, 2),
            _ => {
                i += 1;
                continue;
            }
        };

        push_clause(&mut tokens, source, clause_start, i);
        tokens.push(Token { kind, offset: i });
        i += width;
        clause_start = i;
    }
    push_clause(&mut tokens, source, clause_start, bytes.len());

    tokens
}

// Structural tokens are ASCII, so `start..end` always sits on char boundaries.
fn push_clause<'a>(tokens: &mut Vec<Token<'a>>, source: &'a str, start: usize, end: usize) {
    let raw = &source[start..end];
    let trimmed = raw.trim_start();
    let lead = raw.len() - trimmed.len();
    let trimmed = trimmed.trim_end();

    if !trimmed.is_empty() {
        tokens.push(Token {
            kind: TokenKind::Clause(trimmed),
            offset: start + lead,
        });
    }
}

///
/// TESTS
///
