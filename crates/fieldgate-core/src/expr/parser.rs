use crate::{
    config::DslConfig,
    expr::{
        BoolOp, ExprError, ExpressionNode, Leaf,
        lexer::{Token, TokenKind, tokenize},
    },
};

///
/// Filter parser
///
/// Recursive descent over the token stream. Each nesting level is a list of
/// operands separated by `&&`/`||`:
///
/// - a level made only of clauses folds right-associatively, so mixed
///   operators split on the first one and recurse on the rest;
/// - a level that contains a parenthesized group must use a single operator
///   kind, since grouping is how the caller states precedence;
/// - a level made only of groups holds one or two of them.
///
/// Nothing partial is ever returned: the first error aborts the parse.
///

pub(crate) fn parse_grammar(
    source: &str,
    config: &DslConfig,
) -> Result<ExpressionNode, ExprError> {
    if source.len() > config.max_source_len {
        return Err(ExprError::TooLong {
            len: source.len(),
            max: config.max_source_len,
        });
    }

    let open = source.matches('(').count();
    let close = source.matches(')').count();
    if open != close {
        return Err(ExprError::UnbalancedParentheses { open, close });
    }

    let tokens = tokenize(source);
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        max_depth: config.max_depth,
    };

    parser.parse_level(0)
}

struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
    max_depth: usize,
}

impl<'a> Parser<'_, 'a> {
    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    // Parse operands until a closing paren or the end of input.
    fn parse_level(&mut self, depth: usize) -> Result<ExpressionNode, ExprError> {
        let mut operands = Vec::new();
        let mut operators: Vec<(BoolOp, usize)> = Vec::new();
        let mut has_group = false;
        let mut has_clause = false;
        let mut expect_operand = true;

        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Close if depth == 0 => {
                    return Err(ExprError::UnexpectedClose {
                        offset: token.offset,
                    });
                }
                TokenKind::Close => break,

                TokenKind::Open => {
                    if !expect_operand {
                        return Err(ExprError::MissingOperator {
                            offset: token.offset,
                        });
                    }
                    operands.push(self.parse_group(token.offset, depth)?);
                    has_group = true;
                    expect_operand = false;
                }

                TokenKind::Clause(text) => {
                    if !expect_operand {
                        return Err(ExprError::MissingOperator {
                            offset: token.offset,
                        });
                    }
                    self.pos += 1;
                    operands.push(ExpressionNode::Leaf(Leaf::parse_clause(text, token.offset)?));
                    has_clause = true;
                    expect_operand = false;
                }

                TokenKind::And | TokenKind::Or => {
                    if expect_operand {
                        return Err(ExprError::DanglingOperator {
                            offset: token.offset,
                        });
                    }
                    self.pos += 1;
                    let op = if token.kind == TokenKind::And {
                        BoolOp::And
                    } else {
                        BoolOp::Or
                    };
                    operators.push((op, token.offset));
                    expect_operand = true;
                }
            }
        }

        if let Some(&(_, offset)) = operators.last()
            && expect_operand
        {
            return Err(ExprError::DanglingOperator { offset });
        }

        if has_group
            && let Some(&(first, _)) = operators.first()
            && let Some(&(_, offset)) = operators.iter().find(|(op, _)| *op != first)
        {
            return Err(ExprError::MixedOperators { offset });
        }

        // A level made only of groups holds one or two of them.
        if has_group
            && !has_clause
            && let Some(&(_, offset)) = operators.get(1)
        {
            return Err(ExprError::TooManyGroups {
                offset,
                groups: operands.len(),
            });
        }

        Self::fold(operands, operators)
    }

    fn parse_group(&mut self, open_offset: usize, depth: usize) -> Result<ExpressionNode, ExprError> {
        if depth + 1 > self.max_depth {
            return Err(ExprError::TooDeep {
                offset: open_offset,
                max: self.max_depth,
            });
        }

        // consume '('
        self.pos += 1;
        if matches!(self.peek(), Some(Token { kind: TokenKind::Close, .. })) {
            return Err(ExprError::EmptyGroup {
                offset: open_offset,
            });
        }

        let inner = self.parse_level(depth + 1)?;
        match self.peek() {
            Some(Token {
                kind: TokenKind::Close,
                ..
            }) => {
                self.pos += 1;
                Ok(inner)
            }
            _ => Err(ExprError::UnclosedGroup {
                offset: open_offset,
            }),
        }
    }

    // Right fold: operator i joins operand i with the fold of everything after it.
    fn fold(
        mut operands: Vec<ExpressionNode>,
        mut operators: Vec<(BoolOp, usize)>,
    ) -> Result<ExpressionNode, ExprError> {
        let mut node = operands.pop().ok_or(ExprError::Empty)?;
        while let Some(left) = operands.pop() {
            let (op, _) = operators
                .pop()
                .ok_or(ExprError::MissingOperator { offset: 0 })?;
            node = ExpressionNode::composite(op, left, node);
        }

        Ok(node)
    }
}
