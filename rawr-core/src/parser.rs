// Converts the flat token stream into a tree of Quotations.
//
// RAWRCAT EXECUTION MODEL:
// - A program is a Quotation: the whole stream treated as one unbracketed block
// - Quotation elements are stored tail-first so the engine can pop the next
//   token to run from the end of a Vec in O(1)
// - Brackets disappear here; a nested block becomes a single Quotation token

use std::rc::Rc;

use thiserror::Error;

use crate::tokenizer::{Span, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    // Internal sentinel: the character stream is exhausted
    #[error("EndOfData")]
    EndOfData,
    #[error("UnbalancedQuotation at offset {offset}")]
    UnbalancedQuotation { offset: usize },
    #[error("UnterminatedQuotation: {depth} open bracket(s) at end of input")]
    UnterminatedQuotation { depth: usize },
}

#[derive(Debug, Clone)]
pub struct Quotation {
    pub tokens: Vec<Token>, // tail-first: `tokens.last()` runs first
    pub span: Span,
    pub token_count: usize, // source tokens covered, brackets included
    pub bound: bool,        // set by the binder so nested blocks are bound once
}

impl Quotation {
    pub fn new(tokens: Vec<Token>, span: Span, token_count: usize) -> Self {
        Self {
            tokens,
            span,
            token_count,
            bound: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    // Elements in the order they were written
    pub fn source_order(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().rev()
    }

    // Deepest bracket nesting below this quotation (0 for a flat block)
    pub fn max_depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending: Vec<(&Quotation, usize)> = vec![(self, 0)];
        while let Some((quotation, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            for token in &quotation.tokens {
                if let TokenKind::Quotation(inner) = &token.kind {
                    pending.push((inner, depth + 1));
                }
            }
        }
        deepest
    }
}

// Nested blocks are unlinked through a work list; a recursive drop would
// overflow the native stack on deeply bracketed input
impl Drop for Quotation {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.tokens);
        while let Some(token) = pending.pop() {
            if let TokenKind::Quotation(inner) = token.kind {
                if let Ok(mut inner) = Rc::try_unwrap(inner) {
                    pending.append(&mut inner.tokens);
                }
            }
        }
    }
}

// An open bracket waiting for its close
struct Frame {
    begin: usize,       // span begin of the '[' token
    first_index: usize, // stream index of the '[' token
    tokens: Vec<Token>,
}

impl Frame {
    fn close(mut self, end: usize, close_index: usize) -> Quotation {
        self.tokens.reverse();
        Quotation::new(
            self.tokens,
            Span::new(self.begin, end),
            close_index - self.first_index + 1,
        )
    }
}

// RUST CONCEPT: Explicit frame stack instead of recursion
// Nesting depth is bounded by memory, not by the native call stack.
pub fn parse(tokens: &[Token]) -> Result<Quotation, ParseError> {
    let mut frames = vec![Frame {
        begin: 0,
        first_index: 0,
        tokens: Vec::new(),
    }];

    for (index, token) in tokens.iter().enumerate() {
        match &token.kind {
            TokenKind::BeginQuotation(_) => frames.push(Frame {
                begin: token.span.begin,
                first_index: index,
                tokens: Vec::new(),
            }),
            TokenKind::EndQuotation(_) => {
                if frames.len() < 2 {
                    return Err(ParseError::UnbalancedQuotation {
                        offset: token.span.begin,
                    });
                }
                let frame = frames.pop().ok_or(ParseError::UnbalancedQuotation {
                    offset: token.span.begin,
                })?;
                let quotation = frame.close(token.span.end, index);
                let span = quotation.span;
                if let Some(parent) = frames.last_mut() {
                    parent
                        .tokens
                        .push(Token::new(TokenKind::Quotation(Rc::new(quotation)), span));
                }
            }
            _ => {
                if let Some(current) = frames.last_mut() {
                    current.tokens.push(token.clone());
                }
            }
        }
    }

    if frames.len() > 1 {
        return Err(ParseError::UnterminatedQuotation {
            depth: frames.len() - 1,
        });
    }

    let mut root = frames.pop().map(|frame| frame.tokens).unwrap_or_default();
    root.reverse();
    let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
    Ok(Quotation::new(root, Span::new(0, end), tokens.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn parse_str(input: &str) -> Quotation {
        parse(&tokenize(input).unwrap()).unwrap()
    }

    #[test]
    fn test_parse_stores_tail_first() {
        let program = parse_str("1 2 add");
        assert_eq!(program.tokens.len(), 3);
        assert!(matches!(&program.tokens[0].kind, TokenKind::Symbol(s) if &**s == "add"));
        assert!(matches!(program.tokens[2].kind, TokenKind::Integer(1)));
        assert_eq!(program.token_count, 3);
        assert_eq!(program.span, Span::new(0, 7));
    }

    #[test]
    fn test_parse_nested_quotation() {
        let program = parse_str("5 [dup [1 +] apply] apply");
        assert_eq!(program.tokens.len(), 3);
        let TokenKind::Quotation(outer) = &program.tokens[1].kind else {
            panic!("Expected quotation, got {:?}", program.tokens[1].kind);
        };
        assert_eq!(outer.span, Span::new(2, 19));
        assert_eq!(outer.tokens.len(), 3);
        assert_eq!(outer.token_count, 8);
        assert!(matches!(&outer.tokens[2].kind, TokenKind::Symbol(s) if &**s == "dup"));
        let TokenKind::Quotation(inner) = &outer.tokens[1].kind else {
            panic!("Expected inner quotation");
        };
        let names: Vec<String> = inner.source_order().map(|t| t.to_string()).collect();
        assert_eq!(names, vec!["1", "+"]);
        assert!(!inner.bound);
    }

    #[test]
    fn test_parse_empty_quotation() {
        let program = parse_str("[]");
        let TokenKind::Quotation(inner) = &program.tokens[0].kind else {
            panic!("Expected quotation");
        };
        assert!(inner.is_empty());
        assert_eq!(inner.token_count, 2);
    }

    #[test]
    fn test_max_depth_matches_bracket_depth() {
        assert_eq!(parse_str("1 2 3").max_depth(), 0);
        assert_eq!(parse_str("[1] [2]").max_depth(), 1);
        assert_eq!(parse_str("[[[1]] [2]] [[3]]").max_depth(), 3);
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        let depth = 100_000;
        let source = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        let program = parse_str(&source);
        assert_eq!(program.max_depth(), depth);
        let copy = program.clone();
        drop(program);
        assert_eq!(copy.max_depth(), depth);
    }

    #[test]
    fn test_parse_rejects_stray_close_in_token_stream() {
        let tokens = vec![Token::new(TokenKind::EndQuotation(1), Span::new(0, 1))];
        assert_eq!(
            parse(&tokens).unwrap_err(),
            ParseError::UnbalancedQuotation { offset: 0 }
        );
    }

    #[test]
    fn test_parse_rejects_unclosed_token_stream() {
        let tokens = vec![Token::new(TokenKind::BeginQuotation(1), Span::new(0, 1))];
        assert_eq!(
            parse(&tokens).unwrap_err(),
            ParseError::UnterminatedQuotation { depth: 1 }
        );
    }
}
