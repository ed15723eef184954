// The binder: resolves word names to dictionary entries ahead of dispatch.
//
// Binding is only an optimization. A name that is not defined yet stays a
// Symbol and is looked up when it runs, which is what lets `define` bodies
// refer to themselves or to words defined later.

use std::rc::Rc;

use crate::interpreter::Interpreter;
use crate::parser::Quotation;
use crate::tokenizer::{Span, Token, TokenKind};

// A block being rebuilt: where it came from and what has been bound so far
struct Frame<'q> {
    source: &'q Quotation,
    span: Span, // span of the token that held the block
    next: usize,
    tokens: Vec<Token>,
}

impl<'q> Frame<'q> {
    fn new(source: &'q Quotation, span: Span) -> Self {
        Self {
            source,
            span,
            next: 0,
            tokens: Vec::with_capacity(source.tokens.len()),
        }
    }

    fn finish(self) -> Quotation {
        let mut bound = Quotation::new(self.tokens, self.source.span, self.source.token_count);
        bound.bound = true;
        bound
    }
}

impl Interpreter {
    // Returns a bound copy of `quotation`; the input is left untouched.
    // Unbound nested blocks are walked with an explicit frame stack.
    pub fn compile(&self, quotation: &Quotation) -> Quotation {
        let mut frames = vec![Frame::new(quotation, quotation.span)];
        loop {
            let Some(frame) = frames.last_mut() else {
                return Quotation::new(Vec::new(), quotation.span, quotation.token_count);
            };
            let source = frame.source;
            if let Some(token) = source.tokens.get(frame.next) {
                frame.next += 1;
                match &token.kind {
                    TokenKind::Quotation(inner) if !inner.bound => frames.push(Frame::new(inner, token.span)),
                    _ => frame.tokens.push(self.bind_token(token)),
                }
                continue;
            }

            let Some(done) = frames.pop() else {
                continue;
            };
            let span = done.span;
            let bound = done.finish();
            match frames.last_mut() {
                Some(parent) => parent
                    .tokens
                    .push(Token::new(TokenKind::Quotation(Rc::new(bound)), span)),
                None => return bound,
            }
        }
    }

    fn bind_token(&self, token: &Token) -> Token {
        match &token.kind {
            TokenKind::Symbol(name) => match self.lookup(name) {
                Some(word) => Token::new(TokenKind::Word(word), token.span),
                None => token.clone(),
            },
            _ => token.clone(),
        }
    }
}
