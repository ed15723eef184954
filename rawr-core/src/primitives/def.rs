// Words that read the token stream instead of the stack
//
// `define` and `literal` consume the tokens that follow them in the running
// quotation, so `define sq [dup mul]` never pushes `sq` or the body.

use crate::context::Context;
use crate::interpreter::Interpreter;
use crate::tokenizer::{Token, TokenKind};
use crate::value::{Callable, RuntimeError, Step, Value};

// The value a token stands for when it is taken literally
fn token_value(token: Token) -> Result<Value, RuntimeError> {
    Ok(match token.kind {
        TokenKind::String(s) => Value::String(s),
        TokenKind::Integer(i) => Value::Integer(i),
        TokenKind::BigInteger(i) => Value::BigInteger(i),
        TokenKind::Float(f) => Value::Float(f),
        TokenKind::Symbol(name) => Value::Symbol(name),
        TokenKind::Word(word) => Value::Symbol(word.name),
        TokenKind::Channel(id) => Value::Channel(id),
        TokenKind::Stack(id) => Value::Stack(id),
        TokenKind::PubSub(id) => Value::PubSub(id),
        TokenKind::Quotation(q) => Value::Callable(Callable::Quotation(q)),
        TokenKind::BeginQuotation(_) | TokenKind::EndQuotation(_) => {
            return Err(RuntimeError::TypeError(format!(
                "unparsed bracket token at offset {}",
                token.span.begin
            )));
        }
    })
}

// Define: define name [body]
// The body is bound now; names it uses that are not defined yet (including
// the word itself) are resolved when they run.
pub fn define_builtin(interp: &mut Interpreter, mut ctx: Context) -> Step {
    let name = match ctx.tokens.pop().map(|t| t.kind) {
        Some(TokenKind::Symbol(name)) | Some(TokenKind::String(name)) => name,
        Some(TokenKind::Word(word)) => word.name,
        other => {
            return Err(RuntimeError::TypeError(format!(
                "'define' expected a word name, got {}",
                describe(other.as_ref())
            )));
        }
    };
    let body = match ctx.tokens.pop().map(|t| t.kind) {
        Some(TokenKind::Quotation(body)) => body,
        other => {
            return Err(RuntimeError::TypeError(format!(
                "'define {name}' expected a quotation, got {}",
                describe(other.as_ref())
            )));
        }
    };
    interp.define_word(&name, &body);
    Ok(Some(ctx))
}

fn describe(kind: Option<&TokenKind>) -> String {
    match kind {
        None => "end of input".to_string(),
        Some(kind) => format!("{kind:?}"),
    }
}

// Literal: ( -- token ), pushes the next token without running it
pub fn literal_builtin(_interp: &mut Interpreter, mut ctx: Context) -> Step {
    let token = ctx
        .tokens
        .pop()
        .ok_or_else(|| RuntimeError::TypeError("'literal' expected a token, got end of input".to_string()))?;
    ctx.push(token_value(token)?);
    Ok(Some(ctx))
}

// Trace: turn on per-token tracing for the rest of this context
pub fn trace_builtin(_interp: &mut Interpreter, mut ctx: Context) -> Step {
    ctx.trace = true;
    Ok(Some(ctx))
}
