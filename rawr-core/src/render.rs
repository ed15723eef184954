// Canonical text form of values and token trees.
//
// Sequences render by length so the text evaluates back to the same value:
//   0 -> nil      1 -> "a unit"      2 -> "a b pair"      3+ -> "[a b c] list"
// Quotations render bracketed in source order, strings quoted, hashes as a
// list of [key value] lists followed by `hash`.

use crate::tokenizer::{Token, TokenKind};
use crate::value::{Callable, Value};

pub fn render_element(value: &Value) -> String {
    let mut out = String::new();
    write_pieces(&mut out, Piece::Element(value));
    out
}

// Renders a stack (or any slice) with the list/pair/unit/nil rule
pub fn render_stack(values: &[Value]) -> String {
    let mut out = String::new();
    write_pieces(&mut out, Piece::Sequence(values));
    out
}

pub fn render_token(token: &Token) -> String {
    let mut out = String::new();
    write_pieces(&mut out, Piece::Token(token));
    out
}

// Renders tail-first tokens in source order, space separated
pub fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    write_pieces(&mut out, Piece::Run(tokens));
    out
}

// Work items for the renderer. Nesting is unbounded, so containers push
// their parts (last part first) instead of recursing.
enum Piece<'a> {
    Text(&'static str),
    Element(&'a Value),
    Sequence(&'a [Value]),
    Body(&'a Callable), // the part between the brackets
    Run(&'a [Token]),   // tail-first
    Token(&'a Token),
}

// Non-finite floats have no literal form, so they render as the division
// that produces them
fn write_float(out: &mut String, f: f64) {
    if f.is_nan() {
        out.push_str("0.0 0.0 div");
    } else if f.is_infinite() {
        out.push_str(if f > 0.0 { "1.0 0.0 div" } else { "-1.0 0.0 div" });
    } else {
        // Debug keeps the ".0" so the text tokenizes back to a Float
        out.push_str(&format!("{f:?}"));
    }
}

fn write_quoted(out: &mut String, text: &str) {
    out.push('"');
    out.push_str(text);
    out.push('"');
}

// Composed callables flatten into one block, so the joining space only
// goes in when both halves have text
fn body_is_empty(callable: &Callable) -> bool {
    let mut pending = vec![callable];
    while let Some(callable) = pending.pop() {
        match callable {
            Callable::Quotation(quotation) if quotation.is_empty() => {}
            Callable::Composed(first, second) => {
                pending.push(first);
                pending.push(second);
            }
            _ => return false,
        }
    }
    true
}

fn write_pieces(out: &mut String, first: Piece<'_>) {
    let mut pending = vec![first];
    while let Some(piece) = pending.pop() {
        match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Element(value) => match value {
                Value::Integer(i) => out.push_str(&i.to_string()),
                Value::BigInteger(i) => out.push_str(&i.to_string()),
                Value::Float(f) => write_float(out, *f),
                Value::String(s) => write_quoted(out, s),
                Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
                Value::Null => out.push_str("null"),
                Value::List(items) => pending.push(Piece::Sequence(items)),
                Value::Hash(entries) => {
                    out.push('[');
                    pending.push(Piece::Text("] list hash"));
                    for (i, (key, value)) in entries.iter().enumerate().rev() {
                        pending.push(Piece::Text("] list"));
                        pending.push(Piece::Element(value));
                        pending.push(Piece::Text(" "));
                        pending.push(Piece::Element(key));
                        pending.push(Piece::Text(if i > 0 { " [" } else { "[" }));
                    }
                }
                Value::Callable(callable) => {
                    out.push('[');
                    pending.push(Piece::Text("]"));
                    pending.push(Piece::Body(callable));
                }
                Value::Symbol(name) => out.push_str(name),
                Value::Channel(id) | Value::Stack(id) | Value::PubSub(id) => out.push_str(id),
            },
            Piece::Sequence(values) => match values {
                [] => out.push_str("nil"),
                [only] => {
                    pending.push(Piece::Text(" unit"));
                    pending.push(Piece::Element(only));
                }
                [first, second] => {
                    pending.push(Piece::Text(" pair"));
                    pending.push(Piece::Element(second));
                    pending.push(Piece::Text(" "));
                    pending.push(Piece::Element(first));
                }
                _ => {
                    out.push('[');
                    pending.push(Piece::Text("] list"));
                    for (i, value) in values.iter().enumerate().rev() {
                        pending.push(Piece::Element(value));
                        if i > 0 {
                            pending.push(Piece::Text(" "));
                        }
                    }
                }
            },
            Piece::Body(callable) => match callable {
                Callable::Quotation(quotation) => pending.push(Piece::Run(&quotation.tokens)),
                Callable::Composed(first, second) => {
                    pending.push(Piece::Body(second));
                    if !body_is_empty(first) && !body_is_empty(second) {
                        pending.push(Piece::Text(" "));
                    }
                    pending.push(Piece::Body(first));
                }
                Callable::Quoted(value) => pending.push(Piece::Element(value)),
                Callable::Word(word) => out.push_str(&word.name),
            },
            // Storage order is the reverse of source order, which is the
            // order the work stack wants them in
            Piece::Run(tokens) => {
                for (i, token) in tokens.iter().enumerate() {
                    if i > 0 {
                        pending.push(Piece::Text(" "));
                    }
                    pending.push(Piece::Token(token));
                }
            }
            Piece::Token(token) => match &token.kind {
                TokenKind::String(s) => write_quoted(out, s),
                TokenKind::Integer(i) => out.push_str(&i.to_string()),
                TokenKind::BigInteger(i) => out.push_str(&i.to_string()),
                TokenKind::Float(f) => write_float(out, *f),
                TokenKind::Symbol(name) => out.push_str(name),
                TokenKind::Word(word) => out.push_str(&word.name),
                TokenKind::BeginQuotation(_) => out.push('['),
                TokenKind::EndQuotation(_) => out.push(']'),
                TokenKind::Channel(id) | TokenKind::Stack(id) | TokenKind::PubSub(id) => out.push_str(id),
                TokenKind::Quotation(quotation) => {
                    out.push('[');
                    pending.push(Piece::Text("]"));
                    pending.push(Piece::Run(&quotation.tokens));
                }
            },
        }
    }
}

// ---- guest-level tracing ----

pub struct TraceLine<'a> {
    pub thread: Option<&'a str>,
    pub count: u64,
    pub depth: usize,
    pub pending: &'a [Token], // tail-first, not including `token`
    pub token: &'a Token,
    pub stack: &'a [Value],
    pub width: usize,
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

// Keep the last `max` characters, marking the cut with "..."
fn keep_tail(text: &str, max: usize) -> String {
    let len = char_len(text);
    if len <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let tail: String = text.chars().skip(len - keep).collect();
    format!("...{tail}")
}

// Keep the first `max` characters, marking the cut with "..."
fn keep_head(text: &str, max: usize) -> String {
    if char_len(text) <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let head: String = text.chars().take(keep).collect();
    format!("{head}...")
}

// One line per dispatched token:
//   <thread>:<count>:<indent>| <pending...> <token> --> [<stack, top first>]
// with the token right-aligned at 60% of the width.
pub fn trace_line(line: &TraceLine<'_>) -> String {
    let prefix = match line.thread {
        Some(thread) => format!("{thread}:{}:{}| ", line.count, " ".repeat(line.depth)),
        None => format!("{}:{}| ", line.count, " ".repeat(line.depth)),
    };
    let token = render_token(line.token);
    let midpoint = line.width * 6 / 10;

    let room = midpoint.saturating_sub(char_len(&prefix) + char_len(&token) + 1);
    let pending = keep_tail(&render_tokens(line.pending), room);
    let left = if pending.is_empty() {
        format!("{prefix}{token}")
    } else {
        format!("{prefix}{pending} {token}")
    };
    let padding = midpoint.saturating_sub(char_len(&left));

    let mut top_first = String::from("[");
    for (i, value) in line.stack.iter().rev().enumerate() {
        if i > 0 {
            top_first.push(' ');
        }
        write_pieces(&mut top_first, Piece::Element(value));
    }
    top_first.push(']');

    let used = char_len(&left) + padding + " --> ".len();
    let stack = keep_head(&top_first, line.width.saturating_sub(used));
    format!("{}{left} --> {stack}", " ".repeat(padding))
}
