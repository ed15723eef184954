// RUST CONCEPT: Runtime values as a closed sum type
// Every dispatch point matches exhaustively over these variants, so adding a
// kind is a compile error everywhere it has not been handled yet.

use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use thiserror::Error;

use crate::context::Context;
use crate::interpreter::Interpreter;
use crate::parser::{ParseError, Quotation};
use crate::render::render_element;

// What a native word or continuation hands back to the trampoline:
// Ok(Some(ctx)) keeps running `ctx`, Ok(None) halts or parks it.
pub type Step = Result<Option<Context>, RuntimeError>;

pub type NativeFn = fn(&mut Interpreter, Context) -> Step;

#[derive(Clone)]
pub enum WordBody {
    Native(NativeFn),
    Quotation(Rc<Quotation>),
}

impl fmt::Debug for WordBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordBody::Native(_) => write!(f, "Native(<fn>)"),
            WordBody::Quotation(q) => write!(f, "Quotation({} tokens)", q.tokens.len()),
        }
    }
}

// A resolved dictionary entry. Keeps the name it was looked up by for
// rendering and diagnostics.
#[derive(Debug, Clone)]
pub struct Word {
    pub name: Rc<str>,
    pub body: WordBody,
}

impl Word {
    pub fn new(name: Rc<str>, body: WordBody) -> Self {
        Self { name, body }
    }
}

#[derive(Debug, Clone)]
pub enum Callable {
    Quotation(Rc<Quotation>),
    // Runs the first callable, then the second, on the same stack
    Composed(Rc<Callable>, Rc<Callable>),
    // Produced by `quote`: pushes the wrapped value when invoked
    Quoted(Rc<Value>),
    Word(Word),
}

impl Callable {
    // Identity comparison; callables have no structural equality
    pub fn same(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Quotation(a), Callable::Quotation(b)) => Rc::ptr_eq(a, b),
            (Callable::Composed(a1, a2), Callable::Composed(b1, b2)) => {
                Rc::ptr_eq(a1, b1) && Rc::ptr_eq(a2, b2)
            }
            (Callable::Quoted(a), Callable::Quoted(b)) => a == b,
            (Callable::Word(a), Callable::Word(b)) => a.name == b.name,
            _ => false,
        }
    }

    fn release_children(&mut self, pending: &mut Vec<Value>) {
        match self {
            Callable::Quoted(value) => {
                if let Some(value) = Rc::get_mut(value) {
                    pending.push(std::mem::replace(value, Value::Null));
                }
            }
            Callable::Composed(first, second) => {
                for part in [first, second] {
                    if let Some(part) = Rc::get_mut(part) {
                        let inner = std::mem::replace(part, Callable::Quoted(Rc::new(Value::Null)));
                        pending.push(Value::Callable(inner));
                    }
                }
            }
            Callable::Quotation(_) | Callable::Word(_) => {}
        }
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    BigInteger(BigInt), // only when the result does not fit in i64
    Float(f64),
    String(Rc<str>),
    Boolean(bool),
    Null,
    // RUST CONCEPT: Copy-on-write sharing
    // Cloning a list is a refcount bump; words that change a list go through
    // Rc::make_mut, which copies only when someone else still holds it.
    List(Rc<Vec<Value>>),
    Hash(Rc<Vec<(Value, Value)>>), // insertion-ordered
    Callable(Callable),
    Symbol(Rc<str>), // a word name pushed by `literal`
    Channel(Rc<str>),
    Stack(Rc<str>),
    PubSub(Rc<str>),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(items))
    }

    pub fn string(text: &str) -> Self {
        Value::String(Rc::from(text))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) | Value::BigInteger(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Null => "null",
            Value::List(_) => "list",
            Value::Hash(_) => "hash",
            Value::Callable(_) => "quotation",
            Value::Symbol(_) => "symbol",
            Value::Channel(_) => "channel",
            Value::Stack(_) => "stack",
            Value::PubSub(_) => "pubsub",
        }
    }

    // Falsy: false, null, numeric zero, NaN, the empty string
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Null => false,
            Value::Integer(i) => *i != 0,
            Value::BigInteger(i) => !i.is_zero(),
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::List(_)
            | Value::Hash(_)
            | Value::Callable(_)
            | Value::Symbol(_)
            | Value::Channel(_)
            | Value::Stack(_)
            | Value::PubSub(_) => true,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::BigInteger(i) => i.to_f64(),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    // Plain text form used by `write` and `list_to_str`: strings unquoted
    pub fn to_plain_string(&self) -> String {
        match self {
            Value::String(s) => s.to_string(),
            other => render_element(other),
        }
    }
}

// Compares one level; nested elements go onto `pending` so deep values are
// compared without recursion
fn shallow_eq<'a>(a: &'a Value, b: &'a Value, pending: &mut Vec<(&'a Value, &'a Value)>) -> bool {
    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => a == b,
        (Value::BigInteger(a), Value::BigInteger(b)) => a == b,
        (Value::Integer(a), Value::BigInteger(b)) | (Value::BigInteger(b), Value::Integer(a)) => {
            BigInt::from(*a) == *b
        }
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::Float(f), n @ (Value::Integer(_) | Value::BigInteger(_)))
        | (n @ (Value::Integer(_) | Value::BigInteger(_)), Value::Float(f)) => {
            n.as_f64() == Some(*f)
        }
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Null, Value::Null) => true,
        (Value::List(a), Value::List(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            if a.len() != b.len() {
                return false;
            }
            pending.extend(a.iter().zip(b.iter()));
            true
        }
        (Value::Hash(a), Value::Hash(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            if a.len() != b.len() {
                return false;
            }
            for ((ka, va), (kb, vb)) in a.iter().zip(b.iter()) {
                pending.push((ka, kb));
                pending.push((va, vb));
            }
            true
        }
        (Value::Callable(Callable::Quoted(a)), Value::Callable(Callable::Quoted(b))) => {
            pending.push((&**a, &**b));
            true
        }
        (Value::Callable(a), Value::Callable(b)) => a.same(b),
        (Value::Symbol(a), Value::Symbol(b)) => a == b,
        (Value::Channel(a), Value::Channel(b)) => a == b,
        (Value::Stack(a), Value::Stack(b)) => a == b,
        (Value::PubSub(a), Value::PubSub(b)) => a == b,
        _ => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = Vec::new();
        if !shallow_eq(self, other, &mut pending) {
            return false;
        }
        while let Some((a, b)) = pending.pop() {
            if !shallow_eq(a, b, &mut pending) {
                return false;
            }
        }
        true
    }
}

// A uniquely owned container hands its elements to a work list instead of
// dropping them in place, so a list nested 100k deep frees in a loop
impl Drop for Value {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.release_children(&mut pending);
        while let Some(mut value) = pending.pop() {
            value.release_children(&mut pending);
        }
    }
}

impl Value {
    fn release_children(&mut self, pending: &mut Vec<Value>) {
        match self {
            Value::List(items) => {
                if let Some(items) = Rc::get_mut(items) {
                    pending.append(items);
                }
            }
            Value::Hash(entries) => {
                if let Some(entries) = Rc::get_mut(entries) {
                    for (key, value) in entries.drain(..) {
                        pending.push(key);
                        pending.push(value);
                    }
                }
            }
            Value::Callable(callable) => callable.release_children(pending),
            _ => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render_element(self))
    }
}

// RUST CONCEPT: thiserror-derived error enum
// Display strings for the engine-level failures keep the `Kind:<detail>`
// shape collaborators match on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("NonexistentWord:{0}")]
    NonexistentWord(String),
    #[error("InvalidTokenForRead:{0}")]
    InvalidTokenForRead(String),
    #[error("InvalidTokenForWrite:{0}")]
    InvalidTokenForWrite(String),
    #[error("ChannelNotFound:{0}")]
    ChannelNotFound(String),
    #[error("StackNotFound:{0}")]
    StackNotFound(String),
    #[error("PubSubNotFound:{0}")]
    PubSubNotFound(String),
    #[error("Stack underflow")]
    StackUnderflow,
    #[error("Stack underflow: {context}")]
    StackUnderflowAt { context: String },
    #[error("Type error: {0}")]
    TypeError(String),
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Modulo by zero")]
    ModuloByZero,
    #[error("JSON error: {0}")]
    Json(String),
    #[error("Output error: {0}")]
    Output(String),
}
