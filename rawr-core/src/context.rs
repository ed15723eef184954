// RUST CONCEPT: Execution state as an owned value
// A Context is moved, never shared: the trampoline owns the running one, a
// child owns its parent through `ReturnTo`, and a channel owns a parked one.
// Only the operand stack is shared, by reference, between a parent and the
// children it calls.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::tokenizer::Token;
use crate::value::{Callable, RuntimeError, Value};

pub type SharedStack = Rc<RefCell<Vec<Value>>>;

// Groups a root context with every child it calls; threads and pubsub
// deliveries get fresh ids so their failures are reported separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

// RUST CONCEPT: Continuations as data
// Each variant is one resumable unit of "what happens next". Loops re-push
// themselves instead of recursing, so guest iteration never grows the native
// call stack.
pub enum Continuation {
    // Dispatch the next pending token
    NextToken,
    // The child finished; continue with the context that called it
    ReturnTo(Box<Context>),
    Invoke(Callable),
    // `dip`: put the hidden value back above the result
    Restore(Value),
    // `list`: wrap the scratch stack as a list and reinstate the saved stack
    CollectList(SharedStack),
    WhileLoop { body: Callable, predicate: Callable },
    WhileCheck { body: Callable, predicate: Callable },
    Forever(Callable),
    Repeat { body: Callable, remaining: i64 },
    Fold { items: Rc<Vec<Value>>, remaining: usize, func: Callable },
    Foreach { items: Rc<Vec<Value>>, remaining: usize, func: Callable },
}

impl fmt::Debug for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Continuation::NextToken => "NextToken",
            Continuation::ReturnTo(_) => "ReturnTo",
            Continuation::Invoke(_) => "Invoke",
            Continuation::Restore(_) => "Restore",
            Continuation::CollectList(_) => "CollectList",
            Continuation::WhileLoop { .. } => "WhileLoop",
            Continuation::WhileCheck { .. } => "WhileCheck",
            Continuation::Forever(_) => "Forever",
            Continuation::Repeat { .. } => "Repeat",
            Continuation::Fold { .. } => "Fold",
            Continuation::Foreach { .. } => "Foreach",
        };
        write!(f, "{name}")
    }
}

pub struct Context {
    pub stack: SharedStack,
    pub tokens: Vec<Token>, // tail-first, like Quotation::tokens
    pub continuations: Vec<Continuation>, // last pushed runs next
    pub thread: Option<Rc<str>>,
    pub depth: usize,
    pub resolution: u64,
    pub trace: bool,
    pub next_token_budget: u32,
    pub task: TaskId,
    // Thread epoch this context was spawned under; None for contexts that
    // stop-threads must not abandon
    pub epoch: Option<u64>,
}

impl Context {
    pub fn stack_handle(&self) -> SharedStack {
        Rc::clone(&self.stack)
    }

    pub fn stack_values(&self) -> Vec<Value> {
        self.stack.borrow().clone()
    }

    pub fn stack_len(&self) -> usize {
        self.stack.borrow().len()
    }

    pub fn push(&self, value: Value) {
        self.stack.borrow_mut().push(value);
    }

    pub fn pop(&self) -> Result<Value, RuntimeError> {
        self.stack.borrow_mut().pop().ok_or(RuntimeError::StackUnderflow)
    }

    pub fn pop_with_context(&self, context: &str) -> Result<Value, RuntimeError> {
        self.stack
            .borrow_mut()
            .pop()
            .ok_or_else(|| RuntimeError::StackUnderflowAt {
                context: context.to_string(),
            })
    }

    pub fn push_all<I: IntoIterator<Item = Value>>(&self, values: I) {
        self.stack.borrow_mut().extend(values);
    }

    // Removes the top `count` values, bottom-most first. Nothing is popped
    // when the stack is too shallow.
    pub fn pop_many(&self, count: usize, context: &str) -> Result<Vec<Value>, RuntimeError> {
        let mut stack = self.stack.borrow_mut();
        if stack.len() < count {
            return Err(RuntimeError::StackUnderflowAt {
                context: context.to_string(),
            });
        }
        let at = stack.len() - count;
        Ok(stack.split_off(at))
    }

    pub fn pop_array<const N: usize>(&self, context: &str) -> Result<[Value; N], RuntimeError> {
        self.pop_many(N, context)?
            .try_into()
            .map_err(|_| RuntimeError::StackUnderflowAt {
                context: context.to_string(),
            })
    }

    pub fn peek(&self) -> Result<Value, RuntimeError> {
        self.stack
            .borrow()
            .last()
            .cloned()
            .ok_or(RuntimeError::StackUnderflow)
    }

    pub fn pop_list(&self, context: &str) -> Result<Rc<Vec<Value>>, RuntimeError> {
        let value = self.pop_with_context(context)?;
        match &value {
            Value::List(items) => Ok(Rc::clone(items)),
            other => Err(RuntimeError::TypeError(format!(
                "{context}: expected list, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn pop_integer(&self, context: &str) -> Result<i64, RuntimeError> {
        match self.pop_with_context(context)? {
            Value::Integer(i) => Ok(i),
            Value::Float(f) if f.fract() == 0.0 => Ok(f as i64),
            other => Err(RuntimeError::TypeError(format!(
                "{context}: expected integer, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn pop_string(&self, context: &str) -> Result<Rc<str>, RuntimeError> {
        let value = self.pop_with_context(context)?;
        match &value {
            Value::String(s) => Ok(Rc::clone(s)),
            other => Err(RuntimeError::TypeError(format!(
                "{context}: expected string, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn pop_callable(&self, context: &str) -> Result<Callable, RuntimeError> {
        let value = self.pop_with_context(context)?;
        match &value {
            Value::Callable(callable) => Ok(callable.clone()),
            other => Err(RuntimeError::TypeError(format!(
                "{context}: expected quotation, got {}",
                other.type_name()
            ))),
        }
    }
}

// Abandoned call chains can be arbitrarily deep (a parked non-tail
// recursion, say), so unlink them iteratively instead of letting each
// ReturnTo box drop its parent recursively.
impl Drop for Context {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.continuations);
        while let Some(continuation) = pending.pop() {
            if let Continuation::ReturnTo(mut parent) = continuation {
                pending.append(&mut parent.continuations);
            }
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("stack", &self.stack.borrow().len())
            .field("tokens", &self.tokens.len())
            .field("continuations", &self.continuations)
            .field("thread", &self.thread)
            .field("depth", &self.depth)
            .field("task", &self.task)
            .finish()
    }
}

// RUST CONCEPT: Builder-style overrides
// Everything left as None falls back to the interpreter's configured default.
#[derive(Debug, Clone, Default)]
pub struct ContextOptions {
    pub stack: Option<Vec<Value>>,
    pub shared_stack: Option<SharedStack>,
    pub thread: Option<Rc<str>>,
    pub resolution: Option<u64>,
    pub trace: Option<bool>,
    pub depth: Option<usize>,
}

impl ContextOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stack(mut self, values: Vec<Value>) -> Self {
        self.stack = Some(values);
        self
    }

    // Reuse an existing operand stack, e.g. to keep a REPL session's values
    pub fn with_shared_stack(mut self, stack: SharedStack) -> Self {
        self.shared_stack = Some(stack);
        self
    }

    pub fn with_thread(mut self, thread: &str) -> Self {
        self.thread = Some(Rc::from(thread));
        self
    }

    pub fn with_resolution(mut self, resolution: u64) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = Some(trace);
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }
}
