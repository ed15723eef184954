//! # RawrCat Core
//!
//! Interpreter library for RawrCat, a small concatenative stack language
//! with cooperative threads, rendezvous channels, publish/subscribe topics
//! and named stacks with push triggers.
//!
//! Programs are tokenized, parsed into nested quotations, optionally bound
//! against the dictionary, and run by a trampoline that never grows the
//! native call stack. Every runnable context is driven by one FIFO ready
//! queue owned by the [`Interpreter`].
//!
//! ## Example
//!
//! ```
//! use rawr_core::{Interpreter, Value, execute_string};
//!
//! let mut interp = Interpreter::new();
//! interp.clear_output();
//! let stack = execute_string("define sq [dup mul] 5 sq", &mut interp).unwrap();
//! assert_eq!(stack, vec![Value::Integer(25)]);
//! ```

pub mod builtins;
pub mod channel;
pub mod compiler;
pub mod config;
pub mod context;
pub mod evaluator;
pub mod interpreter;
pub mod named_stack;
pub mod output;
pub mod parser;
pub mod prelude;
pub mod primitives;
pub mod pubsub;
pub mod render;
pub mod stdout_output;
pub mod threads;
pub mod tokenizer;
pub mod value;

// Re-exports for convenience
pub use config::InterpreterConfig;
pub use context::{Context, ContextOptions};
pub use evaluator::execute_string;
pub use interpreter::{ContextFailure, DictEntry, Interpreter};
pub use output::{BufferOutput, Output};
pub use parser::{ParseError, Quotation, parse};
pub use render::{render_element, render_stack};
pub use tokenizer::{Token, TokenKind, tokenize};
pub use value::{Callable, RuntimeError, Value};
