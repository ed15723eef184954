// Primitives module - organized into separate files for maintainability
//
// Naming: `*_impl` functions only touch the operand stack and are wrapped by
// `stack_builtin!`; `*_builtin` functions are full native words that may
// reschedule, park or redirect the running context.

// Stack manipulation
pub mod stack;

// Arithmetic
pub mod arithmetic;
pub mod numeric_promotion;

// Comparison and logic
pub mod comparison;
pub mod logic;

// Combinators
pub mod control;

// Data structures
pub mod hash;
pub mod list;

// Text
pub mod json;
pub mod strings;

// Definitions, output, misc
pub mod def;
pub mod io;
pub mod misc;

// Concurrency
pub mod channels;
pub mod threads;
