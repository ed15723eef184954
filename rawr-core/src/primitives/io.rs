// Output words
// Everything goes through the interpreter's output sink, so tests can
// capture it with a BufferOutput and embedders can silence it.

use crate::context::Context;
use crate::interpreter::Interpreter;
use crate::render::{render_element, render_stack};
use crate::value::{Step, Value};

// Write: ( x -- ), strings print without quotes
pub fn write_builtin(interp: &mut Interpreter, ctx: Context) -> Step {
    let value = ctx.pop_with_context("'write' requires 1 value on the stack")?;
    interp.writeln(&value.to_plain_string())?;
    Ok(Some(ctx))
}

// Display stack: prints the whole stack as one renderable sequence
pub fn display_stack_builtin(interp: &mut Interpreter, ctx: Context) -> Step {
    let line = render_stack(&ctx.stack.borrow());
    interp.writeln(&line)?;
    Ok(Some(ctx))
}

// Print stack: one indexed line per element, top of stack first
pub fn print_stack_builtin(interp: &mut Interpreter, ctx: Context) -> Step {
    let values: Vec<Value> = ctx.stack_values();
    for (i, value) in values.iter().enumerate().rev() {
        interp.writeln(&format!("\t{i}: {}", render_element(value)))?;
    }
    Ok(Some(ctx))
}
