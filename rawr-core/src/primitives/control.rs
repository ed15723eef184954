// Combinators and flow control
//
// RUST CONCEPT: Loops as continuations
// None of these words loop or recurse natively. Each one pushes the
// continuation that drives the iteration and hands the context back to the
// trampoline, which interleaves the body with everything else that is
// runnable.

use std::cell::RefCell;
use std::rc::Rc;

use crate::context::{Context, Continuation};
use crate::interpreter::Interpreter;
use crate::value::{Callable, RuntimeError, Step, Value};

// Apply: ( [f] -- ... )
// Also accepts a symbol pushed by `literal`, resolved at call time.
pub fn apply_builtin(interp: &mut Interpreter, ctx: Context) -> Step {
    let target = ctx.pop_with_context("'apply' requires a quotation (e.g., '1 [2 +] apply')")?;
    let callable = match &target {
        Value::Callable(callable) => callable.clone(),
        Value::Symbol(name) => Callable::Word(
            interp
                .lookup(name)
                .ok_or_else(|| RuntimeError::NonexistentWord(name.to_string()))?,
        ),
        other => {
            return Err(RuntimeError::TypeError(format!(
                "'apply' expected quotation, got {}",
                other.type_name()
            )));
        }
    };
    interp.invoke(&callable, ctx)
}

// Dip: ( x [f] -- ... x ), runs f with x hidden
pub fn dip_builtin(interp: &mut Interpreter, mut ctx: Context) -> Step {
    let f = ctx.pop_callable("'dip' requires a value and a quotation (e.g., '1 [2 3 +] dip')")?;
    let x = ctx.pop_with_context("'dip' requires a value below the quotation")?;
    ctx.continuations.push(Continuation::Restore(x));
    interp.invoke(&f, ctx)
}

// If: ( cond [then] [else] -- ... )
pub fn if_builtin(interp: &mut Interpreter, ctx: Context) -> Step {
    let otherwise = ctx.pop_callable("'if' requires cond [then] [else]")?;
    let then = ctx.pop_callable("'if' requires cond [then] [else]")?;
    let condition = ctx.pop_with_context("'if' requires a condition below its branches")?;
    if condition.is_truthy() {
        interp.invoke(&then, ctx)
    } else {
        interp.invoke(&otherwise, ctx)
    }
}

// While: ( [body] [predicate] -- ... ), predicate runs first
pub fn while_builtin(_interp: &mut Interpreter, mut ctx: Context) -> Step {
    let predicate = ctx.pop_callable("'while' requires [body] [predicate]")?;
    let body = ctx.pop_callable("'while' requires [body] [predicate]")?;
    ctx.continuations.push(Continuation::WhileLoop { body, predicate });
    Ok(Some(ctx))
}

pub fn forever_builtin(_interp: &mut Interpreter, mut ctx: Context) -> Step {
    let body = ctx.pop_callable("'forever' requires a quotation")?;
    ctx.continuations.push(Continuation::Forever(body));
    Ok(Some(ctx))
}

// Repeat: ( [f] n -- ... )
pub fn repeat_builtin(_interp: &mut Interpreter, mut ctx: Context) -> Step {
    let remaining = ctx.pop_integer("'repeat' requires [f] n (e.g., '[1 2 +] 5 repeat')")?;
    let body = ctx.pop_callable("'repeat' requires a quotation below the count")?;
    ctx.continuations.push(Continuation::Repeat { body, remaining });
    Ok(Some(ctx))
}

// Fold: ( list init [f] -- acc ), elements are visited last to first
pub fn fold_builtin(_interp: &mut Interpreter, mut ctx: Context) -> Step {
    let func = ctx.pop_callable("'fold' requires list init [f]")?;
    let init = ctx.pop_with_context("'fold' requires list init [f]")?;
    let items = ctx.pop_list("'fold'")?;
    ctx.push(init);
    let remaining = items.len();
    ctx.continuations.push(Continuation::Fold {
        items,
        remaining,
        func,
    });
    Ok(Some(ctx))
}

// Foreach: ( list [f] -- ... ), elements are visited last to first
pub fn foreach_builtin(_interp: &mut Interpreter, mut ctx: Context) -> Step {
    let func = ctx.pop_callable("'foreach' requires list [f]")?;
    let items = ctx.pop_list("'foreach'")?;
    let remaining = items.len();
    ctx.continuations.push(Continuation::Foreach {
        items,
        remaining,
        func,
    });
    Ok(Some(ctx))
}

// Compose: ( [f] [g] -- [f g] )
pub fn compose_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let second = ctx.pop_callable("'compose' requires two quotations")?;
    let first = ctx.pop_callable("'compose' requires two quotations")?;
    ctx.push(Value::Callable(Callable::Composed(Rc::new(first), Rc::new(second))));
    Ok(())
}

// Quote: ( x -- [x] )
pub fn quote_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let value = ctx.pop_with_context("'quote' requires 1 value on the stack")?;
    ctx.push(Value::Callable(Callable::Quoted(Rc::new(value))));
    Ok(())
}

// List: ( [f] -- list ), runs f on an empty stack and collects the result
pub fn list_builtin(interp: &mut Interpreter, mut ctx: Context) -> Step {
    let f = ctx.pop_callable("'list' requires a quotation (e.g., '[1 2 3] list')")?;
    let saved = std::mem::replace(&mut ctx.stack, Rc::new(RefCell::new(Vec::new())));
    ctx.continuations.push(Continuation::CollectList(saved));
    interp.invoke(&f, ctx)
}

// Break halts the running context where it stands
pub fn break_builtin(_interp: &mut Interpreter, _ctx: Context) -> Step {
    Ok(None)
}

// Yield gives every other runnable context a turn before continuing
pub fn yield_builtin(interp: &mut Interpreter, ctx: Context) -> Step {
    interp.schedule(ctx);
    Ok(None)
}
