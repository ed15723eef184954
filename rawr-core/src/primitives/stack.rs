// Stack manipulation primitives
// Stack effects are written bottom to top: ( c b a -- a c b ) means `a` was
// on top before the word ran.

use crate::context::Context;
use crate::value::{RuntimeError, Value};

// Dup: ( a -- a a )
pub fn dup_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let top = ctx
        .peek()
        .map_err(|_| RuntimeError::StackUnderflowAt {
            context: "'dup' requires 1 value on the stack (e.g., '5 dup')".to_string(),
        })?;
    ctx.push(top);
    Ok(())
}

// Swap: ( a b -- b a )
pub fn swap_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let [a, b] = ctx.pop_array("'swap' requires 2 values on the stack (e.g., '1 2 swap')")?;
    ctx.push_all([b, a]);
    Ok(())
}

// Pop: ( a -- )
pub fn pop_impl(ctx: &Context) -> Result<(), RuntimeError> {
    ctx.pop_with_context("'pop' requires 1 value on the stack")?;
    Ok(())
}

// Popd: ( a b -- b )
pub fn popd_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let [_, b] = ctx.pop_array("'popd' requires 2 values on the stack (e.g., '1 2 popd')")?;
    ctx.push(b);
    Ok(())
}

// Rot: ( c b a -- a c b )
pub fn rot_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let [c, b, a] = ctx.pop_array("'rot' requires 3 values on the stack")?;
    ctx.push_all([a, c, b]);
    Ok(())
}

// -rot: ( c b a -- b a c )
pub fn unrot_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let [c, b, a] = ctx.pop_array("'-rot' requires 3 values on the stack")?;
    ctx.push_all([b, a, c]);
    Ok(())
}

// Swapd: ( c b a -- b c a )
pub fn swapd_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let [c, b, a] = ctx.pop_array("'swapd' requires 3 values on the stack")?;
    ctx.push_all([b, c, a]);
    Ok(())
}

// Rotd: ( d c b a -- b d c a )
pub fn rotd_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let [d, c, b, a] = ctx.pop_array("'rotd' requires 4 values on the stack")?;
    ctx.push_all([b, d, c, a]);
    Ok(())
}

// Depth: ( -- n )
pub fn depth_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let depth = ctx.stack_len() as i64;
    ctx.push(Value::Integer(depth));
    Ok(())
}

pub fn clear_stack_impl(ctx: &Context) -> Result<(), RuntimeError> {
    ctx.stack.borrow_mut().clear();
    Ok(())
}
