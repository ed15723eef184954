// Comparison primitives
// Equality is structural and crosses numeric kinds (`2 2.0 eq` is true).
// Ordering is defined for numbers and for strings; NaN compares false.

use std::cmp::Ordering;

use crate::context::Context;
use crate::primitives::numeric_promotion::{Promoted, promote_pair};
use crate::value::{RuntimeError, Value};

fn compare(a: &Value, b: &Value) -> Result<Option<Ordering>, RuntimeError> {
    if let (Value::String(x), Value::String(y)) = (a, b) {
        return Ok(Some(x.cmp(y)));
    }
    match promote_pair(a, b) {
        Some(Promoted::Ints(x, y)) => Ok(Some(x.cmp(&y))),
        Some(Promoted::Bigs(x, y)) => Ok(Some(x.cmp(&y))),
        Some(Promoted::Floats(x, y)) => Ok(x.partial_cmp(&y)),
        None => Err(RuntimeError::TypeError(format!(
            "Cannot compare {} and {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

fn ordering(
    ctx: &Context,
    usage: &str,
    accept: fn(Ordering) -> bool,
) -> Result<(), RuntimeError> {
    let [a, b] = ctx.pop_array(usage)?;
    let result = compare(&a, &b)?.is_some_and(accept);
    ctx.push(Value::Boolean(result));
    Ok(())
}

// Equal: ( a b -- bool )
pub fn eq_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let [a, b] = ctx.pop_array("'eq' requires 2 values on the stack (e.g., '5 3 eq')")?;
    ctx.push(Value::Boolean(a == b));
    Ok(())
}

pub fn neq_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let [a, b] = ctx.pop_array("'neq' requires 2 values on the stack (e.g., '5 3 neq')")?;
    ctx.push(Value::Boolean(a != b));
    Ok(())
}

// Less than: ( a b -- a<b )
pub fn lt_impl(ctx: &Context) -> Result<(), RuntimeError> {
    ordering(ctx, "'lt' requires 2 values on the stack (e.g., '3 5 lt')", Ordering::is_lt)
}

pub fn lteq_impl(ctx: &Context) -> Result<(), RuntimeError> {
    ordering(ctx, "'lteq' requires 2 values on the stack (e.g., '3 5 lteq')", Ordering::is_le)
}

pub fn gt_impl(ctx: &Context) -> Result<(), RuntimeError> {
    ordering(ctx, "'gt' requires 2 values on the stack (e.g., '5 3 gt')", Ordering::is_gt)
}

pub fn gteq_impl(ctx: &Context) -> Result<(), RuntimeError> {
    ordering(ctx, "'gteq' requires 2 values on the stack (e.g., '3 3 gteq')", Ordering::is_ge)
}
