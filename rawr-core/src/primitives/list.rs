// List primitives
// Lists are copy-on-write: `cons` and `uncons` go through Rc::make_mut, so
// a list that is still referenced elsewhere (a `dup`ed copy, say) is copied
// before it is changed.

use std::rc::Rc;

use crate::context::Context;
use crate::value::{RuntimeError, Value};

// Pair: ( a b -- [a b] )
pub fn pair_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let [a, b] = ctx.pop_array("'pair' requires 2 values on the stack (e.g., '1 2 pair')")?;
    ctx.push(Value::list(vec![a, b]));
    Ok(())
}

// Unit: ( a -- [a] )
pub fn unit_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let a = ctx.pop_with_context("'unit' requires 1 value on the stack")?;
    ctx.push(Value::list(vec![a]));
    Ok(())
}

// Cons: ( list x -- list' ), appends x at the end
pub fn cons_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let x = ctx.pop_with_context("'cons' requires a list and a value (e.g., '[1 2] list 3 cons')")?;
    let mut items = ctx.pop_list("'cons'")?;
    Rc::make_mut(&mut items).push(x);
    ctx.push(Value::List(items));
    Ok(())
}

// Uncons: ( list -- list' last ), null for the empty list
pub fn uncons_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let mut items = ctx.pop_list("'uncons'")?;
    let last = if items.is_empty() {
        Value::Null
    } else {
        Rc::make_mut(&mut items).pop().unwrap_or(Value::Null)
    };
    ctx.push(Value::List(items));
    ctx.push(last);
    Ok(())
}

fn length(value: &Value, word: &str) -> Result<usize, RuntimeError> {
    match value {
        Value::List(items) => Ok(items.len()),
        Value::String(s) => Ok(s.chars().count()),
        Value::Hash(entries) => Ok(entries.len()),
        other => Err(RuntimeError::TypeError(format!(
            "'{word}' expected list, string or hash, got {}",
            other.type_name()
        ))),
    }
}

// Count: ( seq -- seq n )
pub fn count_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let seq = ctx.peek().map_err(|_| RuntimeError::StackUnderflowAt {
        context: "'count' requires 1 value on the stack".to_string(),
    })?;
    let n = length(&seq, "count")?;
    ctx.push(Value::Integer(n as i64));
    Ok(())
}

// Empty: ( seq -- seq bool )
pub fn empty_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let seq = ctx.peek().map_err(|_| RuntimeError::StackUnderflowAt {
        context: "'empty' requires 1 value on the stack".to_string(),
    })?;
    let n = length(&seq, "empty")?;
    ctx.push(Value::Boolean(n == 0));
    Ok(())
}

// Contains: ( haystack needle -- bool ), list membership or substring
pub fn contains_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let [haystack, needle] = ctx.pop_array("'contains' requires 2 values on the stack")?;
    let found = match &haystack {
        Value::List(items) => items.contains(&needle),
        Value::String(s) => s.contains(needle.to_plain_string().as_str()),
        other => {
            return Err(RuntimeError::TypeError(format!(
                "'contains' expected list or string, got {}",
                other.type_name()
            )));
        }
    };
    ctx.push(Value::Boolean(found));
    Ok(())
}

// Chunk list: ( list n -- chunk1 chunk2 ... ), every chunk pushed separately
pub fn chunk_list_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let size = ctx.pop_integer("'chunk_list' requires a list and a chunk size")?;
    let items = ctx.pop_list("'chunk_list'")?;
    if size <= 0 {
        return Err(RuntimeError::TypeError(format!(
            "'chunk_list' size must be positive, got {size}"
        )));
    }
    ctx.push_all(items.chunks(size as usize).map(|chunk| Value::list(chunk.to_vec())));
    Ok(())
}
