// Clock, randomness and thread identity

use chrono::Utc;
use rand::Rng;

use crate::context::Context;
use crate::interpreter::Interpreter;
use crate::value::{RuntimeError, Step, Value};

// Time: ( -- ms ), milliseconds since the Unix epoch
pub fn time_impl(ctx: &Context) -> Result<(), RuntimeError> {
    ctx.push(Value::Integer(Utc::now().timestamp_millis()));
    Ok(())
}

// Rand: ( min range -- n ), floor(random * range + min)
pub fn rand_builtin(interp: &mut Interpreter, ctx: Context) -> Step {
    let [min, range] = ctx.pop_array("'rand' requires min range (e.g., '0 255 rand')")?;
    let (Some(low), Some(span)) = (min.as_f64(), range.as_f64()) else {
        return Err(RuntimeError::TypeError(format!(
            "'rand' expected numbers, got {} and {}",
            min.type_name(),
            range.type_name()
        )));
    };
    let unit: f64 = interp.rng.gen_range(0.0..1.0);
    let n = (unit * span + low).floor();
    if n.is_finite() && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        ctx.push(Value::Integer(n as i64));
    } else {
        ctx.push(Value::Float(n));
    }
    Ok(Some(ctx))
}

// Thread id: ( -- id|null )
pub fn thread_id_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let id = match &ctx.thread {
        Some(thread) => Value::String(thread.clone()),
        None => Value::Null,
    };
    ctx.push(id);
    Ok(())
}
