// Arithmetic primitives
// The first value popped is the right-hand operand: `5 3 sub` is 5 - 3.

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::context::Context;
use crate::primitives::numeric_promotion::{Promoted, normalize, promote_pair};
use crate::value::{RuntimeError, Value};

fn type_error(op: &str, a: &Value, b: &Value) -> RuntimeError {
    RuntimeError::TypeError(format!(
        "Cannot {op} {} and {}",
        a.type_name(),
        b.type_name()
    ))
}

// `+` concatenates as soon as either operand is a string
pub fn add_values(a: Value, b: Value) -> Result<Value, RuntimeError> {
    if matches!(a, Value::String(_)) || matches!(b, Value::String(_)) {
        let joined = format!("{}{}", a.to_plain_string(), b.to_plain_string());
        return Ok(Value::String(joined.into()));
    }
    match promote_pair(&a, &b) {
        Some(Promoted::Ints(x, y)) => Ok(match x.checked_add(y) {
            Some(sum) => Value::Integer(sum),
            None => normalize(BigInt::from(x) + BigInt::from(y)),
        }),
        Some(Promoted::Bigs(x, y)) => Ok(normalize(x + y)),
        Some(Promoted::Floats(x, y)) => Ok(Value::Float(x + y)),
        None => Err(type_error("add", &a, &b)),
    }
}

pub fn sub_values(a: Value, b: Value) -> Result<Value, RuntimeError> {
    match promote_pair(&a, &b) {
        Some(Promoted::Ints(x, y)) => Ok(match x.checked_sub(y) {
            Some(diff) => Value::Integer(diff),
            None => normalize(BigInt::from(x) - BigInt::from(y)),
        }),
        Some(Promoted::Bigs(x, y)) => Ok(normalize(x - y)),
        Some(Promoted::Floats(x, y)) => Ok(Value::Float(x - y)),
        None => Err(type_error("subtract", &a, &b)),
    }
}

pub fn mul_values(a: Value, b: Value) -> Result<Value, RuntimeError> {
    match promote_pair(&a, &b) {
        Some(Promoted::Ints(x, y)) => Ok(match x.checked_mul(y) {
            Some(product) => Value::Integer(product),
            None => normalize(BigInt::from(x) * BigInt::from(y)),
        }),
        Some(Promoted::Bigs(x, y)) => Ok(normalize(x * y)),
        Some(Promoted::Floats(x, y)) => Ok(Value::Float(x * y)),
        None => Err(type_error("multiply", &a, &b)),
    }
}

// Exact integer quotients stay integers; anything else becomes a Float
pub fn div_values(a: Value, b: Value) -> Result<Value, RuntimeError> {
    match promote_pair(&a, &b) {
        Some(Promoted::Ints(_, 0)) => Err(RuntimeError::DivisionByZero),
        Some(Promoted::Ints(x, y)) => {
            if x.checked_rem(y) == Some(0) || y == -1 {
                Ok(match x.checked_div(y) {
                    Some(q) => Value::Integer(q),
                    None => normalize(BigInt::from(x) / BigInt::from(y)),
                })
            } else {
                Ok(Value::Float(x as f64 / y as f64))
            }
        }
        Some(Promoted::Bigs(x, y)) => {
            if y.is_zero() {
                return Err(RuntimeError::DivisionByZero);
            }
            if (&x % &y).is_zero() {
                Ok(normalize(x / y))
            } else {
                let (x, y) = (x.to_f64().unwrap_or(f64::NAN), y.to_f64().unwrap_or(f64::NAN));
                Ok(Value::Float(x / y))
            }
        }
        Some(Promoted::Floats(x, y)) => Ok(Value::Float(x / y)),
        None => Err(type_error("divide", &a, &b)),
    }
}

// Truncating remainder: the result takes the sign of the dividend
pub fn mod_values(a: Value, b: Value) -> Result<Value, RuntimeError> {
    match promote_pair(&a, &b) {
        Some(Promoted::Ints(_, 0)) => Err(RuntimeError::ModuloByZero),
        Some(Promoted::Ints(x, y)) => Ok(Value::Integer(x.checked_rem(y).unwrap_or(0))),
        Some(Promoted::Bigs(x, y)) => {
            if y.is_zero() {
                return Err(RuntimeError::ModuloByZero);
            }
            Ok(normalize(x % y))
        }
        Some(Promoted::Floats(x, y)) => Ok(Value::Float(x % y)),
        None => Err(type_error("take the modulo of", &a, &b)),
    }
}

pub fn neg_value(a: Value) -> Result<Value, RuntimeError> {
    match &a {
        Value::Integer(i) => Ok(match i.checked_neg() {
            Some(n) => Value::Integer(n),
            None => normalize(-BigInt::from(*i)),
        }),
        Value::BigInteger(i) => Ok(normalize(-i)),
        Value::Float(f) => Ok(Value::Float(-f)),
        other => Err(RuntimeError::TypeError(format!(
            "Cannot negate {}",
            other.type_name()
        ))),
    }
}

fn binary(
    ctx: &Context,
    usage: &str,
    op: fn(Value, Value) -> Result<Value, RuntimeError>,
) -> Result<(), RuntimeError> {
    let [a, b] = ctx.pop_array(usage)?;
    ctx.push(op(a, b)?);
    Ok(())
}

// Addition: ( a b -- a+b )
pub fn add_impl(ctx: &Context) -> Result<(), RuntimeError> {
    binary(ctx, "'add' requires 2 values on the stack (e.g., '5 3 add')", add_values)
}

// Subtraction: ( a b -- a-b )
pub fn sub_impl(ctx: &Context) -> Result<(), RuntimeError> {
    binary(ctx, "'sub' requires 2 values on the stack (e.g., '5 3 sub')", sub_values)
}

pub fn mul_impl(ctx: &Context) -> Result<(), RuntimeError> {
    binary(ctx, "'mul' requires 2 values on the stack (e.g., '5 3 mul')", mul_values)
}

pub fn div_impl(ctx: &Context) -> Result<(), RuntimeError> {
    binary(ctx, "'div' requires 2 values on the stack (e.g., '12 6 div')", div_values)
}

pub fn mod_impl(ctx: &Context) -> Result<(), RuntimeError> {
    binary(ctx, "'mod' requires 2 values on the stack (e.g., '5 3 mod')", mod_values)
}

pub fn neg_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let a = ctx.pop_with_context("'neg' requires 1 value on the stack")?;
    ctx.push(neg_value(a)?);
    Ok(())
}

pub fn inc_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let a = ctx.pop_with_context("'inc' requires 1 value on the stack")?;
    ctx.push(add_values(a, Value::Integer(1))?);
    Ok(())
}

pub fn dec_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let a = ctx.pop_with_context("'dec' requires 1 value on the stack")?;
    ctx.push(sub_values(a, Value::Integer(1))?);
    Ok(())
}
