// RUST CONCEPT: Numeric type promotion system
// Arithmetic works on three representations:
// Int (i64) < Big (BigInt) < Float (f64)
//
// Mixing exact and inexact promotes to Float. Exact results that no longer
// fit in an i64 become BigInt, and BigInt results that fit again are demoted,
// so small integers always stay on the fast path.

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Promoted {
    Ints(i64, i64),
    Bigs(BigInt, BigInt),
    Floats(f64, f64),
}

fn big(value: &Value) -> Option<BigInt> {
    match value {
        Value::Integer(i) => Some(BigInt::from(*i)),
        Value::BigInteger(i) => Some(i.clone()),
        _ => None,
    }
}

// Promote two values to a common numeric representation.
// None when either side is not a number.
pub fn promote_pair(a: &Value, b: &Value) -> Option<Promoted> {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Some(Promoted::Ints(*x, *y)),
        (Value::Float(_), _) | (_, Value::Float(_)) => {
            Some(Promoted::Floats(a.as_f64()?, b.as_f64()?))
        }
        _ => Some(Promoted::Bigs(big(a)?, big(b)?)),
    }
}

// Demote a BigInt result back to i64 when it fits
pub fn normalize(value: BigInt) -> Value {
    match value.to_i64() {
        Some(i) => Value::Integer(i),
        None => Value::BigInteger(value),
    }
}
