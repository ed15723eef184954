// JSON bridge via serde_json
// Lists map to arrays, hashes to objects (keys rendered as plain text),
// integers that do not fit JSON's i64/u64 range go out as floats.

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::context::Context;
use crate::value::{RuntimeError, Value};

fn value_to_json(value: &Value) -> Result<serde_json::Value, RuntimeError> {
    match value {
        Value::Null => Ok(serde_json::Value::Null),
        Value::Boolean(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Integer(i) => Ok(serde_json::Value::Number(serde_json::Number::from(*i))),
        Value::BigInteger(i) => match i.to_u64() {
            Some(u) => Ok(serde_json::Value::Number(serde_json::Number::from(u))),
            None => float_to_json(i.to_f64().unwrap_or(f64::NAN)),
        },
        Value::Float(f) => float_to_json(*f),
        Value::String(s) => Ok(serde_json::Value::String(s.to_string())),
        Value::List(items) => items
            .iter()
            .map(value_to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(serde_json::Value::Array),
        Value::Hash(entries) => {
            let mut out = serde_json::Map::new();
            for (key, value) in entries.iter() {
                out.insert(key.to_plain_string(), value_to_json(value)?);
            }
            Ok(serde_json::Value::Object(out))
        }
        other => Err(RuntimeError::Json(format!(
            "cannot encode {} as JSON",
            other.type_name()
        ))),
    }
}

fn float_to_json(f: f64) -> Result<serde_json::Value, RuntimeError> {
    serde_json::Number::from_f64(f)
        .map(serde_json::Value::Number)
        .ok_or_else(|| RuntimeError::Json(format!("cannot encode {f} as JSON")))
}

fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(u) = n.as_u64() {
                Value::BigInteger(BigInt::from(u))
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::String(s.into()),
        serde_json::Value::Array(items) => Value::list(items.into_iter().map(json_to_value).collect()),
        serde_json::Value::Object(map) => Value::Hash(std::rc::Rc::new(
            map.into_iter()
                .map(|(key, value)| (Value::String(key.into()), json_to_value(value)))
                .collect(),
        )),
    }
}

// To JSON: ( x -- text )
pub fn to_json_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let value = ctx.pop_with_context("'to_json' requires 1 value on the stack")?;
    let json = value_to_json(&value)?;
    let text = serde_json::to_string(&json).map_err(|e| RuntimeError::Json(e.to_string()))?;
    ctx.push(Value::String(text.into()));
    Ok(())
}

// From JSON: ( text -- x )
pub fn from_json_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let text = ctx.pop_string("'from_json'")?;
    let json: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| RuntimeError::Json(e.to_string()))?;
    ctx.push(json_to_value(json));
    Ok(())
}
