// Insertion-ordered hash primitives
// A hash is a vector of (key, value) pairs; keys compare with value
// equality, so `1` and `1.0` name the same entry. Updating an existing key
// keeps its position.

use std::rc::Rc;

use crate::context::Context;
use crate::value::{RuntimeError, Value};

type Entries = Rc<Vec<(Value, Value)>>;

fn pop_hash(ctx: &Context, word: &str) -> Result<Entries, RuntimeError> {
    let value = ctx.pop_with_context(&format!("'{word}' requires a hash"))?;
    match &value {
        Value::Hash(entries) => Ok(Rc::clone(entries)),
        other => Err(RuntimeError::TypeError(format!(
            "'{word}' expected hash, got {}",
            other.type_name()
        ))),
    }
}

fn position(entries: &[(Value, Value)], key: &Value) -> Option<usize> {
    entries.iter().position(|(k, _)| k == key)
}

fn insert(entries: &mut Vec<(Value, Value)>, key: Value, value: Value) {
    match position(entries, &key) {
        Some(i) => entries[i].1 = value,
        None => entries.push((key, value)),
    }
}

fn lookup(entries: &[(Value, Value)], key: &Value) -> Option<Value> {
    position(entries, key).map(|i| entries[i].1.clone())
}

// Hash: ( [[k v] ...] -- hash ), later duplicates win
pub fn hash_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let source = ctx.pop_with_context("'hash' requires a list of [key value] lists")?;
    if matches!(source, Value::Hash(_)) {
        ctx.push(source);
        return Ok(());
    }
    let pairs = match &source {
        Value::Null => Rc::new(Vec::new()),
        Value::List(items) => Rc::clone(items),
        other => {
            return Err(RuntimeError::TypeError(format!(
                "'hash' expected list of pairs, got {}",
                other.type_name()
            )));
        }
    };
    let mut entries = Vec::with_capacity(pairs.len());
    for pair in pairs.iter() {
        match pair {
            Value::List(kv) if kv.len() >= 2 => insert(&mut entries, kv[0].clone(), kv[1].clone()),
            other => {
                return Err(RuntimeError::TypeError(format!(
                    "'hash' entries must be [key value] lists, got {}",
                    other
                )));
            }
        }
    }
    ctx.push(Value::Hash(Rc::new(entries)));
    Ok(())
}

// ( hash -- [[k v] ...] )
pub fn hash_to_list_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let entries = pop_hash(ctx, "hash_to_list")?;
    let pairs = entries
        .iter()
        .map(|(k, v)| Value::list(vec![k.clone(), v.clone()]))
        .collect();
    ctx.push(Value::list(pairs));
    Ok(())
}

// Hash set: ( hash value key -- hash' )
pub fn hash_set_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let [value, key] = ctx.pop_array("'hash_set' requires hash value key")?;
    let mut entries = pop_hash(ctx, "hash_set")?;
    insert(Rc::make_mut(&mut entries), key, value);
    ctx.push(Value::Hash(entries));
    Ok(())
}

// Hash get: ( hash key -- hash value|null )
pub fn hash_get_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let key = ctx.pop_with_context("'hash_get' requires hash key")?;
    let entries = pop_hash(ctx, "hash_get")?;
    let value = lookup(&entries, &key).unwrap_or(Value::Null);
    ctx.push(Value::Hash(entries));
    ctx.push(value);
    Ok(())
}

// Hash rm: ( hash key -- hash' )
pub fn hash_rm_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let key = ctx.pop_with_context("'hash_rm' requires hash key")?;
    let mut entries = pop_hash(ctx, "hash_rm")?;
    if let Some(i) = position(&entries, &key) {
        Rc::make_mut(&mut entries).remove(i);
    }
    ctx.push(Value::Hash(entries));
    Ok(())
}

// Hash cons: ( hash value key -- hash' ), appends value to the list at key
pub fn hash_cons_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let [value, key] = ctx.pop_array("'hash_cons' requires hash value key")?;
    let mut entries = pop_hash(ctx, "hash_cons")?;
    let slot = Rc::make_mut(&mut entries);
    match position(slot, &key) {
        Some(i) => match &mut slot[i].1 {
            Value::List(items) => Rc::make_mut(items).push(value),
            other => {
                return Err(RuntimeError::TypeError(format!(
                    "'hash_cons' expected a list at {key}, got {}",
                    other.type_name()
                )));
            }
        },
        None => slot.push((key, Value::list(vec![value]))),
    }
    ctx.push(Value::Hash(entries));
    Ok(())
}

// Hash inc: ( hash key -- hash' ), a missing key counts from 0
pub fn hash_inc_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let key = ctx.pop_with_context("'hash_inc' requires hash key")?;
    let mut entries = pop_hash(ctx, "hash_inc")?;
    let current = lookup(&entries, &key).unwrap_or(Value::Integer(0));
    let next = crate::primitives::arithmetic::add_values(current, Value::Integer(1))?;
    insert(Rc::make_mut(&mut entries), key, next);
    ctx.push(Value::Hash(entries));
    Ok(())
}

// Hash safe get: ( hash key default -- hash value|default )
pub fn hash_safe_get_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let [key, default] = ctx.pop_array("'hash_safe_get' requires hash key default")?;
    let entries = pop_hash(ctx, "hash_safe_get")?;
    let value = lookup(&entries, &key).unwrap_or(default);
    ctx.push(Value::Hash(entries));
    ctx.push(value);
    Ok(())
}

// Hash contains: ( hash key -- hash bool )
pub fn hash_contains_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let key = ctx.pop_with_context("'hash_contains' requires hash key")?;
    let entries = pop_hash(ctx, "hash_contains")?;
    let found = position(&entries, &key).is_some();
    ctx.push(Value::Hash(entries));
    ctx.push(Value::Boolean(found));
    Ok(())
}
