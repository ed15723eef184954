// Boolean logic and constant words

use crate::context::Context;
use crate::value::{RuntimeError, Value};

// And: ( a b -- b|false ), b if a is truthy
pub fn and_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let [a, b] = ctx.pop_array("'and' requires 2 values on the stack (e.g., 'true false and')")?;
    ctx.push(if a.is_truthy() { b } else { Value::Boolean(false) });
    Ok(())
}

pub fn not_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let a = ctx.pop_with_context("'not' requires 1 value on the stack")?;
    ctx.push(Value::Boolean(!a.is_truthy()));
    Ok(())
}

pub fn true_impl(ctx: &Context) -> Result<(), RuntimeError> {
    ctx.push(Value::Boolean(true));
    Ok(())
}

pub fn false_impl(ctx: &Context) -> Result<(), RuntimeError> {
    ctx.push(Value::Boolean(false));
    Ok(())
}

pub fn null_impl(ctx: &Context) -> Result<(), RuntimeError> {
    ctx.push(Value::Null);
    Ok(())
}

// Nil is the empty list, not null
pub fn nil_impl(ctx: &Context) -> Result<(), RuntimeError> {
    ctx.push(Value::list(Vec::new()));
    Ok(())
}

// Is null: ( a -- a bool )
pub fn is_null_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let a = ctx
        .peek()
        .map_err(|_| RuntimeError::StackUnderflowAt {
            context: "'is_null' requires 1 value on the stack".to_string(),
        })?;
    ctx.push(Value::Boolean(matches!(a, Value::Null)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::test_support::{context_with, interpreter};

    #[test]
    fn test_and() {
        let mut interp = interpreter();
        let ctx = context_with(&mut interp, vec![Value::Boolean(false), Value::Boolean(true)]);
        and_impl(&ctx).unwrap();
        assert_eq!(ctx.stack_values(), vec![Value::Boolean(false)]);

        let ctx = context_with(&mut interp, vec![Value::Integer(1), Value::string("yes")]);
        and_impl(&ctx).unwrap();
        assert_eq!(ctx.stack_values(), vec![Value::string("yes")]);
    }

    #[test]
    fn test_not_uses_truthiness() {
        let mut interp = interpreter();
        for (value, expected) in [
            (Value::Boolean(true), false),
            (Value::Integer(0), true),
            (Value::Null, true),
            (Value::list(vec![]), false),
        ] {
            let ctx = context_with(&mut interp, vec![value]);
            not_impl(&ctx).unwrap();
            assert_eq!(ctx.pop().unwrap(), Value::Boolean(expected));
        }
    }

    #[test]
    fn test_constants() {
        let mut interp = interpreter();
        let ctx = context_with(&mut interp, vec![]);
        true_impl(&ctx).unwrap();
        false_impl(&ctx).unwrap();
        null_impl(&ctx).unwrap();
        nil_impl(&ctx).unwrap();
        assert_eq!(
            ctx.stack_values(),
            vec![
                Value::Boolean(true),
                Value::Boolean(false),
                Value::Null,
                Value::list(vec![])
            ]
        );
    }

    #[test]
    fn test_is_null_keeps_operand() {
        let mut interp = interpreter();
        let ctx = context_with(&mut interp, vec![Value::Null]);
        is_null_impl(&ctx).unwrap();
        assert_eq!(ctx.stack_values(), vec![Value::Null, Value::Boolean(true)]);

        let ctx = context_with(&mut interp, vec![Value::Integer(0)]);
        is_null_impl(&ctx).unwrap();
        assert_eq!(ctx.stack_values(), vec![Value::Integer(0), Value::Boolean(false)]);
    }
}
