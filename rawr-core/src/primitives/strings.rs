// String primitives and the text <-> program bridge

use crate::context::Context;
use crate::interpreter::Interpreter;
use crate::parser::parse;
use crate::render::render_element;
use crate::tokenizer::tokenize;
use crate::value::{RuntimeError, Step, Value};

// To string: ( x -- x text ), the canonical rendering of x
pub fn to_string_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let value = ctx.peek().map_err(|_| RuntimeError::StackUnderflowAt {
        context: "'to_string' requires 1 value on the stack".to_string(),
    })?;
    ctx.push(Value::String(render_element(&value).into()));
    Ok(())
}

// From string: ( text -- ... ), parses text and runs it in place
pub fn from_string_builtin(interp: &mut Interpreter, ctx: Context) -> Step {
    let source = ctx.pop_string("'from_string'")?;
    let program = parse(&tokenize(&source)?)?;
    Ok(Some(interp.execute_quotation(ctx, &program)))
}

// ( text -- [chars] )
pub fn str_to_list_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let text = ctx.pop_string("'str_to_list'")?;
    let chars = text.chars().map(|c| Value::String(c.to_string().into())).collect();
    ctx.push(Value::list(chars));
    Ok(())
}

// ( list -- text ), elements joined without a separator
pub fn list_to_str_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let items = ctx.pop_list("'list_to_str'")?;
    let text: String = items.iter().map(Value::to_plain_string).collect();
    ctx.push(Value::String(text.into()));
    Ok(())
}

pub fn int_to_chr_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let code = ctx.pop_integer("'int_to_chr'")?;
    let c = u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| RuntimeError::TypeError(format!("'int_to_chr' invalid code point {code}")))?;
    ctx.push(Value::String(c.to_string().into()));
    Ok(())
}

pub fn chr_to_int_impl(ctx: &Context) -> Result<(), RuntimeError> {
    let text = ctx.pop_string("'chr_to_int'")?;
    let c = text
        .chars()
        .next()
        .ok_or_else(|| RuntimeError::TypeError("'chr_to_int' requires a non-empty string".to_string()))?;
    ctx.push(Value::Integer(i64::from(u32::from(c))));
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::evaluator::execute_string;
    use crate::primitives::test_support::{interpreter, run_rendered};
    use crate::value::RuntimeError;

    #[test]
    fn test_to_string_keeps_operand() {
        assert_eq!(
            run_rendered("[1 2 3 [4 5] list] list to_string swap pop"),
            r#""[1 2 3 4 5 pair] list" unit"#
        );
    }

    #[test]
    fn test_from_string_runs_text() {
        assert_eq!(
            run_rendered(r#""[1 2 3 [4 5] list] list" from_string"#),
            "[1 2 3 4 5 pair] list unit"
        );
        assert_eq!(run_rendered(r#"2 "3 add" from_string"#), "5 unit");
    }

    #[test]
    fn test_rendering_round_trips() {
        assert_eq!(
            run_rendered(r#"[1 "two" 3.5 [4] list] list to_string swap pop from_string"#),
            r#"[1 "two" 3.5 4 unit] list unit"#
        );
    }

    #[test]
    fn test_from_string_parse_error() {
        let mut interp = interpreter();
        let err = execute_string(r#""1 ]" from_string"#, &mut interp).unwrap_err();
        assert!(matches!(err, RuntimeError::Parse(_)));
    }

    #[test]
    fn test_char_conversions() {
        assert_eq!(run_rendered(r#""abc" str_to_list"#), r#"["a" "b" "c"] list unit"#);
        assert_eq!(run_rendered(r#"[1 "b" 3] list list_to_str"#), r#""1b3" unit"#);
        assert_eq!(run_rendered("65 int_to_chr"), r#""A" unit"#);
        assert_eq!(run_rendered(r#""A" chr_to_int"#), "65 unit");
    }
}
