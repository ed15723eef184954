// Integration tests: whole RawrCat programs run through the public API,
// including the concurrency words and the scheduler.

use rawr_core::context::ContextOptions;
use rawr_core::evaluator::execute_string;
use rawr_core::interpreter::Interpreter;
use rawr_core::render::{render_element, render_stack};
use rawr_core::value::{RuntimeError, Value};
use tracing_subscriber::EnvFilter;

fn setup_interpreter() -> Interpreter {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let mut interp = Interpreter::new();
    interp.clear_output();
    interp
}

// Helper function to execute code and get top stack value
fn execute_and_get_top(code: &str) -> Result<Value, RuntimeError> {
    let mut interp = setup_interpreter();
    let stack = execute_string(code, &mut interp)?;
    stack.last().cloned().ok_or(RuntimeError::StackUnderflow)
}

#[test]
fn test_simple_addition() {
    assert_eq!(execute_and_get_top("2 5 +").unwrap(), Value::Integer(7));
}

#[test]
fn test_swap_order() {
    let mut interp = setup_interpreter();
    let stack = execute_string("1 2 swap", &mut interp).unwrap();
    assert_eq!(stack, vec![Value::Integer(2), Value::Integer(1)]);
}

#[test]
fn test_while_doubling() {
    assert_eq!(
        execute_and_get_top("1 [2 *] [dup 100 <=] while").unwrap(),
        Value::Integer(128)
    );
}

#[test]
fn test_defined_word() {
    assert_eq!(execute_and_get_top("define sq [dup mul] 5 sq").unwrap(), Value::Integer(25));
}

#[test]
fn test_factorial_function() {
    let factorial_code = r#"
        ( recursive factorial )
        define fact [
            dup 1 <=
            [pop 1]
            [dup 1 - fact *]
            if
        ]
        20 fact
    "#;
    assert_eq!(
        execute_and_get_top(factorial_code).unwrap(),
        Value::Integer(2_432_902_008_176_640_000)
    );
}

#[test]
fn test_factorial_promotes_to_big_integer() {
    let code = "define fact [dup 1 <= [pop 1] [dup 1 - fact *] if] 25 fact to_string";
    assert_eq!(
        execute_and_get_top(code).unwrap(),
        Value::string("15511210043330985984000000")
    );
}

#[test]
fn test_ten_thousand_iterations() {
    assert_eq!(
        execute_and_get_top("0 [1 +] [dup 10000 <] while").unwrap(),
        Value::Integer(10000)
    );
    assert_eq!(execute_and_get_top("0 [1 +] 10000 repeat").unwrap(), Value::Integer(10000));
}

#[test]
fn test_long_loop_yields_to_other_contexts() {
    let mut interp = setup_interpreter();
    let stack = execute_string(
        r#"@log create_stack
           [ "worker" @log <- ] "w" nil thread
           0 [1 +] 10000 repeat
           @log ->"#,
        &mut interp,
    )
    .unwrap();
    // the worker got a turn at a resolution boundary inside the loop
    assert_eq!(stack, vec![Value::Integer(10000), Value::string("worker")]);
    assert!(interp.steps() > 10000);
}

#[test]
fn test_channel_between_threads() {
    let mut interp = setup_interpreter();
    let stack = execute_string(
        r#"#result create_channel
           [ 1 [2 *] [dup 100 <=] while #result <- ] "doubler" nil thread
           #result ->"#,
        &mut interp,
    )
    .unwrap();
    assert_eq!(stack, vec![Value::Integer(128)]);
    assert!(interp.take_failures().is_empty());
}

#[test]
fn test_producer_consumer_order() {
    let mut interp = setup_interpreter();
    let stack = execute_string(
        r#"#jobs create_channel
           [ 1 #jobs <- 2 #jobs <- 3 #jobs <- ] "producer" nil thread
           #jobs -> #jobs -> #jobs ->"#,
        &mut interp,
    )
    .unwrap();
    assert_eq!(stack, vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
    assert_eq!(interp.channel("#jobs").map(|c| c.waiting_writers()), Some(0));
}

#[test]
fn test_pubsub_fan_out_is_independent() {
    let mut interp = setup_interpreter();
    let stack = execute_string(
        r#"@seen create_stack
           $events create_pubsub
           $events [ "a" cons @seen <- ] "first" subscribe
           $events [ "b" cons @seen <- ] "second" subscribe
           [1 2] list dup $events <-
           yield
           @seen -> @seen ->"#,
        &mut interp,
    )
    .unwrap();
    assert_eq!(
        render_stack(&stack),
        r#"[1 2 pair [1 2 "b"] list [1 2 "a"] list] list"#
    );
}

#[test]
fn test_triggers_see_each_push() {
    let mut interp = setup_interpreter();
    let stack = execute_string(
        r#"@totals create_stack @inbox create_stack
           0 @totals <-
           @inbox [ @totals -> + @totals <- ] create_trigger
           1 @inbox <- 2 @inbox <- 3 @inbox <-
           @totals ->"#,
        &mut interp,
    )
    .unwrap();
    assert_eq!(stack, vec![Value::Integer(6)]);
}

#[test]
fn test_stop_threads_abandons_parked_readers() {
    let mut interp = setup_interpreter();
    execute_string(
        r#"#c create_channel @out create_stack
           [ #c -> @out <- ] "reader" nil thread
           yield stop-threads"#,
        &mut interp,
    )
    .unwrap();
    assert_eq!(interp.live_threads(), 0);
    assert_eq!(interp.channel("#c").map(|c| c.waiting_readers()), Some(0));

    // Nobody is left to read, so the writer parks for good
    let ctx = interp.create_context(ContextOptions::new());
    let outcome = interp.execute(ctx, "5 #c <-").unwrap();
    assert!(outcome.is_none());
    assert_eq!(interp.named_stack("@out").map(|s| s.len()), Some(0));
    assert_eq!(interp.channel("#c").map(|c| c.waiting_writers()), Some(1));
}

#[test]
fn test_failing_thread_is_isolated() {
    let mut interp = setup_interpreter();
    let stack = execute_string(r#"[ 1 frobnicate ] "broken" nil thread yield 42"#, &mut interp).unwrap();
    assert_eq!(stack, vec![Value::Integer(42)]);

    let failures = interp.take_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].error, RuntimeError::NonexistentWord("frobnicate".to_string()));
    assert!(failures[0].thread.as_deref().is_some_and(|t| t.starts_with("broken:%")));
    assert!(interp.take_failures().is_empty());
}

#[test]
fn test_render_round_trip() {
    let mut interp = setup_interpreter();
    let source = r#"[1 "two" 3.5 true null [4 5] list nil ["k" 6 pair] list hash [dup mul]] list"#;
    let value = execute_string(source, &mut interp).unwrap().remove(0);
    let first = render_element(&value);
    let reparsed = execute_string(&first, &mut interp).unwrap();
    assert_eq!(reparsed.len(), 1);
    assert_eq!(render_element(&reparsed[0]), first);
}

#[test]
fn test_reused_context_keeps_its_stack() {
    let mut interp = setup_interpreter();
    let ctx = interp.create_context(ContextOptions::new());
    let ctx = interp.execute(ctx, "define twice [2 *]").unwrap().expect("halted");
    let ctx = interp.execute(ctx, "21").unwrap().expect("halted");
    let ctx = interp.execute(ctx, "twice").unwrap().expect("halted");
    assert_eq!(ctx.stack_values(), vec![Value::Integer(42)]);
}

#[test]
fn test_deeply_bracketed_program_runs_and_drops() {
    let mut interp = setup_interpreter();
    let depth = 100_000;
    let source = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
    let stack = execute_string(&source, &mut interp).unwrap();
    assert_eq!(stack.len(), 1);
    drop(stack);
}

#[test]
fn test_deeply_nested_list_renders_and_drops() {
    let mut interp = setup_interpreter();
    let stack = execute_string("nil [unit] 100000 repeat", &mut interp).unwrap();
    assert_eq!(stack.len(), 1);
    let text = render_element(&stack[0]);
    assert_eq!(text.matches(" unit").count(), 100_000);
    drop(stack);

    let stack = execute_string("nil [unit] 100000 repeat dup eq", &mut interp).unwrap();
    assert_eq!(stack, vec![Value::Boolean(true)]);
}

#[test]
fn test_non_finite_floats_round_trip() {
    let mut interp = setup_interpreter();
    let stack = execute_string("1.0 0.0 div -1.0 0.0 div 0.0 0.0 div", &mut interp).unwrap();
    let text = render_stack(&stack);
    assert_eq!(text, "[1.0 0.0 div -1.0 0.0 div 0.0 0.0 div] list");

    let reparsed = execute_string(&text, &mut interp).unwrap();
    assert_eq!(render_element(&reparsed[0]), text);
}
