// Cooperative threads
//
// A thread is a root context with its own stack, appended to the ready
// queue. It shares the interpreter (dictionary, channels, named stacks) with
// every other context and only gives up control at resolution boundaries,
// on a channel rendezvous or on `yield`.

use std::rc::Rc;

use tracing::debug;

use crate::context::Context;
use crate::interpreter::Interpreter;
use crate::value::{Callable, RuntimeError, Step, Value};

// Thread: ( [body] name initialValues -- )
// initialValues is a list (or null) that becomes the thread's stack.
pub fn thread_builtin(interp: &mut Interpreter, mut ctx: Context) -> Step {
    let initial = match &ctx.pop_with_context("'thread' requires [body] name initialValues")? {
        Value::List(items) => items.to_vec(),
        Value::Null => Vec::new(),
        other => {
            return Err(RuntimeError::TypeError(format!(
                "'thread' initial values must be a list, got {}",
                other.type_name()
            )));
        }
    };
    let name = ctx
        .pop_with_context("'thread' requires [body] name initialValues")?
        .to_plain_string();
    let body = ctx.pop_callable("'thread' requires a quotation body")?;

    // The spawning context gets an id too, so `thread_id` is meaningful in it
    if ctx.thread.is_none() {
        let id = interp.threads.allocate_id(&mut interp.rng);
        interp.threads.register(Rc::clone(&id), Rc::clone(&id), false);
        ctx.thread = Some(id);
    }

    let body = match body {
        Callable::Quotation(quotation) if !quotation.bound => {
            Callable::Quotation(Rc::new(interp.compile(&quotation)))
        }
        other => other,
    };

    let id = interp.threads.allocate_id(&mut interp.rng);
    let label: Rc<str> = Rc::from(format!("{name}:{id}"));
    let task = interp.next_task_id();
    let mut child = interp.detached_context(&ctx, initial, &body, task);
    child.thread = Some(Rc::clone(&label));
    child.epoch = Some(interp.thread_epoch);
    interp.threads.register(id, Rc::clone(&label), true);

    debug!(thread = %label, %task, parent = ctx.thread.as_deref().unwrap_or("-"), "spawned thread");
    interp.schedule(child);
    Ok(Some(ctx))
}

// Stop threads: abandons every thread and every parked channel operation
pub fn stop_threads_builtin(interp: &mut Interpreter, ctx: Context) -> Step {
    interp.stop_all_threads();
    Ok(Some(ctx))
}

#[cfg(test)]
mod tests {
    use crate::evaluator::execute_string;
    use crate::primitives::test_support::{interpreter, ints};
    use crate::value::Value;

    #[test]
    fn test_thread_runs_after_spawner_yields() {
        let mut interp = interpreter();
        let stack = execute_string(
            r#"@out create_stack [ 40 2 + @out <- ] "adder" nil thread yield @out ->"#,
            &mut interp,
        )
        .unwrap();
        assert_eq!(stack, ints(&[42]));
    }

    #[test]
    fn test_initial_values_seed_thread_stack() {
        let mut interp = interpreter();
        let stack = execute_string(
            r#"@out create_stack [ mul @out <- ] "mul" [6 7] list thread yield @out ->"#,
            &mut interp,
        )
        .unwrap();
        assert_eq!(stack, ints(&[42]));
    }

    #[test]
    fn test_thread_ids() {
        let mut interp = interpreter();
        let stack = execute_string(
            r#"@ids create_stack [ thread_id @ids <- ] "worker" nil thread yield thread_id @ids ->"#,
            &mut interp,
        )
        .unwrap();
        let (Value::String(spawner), Value::String(worker)) = (&stack[0], &stack[1]) else {
            panic!("expected two thread ids, got {stack:?}");
        };
        assert!(spawner.starts_with('%'));
        assert!(worker.starts_with("worker:%"));
        assert_eq!(interp.live_threads(), 2);
    }

    #[test]
    fn test_stop_threads_clears_registry() {
        let mut interp = interpreter();
        execute_string(r#"[ [ yield ] forever ] "spinner" nil thread stop-threads"#, &mut interp).unwrap();
        assert_eq!(interp.live_threads(), 0);
        assert_eq!(interp.runnable(), 0);
    }
}
