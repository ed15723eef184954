// This module implements the trampolined evaluator for RawrCat
//
// RAWRCAT EXECUTION MODEL:
// 1. A Context carries its pending tokens and a queue of continuations
// 2. `exec` pops one continuation at a time and runs it; that is the only loop
//    that drives execution, so guest loops and recursion never grow the native
//    call stack
// 3. Literals push themselves; words run natively or as quotations; a
//    quotation token is data until something invokes it
// 4. Invoking a quotation creates a child context that shares the parent's
//    operand stack and returns to the parent when its tokens run out
// 5. Every `resolution`-th step, or when a word blocks or yields, the context
//    leaves the trampoline and waits in the interpreter's ready queue

use std::rc::Rc;

use tracing::{debug, trace};

use crate::context::{Context, ContextOptions, Continuation, TaskId};
use crate::interpreter::Interpreter;
use crate::parser::{Quotation, parse};
use crate::render::{TraceLine, trace_line};
use crate::tokenizer::{Token, TokenKind, tokenize};
use crate::value::{Callable, RuntimeError, Step, Value, Word, WordBody};

// What the scheduler learned about the context a caller is waiting on
#[derive(Default)]
struct Outcome {
    halted: Option<Context>,
    failure: Option<RuntimeError>,
}

impl Interpreter {
    // RUST CONCEPT: The trampoline
    // Returns Ok(Some(ctx)) once ctx's continuation queue is empty (halted),
    // Ok(None) if ctx was parked, deferred or explicitly halted.
    pub fn exec(&mut self, mut ctx: Context) -> Step {
        let mut fresh = true;
        loop {
            ctx.next_token_budget = self.config().next_token_budget;
            self.step_count += 1;
            let Some(continuation) = ctx.continuations.pop() else {
                return Ok(Some(ctx));
            };

            // A context always makes at least one step per turn, even at
            // resolution 1
            if !fresh && self.step_count % ctx.resolution == 0 {
                ctx.continuations.push(continuation);
                trace!(task = %ctx.task, step = self.step_count, "deferred at resolution boundary");
                self.schedule(ctx);
                return Ok(None);
            }
            fresh = false;

            match self.resume(continuation, ctx)? {
                Some(next) => ctx = next,
                None => return Ok(None),
            }
        }
    }

    fn resume(&mut self, continuation: Continuation, mut ctx: Context) -> Step {
        match continuation {
            Continuation::NextToken => self.next_token(ctx),
            Continuation::ReturnTo(parent) => Ok(Some(*parent)),
            Continuation::Invoke(callable) => self.invoke(&callable, ctx),
            Continuation::Restore(value) => {
                ctx.push(value);
                Ok(Some(ctx))
            }
            Continuation::CollectList(saved) => {
                let scratch = std::mem::replace(&mut ctx.stack, saved);
                let items = std::mem::take(&mut *scratch.borrow_mut());
                ctx.push(Value::list(items));
                Ok(Some(ctx))
            }
            Continuation::WhileLoop { body, predicate } => {
                ctx.continuations.push(Continuation::WhileCheck {
                    body,
                    predicate: predicate.clone(),
                });
                self.invoke(&predicate, ctx)
            }
            Continuation::WhileCheck { body, predicate } => {
                let condition = ctx.pop_with_context("'while' predicate must leave a value")?;
                if !condition.is_truthy() {
                    return Ok(Some(ctx));
                }
                ctx.continuations.push(Continuation::WhileLoop {
                    body: body.clone(),
                    predicate,
                });
                self.invoke(&body, ctx)
            }
            Continuation::Forever(body) => {
                ctx.continuations.push(Continuation::Forever(body.clone()));
                self.invoke(&body, ctx)
            }
            Continuation::Repeat { body, remaining } => {
                if remaining <= 0 {
                    return Ok(Some(ctx));
                }
                ctx.continuations.push(Continuation::Repeat {
                    body: body.clone(),
                    remaining: remaining - 1,
                });
                self.invoke(&body, ctx)
            }
            // The accumulator stays on the stack between iterations
            Continuation::Fold {
                items,
                remaining,
                func,
            } => {
                if remaining == 0 {
                    return Ok(Some(ctx));
                }
                let index = remaining - 1;
                ctx.push(items[index].clone());
                ctx.continuations.push(Continuation::Fold {
                    items,
                    remaining: index,
                    func: func.clone(),
                });
                self.invoke(&func, ctx)
            }
            Continuation::Foreach {
                items,
                remaining,
                func,
            } => {
                if remaining == 0 {
                    return Ok(Some(ctx));
                }
                let index = remaining - 1;
                ctx.push(items[index].clone());
                ctx.continuations.push(Continuation::Foreach {
                    items,
                    remaining: index,
                    func: func.clone(),
                });
                self.invoke(&func, ctx)
            }
        }
    }

    // Dispatches tokens until one needs a word call, the stream runs dry, or
    // the per-step budget is spent. Literals loop here instead of recursing.
    fn next_token(&mut self, mut ctx: Context) -> Step {
        loop {
            // Checked before popping so no token is lost when re-enqueuing
            if ctx.next_token_budget == 0 {
                ctx.continuations.push(Continuation::NextToken);
                return Ok(Some(ctx));
            }
            ctx.next_token_budget -= 1;

            let Some(token) = ctx.tokens.pop() else {
                return Ok(Some(ctx));
            };
            self.tokens_dispatched += 1;
            if ctx.trace {
                self.trace_dispatch(&ctx, &token)?;
            }

            match token.kind {
                TokenKind::Word(word) => {
                    ctx.continuations.push(Continuation::NextToken);
                    return self.invoke_word(&word, ctx);
                }
                TokenKind::Symbol(name) => {
                    let word = self
                        .lookup(&name)
                        .ok_or_else(|| RuntimeError::NonexistentWord(name.to_string()))?;
                    ctx.continuations.push(Continuation::NextToken);
                    return self.invoke_word(&word, ctx);
                }
                TokenKind::Quotation(quotation) => {
                    ctx.push(Value::Callable(Callable::Quotation(quotation)))
                }
                TokenKind::Channel(id) => ctx.push(Value::Channel(id)),
                TokenKind::Stack(id) => ctx.push(Value::Stack(id)),
                TokenKind::PubSub(id) => ctx.push(Value::PubSub(id)),
                TokenKind::String(text) => ctx.push(Value::String(text)),
                TokenKind::Integer(i) => ctx.push(Value::Integer(i)),
                TokenKind::BigInteger(i) => ctx.push(Value::BigInteger(i)),
                TokenKind::Float(f) => ctx.push(Value::Float(f)),
                TokenKind::BeginQuotation(_) | TokenKind::EndQuotation(_) => {
                    return Err(RuntimeError::TypeError(format!(
                        "unparsed bracket token at offset {}",
                        token.span.begin
                    )));
                }
            }
        }
    }

    // RUST CONCEPT: Calling a quotation without native recursion
    // The child gets its own copy of the body tokens and shares the parent's
    // stack. Its queue ends with ReturnTo(parent), so the trampoline picks the
    // parent back up when the child drains.
    pub fn execute_quotation(&mut self, mut parent: Context, quotation: &Quotation) -> Context {
        let trace = parent.trace;
        let mut depth = parent.depth + 1;

        // TAIL-CALL OPTIMIZATION: a parent with no tokens left and nothing
        // queued but its own return is finished; return straight past it
        let tail_position = parent.tokens.is_empty()
            && parent.continuations.len() == 2
            && matches!(parent.continuations[1], Continuation::NextToken)
            && matches!(&parent.continuations[0],
                Continuation::ReturnTo(caller) if Rc::ptr_eq(&caller.stack, &parent.stack));
        if tail_position {
            parent.continuations.pop();
            if let Some(Continuation::ReturnTo(caller)) = parent.continuations.pop() {
                depth = parent.depth;
                parent = *caller;
            }
        }

        let mut child = Context {
            stack: Rc::clone(&parent.stack),
            tokens: quotation.tokens.clone(),
            continuations: Vec::with_capacity(4),
            thread: parent.thread.clone(),
            depth,
            resolution: parent.resolution,
            trace,
            next_token_budget: parent.next_token_budget,
            task: parent.task,
            epoch: parent.epoch,
        };
        child.continuations.push(Continuation::ReturnTo(Box::new(parent)));
        child.continuations.push(Continuation::NextToken);
        child
    }

    pub fn invoke(&mut self, callable: &Callable, mut ctx: Context) -> Step {
        match callable {
            Callable::Quotation(quotation) => Ok(Some(self.execute_quotation(ctx, quotation))),
            Callable::Composed(first, second) => {
                ctx.continuations.push(Continuation::Invoke((**second).clone()));
                ctx.continuations.push(Continuation::Invoke((**first).clone()));
                Ok(Some(ctx))
            }
            Callable::Quoted(value) => {
                ctx.push((**value).clone());
                Ok(Some(ctx))
            }
            Callable::Word(word) => self.invoke_word(word, ctx),
        }
    }

    pub(crate) fn invoke_word(&mut self, word: &Word, ctx: Context) -> Step {
        match &word.body {
            WordBody::Native(func) => func(self, ctx),
            WordBody::Quotation(quotation) => Ok(Some(self.execute_quotation(ctx, quotation))),
        }
    }

    fn trace_dispatch(&mut self, ctx: &Context, token: &Token) -> Result<(), RuntimeError> {
        let line = {
            let stack = ctx.stack.borrow();
            trace_line(&TraceLine {
                thread: ctx.thread.as_deref(),
                count: self.tokens_dispatched,
                depth: ctx.depth,
                pending: &ctx.tokens,
                token,
                stack: &stack,
                width: self.config().terminal_width,
            })
        };
        self.writeln(&line)
    }

    // ---- scheduler ----

    // Runs queued contexts until nothing is runnable
    pub fn run(&mut self) {
        let mut outcome = Outcome::default();
        self.drain(None, &mut outcome);
    }

    fn drain(&mut self, watch: Option<TaskId>, outcome: &mut Outcome) {
        while let Some(ctx) = self.ready.pop_front() {
            if ctx.epoch.is_some_and(|epoch| epoch != self.thread_epoch) {
                debug!(task = %ctx.task, "dropping context from a stopped thread epoch");
                continue;
            }
            let task = ctx.task;
            let thread = ctx.thread.clone();
            let result = self.exec(ctx);
            self.settle(result, task, thread, watch, outcome);
        }
    }

    fn settle(
        &mut self,
        result: Step,
        task: TaskId,
        thread: Option<Rc<str>>,
        watch: Option<TaskId>,
        outcome: &mut Outcome,
    ) {
        match result {
            Ok(Some(done)) => {
                if Some(done.task) == watch {
                    outcome.halted = Some(done);
                }
            }
            Ok(None) => {}
            Err(error) if Some(task) == watch => outcome.failure = Some(error),
            Err(error) => self.record_failure(task, thread, error),
        }
    }

    // Tokenizes, parses and runs `source` on `ctx`, then keeps scheduling
    // until no context is runnable. Returns ctx if it halted, None if it is
    // still parked on a channel or was abandoned; its own failure is the Err.
    pub fn execute(&mut self, mut ctx: Context, source: &str) -> Result<Option<Context>, RuntimeError> {
        let program = parse(&tokenize(source)?)?;
        let program = if self.config().bind_programs {
            self.compile(&program)
        } else {
            program
        };
        debug!(task = %ctx.task, tokens = program.token_count, "scheduling program");

        let task = ctx.task;
        let thread = ctx.thread.clone();
        ctx.continuations
            .push(Continuation::Invoke(Callable::Quotation(Rc::new(program))));

        let mut outcome = Outcome::default();
        let result = self.exec(ctx);
        self.settle(result, task, thread, Some(task), &mut outcome);
        self.drain(Some(task), &mut outcome);

        match outcome.failure {
            Some(error) => Err(error),
            None => Ok(outcome.halted),
        }
    }
}

// Runs `code` on a fresh context and returns that context's final stack
pub fn execute_string(code: &str, interp: &mut Interpreter) -> Result<Vec<Value>, RuntimeError> {
    let ctx = interp.create_context(ContextOptions::new());
    let stack = ctx.stack_handle();
    interp.execute(ctx, code)?;
    let values = stack.borrow().clone();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InterpreterConfig;
    use crate::output::BufferOutput;

    fn setup_interpreter() -> Interpreter {
        let mut interp = Interpreter::new();
        interp.clear_output();
        interp
    }

    fn run(code: &str) -> Vec<Value> {
        let mut interp = setup_interpreter();
        execute_string(code, &mut interp).unwrap()
    }

    #[test]
    fn test_execute_literals() {
        let stack = run(r#"42 -7 2.5 "hi" #c @s $p"#);
        assert_eq!(stack.len(), 7);
        assert!(matches!(stack[0], Value::Integer(42)));
        assert!(matches!(stack[1], Value::Integer(-7)));
        assert!(matches!(stack[2], Value::Float(f) if f == 2.5));
        assert!(matches!(&stack[3], Value::String(s) if &**s == "hi"));
        assert!(matches!(&stack[4], Value::Channel(s) if &**s == "#c"));
        assert!(matches!(&stack[5], Value::Stack(s) if &**s == "@s"));
        assert!(matches!(&stack[6], Value::PubSub(s) if &**s == "$p"));
    }

    #[test]
    fn test_quotation_token_is_data() {
        let stack = run("[1 2 +]");
        assert_eq!(stack.len(), 1);
        assert!(matches!(&stack[0], Value::Callable(Callable::Quotation(q)) if q.tokens.len() == 3));
    }

    #[test]
    fn test_nonexistent_word() {
        let mut interp = setup_interpreter();
        let err = execute_string("1 frobnicate 2", &mut interp).unwrap_err();
        assert_eq!(err, RuntimeError::NonexistentWord("frobnicate".to_string()));
        assert_eq!(err.to_string(), "NonexistentWord:frobnicate");
    }

    #[test]
    fn test_parse_errors_surface_before_running() {
        let mut interp = setup_interpreter();
        let ctx = interp.create_context(ContextOptions::new());
        let stack = ctx.stack_handle();
        let err = interp.execute(ctx, "1 2 ]").unwrap_err();
        assert!(matches!(err, RuntimeError::Parse(_)));
        assert!(stack.borrow().is_empty());
    }

    #[test]
    fn test_child_shares_parent_stack() {
        assert_eq!(run("1 [2 3] apply +"), vec![Value::Integer(1), Value::Integer(5)]);
    }

    #[test]
    fn test_execute_returns_context_for_reuse() {
        let mut interp = setup_interpreter();
        let ctx = interp.create_context(ContextOptions::new());
        let ctx = interp.execute(ctx, "2 5").unwrap().expect("halted");
        let ctx = interp.execute(ctx, "+").unwrap().expect("halted");
        assert_eq!(ctx.stack_values(), vec![Value::Integer(7)]);
    }

    #[test]
    fn test_deep_tail_recursion_runs_in_constant_memory() {
        let stack = run("define down [dup 0 eq [pop 42] [1 sub down] if] 100000 down");
        assert_eq!(stack, vec![Value::Integer(42)]);
    }

    #[test]
    fn test_non_tail_recursion() {
        let stack = run("define sum [dup 0 eq [] [dup 1 sub sum add] if] 3000 sum");
        assert_eq!(stack, vec![Value::Integer(4_501_500)]);
    }

    #[test]
    fn test_small_resolution_still_finishes() {
        for resolution in [1, 2, 7] {
            let config = InterpreterConfig {
                resolution,
                ..InterpreterConfig::default()
            };
            let mut interp = Interpreter::with_config(config);
            interp.clear_output();
            let stack = execute_string("1 [2 mul] [dup 100 lteq] while", &mut interp).unwrap();
            assert_eq!(stack, vec![Value::Integer(128)]);
        }
    }

    #[test]
    fn test_small_token_budget_keeps_order() {
        let config = InterpreterConfig {
            next_token_budget: 1,
            ..InterpreterConfig::default()
        };
        let mut interp = Interpreter::with_config(config);
        interp.clear_output();
        let stack = execute_string("1 2 3 4 5 6", &mut interp).unwrap();
        let expected: Vec<Value> = (1..=6).map(Value::Integer).collect();
        assert_eq!(stack, expected);
    }

    #[test]
    fn test_bound_and_unbound_programs_agree() {
        let program = "define sq [dup mul] define quad [sq sq] 3 quad [1 2 3] list 0 [add] fold";
        let unbound = run(program);

        let config = InterpreterConfig {
            bind_programs: true,
            ..InterpreterConfig::default()
        };
        let mut interp = Interpreter::with_config(config);
        interp.clear_output();
        let bound = execute_string(program, &mut interp).unwrap();
        assert_eq!(unbound, bound);
        assert_eq!(bound, vec![Value::Integer(81), Value::Integer(6)]);
    }

    #[test]
    fn test_trace_writes_one_line_per_token() {
        let mut interp = setup_interpreter();
        let output = BufferOutput::new();
        interp.set_output(Box::new(output.clone()));
        let ctx = interp.create_context(ContextOptions::new().with_trace(true));
        interp.execute(ctx, "2 5 +").unwrap();
        let lines = output.lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].contains("+ --> "), "unexpected trace line {:?}", lines[2]);
        assert!(lines[2].ends_with("[5 2]"), "unexpected trace line {:?}", lines[2]);
    }
}
