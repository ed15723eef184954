use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::io;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use crate::channel::Channel;
use crate::config::InterpreterConfig;
use crate::context::{Context, ContextOptions, Continuation, TaskId};
use crate::named_stack::NamedStack;
use crate::output::Output;
use crate::parser::Quotation;
use crate::pubsub::PubSub;
use crate::stdout_output::StdoutOutput;
use crate::threads::ThreadRegistry;
use crate::value::{Callable, NativeFn, RuntimeError, Value, Word, WordBody};

// Dictionary entry: the word's behaviour plus optional help text
#[derive(Clone)]
pub struct DictEntry {
    pub body: WordBody,
    pub doc: Option<Rc<str>>,
}

impl fmt::Debug for DictEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictEntry")
            .field("body", &self.body)
            .field("doc", &self.doc)
            .finish()
    }
}

// A context that failed while nobody was waiting on it directly
#[derive(Debug, Clone)]
pub struct ContextFailure {
    pub task: TaskId,
    pub thread: Option<Rc<str>>,
    pub error: RuntimeError,
}

fn write_line(output: &mut dyn Output, text: &str) -> io::Result<()> {
    output.write(text.as_bytes())?;
    output.write(b"\n")?;
    output.flush()
}

// RUST CONCEPT: One engine instance owns every registry
// Channels, pubsubs, named stacks and threads are global by name inside one
// Interpreter, but two Interpreters in the same process never see each other.
pub struct Interpreter {
    pub dictionary: HashMap<Rc<str>, DictEntry>,
    pub(crate) channels: HashMap<Rc<str>, Channel>,
    pub(crate) pubsubs: HashMap<Rc<str>, PubSub>,
    pub(crate) stacks: HashMap<Rc<str>, NamedStack>,
    pub(crate) threads: ThreadRegistry,
    // Contexts waiting for a scheduling turn, served FIFO
    pub(crate) ready: VecDeque<Context>,
    pub(crate) step_count: u64,
    pub(crate) tokens_dispatched: u64,
    // Bumped by stop-threads; contexts spawned under an older epoch are dropped
    pub(crate) thread_epoch: u64,
    pub(crate) rng: StdRng,
    next_task: u64,
    failures: VecDeque<ContextFailure>,
    failures_discarded: u64,
    output: Option<Box<dyn Output>>,
    config: InterpreterConfig,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default())
    }

    pub fn with_config(config: InterpreterConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut interpreter = Self {
            dictionary: HashMap::new(),
            channels: HashMap::new(),
            pubsubs: HashMap::new(),
            stacks: HashMap::new(),
            threads: ThreadRegistry::new(),
            ready: VecDeque::new(),
            step_count: 0,
            tokens_dispatched: 0,
            thread_epoch: 0,
            rng,
            next_task: 0,
            failures: VecDeque::new(),
            failures_discarded: 0,
            output: Some(Box::new(StdoutOutput::new())),
            config,
        };

        // Primitives first, then the words written in RawrCat on top of them
        crate::builtins::register_builtins(&mut interpreter);
        if let Err(error) = crate::prelude::load_prelude(&mut interpreter) {
            warn!(%error, "prelude failed to load");
        }

        interpreter
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    // ---- output ----

    pub fn set_output(&mut self, output: Box<dyn Output>) {
        self.output = Some(output);
    }

    // Discard everything the interpreter prints
    pub fn clear_output(&mut self) {
        self.output = None;
    }

    pub fn writeln(&mut self, text: &str) -> Result<(), RuntimeError> {
        match self.output.as_deref_mut() {
            Some(output) => write_line(output, text).map_err(|e| RuntimeError::Output(e.to_string())),
            None => Ok(()),
        }
    }

    // ---- dictionary ----

    pub fn add_native(&mut self, name: &str, func: NativeFn, doc: Option<&str>) {
        self.dictionary.insert(
            Rc::from(name),
            DictEntry {
                body: WordBody::Native(func),
                doc: doc.map(Rc::from),
            },
        );
    }

    // Binds `quotation` and stores it under `name`, replacing any earlier entry
    pub fn define_word(&mut self, name: &str, quotation: &Quotation) {
        let bound = self.compile(quotation);
        let doc = self.dictionary.get(name).and_then(|entry| entry.doc.clone());
        self.dictionary.insert(
            Rc::from(name),
            DictEntry {
                body: WordBody::Quotation(Rc::new(bound)),
                doc,
            },
        );
        debug!(word = name, "defined word");
    }

    pub fn lookup(&self, name: &str) -> Option<Word> {
        self.dictionary
            .get_key_value(name)
            .map(|(key, entry)| Word::new(Rc::clone(key), entry.body.clone()))
    }

    pub fn doc(&self, name: &str) -> Option<&str> {
        self.dictionary.get(name).and_then(|entry| entry.doc.as_deref())
    }

    // Returns false when `name` is not defined
    pub fn set_doc(&mut self, name: &str, doc: &str) -> bool {
        match self.dictionary.get_mut(name) {
            Some(entry) => {
                entry.doc = Some(Rc::from(doc));
                true
            }
            None => false,
        }
    }

    // ---- contexts and scheduling ----

    pub(crate) fn next_task_id(&mut self) -> TaskId {
        self.next_task += 1;
        TaskId(self.next_task)
    }

    // Fresh context: empty stack/tokens/continuations, depth 0, configured
    // resolution and trace flag, no thread id, unless overridden
    pub fn create_context(&mut self, options: ContextOptions) -> Context {
        let stack = match (options.shared_stack, options.stack) {
            (Some(shared), _) => shared,
            (None, Some(values)) => Rc::new(RefCell::new(values)),
            (None, None) => Rc::new(RefCell::new(Vec::new())),
        };
        Context {
            stack,
            tokens: Vec::new(),
            continuations: Vec::new(),
            thread: options.thread,
            depth: options.depth.unwrap_or(0),
            resolution: options.resolution.unwrap_or(self.config.resolution).max(1),
            trace: options.trace.unwrap_or(self.config.trace),
            next_token_budget: self.config.next_token_budget,
            task: self.next_task_id(),
            epoch: None,
        }
    }

    // A top-level context that runs `callable` on its own stack, inheriting
    // thread id, scheduling fields and epoch from `template`
    pub(crate) fn detached_context(
        &self,
        template: &Context,
        stack: Vec<Value>,
        callable: &Callable,
        task: TaskId,
    ) -> Context {
        let (tokens, start) = match callable {
            Callable::Quotation(quotation) => (quotation.tokens.clone(), Continuation::NextToken),
            other => (Vec::new(), Continuation::Invoke(other.clone())),
        };
        Context {
            stack: Rc::new(RefCell::new(stack)),
            tokens,
            continuations: vec![start],
            thread: template.thread.clone(),
            depth: 0,
            resolution: template.resolution,
            trace: template.trace,
            next_token_budget: self.config.next_token_budget,
            task,
            epoch: template.epoch,
        }
    }

    pub fn schedule(&mut self, ctx: Context) {
        self.ready.push_back(ctx);
    }

    pub fn runnable(&self) -> usize {
        self.ready.len()
    }

    pub fn steps(&self) -> u64 {
        self.step_count
    }

    pub fn tokens_dispatched(&self) -> u64 {
        self.tokens_dispatched
    }

    // ---- registries ----

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }

    pub fn pubsub(&self, name: &str) -> Option<&PubSub> {
        self.pubsubs.get(name)
    }

    pub fn named_stack(&self, name: &str) -> Option<&NamedStack> {
        self.stacks.get(name)
    }

    pub fn live_threads(&self) -> usize {
        self.threads.len()
    }

    pub fn thread_epoch(&self) -> u64 {
        self.thread_epoch
    }

    // Abandons every thread: the registry is emptied, every channel's wait
    // queues are dropped, and queued contexts from the old epoch will never
    // get another turn. No cancellation signal reaches them.
    pub fn stop_all_threads(&mut self) {
        let threads = self.threads.clear();
        let parked: usize = self.channels.values_mut().map(Channel::clear).sum();
        self.thread_epoch += 1;
        debug!(threads, parked, epoch = self.thread_epoch, "stopped all threads");
    }

    // ---- failures ----

    // The log is bounded by `failure_log_capacity`: once full, each new
    // failure pushes out the oldest one
    pub(crate) fn record_failure(&mut self, task: TaskId, thread: Option<Rc<str>>, error: RuntimeError) {
        warn!(%task, thread = thread.as_deref().unwrap_or("-"), %error, "context failed");
        let capacity = self.config.failure_log_capacity;
        if capacity == 0 {
            self.failures_discarded += 1;
            return;
        }
        while self.failures.len() >= capacity {
            self.failures.pop_front();
            self.failures_discarded += 1;
        }
        self.failures.push_back(ContextFailure { task, thread, error });
    }

    // Drains the failures of detached contexts (threads, pubsub deliveries)
    // recorded since the last call, oldest first. Hosts that run long-lived
    // programs should call this periodically.
    pub fn take_failures(&mut self) -> Vec<ContextFailure> {
        self.failures.drain(..).collect()
    }

    // Failures pushed out of the full log (or never kept, at capacity 0)
    pub fn failures_discarded(&self) -> u64 {
        self.failures_discarded
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
