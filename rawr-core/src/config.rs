// Interpreter-wide defaults. Contexts copy the scheduling fields at creation
// time; `ContextOptions` overrides them per context.

pub const DEFAULT_RESOLUTION: u64 = 500;
pub const DEFAULT_NEXT_TOKEN_BUDGET: u32 = 8000;
pub const DEFAULT_TERMINAL_WIDTH: usize = 160;
pub const DEFAULT_FAILURE_LOG_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct InterpreterConfig {
    // Every `resolution`-th trampoline step is deferred to the ready queue
    pub resolution: u64,
    // Tokens one `NextToken` continuation may dispatch before re-enqueuing itself
    pub next_token_budget: u32,
    pub trace: bool,
    pub terminal_width: usize,
    // Fixed seed for thread ids and `rand`; entropy when None
    pub seed: Option<u64>,
    // Run the binder over every program passed to `execute`
    pub bind_programs: bool,
    // Failures kept for `take_failures`; the oldest are discarded beyond this
    pub failure_log_capacity: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            next_token_budget: DEFAULT_NEXT_TOKEN_BUDGET,
            trace: false,
            terminal_width: DEFAULT_TERMINAL_WIDTH,
            seed: None,
            bind_programs: false,
            failure_log_capacity: DEFAULT_FAILURE_LOG_CAPACITY,
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl InterpreterConfig {
    // RAWR_RESOLUTION, RAWR_NEXT_TOKEN_BUDGET, RAWR_TRACE, RAWR_TERMINAL_WIDTH,
    // RAWR_SEED, RAWR_BIND, RAWR_FAILURE_LOG
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    // Unset or unparsable values keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let number = |key: &str| lookup(key).and_then(|raw| raw.trim().parse::<u64>().ok());

        Self {
            resolution: number("RAWR_RESOLUTION")
                .filter(|r| *r > 0)
                .unwrap_or(defaults.resolution),
            next_token_budget: number("RAWR_NEXT_TOKEN_BUDGET")
                .and_then(|b| u32::try_from(b).ok())
                .filter(|b| *b > 0)
                .unwrap_or(defaults.next_token_budget),
            trace: lookup("RAWR_TRACE")
                .and_then(|raw| parse_flag(&raw))
                .unwrap_or(defaults.trace),
            terminal_width: number("RAWR_TERMINAL_WIDTH")
                .and_then(|w| usize::try_from(w).ok())
                .filter(|w| *w >= 20)
                .unwrap_or(defaults.terminal_width),
            seed: number("RAWR_SEED").or(defaults.seed),
            bind_programs: lookup("RAWR_BIND")
                .and_then(|raw| parse_flag(&raw))
                .unwrap_or(defaults.bind_programs),
            failure_log_capacity: number("RAWR_FAILURE_LOG")
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(defaults.failure_log_capacity),
        }
    }
}
