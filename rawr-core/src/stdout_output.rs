//! Stdout implementation of [`Output`], the interpreter's default sink.

use std::io::{self, Write};

use crate::output::Output;

#[derive(Debug, Default)]
pub struct StdoutOutput;

impl StdoutOutput {
    pub fn new() -> Self {
        StdoutOutput
    }
}

impl Output for StdoutOutput {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        io::stdout().write_all(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}
