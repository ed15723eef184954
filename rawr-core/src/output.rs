//! Output sink for the interpreter
//!
//! Words that print (`write`, `display_stack`, `print_stack`) and guest-level
//! tracing go through this trait, so a host can route them to a terminal,
//! a log, or a buffer.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

/// Destination for everything the interpreter prints.
pub trait Output {
    /// Write bytes to the output.
    fn write(&mut self, data: &[u8]) -> io::Result<()>;

    /// Flush any buffered output.
    fn flush(&mut self) -> io::Result<()>;
}

/// In-memory sink. Clones share one buffer, so a test can keep a handle
/// while the interpreter owns another.
#[derive(Debug, Clone, Default)]
pub struct BufferOutput {
    buffer: Rc<RefCell<Vec<u8>>>,
}

impl BufferOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.borrow()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        self.buffer.borrow_mut().clear();
    }
}

impl Output for BufferOutput {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.buffer.borrow_mut().extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_output_shares_contents() {
        let handle = BufferOutput::new();
        let mut sink: Box<dyn Output> = Box::new(handle.clone());

        sink.write(b"Hello, ").unwrap();
        sink.write(b"World!\nsecond").unwrap();
        sink.flush().unwrap();

        assert_eq!(handle.contents(), "Hello, World!\nsecond");
        assert_eq!(handle.lines(), vec!["Hello, World!", "second"]);

        handle.clear();
        assert!(handle.contents().is_empty());
    }
}
