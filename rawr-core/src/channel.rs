// RUST CONCEPT: Rendezvous channel over owned contexts
// A channel holds the contexts waiting on it. A blocked context is moved in
// here and moved back out to the ready queue when a partner arrives, so the
// channel is the only owner of a parked context.

use std::collections::VecDeque;
use std::rc::Rc;

use crate::context::Context;
use crate::value::RuntimeError;

// Outcome of one read or write
#[derive(Debug)]
pub enum Exchange {
    // A partner was waiting: `current` keeps running, `partner` must be
    // rescheduled by the caller
    Matched { current: Context, partner: Context },
    // No partner: the context now belongs to the channel's wait queue
    Parked,
}

#[derive(Debug)]
pub struct Channel {
    name: Rc<str>,
    readers: VecDeque<Context>,
    writers: VecDeque<Context>,
}

impl Channel {
    pub fn new(name: Rc<str>) -> Self {
        Self {
            name,
            readers: VecDeque::new(),
            writers: VecDeque::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn waiting_readers(&self) -> usize {
        self.readers.len()
    }

    pub fn waiting_writers(&self) -> usize {
        self.writers.len()
    }

    pub fn has_waiting_writer(&self) -> bool {
        !self.writers.is_empty()
    }

    // ( value -- ) The value stays on a parked writer's stack until a reader
    // takes it.
    pub fn write(&mut self, writer: Context) -> Result<Exchange, RuntimeError> {
        if writer.stack_len() == 0 {
            return Err(RuntimeError::StackUnderflowAt {
                context: format!("'<-' on {} requires a value to send (e.g., '42 {} <-')", self.name, self.name),
            });
        }
        match self.readers.pop_front() {
            Some(reader) => {
                let value = writer.pop()?;
                reader.push(value);
                Ok(Exchange::Matched {
                    current: writer,
                    partner: reader,
                })
            }
            None => {
                self.writers.push_back(writer);
                Ok(Exchange::Parked)
            }
        }
    }

    // ( -- value )
    pub fn read(&mut self, reader: Context) -> Result<Exchange, RuntimeError> {
        match self.writers.pop_front() {
            Some(writer) => {
                let value = match writer.pop() {
                    Ok(value) => value,
                    Err(e) => {
                        self.writers.push_front(writer);
                        return Err(e);
                    }
                };
                reader.push(value);
                Ok(Exchange::Matched {
                    current: reader,
                    partner: writer,
                })
            }
            None => {
                self.readers.push_back(reader);
                Ok(Exchange::Parked)
            }
        }
    }

    // Drop every waiting context without resuming it; returns how many
    pub fn clear(&mut self) -> usize {
        let abandoned = self.readers.len() + self.writers.len();
        self.readers.clear();
        self.writers.clear();
        abandoned
    }
}
