// A named value stack shared by every context, with triggers that run
// synchronously on each push.

use std::rc::Rc;

use crate::value::{Callable, Value};

#[derive(Debug)]
pub struct NamedStack {
    name: Rc<str>,
    values: Vec<Value>,
    triggers: Vec<Callable>,
}

impl NamedStack {
    pub fn new(name: Rc<str>) -> Self {
        Self {
            name,
            values: Vec::new(),
            triggers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // Returns the triggers to fire for this push, in registration order
    pub fn push(&mut self, value: Value) -> Vec<Callable> {
        self.values.push(value);
        self.triggers.clone()
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.values.pop()
    }

    pub fn add_trigger(&mut self, trigger: Callable) {
        self.triggers.push(trigger);
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn trigger_count(&self) -> usize {
        self.triggers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_order() {
        let mut stack = NamedStack::new(Rc::from("@s"));
        assert!(stack.push(Value::Integer(1)).is_empty());
        stack.push(Value::Integer(2));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop(), Some(Value::Integer(2)));
        assert_eq!(stack.pop(), Some(Value::Integer(1)));
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_push_reports_triggers() {
        let mut stack = NamedStack::new(Rc::from("@s"));
        stack.add_trigger(Callable::Quoted(Rc::new(Value::Null)));
        stack.add_trigger(Callable::Quoted(Rc::new(Value::Boolean(true))));
        let triggers = stack.push(Value::Integer(5));
        assert_eq!(triggers.len(), 2);
        assert_eq!(stack.trigger_count(), 2);
        assert_eq!(stack.values(), &[Value::Integer(5)]);
    }
}
