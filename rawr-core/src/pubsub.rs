// Broadcast point: every publish starts one fresh context per subscriber,
// each with its own copy of the value.

use std::rc::Rc;

use crate::value::Callable;

#[derive(Debug, Clone)]
pub struct Subscriber {
    pub name: Option<Rc<str>>,
    pub callable: Callable,
}

#[derive(Debug)]
pub struct PubSub {
    name: Rc<str>,
    subscribers: Vec<Subscriber>,
}

impl PubSub {
    pub fn new(name: Rc<str>) -> Self {
        Self {
            name,
            subscribers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subscribe(&mut self, name: Option<Rc<str>>, callable: Callable) {
        self.subscribers.push(Subscriber { name, callable });
    }

    // Snapshot taken at publish time; later subscriptions do not see the value
    pub fn subscribers(&self) -> Vec<Subscriber> {
        self.subscribers.clone()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
