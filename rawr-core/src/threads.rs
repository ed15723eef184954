// Registry of live cooperative threads. A thread is only an id and a label;
// its Context lives wherever it is currently scheduled or parked.

use std::collections::HashMap;
use std::rc::Rc;

use rand::RngCore;

#[derive(Debug, Clone)]
pub struct ThreadInfo {
    pub label: Rc<str>,
    pub spawned: bool, // false for a caller that only received an id
}

#[derive(Debug, Default)]
pub struct ThreadRegistry {
    entries: HashMap<Rc<str>, ThreadInfo>,
}

impl ThreadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Random "%hex" id, retried until it does not collide with a live one
    pub fn allocate_id<R: RngCore>(&self, rng: &mut R) -> Rc<str> {
        loop {
            let id = format!("%{:x}", rng.next_u32());
            if !self.entries.contains_key(id.as_str()) {
                return Rc::from(id);
            }
        }
    }

    pub fn register(&mut self, id: Rc<str>, label: Rc<str>, spawned: bool) {
        self.entries.insert(id, ThreadInfo { label, spawned });
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&ThreadInfo> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Returns how many entries were discarded
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_allocate_id_avoids_live_ids() {
        let mut registry = ThreadRegistry::new();
        let mut rng = StdRng::seed_from_u64(7);
        let first = registry.allocate_id(&mut rng);
        assert!(first.starts_with('%'));
        registry.register(first.clone(), Rc::from("worker:%1"), true);

        // Replaying the same seed must skip the id that is now taken
        let mut replay = StdRng::seed_from_u64(7);
        let second = registry.allocate_id(&mut replay);
        assert_ne!(first, second);
    }

    #[test]
    fn test_clear_discards_everything() {
        let mut registry = ThreadRegistry::new();
        registry.register(Rc::from("%1"), Rc::from("a:%1"), true);
        registry.register(Rc::from("%2"), Rc::from("%2"), false);
        assert!(registry.contains("%1"));
        assert!(!registry.get("%2").unwrap().spawned);
        assert_eq!(registry.clear(), 2);
        assert!(registry.is_empty());
    }
}
