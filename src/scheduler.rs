//! Cooperative task runner driven one step at a time by the host frame loop.
//!
//! Each registered task is a key; the caller supplies the work for a key when
//! it ticks the scheduler. A task stays registered while its step reports that
//! more work remains. Tasks can be queued behind another task and only start
//! after that one finishes.

use std::collections::BTreeSet;
use std::fmt::Debug;

#[derive(Clone, Debug)]
struct Entry<K> {
    key: K,
    /// Task this entry waits for; `None` once active.
    after: Option<K>,
}

#[derive(Clone, Debug)]
pub struct Scheduler<K> {
    entries: Vec<Entry<K>>,
    generators: BTreeSet<String>,
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            generators: BTreeSet::new(),
        }
    }
}

impl<K: Ord + Clone + Debug> Scheduler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `key` as an active task, replacing any entry with that key.
    pub fn add_task(&mut self, key: K) {
        self.insert(Entry { key, after: None });
    }

    /// Registers `key` to start once `after` is done. Starts immediately when
    /// `after` is not registered or already waits on `key`.
    pub fn queue_task(&mut self, key: K, after: K) {
        if self.waits_on(&after, &key) {
            log::warn!("task {key:?} cannot wait on {after:?}: dependency cycle");
            self.insert(Entry { key, after: None });
            return;
        }

        let after = self.contains(&after).then_some(after);
        self.insert(Entry { key, after });
    }

    /// True when `from` is `target` or is chained, directly or not, behind it.
    fn waits_on(&self, from: &K, target: &K) -> bool {
        let mut current = from;
        for _ in 0..=self.entries.len() {
            if current == target {
                return true;
            }
            match self
                .entries
                .iter()
                .find(|entry| &entry.key == current)
                .and_then(|entry| entry.after.as_ref())
            {
                Some(next) => current = next,
                None => return false,
            }
        }
        false
    }

    fn insert(&mut self, entry: Entry<K>) {
        log::trace!("register task {:?} after {:?}", entry.key, entry.after);
        if let Some(existing) = self.entries.iter_mut().find(|e| e.key == entry.key) {
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
    }

    /// Deregisters `key` and every task chained behind it.
    pub fn remove_task(&mut self, key: &K) {
        let mut doomed = vec![key.clone()];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let current = doomed[cursor].clone();
            for entry in &self.entries {
                if entry.after.as_ref() == Some(&current) && !doomed.contains(&entry.key) {
                    doomed.push(entry.key.clone());
                }
            }
            cursor += 1;
        }

        self.entries.retain(|entry| !doomed.contains(&entry.key));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.iter().any(|entry| &entry.key == key)
    }

    pub fn is_active(&self, key: &K) -> bool {
        self.entries
            .iter()
            .any(|entry| &entry.key == key && entry.after.is_none())
    }

    pub fn is_idle(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs one step of every active task, in registration order.
    ///
    /// A task whose step returns `false` is removed and the tasks queued
    /// behind it become active for the next tick. An error from `run` stops
    /// the tick; the failing task stays registered. Returns whether any task
    /// remains.
    pub fn tick<E>(&mut self, mut run: impl FnMut(&K) -> Result<bool, E>) -> Result<bool, E> {
        let active = self
            .entries
            .iter()
            .filter(|entry| entry.after.is_none())
            .map(|entry| entry.key.clone())
            .collect::<Vec<_>>();

        for key in active {
            if !run(&key)? {
                self.finish(&key);
            }
        }

        Ok(!self.entries.is_empty())
    }

    /// Ticks until every task has finished.
    pub fn run_until_idle<E>(&mut self, mut run: impl FnMut(&K) -> Result<bool, E>) -> Result<(), E> {
        while self.tick(&mut run)? {}
        Ok(())
    }

    fn finish(&mut self, key: &K) {
        log::trace!("task {key:?} finished");
        self.entries.retain(|entry| &entry.key != key);
        for entry in &mut self.entries {
            if entry.after.as_ref() == Some(key) {
                entry.after = None;
            }
        }
    }

    pub fn start_generator(&mut self, id: &str) -> bool {
        self.generators.insert(id.to_owned())
    }

    pub fn stop_generator(&mut self, id: &str) -> bool {
        self.generators.remove(id)
    }

    pub fn has_generators(&self) -> bool {
        !self.generators.is_empty()
    }

    pub fn generator_ids(&self) -> impl Iterator<Item = &str> {
        self.generators.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::convert::Infallible;

    use super::*;

    /// Runs each key a fixed number of steps and logs every invocation.
    struct Budget {
        remaining: HashMap<&'static str, usize>,
        log: Vec<&'static str>,
    }

    impl Budget {
        fn new(steps: &[(&'static str, usize)]) -> Self {
            Self {
                remaining: steps.iter().copied().collect(),
                log: Vec::new(),
            }
        }

        fn step(&mut self, key: &&'static str) -> Result<bool, Infallible> {
            self.log.push(*key);
            let left = self.remaining.entry(*key).or_insert(1);
            *left = left.saturating_sub(1);
            Ok(*left > 0)
        }
    }

    #[test]
    fn active_tasks_run_in_registration_order() {
        let mut scheduler = Scheduler::new();
        scheduler.add_task("b");
        scheduler.add_task("a");
        let mut budget = Budget::new(&[("a", 2), ("b", 1)]);

        assert!(scheduler.tick(|key| budget.step(key)).unwrap());
        assert!(!scheduler.tick(|key| budget.step(key)).unwrap());

        assert_eq!(budget.log, vec!["b", "a", "a"]);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn queued_task_starts_on_the_tick_after_its_predecessor() {
        let mut scheduler = Scheduler::new();
        scheduler.add_task("nodes");
        scheduler.queue_task("labels", "nodes");
        scheduler.queue_task("edges", "labels");
        assert!(!scheduler.is_active(&"labels"));
        let mut budget = Budget::new(&[("nodes", 1), ("labels", 2), ("edges", 1)]);

        scheduler.run_until_idle(|key| budget.step(key)).unwrap();

        assert_eq!(budget.log, vec!["nodes", "labels", "labels", "edges"]);
    }

    #[test]
    fn queueing_behind_an_unknown_task_starts_immediately() {
        let mut scheduler = Scheduler::new();
        scheduler.queue_task("edges", "nodes");
        assert!(scheduler.is_active(&"edges"));
    }

    #[test]
    fn cyclic_dependencies_are_refused() {
        let mut scheduler = Scheduler::new();
        scheduler.add_task("a");
        scheduler.queue_task("b", "a");
        scheduler.queue_task("a", "b");
        assert!(scheduler.is_active(&"a"));
        assert!(!scheduler.is_active(&"b"));

        scheduler.queue_task("c", "c");
        assert!(scheduler.is_active(&"c"));

        let mut budget = Budget::new(&[("a", 1), ("b", 1), ("c", 1)]);
        scheduler.run_until_idle(|key| budget.step(key)).unwrap();

        assert_eq!(budget.log, vec!["a", "c", "b"]);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn removing_a_task_removes_its_chain() {
        let mut scheduler = Scheduler::new();
        scheduler.add_task("nodes");
        scheduler.queue_task("labels", "nodes");
        scheduler.queue_task("edges", "labels");
        scheduler.add_task("other");

        scheduler.remove_task(&"nodes");

        assert!(!scheduler.contains(&"labels"));
        assert!(!scheduler.contains(&"edges"));
        assert!(scheduler.contains(&"other"));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn re_adding_a_key_replaces_the_entry() {
        let mut scheduler = Scheduler::new();
        scheduler.add_task("nodes");
        scheduler.queue_task("edges", "nodes");
        scheduler.add_task("edges");
        assert_eq!(scheduler.len(), 2);
        assert!(scheduler.is_active(&"edges"));
    }

    #[test]
    fn errors_abort_the_tick() {
        let mut scheduler = Scheduler::new();
        scheduler.add_task(1);
        scheduler.add_task(2);
        let mut calls = Vec::new();

        let outcome = scheduler.tick(|key| {
            calls.push(*key);
            if *key == 1 { Err("boom") } else { Ok(false) }
        });

        assert_eq!(outcome, Err("boom"));
        assert_eq!(calls, vec![1]);
        assert_eq!(scheduler.len(), 2);
    }

    #[test]
    fn generators_are_tracked_by_id() {
        let mut scheduler: Scheduler<u8> = Scheduler::new();
        assert!(!scheduler.has_generators());
        assert!(scheduler.start_generator("layout"));
        assert!(!scheduler.start_generator("layout"));
        assert_eq!(scheduler.generator_ids().collect::<Vec<_>>(), vec!["layout"]);
        assert!(scheduler.stop_generator("layout"));
        assert!(!scheduler.has_generators());
    }
}
