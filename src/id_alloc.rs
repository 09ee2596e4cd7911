//! Sequential identifier allocation
//!
//! Every entity class (task, operator, data object, error entity) gets its own
//! zero-based counter formatted as `<prefix><n>` in lowercase. Explicit ids found in
//! the input are reserved before transformation starts and are never reassigned: the
//! allocator skips forward past any collision. Allocation order follows pre-order,
//! depth-first traversal with children in source array order, so identical input
//! always produces identical ids.

use std::collections::HashSet;

/// Entity classes with independent id counters.
///
/// Connectors, phenotypes, and genotypes deliberately share the single
/// `ErrorEntity` namespace (`e0, e1, ...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdClass {
    Task,
    Operator,
    DataObject,
    ErrorEntity,
}

impl IdClass {
    fn prefix(self) -> &'static str {
        match self {
            IdClass::Task => "t",
            IdClass::Operator => "o",
            IdClass::DataObject => "a",
            IdClass::ErrorEntity => "e",
        }
    }

    fn index(self) -> usize {
        match self {
            IdClass::Task => 0,
            IdClass::Operator => 1,
            IdClass::DataObject => 2,
            IdClass::ErrorEntity => 3,
        }
    }
}

/// Per-conversion identifier allocator.
///
/// Instantiated fresh for every conversion and passed explicitly to the components
/// that need it; there is no process-wide counter state.
#[derive(Debug, Default)]
pub struct IdAllocator {
    counters: [usize; 4],
    reserved: [HashSet<String>; 4],
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an explicit id so auto-allocation never collides with it.
    pub fn reserve(&mut self, class: IdClass, id: &str) {
        self.reserved[class.index()].insert(id.to_string());
    }

    /// Whether an id is already reserved within a class.
    pub fn is_reserved(&self, class: IdClass, id: &str) -> bool {
        self.reserved[class.index()].contains(id)
    }

    /// Issue the next unused id for the class.
    pub fn next_id(&mut self, class: IdClass) -> String {
        let idx = class.index();
        loop {
            let candidate = format!("{}{}", class.prefix(), self.counters[idx]);
            self.counters[idx] += 1;
            if !self.reserved[idx].contains(&candidate) {
                self.reserved[idx].insert(candidate.clone());
                return candidate;
            }
        }
    }

    /// Use the explicit id when present, otherwise allocate the next one.
    pub fn resolve(&mut self, class: IdClass, explicit: Option<&str>) -> String {
        match explicit {
            Some(id) => {
                self.reserve(class, id);
                id.to_string()
            }
            None => self.next_id(class),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_lowercase_ids() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.next_id(IdClass::Task), "t0");
        assert_eq!(alloc.next_id(IdClass::Task), "t1");
        assert_eq!(alloc.next_id(IdClass::Task), "t2");
    }

    #[test]
    fn test_classes_count_independently() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.next_id(IdClass::Task), "t0");
        assert_eq!(alloc.next_id(IdClass::Operator), "o0");
        assert_eq!(alloc.next_id(IdClass::DataObject), "a0");
        assert_eq!(alloc.next_id(IdClass::ErrorEntity), "e0");
        assert_eq!(alloc.next_id(IdClass::Operator), "o1");
    }

    #[test]
    fn test_explicit_id_never_reassigned() {
        let mut alloc = IdAllocator::new();
        alloc.reserve(IdClass::Task, "t1");
        assert_eq!(alloc.next_id(IdClass::Task), "t0");
        // t1 is taken by the document, the allocator skips past it.
        assert_eq!(alloc.next_id(IdClass::Task), "t2");
    }

    #[test]
    fn test_skips_run_of_explicit_ids() {
        let mut alloc = IdAllocator::new();
        alloc.reserve(IdClass::Task, "t0");
        alloc.reserve(IdClass::Task, "t1");
        alloc.reserve(IdClass::Task, "t2");
        assert_eq!(alloc.next_id(IdClass::Task), "t3");
    }

    #[test]
    fn test_resolve_prefers_explicit() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.resolve(IdClass::Task, Some("login")), "login");
        assert_eq!(alloc.resolve(IdClass::Task, None), "t0");
        assert!(alloc.is_reserved(IdClass::Task, "login"));
    }

    #[test]
    fn test_non_numeric_explicit_ids_do_not_disturb_sequence() {
        let mut alloc = IdAllocator::new();
        alloc.reserve(IdClass::ErrorEntity, "connector-main");
        assert_eq!(alloc.next_id(IdClass::ErrorEntity), "e0");
        assert_eq!(alloc.next_id(IdClass::ErrorEntity), "e1");
    }

    #[test]
    fn test_fresh_allocator_is_deterministic() {
        let run = || {
            let mut alloc = IdAllocator::new();
            alloc.reserve(IdClass::Task, "t2");
            (0..4).map(|_| alloc.next_id(IdClass::Task)).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
        assert_eq!(run(), vec!["t0", "t1", "t3", "t4"]);
    }
}
