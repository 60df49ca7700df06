//! Single-use edit tokens per page title.

use std::collections::HashMap;
use std::sync::RwLock;

/// Process-wide table of per-title edit tokens.
///
/// A title is either staged (exactly one edit allowed) or unstaged.
/// Staging arms one token; acquiring consumes it. Entries are created on
/// first contact and never removed. Every decision runs under a single
/// write hold, so two concurrent edits can never both win the same token.
#[derive(Debug, Default)]
pub struct EditLocks {
    staged: RwLock<HashMap<String, bool>>,
}

impl EditLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the edit token for `title` if one is armed.
    ///
    /// A title never seen before is recorded as unstaged and denied.
    pub fn try_acquire(&self, title: &str) -> bool {
        let mut staged = self.staged.write().unwrap();
        let token = staged.entry(title.to_string()).or_insert(false);
        let granted = *token;
        *token = false;
        granted
    }

    /// Arm one edit token for `title`.
    pub fn stage(&self, title: &str) {
        let mut staged = self.staged.write().unwrap();
        staged.insert(title.to_string(), true);
    }

    /// Whether `title` currently holds an armed token.
    pub fn is_staged(&self, title: &str) -> bool {
        let staged = self.staged.read().unwrap();
        staged.get(title).copied().unwrap_or(false)
    }

    /// Whether the table has ever seen `title`.
    pub fn contains(&self, title: &str) -> bool {
        let staged = self.staged.read().unwrap();
        staged.contains_key(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn first_acquire_denies_and_records_the_title() {
        let locks = EditLocks::new();

        assert!(!locks.contains("Foo"));
        assert!(!locks.try_acquire("Foo"));
        assert!(locks.contains("Foo"));
        assert!(!locks.is_staged("Foo"));
    }

    #[test]
    fn stage_grants_exactly_one_acquire() {
        let locks = EditLocks::new();

        locks.stage("Foo");
        assert!(locks.is_staged("Foo"));

        assert!(locks.try_acquire("Foo"));
        assert!(!locks.try_acquire("Foo"));
    }

    #[test]
    fn staging_twice_still_grants_once() {
        let locks = EditLocks::new();

        locks.stage("Foo");
        locks.stage("Foo");

        assert!(locks.try_acquire("Foo"));
        assert!(!locks.try_acquire("Foo"));
    }

    #[test]
    fn restaging_rearms_a_consumed_token() {
        let locks = EditLocks::new();

        locks.stage("Foo");
        assert!(locks.try_acquire("Foo"));

        locks.stage("Foo");
        assert!(locks.try_acquire("Foo"));
    }

    #[test]
    fn titles_are_independent() {
        let locks = EditLocks::new();

        locks.stage("Foo");
        assert!(!locks.try_acquire("Bar"));
        assert!(locks.try_acquire("Foo"));
    }

    #[test]
    fn one_staged_token_grants_exactly_one_of_many_threads() {
        let locks = Arc::new(EditLocks::new());
        locks.stage("Contested");

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let locks = Arc::clone(&locks);
                std::thread::spawn(move || locks.try_acquire("Contested"))
            })
            .collect();

        let granted = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|granted| *granted)
            .count();

        assert_eq!(granted, 1);
    }
}
