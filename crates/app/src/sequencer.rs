//! Releases generation results in the order their requests were sent.

use std::collections::{BTreeMap, BTreeSet};

pub type RequestId = u64;

/// Prefix for results of requests that were given up on before finishing.
pub const LATE_PREFIX: &str = "(late) ";

#[derive(Debug, Default)]
pub struct ResponseSequencer {
    next_id: RequestId,
    next_release: RequestId,
    held: BTreeMap<RequestId, String>,
    /// Requests skipped by `release_all` that have not reported yet
    abandoned: BTreeSet<RequestId>,
}

impl ResponseSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the id for a new request.
    pub fn issue(&mut self) -> RequestId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Record the result of `id` and return every line now releasable.
    ///
    /// A result that finishes ahead of an earlier request is held back until
    /// the earlier one completes. Results of abandoned requests are released
    /// at once, tagged with [`LATE_PREFIX`].
    pub fn complete(&mut self, id: RequestId, line: String) -> Vec<String> {
        if self.abandoned.remove(&id) {
            return vec![format!("{}{}", LATE_PREFIX, line)];
        }
        if id < self.next_release || id >= self.next_id {
            tracing::warn!("ignoring result for unknown request {}", id);
            return Vec::new();
        }
        self.held.insert(id, line);

        let mut ready = Vec::new();
        while let Some(line) = self.held.remove(&self.next_release) {
            ready.push(line);
            self.next_release += 1;
        }
        if !self.held.is_empty() {
            tracing::debug!(
                "holding {} result(s) behind request {}",
                self.held.len(),
                self.next_release
            );
        }
        ready
    }

    /// Stop waiting on every outstanding request.
    ///
    /// Held results are returned in send order; requests still running are
    /// marked abandoned and will report as late.
    pub fn release_all(&mut self) -> Vec<String> {
        let mut ready = Vec::new();
        for id in self.next_release..self.next_id {
            match self.held.remove(&id) {
                Some(line) => ready.push(line),
                None => {
                    self.abandoned.insert(id);
                }
            }
        }
        if !self.abandoned.is_empty() {
            tracing::info!("no longer waiting on {} request(s)", self.abandoned.len());
        }
        self.next_release = self.next_id;
        ready
    }

    /// Requests issued whose results have not been released.
    pub fn in_flight(&self) -> usize {
        (self.next_id - self.next_release) as usize + self.abandoned.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_order_completion_releases_immediately() {
        let mut seq = ResponseSequencer::new();
        let a = seq.issue();
        let b = seq.issue();
        assert_eq!(seq.complete(a, "a".into()), vec!["a"]);
        assert_eq!(seq.complete(b, "b".into()), vec!["b"]);
        assert_eq!(seq.in_flight(), 0);
    }

    #[test]
    fn test_early_result_waits_for_earlier_request() {
        let mut seq = ResponseSequencer::new();
        let a = seq.issue();
        let b = seq.issue();
        let c = seq.issue();

        assert!(seq.complete(c, "c".into()).is_empty());
        assert!(seq.complete(b, "b".into()).is_empty());
        assert_eq!(seq.in_flight(), 3);
        assert_eq!(seq.complete(a, "a".into()), vec!["a", "b", "c"]);
        assert_eq!(seq.in_flight(), 0);
    }

    #[test]
    fn test_unknown_and_duplicate_ids_are_ignored() {
        let mut seq = ResponseSequencer::new();
        let a = seq.issue();
        assert!(seq.complete(7, "bogus".into()).is_empty());
        assert_eq!(seq.complete(a, "a".into()), vec!["a"]);
        assert!(seq.complete(a, "again".into()).is_empty());
    }

    #[test]
    fn test_release_all_frees_results_behind_stuck_request() {
        let mut seq = ResponseSequencer::new();
        let stuck = seq.issue();
        let done = seq.issue();
        assert!(seq.complete(done, "done".into()).is_empty());

        assert_eq!(seq.release_all(), vec!["done"]);
        assert_eq!(seq.in_flight(), 1);

        let next = seq.issue();
        assert_eq!(seq.complete(next, "next".into()), vec!["next"]);
        assert_eq!(seq.complete(stuck, "old".into()), vec!["(late) old"]);
        assert_eq!(seq.in_flight(), 0);
        assert!(seq.complete(stuck, "old".into()).is_empty());
    }
}
