//! Single-shot slots for asynchronous decode results.
//!
//! Decoding an image is the only asynchronous step in the editor. A slot
//! tracks the one outstanding request of its kind: starting a new request
//! supersedes the previous one, and a completion carrying a superseded token
//! is dropped.

/// Identifies one request made on a [`PendingSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingToken(u64);

/// Holds at most one outstanding request.
#[derive(Debug, Clone)]
pub struct PendingSlot<T> {
    generation: u64,
    outstanding: Option<u64>,
    ready: Option<T>,
}

impl<T> Default for PendingSlot<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            outstanding: None,
            ready: None,
        }
    }
}

impl<T> PendingSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, replacing any outstanding one.
    pub fn begin(&mut self) -> PendingToken {
        self.generation += 1;
        self.outstanding = Some(self.generation);
        self.ready = None;
        PendingToken(self.generation)
    }

    /// Deliver a result. Returns false if `token` was superseded or
    /// cancelled, in which case `value` is dropped.
    pub fn complete(&mut self, token: PendingToken, value: T) -> bool {
        if self.outstanding != Some(token.0) {
            log::debug!("Dropping stale decode result (request {})", token.0);
            return false;
        }
        self.outstanding = None;
        self.ready = Some(value);
        true
    }

    /// Take the delivered result, if any.
    pub fn take(&mut self) -> Option<T> {
        self.ready.take()
    }

    pub fn is_pending(&self) -> bool {
        self.outstanding.is_some()
    }

    /// Forget the outstanding request and any undelivered result.
    pub fn cancel(&mut self) {
        self.outstanding = None;
        self.ready = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_and_take() {
        let mut slot = PendingSlot::new();
        let token = slot.begin();
        assert!(slot.is_pending());
        assert!(slot.complete(token, 7));
        assert!(!slot.is_pending());
        assert_eq!(slot.take(), Some(7));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn test_new_request_replaces_pending() {
        let mut slot = PendingSlot::new();
        let first = slot.begin();
        let second = slot.begin();
        assert!(!slot.complete(first, "old"));
        assert!(slot.complete(second, "new"));
        assert_eq!(slot.take(), Some("new"));
    }

    #[test]
    fn test_cancel_drops_completion() {
        let mut slot = PendingSlot::new();
        let token = slot.begin();
        slot.cancel();
        assert!(!slot.complete(token, 1));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn test_token_completes_once() {
        let mut slot = PendingSlot::new();
        let token = slot.begin();
        assert!(slot.complete(token, 1));
        assert!(!slot.complete(token, 2));
        assert_eq!(slot.take(), Some(1));
    }
}
