//! Holds at most one pending invocation: the latest parameters observed
//! while the scheduler was busy.

#[derive(Debug)]
pub struct CoalescingSlot<T> {
    pending: Option<T>,
}

impl<T> Default for CoalescingSlot<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> CoalescingSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `params`, unconditionally replacing any pending value.
    ///
    /// The replaced value, if any, is returned so the caller can account for it.
    pub fn set(&mut self, params: T) -> Option<T> {
        self.pending.replace(params)
    }

    /// Reads and clears the slot in one step.
    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Drops any pending value. Returns whether one was present.
    pub fn clear(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
