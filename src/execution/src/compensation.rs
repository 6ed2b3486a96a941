//! Per-execution compensation stack (§3): side-effect-reversing closures
//! appended by stages that produce externally visible effects, run in
//! reverse registration order on pipeline failure. Compensations are
//! best-effort — their own failures are logged, never propagated.

pub struct CompensationStack {
    entries: Vec<(&'static str, Box<dyn FnOnce() + Send>)>,
}

impl CompensationStack {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn push(&mut self, label: &'static str, action: impl FnOnce() + Send + 'static) {
        self.entries.push((label, Box::new(action)));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs every registered action in reverse order. A panicking
    /// compensation is caught and logged rather than allowed to unwind
    /// into the caller, matching `CompensationFailed`'s policy.
    pub fn run_all(self) {
        for (label, action) in self.entries.into_iter().rev() {
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(action));
            if outcome.is_err() {
                tracing::warn!(compensation = label, "compensation action panicked, continuing with remaining entries");
            }
        }
    }
}

impl Default for CompensationStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn runs_in_reverse_registration_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut stack = CompensationStack::new();

        let o1 = order.clone();
        stack.push("first", move || o1.lock().unwrap().push(1));
        let o2 = order.clone();
        stack.push("second", move || o2.lock().unwrap().push(2));

        stack.run_all();
        assert_eq!(*order.lock().unwrap(), vec![2, 1]);
    }

    #[test]
    fn a_panicking_entry_does_not_stop_the_rest() {
        let ran = Arc::new(AtomicU32::new(0));
        let mut stack = CompensationStack::new();

        stack.push("boom", || panic!("reversal failed"));
        let r = ran.clone();
        stack.push("still runs", move || {
            r.fetch_add(1, Ordering::SeqCst);
        });

        stack.run_all();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }
}
