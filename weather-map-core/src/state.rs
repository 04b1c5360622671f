use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Loading indicator shared between the orchestrator and whoever renders it.
///
/// Loading is held by [`LoadingGuard`]s; the flag reads `true` while at least
/// one guard is alive, so nested steps of the same operation don't clear it
/// early.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    in_flight: Arc<AtomicUsize>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }

    /// Mark loading until the returned guard is dropped.
    #[must_use = "loading ends as soon as the guard is dropped"]
    pub fn begin(&self) -> LoadingGuard {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        LoadingGuard { in_flight: Arc::clone(&self.in_flight) }
    }
}

#[derive(Debug)]
pub struct LoadingGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}
