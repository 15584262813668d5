/// Thread-safe progress reporting for stack-wide operations.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// Work over `total_items` slices is about to start.
    fn begin(&self, _total_items: usize) {}

    /// One more slice has completed; `items_done` is the running total.
    fn advance(&self, _items_done: usize) {}

    /// All slices are done.
    fn finish(&self) {}
}

/// No-op progress reporter, used when `transform` delegates.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
