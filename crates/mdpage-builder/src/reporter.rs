//! Build progress reporting.

use std::path::Path;

/// Receives progress events from [`PageBuilder`](crate::PageBuilder).
///
/// All methods default to doing nothing, so implementors only override the
/// events they present.
pub trait BuildReporter {
    /// A diagram is about to be rendered. `number` is 1-based, in document order.
    fn diagram_rendering(&self, number: usize) {
        let _ = number;
    }

    /// The diagram pass finished after replacing `count` blocks.
    fn diagrams_processed(&self, count: usize) {
        let _ = count;
    }

    /// A recoverable problem, such as a missing inlined image.
    fn warning(&self, message: &str) {
        let _ = message;
    }

    /// A page was written to `path`.
    fn page_written(&self, path: &Path, bytes: usize) {
        let _ = (path, bytes);
    }
}

/// Reporter that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl BuildReporter for SilentReporter {}
