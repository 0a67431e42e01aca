pub mod narrative;
pub mod progress;

pub use narrative::NarrativeService;
pub use progress::{noop_progress, tracing_progress, ProgressReporter};
