//! Dual-backend comparison orchestrator.
//!
//! Runs one query against the warehouse and normalized backends at the same
//! time, exposes each backend's progress as it resolves, and reconciles both
//! outcomes into a single [`ComparisonResult`] with derived timing metrics.
//!
//! ```ignore
//! let orchestrator = Orchestrator::new(service);
//! let run = orchestrator.run_comparison("SELECT COUNT(*) FROM flights");
//! let mut updates = run.subscribe();
//! // ... render updates.borrow() while the run is in progress ...
//! let result = run.finish().await.into_result()?;
//! println!("speedup: {}", result.comparison.speedup);
//! ```

mod error;
mod metrics;
pub mod notify;
mod orchestrator;
mod outcome;
mod state;

pub use error::ComparisonError;
pub use metrics::ComparisonMetrics;
pub use notify::{MemorySink, Notification, NotificationSink, NullSink, Severity};
pub use orchestrator::{ComparisonRun, Orchestrator};
pub use outcome::ExecutionOutcome;
pub use state::{ComparisonResult, ComparisonState, RunStatus};
