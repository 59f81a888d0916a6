pub mod context;
mod decorate;
pub mod error;
pub mod filter;
pub mod observer;
pub mod orchestrator;
pub mod report;
pub mod suite;

pub use context::ExecutionContext;
pub use error::{Error, Result, WorksAlreadyError};
pub use filter::NameFilter;
pub use observer::{RunObserver, TracingObserver};
pub use orchestrator::MultiBrowserRunner;
pub use report::{Outcome, RunReport, TestResult};
pub use suite::{TestCase, TestId, TestMeta, TestSuite};
