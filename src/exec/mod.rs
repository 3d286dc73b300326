pub mod executor;

pub use executor::{ExecutionReport, ExecutorConfig, TreeExecutor};
