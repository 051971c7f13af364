pub mod coordinator;
pub mod report;

pub use coordinator::{Coordinator, CoordinatorError};
pub use report::{RunStats, WorkerReport};

/// When a mining run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoppingPolicy {
    /// Every worker seals exactly `rounds` blocks, retrying each until it lands.
    FixedRounds { rounds: usize },
    /// Workers race until `target` blocks have been appended in total.
    SharedQuota { target: usize },
}

impl StoppingPolicy {
    /// Number of blocks a completed run appends with `workers` miners.
    pub fn expected_appends(&self, workers: usize) -> usize {
        match *self {
            StoppingPolicy::FixedRounds { rounds } => rounds * workers,
            StoppingPolicy::SharedQuota { target } => target,
        }
    }
}
