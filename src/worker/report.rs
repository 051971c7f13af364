use serde::Serialize;

/// What a single miner did during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub worker: usize,
    pub appended: usize,
    pub stale_retries: usize,
}

impl WorkerReport {
    pub fn new(worker: usize) -> Self {
        Self {
            worker,
            ..Self::default()
        }
    }
}

/// Totals for a whole run, aggregated after every worker has been joined.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub workers: usize,
    pub appended: usize,
    pub stale_retries: usize,
    pub elapsed_ms: u128,
    pub per_worker: Vec<WorkerReport>,
}

impl RunStats {
    pub fn from_reports(mut per_worker: Vec<WorkerReport>, elapsed_ms: u128) -> Self {
        per_worker.sort_by_key(|r| r.worker);
        Self {
            workers: per_worker.len(),
            appended: per_worker.iter().map(|r| r.appended).sum(),
            stale_retries: per_worker.iter().map(|r| r.stale_retries).sum(),
            elapsed_ms,
            per_worker,
        }
    }
}
