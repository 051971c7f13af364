use log::{debug, error, info, warn};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, ScopedJoinHandle};
use std::time::Instant;
use thiserror::Error;

use super::{RunStats, StoppingPolicy, WorkerReport};
use crate::blockchain::{AppendOutcome, Blockchain, mine, mine_until};

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("at least one worker is required")]
    NoWorkers,
    #[error("failed to spawn miner thread: {0}")]
    Spawn(#[from] io::Error),
    #[error("miner {0} panicked")]
    WorkerPanicked(usize),
}

/// Fans miners out over a shared chain and joins them all before returning.
pub struct Coordinator<'a> {
    chain: &'a Blockchain,
    workers: usize,
    policy: StoppingPolicy,
}

impl<'a> Coordinator<'a> {
    pub fn new(chain: &'a Blockchain, workers: usize, policy: StoppingPolicy) -> Self {
        Self {
            chain,
            workers,
            policy,
        }
    }

    /// Run the miners to completion. Every spawned thread has been joined by the
    /// time this returns, so the chain is quiescent and safe to validate.
    pub fn run(&self) -> Result<RunStats, CoordinatorError> {
        if self.workers == 0 {
            return Err(CoordinatorError::NoWorkers);
        }

        let t0 = Instant::now();
        info!(
            "COORD - starting {} workers ({:?}, difficulty={}, height={})",
            self.workers,
            self.policy,
            self.chain.difficulty(),
            self.chain.len()
        );

        let reports = match self.policy {
            StoppingPolicy::FixedRounds { rounds } => self.run_rounds(rounds)?,
            StoppingPolicy::SharedQuota { target } => self.run_quota(target)?,
        };

        let stats = RunStats::from_reports(reports, t0.elapsed().as_millis());
        info!(
            "COORD - finished: appended={} stale_retries={} height={} ({} ms)",
            stats.appended,
            stats.stale_retries,
            self.chain.len(),
            stats.elapsed_ms
        );
        Ok(stats)
    }

    fn run_rounds(&self, rounds: usize) -> Result<Vec<WorkerReport>, CoordinatorError> {
        let chain = self.chain;
        thread::scope(|s| {
            let mut handles = Vec::with_capacity(self.workers);
            for id in 0..self.workers {
                let handle = thread::Builder::new()
                    .name(format!("miner-{id}"))
                    .spawn_scoped(s, move || mine_rounds(chain, id, rounds))?;
                handles.push((id, handle));
            }
            join_all(handles)
        })
    }

    fn run_quota(&self, target: usize) -> Result<Vec<WorkerReport>, CoordinatorError> {
        let chain = self.chain;
        let limit = chain.len() + target;
        let stop = AtomicBool::new(false);
        let (signals, appended) = mpsc::channel::<(usize, usize)>();

        thread::scope(|s| {
            let mut handles = Vec::with_capacity(self.workers);
            for id in 0..self.workers {
                let (stop, signals) = (&stop, signals.clone());
                let spawned = thread::Builder::new()
                    .name(format!("miner-{id}"))
                    .spawn_scoped(s, move || mine_quota(chain, id, limit, stop, signals));
                match spawned {
                    Ok(handle) => handles.push((id, handle)),
                    Err(e) => {
                        stop.store(true, Ordering::Relaxed);
                        return Err(e.into());
                    }
                }
            }
            drop(signals);

            let mut observed = 0;
            while observed < target {
                match appended.recv() {
                    Ok((worker, height)) => {
                        observed += 1;
                        info!(
                            "COORD - block #{} sealed by miner {} ({}/{})",
                            height, worker, observed, target
                        );
                    }
                    // every miner has exited
                    Err(_) => break,
                }
            }

            stop.store(true, Ordering::Relaxed);
            join_all(handles)
        })
    }
}

/// Join every handle, even after a panic, so no miner outlives the run.
fn join_all(
    handles: Vec<(usize, ScopedJoinHandle<'_, WorkerReport>)>,
) -> Result<Vec<WorkerReport>, CoordinatorError> {
    let mut reports = Vec::with_capacity(handles.len());
    let mut panicked = None;
    for (id, handle) in handles {
        match handle.join() {
            Ok(report) => reports.push(report),
            Err(_) => {
                error!("COORD - miner {} panicked", id);
                panicked.get_or_insert(id);
            }
        }
    }
    match panicked {
        Some(id) => Err(CoordinatorError::WorkerPanicked(id)),
        None => Ok(reports),
    }
}

fn mine_rounds(chain: &Blockchain, id: usize, rounds: usize) -> WorkerReport {
    let mut report = WorkerReport::new(id);
    for round in 0..rounds {
        let payload = format!("Block {round} by {id}");
        loop {
            let candidate = mine(chain.difficulty(), Some(chain.tail_hash()), &payload);
            let nonce = candidate.nonce();
            match chain.submit(candidate, None) {
                AppendOutcome::Appended { height } => {
                    report.appended += 1;
                    debug!("MINER {} - sealed block #{} (nonce={})", id, height, nonce);
                    break;
                }
                _ => {
                    report.stale_retries += 1;
                    warn!("MINER {} - retrying: {}", id, payload);
                }
            }
        }
    }
    report
}

fn mine_quota(
    chain: &Blockchain,
    id: usize,
    limit: usize,
    stop: &AtomicBool,
    signals: Sender<(usize, usize)>,
) -> WorkerReport {
    let mut report = WorkerReport::new(id);
    while !stop.load(Ordering::Relaxed) {
        let payload = format!("Block {} by {}", report.appended, id);
        let Some(candidate) = mine_until(
            chain.difficulty(),
            Some(chain.tail_hash()),
            &payload,
            stop,
        ) else {
            debug!("MINER {} - abandoned search for {}", id, payload);
            break;
        };

        match chain.submit(candidate, Some(limit)) {
            AppendOutcome::Appended { height } => {
                report.appended += 1;
                if signals.send((id, height)).is_err() {
                    break;
                }
            }
            AppendOutcome::Stale => {
                report.stale_retries += 1;
                warn!("MINER {} - retrying: {}", id, payload);
            }
            AppendOutcome::Sealed => break,
        }
    }
    report
}
