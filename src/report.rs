use serde::Serialize;
use std::fmt::Write;

use crate::blockchain::{Block, Blockchain};
use crate::worker::RunStats;

/// Literal printed when the chain's links all hold.
pub const VALIDATED: &str = "Validated";
/// Literal printed on the first broken link.
pub const INVALID: &str = "Invalid";

/// Everything printed at the end of a run.
#[derive(Debug, Serialize)]
pub struct ChainReport {
    pub length: usize,
    pub difficulty: u32,
    pub chain: Vec<Block>,
    pub validated: bool,
    pub proof_of_work: bool,
    pub run: RunStats,
}

impl ChainReport {
    /// Snapshot and validate `chain`. Call only after every miner is joined.
    pub fn collect(chain: &Blockchain, run: RunStats) -> Self {
        let blocks = chain.snapshot();
        Self {
            length: blocks.len(),
            difficulty: chain.difficulty(),
            chain: blocks,
            validated: chain.validate_all(),
            proof_of_work: chain.verify_work(),
            run,
        }
    }

    pub fn verdict(&self) -> &'static str {
        if self.validated { VALIDATED } else { INVALID }
    }

    /// Every block in order, each followed by a blank line, then the verdict.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for block in &self.chain {
            // writing into a String cannot fail
            let _ = writeln!(out, "{block}");
        }
        out.push_str(self.verdict());
        out.push('\n');
        out
    }

    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
