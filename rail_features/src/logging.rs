//! Per-run logging handles.
//!
//! The crate logs through the `log` facade. Instead of each stage grabbing a
//! named global logger, a pipeline run constructs one [`RunLog`] and hands a
//! [`StageLog`] to every stage, so all records of a run carry the same label.

use std::fmt::Display;

const TARGET: &str = "rail_features";

/// Logging handle for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunLog {
    run: String,
}

impl RunLog {
    pub fn new(run: impl Into<String>) -> Self {
        Self { run: run.into() }
    }

    pub fn run(&self) -> &str {
        &self.run
    }

    /// Returns a handle that tags records with the given stage name.
    pub fn stage(&self, stage: &'static str) -> StageLog<'_> {
        StageLog {
            run: &self.run,
            stage,
        }
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new("run")
    }
}

/// Logging handle scoped to one stage of a run.
#[derive(Debug, Clone, Copy)]
pub struct StageLog<'a> {
    run: &'a str,
    stage: &'static str,
}

impl StageLog<'_> {
    pub fn stage(&self) -> &'static str {
        self.stage
    }

    pub fn info(&self, message: impl Display) {
        log::info!(target: TARGET, "[{}] {}: {}", self.run, self.stage, message);
    }

    pub fn warn(&self, message: impl Display) {
        log::warn!(target: TARGET, "[{}] {}: {}", self.run, self.stage, message);
    }

    pub fn debug(&self, message: impl Display) {
        log::debug!(target: TARGET, "[{}] {}: {}", self.run, self.stage, message);
    }
}
