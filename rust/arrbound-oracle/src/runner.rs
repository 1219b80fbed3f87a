//! Parallel case runner.
//!
//! Cases enter a global [`Injector`] queue. A scoped pool of worker threads
//! steals from it until it is empty, sending each result back over a channel
//! tagged with the case's position, so the report keeps matrix order
//! regardless of completion order.
//!
//! Every case runs under [`catch_panic`]: a case that panics fails on its
//! own and the worker moves on.

use crate::adapter::ArrayConstructor;
use crate::case::{check_case, CaseId, CaseResult, OracleSettings};
use crate::panic_boundary::catch_panic;
use crate::report::RunReport;

use chrono::Utc;
use crossbeam_channel::unbounded;
use crossbeam_deque::{Injector, Steal};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct Runner {
    constructor: Arc<dyn ArrayConstructor>,
    settings: OracleSettings,
    workers: usize,
}

impl Runner {
    /// A runner with one worker per CPU.
    pub fn new(constructor: Arc<dyn ArrayConstructor>, settings: OracleSettings) -> Self {
        Self {
            constructor,
            settings,
            workers: num_cpus::get().max(1),
        }
    }

    /// Use `workers` threads. Passing `0` keeps one per CPU.
    pub fn with_workers(mut self, workers: usize) -> Self {
        if workers > 0 {
            self.workers = workers;
        }
        self
    }

    pub fn worker_count(&self) -> usize {
        self.workers
    }

    pub fn settings(&self) -> &OracleSettings {
        &self.settings
    }

    /// Evaluate one case under the panic boundary.
    pub fn run_case(&self, case: CaseId) -> CaseResult {
        let constructor = self.constructor.as_ref();
        let settings = &self.settings;
        match catch_panic(AssertUnwindSafe(|| check_case(constructor, &case, settings))) {
            Ok(result) => result,
            Err(panic) => {
                warn!(%case, message = panic.message(), "case panicked");
                CaseResult::panicked(case, panic.message())
            }
        }
    }

    pub fn run(&self, cases: Vec<CaseId>) -> RunReport {
        let started_at = Utc::now();
        let clock = Instant::now();
        let total = cases.len();
        let workers = self.workers.min(total).max(1);
        info!(
            cases = total,
            workers,
            constructor = self.constructor.name(),
            widening = %self.settings.widening,
            "starting run"
        );

        let queue = Injector::new();
        for (index, case) in cases.into_iter().enumerate() {
            queue.push((index, case));
        }

        let (tx, rx) = unbounded::<(usize, CaseResult)>();
        thread::scope(|scope| {
            for worker in 0..workers {
                let tx = tx.clone();
                let queue = &queue;
                scope.spawn(move || {
                    let mut done = 0usize;
                    loop {
                        match queue.steal() {
                            Steal::Success((index, case)) => {
                                let result = self.run_case(case);
                                if !result.passed() {
                                    warn!(worker, "{}", result);
                                }
                                done += 1;
                                if tx.send((index, result)).is_err() {
                                    break;
                                }
                            }
                            Steal::Retry => continue,
                            Steal::Empty => break,
                        }
                    }
                    debug!(worker, cases = done, "worker finished");
                });
            }
        });
        drop(tx);

        let mut results: Vec<(usize, CaseResult)> = rx.iter().collect();
        results.sort_by_key(|(index, _)| *index);
        let report = RunReport::new(
            started_at,
            clock.elapsed(),
            results.into_iter().map(|(_, result)| result).collect(),
        );
        info!(
            total = report.total,
            passed = report.passed,
            failed = report.failed,
            elapsed_ms = report.elapsed_ms,
            "run complete"
        );
        report
    }
}
