//! Concurrent dispatch of fetch units over a bounded worker pool.
//!
//! URLs already in the ledger snapshot are counted and skipped. The rest are
//! deduplicated by target file (two spellings never race on one `.part`),
//! queued, and pulled by `min(workers, n)` OS threads. Failures are counted,
//! never fatal to the batch.

use crate::fetcher::{FetchOutcome, Fetcher};
use crate::url_model::local_path;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

/// Default worker count.
pub const DEFAULT_WORKERS: usize = 10;

/// Progress snapshot sent after each completed unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchProgress {
    pub done: usize,
    pub total: usize,
    pub failed: usize,
}

impl DispatchProgress {
    /// Completed fraction in 0.0..=1.0. An empty batch counts as complete.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.done as f64 / self.total as f64
        }
    }
}

/// Counts for one dispatch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Distinct input URLs.
    pub found: usize,
    /// Input URLs whose normalized form was already in the ledger.
    pub already_downloaded: usize,
    /// Fetched over HTTP in this run.
    pub downloaded: usize,
    /// Local file existed; recorded without a request.
    pub on_disk: usize,
    pub failed: usize,
    /// `(normalized url, message)` for every failed unit, sorted by URL.
    pub failures: Vec<(String, String)>,
}

impl DispatchSummary {
    /// Units that ended up present locally in this run.
    pub fn succeeded(&self) -> usize {
        self.downloaded + self.on_disk
    }
}

/// Runs a [`Fetcher`] over many URLs.
pub struct Dispatcher {
    fetcher: Arc<Fetcher>,
    progress_tx: Option<tokio::sync::mpsc::Sender<DispatchProgress>>,
}

impl Dispatcher {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            progress_tx: None,
        }
    }

    /// Progress snapshots go to `tx` via `try_send`; a full channel drops snapshots.
    pub fn with_progress(mut self, tx: tokio::sync::mpsc::Sender<DispatchProgress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Fetches every URL not covered by `snapshot`. Blocks until all units finish.
    pub fn run<I, S>(&self, urls: I, snapshot: &HashSet<String>, workers: usize) -> DispatchSummary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = urls.into_iter().map(|u| u.as_ref().to_string()).collect();
        let mut summary = DispatchSummary {
            found: distinct.len(),
            ..DispatchSummary::default()
        };

        let normalizer = self.fetcher.normalizer();
        let assets_root = self.fetcher.assets_root();
        let mut seen_targets: HashSet<PathBuf> = HashSet::new();
        let mut seen_unmapped: HashSet<String> = HashSet::new();
        let mut units: VecDeque<String> = VecDeque::new();
        for url in distinct {
            let normalized = normalizer.for_fetch(&url);
            if snapshot.contains(&normalized) {
                summary.already_downloaded += 1;
                continue;
            }
            // One unit per target file, whatever the spelling.
            let fresh = match local_path(assets_root, &normalized) {
                Some(target) => seen_targets.insert(target),
                None => seen_unmapped.insert(normalized.clone()),
            };
            if fresh {
                units.push_back(normalized);
            }
        }

        let total = units.len();
        tracing::info!(
            found = summary.found,
            already = summary.already_downloaded,
            pending = total,
            "dispatching fetches"
        );
        if total == 0 {
            self.report(DispatchProgress {
                done: 0,
                total: 0,
                failed: 0,
            });
            return summary;
        }

        let work: Arc<Mutex<VecDeque<String>>> = Arc::new(Mutex::new(units));
        let done = Arc::new(AtomicUsize::new(0));
        let failed = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel::<(String, FetchOutcome)>();
        let num_workers = workers.max(1).min(total);
        let mut handles = Vec::with_capacity(num_workers);
        for _ in 0..num_workers {
            let work = Arc::clone(&work);
            let tx = tx.clone();
            let fetcher = Arc::clone(&self.fetcher);
            let done = Arc::clone(&done);
            let failed = Arc::clone(&failed);
            let progress_tx = self.progress_tx.clone();
            handles.push(std::thread::spawn(move || {
                // Already filtered against the ledger snapshot above.
                let empty = HashSet::new();
                loop {
                    let next = match work.lock() {
                        Ok(mut q) => q.pop_front(),
                        Err(poisoned) => poisoned.into_inner().pop_front(),
                    };
                    let Some(url) = next else { break };
                    let outcome = fetcher.fetch_outcome(&url, &empty);
                    let failed_now = if outcome.is_success() {
                        failed.load(Ordering::Relaxed)
                    } else {
                        failed.fetch_add(1, Ordering::Relaxed) + 1
                    };
                    let done_now = done.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(ptx) = &progress_tx {
                        let _ = ptx.try_send(DispatchProgress {
                            done: done_now,
                            total,
                            failed: failed_now,
                        });
                    }
                    let _ = tx.send((url, outcome));
                }
            }));
        }
        drop(tx);

        for (url, outcome) in rx {
            match outcome {
                FetchOutcome::AlreadyRecorded => summary.already_downloaded += 1,
                FetchOutcome::AlreadyOnDisk { .. } => summary.on_disk += 1,
                FetchOutcome::Downloaded { .. } => summary.downloaded += 1,
                FetchOutcome::Failed(e) => {
                    summary.failed += 1;
                    summary.failures.push((url, e.to_string()));
                }
            }
        }
        for h in handles {
            if h.join().is_err() {
                tracing::error!("fetch worker panicked");
            }
        }
        summary.failures.sort();
        tracing::info!(
            downloaded = summary.downloaded,
            on_disk = summary.on_disk,
            failed = summary.failed,
            "dispatch finished"
        );
        summary
    }

    fn report(&self, progress: DispatchProgress) {
        if let Some(tx) = &self.progress_tx {
            let _ = tx.try_send(progress);
        }
    }
}
