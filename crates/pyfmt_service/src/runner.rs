//! The bounded worker pool that fans formatting out across files. Workers
//! own their inputs and outputs; the only shared state is the read-only
//! style configuration.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::sync::Arc;

use threadpool::ThreadPool;

use crate::pipeline::{format_file, FileReport, FormatOptions};

/// Returns the number of worker threads for this system. `PYFMT_CONCURRENCY`
/// overrides the computed count for environments that misreport their
/// resources (containers with cpu quotas, mostly).
///
/// The reflow search is pure CPU work with no suspension points, so two
/// workers sharing a hyperthreaded core mostly fight over the same
/// execution units; one worker per physical core is the ceiling worth
/// paying for. One core is left free so the shell, editor, or build that
/// invoked the formatter stays responsive during a whole-tree run.
pub(crate) fn reasonable_thread_count() -> usize {
    if let Ok(concurrency) = std::env::var("PYFMT_CONCURRENCY") {
        if let Ok(requested) = concurrency.parse::<usize>() {
            return requested.max(1);
        }
    }
    let physical = num_cpus::get_physical();
    physical.saturating_sub(1).max(1)
}

/// Format every file in `paths` on a bounded worker pool and return the
/// reports in the order the paths were given. Cancellation is cooperative
/// and honored between files.
pub fn format_files(
    paths: Vec<PathBuf>,
    options: &FormatOptions,
    cancel: Option<Arc<AtomicBool>>,
) -> Vec<FileReport> {
    let total = paths.len();
    let workers = reasonable_thread_count();
    log::debug!("formatting {total} files on {workers} workers");

    let pool = ThreadPool::new(workers);
    let (tx, rx) = channel();
    let mut dispatched = 0usize;
    for (index, path) in paths.into_iter().enumerate() {
        if cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            break;
        }
        let tx = tx.clone();
        let options = options.clone();
        dispatched += 1;
        pool.execute(move || {
            let report = format_file(&path, &options);
            tx.send((index, report))
                .expect("failed to send file report back to the runner");
        });
    }
    drop(tx);

    let mut slots: Vec<Option<FileReport>> = (0..total).map(|_| None).collect();
    for (index, report) in rx.iter().take(dispatched) {
        slots[index] = Some(report);
    }
    slots.into_iter().flatten().collect()
}
