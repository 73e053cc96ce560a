use crate::{
    codec::Codec,
    model::{ClosureId, ClosureRecord, ClosureStore, EncodedReference, Format, RegenerationReport},
};
use kdam::{Bar, BarExt};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

/// controls a batch regeneration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegenerationOptions {
    /// re-encode closures that already carry a reference
    pub force: bool,
    /// closures encoded and committed together
    pub chunk_size: usize,
    pub show_progress: bool,
}

impl RegenerationOptions {
    pub fn new(force: bool, chunk_size: usize) -> RegenerationOptions {
        RegenerationOptions {
            force,
            chunk_size,
            show_progress: false,
        }
    }
}

/// the closures a run will process: all of them when forced, otherwise
/// those without a reference.
pub fn select_targets(closures: &[ClosureRecord], force: bool) -> Vec<&ClosureRecord> {
    closures
        .iter()
        .filter(|c| force || !c.has_reference())
        .collect()
}

/// encodes the targets chunk by chunk, committing each chunk to the store
/// before moving on.
///
/// a chunk's successes are tallied only after its commit succeeds. a failed
/// commit moves that chunk's encoded closures to `failed`, sets `error` and
/// ends the run. the cancel flag is checked before each chunk.
pub fn run<S: ClosureStore + ?Sized>(
    codec: &Codec,
    format: Format,
    targets: &[&ClosureRecord],
    options: &RegenerationOptions,
    store: &mut S,
    cancel: &AtomicBool,
) -> RegenerationReport {
    let mut report = RegenerationReport::default();
    let chunk_size = options.chunk_size.max(1);
    let mut bar = if options.show_progress {
        Bar::builder()
            .desc("regenerate OpenLR references")
            .total(targets.len())
            .build()
            .map_err(|e| log::warn!("progress bar unavailable: {e}"))
            .ok()
    } else {
        None
    };

    for chunk in targets.chunks(chunk_size) {
        if cancel.load(Ordering::Relaxed) {
            log::warn!(
                "OpenLR regeneration cancelled after {} of {} closures",
                report.total_processed,
                targets.len()
            );
            report.error = Some(format!(
                "regeneration cancelled after {} of {} closures",
                report.total_processed,
                targets.len()
            ));
            break;
        }

        let results: Vec<(ClosureId, Result<EncodedReference, String>)> = chunk
            .par_iter()
            .map(|closure| (closure.id, encode_closure(codec, format, closure)))
            .collect();
        report.total_processed += chunk.len();

        let mut updates = Vec::with_capacity(results.len());
        for (id, result) in results {
            match result {
                Ok(reference) => updates.push((id, reference)),
                Err(message) => {
                    log::warn!("{message}");
                    report.record_failure(message);
                }
            }
        }

        if !updates.is_empty() {
            if let Err(e) = store.commit(&updates) {
                log::error!("failed to commit {} OpenLR references: {e}", updates.len());
                for (id, _) in updates.iter() {
                    report.record_failure(format!("Closure {id}: {e}"));
                }
                report.error = Some(format!("regeneration stopped: {e}"));
                break;
            }
            report.successful += updates.len();
        }

        if let Some(bar) = bar.as_mut() {
            let _ = bar.update(chunk.len());
        }
    }

    if bar.is_some() {
        eprintln!();
    }
    report
}

fn encode_closure(
    codec: &Codec,
    format: Format,
    closure: &ClosureRecord,
) -> Result<EncodedReference, String> {
    let geometry = closure
        .geometry
        .as_ref()
        .ok_or_else(|| format!("Closure {}: no geometry", closure.id))?;
    codec
        .encode(geometry, format)
        .map_err(|e| format!("Closure {}: {e}", closure.id))
}
