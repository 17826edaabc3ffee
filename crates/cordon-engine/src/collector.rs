//! Output collection: folding per-patch entries into the global result.
//!
//! Two drain strategies produce identical output:
//!
//! - **Lockstep** (default): every worker gets its own small bounded queue
//!   and the collector takes exactly one entry per worker per tick.  A slow
//!   collector eventually blocks fast workers, bounding buffered memory to
//!   O(number of patches); traces merge by id-ordered sort-merge, since
//!   each worker's trace is already sorted.
//! - **SharedQueue**: all workers feed one unbounded queue and the
//!   collector buckets entries by tick, finishing a tick's trace once all
//!   patches have reported it.  Workers never stall on output, at the cost
//!   of unbounded buffering when the collector falls behind.

use std::collections::BTreeMap;

use cordon_core::{PersonId, PersonInfo, Scenario, Statistics, TraceEntry};
use crossbeam_channel::Receiver;

use crate::patch::OutputEntry;
use crate::{EngineError, EngineResult};

/// Capacity of each per-worker output queue in lockstep mode.
pub(crate) const OUTPUT_QUEUE_DEPTH: usize = 4;

/// How the collector drains worker output.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum CollectorMode {
    /// Per-worker bounded queues drained one entry per worker per tick.
    #[default]
    Lockstep,
    /// One shared unbounded queue, entries bucketed by tick.
    SharedQueue,
}

/// The merged result of a run, before being joined with the scenario.
pub(crate) struct Collected {
    pub trace: Vec<TraceEntry>,
    pub statistics: BTreeMap<String, Vec<Statistics>>,
}

// ── Lockstep drain ────────────────────────────────────────────────────────────

pub(crate) fn drain_lockstep(
    receivers: &[Receiver<OutputEntry>],
    scenario: &Scenario,
) -> EngineResult<Collected> {
    let mut statistics = zero_statistics(scenario);
    let mut trace = Vec::new();

    for tick in 0..=scenario.ticks {
        let mut merged: Vec<(PersonId, PersonInfo)> = Vec::new();
        for receiver in receivers {
            let mut entry = receiver.recv().map_err(|_| EngineError::OutputClosed)?;
            assert_eq!(entry.tick, tick, "patch {} emitted out of order", entry.patch);
            merge_statistics(&mut statistics, &entry);
            if let Some(patch_trace) = entry.trace.take() {
                merged = merge_traces(merged, patch_trace);
            }
        }
        if scenario.trace {
            trace.push(strip_ids(merged));
        }
    }

    Ok(Collected { trace, statistics })
}

// ── Shared-queue drain ────────────────────────────────────────────────────────

pub(crate) fn drain_shared(
    receiver: &Receiver<OutputEntry>,
    patch_count: usize,
    scenario: &Scenario,
) -> EngineResult<Collected> {
    let entries_per_tick = scenario.ticks + 1;
    let mut statistics = zero_statistics(scenario);
    let mut reported = vec![0usize; entries_per_tick];
    let mut buckets: Vec<Vec<(PersonId, PersonInfo)>> = vec![Vec::new(); entries_per_tick];
    let mut trace: Vec<TraceEntry> = vec![TraceEntry::default(); entries_per_tick];

    for _ in 0..entries_per_tick * patch_count {
        let mut entry = receiver.recv().map_err(|_| EngineError::OutputClosed)?;
        reported[entry.tick] += 1;
        merge_statistics(&mut statistics, &entry);

        if let Some(patch_trace) = entry.trace.take() {
            buckets[entry.tick].extend(patch_trace);
            // Tick complete: order the bucket globally, exactly once.
            if reported[entry.tick] == patch_count {
                let mut bucket = std::mem::take(&mut buckets[entry.tick]);
                bucket.sort_by_key(|&(id, _)| id);
                trace[entry.tick] = strip_ids(bucket);
            }
        }
    }

    if !scenario.trace {
        trace.clear();
    }
    Ok(Collected { trace, statistics })
}

// ── Merging helpers ───────────────────────────────────────────────────────────

/// Zeroed per-tick counts for every query in the scenario.
fn zero_statistics(scenario: &Scenario) -> BTreeMap<String, Vec<Statistics>> {
    scenario
        .queries
        .keys()
        .map(|key| (key.clone(), vec![Statistics::default(); scenario.ticks + 1]))
        .collect()
}

/// Add a patch's counts for its tick into the totals.
fn merge_statistics(totals: &mut BTreeMap<String, Vec<Statistics>>, entry: &OutputEntry) {
    for (key, counts) in &entry.statistics {
        let per_tick = totals
            .get_mut(key)
            .expect("patch reported a query key the scenario does not define");
        per_tick[entry.tick].add(counts);
    }
}

/// Merge two id-ascending trace lists into one.
fn merge_traces(
    a: Vec<(PersonId, PersonInfo)>,
    b: Vec<(PersonId, PersonInfo)>,
) -> Vec<(PersonId, PersonInfo)> {
    let mut merged = Vec::with_capacity(a.len() + b.len());
    let mut left = a.into_iter();
    let mut right = b.into_iter();
    let mut next_left = left.next();
    let mut next_right = right.next();

    loop {
        match (next_left.take(), next_right.take()) {
            (Some(x), Some(y)) => {
                assert!(x.0 != y.0, "person {} traced by two patches", x.0);
                if x.0 < y.0 {
                    merged.push(x);
                    next_left = left.next();
                    next_right = Some(y);
                } else {
                    merged.push(y);
                    next_left = Some(x);
                    next_right = right.next();
                }
            }
            (Some(x), None) => {
                merged.push(x);
                merged.extend(left);
                break;
            }
            (None, Some(y)) => {
                merged.push(y);
                merged.extend(right);
                break;
            }
            (None, None) => break,
        }
    }
    merged
}

fn strip_ids(entries: Vec<(PersonId, PersonInfo)>) -> TraceEntry {
    TraceEntry::new(entries.into_iter().map(|(_, info)| info).collect())
}
