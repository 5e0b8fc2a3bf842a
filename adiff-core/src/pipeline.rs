//! The full diff run, pass by pass.

use crate::{
    finalize, propagate, reconstruct, AugmentResult, AugmentedDiff, Augmenter, Batch, Diagnostics,
};
use adiff_store::Snapshot;
use adiff_types::ChangeRecord;
use std::time::Instant;
use tracing::info;

/// Builds an augmented diff for a change list against a store snapshot.
///
/// Records may repeat elements and come in any order. Per-entity problems
/// end up in [`AugmentedDiff::diagnostics`]; only store failures abort.
pub fn augment_changes<S: Snapshot>(
    records: Vec<ChangeRecord>,
    store: &S,
) -> AugmentResult<AugmentedDiff> {
    let mut diagnostics = Diagnostics::new();

    let started = Instant::now();
    let batch = Batch::deduplicate(records, &mut diagnostics);
    info!("Deduplicate: {} actions in {:.3?}", batch.len(), started.elapsed());

    let started = Instant::now();
    let mut actions = reconstruct(&batch, store, &mut diagnostics)?;
    info!("Reconstruct: {:.3?}", started.elapsed());

    let started = Instant::now();
    let augmenter = Augmenter::new(store, &batch);
    for action in &mut actions {
        augmenter.augment_action(action, &mut diagnostics)?;
    }
    info!("Augment: {:.3?}", started.elapsed());

    let started = Instant::now();
    let propagated = propagate(&actions, &augmenter, &mut diagnostics)?;
    info!("Propagate: {} actions in {:.3?}", propagated.len(), started.elapsed());
    actions.extend(propagated);

    let started = Instant::now();
    let actions = finalize(actions);
    info!("Finalize: {:.3?}", started.elapsed());

    Ok(AugmentedDiff {
        actions,
        diagnostics: diagnostics.into_vec(),
    })
}
