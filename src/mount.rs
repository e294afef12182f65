//! Diagram mount controller: the post-commit pass that resolves diagram
//! placeholders.
//!
//! After a slide's blocks are committed, the pass scans the surface for
//! pending [`DiagramSlot`](crate::types::DiagramSlot)s, allocates each a
//! fresh process-wide id, renders
//! its description through the [`DiagramEngine`], and patches the slot in
//! place. Failures are contained per placeholder; a slot whose surface was
//! dropped or re-committed while its render was in flight is skipped
//! silently.

use std::sync::Weak;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::engine::{DiagramEngine, DiagramError};
use crate::types::{DiagramId, DiagramState, MarkupFragment, SlideBlock, SlideSurface};

/// Process-wide diagram id counter.
///
/// Monotonic and never reused, even across slides, so concurrent renders
/// can never collide in downstream bookkeeping.
static NEXT_DIAGRAM_ID: AtomicU64 = AtomicU64::new(0);

fn allocate_diagram_id() -> DiagramId {
    DiagramId(NEXT_DIAGRAM_ID.fetch_add(1, Ordering::Relaxed))
}

/// One render request produced by the scan step.
#[derive(Debug, Clone)]
struct DiagramJob {
    /// Freshly allocated placeholder id.
    id: DiagramId,
    /// Index of the placeholder block within the committed surface.
    block_index: usize,
    /// The raw diagram description.
    description: String,
}

/// Terminal status of one job, as recorded in the pass report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// The slot now holds rendered markup.
    Succeeded,
    /// The slot is marked failed with this message.
    Failed(String),
    /// The patch found no live pending slot to write to.
    Stale,
}

/// What happened when a single patch was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PatchOutcome {
    /// The slot was pending and now holds this job's result.
    Applied,
    /// The slot was already resolved by an earlier pass.
    AlreadyResolved,
    /// The surface is gone or the block is no longer a diagram slot.
    Stale,
}

/// Observability summary of one mount pass.
///
/// Shells may surface it; nothing reads it for control flow.
#[derive(Debug, Default)]
pub struct MountReport {
    /// Allocated id and terminal status per job, in document order.
    pub jobs: Vec<(DiagramId, JobStatus)>,
}

impl MountReport {
    /// Whether the pass found nothing to do.
    pub fn is_noop(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Number of jobs whose slot now holds rendered markup.
    pub fn succeeded(&self) -> usize {
        self.jobs
            .iter()
            .filter(|(_, s)| *s == JobStatus::Succeeded)
            .count()
    }

    /// Number of jobs whose slot is marked failed.
    pub fn failed(&self) -> usize {
        self.jobs
            .iter()
            .filter(|(_, s)| matches!(s, JobStatus::Failed(_)))
            .count()
    }
}

/// Runs mount passes against committed surfaces.
pub struct DiagramMountController;

impl DiagramMountController {
    /// Scans the surface for pending diagram slots and resolves each one.
    ///
    /// Holds only a `Weak` reference while renders are in flight: if the
    /// slide unmounts or re-commits mid-pass, the remaining patches become
    /// silent no-ops. Re-running the pass on an unchanged surface is a
    /// no-op — the scan only picks up pending slots, so nothing is
    /// re-rendered and no ids are allocated.
    pub async fn mount_pass(surface: Weak<Mutex<SlideSurface>>) -> MountReport {
        let jobs = {
            let Some(strong) = surface.upgrade() else {
                log::debug!("mount pass skipped: surface dropped before scan");
                return MountReport::default();
            };
            let guard = strong.lock();
            guard
                .pending_diagrams()
                .into_iter()
                .map(|(block_index, description)| DiagramJob {
                    id: allocate_diagram_id(),
                    block_index,
                    description,
                })
                .collect::<Vec<_>>()
        };
        if jobs.is_empty() {
            return MountReport::default();
        }
        log::debug!("mount pass: {} pending diagram(s)", jobs.len());

        let mut report = MountReport::default();
        for job in jobs {
            let DiagramJob {
                id,
                block_index,
                description,
            } = job;

            // Layout computation can take a while; keep it off the async
            // executor. A panic that escapes the engine's containment
            // surfaces as a join error and fails only this job.
            let result =
                match tokio::task::spawn_blocking(move || DiagramEngine::render(id, &description))
                    .await
                {
                    Ok(render_result) => render_result,
                    Err(join_error) => {
                        log::warn!("{id}: render task aborted: {join_error}");
                        Err(DiagramError::RendererPanic)
                    }
                };

            let failure = result.as_ref().err().map(ToString::to_string);
            let status = match Self::patch_slot(&surface, block_index, id, result) {
                PatchOutcome::Applied => match failure {
                    None => JobStatus::Succeeded,
                    Some(message) => JobStatus::Failed(message),
                },
                PatchOutcome::AlreadyResolved | PatchOutcome::Stale => JobStatus::Stale,
            };
            report.jobs.push((id, status));
        }
        report
    }

    /// Writes one job's result into its slot, if the slot is still live and
    /// pending.
    ///
    /// Block indices are stable for the lifetime of a committed surface, so
    /// the re-check only guards against a slot another pass already
    /// resolved. Applied patches bump the surface revision.
    pub(crate) fn patch_slot(
        surface: &Weak<Mutex<SlideSurface>>,
        block_index: usize,
        id: DiagramId,
        result: Result<MarkupFragment, DiagramError>,
    ) -> PatchOutcome {
        let Some(strong) = surface.upgrade() else {
            log::debug!("{id}: patch dropped, surface no longer mounted");
            return PatchOutcome::Stale;
        };
        let mut guard = strong.lock();
        let Some(SlideBlock::Diagram(slot)) = guard.blocks.get_mut(block_index) else {
            log::debug!("{id}: patch dropped, block {block_index} is not a diagram slot");
            return PatchOutcome::Stale;
        };
        if !slot.is_pending() {
            log::debug!("{id}: patch dropped, slot already resolved");
            return PatchOutcome::AlreadyResolved;
        }

        slot.state = match result {
            Ok(fragment) => DiagramState::Rendered(fragment),
            Err(e) => {
                log::warn!("{id}: diagram render failed: {e}");
                DiagramState::Failed {
                    id,
                    message: e.to_string(),
                }
            }
        };
        guard.revision += 1;
        PatchOutcome::Applied
    }
}
