use super::snapshot::{tool_answers_key, ProgressPatch, ProgressSnapshot, ToolAnswers};
use crate::steps::STEP_COUNT;

/// In-memory cache of the user's progress. Never persisted; a restart
/// fetches it again.
#[derive(Debug, Clone, Default)]
pub struct ProgressState {
    snapshot: ProgressSnapshot,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &ProgressSnapshot {
        &self.snapshot
    }

    /// Lay `patch` over the cached state.
    ///
    /// This is a shallow merge: any field the patch leaves out keeps its
    /// previous value. Pass a full snapshot to avoid stale leftovers.
    pub fn replace_all(&mut self, patch: impl Into<ProgressPatch>) {
        let patch = patch.into();
        let s = &mut self.snapshot;
        if let Some(v) = patch.current_step {
            s.current_step = v;
        }
        if let Some(v) = patch.completed_steps {
            s.completed_steps = v;
        }
        if let Some(v) = patch.total_points {
            s.total_points = v;
        }
        if let Some(v) = patch.clean_streak_start {
            s.clean_streak_start = v;
        }
        if let Some(v) = patch.badges {
            s.badges = v;
        }
        if let Some(v) = patch.tool_answers {
            s.tool_answers = v;
        }
    }

    /// Record `step` as done and unlock the one after it.
    ///
    /// Local only: points and badges are left to the next server read.
    pub fn mark_step_complete(&mut self, step: u32) {
        self.snapshot.completed_steps.insert(step);
        self.snapshot.current_step = self.snapshot.current_step.max(step.saturating_add(1));
    }

    pub fn reset_all(&mut self) {
        self.snapshot = ProgressSnapshot::default();
    }

    pub fn is_step_complete(&self, step: u32) -> bool {
        self.snapshot.completed_steps.contains(&step)
    }

    pub fn answers_for(&self, step: u32) -> Option<&ToolAnswers> {
        self.snapshot.tool_answers.get(&tool_answers_key(step))
    }

    pub fn completed_count(&self) -> usize {
        self.snapshot.completed_steps.len()
    }

    /// Fraction of the program done, in `0.0..=1.0` for sane data.
    pub fn completion_ratio(&self) -> f64 {
        self.completed_count() as f64 / f64::from(STEP_COUNT)
    }
}
