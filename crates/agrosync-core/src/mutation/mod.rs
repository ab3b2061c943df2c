// ── Mutation & optimistic-update coordination ──

mod optimistic;
mod responsibles;
mod thresholds;

pub use optimistic::OptimisticState;
pub use responsibles::ResponsiblesEditor;
pub use thresholds::{ThresholdEditor, ThresholdPhase};
