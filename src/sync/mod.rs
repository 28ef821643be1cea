//! Feed-sync engine.

pub mod orchestrator;
pub mod reconciler;
pub mod scheduler;

pub use orchestrator::{
    Actor, ItemOutcome, ItemReport, SourceOutcome, SourceReport, SyncEngine, SyncReport,
    PERMISSION_DENIED_MESSAGE,
};
pub use reconciler::{ReconcileAction, Reconciler};
pub use scheduler::SyncScheduler;
