//! Reconciliation engine for chatlite
//!
//! This crate owns the message store and session registry, turns user
//! intents into optimistic local changes plus remote calls, and publishes
//! a read-only view after every change.

pub mod engine;
pub mod ids;
pub mod state;

pub use engine::{ChatEngine, PendingSend, SendOutcome};
pub use ids::IdGenerator;
pub use state::{EngineView, RenameDraft};
