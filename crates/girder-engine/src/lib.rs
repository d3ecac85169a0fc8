//! The girder proof engine.
//!
//! Walks a parsed proof document and produces the flat, step-indexed
//! sequence of named properties the emitters render: scope resolution,
//! provable trees with their structural rewrites, proof command and
//! helper evaluation, and graph-induction obligation synthesis.

pub mod commands;
pub mod errors;
pub mod graph;
pub mod helpers;
pub mod pipeline;
pub mod provable;
pub mod scope;

pub use errors::GenError;
pub use pipeline::build;
pub use provable::{FlatProofSequence, Property, Provable, StepOp};
pub use scope::{Scope, Wiring};
