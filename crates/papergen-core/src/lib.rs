//! papergen-core — Blueprint validation and the exam paper generation engine.
//!
//! This crate defines the data model, the collaborator traits the engine
//! consumes, and the selection logic that turns a question bank and a
//! blueprint into a two-part exam paper.

pub mod blueprint;
pub mod engine;
pub mod error;
pub mod lock;
pub mod model;
pub mod paper;
pub mod selection;
pub mod traits;
