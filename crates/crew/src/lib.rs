//! Research crew orchestration.
//!
//! This crate provides the [`PipelineExecutor`] that drives a validated
//! [`pipeline::Pipeline`] step by step, and the built-in research crew
//! definition ([`research_crew`]).
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The executor sequences calls between the domain
//! types in the [`pipeline`] crate and whatever [`pipeline::LlmProvider`] it is
//! given. It contains no transport code and no domain rules of its own.

pub mod executor;
pub mod research;

pub use executor::{PipelineExecutor, RunObserver, RunState};
pub use research::{research_crew, DEFAULT_MODEL, DEFAULT_TOPIC, RESEARCH_CREW_TOML};
