//! Host-state predicate evaluation.
//!
//! Input: suites of named predicates and a [`target::Target`] to query.
//! Output: one result per check, a verdict, and summary data.
//!
//! This crate never spawns processes itself; every host query goes through the
//! `Target` trait, implemented elsewhere.

#![forbid(unsafe_code)]

pub mod model;
pub mod outcome;
pub mod policy;
pub mod report;
pub mod target;

mod engine;
mod fingerprint;
pub mod checks;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use engine::{aggregate, compute_verdict, evaluate_suite};
pub use fingerprint::fingerprint_for_result;
