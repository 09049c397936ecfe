//! Product domain model.
//!
//! # Responsibility
//! - Define the persisted record shape and the write-side field set.
//! - Own the field invariants enforced before any write reaches storage.
//!
//! # Invariants
//! - Every persisted row is identified by a stable, storage-assigned id.
//! - Write sets are validated here, in one place, for both write paths.

pub mod product;
