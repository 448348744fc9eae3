//! # stackctl-compose
//!
//! Turns a requested service into the full set of services a stack needs.
//!
//! Handles:
//! - **Catalog**: Service definitions, dependency edges, and the lookup seam.
//! - **Membership**: Ordered, duplicate-free set of stack members.
//! - **Resolver**: Depth-first walk over required and opted-in dependencies.
//! - **Submission**: Persisted stack model and the submission seam.
//! - **Graph**: Dependencies-first startup ordering of a resolved stack.

pub mod catalog;
pub mod graph;
pub mod membership;
pub mod resolver;
pub mod submission;
