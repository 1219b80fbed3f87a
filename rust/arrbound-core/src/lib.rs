//! arrbound core
//!
//! Shared types used across the compiler, VM, and oracle: integer length
//! widths and their boundary registry, element descriptors, runtime values,
//! allocation outcomes, and the checked allocation primitive.

pub mod alloc;
pub mod element;
pub mod outcome;
pub mod registry;
pub mod values;
pub mod width;
