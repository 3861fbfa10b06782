//! Protocol decoding modules.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets, ranges and discriminant values (source of truth)
//! - `parser` (or one file per frame family): header decoding into typed
//!   structs, plus the choice of the next decoder
//! - shared bounds-checked byte access lives in `common`
//!
//! Decoders are pure and contain no I/O; the capture source and report
//! layers handle file access and aggregation.

pub(crate) mod common;
pub(crate) mod data;
pub mod dot11;
pub mod inet;
pub mod link;
pub mod llc;
pub mod protected;

pub use common::MacAddr;
