//! Two pieces of the import-to-screen pipeline for polygonal scenes:
//! recovering **smoothing groups** from per-corner normals, and keeping
//! **live filtered/sorted views** over observable lists current as their
//! source changes.
//!
//! The [`mesh`] module turns the per-face signed edge ids and the flat
//! normal array an importer produces into one smoothing-group mask per
//! face. The [`collections`] module provides [`ObservableVec`] plus the
//! [`FilteredList`] and [`SortedList`] views, which translate source
//! changes into minimal view changes instead of recomputing.
//!
//! # Features
//! - **f32** (default): use f32 as Real, matching imported normal buffers
//! - **f64**: use f64 as Real, this conflicts with f32

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod collections;
pub mod errors;
pub mod float_types;
pub mod mesh;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use collections::{FilteredList, ListChange, ObservableVec, SortedList, TransformationList};
pub use mesh::smoothing::{SmoothingOptions, calc_smooth_groups, calc_smooth_groups_with};
