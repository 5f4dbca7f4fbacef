// Our Real scalar type:
#[cfg(feature = "f32")]
pub type Real = f32;
#[cfg(feature = "f64")]
pub type Real = f64;

/// Cosine of the crease angle (2°) below which adjacent corner normals
/// stop counting as smooth. Fixed by the import pipeline this crate
/// serves; callers needing a different threshold pass it per call via
/// [`SmoothingOptions`](crate::mesh::smoothing::SmoothingOptions).
pub const COS_SMOOTH_ANGLE: Real = 0.9994;

/// Sentinel normal component marking an unlocked (unconstrained) corner.
/// A corner normal with any component at this magnitude never compares
/// equal to anything, so the touching edge is always treated as hard.
pub const UNLOCKED_NORMAL: Real = 1.0e20;

// Tau
/// The full circle constant (τ)
#[cfg(feature = "f32")]
pub const TAU: Real = core::f32::consts::TAU;
/// The full circle constant (τ)
#[cfg(feature = "f64")]
pub const TAU: Real = core::f64::consts::TAU;
