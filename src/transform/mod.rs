//! The transform contract: every coordinate operation in the crate is an
//! immutable, bidirectional point mapping behind the [`Transform`] trait.
//!
//! There is no in-place "invert" toggle anywhere: a transform that runs in
//! two directions carries an immutable [`Direction`](crate::Direction) tag,
//! and `inverse()` constructs the opposite-direction instance from the same
//! precomputed constants. `t.inverse()?.inverse()?` is therefore always
//! numerically identical to `t`, and concurrent forward/inverse use needs
//! no synchronization.

use crate::authoring::*;

mod affine;
mod concatenated;
mod datum_shift;
mod geocentric;
mod meridian;

pub use affine::AffineTransform;
pub use concatenated::Concatenated;
pub use datum_shift::DatumTransform;
pub use geocentric::GeocentricTransform;
pub use meridian::{GeographicTransform, PrimeMeridianTransform};

/// A bidirectional mapping of points between two coordinate spaces
pub trait Transform: std::fmt::Debug + Send + Sync {
    /// Number of coordinates of an input point
    fn dim_source(&self) -> usize;

    /// Number of coordinates of an output point
    fn dim_target(&self) -> usize;

    /// Map a single point. Pure: the input is never mutated, a fresh
    /// point is returned
    fn apply(&self, point: &[f64]) -> Result<Vec<f64>, Error>;

    /// Element-wise batch application
    fn apply_many(&self, points: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, Error> {
        points.iter().map(|p| self.apply(p)).collect()
    }

    /// The opposite-direction transform, as an independent instance
    fn inverse(&self) -> Result<Box<dyn Transform>, Error>;

    /// The WKT form, for the transform kinds the format defines one for
    fn wkt(&self) -> Result<String, Error> {
        Err(Error::Unsupported(
            "this transform kind has no WKT representation".to_string(),
        ))
    }
}

/// Optional trailing coordinate (typically an ellipsoidal height):
/// absent or NaN means zero
pub(crate) fn height(point: &[f64], index: usize) -> f64 {
    match point.get(index) {
        Some(h) if h.is_nan() => 0.0,
        Some(h) => *h,
        None => 0.0,
    }
}

/// A point must carry at least the transform's source dimensionality,
/// except that the height of a 3D transform may be left off
pub(crate) fn check_input(point: &[f64], dim_source: usize) -> Result<(), Error> {
    let required = if dim_source == 3 { 2 } else { dim_source };
    if point.len() < required {
        return Err(Error::DimensionMismatch {
            expected: dim_source,
            found: point.len(),
        });
    }
    Ok(())
}
