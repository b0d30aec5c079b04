//! *Geodetic coordinate reference systems and the transformations between them*.
//!
//! The crate parses OGC Well-Known-Text (WKT) descriptions of coordinate
//! reference systems, represents projections, datum shifts and geocentric
//! conversions as composable numeric transforms, and plans transformation
//! pipelines between arbitrary pairs of systems:
//!
//! ```text
//! WKT text -> tokenizer -> reader -> CoordinateSystem descriptors
//!          -> transformation planner -> chain of Transform legs
//!          -> apply() on streams of points
//! ```
//!
//! ```
//! use geocrs::prelude::*;
//!
//! fn main() -> Result<(), Error> {
//!     let utm32 = ProjectedCs::wgs84_utm(32, true)?;
//!     let wgs84 = GeographicCs::wgs84();
//!
//!     let pipeline = transformation_between(
//!         &CoordinateSystem::Geographic(wgs84),
//!         &CoordinateSystem::Projected(utm32),
//!     )?;
//!
//!     let projected = pipeline.apply(&[12.0, 55.0])?;
//!     assert!((projected[0] - 691_875.6).abs() < 1.0);
//!     Ok(())
//! }
//! ```

use thiserror::Error;

mod csys;
mod factory;
mod projection;
mod token;
mod transform;
mod wkt;

/// The bread-and-butter, re-exported for convenient use
pub mod prelude {
    pub use crate::csys::AngularUnit;
    pub use crate::csys::Authority;
    pub use crate::csys::AxisInfo;
    pub use crate::csys::AxisOrientation;
    pub use crate::csys::CoordinateSystem;
    pub use crate::csys::DatumKind;
    pub use crate::csys::Ellipsoid;
    pub use crate::csys::FittedCs;
    pub use crate::csys::GeocentricCs;
    pub use crate::csys::GeographicCs;
    pub use crate::csys::HorizontalDatum;
    pub use crate::csys::LinearUnit;
    pub use crate::csys::ParameterSet;
    pub use crate::csys::PrimeMeridian;
    pub use crate::csys::ProjectedCs;
    pub use crate::csys::ProjectionDef;
    pub use crate::csys::Wgs84ConversionInfo;
    pub use crate::factory::transformation_between;
    pub use crate::transform::AffineTransform;
    pub use crate::transform::Concatenated;
    pub use crate::transform::DatumTransform;
    pub use crate::transform::GeocentricTransform;
    pub use crate::transform::GeographicTransform;
    pub use crate::transform::PrimeMeridianTransform;
    pub use crate::transform::Transform;
    pub use crate::wkt::parse;
    pub use crate::wkt::parse_coordinate_system;
    pub use crate::wkt::parse_math_transform;
    pub use crate::wkt::WktObject;
    pub use crate::Direction;
    pub use crate::Error;
}

/// Preamble for the internal modules: the prelude plus the
/// machinery the transforms and readers are built from
pub(crate) mod authoring {
    pub use crate::prelude::*;
    pub(crate) use crate::projection;
    pub use crate::token::{Token, TokenKind, Tokenizer};
    #[allow(unused_imports)]
    pub use log::{debug, trace};
}

/// The crate-wide error variants
#[derive(Error, Debug)]
pub enum Error {
    #[error("error: {0}")]
    General(&'static str),

    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("missing required parameter {0}")]
    MissingParam(String),

    #[error("malformed value for parameter {0}: {1}")]
    BadParam(String, String),

    #[error("Projection {0} is not supported.")]
    UnknownProjection(String),

    #[error("unknown ellipsoid {0}")]
    UnknownEllipsoid(String),

    #[error("no convergence in {0}")]
    NoConvergence(&'static str),

    #[error("singular matrix")]
    SingularMatrix,

    #[error("dimension mismatch (expected {expected:?}, found {found:?})")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("no transformation path from '{0}' to '{1}'")]
    NoPath(String, String),
}

/// `Fwd`: Indicate that a two-way transform should run in the *forward*
/// direction.
/// `Inv`: Indicate that a two-way transform should run in the *inverse*
/// direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Fwd,
    Inv,
}

impl Direction {
    #[must_use]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Fwd => Direction::Inv,
            Direction::Inv => Direction::Fwd,
        }
    }
}
