//! Longitude rebasing between geographic systems: the prime meridian
//! shift proper, and the more general rebase that also converts between
//! the two systems' angular units.

use crate::authoring::*;
use crate::transform::check_input;

/// Shift of the longitude origin between two prime meridians expressed
/// in the same angular unit. Latitude and height pass through untouched
#[derive(Clone, Debug)]
pub struct PrimeMeridianTransform {
    source: PrimeMeridian,
    target: PrimeMeridian,
}

impl PrimeMeridianTransform {
    /// Fails when the two meridians use different angular units: the
    /// simple offset would silently mix units
    pub fn new(
        source: PrimeMeridian,
        target: PrimeMeridian,
    ) -> Result<PrimeMeridianTransform, Error> {
        if !source.angular_unit.equal_params(&target.angular_unit) {
            return Err(Error::General(
                "prime meridians with different angular units cannot be shifted directly",
            ));
        }
        Ok(PrimeMeridianTransform { source, target })
    }
}

impl Transform for PrimeMeridianTransform {
    fn dim_source(&self) -> usize {
        3
    }

    fn dim_target(&self) -> usize {
        3
    }

    fn apply(&self, point: &[f64]) -> Result<Vec<f64>, Error> {
        check_input(point, 3)?;
        let mut out = point.to_vec();
        out[0] = point[0] + self.source.longitude - self.target.longitude;
        Ok(out)
    }

    fn inverse(&self) -> Result<Box<dyn Transform>, Error> {
        Ok(Box::new(PrimeMeridianTransform {
            source: self.target.clone(),
            target: self.source.clone(),
        }))
    }
}

/// Rebasing of geographic coordinates between two systems sharing a
/// datum: angular unit conversion plus the prime meridian offset,
/// applied in radians so meridians in different units compose correctly
#[derive(Clone, Debug)]
pub struct GeographicTransform {
    source: GeographicCs,
    target: GeographicCs,
}

impl GeographicTransform {
    pub fn new(source: GeographicCs, target: GeographicCs) -> GeographicTransform {
        GeographicTransform { source, target }
    }

    fn meridian_radians(pm: &PrimeMeridian) -> f64 {
        pm.longitude * pm.angular_unit.radians_per_unit
    }
}

impl Transform for GeographicTransform {
    fn dim_source(&self) -> usize {
        2
    }

    fn dim_target(&self) -> usize {
        2
    }

    fn apply(&self, point: &[f64]) -> Result<Vec<f64>, Error> {
        check_input(point, 2)?;
        let src = self.source.angular_unit.radians_per_unit;
        let tgt = self.target.angular_unit.radians_per_unit;
        let src_pm = Self::meridian_radians(&self.source.prime_meridian);
        let tgt_pm = Self::meridian_radians(&self.target.prime_meridian);

        let mut out = point.to_vec();
        out[0] = (point[0] * src + src_pm - tgt_pm) / tgt;
        out[1] = point[1] * src / tgt;
        Ok(out)
    }

    fn inverse(&self) -> Result<Box<dyn Transform>, Error> {
        Ok(Box::new(GeographicTransform {
            source: self.target.clone(),
            target: self.source.clone(),
        }))
    }
}

// ----- T E S T S ---------------------------------------------------------------------
