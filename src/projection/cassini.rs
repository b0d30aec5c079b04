//! The Cassini-Soldner projection: equidistant along the central meridian
//! and lines perpendicular to it. Survives in a number of cadastral grids.

use super::{adjust_lon, ProjectionBase};
use crate::authoring::*;
use crate::transform::check_input;

const MAX_ITER: usize = 10;
const TOL: f64 = 1e-11;

const ONE_6TH: f64 = 0.16666666666666666666;
const ONE_120TH: f64 = 0.00833333333333333333;
const ONE_24TH: f64 = 0.04166666666666666666;
const ONE_3RD: f64 = 0.33333333333333333333;
const ONE_15TH: f64 = 0.06666666666666666666;

#[derive(Clone, Debug)]
pub struct CassiniSoldner {
    base: ProjectionBase,
    /// Second eccentricity squared, es / (1 - es)
    c_factor: f64,
    /// Meridian arc at the latitude of origin
    m0: f64,
    direction: Direction,
}

impl CassiniSoldner {
    pub fn new(params: &ParameterSet) -> Result<CassiniSoldner, Error> {
        let base = ProjectionBase::new(params)?;
        let c_factor = base.es / (1.0 - base.es);
        let m0 = base.mlfn(base.lat_origin, base.lat_origin.sin(), base.lat_origin.cos());
        Ok(CassiniSoldner {
            base,
            c_factor,
            m0,
            direction: Direction::Fwd,
        })
    }

    // ----- F O R W A R D -----------------------------------------------------------

    fn radians_to_meters(&self, lon: f64, lat: f64) -> Result<(f64, f64), Error> {
        let b = &self.base;
        let lambda = lon - b.central_meridian;
        let sin_phi = lat.sin();
        let cos_phi = lat.cos();

        let mut y = b.mlfn(lat, sin_phi, cos_phi);
        let n = 1.0 / (1.0 - b.es * sin_phi * sin_phi).sqrt();
        let tn = lat.tan();
        let t = tn * tn;
        let a1 = lambda * cos_phi;
        let a2 = a1 * a1;
        let c = self.c_factor * cos_phi * cos_phi;
        let x = n * a1 * (1.0 - a2 * t * (ONE_6TH - (8.0 - t + 8.0 * c) * a2 * ONE_120TH));
        y -= self.m0 - n * tn * a2 * (0.5 + (5.0 - t + 6.0 * c) * a2 * ONE_24TH);

        Ok((b.semi_major * x, b.semi_major * y))
    }

    // ----- I N V E R S E -----------------------------------------------------------

    fn meters_to_radians(&self, x: f64, y: f64) -> Result<(f64, f64), Error> {
        let b = &self.base;
        let x = x / b.semi_major;
        let y = y / b.semi_major;

        let phi1 = self.phi1(self.m0 + y)?;
        let tn = phi1.tan();
        let t = tn * tn;
        let mut n = phi1.sin();
        let mut r = 1.0 / (1.0 - b.es * n * n);
        n = r.sqrt();
        r *= (1.0 - b.es) * n;
        let dd = x / n;
        let d2 = dd * dd;
        let phi = phi1 - (n * tn / r) * d2 * (0.5 - (1.0 + 3.0 * t) * d2 * ONE_24TH);
        let lambda = dd * (1.0 + t * d2 * (-ONE_3RD + (1.0 + 3.0 * t) * d2 * ONE_15TH)) / phi1.cos();
        Ok((adjust_lon(lambda + b.central_meridian), phi))
    }

    /// Footpoint latitude from the meridian arc, by Newton iteration
    fn phi1(&self, arg: f64) -> Result<f64, Error> {
        let b = &self.base;
        let k = 1.0 / (1.0 - b.es);
        let mut phi = arg;
        // rarely goes over 2 iterations
        for _ in 0..MAX_ITER {
            let sin_phi = phi.sin();
            let mut t = 1.0 - b.es * sin_phi * sin_phi;
            t = (b.mlfn(phi, sin_phi, phi.cos()) - arg) * (t * t.sqrt()) * k;
            phi -= t;
            if t.abs() < TOL {
                return Ok(phi);
            }
        }
        Err(Error::NoConvergence("footpoint latitude iteration"))
    }
}

impl Transform for CassiniSoldner {
    fn dim_source(&self) -> usize {
        2
    }

    fn dim_target(&self) -> usize {
        2
    }

    fn apply(&self, point: &[f64]) -> Result<Vec<f64>, Error> {
        check_input(point, 2)?;
        match self.direction {
            Direction::Fwd => self
                .base
                .degrees_to_meters(point, |lon, lat| self.radians_to_meters(lon, lat)),
            Direction::Inv => self
                .base
                .meters_to_degrees(point, |x, y| self.meters_to_radians(x, y)),
        }
    }

    fn inverse(&self) -> Result<Box<dyn Transform>, Error> {
        let mut flipped = self.clone();
        flipped.direction = self.direction.opposite();
        Ok(Box::new(flipped))
    }
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    // Trinidad 1903 (Clarke 1858 values in metres)
    fn trinidad() -> ParameterSet {
        ParameterSet::from_pairs([
            ("semi_major", 6_378_293.645),
            ("semi_minor", 6_356_617.988),
            ("unit", 1.0),
            ("central_meridian", -61.333_333_333_333_33),
            ("latitude_of_origin", 10.441_666_666_666_666),
            ("false_easting", 86_501.46),
            ("false_northing", 65_379.01),
        ])
    }

    #[test]
    fn origin_maps_to_false_origin() -> Result<(), Error> {
        let cass = CassiniSoldner::new(&trinidad())?;
        let p = cass.apply(&[-61.333_333_333_333_33, 10.441_666_666_666_666])?;
        assert_float_eq!(p[0], 86_501.46, abs <= 1e-6);
        assert_float_eq!(p[1], 65_379.01, abs <= 1e-6);
        Ok(())
    }

    #[test]
    fn roundtrip() -> Result<(), Error> {
        let cass = CassiniSoldner::new(&trinidad())?;
        let inv = cass.inverse()?;
        for p in [[-61.0, 10.0], [-61.7, 10.65], [-60.9, 11.1]] {
            let q = cass.apply(&p)?;
            let back = inv.apply(&q)?;
            assert_float_eq!(back[0], p[0], abs <= 1e-8);
            assert_float_eq!(back[1], p[1], abs <= 1e-8);
        }
        Ok(())
    }
}
