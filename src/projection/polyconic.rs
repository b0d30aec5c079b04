//! The American polyconic projection: every parallel is the arc of its
//! own tangent cone, true to scale along the central meridian.

use super::{adjust_lon, ProjectionBase};
use crate::authoring::*;
use crate::transform::check_input;

const EPSILON: f64 = 1e-10;
const MAX_ITER: usize = 20;
const TOL: f64 = 1e-12;

#[derive(Clone, Debug)]
pub struct Polyconic {
    base: ProjectionBase,
    /// Meridian arc at the latitude of origin
    ml0: f64,
    direction: Direction,
}

impl Polyconic {
    pub fn new(params: &ParameterSet) -> Result<Polyconic, Error> {
        let base = ProjectionBase::new(params)?;
        let ml0 = base.mlfn(base.lat_origin, base.lat_origin.sin(), base.lat_origin.cos());
        Ok(Polyconic {
            base,
            ml0,
            direction: Direction::Fwd,
        })
    }

    fn msfn(&self, s: f64, c: f64) -> f64 {
        c / (1.0 - s * s * self.base.es).sqrt()
    }

    // ----- F O R W A R D -----------------------------------------------------------

    fn radians_to_meters(&self, lon: f64, lat: f64) -> Result<(f64, f64), Error> {
        let b = &self.base;
        let mut delta_lam = adjust_lon(lon - b.central_meridian);

        let (x, y) = if lat.abs() <= EPSILON {
            (delta_lam, -self.ml0)
        } else {
            let sp = lat.sin();
            let cp = lat.cos();
            let ms = if cp.abs() > EPSILON {
                self.msfn(sp, cp) / sp
            } else {
                0.0
            };
            delta_lam *= sp;
            (
                ms * delta_lam.sin(),
                (b.mlfn(lat, sp, cp) - self.ml0) + ms * (1.0 - delta_lam.cos()),
            )
        };
        Ok((
            b.scale_factor * b.semi_major * x,
            b.scale_factor * b.semi_major * y,
        ))
    }

    // ----- I N V E R S E -----------------------------------------------------------

    fn meters_to_radians(&self, x: f64, y: f64) -> Result<(f64, f64), Error> {
        let b = &self.base;
        let x = x / (b.semi_major * b.scale_factor);
        let mut y = y / (b.semi_major * b.scale_factor);
        y += self.ml0;

        if y.abs() <= EPSILON {
            return Ok((adjust_lon(x + b.central_meridian), 0.0));
        }

        let r = y * y + x * x;
        let mut phi = y;
        let mut converged = false;
        for _ in 0..=MAX_ITER {
            let sp = phi.sin();
            let cp = phi.cos();
            if cp.abs() < TOL {
                return Err(Error::NoConvergence("polyconic latitude iteration"));
            }
            let s2ph = sp * cp;
            let mut mlp = (1.0 - b.es * sp * sp).sqrt();
            let c = sp * mlp / cp;
            let ml = b.mlfn(phi, sp, cp);
            let mlb = ml * ml + r;
            mlp = (1.0 - b.es) / (mlp * mlp * mlp);
            let dphi = (ml + ml + c * mlb - 2.0 * y * (c * ml + 1.0))
                / (b.es * s2ph * (mlb - 2.0 * y * ml) / c
                    + 2.0 * (y - ml) * (c * mlp - 1.0 / s2ph)
                    - mlp
                    - mlp);
            if dphi.abs() <= TOL {
                converged = true;
                break;
            }
            phi += dphi;
        }
        if !converged {
            return Err(Error::NoConvergence("polyconic latitude iteration"));
        }

        let sp = phi.sin();
        let lam = (x * phi.tan() * (1.0 - b.es * sp * sp).sqrt()).asin() / phi.sin();
        Ok((adjust_lon(lam + b.central_meridian), phi))
    }
}

impl Transform for Polyconic {
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

    // Brazilian polyconic style parameters on GRS80
    fn brazil() -> ParameterSet {
        ParameterSet::from_pairs([
            ("semi_major", 6_378_137.0),
            ("semi_minor", 6_356_752.314_140_356),
            ("unit", 1.0),
            ("central_meridian", -54.0),
            ("latitude_of_origin", 0.0),
            ("false_easting", 5_000_000.0),
            ("false_northing", 10_000_000.0),
        ])
    }

    #[test]
    fn equator_is_true_to_scale() -> Result<(), Error> {
        // On the equator the projection degenerates to the plain
        // rectangular layout
        let poly = Polyconic::new(&brazil())?;
        let p = poly.apply(&[-53.0, 0.0])?;
        assert_float_eq!(p[0], 5_000_000.0 + 1.0_f64.to_radians() * 6_378_137.0, abs <= 1e-6);
        assert_float_eq!(p[1], 10_000_000.0, abs <= 1e-6);
        Ok(())
    }

    #[test]
    fn roundtrip() -> Result<(), Error> {
        let poly = Polyconic::new(&brazil())?;
        let inv = poly.inverse()?;
        for p in [[-54.0, -10.0], [-47.9, -15.8], [-60.0, 3.0]] {
            let q = poly.apply(&p)?;
            let back = inv.apply(&q)?;
            assert_float_eq!(back[0], p[0], abs <= 1e-7);
            assert_float_eq!(back[1], p[1], abs <= 1e-7);
        }
        Ok(())
    }
}
