//! The oblique stereographic projection in its double-projection form
//! (ellipsoid to conformal sphere to plane), as used by the Dutch RD grid.

use super::ProjectionBase;
use crate::authoring::*;
use crate::transform::check_input;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

const MAX_ITER: usize = 15;
const TOL: f64 = 1e-14;
const EPSILON: f64 = 1e-6;

#[derive(Clone, Debug)]
pub struct ObliqueStereographic {
    base: ProjectionBase,
    global_scale: f64,
    /// Conformal sphere constants
    c: f64,
    k: f64,
    ratexp: f64,
    phic0: f64,
    sinc0: f64,
    cosc0: f64,
    r2: f64,
    direction: Direction,
}

impl ObliqueStereographic {
    pub fn new(params: &ParameterSet) -> Result<ObliqueStereographic, Error> {
        let base = ProjectionBase::new(params)?;
        let global_scale = base.scale_factor * base.semi_major;

        let sphi = base.lat_origin.sin();
        let mut cphi = base.lat_origin.cos();
        cphi *= cphi;
        let r2 = 2.0 * (1.0 - base.es).sqrt() / (1.0 - base.es * sphi * sphi);
        let c = (1.0 + base.es * cphi * cphi / (1.0 - base.es)).sqrt();
        let phic0 = (sphi / c).asin();
        let ratexp = 0.5 * c * base.e;
        let k = (0.5 * phic0 + FRAC_PI_4).tan()
            / ((0.5 * base.lat_origin + FRAC_PI_4).tan().powf(c) * srat(base.e * sphi, ratexp));

        Ok(ObliqueStereographic {
            base,
            global_scale,
            c,
            k,
            ratexp,
            phic0,
            sinc0: phic0.sin(),
            cosc0: phic0.cos(),
            r2,
            direction: Direction::Fwd,
        })
    }

    // ----- F O R W A R D -----------------------------------------------------------

    fn radians_to_meters(&self, lon: f64, lat: f64) -> Result<(f64, f64), Error> {
        let b = &self.base;
        let mut x = lon - b.central_meridian;
        // To the conformal sphere
        let y = 2.0
            * (self.k
                * (0.5 * lat + FRAC_PI_4).tan().powf(self.c)
                * srat(b.e * lat.sin(), self.ratexp))
            .atan()
            - FRAC_PI_2;
        x *= self.c;

        let sinc = y.sin();
        let cosc = y.cos();
        let cosl = x.cos();
        let k = self.r2 / (1.0 + self.sinc0 * sinc + self.cosc0 * cosc * cosl);
        let xp = k * cosc * x.sin();
        let yp = k * (self.cosc0 * sinc - self.sinc0 * cosc * cosl);
        Ok((xp * self.global_scale, yp * self.global_scale))
    }

    // ----- I N V E R S E -----------------------------------------------------------

    fn meters_to_radians(&self, x: f64, y: f64) -> Result<(f64, f64), Error> {
        let b = &self.base;
        let mut x = x / self.global_scale;
        let mut y = y / self.global_scale;

        let rho = (x * x + y * y).sqrt();
        if rho.abs() < EPSILON {
            x = 0.0;
            y = self.phic0;
        } else {
            let ce = 2.0 * rho.atan2(self.r2);
            let sinc = ce.sin();
            let cosc = ce.cos();
            let lon = (x * sinc).atan2(rho * self.cosc0 * cosc - y * self.sinc0 * sinc);
            let lat = cosc * self.sinc0 + y * sinc * self.cosc0 / rho;
            x = lon;
            y = if lat.abs() >= 1.0 {
                if lat < 0.0 {
                    -FRAC_PI_2
                } else {
                    FRAC_PI_2
                }
            } else {
                lat.asin()
            };
        }

        // Back from the conformal sphere, by fixed point iteration
        x /= self.c;
        let num = ((0.5 * y + FRAC_PI_4).tan() / self.k).powf(1.0 / self.c);
        let mut converged = false;
        for _ in 0..MAX_ITER {
            let phi = 2.0 * (num * srat(b.e * y.sin(), -0.5 * b.e)).atan() - FRAC_PI_2;
            if (phi - y).abs() < TOL {
                converged = true;
                break;
            }
            y = phi;
        }
        if !converged {
            return Err(Error::NoConvergence("conformal sphere latitude iteration"));
        }
        Ok((x + b.central_meridian, y))
    }
}

fn srat(esinp: f64, exp: f64) -> f64 {
    ((1.0 - esinp) / (1.0 + esinp)).powf(exp)
}

impl Transform for ObliqueStereographic {
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

    // Amersfoort / RD New, Bessel 1841
    fn rd_new() -> ParameterSet {
        ParameterSet::from_pairs([
            ("semi_major", 6_377_397.155),
            ("semi_minor", 6_356_078.963),
            ("unit", 1.0),
            ("central_meridian", 5.387_638_888_888_889),
            ("latitude_of_origin", 52.156_160_555_555_556),
            ("scale_factor", 0.999_907_9),
            ("false_easting", 155_000.0),
            ("false_northing", 463_000.0),
        ])
    }

    #[test]
    fn origin_maps_to_false_origin() -> Result<(), Error> {
        let sterea = ObliqueStereographic::new(&rd_new())?;
        let p = sterea.apply(&[5.387_638_888_888_889, 52.156_160_555_555_556])?;
        assert_float_eq!(p[0], 155_000.0, abs <= 1e-3);
        assert_float_eq!(p[1], 463_000.0, abs <= 1e-3);
        Ok(())
    }

    #[test]
    fn roundtrip() -> Result<(), Error> {
        let sterea = ObliqueStereographic::new(&rd_new())?;
        let inv = sterea.inverse()?;
        for p in [[6.0, 52.0], [4.3, 51.9], [5.387_638_888_888_889, 53.2]] {
            let q = sterea.apply(&p)?;
            let back = inv.apply(&q)?;
            assert_float_eq!(back[0], p[0], abs <= 1e-8);
            assert_float_eq!(back[1], p[1], abs <= 1e-8);
        }
        Ok(())
    }
}
