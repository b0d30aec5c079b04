//! The Transverse Mercator projection in its ellipsoidal form, after
//! Snyder's Working Manual series expansion. The workhorse of the UTM
//! grid and most national mapping systems.

use super::{adjust_lon, ProjectionBase};
use crate::authoring::*;
use crate::transform::check_input;
use std::f64::consts::FRAC_PI_2;

const EPSILON: f64 = 1e-6;

// 1/1, 1/2, 1/6, ... 1/56
const FC1: f64 = 1.0;
const FC2: f64 = 0.5;
const FC3: f64 = 0.16666666666666666666;
const FC4: f64 = 0.08333333333333333333;
const FC5: f64 = 0.05;
const FC6: f64 = 0.03333333333333333333;
const FC7: f64 = 0.02380952380952380952;
const FC8: f64 = 0.01785714285714285714;

#[derive(Clone, Debug)]
pub struct TransverseMercator {
    base: ProjectionBase,
    /// Second eccentricity squared, es / (1 - es)
    esp: f64,
    /// Meridian arc at the latitude of origin
    ml0: f64,
    direction: Direction,
}

impl TransverseMercator {
    pub fn new(params: &ParameterSet) -> Result<TransverseMercator, Error> {
        let base = ProjectionBase::new(params)?;
        let esp = base.es / (1.0 - base.es);
        let ml0 = base.mlfn(base.lat_origin, base.lat_origin.sin(), base.lat_origin.cos());
        Ok(TransverseMercator {
            base,
            esp,
            ml0,
            direction: Direction::Fwd,
        })
    }

    // ----- F O R W A R D -----------------------------------------------------------

    fn radians_to_meters(&self, lon: f64, lat: f64) -> Result<(f64, f64), Error> {
        let b = &self.base;
        let dlon = adjust_lon(lon - b.central_meridian);
        let sinphi = lat.sin();
        let cosphi = lat.cos();

        let mut t = if cosphi.abs() > EPSILON {
            sinphi / cosphi
        } else {
            0.0
        };
        t *= t;
        let mut al = cosphi * dlon;
        let als = al * al;
        al /= (1.0 - b.es * sinphi * sinphi).sqrt();
        let n = self.esp * cosphi * cosphi;

        // Meridian arc at the latitude of origin is the northing origin
        let y = self.base.mlfn(lat, sinphi, cosphi) - self.ml0
            + sinphi
                * al
                * dlon
                * FC2
                * (1.0
                    + FC4 * als
                        * (5.0 - t + n * (9.0 + 4.0 * n)
                            + FC6 * als
                                * (61.0 + t * (t - 58.0) + n * (270.0 - 330.0 * t)
                                    + FC8 * als * (1385.0 + t * (t * (543.0 - t) - 3111.0)))));
        let x = al
            * (FC1
                + FC3 * als
                    * (1.0 - t + n
                        + FC5 * als
                            * (5.0 + t * (t - 18.0) + n * (14.0 - 58.0 * t)
                                + FC7 * als * (61.0 + t * (t * (179.0 - t) - 479.0)))));

        Ok((
            b.scale_factor * b.semi_major * x,
            b.scale_factor * b.semi_major * y,
        ))
    }

    // ----- I N V E R S E -----------------------------------------------------------

    fn meters_to_radians(&self, x: f64, y: f64) -> Result<(f64, f64), Error> {
        let b = &self.base;
        let x = x / b.semi_major;
        let y = y / b.semi_major;
        let phi = b.inv_mlfn(self.ml0 + y / b.scale_factor)?;

        if phi.abs() >= FRAC_PI_2 {
            let lat = if y < 0.0 { -FRAC_PI_2 } else { FRAC_PI_2 };
            return Ok((0.0, lat));
        }

        let sinphi = phi.sin();
        let cosphi = phi.cos();
        let mut t = if cosphi.abs() > EPSILON {
            sinphi / cosphi
        } else {
            0.0
        };
        let n = self.esp * cosphi * cosphi;
        let mut con = 1.0 - b.es * sinphi * sinphi;
        let d = x * con.sqrt() / b.scale_factor;
        con *= t;
        t *= t;
        let ds = d * d;

        let lat = phi
            - (con * ds / (1.0 - b.es))
                * FC2
                * (1.0
                    - ds * FC4
                        * (5.0 + t * (3.0 - 9.0 * n) + n * (1.0 - 4.0 * n)
                            - ds * FC6
                                * (61.0 + t * (90.0 - 252.0 * n + 45.0 * t) + 46.0 * n
                                    - ds * FC8
                                        * (1385.0
                                            + t * (3633.0 + t * (4095.0 + 1574.0 * t))))));
        let lon = adjust_lon(
            b.central_meridian
                + d * (FC1
                    - ds * FC3
                        * (1.0 + 2.0 * t + n
                            - ds * FC5
                                * (5.0 + t * (28.0 + 24.0 * t + 8.0 * n) + 6.0 * n
                                    - ds * FC7
                                        * (61.0 + t * (662.0 + t * (1320.0 + 720.0 * t))))))
                    / cosphi,
        );
        Ok((lon, lat))
    }
}

impl Transform for TransverseMercator {
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

    fn utm(zone: f64) -> ParameterSet {
        ParameterSet::from_pairs([
            ("semi_major", 6_378_137.0),
            ("semi_minor", 6_356_752.314_245_179),
            ("unit", 1.0),
            ("latitude_of_origin", 0.0),
            ("central_meridian", zone * 6.0 - 183.0),
            ("scale_factor", 0.9996),
            ("false_easting", 500_000.0),
            ("false_northing", 0.0),
        ])
    }

    #[test]
    fn utm_central_meridian() -> Result<(), Error> {
        // On the central meridian, easting is exactly the false easting
        let tm = TransverseMercator::new(&utm(31.0))?;
        let p = tm.apply(&[3.0, 50.0])?;
        assert_float_eq!(p[0], 500_000.0, abs <= 1e-6);
        assert_float_eq!(p[1], 5_538_630.7, abs <= 1.0);
        Ok(())
    }

    #[test]
    fn utm_zone_32() -> Result<(), Error> {
        let tm = TransverseMercator::new(&utm(32.0))?;
        let p = tm.apply(&[12.0, 55.0])?;
        assert_float_eq!(p[0], 691_875.6, abs <= 1.0);
        assert_float_eq!(p[1], 6_098_907.8, abs <= 1.0);
        Ok(())
    }

    #[test]
    fn roundtrip() -> Result<(), Error> {
        let tm = TransverseMercator::new(&utm(32.0))?;
        let inv = tm.inverse()?;
        for p in [[9.0, 0.0], [12.0, 55.0], [6.01, -33.2], [11.5, 80.0]] {
            let q = tm.apply(&p)?;
            let back = inv.apply(&q)?;
            assert_float_eq!(back[0], p[0], abs <= 1e-8);
            assert_float_eq!(back[1], p[1], abs <= 1e-8);
        }
        Ok(())
    }

    #[test]
    fn unit_factor_scales_output() -> Result<(), Error> {
        // The false origin is given in grid units, so with a zero origin
        // a kilometre grid is exactly the metre grid divided by 1000
        let params = utm(31.0).with("false_easting", 0.0);
        let metres = TransverseMercator::new(&params)?;
        let km = TransverseMercator::new(&params.with("unit", 1000.0))?;

        let m = metres.apply(&[4.5, 50.0])?;
        let k = km.apply(&[4.5, 50.0])?;
        assert_float_eq!(k[0], m[0] / 1000.0, abs <= 1e-9);
        assert_float_eq!(k[1], m[1] / 1000.0, abs <= 1e-9);
        Ok(())
    }
}
