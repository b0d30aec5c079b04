//! The Krovak oblique conformal conic projection, used by the Czech and
//! Slovak S-JTSK grid. The cone axis meets the ellipsoid away from the
//! pole, and the grid axes point south and west.

use super::ProjectionBase;
use crate::authoring::*;
use crate::transform::check_input;

const MAX_ITER: usize = 15;
const TOL: f64 = 1e-11;

// 45 degrees
const S45: f64 = 0.785398163397448;

#[derive(Clone, Debug)]
pub struct Krovak {
    base: ProjectionBase,
    sin_azim: f64,
    cos_azim: f64,
    /// Cone constant: sine of the pseudo standard parallel
    n: f64,
    tan_s2: f64,
    alfa: f64,
    hae: f64,
    k1: f64,
    ka: f64,
    ro0: f64,
    rop: f64,
    direction: Direction,
}

impl Krovak {
    pub fn new(params: &ParameterSet) -> Result<Krovak, Error> {
        let base = ProjectionBase::new(params)?;
        let azimuth = params.value("azimuth", &[])?.to_radians();
        let pseudo_parallel = params.value("pseudo_standard_parallel_1", &[])?.to_radians();

        let sin_lat = base.lat_origin.sin();
        let cos_lat = base.lat_origin.cos();
        let cos_l2 = cos_lat * cos_lat;
        let alfa = (1.0 + base.es * (cos_l2 * cos_l2) / (1.0 - base.es)).sqrt();
        let hae = alfa * base.e / 2.0;
        let u0 = (sin_lat / alfa).asin();
        let esl = base.e * sin_lat;
        let g = ((1.0 - esl) / (1.0 + esl)).powf(alfa * base.e / 2.0);
        let k1 = (base.lat_origin / 2.0 + S45).tan().powf(alfa) * g / (u0 / 2.0 + S45).tan();
        let ka = (1.0 / k1).powf(-1.0 / alfa);
        let radius = (1.0 - base.es).sqrt() / (1.0 - base.es * sin_lat * sin_lat);
        let ro0 = base.scale_factor * radius / pseudo_parallel.tan();
        let tan_s2 = (pseudo_parallel / 2.0 + S45).tan();
        let n = pseudo_parallel.sin();
        let rop = ro0 * tan_s2.powf(n);

        Ok(Krovak {
            base,
            sin_azim: azimuth.sin(),
            cos_azim: azimuth.cos(),
            n,
            tan_s2,
            alfa,
            hae,
            k1,
            ka,
            ro0,
            rop,
            direction: Direction::Fwd,
        })
    }

    // ----- F O R W A R D -----------------------------------------------------------

    fn radians_to_meters(&self, lon: f64, lat: f64) -> Result<(f64, f64), Error> {
        let b = &self.base;
        let lambda = lon - b.central_meridian;
        let esp = b.e * lat.sin();
        let gfi = ((1.0 - esp) / (1.0 + esp)).powf(self.hae);
        let u = 2.0 * (((lat / 2.0 + S45).tan().powf(self.alfa) / self.k1 * gfi).atan() - S45);
        let deltav = -lambda * self.alfa;
        let cos_u = u.cos();
        let s = (self.cos_azim * u.sin() + self.sin_azim * cos_u * deltav.cos()).asin();
        let d = (cos_u * deltav.sin() / s.cos()).asin();
        let eps = self.n * d;
        let ro = self.rop / (s / 2.0 + S45).tan().powf(self.n);

        // Grid axes point south and west
        let y = -(ro * eps.cos()) * b.semi_major;
        let x = -(ro * eps.sin()) * b.semi_major;
        Ok((x, y))
    }

    // ----- I N V E R S E -----------------------------------------------------------

    fn meters_to_radians(&self, x: f64, y: f64) -> Result<(f64, f64), Error> {
        let b = &self.base;
        let x = x / b.semi_major;
        let y = y / b.semi_major;

        let ro = (x * x + y * y).sqrt();
        let eps = (-x).atan2(-y);
        let d = eps / self.n;
        let s = 2.0 * (((self.ro0 / ro).powf(1.0 / self.n) * self.tan_s2).atan() - S45);
        let cs = s.cos();
        let u = (self.cos_azim * s.sin() - self.sin_azim * cs * d.cos()).asin();
        let kau = self.ka * ((u / 2.0) + S45).tan().powf(1.0 / self.alfa);
        let deltav = (cs * d.sin() / u.cos()).asin();
        let lambda = -deltav / self.alfa;

        let mut phi = 0.0_f64;
        let mut converged = false;
        for _ in 0..MAX_ITER {
            let fi1 = phi;
            let esf = b.e * fi1.sin();
            phi = 2.0 * ((kau * ((1.0 + esf) / (1.0 - esf)).powf(b.e / 2.0)).atan() - S45);
            if (fi1 - phi).abs() <= TOL {
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(Error::NoConvergence("oblique conic latitude iteration"));
        }
        Ok((lambda + b.central_meridian, phi))
    }
}

impl Transform for Krovak {
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

    // S-JTSK (Ferro) / Krovak on the Bessel 1841 ellipsoid. Longitudes
    // are reckoned from Ferro, 17 degrees 40' west of Greenwich
    fn sjtsk() -> ParameterSet {
        ParameterSet::from_pairs([
            ("semi_major", 6_377_397.155),
            ("semi_minor", 6_377_397.155 * (1.0 - 1.0 / 299.1528128)),
            ("unit", 1.0),
            ("latitude_of_center", 49.5),
            ("longitude_of_center", 42.5),
            ("azimuth", 30.288_139_722_222_22),
            ("pseudo_standard_parallel_1", 78.5),
            ("scale_factor", 0.9999),
            ("false_easting", 0.0),
            ("false_northing", 0.0),
        ])
    }

    #[test]
    fn outputs_are_south_west_negative() -> Result<(), Error> {
        let krovak = Krovak::new(&sjtsk())?;
        // Prague, in Ferro longitudes: about 32 degrees 05' E of Ferro
        let p = krovak.apply(&[32.0, 50.08])?;
        assert!(p[0] < 0.0 && p[1] < 0.0);
        // Magnitudes in the usual S-JTSK range
        assert!(p[0].abs() > 400_000.0 && p[0].abs() < 950_000.0);
        assert!(p[1].abs() > 900_000.0 && p[1].abs() < 1_300_000.0);
        Ok(())
    }

    #[test]
    fn roundtrip() -> Result<(), Error> {
        let krovak = Krovak::new(&sjtsk())?;
        let inv = krovak.inverse()?;
        for p in [[32.0, 50.08], [34.5, 48.7], [30.2, 49.2]] {
            let q = krovak.apply(&p)?;
            let back = inv.apply(&q)?;
            assert_float_eq!(back[0], p[0], abs <= 1e-8);
            assert_float_eq!(back[1], p[1], abs <= 1e-8);
        }
        Ok(())
    }
}
