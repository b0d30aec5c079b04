//! The oblique Mercator projection: cylindrical and conformal about a
//! skew axis given by an azimuth at the projection centre. Both EPSG
//! variants are covered, differing only in where the grid origin sits:
//! variant A (Hotine, 9812) at the intersection of the aposphere equator
//! with the skew axis, variant B (9815) at the natural origin.

use super::{adjust_lon, asinz, phi2z, tsfnz, ProjectionBase, EPSLN};
use crate::authoring::*;
use crate::transform::check_input;
use std::f64::consts::{FRAC_PI_2, PI};

#[derive(Clone, Debug)]
pub struct ObliqueMercator {
    base: ProjectionBase,
    /// Grid origin at the natural origin (variant B) or at the aposphere
    /// origin (variant A)
    natural_origin_offsets: bool,
    /// Longitude of the aposphere origin, shifted from the given centre
    lon_origin: f64,
    bl: f64,
    al: f64,
    el: f64,
    singam: f64,
    cosgam: f64,
    singrid: f64,
    cosgrid: f64,
    u: f64,
    direction: Direction,
}

impl ObliqueMercator {
    /// Variant B (EPSG 9815), the `Oblique_Mercator` WKT name
    pub fn new(params: &ParameterSet) -> Result<ObliqueMercator, Error> {
        ObliqueMercator::with_offsets(params, true)
    }

    /// Variant A (EPSG 9812), the `Hotine_Oblique_Mercator` WKT name
    pub fn hotine(params: &ParameterSet) -> Result<ObliqueMercator, Error> {
        ObliqueMercator::with_offsets(params, false)
    }

    fn with_offsets(
        params: &ParameterSet,
        natural_origin_offsets: bool,
    ) -> Result<ObliqueMercator, Error> {
        let base = ProjectionBase::new(params)?;
        let azimuth = params.value("azimuth", &[])?.to_radians();
        let grid_angle = params.value("rectified_grid_angle", &[])?.to_radians();

        let sin_p20 = base.lat_origin.sin();
        let cos_p20 = base.lat_origin.cos();

        let mut con = 1.0 - base.es * sin_p20 * sin_p20;
        let com = (1.0 - base.es).sqrt();
        let bl = (1.0 + base.es * cos_p20.powi(4) / (1.0 - base.es)).sqrt();
        let al = base.semi_major * bl * base.scale_factor * com / con;

        let (d, el, f);
        if base.lat_origin.abs() < EPSLN {
            d = 1.0;
            el = 1.0;
            f = 1.0;
        } else {
            let ts = tsfnz(base.e, base.lat_origin, sin_p20);
            con = con.sqrt();
            d = bl * com / (cos_p20 * con);
            f = if d * d - 1.0 > 0.0 {
                if base.lat_origin >= 0.0 {
                    d + (d * d - 1.0).sqrt()
                } else {
                    d - (d * d - 1.0).sqrt()
                }
            } else {
                d
            };
            el = f * ts.powf(bl);
        }

        let g = 0.5 * (f - 1.0 / f);
        let gama = asinz(azimuth.sin() / d);
        let lon_origin = base.central_meridian - asinz(g * gama.tan()) / bl;

        con = base.lat_origin.abs();
        if con <= EPSLN || (con - FRAC_PI_2).abs() <= EPSLN {
            return Err(Error::General(
                "the projection centre cannot sit on the equator or a pole",
            ));
        }

        let cosaz = azimuth.cos();
        let u = if base.lat_origin >= 0.0 {
            (al / bl) * ((d * d - 1.0).sqrt() / cosaz).atan()
        } else {
            -(al / bl) * ((d * d - 1.0).sqrt() / cosaz).atan()
        };

        Ok(ObliqueMercator {
            base,
            natural_origin_offsets,
            lon_origin,
            bl,
            al,
            el,
            singam: gama.sin(),
            cosgam: gama.cos(),
            singrid: grid_angle.sin(),
            cosgrid: grid_angle.cos(),
            u,
            direction: Direction::Fwd,
        })
    }

    // ----- F O R W A R D -----------------------------------------------------------

    fn radians_to_meters(&self, lon: f64, lat: f64) -> Result<(f64, f64), Error> {
        let b = &self.base;
        let sin_phi = lat.sin();
        let dlon = adjust_lon(lon - self.lon_origin);
        let vl = (self.bl * dlon).sin();

        let (ul, mut us);
        if (lat.abs() - FRAC_PI_2).abs() > EPSLN {
            let ts1 = tsfnz(b.e, lat, sin_phi);
            let q = self.el / ts1.powf(self.bl);
            let s = 0.5 * (q - 1.0 / q);
            let t = 0.5 * (q + 1.0 / q);
            ul = (s * self.singam - vl * self.cosgam) / t;
            let con = (self.bl * dlon).cos();
            if con.abs() < 1e-7 {
                us = self.al * self.bl * dlon;
            } else {
                us = self.al * ((s * self.cosgam + vl * self.singam) / con).atan() / self.bl;
                if con < 0.0 {
                    us += PI * self.al / self.bl;
                }
            }
        } else {
            ul = if lat >= 0.0 { self.singam } else { -self.singam };
            us = self.al * lat / self.bl;
        }

        if (ul.abs() - 1.0).abs() <= EPSLN {
            return Err(Error::General("point projects into infinity"));
        }

        let vs = 0.5 * self.al * ((1.0 - ul) / (1.0 + ul)).ln() / self.bl;
        if !self.natural_origin_offsets {
            us -= self.u;
        }
        let x = vs * self.cosgrid + us * self.singrid;
        let y = us * self.cosgrid - vs * self.singrid;
        Ok((x, y))
    }

    // ----- I N V E R S E -----------------------------------------------------------

    fn meters_to_radians(&self, x: f64, y: f64) -> Result<(f64, f64), Error> {
        let b = &self.base;
        let vs = x * self.cosgrid - y * self.singrid;
        let mut us = y * self.cosgrid + x * self.singrid;
        if !self.natural_origin_offsets {
            us += self.u;
        }

        let q = (-self.bl * vs / self.al).exp();
        let s = 0.5 * (q - 1.0 / q);
        let t = 0.5 * (q + 1.0 / q);
        let vl = (self.bl * us / self.al).sin();
        let ul = (vl * self.cosgam + s * self.singam) / t;

        if (ul.abs() - 1.0).abs() <= EPSLN {
            let lat = if ul >= 0.0 { FRAC_PI_2 } else { -FRAC_PI_2 };
            return Ok((self.lon_origin, lat));
        }

        let con = 1.0 / self.bl;
        let ts1 = (self.el / ((1.0 + ul) / (1.0 - ul)).sqrt()).powf(con);
        let lat = phi2z(b.e, ts1)?;
        let con = (self.bl * us / self.al).cos();
        let theta = self.lon_origin - (s * self.cosgam - vl * self.singam).atan2(con) / self.bl;
        Ok((adjust_lon(theta), lat))
    }
}

impl Transform for ObliqueMercator {
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

    // Timbalai 1948 / RSO Borneo, Everest ellipsoid
    fn borneo() -> ParameterSet {
        ParameterSet::from_pairs([
            ("semi_major", 6_377_298.556),
            ("semi_minor", 6_356_097.550),
            ("unit", 1.0),
            ("latitude_of_center", 4.0),
            ("longitude_of_center", 115.0),
            ("azimuth", 53.315_820_472_222_22),
            ("rectified_grid_angle", 53.130_102_361_111_11),
            ("scale_factor", 0.997_384_68),
            ("false_easting", 590_476.87),
            ("false_northing", 442_857.65),
        ])
    }

    #[test]
    fn variants_differ_by_the_centre_offset() -> Result<(), Error> {
        let natural = ObliqueMercator::new(&borneo())?;
        let aposphere = ObliqueMercator::hotine(&borneo())?;

        let p = [115.805_505_4, 5.387_253_6];
        let a = natural.apply(&p)?;
        let b = aposphere.apply(&p)?;

        // Same skew grid, origins separated by the centre distance u
        // along the rectified u axis
        assert_float_eq!(a[0] - b[0], natural.u * natural.singrid, abs <= 1e-6);
        assert_float_eq!(a[1] - b[1], natural.u * natural.cosgrid, abs <= 1e-6);
        Ok(())
    }

    #[test]
    fn rejects_equatorial_centre() {
        let equatorial = borneo().with("latitude_of_center", 0.0);
        assert!(ObliqueMercator::new(&equatorial).is_err());
    }

    #[test]
    fn roundtrip() -> Result<(), Error> {
        for omerc in [ObliqueMercator::new(&borneo())?, ObliqueMercator::hotine(&borneo())?] {
            let inv = omerc.inverse()?;
            for p in [[115.805_505_4, 5.387_253_6], [114.0, 4.5], [117.2, 6.0]] {
                let q = omerc.apply(&p)?;
                let back = inv.apply(&q)?;
                assert_float_eq!(back[0], p[0], abs <= 1e-7);
                assert_float_eq!(back[1], p[1], abs <= 1e-7);
            }
        }
        Ok(())
    }
}
