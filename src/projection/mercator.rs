//! The Mercator projection, in its one and two standard parallel forms,
//! and the spherical Pseudo-Mercator variant used by web map tiles.

use super::{ProjectionBase, EPSLN};
use crate::authoring::*;
use crate::transform::check_input;
use std::f64::consts::FRAC_PI_2;

#[derive(Clone, Debug)]
pub struct Mercator {
    base: ProjectionBase,
    /// Scale at the natural origin: the given scale factor (1SP), or the
    /// scale along the standard parallel (2SP)
    k0: f64,
    direction: Direction,
}

impl Mercator {
    /// A `scale_factor` parameter selects the 1SP form; without one the
    /// latitude of origin is read as the standard parallel (2SP)
    pub fn new(params: &ParameterSet) -> Result<Mercator, Error> {
        let base = ProjectionBase::new(params)?;
        let k0 = match params.get("scale_factor") {
            Some(k0) => k0,
            None => {
                let sin_lat = base.lat_origin.sin();
                base.lat_origin.cos() / (1.0 - base.es * sin_lat * sin_lat).sqrt()
            }
        };
        Ok(Mercator {
            base,
            k0,
            direction: Direction::Fwd,
        })
    }

    /// Pseudo-Mercator (EPSG method 1024, the Web Mercator / EPSG:3857
    /// mapping): the Mercator formulas evaluated on a sphere of the
    /// semi-major radius, at scale one
    pub fn pseudo(params: &ParameterSet) -> Result<Mercator, Error> {
        let semi_major = params.value("semi_major", &[])?;
        let spherical = params
            .with("semi_minor", semi_major)
            .with("scale_factor", 1.0);
        Mercator::new(&spherical)
    }

    // ----- F O R W A R D -----------------------------------------------------------

    fn radians_to_meters(&self, lon: f64, lat: f64) -> Result<(f64, f64), Error> {
        if (lat.abs() - FRAC_PI_2).abs() <= EPSLN {
            return Err(Error::General(
                "transformation cannot be computed at the poles",
            ));
        }
        let b = &self.base;
        let esinphi = b.e * lat.sin();
        let x = b.semi_major * self.k0 * (lon - b.central_meridian);
        let y = b.semi_major
            * self.k0
            * ((FRAC_PI_2 * 0.5 + lat * 0.5).tan()
                * ((1.0 - esinphi) / (1.0 + esinphi)).powf(b.e * 0.5))
            .ln();
        Ok((x, y))
    }

    // ----- I N V E R S E -----------------------------------------------------------

    fn meters_to_radians(&self, x: f64, y: f64) -> Result<(f64, f64), Error> {
        let b = &self.base;
        let ts = (-y / (b.semi_major * self.k0)).exp();
        let chi = FRAC_PI_2 - 2.0 * ts.atan();
        let e4 = b.e.powi(4);
        let e6 = b.e.powi(6);
        let e8 = b.e.powi(8);
        let lat = chi
            + (b.es * 0.5 + 5.0 * e4 / 24.0 + e6 / 12.0 + 13.0 * e8 / 360.0) * (2.0 * chi).sin()
            + (7.0 * e4 / 48.0 + 29.0 * e6 / 240.0 + 811.0 * e8 / 11520.0) * (4.0 * chi).sin()
            + (7.0 * e6 / 120.0 + 81.0 * e8 / 1120.0) * (6.0 * chi).sin()
            + (4279.0 * e8 / 161280.0) * (8.0 * chi).sin();
        let lon = x / (b.semi_major * self.k0) + b.central_meridian;
        Ok((lon, lat))
    }
}

impl Transform for Mercator {
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

    // Makassar / NEIEZ: Bessel 1841, one standard parallel
    fn makassar() -> ParameterSet {
        ParameterSet::from_pairs([
            ("semi_major", 6_377_397.155),
            ("semi_minor", 6_377_397.155 * (1.0 - 1.0 / 299.15281)),
            ("unit", 1.0),
            ("central_meridian", 110.0),
            ("latitude_of_origin", 0.0),
            ("scale_factor", 0.997),
            ("false_easting", 3_900_000.0),
            ("false_northing", 900_000.0),
        ])
    }

    #[test]
    fn one_standard_parallel() -> Result<(), Error> {
        // EPSG guidance note 7-2 worked example
        let merc = Mercator::new(&makassar())?;
        let p = merc.apply(&[120.0, -3.0])?;
        assert_float_eq!(p[0], 5_009_726.58, abs <= 0.1);
        assert_float_eq!(p[1], 569_150.82, abs <= 0.1);

        let back = merc.inverse()?.apply(&p)?;
        assert_float_eq!(back[0], 120.0, abs <= 1e-8);
        assert_float_eq!(back[1], -3.0, abs <= 1e-8);
        Ok(())
    }

    #[test]
    fn two_standard_parallels_matches_equivalent_scale() -> Result<(), Error> {
        // A 2SP Mercator with its standard parallel at 42 degrees equals
        // the 1SP form with the corresponding scale at that parallel
        let mut pairs = makassar();
        pairs = pairs.with("latitude_of_origin", 42.0);
        let two_sp = {
            let no_scale = ParameterSet::from_pairs(
                pairs.iter().filter(|(n, _)| *n != "scale_factor").map(|(n, v)| (n.to_string(), v)),
            );
            Mercator::new(&no_scale)?
        };

        let lat0: f64 = 42.0_f64.to_radians();
        let es = {
            let f = 1.0 / 299.15281;
            2.0 * f - f * f
        };
        let k0 = lat0.cos() / (1.0 - es * lat0.sin().powi(2)).sqrt();
        let one_sp = Mercator::new(&pairs.with("scale_factor", k0))?;

        let a = two_sp.apply(&[118.0, 14.0])?;
        let b = one_sp.apply(&[118.0, 14.0])?;
        assert_float_eq!(a[0], b[0], abs <= 1e-6);
        assert_float_eq!(a[1], b[1], abs <= 1e-6);
        Ok(())
    }

    #[test]
    fn pseudo_mercator_is_spherical() -> Result<(), Error> {
        let params = ParameterSet::from_pairs([
            ("semi_major", 6_378_137.0),
            ("semi_minor", 6_356_752.314_245_179),
            ("unit", 1.0),
            ("central_meridian", 0.0),
            ("latitude_of_origin", 0.0),
        ]);
        let web = Mercator::pseudo(&params)?;

        // The spherical formula at the canonical web mercator test point
        let p = web.apply(&[12.0, 55.0])?;
        assert_float_eq!(p[0], 12.0_f64.to_radians() * 6_378_137.0, abs <= 1e-6);
        let expected_y =
            6_378_137.0 * (std::f64::consts::FRAC_PI_4 + 55.0_f64.to_radians() / 2.0).tan().ln();
        assert_float_eq!(p[1], expected_y, abs <= 1e-6);

        let back = web.inverse()?.apply(&p)?;
        assert_float_eq!(back[1], 55.0, abs <= 1e-9);
        Ok(())
    }

    #[test]
    fn rejects_poles() -> Result<(), Error> {
        let merc = Mercator::new(&makassar())?;
        assert!(merc.apply(&[0.0, 90.0]).is_err());
        Ok(())
    }
}
