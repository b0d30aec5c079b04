//! The Albers equal-area conic projection, defined by two standard
//! parallels between which area is preserved exactly.

use super::ProjectionBase;
use crate::authoring::*;
use crate::transform::check_input;

#[derive(Clone, Debug)]
pub struct Albers {
    base: ProjectionBase,
    /// Cone constant
    n: f64,
    c: f64,
    /// Radius of the latitude-of-origin parallel on the cone
    ro0: f64,
    direction: Direction,
}

impl Albers {
    pub fn new(params: &ParameterSet) -> Result<Albers, Error> {
        let base = ProjectionBase::new(params)?;
        let lat1 = params.value("standard_parallel_1", &[])?.to_radians();
        let lat2 = params.value("standard_parallel_2", &[])?.to_radians();

        // A degenerate cone: parallels mirrored across the equator
        if (lat1 + lat2).abs() < 1e-9 {
            return Err(Error::General(
                "equal latitudes for standard parallels on opposite sides of equator",
            ));
        }

        let alpha1 = alpha(&base, lat1);
        let alpha2 = alpha(&base, lat2);
        let m1 = lat1.cos() / (1.0 - base.es * lat1.sin().powi(2)).sqrt();
        let m2 = lat2.cos() / (1.0 - base.es * lat2.sin().powi(2)).sqrt();
        let n = (m1 * m1 - m2 * m2) / (alpha2 - alpha1);
        let c = m1 * m1 + n * alpha1;
        let a0 = alpha(&base, base.lat_origin);
        let ro0 = base.semi_major * (c - n * a0).sqrt() / n;

        Ok(Albers {
            base,
            n,
            c,
            ro0,
            direction: Direction::Fwd,
        })
    }

    fn ro(&self, a: f64) -> f64 {
        self.base.semi_major * (self.c - self.n * a).sqrt() / self.n
    }

    // ----- F O R W A R D -----------------------------------------------------------

    fn radians_to_meters(&self, lon: f64, lat: f64) -> Result<(f64, f64), Error> {
        let ro = self.ro(alpha(&self.base, lat));
        let theta = self.n * (lon - self.base.central_meridian);
        Ok((ro * theta.sin(), self.ro0 - ro * theta.cos()))
    }

    // ----- I N V E R S E -----------------------------------------------------------

    fn meters_to_radians(&self, x: f64, y: f64) -> Result<(f64, f64), Error> {
        let b = &self.base;
        let theta = (x / (self.ro0 - y)).atan();
        let ro = (x * x + (self.ro0 - y).powi(2)).sqrt();
        let q = (self.c - ro * ro * self.n * self.n / (b.semi_major * b.semi_major)) / self.n;

        let mut lat = (q * 0.5).asin();
        let mut prev = f64::MAX;
        let mut iterations = 0;
        while (lat - prev).abs() > 1e-6 {
            prev = lat;
            let sin = lat.sin();
            let e2sin2 = b.es * sin * sin;
            lat += ((1.0 - e2sin2).powi(2) / (2.0 * lat.cos()))
                * (q / (1.0 - b.es) - sin / (1.0 - e2sin2)
                    + 1.0 / (2.0 * b.e) * ((1.0 - b.e * sin) / (1.0 + b.e * sin)).ln());
            iterations += 1;
            if iterations > 25 {
                return Err(Error::NoConvergence("authalic latitude iteration"));
            }
        }
        let lon = b.central_meridian + theta / self.n;
        Ok((lon, lat))
    }
}

/// The authalic-latitude auxiliary (Snyder 3-12), scaled by (1 - es)
fn alpha(base: &ProjectionBase, lat: f64) -> f64 {
    let sin = lat.sin();
    let sinsq = sin * sin;
    (1.0 - base.es)
        * (sin / (1.0 - base.es * sinsq)
            - 1.0 / (2.0 * base.e) * ((1.0 - base.e * sin) / (1.0 + base.e * sin)).ln())
}

impl Transform for Albers {
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

    // Conterminous US parameters on GRS80
    fn conus() -> ParameterSet {
        ParameterSet::from_pairs([
            ("semi_major", 6_378_137.0),
            ("semi_minor", 6_356_752.314_140_356),
            ("unit", 1.0),
            ("central_meridian", -96.0),
            ("latitude_of_origin", 23.0),
            ("standard_parallel_1", 29.5),
            ("standard_parallel_2", 45.5),
            ("false_easting", 0.0),
            ("false_northing", 0.0),
        ])
    }

    #[test]
    fn origin_maps_to_false_origin() -> Result<(), Error> {
        let albers = Albers::new(&conus())?;
        let p = albers.apply(&[-96.0, 23.0])?;
        assert_float_eq!(p[0], 0.0, abs <= 1e-6);
        assert_float_eq!(p[1], 0.0, abs <= 1e-6);
        Ok(())
    }

    #[test]
    fn roundtrip() -> Result<(), Error> {
        let albers = Albers::new(&conus())?;
        let inv = albers.inverse()?;
        for p in [[-96.0, 38.0], [-122.4, 37.8], [-75.2, 40.0], [-96.0, 23.0]] {
            let q = albers.apply(&p)?;
            let back = inv.apply(&q)?;
            assert_float_eq!(back[0], p[0], abs <= 1e-6);
            assert_float_eq!(back[1], p[1], abs <= 1e-6);
        }
        Ok(())
    }

    #[test]
    fn rejects_mirrored_standard_parallels() {
        let degenerate = conus()
            .with("standard_parallel_1", 30.0)
            .with("standard_parallel_2", -30.0);
        assert!(Albers::new(&degenerate).is_err());
    }
}
