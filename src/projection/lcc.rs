//! The Lambert conformal conic projection with two standard parallels,
//! the standard choice for mid-latitude regions of large east-west extent.

use super::{adjust_lon, msfnz, phi2z, tsfnz, ProjectionBase, EPSLN};
use crate::authoring::*;
use crate::transform::check_input;
use std::f64::consts::FRAC_PI_2;

#[derive(Clone, Debug)]
pub struct LambertConformalConic {
    base: ProjectionBase,
    /// Cone constant: ratio of the angle between meridians on the cone
    /// to the angle on the ellipsoid
    ns: f64,
    f0: f64,
    /// Radius of the latitude-of-origin parallel on the cone
    rh: f64,
    direction: Direction,
}

impl LambertConformalConic {
    pub fn new(params: &ParameterSet) -> Result<LambertConformalConic, Error> {
        let base = ProjectionBase::new(params)?;
        let lat1 = params.value("standard_parallel_1", &[])?.to_radians();
        let lat2 = params.value("standard_parallel_2", &[])?.to_radians();

        if (lat1 + lat2).abs() < EPSLN {
            return Err(Error::General(
                "equal latitudes for standard parallels on opposite sides of equator",
            ));
        }

        let ms1 = msfnz(base.e, lat1.sin(), lat1.cos());
        let ts1 = tsfnz(base.e, lat1, lat1.sin());
        let ms2 = msfnz(base.e, lat2.sin(), lat2.cos());
        let ts2 = tsfnz(base.e, lat2, lat2.sin());
        let ts0 = tsfnz(base.e, base.lat_origin, base.lat_origin.sin());

        let ns = if (lat1 - lat2).abs() > EPSLN {
            (ms1 / ms2).ln() / (ts1 / ts2).ln()
        } else {
            lat1.sin()
        };
        let f0 = ms1 / (ns * ts1.powf(ns));
        let rh = base.semi_major * f0 * ts0.powf(ns);

        Ok(LambertConformalConic {
            base,
            ns,
            f0,
            rh,
            direction: Direction::Fwd,
        })
    }

    // ----- F O R W A R D -----------------------------------------------------------

    fn radians_to_meters(&self, lon: f64, lat: f64) -> Result<(f64, f64), Error> {
        let b = &self.base;
        let con = (lat.abs() - FRAC_PI_2).abs();
        let rh1 = if con > EPSLN {
            let ts = tsfnz(b.e, lat, lat.sin());
            b.semi_major * self.f0 * ts.powf(self.ns)
        } else {
            // At a pole: only the pole the cone opens towards projects
            if lat * self.ns <= 0.0 {
                return Err(Error::General("point projects into infinity"));
            }
            0.0
        };
        let theta = self.ns * adjust_lon(lon - b.central_meridian);
        Ok((rh1 * theta.sin(), self.rh - rh1 * theta.cos()))
    }

    // ----- I N V E R S E -----------------------------------------------------------

    fn meters_to_radians(&self, x: f64, y: f64) -> Result<(f64, f64), Error> {
        let b = &self.base;
        let dy = self.rh - y;
        let (rh1, con) = if self.ns > 0.0 {
            ((x * x + dy * dy).sqrt(), 1.0)
        } else {
            (-(x * x + dy * dy).sqrt(), -1.0)
        };

        let theta = if rh1 != 0.0 {
            (con * x).atan2(con * dy)
        } else {
            0.0
        };

        let lat = if rh1 != 0.0 || self.ns > 0.0 {
            let ts = (rh1 / (b.semi_major * self.f0)).powf(1.0 / self.ns);
            phi2z(b.e, ts)?
        } else {
            -FRAC_PI_2
        };
        let lon = adjust_lon(theta / self.ns + b.central_meridian);
        Ok((lon, lat))
    }
}

impl Transform for LambertConformalConic {
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
