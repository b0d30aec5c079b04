//! Conversion between geodetic (longitude, latitude, ellipsoidal height)
//! and earth-centered cartesian (X, Y, Z) coordinates, with the
//! non-iterative Bowring-style reverse step.

use crate::authoring::*;
use crate::transform::{check_input, height};
use std::f64::consts::FRAC_PI_2;

const AD_C: f64 = 1.002_600_0;
// cos(67.5 degrees)
const COS_67P5: f64 = 0.382_683_432_365_089_77;

/// Geodetic (degrees, metres) to geocentric cartesian (metres), or the
/// reverse when tagged [`Direction::Inv`]
#[derive(Clone, Debug)]
pub struct GeocentricTransform {
    semi_major: f64,
    semi_minor: f64,
    /// First eccentricity squared
    es: f64,
    /// Second eccentricity squared
    ses: f64,
    direction: Direction,
}

impl GeocentricTransform {
    pub fn new(semi_major: f64, semi_minor: f64) -> Result<GeocentricTransform, Error> {
        if !(semi_major > 0.0 && semi_minor > 0.0 && semi_minor <= semi_major) {
            return Err(Error::General(
                "ellipsoid axes must be positive with semi_minor <= semi_major",
            ));
        }
        let a2 = semi_major * semi_major;
        let b2 = semi_minor * semi_minor;
        Ok(GeocentricTransform {
            semi_major,
            semi_minor,
            es: 1.0 - b2 / a2,
            ses: (a2 - b2) / b2,
            direction: Direction::Fwd,
        })
    }

    pub fn for_ellipsoid(ellipsoid: &Ellipsoid) -> Result<GeocentricTransform, Error> {
        GeocentricTransform::new(ellipsoid.semi_major_axis(), ellipsoid.semi_minor_axis())
    }

    // ----- F O R W A R D -----------------------------------------------------------

    /// Geodetic to cartesian: closed form
    fn geodetic_to_cartesian(&self, point: &[f64]) -> Vec<f64> {
        let lon = point[0].to_radians();
        let lat = point[1].to_radians();
        let h = height(point, 2);

        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        // Radius of curvature in the prime vertical
        let v = self.semi_major / (1.0 - self.es * sin_lat * sin_lat).sqrt();

        vec![
            (v + h) * cos_lat * lon.cos(),
            (v + h) * cos_lat * lon.sin(),
            ((1.0 - self.es) * v + h) * sin_lat,
        ]
    }

    // ----- I N V E R S E -----------------------------------------------------------

    /// Cartesian to geodetic: Toms' refinement of Bowring's method, a
    /// single-pass approximation good to centimetre level in height and
    /// a few hundredths of a microdegree in latitude
    fn cartesian_to_geodetic(&self, point: &[f64]) -> Vec<f64> {
        let x = point[0];
        let y = point[1];
        let z = height(point, 2);

        if x == 0.0 && y == 0.0 && z == 0.0 {
            // The earth's center: conventionally on the polar axis
            return vec![0.0, 90.0, -self.semi_minor];
        }

        let mut at_pole = false;
        let lon = if x != 0.0 {
            y.atan2(x)
        } else if y > 0.0 {
            FRAC_PI_2
        } else if y < 0.0 {
            -FRAC_PI_2
        } else {
            at_pole = true;
            0.0
        };

        let w2 = x * x + y * y;
        let w = w2.sqrt();
        let t0 = z * AD_C;
        let s0 = (t0 * t0 + w2).sqrt();
        let sin_b0 = t0 / s0;
        let cos_b0 = w / s0;
        let sin3_b0 = sin_b0 * sin_b0 * sin_b0;
        let t1 = z + self.semi_minor * self.ses * sin3_b0;
        let sum = w - self.semi_major * self.es * cos_b0 * cos_b0 * cos_b0;
        let s1 = (t1 * t1 + sum * sum).sqrt();
        let sin_p1 = t1 / s1;
        let cos_p1 = sum / s1;
        let rn = self.semi_major / (1.0 - self.es * sin_p1 * sin_p1).sqrt();

        let h = if cos_p1 >= COS_67P5 {
            w / cos_p1 - rn
        } else if cos_p1 <= -COS_67P5 {
            w / -cos_p1 - rn
        } else {
            z / sin_p1 + rn * (self.es - 1.0)
        };

        let lat = if at_pole {
            if z > 0.0 {
                FRAC_PI_2
            } else {
                -FRAC_PI_2
            }
        } else {
            (sin_p1 / cos_p1).atan()
        };

        vec![lon.to_degrees(), lat.to_degrees(), h]
    }
}

impl Transform for GeocentricTransform {
    fn dim_source(&self) -> usize {
        3
    }

    fn dim_target(&self) -> usize {
        3
    }

    fn apply(&self, point: &[f64]) -> Result<Vec<f64>, Error> {
        check_input(point, 3)?;
        Ok(match self.direction {
            Direction::Fwd => self.geodetic_to_cartesian(point),
            Direction::Inv => self.cartesian_to_geodetic(point),
        })
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

    #[test]
    fn forward() -> Result<(), Error> {
        let geoc = GeocentricTransform::for_ellipsoid(&Ellipsoid::wgs84())?;

        // On the equator at the prime meridian, the X axis pierces the
        // ellipsoid at the semi-major axis
        let p = geoc.apply(&[0.0, 0.0, 0.0])?;
        assert_float_eq!(p[0], 6_378_137.0, abs <= 1e-6);
        assert_float_eq!(p[1], 0.0, abs <= 1e-6);
        assert_float_eq!(p[2], 0.0, abs <= 1e-6);

        // At the pole, Z is the semi-minor axis
        let p = geoc.apply(&[0.0, 90.0, 0.0])?;
        assert_float_eq!(p[2], 6_356_752.314_245_18, abs <= 1e-6);

        // Height is along the ellipsoid normal
        let p = geoc.apply(&[0.0, 0.0, 100.0])?;
        assert_float_eq!(p[0], 6_378_237.0, abs <= 1e-6);
        Ok(())
    }

    #[test]
    fn roundtrip() -> Result<(), Error> {
        let geoc = GeocentricTransform::for_ellipsoid(&Ellipsoid::wgs84())?;
        let inv = geoc.inverse()?;

        for p in [
            [12.0, 55.0, 100.0],
            [-122.45, 37.8, 0.0],
            [151.2, -33.9, 25.0],
            [0.0, 89.999, 10.0],
        ] {
            let q = geoc.apply(&p)?;
            let r = inv.apply(&q)?;
            // The single-pass reverse step leaves a few times 1e-8 degrees
            // in latitude and a few millimetres in height
            assert_float_eq!(r[0], p[0], abs <= 1e-7);
            assert_float_eq!(r[1], p[1], abs <= 1e-7);
            assert_float_eq!(r[2], p[2], abs <= 1e-2);
        }
        Ok(())
    }

    #[test]
    fn inverse_edge_cases() -> Result<(), Error> {
        let inv = GeocentricTransform::for_ellipsoid(&Ellipsoid::wgs84())?.inverse()?;

        // On the polar axis, longitude collapses to zero
        let p = inv.apply(&[0.0, 0.0, 6_356_752.314_245_18])?;
        assert_float_eq!(p[1], 90.0, abs <= 1e-9);
        assert_float_eq!(p[2], 0.0, abs <= 1e-3);

        // The center of the earth
        let p = inv.apply(&[0.0, 0.0, 0.0])?;
        assert_eq!(p[0], 0.0);
        assert_eq!(p[1], 90.0);
        assert_float_eq!(p[2], -6_356_752.314_245_18, abs <= 1e-6);
        Ok(())
    }

    #[test]
    fn missing_height_means_zero() -> Result<(), Error> {
        let geoc = GeocentricTransform::for_ellipsoid(&Ellipsoid::wgs84())?;
        let with = geoc.apply(&[12.0, 55.0, 0.0])?;
        let without = geoc.apply(&[12.0, 55.0])?;
        let with_nan = geoc.apply(&[12.0, 55.0, f64::NAN])?;
        assert_eq!(with, without);
        assert_eq!(with, with_nan);
        Ok(())
    }
}
