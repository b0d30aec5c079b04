//! The seven parameter Helmert (Bursa-Wolf) datum shift between two
//! geocentric cartesian frames, in the small-angle linearization.

use crate::authoring::*;
use crate::transform::{check_input, height};

/// A position-vector Helmert shift built from a datum's Bursa-Wolf
/// parameters. Operates on geocentric cartesian coordinates in metres
#[derive(Clone, Debug)]
pub struct DatumTransform {
    /// `[scale, rx, ry, rz, dx, dy, dz]`, rotations in radians and
    /// pre-multiplied by the scale
    v: [f64; 7],
    direction: Direction,
}

impl DatumTransform {
    pub fn new(info: &Wgs84ConversionInfo) -> DatumTransform {
        DatumTransform {
            v: info.helmert_constants(),
            direction: Direction::Fwd,
        }
    }

    fn forward(&self, x: f64, y: f64, z: f64) -> Vec<f64> {
        let v = &self.v;
        vec![
            v[0] * (x - v[3] * y + v[2] * z) + v[4],
            v[0] * (v[3] * x + y - v[1] * z) + v[5],
            v[0] * (-v[2] * x + v[1] * y + z) + v[6],
        ]
    }

    /// First-order inverse: negating the linearized rotation and scale
    /// terms, consistent with the small-angle approximation itself
    fn reverse(&self, x: f64, y: f64, z: f64) -> Vec<f64> {
        let v = &self.v;
        let scale = 1.0 - (v[0] - 1.0);
        vec![
            scale * (x + v[3] * y - v[2] * z) - v[4],
            scale * (-v[3] * x + y + v[1] * z) - v[5],
            scale * (v[2] * x - v[1] * y + z) - v[6],
        ]
    }
}

impl Transform for DatumTransform {
    fn dim_source(&self) -> usize {
        3
    }

    fn dim_target(&self) -> usize {
        3
    }

    fn apply(&self, point: &[f64]) -> Result<Vec<f64>, Error> {
        check_input(point, 3)?;
        let (x, y, z) = (point[0], point[1], height(point, 2));
        Ok(match self.direction {
            Direction::Fwd => self.forward(x, y, z),
            Direction::Inv => self.reverse(x, y, z),
        })
    }

    fn inverse(&self) -> Result<Box<dyn Transform>, Error> {
        let mut flipped = self.clone();
        flipped.direction = self.direction.opposite();
        Ok(Box::new(flipped))
    }
}

// ----- T E S T S ---------------------------------------------------------------------
