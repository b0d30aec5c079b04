//! Ordered composition of transforms: a pipeline that applies each leg in
//! turn, and whose inverse is the reversed sequence of inverted legs.

use crate::authoring::*;

/// A chain of transforms applied left to right
#[derive(Debug)]
pub struct Concatenated {
    legs: Vec<Box<dyn Transform>>,
}

impl Concatenated {
    /// Adjacent legs must agree on dimensionality. The one sanctioned
    /// mismatch is the 2/3 seam between a planar operation and a
    /// three dimensional one, where the height is implied zero going up
    /// and passed through going down
    pub fn new(legs: Vec<Box<dyn Transform>>) -> Result<Concatenated, Error> {
        if legs.is_empty() {
            return Err(Error::General("a concatenated transform needs at least one leg"));
        }
        for window in legs.windows(2) {
            let out = window[0].dim_target();
            let into = window[1].dim_source();
            let seam_2_3 = (out == 2 || out == 3) && (into == 2 || into == 3);
            if out != into && !seam_2_3 {
                return Err(Error::DimensionMismatch {
                    expected: out,
                    found: into,
                });
            }
        }
        Ok(Concatenated { legs })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.legs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }
}

impl Transform for Concatenated {
    fn dim_source(&self) -> usize {
        self.legs[0].dim_source()
    }

    fn dim_target(&self) -> usize {
        self.legs[self.legs.len() - 1].dim_target()
    }

    fn apply(&self, point: &[f64]) -> Result<Vec<f64>, Error> {
        let mut current = point.to_vec();
        for leg in &self.legs {
            current = leg.apply(&current)?;
        }
        Ok(current)
    }

    fn inverse(&self) -> Result<Box<dyn Transform>, Error> {
        let legs = self
            .legs
            .iter()
            .rev()
            .map(|leg| leg.inverse())
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(Box::new(Concatenated::new(legs)?))
    }
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::AffineTransform;
    use float_eq::assert_float_eq;

    #[test]
    fn applies_legs_in_order() -> Result<(), Error> {
        // Scale by 2, then shift by (1, 1): order matters
        let scale = AffineTransform::new_2d(2., 0., 0., 0., 2., 0.);
        let shift = AffineTransform::new_2d(1., 0., 1., 0., 1., 1.);
        let chain = Concatenated::new(vec![Box::new(scale), Box::new(shift)])?;

        assert_eq!(chain.apply(&[3.0, 4.0])?, vec![7.0, 9.0]);

        let back = chain.inverse()?.apply(&[7.0, 9.0])?;
        assert_float_eq!(back[0], 3.0, abs <= 1e-12);
        assert_float_eq!(back[1], 4.0, abs <= 1e-12);
        Ok(())
    }

    #[test]
    fn planar_and_spatial_legs_mix() -> Result<(), Error> {
        // A 2D leg may feed a 3D one: the height is implied zero
        let planar = AffineTransform::new_2d(1., 0., 10., 0., 1., 0.);
        let spatial = GeocentricTransform::for_ellipsoid(&Ellipsoid::wgs84())?;
        let chain = Concatenated::new(vec![Box::new(planar), Box::new(spatial)])?;

        assert_eq!(chain.dim_source(), 2);
        assert_eq!(chain.dim_target(), 3);
        let p = chain.apply(&[2.0, 55.0])?;
        assert_eq!(p.len(), 3);
        Ok(())
    }

    #[test]
    fn rejects_incompatible_legs() -> Result<(), Error> {
        let planar = AffineTransform::new_2d(1., 0., 0., 0., 1., 0.);
        let four_d = AffineTransform::new(vec![
            vec![1., 0., 0., 0., 0.],
            vec![0., 1., 0., 0., 0.],
            vec![0., 0., 1., 0., 0.],
            vec![0., 0., 0., 1., 0.],
            vec![0., 0., 0., 0., 1.],
        ])?;
        let err = Concatenated::new(vec![Box::new(planar), Box::new(four_d)]);
        assert!(matches!(err, Err(Error::DimensionMismatch { .. })));

        assert!(Concatenated::new(Vec::new()).is_err());
        Ok(())
    }
}
