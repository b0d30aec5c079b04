//! General affine transform over an (N+1) x (M+1) augmented matrix, with
//! LUP-based inversion for arbitrary dimensionality.

use crate::authoring::*;
use crate::transform::check_input;

/// An affine transform: the point, taken as a homogeneous column vector,
/// is multiplied by the augmented matrix. The last matrix row is the
/// homogeneous identity row
#[derive(Clone, Debug, PartialEq)]
pub struct AffineTransform {
    matrix: Vec<Vec<f64>>,
}

impl AffineTransform {
    pub fn new(matrix: Vec<Vec<f64>>) -> Result<AffineTransform, Error> {
        if matrix.len() < 2 {
            return Err(Error::General(
                "transformation matrix must have at least 2 rows",
            ));
        }
        let cols = matrix[0].len();
        if cols < 2 {
            return Err(Error::General(
                "transformation matrix must have at least 2 columns",
            ));
        }
        if matrix.iter().any(|row| row.len() != cols) {
            return Err(Error::General("transformation matrix is not rectangular"));
        }
        let last = &matrix[matrix.len() - 1];
        let homogeneous =
            last[cols - 1] == 1.0 && last[..cols - 1].iter().all(|v| *v == 0.0);
        if !homogeneous {
            return Err(Error::General(
                "the last matrix row must be the homogeneous identity row",
            ));
        }
        Ok(AffineTransform { matrix })
    }

    /// The classical 2D affine given by its six defining elements
    pub fn new_2d(
        m00: f64,
        m01: f64,
        m02: f64,
        m10: f64,
        m11: f64,
        m12: f64,
    ) -> AffineTransform {
        AffineTransform {
            matrix: vec![
                vec![m00, m01, m02],
                vec![m10, m11, m12],
                vec![0., 0., 1.],
            ],
        }
    }

    #[must_use]
    pub fn dim_source(&self) -> usize {
        self.matrix[0].len() - 1
    }

    #[must_use]
    pub fn dim_target(&self) -> usize {
        self.matrix.len() - 1
    }

    #[must_use]
    pub fn matrix(&self) -> &[Vec<f64>] {
        &self.matrix
    }

    /// The inverted transform. Fails for non-square matrices and, via
    /// the pivot search, for singular ones
    pub fn inverted(&self) -> Result<AffineTransform, Error> {
        if self.matrix.len() != self.matrix[0].len() {
            return Err(Error::General(
                "only square affine matrices can be inverted",
            ));
        }
        AffineTransform::new(invert_matrix(&self.matrix)?)
    }

    /// The `PARAM_MT["Affine", ...]` form, every matrix element spelled out
    #[must_use]
    pub fn wkt(&self) -> String {
        let rows = self.matrix.len();
        let cols = self.matrix[0].len();
        let mut wkt = format!(
            "PARAM_MT[\"Affine\", PARAMETER[\"num_row\", {rows}], PARAMETER[\"num_col\", {cols}]"
        );
        for (r, row) in self.matrix.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                wkt += &format!(", PARAMETER[\"elt_{r}_{c}\", {value}]");
            }
        }
        wkt + "]"
    }
}

impl Transform for AffineTransform {
    fn dim_source(&self) -> usize {
        self.dim_source()
    }

    fn dim_target(&self) -> usize {
        self.dim_target()
    }

    fn apply(&self, point: &[f64]) -> Result<Vec<f64>, Error> {
        let dim_source = self.dim_source();
        check_input(point, dim_source)?;
        if point.len() < dim_source {
            return Err(Error::DimensionMismatch {
                expected: dim_source,
                found: point.len(),
            });
        }

        let mut out = Vec::with_capacity(self.dim_target());
        for row in &self.matrix[..self.dim_target()] {
            let mut value = row[dim_source];
            for (col, p) in point[..dim_source].iter().enumerate() {
                value += row[col] * p;
            }
            out.push(value);
        }
        Ok(out)
    }

    fn inverse(&self) -> Result<Box<dyn Transform>, Error> {
        Ok(Box::new(self.inverted()?))
    }

    fn wkt(&self) -> Result<String, Error> {
        Ok(self.wkt())
    }
}

// ----- L U P   D E C O M P O S I T I O N ---------------------------------------------

/// In-place LUP decomposition with partial (max-absolute-value row)
/// pivoting. Returns the combined LU factors and the row permutation
fn lup_decompose(mut a: Vec<Vec<f64>>) -> Result<(Vec<Vec<f64>>, Vec<usize>), Error> {
    let n = a.len();
    let mut perm: Vec<usize> = (0..n).collect();

    for k in 0..n {
        let mut p = 0.0;
        let mut kp = k;
        for (i, row) in a.iter().enumerate().take(n).skip(k) {
            if row[k].abs() > p {
                p = row[k].abs();
                kp = i;
            }
        }
        if p == 0.0 {
            return Err(Error::SingularMatrix);
        }
        perm.swap(k, kp);
        a.swap(k, kp);

        for i in k + 1..n {
            a[i][k] /= a[k][k];
            for j in k + 1..n {
                let delta = a[i][k] * a[k][j];
                a[i][j] -= delta;
            }
        }
    }
    Ok((a, perm))
}

/// Solve LUx = Pb by forward, then backward substitution
fn lup_solve(lu: &[Vec<f64>], perm: &[usize], b: &[f64]) -> Vec<f64> {
    let n = lu.len();
    let mut y = vec![0.0; n];
    for i in 0..n {
        let suml: f64 = (0..i).map(|j| lu[i][j] * y[j]).sum();
        y[i] = b[perm[i]] - suml;
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sumu: f64 = (i + 1..n).map(|j| lu[i][j] * x[j]).sum();
        x[i] = (y[i] - sumu) / lu[i][i];
    }
    x
}

/// The full inverse, solved once per identity-matrix column
fn invert_matrix(a: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, Error> {
    let n = a.len();
    let (lu, perm) = lup_decompose(a.to_vec())?;

    let mut inverse = vec![vec![0.0; n]; n];
    for col in 0..n {
        let mut e = vec![0.0; n];
        e[col] = 1.0;
        let solution = lup_solve(&lu, &perm, &e);
        for (row, value) in solution.into_iter().enumerate() {
            inverse[row][col] = value;
        }
    }
    Ok(inverse)
}

// ----- T E S T S ---------------------------------------------------------------------
