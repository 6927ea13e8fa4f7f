use glam::{DMat3, DVec3};
use nalgebra::{Matrix3, Vector3};

/// Convert a glam 3x3 matrix into a nalgebra matrix.
pub fn dmat3_to_matrix3(m: &DMat3) -> Matrix3<f64> {
    // both types are column-major
    Matrix3::from_column_slice(&m.to_cols_array())
}

/// Convert a nalgebra 3x3 matrix into a glam matrix.
pub fn matrix3_to_dmat3(m: &Matrix3<f64>) -> DMat3 {
    DMat3::from_cols(
        vector3_to_dvec3(&m.column(0).into_owned()),
        vector3_to_dvec3(&m.column(1).into_owned()),
        vector3_to_dvec3(&m.column(2).into_owned()),
    )
}

/// Convert a nalgebra 3-vector into a glam vector.
pub fn vector3_to_dvec3(v: &Vector3<f64>) -> DVec3 {
    DVec3::new(v.x, v.y, v.z)
}

/// Convert a glam vector into a nalgebra 3-vector.
pub fn dvec3_to_vector3(v: &DVec3) -> Vector3<f64> {
    Vector3::new(v.x, v.y, v.z)
}

/// Build a glam matrix from row-major nested arrays.
pub fn rows_to_dmat3(rows: &[[f64; 3]; 3]) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(rows[0][0], rows[1][0], rows[2][0]),
        DVec3::new(rows[0][1], rows[1][1], rows[2][1]),
        DVec3::new(rows[0][2], rows[1][2], rows[2][2]),
    )
}

/// Return the rows of a glam matrix as nested arrays.
pub fn dmat3_to_rows(m: &DMat3) -> [[f64; 3]; 3] {
    [
        m.row(0).to_array(),
        m.row(1).to_array(),
        m.row(2).to_array(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nalgebra_roundtrip() {
        let m = rows_to_dmat3(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        let na = dmat3_to_matrix3(&m);
        assert_eq!(na[(0, 1)], 2.0);
        assert_eq!(na[(2, 0)], 7.0);
        assert_eq!(matrix3_to_dmat3(&na), m);
    }

    #[test]
    fn test_rows() {
        let rows = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let m = rows_to_dmat3(&rows);
        assert_eq!(m.col(0), DVec3::new(1.0, 4.0, 7.0));
        assert_eq!(dmat3_to_rows(&m), rows);
    }
}
