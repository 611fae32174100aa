use glam::{Mat3, Mat4, Vec3, Vec4};

/// Row-oriented access to column-major matrices.
///
/// Indices are zero-based: `element(0, 1)` is the first row, second column.
pub trait MatrixRows: Sized {
    type Row;

    fn from_rows(rows: Self::Row) -> Self;
    fn rows(&self) -> Self::Row;
    fn element(&self, row: usize, col: usize) -> f32;
    fn set_element(&mut self, row: usize, col: usize, value: f32);
}

impl MatrixRows for Mat3 {
    type Row = [Vec3; 3];

    fn from_rows([r0, r1, r2]: [Vec3; 3]) -> Self {
        Mat3::from_cols(r0, r1, r2).transpose()
    }

    fn rows(&self) -> [Vec3; 3] {
        [self.row(0), self.row(1), self.row(2)]
    }

    fn element(&self, row: usize, col: usize) -> f32 {
        self.col(col)[row]
    }

    fn set_element(&mut self, row: usize, col: usize, value: f32) {
        self.col_mut(col)[row] = value;
    }
}

impl MatrixRows for Mat4 {
    type Row = [Vec4; 4];

    fn from_rows([r0, r1, r2, r3]: [Vec4; 4]) -> Self {
        Mat4::from_cols(r0, r1, r2, r3).transpose()
    }

    fn rows(&self) -> [Vec4; 4] {
        [self.row(0), self.row(1), self.row(2), self.row(3)]
    }

    fn element(&self, row: usize, col: usize) -> f32 {
        self.col(col)[row]
    }

    fn set_element(&mut self, row: usize, col: usize, value: f32) {
        self.col_mut(col)[row] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_round_trip_through_column_storage() {
        let rows = [
            Vec4::new(1.0, 2.0, 3.0, 4.0),
            Vec4::new(5.0, 6.0, 7.0, 8.0),
            Vec4::new(9.0, 10.0, 11.0, 12.0),
            Vec4::new(13.0, 14.0, 15.0, 16.0),
        ];
        let m = Mat4::from_rows(rows);
        assert_eq!(m.rows(), rows);
        assert_eq!(m.col(0), Vec4::new(1.0, 5.0, 9.0, 13.0));
        assert_eq!(m.element(0, 3), 4.0);
        assert_eq!(m.element(3, 0), 13.0);
    }

    #[test]
    fn set_element_addresses_row_then_column() {
        let mut m = Mat3::IDENTITY;
        m.set_element(0, 2, 7.0);
        assert_eq!(m.row(0), Vec3::new(1.0, 0.0, 7.0));
        assert_eq!(m.col(2), Vec3::new(7.0, 0.0, 1.0));
    }

    #[test]
    fn upper_left_of_homogeneous_matrix() {
        let m = Mat4::from_rows([
            Vec4::new(1.0, 2.0, 3.0, 0.0),
            Vec4::new(4.0, 5.0, 6.0, 0.0),
            Vec4::new(7.0, 8.0, 9.0, 0.0),
            Vec4::W,
        ]);
        let ul = Mat3::from_mat4(m);
        assert_eq!(ul.rows(), [Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0), Vec3::new(7.0, 8.0, 9.0)]);
    }
}
