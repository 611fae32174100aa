use glam::{Mat3, Mat4, Vec3, Vec4};

use super::MatrixRows;

/// Right-handed perspective projection mapping view depth `[-near, -far]`
/// onto clip `z` in `[-1, 1]`.
///
/// `fovy` is the full vertical field of view in radians.
pub fn perspective(aspect: f32, fovy: f32, near: f32, far: f32) -> Mat4 {
    let y_scale = 1.0 / (fovy * 0.5).tan();
    let x_scale = y_scale / aspect;
    let z_range = far - near;
    let z_scale = -(far + near) / z_range;
    let wz_scale = -2.0 * far * near / z_range;

    Mat4::from_rows([
        Vec4::new(x_scale, 0.0, 0.0, 0.0),
        Vec4::new(0.0, y_scale, 0.0, 0.0),
        Vec4::new(0.0, 0.0, z_scale, wz_scale),
        Vec4::new(0.0, 0.0, -1.0, 0.0),
    ])
}

/// Rotation of `angle` radians about `axis` (expected to be unit length).
pub fn rotation3(axis: Vec3, angle: f32) -> Mat3 {
    let (s, c) = angle.sin_cos();
    let t = 1.0 - c;
    let Vec3 { x, y, z } = axis;

    Mat3::from_rows([
        Vec3::new(t * x * x + c, t * x * y - z * s, t * x * z + y * s),
        Vec3::new(t * x * y + z * s, t * y * y + c, t * y * z - x * s),
        Vec3::new(t * x * z - y * s, t * y * z + x * s, t * z * z + c),
    ])
}

/// Homogeneous form of [`rotation3`].
pub fn rotation(axis: Vec3, angle: f32) -> Mat4 {
    Mat4::from_mat3(rotation3(axis, angle))
}

/// Homogeneous translation by `t`.
pub fn translation(t: Vec3) -> Mat4 {
    Mat4::from_rows([
        Vec4::new(1.0, 0.0, 0.0, t.x),
        Vec4::new(0.0, 1.0, 0.0, t.y),
        Vec4::new(0.0, 0.0, 1.0, t.z),
        Vec4::new(0.0, 0.0, 0.0, 1.0),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn translation_moves_points_not_directions() {
        let m = translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m.transform_point3(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m.transform_vector3(Vec3::X), Vec3::X);
    }

    #[test]
    fn rotation_about_z_maps_x_to_y() {
        let m = rotation3(Vec3::Z, FRAC_PI_2);
        assert_abs_diff_eq!(m * Vec3::X, Vec3::Y, epsilon = 1e-6);
        assert_abs_diff_eq!(m * Vec3::Y, -Vec3::X, epsilon = 1e-6);
    }

    #[test]
    fn rotation_agrees_with_glam() {
        let axis = Vec3::new(1.0, 2.0, -0.5).normalize();
        assert_abs_diff_eq!(rotation3(axis, 0.7), Mat3::from_axis_angle(axis, 0.7), epsilon = 1e-6);
        assert_abs_diff_eq!(rotation(axis, 0.7), Mat4::from_axis_angle(axis, 0.7), epsilon = 1e-6);
    }

    #[test]
    fn homogeneous_rotation_has_identity_border() {
        let m = rotation(Vec3::Y, PI / 3.0);
        assert_eq!(m.row(3), Vec4::W);
        assert_eq!(m.col(3), Vec4::W);
    }

    #[test]
    fn perspective_agrees_with_glam_rh_gl() {
        let m = perspective(16.0 / 9.0, 1.0, 0.1, 100.0);
        let expected = Mat4::perspective_rh_gl(1.0, 16.0 / 9.0, 0.1, 100.0);
        assert_abs_diff_eq!(m, expected, epsilon = 1e-5);
    }

    #[test]
    fn perspective_maps_near_and_far_planes() {
        let m = perspective(1.0, FRAC_PI_2, 1.0, 10.0);
        assert_abs_diff_eq!(m.project_point3(Vec3::new(0.0, 0.0, -1.0)).z, -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(m.project_point3(Vec3::new(0.0, 0.0, -10.0)).z, 1.0, epsilon = 1e-5);
    }
}
