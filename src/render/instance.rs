// Per-draw instance data packed for the scene shader. Pure glam, no wgpu.

use glam::{Mat3, Mat4, Vec3};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
    pub color: [f32; 4],
    pub params: [f32; 4],
}

#[inline]
pub fn srgb_to_linear(c: Vec3) -> Vec3 {
    c.powf(2.2)
}

/// Inverse-transpose of the upper 3x3, falling back to the plain 3x3 for
/// degenerate (zero-scale) transforms.
#[inline]
pub fn normal_matrix(model: Mat4) -> Mat3 {
    let m = Mat3::from_mat4(model);
    if m.determinant().abs() < 1e-12 {
        return m;
    }
    m.inverse().transpose()
}

impl InstanceRaw {
    /// `world` is the node transform; `extent` scales the unit primitive.
    pub fn new(
        world: Mat4,
        extent: Vec3,
        color_srgb: Vec3,
        opacity: f32,
        shininess: f32,
        unlit: bool,
    ) -> Self {
        let model = world * Mat4::from_scale(extent);
        let n = normal_matrix(model);
        let color = srgb_to_linear(color_srgb);
        Self {
            model: model.to_cols_array_2d(),
            normal: [
                n.x_axis.extend(0.0).to_array(),
                n.y_axis.extend(0.0).to_array(),
                n.z_axis.extend(0.0).to_array(),
            ],
            color: [color.x, color.y, color.z, opacity.clamp(0.0, 1.0)],
            params: [shininess, if unlit { 1.0 } else { 0.0 }, 0.0, 0.0],
        }
    }
}
