// Unit primitives shared by every mesh in the scene. Pure data, no wgpu.

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Index range of one primitive inside the shared buffers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Primitive {
    pub first_index: u32,
    pub index_count: u32,
    pub base_vertex: i32,
}

// (normal, u, v) with u x v == normal, so quads wind CCW seen from outside.
const CUBE_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
];

fn push_quad(
    vertices: &mut Vec<Vertex>,
    indices: &mut Vec<u16>,
    center: [f32; 3],
    n: [f32; 3],
    u: [f32; 3],
    v: [f32; 3],
) {
    let base = vertices.len() as u16;
    for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
        vertices.push(Vertex {
            position: [
                center[0] + u[0] * su + v[0] * sv,
                center[1] + u[1] * su + v[1] * sv,
                center[2] + u[2] * su + v[2] * sv,
            ],
            normal: n,
        });
    }
    indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

/// Unit cube centred on the origin, 24 vertices with flat face normals.
pub fn unit_cube() -> (Vec<Vertex>, Vec<u16>) {
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (n, u, v) in CUBE_FACES {
        let center = [n[0] * 0.5, n[1] * 0.5, n[2] * 0.5];
        push_quad(&mut vertices, &mut indices, center, n, u, v);
    }
    (vertices, indices)
}

/// Unit quad in the XY plane facing +Z.
pub fn unit_plane() -> (Vec<Vertex>, Vec<u16>) {
    let mut vertices = Vec::with_capacity(4);
    let mut indices = Vec::with_capacity(6);
    push_quad(
        &mut vertices,
        &mut indices,
        [0.0; 3],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
    );
    (vertices, indices)
}

/// Concatenate cube and plane into one vertex/index pair.
pub fn primitive_buffers() -> (Vec<Vertex>, Vec<u16>, Primitive, Primitive) {
    let (mut vertices, mut indices) = unit_cube();
    let cube = Primitive {
        first_index: 0,
        index_count: indices.len() as u32,
        base_vertex: 0,
    };
    let (plane_v, plane_i) = unit_plane();
    let plane = Primitive {
        first_index: indices.len() as u32,
        index_count: plane_i.len() as u32,
        base_vertex: vertices.len() as i32,
    };
    vertices.extend(plane_v);
    indices.extend(plane_i);
    (vertices, indices, cube, plane)
}
