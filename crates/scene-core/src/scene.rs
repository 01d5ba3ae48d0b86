//! Arena-backed scene graph.
//!
//! Nodes are only ever appended, either one at a time under an existing node
//! or by grafting a whole detached graph. Neither operation can introduce a
//! cycle, and node 0 is always the single root.

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(usize);

/// Local transform. Rotation is XYZ Euler radians: `x` is pitch, `y` is yaw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn rotated_x(mut self, radians: f32) -> Self {
        self.rotation.x = radians;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        let q = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_scale_rotation_translation(self.scale, q, self.position)
    }
}

/// Primitive geometry, sized in local units and centred on the node origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mesh {
    Cuboid { size: Vec3 },
    /// Lies in the local XY plane facing +Z.
    Plane { size: Vec2 },
}

impl Mesh {
    pub fn cuboid(w: f32, h: f32, d: f32) -> Self {
        Mesh::Cuboid {
            size: Vec3::new(w, h, d),
        }
    }

    pub fn plane(w: f32, h: f32) -> Self {
        Mesh::Plane {
            size: Vec2::new(w, h),
        }
    }

    /// Scale applied to the unit primitive of the same kind.
    pub fn extent(&self) -> Vec3 {
        match *self {
            Mesh::Cuboid { size } => size,
            Mesh::Plane { size } => size.extend(1.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shading {
    /// Ambient + diffuse + specular from the light set.
    Phong,
    /// Flat colour, ignores lights.
    Unlit,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub color: Vec3,
    pub shininess: f32,
    pub opacity: f32,
    pub transparent: bool,
    pub shading: Shading,
}

impl Material {
    pub fn phong(hex: u32, shininess: f32) -> Self {
        Self {
            color: rgb_from_hex(hex),
            shininess,
            opacity: 1.0,
            transparent: false,
            shading: Shading::Phong,
        }
    }

    pub fn unlit_transparent(hex: u32, opacity: f32) -> Self {
        Self {
            color: rgb_from_hex(hex),
            shininess: 0.0,
            opacity,
            transparent: true,
            shading: Shading::Unlit,
        }
    }

    pub fn is_blended(&self) -> bool {
        self.transparent || self.opacity < 1.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Ambient {
        color: Vec3,
        intensity: f32,
    },
    /// Shines from `position` toward the origin.
    Directional {
        color: Vec3,
        intensity: f32,
        position: Vec3,
    },
    Point {
        color: Vec3,
        intensity: f32,
        position: Vec3,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub name: &'static str,
    pub transform: Transform,
    pub mesh: Option<Mesh>,
    pub material: Option<MaterialId>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn group(name: &'static str, transform: Transform) -> Self {
        Self {
            name,
            transform,
            mesh: None,
            material: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn mesh(
        name: &'static str,
        transform: Transform,
        mesh: Mesh,
        material: MaterialId,
    ) -> Self {
        Self {
            mesh: Some(mesh),
            material: Some(material),
            ..Self::group(name, transform)
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// One mesh ready for submission, with its accumulated world transform.
#[derive(Clone, Copy, Debug)]
pub struct Drawable<'a> {
    pub world: Mat4,
    pub mesh: Mesh,
    pub material: &'a Material,
}

/// Id translation returned by [`SceneGraph::graft`].
#[derive(Clone, Copy, Debug)]
pub struct Graft {
    node_offset: usize,
    material_offset: usize,
}

impl Graft {
    pub fn node(&self, id: NodeId) -> NodeId {
        NodeId(id.0 + self.node_offset)
    }

    pub fn material(&self, id: MaterialId) -> MaterialId {
        MaterialId(id.0 + self.material_offset)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    materials: Vec<Material>,
}

impl SceneGraph {
    pub fn new(root_name: &'static str) -> Self {
        Self {
            nodes: vec![Node::group(root_name, Transform::default())],
            materials: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    pub fn material_mut(&mut self, id: MaterialId) -> &mut Material {
        &mut self.materials[id.0]
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        assert!(parent.0 < self.nodes.len(), "parent {parent:?} not in graph");
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Move every node of `subtree` into this graph, hanging its root under
    /// `parent`. Material references are rebased along with the nodes.
    pub fn graft(&mut self, parent: NodeId, subtree: SceneGraph) -> Graft {
        assert!(parent.0 < self.nodes.len(), "parent {parent:?} not in graph");
        let node_offset = self.nodes.len();
        let material_offset = self.materials.len();
        self.materials.extend(subtree.materials);
        for mut node in subtree.nodes {
            node.parent = match node.parent {
                Some(p) => Some(NodeId(p.0 + node_offset)),
                None => Some(parent),
            };
            for child in &mut node.children {
                child.0 += node_offset;
            }
            if let Some(m) = &mut node.material {
                m.0 += material_offset;
            }
            self.nodes.push(node);
        }
        self.nodes[parent.0].children.push(NodeId(node_offset));
        Graft {
            node_offset,
            material_offset,
        }
    }

    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut m = self.nodes[id.0].transform.matrix();
        let mut cursor = self.nodes[id.0].parent;
        while let Some(p) = cursor {
            m = self.nodes[p.0].transform.matrix() * m;
            cursor = self.nodes[p.0].parent;
        }
        m
    }

    /// Depth-first list of every mesh reachable from the root.
    pub fn drawables(&self) -> Vec<Drawable<'_>> {
        let mut out = Vec::new();
        let mut stack = vec![(self.root(), Mat4::IDENTITY)];
        while let Some((id, parent_world)) = stack.pop() {
            let node = &self.nodes[id.0];
            let world = parent_world * node.transform.matrix();
            if let (Some(mesh), Some(mat)) = (node.mesh, node.material) {
                out.push(Drawable {
                    world,
                    mesh,
                    material: &self.materials[mat.0],
                });
            }
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
        out
    }
}

#[inline]
pub fn rgb_from_hex(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_unpack_per_channel() {
        let c = rgb_from_hex(0x00ffaa);
        assert_eq!(c.x, 0.0);
        assert_eq!(c.y, 1.0);
        assert!((c.z - 170.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn graft_rebases_ids_and_materials() {
        let mut scene = SceneGraph::new("scene");
        let existing = scene.add_material(Material::phong(0xffffff, 10.0));
        let cube = Mesh::cuboid(1.0, 1.0, 1.0);
        scene.add_child(scene.root(), Node::mesh("a", Transform::default(), cube, existing));

        let mut sub = SceneGraph::new("group");
        let red = sub.add_material(Material::phong(0xff0000, 1.0));
        let plane = Mesh::plane(1.0, 1.0);
        let leaf = sub.add_child(sub.root(), Node::mesh("leaf", Transform::default(), plane, red));

        let graft = scene.graft(scene.root(), sub);
        let group = graft.node(NodeId(0));
        let leaf = graft.node(leaf);

        assert_eq!(scene.len(), 4);
        assert_eq!(scene.node(group).parent(), Some(scene.root()));
        assert_eq!(scene.node(leaf).parent(), Some(group));
        assert_eq!(scene.node(group).children(), &[leaf]);
        let mat = scene.node(leaf).material.unwrap();
        assert_eq!(scene.material(mat).color, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn world_matrix_accumulates_parent_transforms() {
        let mut scene = SceneGraph::new("scene");
        let lowered = Transform::at(Vec3::new(0.0, -0.5, 0.0));
        let group = scene.add_child(scene.root(), Node::group("g", lowered));
        let offset = Transform::at(Vec3::new(1.0, 1.0, 0.0));
        let child = scene.add_child(group, Node::group("c", offset));
        let p = scene.world_matrix(child).transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(1.0, 0.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn drawables_skip_groups_and_follow_hierarchy() {
        let mut scene = SceneGraph::new("scene");
        let m = scene.add_material(Material::phong(0x808080, 30.0));
        let group = scene.add_child(scene.root(), Node::group("g", Transform::at(Vec3::X)));
        let cube = Mesh::cuboid(1.0, 2.0, 3.0);
        scene.add_child(group, Node::mesh("box", Transform::default(), cube, m));
        let drawables = scene.drawables();
        assert_eq!(drawables.len(), 1);
        let origin = drawables[0].world.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::X).length() < 1e-6);
        assert_eq!(drawables[0].mesh.extent(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn yaw_rotates_about_vertical_axis() {
        let t = Transform {
            rotation: Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
            ..Transform::default()
        };
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }
}
