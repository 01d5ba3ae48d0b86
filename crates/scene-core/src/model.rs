//! The procedural laptop shown in the contact section.
//!
//! Built once per mount as a detached [`SceneGraph`] whose root is the laptop
//! group, then grafted under the scene root. Only the group's transform and
//! the display panel's material change afterwards.

use crate::constants::*;
use crate::scene::{Graft, Material, MaterialId, Mesh, Node, NodeId, SceneGraph, Transform};
use glam::Vec3;
use std::f32::consts::FRAC_PI_2;

const BODY_COLOR: u32 = 0x2c3e50;
const PANEL_COLOR: u32 = 0x34495e;
const SCREEN_COLOR: u32 = 0x00ffaa;
const KEY_COLOR: u32 = 0x95a5a6;
const SCREEN_TILT: f32 = -0.1;

/// Named handles into a freshly built model.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelParts {
    pub root: NodeId,
    pub body: NodeId,
    pub screen_back: NodeId,
    pub display_panel: NodeId,
    pub input_surface: NodeId,
    pub trackpad: NodeId,
    /// Row-major, `KEY_ROWS * KEY_COLUMNS` entries.
    pub keys: Vec<NodeId>,
    pub display_material: MaterialId,
}

/// A built, not yet attached, model.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelHandle {
    pub graph: SceneGraph,
    pub parts: ModelParts,
}

/// The model after it has been grafted into a scene. Ids refer to that scene.
#[derive(Clone, Debug, PartialEq)]
pub struct AttachedModel {
    pub parts: ModelParts,
    /// Rest position of the root, before any per-frame bob is applied.
    pub base_position: Vec3,
}

pub struct ProceduralModel;

impl ProceduralModel {
    /// Build the laptop. Deterministic: every call yields an identical graph.
    pub fn build() -> ModelHandle {
        let mut g = SceneGraph::new("laptop");
        let root = g.root();

        let body_mat = g.add_material(Material::phong(BODY_COLOR, 100.0));
        let back_mat = g.add_material(Material::phong(PANEL_COLOR, 100.0));
        let display_material =
            g.add_material(Material::unlit_transparent(SCREEN_COLOR, GLOW_BASE + GLOW_AMPLITUDE));
        let surface_mat = g.add_material(Material::phong(PANEL_COLOR, 50.0));
        let key_mat = g.add_material(Material::phong(KEY_COLOR, 30.0));
        let trackpad_mat = g.add_material(Material::phong(BODY_COLOR, 100.0));

        let body = g.add_child(
            root,
            Node::mesh("body", Transform::default(), Mesh::cuboid(3.0, 0.2, 2.0), body_mat),
        );
        let screen_back = g.add_child(
            root,
            Node::mesh(
                "screen-back",
                Transform::at(Vec3::new(0.0, 1.0, -0.9)).rotated_x(SCREEN_TILT),
                Mesh::cuboid(2.8, 2.0, 0.1),
                back_mat,
            ),
        );
        let display_panel = g.add_child(
            root,
            Node::mesh(
                "display-panel",
                Transform::at(Vec3::new(0.0, 1.0, -0.85)).rotated_x(SCREEN_TILT),
                Mesh::plane(2.4, 1.6),
                display_material,
            ),
        );
        let input_surface = g.add_child(
            root,
            Node::mesh(
                "input-surface",
                Transform::at(Vec3::new(0.0, 0.11, 0.0)).rotated_x(-FRAC_PI_2),
                Mesh::plane(2.6, 1.8),
                surface_mat,
            ),
        );

        let mut keys = Vec::with_capacity(KEY_ROWS * KEY_COLUMNS);
        for row in 0..KEY_ROWS {
            for col in 0..KEY_COLUMNS {
                let key = g.add_child(
                    root,
                    Node::mesh(
                        "key",
                        Transform::at(key_position(row, col)),
                        Mesh::cuboid(KEY_SIZE[0], KEY_SIZE[1], KEY_SIZE[2]),
                        key_mat,
                    ),
                );
                keys.push(key);
            }
        }

        let trackpad = g.add_child(
            root,
            Node::mesh(
                "trackpad",
                Transform::at(Vec3::new(0.0, 0.12, 0.5)).rotated_x(-FRAC_PI_2),
                Mesh::plane(1.0, 0.6),
                trackpad_mat,
            ),
        );

        ModelHandle {
            graph: g,
            parts: ModelParts {
                root,
                body,
                screen_back,
                display_panel,
                input_surface,
                trackpad,
                keys,
                display_material,
            },
        }
    }
}

impl ModelHandle {
    /// Graft under `parent` in `scene`, placing the model root at `offset`.
    pub fn attach(mut self, scene: &mut SceneGraph, parent: NodeId, offset: Vec3) -> AttachedModel {
        let root = self.parts.root;
        self.graph.node_mut(root).transform.position = offset;
        let graft = scene.graft(parent, self.graph);
        AttachedModel {
            parts: remap(&self.parts, &graft),
            base_position: offset,
        }
    }
}

/// Centre of the key at (`row`, `col`) in model space.
#[inline]
pub fn key_position(row: usize, col: usize) -> Vec3 {
    Vec3::new(
        KEY_ORIGIN_X + col as f32 * KEY_PITCH_X,
        KEY_TOP_Y,
        KEY_ORIGIN_Z + row as f32 * KEY_PITCH_Z,
    )
}

fn remap(parts: &ModelParts, graft: &Graft) -> ModelParts {
    ModelParts {
        root: graft.node(parts.root),
        body: graft.node(parts.body),
        screen_back: graft.node(parts.screen_back),
        display_panel: graft.node(parts.display_panel),
        input_surface: graft.node(parts.input_surface),
        trackpad: graft.node(parts.trackpad),
        keys: parts.keys.iter().map(|&k| graft.node(k)).collect(),
        display_material: graft.material(parts.display_material),
    }
}
