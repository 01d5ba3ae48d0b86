// Construction of the procedural laptop.

use scene_core::constants::{KEY_COLUMNS, KEY_ROWS};
use scene_core::*;

#[test]
fn build_is_deterministic() {
    let a = ProceduralModel::build();
    let b = ProceduralModel::build();
    assert_eq!(a.graph.len(), b.graph.len());
    assert_eq!(a.parts, b.parts);
    assert_eq!(a, b);
}

#[test]
fn named_parts_resolve_to_expected_nodes() {
    let model = ProceduralModel::build();
    let g = &model.graph;
    assert_eq!(g.node(model.parts.root).name, "laptop");
    assert_eq!(g.node(model.parts.body).name, "body");
    assert_eq!(g.node(model.parts.screen_back).name, "screen-back");
    assert_eq!(g.node(model.parts.display_panel).name, "display-panel");
    assert_eq!(g.node(model.parts.input_surface).name, "input-surface");
    assert_eq!(g.node(model.parts.trackpad).name, "trackpad");
    assert!(model.parts.keys.iter().all(|&k| g.node(k).name == "key"));
    assert_eq!(model.parts.keys.len(), KEY_ROWS * KEY_COLUMNS);
}

#[test]
fn every_part_hangs_directly_off_the_model_root() {
    let model = ProceduralModel::build();
    let g = &model.graph;
    assert_eq!(g.node(model.parts.root).parent(), None);
    assert_eq!(g.node(model.parts.root).children().len(), g.len() - 1);
    for &child in g.node(model.parts.root).children() {
        assert_eq!(g.node(child).parent(), Some(model.parts.root));
        assert!(g.node(child).mesh.is_some());
    }
}

#[test]
fn keys_lie_within_the_input_surface() {
    let model = ProceduralModel::build();
    let g = &model.graph;
    let surface = g.node(model.parts.input_surface);
    let Some(Mesh::Plane { size }) = surface.mesh else {
        panic!("input surface should be a plane");
    };
    for &k in &model.parts.keys {
        let p = g.node(k).transform.position;
        assert!(p.x.abs() <= size.x / 2.0, "key x {} off surface", p.x);
        assert!(p.z.abs() <= size.y / 2.0, "key z {} off surface", p.z);
        assert!(p.y > surface.transform.position.y);
    }
}

#[test]
fn attached_model_renders_every_part() {
    let mut scene = SceneGraph::new("scene");
    let root = scene.root();
    let offset = glam::Vec3::new(0.0, -0.5, 0.0);
    let attached = ProceduralModel::build().attach(&mut scene, root, offset);
    assert_eq!(scene.drawables().len(), 5 + KEY_ROWS * KEY_COLUMNS);
    let body_world = scene.world_matrix(attached.parts.body).transform_point3(glam::Vec3::ZERO);
    assert!((body_world.y + 0.5).abs() < 1e-6);
}
