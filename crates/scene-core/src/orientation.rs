//! Pointer-driven orientation.
//!
//! Pointer events only ever move the *target*; the render tick is the only
//! place the *current* orientation changes, via [`step`].

use crate::config::SceneConfig;

/// Rectangle of the host container in client (CSS pixel) coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewportBounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewportBounds {
    pub fn sized(width: f32, height: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Pointer position normalized to [-1, 1] on both axes, +y up.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
}

/// Yaw about the vertical axis and pitch about the horizontal one, radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Orientation {
    pub yaw: f32,
    pub pitch: f32,
}

#[derive(Clone, Debug)]
pub struct PointerOrientationController {
    yaw_sensitivity: f32,
    pitch_sensitivity: f32,
    pointer: PointerState,
    target: Orientation,
}

impl PointerOrientationController {
    pub fn new(yaw_sensitivity: f32, pitch_sensitivity: f32) -> Self {
        Self {
            yaw_sensitivity,
            pitch_sensitivity,
            pointer: PointerState::default(),
            target: Orientation::default(),
        }
    }

    pub fn from_config(config: &SceneConfig) -> Self {
        Self::new(config.yaw_sensitivity, config.pitch_sensitivity)
    }

    /// Record a pointer move and return the new target orientation.
    ///
    /// A zero-area viewport leaves the previous target in place.
    pub fn on_pointer_move(
        &mut self,
        bounds: ViewportBounds,
        client_x: f32,
        client_y: f32,
    ) -> Orientation {
        if let Some(pointer) = normalize_pointer(bounds, client_x, client_y) {
            self.pointer = pointer;
            self.target = Orientation {
                yaw: pointer.x * self.yaw_sensitivity,
                pitch: pointer.y * self.pitch_sensitivity,
            };
        }
        self.target
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn target(&self) -> Orientation {
        self.target
    }
}

/// Map a client-space position to [-1, 1] relative to `bounds`, +y up.
/// Positions outside the bounds clamp to the nearest edge.
#[inline]
pub fn normalize_pointer(
    bounds: ViewportBounds,
    client_x: f32,
    client_y: f32,
) -> Option<PointerState> {
    if !bounds.has_area() {
        return None;
    }
    let u = ((client_x - bounds.left) / bounds.width).clamp(0.0, 1.0);
    let v = ((client_y - bounds.top) / bounds.height).clamp(0.0, 1.0);
    Some(PointerState {
        x: u * 2.0 - 1.0,
        y: 1.0 - v * 2.0,
    })
}

/// One exponential-smoothing step: `current + (target - current) * k`.
#[inline]
pub fn step(current: Orientation, target: Orientation, smoothing: f32) -> Orientation {
    Orientation {
        yaw: current.yaw + (target.yaw - current.yaw) * smoothing,
        pitch: current.pitch + (target.pitch - current.pitch) * smoothing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> ViewportBounds {
        ViewportBounds {
            left: 100.0,
            top: 50.0,
            width: 800.0,
            height: 500.0,
        }
    }

    #[test]
    fn corners_and_center_map_to_unit_square() {
        let b = bounds();
        let c = normalize_pointer(b, 500.0, 300.0).unwrap();
        assert!(c.x.abs() < 1e-6 && c.y.abs() < 1e-6);
        let tl = normalize_pointer(b, 100.0, 50.0).unwrap();
        assert_eq!((tl.x, tl.y), (-1.0, 1.0));
        let br = normalize_pointer(b, 900.0, 550.0).unwrap();
        assert_eq!((br.x, br.y), (1.0, -1.0));
    }

    #[test]
    fn positions_outside_bounds_clamp_to_edge() {
        let p = normalize_pointer(bounds(), -500.0, 10_000.0).unwrap();
        assert_eq!((p.x, p.y), (-1.0, -1.0));
    }

    #[test]
    fn zero_area_keeps_previous_target() {
        let mut ctl = PointerOrientationController::new(0.3, 0.2);
        let t = ctl.on_pointer_move(bounds(), 900.0, 50.0);
        let kept = ctl.on_pointer_move(ViewportBounds::sized(0.0, 100.0), 10.0, 10.0);
        assert_eq!(t, kept);
    }

    #[test]
    fn target_scales_by_sensitivity() {
        let mut ctl = PointerOrientationController::new(0.3, 0.2);
        let t = ctl.on_pointer_move(bounds(), 900.0, 550.0);
        assert!((t.yaw - 0.3).abs() < 1e-6);
        assert!((t.pitch + 0.2).abs() < 1e-6);
    }

    #[test]
    fn step_with_unit_factor_snaps_to_target() {
        let target = Orientation { yaw: 0.25, pitch: -0.1 };
        assert_eq!(step(Orientation::default(), target, 1.0), target);
    }
}
