use crate::constants::*;
use crate::error::ConfigError;

/// Named tuning parameters for one mounted scene.
///
/// Defaults reproduce the contact section's look; the pointer sensitivities
/// and smoothing are the knobs a host page is expected to override.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub camera_z: f32,
    pub clear_color: u32,

    /// Yaw (radians) produced when the pointer sits on the left/right edge.
    pub yaw_sensitivity: f32,
    /// Pitch (radians) produced when the pointer sits on the top/bottom edge.
    pub pitch_sensitivity: f32,
    /// Per-tick interpolation factor in (0, 1].
    pub smoothing: f32,

    pub model_offset_y: f32,
    pub bob_amplitude: f32,
    pub bob_rate: f32,
    pub glow_base: f32,
    pub glow_amplitude: f32,
    pub glow_rate: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: CAMERA_FOV_DEGREES,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            camera_z: CAMERA_Z,
            clear_color: CLEAR_COLOR_HEX,
            yaw_sensitivity: YAW_SENSITIVITY,
            pitch_sensitivity: PITCH_SENSITIVITY,
            smoothing: ORIENTATION_SMOOTHING,
            model_offset_y: MODEL_OFFSET_Y,
            bob_amplitude: BOB_AMPLITUDE,
            bob_rate: BOB_RATE,
            glow_base: GLOW_BASE,
            glow_amplitude: GLOW_AMPLITUDE,
            glow_rate: GLOW_RATE,
        }
    }
}

impl SceneConfig {
    pub fn with_sensitivity(mut self, yaw: f32, pitch: f32) -> Self {
        self.yaw_sensitivity = yaw;
        self.pitch_sensitivity = pitch;
        self
    }

    pub fn with_smoothing(mut self, smoothing: f32) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(ConfigError::Smoothing(self.smoothing));
        }
        for (name, value) in [
            ("yaw_sensitivity", self.yaw_sensitivity),
            ("pitch_sensitivity", self.pitch_sensitivity),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Sensitivity { name, value });
            }
        }
        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            return Err(ConfigError::FieldOfView(self.fov_y_degrees));
        }
        if !(self.near > 0.0 && self.near < self.far) {
            return Err(ConfigError::ClipPlanes {
                near: self.near,
                far: self.far,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SceneConfig::default().validate().is_ok());
    }

    #[test]
    fn smoothing_outside_unit_interval_is_rejected() {
        for bad in [0.0, -0.1, 1.5, f32::NAN] {
            let cfg = SceneConfig::default().with_smoothing(bad);
            assert!(matches!(cfg.validate(), Err(ConfigError::Smoothing(_))));
        }
        assert!(SceneConfig::default().with_smoothing(1.0).validate().is_ok());
    }

    #[test]
    fn negative_sensitivity_is_rejected() {
        let cfg = SceneConfig::default().with_sensitivity(-0.3, 0.2);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Sensitivity {
                name: "yaw_sensitivity",
                ..
            })
        ));
    }

    #[test]
    fn inverted_clip_planes_are_rejected() {
        let cfg = SceneConfig {
            near: 10.0,
            far: 1.0,
            ..SceneConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::ClipPlanes { .. })));
    }
}
