// Shared visual and interaction tuning constants for the contact scene.
// `SceneConfig::default()` is assembled from these.

// Camera
pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_Z: f32 = 5.0; // eye distance on +Z, looking at the origin

// Background, 0x0f0f23
pub const CLEAR_COLOR_HEX: u32 = 0x0f0f23;

// Pointer orientation
pub const YAW_SENSITIVITY: f32 = 0.3; // radians at the horizontal viewport edge
pub const PITCH_SENSITIVITY: f32 = 0.2; // radians at the vertical viewport edge
pub const ORIENTATION_SMOOTHING: f32 = 0.05; // fraction of the remaining gap closed per tick

// Model placement and idle motion
pub const MODEL_OFFSET_Y: f32 = -0.5;
pub const BOB_AMPLITUDE: f32 = 0.05;
pub const BOB_RATE: f32 = 1.0; // rad/s

// Display panel glow
pub const GLOW_BASE: f32 = 0.6;
pub const GLOW_AMPLITUDE: f32 = 0.2;
pub const GLOW_RATE: f32 = 2.0; // rad/s

// Key grid laid over the input surface
pub const KEY_ROWS: usize = 4;
pub const KEY_COLUMNS: usize = 12;
pub const KEY_PITCH_X: f32 = 0.22;
pub const KEY_PITCH_Z: f32 = 0.15;
pub const KEY_ORIGIN_X: f32 = -1.3;
pub const KEY_ORIGIN_Z: f32 = -0.6;
pub const KEY_SIZE: [f32; 3] = [0.12, 0.05, 0.12];
pub const KEY_TOP_Y: f32 = 0.125;

// Lower bound applied to measured viewport dimensions (px)
pub const MIN_VIEWPORT_PX: u32 = 1;
