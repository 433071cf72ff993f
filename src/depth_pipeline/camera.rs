//! Camera pose, input handling and per-frame matrices

mod controller;
mod transform;
mod view;

pub use controller::{
    FOV_LIMIT_TURNS, InputState, MovementKeys, PITCH_LIMIT_TURNS, ViewController,
};
pub use transform::{CameraMatrices, FAR_PLANE, NEAR_PLANE, look_at, perspective, turns};
pub use view::{DEFAULT_FOV_TURNS, ViewState, Viewport};
