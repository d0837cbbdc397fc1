pub mod camera_utils;
pub mod view_camera;

// Re-export main types
pub use camera_utils::{Camera, CameraUniform};
pub use view_camera::ViewCamera;
