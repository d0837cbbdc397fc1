//! One on-screen 3D viewport and the container it lives in.

pub mod container;
pub mod controller;

pub use container::{Container, StaticContainer, FAILED_TEXT, LOADING_TEXT};
pub use controller::{DeferredViewport, ViewportController, ViewportLayout, ViewportState};
