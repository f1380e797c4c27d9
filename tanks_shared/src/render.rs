//! Rendering abstraction.
//!
//! This crate intentionally does not depend on a graphics backend.
//! Define the trait a renderer implementation would satisfy; the scene
//! proxies in [`crate::scene`] are its only inputs.

use crate::{math::Vec3, scene::Model};

/// Camera state handed to the backend once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewState {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub aspect_ratio: f32,
}

/// A minimal rendering API.
pub trait RenderBackend: Send {
    fn begin_frame(&mut self);
    fn set_view(&mut self, view: &ViewState);
    fn draw_model(&mut self, model: &Model);
    fn end_frame(&mut self);
}

/// A no-op renderer useful for headless runs and tests. Counts what it was
/// asked to draw so tests can assert the scene reached the backend.
#[derive(Default)]
pub struct NullRenderer {
    pub frames: u64,
    pub models_drawn: u64,
}

impl RenderBackend for NullRenderer {
    fn begin_frame(&mut self) {}

    fn set_view(&mut self, _view: &ViewState) {}

    fn draw_model(&mut self, _model: &Model) {
        self.models_drawn += 1;
    }

    fn end_frame(&mut self) {
        self.frames += 1;
    }
}
