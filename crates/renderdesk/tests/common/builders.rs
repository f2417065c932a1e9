//! Builders for job documents.

#![allow(dead_code)]

use std::path::Path;

use renderdesk::{MayaJob, RenderLayer};

pub struct LayerBuilder {
    layer: RenderLayer,
}

impl LayerBuilder {
    /// A renderable layer writing to `/renders/<batch>/<name>`.
    pub fn new(name: &str, batch: &str) -> Self {
        let mut layer = RenderLayer::new(name, batch);
        layer.output_directory = Some(format!("/renders/{}/{}", batch, name));
        Self { layer }
    }

    pub fn frames(mut self, frames: &str) -> Self {
        self.layer.frames = Some(frames.to_string());
        self
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.layer.priority = priority;
        self
    }

    pub fn job_id(mut self, id: &str) -> Self {
        self.layer.job_id = Some(id.to_string());
        self
    }

    pub fn renderable(mut self, renderable: bool) -> Self {
        self.layer.renderable = renderable;
        self
    }

    pub fn build(self) -> RenderLayer {
        self.layer
    }
}

pub struct MayaJobBuilder {
    job: MayaJob,
}

impl MayaJobBuilder {
    pub fn new(batch: &str, scene_file: &Path) -> Self {
        let mut job = MayaJob::new(batch, scene_file);
        job.camera_name = Some("shotCam".to_string());
        Self { job }
    }

    pub fn layer(mut self, layer: RenderLayer) -> Self {
        self.job.render_layers.push(layer);
        self
    }

    /// Adds a renderable layer with the given frames.
    pub fn simple_layer(self, name: &str, frames: &str) -> Self {
        let batch = self.job.batch_name.clone();
        self.layer(LayerBuilder::new(name, &batch).frames(frames).build())
    }

    pub fn build(self) -> MayaJob {
        self.job
    }
}
