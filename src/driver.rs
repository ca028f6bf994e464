use crate::backend::RenderBackend;
use crate::params::ParameterStore;
use crate::shader::Uniforms;
use anyhow::Context;
use glam::Vec2;

/// Animation clock runs in 60 Hz frames regardless of the real refresh rate.
pub const TIME_SCALE: f32 = 60.0;

/// Everything the renderer needs, built once at startup.
pub struct RenderContext<B: RenderBackend> {
    pub backend: B,
    pub uniforms: Uniforms,
}

pub struct FrameDriver<B: RenderBackend> {
    ctx: RenderContext<B>,
    running: bool,
    frames: u64,
}

impl<B: RenderBackend> FrameDriver<B> {
    pub fn new(backend: B) -> Self {
        Self {
            ctx: RenderContext {
                backend,
                uniforms: Uniforms::default(),
            },
            running: true,
            frames: 0,
        }
    }

    /// One frame: time, wholesale slot push, render. A stopped driver does nothing.
    pub fn tick(&mut self, store: &ParameterStore, elapsed_seconds: f32) -> anyhow::Result<()> {
        if !self.running {
            return Ok(());
        }

        let u = &mut self.ctx.uniforms;
        u.time = TIME_SCALE * elapsed_seconds;
        u.push_from(store).context("push parameters to shader")?;

        self.ctx
            .backend
            .render(&self.ctx.uniforms)
            .with_context(|| format!("render frame {}", self.frames))?;
        self.frames += 1;
        Ok(())
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.ctx.backend.set_size(width, height);
        let (w, h) = self.ctx.backend.viewport();
        self.ctx.uniforms.resolution = Vec2::new(w as f32, h as f32);
        tracing::debug!(w, h, "viewport resolution");
    }

    pub fn set_pixel_ratio(&mut self, ratio: f32) {
        self.ctx.backend.set_pixel_ratio(ratio);
    }

    /// `pos` is already normalized to [0,1]^2; out-of-range input is clamped.
    pub fn pointer_moved(&mut self, pos: Vec2) {
        self.ctx.uniforms.mouse = pos.clamp(Vec2::ZERO, Vec2::ONE);
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn uniforms(&self) -> &Uniforms {
        &self.ctx.uniforms
    }

    pub fn backend(&self) -> &B {
        &self.ctx.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.ctx.backend
    }
}
