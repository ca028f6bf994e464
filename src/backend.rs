use crate::render::{Frame, Overlay, OverlayAnchor, Renderer};
use crate::shader::{self, Uniforms};
use anyhow::Context;
use glam::Vec2;
use std::io::Write;

pub const MAX_PIXEL_RATIO: usize = 8;

/// Whatever turns uniforms into pixels on screen.
pub trait RenderBackend {
    fn render(&mut self, uniforms: &Uniforms) -> anyhow::Result<()>;
    /// Viewport size in host units (terminal cells for the terminal backend).
    fn set_size(&mut self, width: u16, height: u16);
    fn set_pixel_ratio(&mut self, ratio: f32);
    /// Shaded area in pixels; this is what the `resolution` slot holds.
    fn viewport(&self) -> (usize, usize);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayText {
    pub text: String,
    pub anchor: OverlayAnchor,
    pub highlight: Option<usize>,
}

/// Shades on the CPU and paints the result with a cell encoder. The bottom
/// row is reserved for the status line.
pub struct TerminalBackend<W: Write> {
    renderer: Box<dyn Renderer>,
    out: W,
    cols: u16,
    rows: u16,
    pixel_ratio: usize,
    pixels: Vec<u8>,
    hud: String,
    overlay: Option<OverlayText>,
    sync_updates: bool,
}

impl<W: Write> TerminalBackend<W> {
    pub fn new(renderer: Box<dyn Renderer>, out: W, sync_updates: bool) -> Self {
        Self {
            renderer,
            out,
            cols: 0,
            rows: 0,
            pixel_ratio: 1,
            pixels: Vec::new(),
            hud: String::new(),
            overlay: None,
            sync_updates,
        }
    }

    pub fn renderer_name(&self) -> &'static str {
        self.renderer.name()
    }

    pub fn pixel_ratio(&self) -> usize {
        self.pixel_ratio
    }

    pub fn set_hud(&mut self, hud: String) {
        self.hud = hud;
    }

    pub fn set_overlay(&mut self, overlay: Option<OverlayText>) {
        self.overlay = overlay;
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Cell position -> [0,1]^2 over the shaded area, from the top-left. The
    /// status row below it is excluded, so this matches `viewport()`.
    pub fn normalize_pointer(&self, col: u16, row: u16) -> Vec2 {
        Vec2::new(
            col as f32 / self.cols.max(1) as f32,
            row as f32 / self.visual_rows().max(1) as f32,
        )
        .clamp(Vec2::ZERO, Vec2::ONE)
    }

    fn hud_rows(&self) -> u16 {
        if self.rows >= 2 { 1 } else { 0 }
    }

    fn visual_rows(&self) -> u16 {
        self.rows.saturating_sub(self.hud_rows())
    }
}

impl<W: Write> RenderBackend for TerminalBackend<W> {
    fn render(&mut self, uniforms: &Uniforms) -> anyhow::Result<()> {
        let (w, h) = self.viewport();
        if w == 0 || h == 0 {
            return Ok(());
        }
        let need = w * h * 4;
        if self.pixels.len() != need {
            self.pixels.resize(need, 0);
        }

        shader::rasterize(uniforms, w, h, self.pixel_ratio, &mut self.pixels);

        let overlay = self.overlay.as_ref().map(|o| Overlay {
            text: &o.text,
            anchor: o.anchor,
            highlight: o.highlight,
        });
        let frame = Frame {
            term_cols: self.cols,
            term_rows: self.rows,
            visual_rows: self.visual_rows(),
            pixel_width: w,
            pixel_height: h,
            pixels_rgba: &self.pixels,
            hud: &self.hud,
            hud_rows: self.hud_rows(),
            overlay,
            sync_updates: self.sync_updates,
        };
        self.renderer
            .render(&frame, &mut self.out)
            .with_context(|| format!("{} renderer failed", self.renderer.name()))
    }

    fn set_size(&mut self, width: u16, height: u16) {
        tracing::debug!(cols = width, rows = height, "backend resize");
        self.cols = width;
        self.rows = height;
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        let r = if ratio.is_finite() { ratio.round() } else { 1.0 };
        self.pixel_ratio = (r.max(1.0) as usize).min(MAX_PIXEL_RATIO);
    }

    fn viewport(&self) -> (usize, usize) {
        let (cx, cy) = self.renderer.cell_pixels();
        (
            self.cols as usize * cx,
            self.visual_rows() as usize * cy,
        )
    }
}
