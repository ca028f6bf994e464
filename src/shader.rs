//! CPU rendition of the tiled box-SDF fragment shader.
//!
//! `Uniforms` is the full slot set: one slot per registered parameter plus the
//! environmental `time`, `resolution` and `mouse` slots.

use crate::params::{ParamKind, ParamValue, ParameterStore};
use glam::{Vec2, Vec3, Vec4};
use std::collections::BTreeSet;
use std::fmt;

/// Slots fed from the parameter store, in registration order.
pub const USER_SLOTS: [(&str, ParamKind); 6] = [
    ("thickness", ParamKind::Float),
    ("posOffset", ParamKind::Vec2),
    ("boxDimensions", ParamKind::Vec2),
    ("baseColor", ParamKind::Color),
    ("tile", ParamKind::Float),
    ("preset", ParamKind::Choice),
];

/// Slots owned by the frame driver and input handling, never by the store.
pub const ENV_SLOTS: [&str; 3] = ["time", "resolution", "mouse"];

const BRIGHTEN: f32 = 1.2;
const RECENTER_SCALE: f32 = 3.0;

#[derive(Debug, Clone, PartialEq)]
pub enum ShaderError {
    UnknownSlot(String),
    SlotTypeMismatch {
        slot: String,
        expected: ParamKind,
        found: ParamKind,
    },
    MissingSlot(String),
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSlot(name) => write!(f, "no shader slot for parameter '{name}'"),
            Self::SlotTypeMismatch {
                slot,
                expected,
                found,
            } => write!(
                f,
                "slot '{slot}' expects {}, got {}",
                expected.as_str(),
                found.as_str()
            ),
            Self::MissingSlot(name) => write!(f, "shader slot '{name}' has no parameter"),
        }
    }
}

impl std::error::Error for ShaderError {}

/// Zeroed until the first push; the registered defaults live in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniforms {
    pub time: f32,
    pub resolution: Vec2,
    pub mouse: Vec2,
    pub thickness: f32,
    pub pos_offset: Vec2,
    pub box_dimensions: Vec2,
    pub base_color: Vec3,
    pub tile: f32,
    /// Selected preset name. Carried for slot parity; the pattern ignores it.
    pub preset: String,
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            time: 0.0,
            resolution: Vec2::ZERO,
            mouse: Vec2::ZERO,
            thickness: 0.0,
            pos_offset: Vec2::ZERO,
            box_dimensions: Vec2::ZERO,
            base_color: Vec3::ZERO,
            tile: 0.0,
            preset: String::new(),
        }
    }
}

impl Uniforms {
    pub fn slot_names() -> impl Iterator<Item = &'static str> {
        USER_SLOTS.iter().map(|(n, _)| *n)
    }

    pub fn assign(&mut self, slot: &str, value: &ParamValue) -> Result<(), ShaderError> {
        let expected = USER_SLOTS
            .iter()
            .find(|(n, _)| *n == slot)
            .map(|(_, k)| *k)
            .ok_or_else(|| ShaderError::UnknownSlot(slot.to_string()))?;
        if value.kind() != expected {
            return Err(ShaderError::SlotTypeMismatch {
                slot: slot.to_string(),
                expected,
                found: value.kind(),
            });
        }

        match (slot, value) {
            ("thickness", ParamValue::Float(v)) => self.thickness = *v,
            ("tile", ParamValue::Float(v)) => self.tile = *v,
            ("posOffset", ParamValue::Vec2(v)) => self.pos_offset = *v,
            ("boxDimensions", ParamValue::Vec2(v)) => self.box_dimensions = *v,
            ("baseColor", ParamValue::Color(c)) => self.base_color = c.to_vec3(),
            ("preset", ParamValue::Choice(s)) => self.preset.clone_from(s),
            _ => return Err(ShaderError::UnknownSlot(slot.to_string())),
        }
        Ok(())
    }

    /// Overwrites every user slot from the store. No diffing.
    pub fn push_from(&mut self, store: &ParameterStore) -> Result<(), ShaderError> {
        for (name, value) in store.iter() {
            self.assign(name, value)?;
        }
        Ok(())
    }
}

/// Fails unless the store keys and the user slots are the same set.
pub fn check_slot_parity(store: &ParameterStore) -> Result<(), ShaderError> {
    let keys: BTreeSet<&str> = store.names().collect();
    let slots: BTreeSet<&str> = Uniforms::slot_names().collect();

    if let Some(orphan) = keys.difference(&slots).next() {
        return Err(ShaderError::UnknownSlot(orphan.to_string()));
    }
    if let Some(missing) = slots.difference(&keys).next() {
        return Err(ShaderError::MissingSlot(missing.to_string()));
    }
    for (name, value) in store.iter() {
        Uniforms::default().assign(name, value)?;
    }
    Ok(())
}

pub fn fract(v: Vec2) -> Vec2 {
    v - v.floor()
}

/// GLSL `step(edge, x)`.
pub fn step(edge: f32, x: f32) -> f32 {
    if x < edge { 0.0 } else { 1.0 }
}

/// Inverted box distance: large inside the box, shrinking outside.
pub fn sd_box(p: Vec2, b: Vec2) -> f32 {
    let d = p.abs() - b;
    1.0 - d.max(Vec2::ZERO).length() - d.x.max(d.y).min(0.0)
}

/// Recentres and wraps a normalized coordinate into the per-cell frame.
pub fn tile_coord(st: Vec2, u: &Uniforms) -> Vec2 {
    let bias = RECENTER_SCALE * (u.thickness + u.box_dimensions.x + u.box_dimensions.y);
    let q = st - u.pos_offset - Vec2::splat(bias);
    fract(q * u.tile) + u.pos_offset
}

pub fn mask(st: Vec2, u: &Uniforms) -> f32 {
    let p = tile_coord(st, u);
    step(sd_box(p, u.box_dimensions), 1.0 - u.thickness)
}

/// Shades one fragment. `frag_coord` is in pixels with y growing upward.
pub fn shade(frag_coord: Vec2, u: &Uniforms) -> Vec4 {
    let st = frag_coord / u.resolution;
    let color = mask(st, u) * (u.base_color / 255.0) * BRIGHTEN;
    color.extend(1.0)
}

/// Shades a `w x h` RGBA8 buffer, row 0 at the top. `samples` is the
/// per-axis supersampling factor.
pub fn rasterize(u: &Uniforms, w: usize, h: usize, samples: usize, out: &mut [u8]) {
    let need = w.saturating_mul(h).saturating_mul(4);
    if w == 0 || h == 0 || out.len() < need {
        return;
    }

    let n = samples.max(1);
    let inv = 1.0 / n as f32;
    let weight = 1.0 / (n * n) as f32;

    for y in 0..h {
        let gl_y = (h - 1 - y) as f32;
        for x in 0..w {
            let mut acc = Vec3::ZERO;
            for sy in 0..n {
                for sx in 0..n {
                    let frag = Vec2::new(
                        x as f32 + (sx as f32 + 0.5) * inv,
                        gl_y + (sy as f32 + 0.5) * inv,
                    );
                    acc += shade(frag, u).truncate().clamp(Vec3::ZERO, Vec3::ONE);
                }
            }
            let c = acc * weight;
            let i = (y * w + x) * 4;
            out[i] = to_u8(c.x);
            out[i + 1] = to_u8(c.y);
            out[i + 2] = to_u8(c.z);
            out[i + 3] = 255;
        }
    }
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
