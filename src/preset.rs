use crate::params::{ParamError, ParamValue, ParameterStore};
use std::fmt;

/// Selector value that leaves the store untouched.
pub const NONE_PRESET: &str = "none";

pub const PRESET_FIELD_COUNT: usize = 6;

/// Positional preset fields, in definition-string order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetField {
    Thickness,
    OffsetX,
    OffsetY,
    BoxWidth,
    BoxHeight,
    Tile,
}

impl PresetField {
    pub const fn all() -> [Self; PRESET_FIELD_COUNT] {
        [
            Self::Thickness,
            Self::OffsetX,
            Self::OffsetY,
            Self::BoxWidth,
            Self::BoxHeight,
            Self::Tile,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Thickness => "thickness",
            Self::OffsetX => "offsetX",
            Self::OffsetY => "offsetY",
            Self::BoxWidth => "boxWidth",
            Self::BoxHeight => "boxHeight",
            Self::Tile => "tile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldUpdate {
    Keep,
    Set(f32),
}

impl FieldUpdate {
    /// `Set` iff the token is a finite number. Everything else, including the
    /// `_` placeholder, keeps the current value.
    pub fn from_token(token: Option<&str>) -> Self {
        match token.and_then(|t| t.parse::<f32>().ok()) {
            Some(v) if v.is_finite() => Self::Set(v),
            _ => Self::Keep,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PresetOutcome {
    NoOp,
    FieldSet([FieldUpdate; PRESET_FIELD_COUNT]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PresetDef {
    pub name: &'static str,
    pub fields: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetError {
    Unknown(String),
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(name) => write!(f, "unknown preset: {name}"),
        }
    }
}

impl std::error::Error for PresetError {}

const BUILTIN: &[PresetDef] = &[
    PresetDef {
        name: "square",
        fields: "0.03 -0.5 -0.50 0.3 0.3 _",
    },
    PresetDef {
        name: "circle",
        fields: "0.25 -0.5 -0.5 0 0 _",
    },
    PresetDef {
        name: "grid",
        fields: "0.02 -0.5 -0.5 0.45 0.45 8",
    },
    PresetDef {
        name: "pills",
        fields: "0.05 -0.5 -0.5 0.35 0.1 _",
    },
    PresetDef {
        name: "dots",
        fields: "0.1 -0.5 -0.5 0 0 12",
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct PresetLibrary {
    presets: Vec<PresetDef>,
}

impl Default for PresetLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PresetLibrary {
    pub fn builtin() -> Self {
        Self {
            presets: BUILTIN.to_vec(),
        }
    }

    /// Selector options, sentinel first.
    pub fn names(&self) -> Vec<&'static str> {
        std::iter::once(NONE_PRESET)
            .chain(self.presets.iter().map(|p| p.name))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&PresetDef> {
        self.presets.iter().find(|p| p.name == name)
    }

    pub fn resolve(&self, name: &str) -> Result<PresetOutcome, PresetError> {
        if name == NONE_PRESET {
            return Ok(PresetOutcome::NoOp);
        }
        let def = self
            .get(name)
            .ok_or_else(|| PresetError::Unknown(name.to_string()))?;
        Ok(parse_fields(def))
    }
}

fn parse_fields(def: &PresetDef) -> PresetOutcome {
    let tokens: Vec<&str> = def.fields.split_whitespace().collect();
    if tokens.len() > PRESET_FIELD_COUNT {
        tracing::warn!(
            preset = def.name,
            extra = tokens.len() - PRESET_FIELD_COUNT,
            "ignoring trailing preset tokens"
        );
    }

    let mut updates = [FieldUpdate::Keep; PRESET_FIELD_COUNT];
    for (i, field) in PresetField::all().into_iter().enumerate() {
        let token = tokens.get(i).copied();
        updates[i] = FieldUpdate::from_token(token);
        if updates[i] == FieldUpdate::Keep {
            tracing::debug!(
                preset = def.name,
                field = field.as_str(),
                token = token.unwrap_or("<missing>"),
                "preset field left unchanged"
            );
        }
    }
    PresetOutcome::FieldSet(updates)
}

/// Writes every `Set` field into the store. Returns whether anything was
/// written. All or nothing: on error the store is left as it was.
pub fn apply(store: &mut ParameterStore, outcome: &PresetOutcome) -> Result<bool, ParamError> {
    let mut staged = store.clone();
    let touched = apply_staged(&mut staged, outcome)?;
    *store = staged;
    Ok(touched)
}

/// Field-by-field writes into `store`. Callers stage on a copy.
pub(crate) fn apply_staged(
    store: &mut ParameterStore,
    outcome: &PresetOutcome,
) -> Result<bool, ParamError> {
    let PresetOutcome::FieldSet(updates) = outcome else {
        return Ok(false);
    };

    let mut touched = false;
    for (field, update) in PresetField::all().into_iter().zip(updates.iter()) {
        let FieldUpdate::Set(v) = *update else {
            continue;
        };
        touched = true;
        match field {
            PresetField::Thickness => store.set("thickness", ParamValue::Float(v))?,
            PresetField::Tile => store.set("tile", ParamValue::Float(v))?,
            PresetField::OffsetX => {
                let mut off = store.vec2("posOffset")?;
                off.x = v;
                store.set("posOffset", ParamValue::Vec2(off))?;
            }
            PresetField::OffsetY => {
                let mut off = store.vec2("posOffset")?;
                off.y = v;
                store.set("posOffset", ParamValue::Vec2(off))?;
            }
            PresetField::BoxWidth => {
                let mut dims = store.vec2("boxDimensions")?;
                dims.x = v;
                store.set("boxDimensions", ParamValue::Vec2(dims))?;
            }
            PresetField::BoxHeight => {
                let mut dims = store.vec2("boxDimensions")?;
                dims.y = v;
                store.set("boxDimensions", ParamValue::Vec2(dims))?;
            }
        }
    }
    Ok(touched)
}
