use glam::{Vec2, Vec3};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Float,
    Vec2,
    Color,
    Choice,
}

impl ParamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Vec2 => "vec2",
            Self::Color => "color",
            Self::Choice => "enum",
        }
    }
}

/// RGB color with channels in 0..=255, kept as floats so the panel can nudge
/// them without rounding drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Vec2(Vec2),
    Color(Rgb),
    Choice(String),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            Self::Float(_) => ParamKind::Float,
            Self::Vec2(_) => ParamKind::Vec2,
            Self::Color(_) => ParamKind::Color,
            Self::Choice(_) => ParamKind::Choice,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v:.2}"),
            Self::Vec2(v) => write!(f, "({:.2}, {:.2})", v.x, v.y),
            Self::Color(c) => write!(f, "rgb({:.0}, {:.0}, {:.0})", c.r, c.g, c.b),
            Self::Choice(s) => write!(f, "{s}"),
        }
    }
}

/// Widget hint for vector and color fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Picker {
    Inline,
    Popup,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisConfig {
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub inverted: bool,
}

impl AxisConfig {
    pub const fn new(min: f32, max: f32, step: f32) -> Self {
        Self {
            min,
            max,
            step,
            inverted: false,
        }
    }

    pub const fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }
}

/// Panel-only metadata. The shader never reads any of this.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UiConfig {
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub step: Option<f32>,
    pub picker: Option<Picker>,
    pub expanded: bool,
    pub x: Option<AxisConfig>,
    pub y: Option<AxisConfig>,
    /// Label -> value mapping for enum selection.
    pub options: Vec<(String, String)>,
}

impl UiConfig {
    pub fn range(min: f32, max: f32, step: f32) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            step: Some(step),
            ..Self::default()
        }
    }

    pub fn inline_vec2(x: AxisConfig, y: AxisConfig) -> Self {
        Self {
            picker: Some(Picker::Inline),
            expanded: true,
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Collapsed behind a single row until opened.
    pub fn popup() -> Self {
        Self {
            picker: Some(Picker::Popup),
            expanded: false,
            ..Self::default()
        }
    }

    pub fn options<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: options
                .into_iter()
                .map(|o| {
                    let o = o.into();
                    (o.clone(), o)
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn allows_choice(&self, value: &str) -> bool {
        self.options.is_empty() || self.options.iter().any(|(_, v)| v == value)
    }
}

/// Immutable schema for one parameter. The live widget handle is a separate
/// [`crate::binding::Binding`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDescriptor {
    pub name: String,
    pub default: ParamValue,
    pub ui: UiConfig,
}

impl ParamDescriptor {
    pub fn new(name: impl Into<String>, default: ParamValue, ui: UiConfig) -> Self {
        Self {
            name: name.into(),
            default,
            ui,
        }
    }

    pub fn kind(&self) -> ParamKind {
        self.default.kind()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    Duplicate(String),
    Unknown(String),
    TypeMismatch {
        name: String,
        expected: ParamKind,
        found: ParamKind,
    },
    InvalidChoice {
        name: String,
        value: String,
    },
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate(name) => write!(f, "parameter already registered: {name}"),
            Self::Unknown(name) => write!(f, "unknown parameter: {name}"),
            Self::TypeMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "type mismatch for '{name}': expected {}, got {}",
                expected.as_str(),
                found.as_str()
            ),
            Self::InvalidChoice { name, value } => {
                write!(f, "'{value}' is not an option of '{name}'")
            }
        }
    }
}

impl std::error::Error for ParamError {}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    descriptor: ParamDescriptor,
    value: ParamValue,
}

/// Ordered name -> value store. Iteration follows registration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterStore {
    entries: Vec<Entry>,
    names: HashSet<String>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: ParamDescriptor) -> Result<(), ParamError> {
        if self.names.contains(&descriptor.name) {
            return Err(ParamError::Duplicate(descriptor.name));
        }
        if let ParamValue::Choice(v) = &descriptor.default {
            if !descriptor.ui.allows_choice(v) {
                return Err(ParamError::InvalidChoice {
                    name: descriptor.name,
                    value: v.clone(),
                });
            }
        }
        tracing::debug!(name = %descriptor.name, kind = descriptor.kind().as_str(), "register parameter");
        self.names.insert(descriptor.name.clone());
        self.entries.push(Entry {
            value: descriptor.default.clone(),
            descriptor,
        });
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entry(name).map(|e| &e.value)
    }

    pub fn descriptor(&self, name: &str) -> Option<&ParamDescriptor> {
        self.entry(name).map(|e| &e.descriptor)
    }

    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParamError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.descriptor.name == name)
            .ok_or_else(|| ParamError::Unknown(name.to_string()))?;

        let expected = entry.descriptor.kind();
        if value.kind() != expected {
            return Err(ParamError::TypeMismatch {
                name: name.to_string(),
                expected,
                found: value.kind(),
            });
        }
        if let ParamValue::Choice(v) = &value {
            if !entry.descriptor.ui.allows_choice(v) {
                return Err(ParamError::InvalidChoice {
                    name: name.to_string(),
                    value: v.clone(),
                });
            }
        }
        entry.value = value;
        Ok(())
    }

    pub fn float(&self, name: &str) -> Result<f32, ParamError> {
        match self.get(name) {
            Some(ParamValue::Float(v)) => Ok(*v),
            other => Err(lookup_error(name, ParamKind::Float, other)),
        }
    }

    pub fn vec2(&self, name: &str) -> Result<Vec2, ParamError> {
        match self.get(name) {
            Some(ParamValue::Vec2(v)) => Ok(*v),
            other => Err(lookup_error(name, ParamKind::Vec2, other)),
        }
    }

    pub fn color(&self, name: &str) -> Result<Rgb, ParamError> {
        match self.get(name) {
            Some(ParamValue::Color(c)) => Ok(*c),
            other => Err(lookup_error(name, ParamKind::Color, other)),
        }
    }

    pub fn choice(&self, name: &str) -> Result<&str, ParamError> {
        match self.get(name) {
            Some(ParamValue::Choice(v)) => Ok(v.as_str()),
            other => Err(lookup_error(name, ParamKind::Choice, other)),
        }
    }

    /// Names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.descriptor.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries
            .iter()
            .map(|e| (e.descriptor.name.as_str(), &e.value))
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.descriptor.name == name)
    }
}

fn lookup_error(name: &str, expected: ParamKind, found: Option<&ParamValue>) -> ParamError {
    match found {
        Some(v) => ParamError::TypeMismatch {
            name: name.to_string(),
            expected,
            found: v.kind(),
        },
        None => ParamError::Unknown(name.to_string()),
    }
}
