//! Keyboard-driven parameter panel drawn as a text overlay.

use crate::params::{AxisConfig, ParamDescriptor, ParamValue, ParameterStore, Picker};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(pub usize);

/// A user edit, queued by the panel until the binding layer drains it.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelChange {
    pub name: String,
    pub value: ParamValue,
}

pub trait ControlPanel {
    fn add_binding(&mut self, descriptor: &ParamDescriptor) -> BindingId;
    /// Re-read every bound value from the store. Idempotent.
    fn refresh(&mut self, store: &ParameterStore);
    fn drain_changes(&mut self) -> Vec<PanelChange>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Component {
    Scalar,
    X,
    Y,
    R,
    G,
    B,
    Choice,
}

#[derive(Debug, Clone)]
struct Row {
    name: String,
    label: String,
    component: Component,
    range: AxisConfig,
    options: Vec<String>,
}

/// Component rows for every binding. A collapsed popup group shows only its
/// first row, drawn as a summary of the whole value.
pub struct TerminalPanel {
    rows: Vec<Row>,
    collapsible: HashSet<String>,
    collapsed: HashSet<String>,
    next_id: usize,
    values: HashMap<String, ParamValue>,
    pending: Vec<PanelChange>,
    cursor: usize,
    visible: bool,
    refreshes: u64,
}

impl Default for TerminalPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPanel {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            collapsible: HashSet::new(),
            collapsed: HashSet::new(),
            next_id: 0,
            values: HashMap::new(),
            pending: Vec::new(),
            cursor: 0,
            visible: true,
            refreshes: 0,
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn refresh_count(&self) -> u64 {
        self.refreshes
    }

    /// Rows currently on screen.
    pub fn row_count(&self) -> usize {
        self.visible_rows().len()
    }

    pub fn is_collapsed(&self, name: &str) -> bool {
        self.collapsed.contains(name)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn select_next(&mut self) {
        let n = self.row_count();
        if n > 0 {
            self.cursor = (self.cursor + 1) % n;
        }
    }

    pub fn select_prev(&mut self) {
        let n = self.row_count();
        if n > 0 {
            self.cursor = (self.cursor + n - 1) % n;
        }
    }

    /// Moves the selected row by `dir` steps and queues the resulting value.
    pub fn nudge(&mut self, dir: i32) {
        let Some(row) = self.selected() else {
            return;
        };
        if self.collapsed.contains(&row.name) {
            return;
        }
        let Some(current) = self.values.get(&row.name) else {
            return;
        };
        let Some(next) = nudged(row, current, dir) else {
            return;
        };
        if &next == current {
            return;
        }
        let name = row.name.clone();
        self.values.insert(name.clone(), next.clone());
        self.pending.push(PanelChange { name, value: next });
    }

    /// Opens or closes the popup group under the cursor. The cursor stays on
    /// the group's first row.
    pub fn activate(&mut self) {
        let Some(name) = self.selected().map(|r| r.name.clone()) else {
            return;
        };
        if !self.collapsible.contains(&name) {
            return;
        }
        if !self.collapsed.remove(&name) {
            self.collapsed.insert(name.clone());
        }
        if let Some(pos) = self
            .visible_rows()
            .iter()
            .position(|&i| self.rows[i].name == name)
        {
            self.cursor = pos;
        }
    }

    /// Title line followed by one line per row. The selected row is at line
    /// `cursor() + 1`.
    pub fn text(&self) -> String {
        let visible = self.visible_rows();
        let label_w = visible
            .iter()
            .map(|&i| self.label(&self.rows[i]).len())
            .max()
            .unwrap_or(0);
        let mut lines = vec!["Parameters  (up/down select, left/right adjust)".to_string()];
        for (pos, &i) in visible.iter().enumerate() {
            let row = &self.rows[i];
            let marker = if pos == self.cursor { '>' } else { ' ' };
            let value = match self.values.get(&row.name) {
                Some(v) if self.collapsed.contains(&row.name) => format!("{v}  [enter]"),
                Some(v) => component_text(row.component, v),
                None => "-".to_string(),
            };
            lines.push(format!("{marker} {:<label_w$}  {value}", self.label(row)));
        }
        lines.join("\n")
    }

    fn visible_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(i, row)| {
                !(self.collapsed.contains(&row.name)
                    && *i > 0
                    && self.rows[*i - 1].name == row.name)
            })
            .map(|(i, _)| i)
            .collect()
    }

    fn selected(&self) -> Option<&Row> {
        self.visible_rows().get(self.cursor).map(|&i| &self.rows[i])
    }

    fn label<'a>(&self, row: &'a Row) -> &'a str {
        if self.collapsed.contains(&row.name) {
            &row.name
        } else {
            &row.label
        }
    }
}

impl ControlPanel for TerminalPanel {
    fn add_binding(&mut self, descriptor: &ParamDescriptor) -> BindingId {
        let id = BindingId(self.next_id);
        self.next_id += 1;

        let name = descriptor.name.clone();
        let ui = &descriptor.ui;
        let scalar = AxisConfig::new(
            ui.min.unwrap_or(f32::NEG_INFINITY),
            ui.max.unwrap_or(f32::INFINITY),
            ui.step.unwrap_or(0.01),
        );
        let row = |label: String, component: Component, range: AxisConfig| Row {
            name: name.clone(),
            label,
            component,
            range,
            options: Vec::new(),
        };

        match &descriptor.default {
            ParamValue::Float(_) => self.rows.push(row(name.clone(), Component::Scalar, scalar)),
            ParamValue::Vec2(_) => {
                let fallback = AxisConfig::new(-1.0, 1.0, 0.01);
                self.rows.push(row(
                    format!("{name}.x"),
                    Component::X,
                    ui.x.unwrap_or(fallback),
                ));
                self.rows.push(row(
                    format!("{name}.y"),
                    Component::Y,
                    ui.y.unwrap_or(fallback),
                ));
            }
            ParamValue::Color(_) => {
                let channel = AxisConfig::new(0.0, 255.0, ui.step.unwrap_or(1.0));
                self.rows.push(row(format!("{name}.r"), Component::R, channel));
                self.rows.push(row(format!("{name}.g"), Component::G, channel));
                self.rows.push(row(format!("{name}.b"), Component::B, channel));
            }
            ParamValue::Choice(_) => {
                let mut r = row(name.clone(), Component::Choice, scalar);
                r.options = ui.options.iter().map(|(_, v)| v.clone()).collect();
                self.rows.push(r);
            }
        }
        let grouped = matches!(descriptor.default, ParamValue::Vec2(_) | ParamValue::Color(_));
        if grouped && ui.picker == Some(Picker::Popup) {
            self.collapsible.insert(name.clone());
            if !ui.expanded {
                self.collapsed.insert(name.clone());
            }
        }
        self.values.insert(name, descriptor.default.clone());
        id
    }

    fn refresh(&mut self, store: &ParameterStore) {
        self.refreshes += 1;
        for row in &self.rows {
            if let Some(v) = store.get(&row.name) {
                self.values.insert(row.name.clone(), v.clone());
            }
        }
    }

    fn drain_changes(&mut self) -> Vec<PanelChange> {
        std::mem::take(&mut self.pending)
    }
}

fn nudged(row: &Row, current: &ParamValue, dir: i32) -> Option<ParamValue> {
    let sign = if row.range.inverted { -1.0 } else { 1.0 };
    let delta = dir as f32 * sign * row.range.step;
    let step_to = |v: f32| snap(v + delta, row.range);

    let next = match (row.component, current) {
        (Component::Scalar, ParamValue::Float(v)) => ParamValue::Float(step_to(*v)),
        (Component::X, ParamValue::Vec2(v)) => ParamValue::Vec2(glam::Vec2::new(step_to(v.x), v.y)),
        (Component::Y, ParamValue::Vec2(v)) => ParamValue::Vec2(glam::Vec2::new(v.x, step_to(v.y))),
        (Component::R, ParamValue::Color(c)) => {
            let mut c = *c;
            c.r = step_to(c.r);
            ParamValue::Color(c)
        }
        (Component::G, ParamValue::Color(c)) => {
            let mut c = *c;
            c.g = step_to(c.g);
            ParamValue::Color(c)
        }
        (Component::B, ParamValue::Color(c)) => {
            let mut c = *c;
            c.b = step_to(c.b);
            ParamValue::Color(c)
        }
        (Component::Choice, ParamValue::Choice(s)) => {
            if row.options.is_empty() {
                return None;
            }
            let n = row.options.len() as i32;
            let idx = row.options.iter().position(|o| o == s).unwrap_or(0) as i32;
            let next = (idx + dir).rem_euclid(n) as usize;
            ParamValue::Choice(row.options[next].clone())
        }
        _ => return None,
    };
    Some(next)
}

fn snap(v: f32, range: AxisConfig) -> f32 {
    let v = if range.step > 0.0 {
        (v / range.step).round() * range.step
    } else {
        v
    };
    v.clamp(range.min, range.max)
}

fn component_text(component: Component, value: &ParamValue) -> String {
    match (component, value) {
        (Component::X, ParamValue::Vec2(v)) => format!("{:>6.2}", v.x),
        (Component::Y, ParamValue::Vec2(v)) => format!("{:>6.2}", v.y),
        (Component::R, ParamValue::Color(c)) => format!("{:>6.0}", c.r),
        (Component::G, ParamValue::Color(c)) => format!("{:>6.0}", c.g),
        (Component::B, ParamValue::Color(c)) => format!("{:>6.0}", c.b),
        (Component::Choice, ParamValue::Choice(s)) => format!("< {s} >"),
        (_, v) => format!("{:>6}", v.to_string()),
    }
}
