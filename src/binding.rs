use crate::panel::{BindingId, ControlPanel};
use crate::params::{
    AxisConfig, ParamDescriptor, ParamError, ParamValue, ParameterStore, Rgb, UiConfig,
};
use crate::preset::{self, PresetLibrary, NONE_PRESET};
use crate::shader;
use anyhow::Context;
use glam::Vec2;

/// Runtime handle pairing a registered parameter with its panel widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub id: BindingId,
}

/// Parameters of the tile pattern, in registration order.
pub fn pattern_descriptors(presets: &PresetLibrary, tile: f32) -> Vec<ParamDescriptor> {
    let offset_axes = UiConfig::inline_vec2(
        AxisConfig::new(-1.0, 1.0, 0.01),
        AxisConfig::new(-1.0, 1.0, 0.01).inverted(),
    );
    vec![
        ParamDescriptor::new(
            "thickness",
            ParamValue::Float(0.5),
            UiConfig::range(0.01, 0.99, 0.01),
        ),
        ParamDescriptor::new(
            "posOffset",
            ParamValue::Vec2(Vec2::ZERO),
            offset_axes.clone(),
        ),
        ParamDescriptor::new("boxDimensions", ParamValue::Vec2(Vec2::ZERO), offset_axes),
        ParamDescriptor::new(
            "baseColor",
            ParamValue::Color(Rgb::new(255.0, 0.0, 0.0)),
            UiConfig::popup(),
        ),
        ParamDescriptor::new(
            "tile",
            ParamValue::Float(tile),
            UiConfig::range(0.25, 16.0, 0.25),
        ),
        ParamDescriptor::new(
            "preset",
            ParamValue::Choice(NONE_PRESET.to_string()),
            UiConfig::options(presets.names()),
        ),
    ]
}

#[derive(Debug, Default)]
pub struct BindingLayer {
    bindings: Vec<Binding>,
}

impl BindingLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every pattern parameter and checks that each one has a shader slot.
    pub fn install(
        store: &mut ParameterStore,
        panel: &mut dyn ControlPanel,
        presets: &PresetLibrary,
        tile: f32,
    ) -> anyhow::Result<Self> {
        let mut layer = Self::new();
        for descriptor in pattern_descriptors(presets, tile) {
            layer
                .register(store, panel, descriptor)
                .context("register pattern parameters")?;
        }
        shader::check_slot_parity(store).context("parameter/slot mismatch")?;
        tracing::info!(count = layer.bindings.len(), "parameters bound");
        Ok(layer)
    }

    /// Store first, widget second: a rejected name never reaches the panel.
    pub fn register(
        &mut self,
        store: &mut ParameterStore,
        panel: &mut dyn ControlPanel,
        descriptor: ParamDescriptor,
    ) -> Result<Binding, ParamError> {
        store.register(descriptor.clone())?;
        let id = panel.add_binding(&descriptor);
        let binding = Binding {
            name: descriptor.name,
            id,
        };
        self.bindings.push(binding.clone());
        Ok(binding)
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.name == name)
    }

    /// Applies queued panel edits in order (last write wins) and returns the
    /// names that were written. Rejected edits are logged and the panel is
    /// resynced so it stops showing them.
    pub fn sync_from_panel(
        &mut self,
        store: &mut ParameterStore,
        panel: &mut dyn ControlPanel,
    ) -> Vec<String> {
        let mut changed = Vec::new();
        let mut rejected = false;
        for change in panel.drain_changes() {
            match store.set(&change.name, change.value) {
                Ok(()) => {
                    if !changed.contains(&change.name) {
                        changed.push(change.name);
                    }
                }
                Err(err) => {
                    tracing::warn!(%err, "panel edit rejected");
                    rejected = true;
                }
            }
        }
        if rejected {
            self.refresh(store, panel);
        }
        changed
    }

    pub fn refresh(&self, store: &ParameterStore, panel: &mut dyn ControlPanel) {
        panel.refresh(store);
    }

    /// Selects `name` in the preset selector and applies it.
    pub fn select_preset(
        &mut self,
        store: &mut ParameterStore,
        panel: &mut dyn ControlPanel,
        presets: &PresetLibrary,
        name: &str,
    ) -> anyhow::Result<bool> {
        let outcome = presets.resolve(name)?;
        // Selector and fields commit together or not at all.
        let mut staged = store.clone();
        staged.set("preset", ParamValue::Choice(name.to_string()))?;
        let touched = preset::apply_staged(&mut staged, &outcome)
            .with_context(|| format!("apply preset '{name}'"))?;
        *store = staged;
        tracing::info!(preset = %name, touched, "preset selected");
        self.refresh(store, panel);
        Ok(touched)
    }

    /// Applies whatever the selector currently holds, then refreshes the panel
    /// once. Returns whether any field was written.
    pub fn apply_selected(
        &mut self,
        store: &mut ParameterStore,
        panel: &mut dyn ControlPanel,
        presets: &PresetLibrary,
    ) -> anyhow::Result<bool> {
        let name = store.choice("preset")?.to_string();
        let outcome = presets.resolve(&name)?;
        let touched = preset::apply(store, &outcome)
            .with_context(|| format!("apply preset '{name}'"))?;
        tracing::info!(preset = %name, touched, "preset selected");
        self.refresh(store, panel);
        Ok(touched)
    }
}
