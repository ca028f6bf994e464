use glam::Vec2;
use sdf_sandbox::backend::RenderBackend;
use sdf_sandbox::binding::BindingLayer;
use sdf_sandbox::driver::FrameDriver;
use sdf_sandbox::panel::TerminalPanel;
use sdf_sandbox::params::{ParamValue, ParameterStore, Rgb};
use sdf_sandbox::preset::PresetLibrary;
use sdf_sandbox::shader::Uniforms;

/// Keeps a copy of every uniform set it was asked to draw.
#[derive(Default)]
struct RecordingBackend {
    frames: Vec<Uniforms>,
    size: (u16, u16),
    ratio: f32,
    fail: bool,
}

impl RenderBackend for RecordingBackend {
    fn render(&mut self, uniforms: &Uniforms) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("shader compile failed");
        }
        self.frames.push(uniforms.clone());
        Ok(())
    }

    fn set_size(&mut self, width: u16, height: u16) {
        self.size = (width, height);
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.ratio = ratio;
    }

    fn viewport(&self) -> (usize, usize) {
        (self.size.0 as usize * 2, self.size.1 as usize * 2)
    }
}

fn store() -> ParameterStore {
    let mut store = ParameterStore::new();
    let mut panel = TerminalPanel::new();
    BindingLayer::install(&mut store, &mut panel, &PresetLibrary::builtin(), 4.0)
        .expect("install");
    store
}

#[test]
fn tick_scales_time_to_sixty_hz_frames() {
    let store = store();
    let mut driver = FrameDriver::new(RecordingBackend::default());
    driver.tick(&store, 2.0).unwrap();
    assert_eq!(driver.uniforms().time, 120.0);
    assert_eq!(driver.backend().frames.len(), 1);
    assert_eq!(driver.backend().frames[0].time, 120.0);
}

#[test]
fn tick_pushes_every_store_value() {
    let mut store = store();
    store.set("thickness", ParamValue::Float(0.2)).unwrap();
    store
        .set("posOffset", ParamValue::Vec2(Vec2::new(0.1, -0.1)))
        .unwrap();
    store
        .set("baseColor", ParamValue::Color(Rgb::new(10.0, 20.0, 30.0)))
        .unwrap();
    store
        .set("preset", ParamValue::Choice("grid".to_string()))
        .unwrap();

    let mut driver = FrameDriver::new(RecordingBackend::default());
    driver.tick(&store, 0.5).unwrap();
    let u = driver.uniforms();
    assert_eq!(u.thickness, 0.2);
    assert_eq!(u.pos_offset, Vec2::new(0.1, -0.1));
    assert_eq!(u.box_dimensions, Vec2::ZERO);
    assert_eq!(u.base_color.to_array(), [10.0, 20.0, 30.0]);
    assert_eq!(u.tile, 4.0);
    assert_eq!(u.preset, "grid");
}

#[test]
fn store_edits_only_reach_slots_on_the_next_tick() {
    let mut store = store();
    let mut driver = FrameDriver::new(RecordingBackend::default());
    driver.tick(&store, 0.0).unwrap();

    store.set("tile", ParamValue::Float(9.0)).unwrap();
    assert_eq!(driver.uniforms().tile, 4.0, "set must not push by itself");

    driver.tick(&store, 0.1).unwrap();
    assert_eq!(driver.uniforms().tile, 9.0);
    assert_eq!(driver.backend().frames[0].tile, 4.0);
    assert_eq!(driver.backend().frames[1].tile, 9.0);
}

#[test]
fn stopped_driver_skips_rendering() {
    let store = store();
    let mut driver = FrameDriver::new(RecordingBackend::default());
    driver.tick(&store, 1.0).unwrap();
    driver.stop();
    assert!(!driver.is_running());
    driver.tick(&store, 5.0).unwrap();
    assert_eq!(driver.backend().frames.len(), 1);
    assert_eq!(driver.frames(), 1);
    assert_eq!(driver.uniforms().time, 60.0);
}

#[test]
fn backend_failure_propagates() {
    let store = store();
    let mut driver = FrameDriver::new(RecordingBackend {
        fail: true,
        ..RecordingBackend::default()
    });
    let err = driver.tick(&store, 1.0).expect_err("render failure must surface");
    let chain = format!("{err:#}");
    assert!(chain.contains("shader compile failed"), "unexpected error: {chain}");
    assert_eq!(driver.frames(), 0);
}

#[test]
fn resize_updates_backend_and_resolution_slot() {
    let mut driver = FrameDriver::new(RecordingBackend::default());
    driver.resize(80, 24);
    assert_eq!(driver.backend().size, (80, 24));
    assert_eq!(driver.uniforms().resolution, Vec2::new(160.0, 48.0));

    driver.set_pixel_ratio(2.0);
    assert_eq!(driver.backend().ratio, 2.0);
}

#[test]
fn pointer_is_kept_normalized() {
    let mut driver = FrameDriver::new(RecordingBackend::default());
    driver.pointer_moved(Vec2::new(0.25, 0.75));
    assert_eq!(driver.uniforms().mouse, Vec2::new(0.25, 0.75));
    driver.pointer_moved(Vec2::new(1.5, -0.2));
    assert_eq!(driver.uniforms().mouse, Vec2::new(1.0, 0.0));
}

#[test]
fn environment_slots_survive_the_store_push() {
    let store = store();
    let mut driver = FrameDriver::new(RecordingBackend::default());
    driver.resize(10, 10);
    driver.pointer_moved(Vec2::new(0.5, 0.5));
    driver.tick(&store, 1.0).unwrap();
    let u = driver.uniforms();
    assert_eq!(u.resolution, Vec2::new(20.0, 20.0));
    assert_eq!(u.mouse, Vec2::new(0.5, 0.5));
}
