use glam::{Vec2, Vec3};
use sdf_sandbox::binding::BindingLayer;
use sdf_sandbox::panel::TerminalPanel;
use sdf_sandbox::params::{ParamDescriptor, ParamValue, ParameterStore, UiConfig};
use sdf_sandbox::preset::PresetLibrary;
use sdf_sandbox::shader::{
    self, check_slot_parity, fract, sd_box, shade, step, ShaderError, Uniforms, ENV_SLOTS,
};
use std::collections::BTreeSet;

fn square_uniforms() -> Uniforms {
    Uniforms {
        resolution: Vec2::new(100.0, 100.0),
        thickness: 0.03,
        pos_offset: Vec2::new(-0.5, -0.5),
        box_dimensions: Vec2::new(0.3, 0.3),
        base_color: Vec3::new(255.0, 0.0, 0.0),
        tile: 1.0,
        ..Uniforms::default()
    }
}

fn wrapped_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).abs();
    d.min(1.0 - d)
}

#[test]
fn installed_store_matches_slot_set_exactly() {
    let presets = PresetLibrary::builtin();
    let mut store = ParameterStore::new();
    let mut panel = TerminalPanel::new();
    BindingLayer::install(&mut store, &mut panel, &presets, 4.0).expect("install");

    let keys: BTreeSet<&str> = store.names().collect();
    let slots: BTreeSet<&str> = Uniforms::slot_names().collect();
    assert_eq!(keys, slots);
    for env in ENV_SLOTS {
        assert!(!store.contains(env), "environment slot '{env}' leaked into the store");
    }
    check_slot_parity(&store).expect("parity");
}

#[test]
fn parity_check_reports_orphans_both_ways() {
    let mut store = ParameterStore::new();
    store
        .register(ParamDescriptor::new(
            "glow",
            ParamValue::Float(1.0),
            UiConfig::default(),
        ))
        .unwrap();
    assert_eq!(
        check_slot_parity(&store),
        Err(ShaderError::UnknownSlot("glow".to_string()))
    );

    let mut partial = ParameterStore::new();
    partial
        .register(ParamDescriptor::new(
            "thickness",
            ParamValue::Float(0.5),
            UiConfig::default(),
        ))
        .unwrap();
    assert!(matches!(
        check_slot_parity(&partial),
        Err(ShaderError::MissingSlot(_))
    ));
}

#[test]
fn assign_rejects_mismatched_slot_kind() {
    let mut u = Uniforms::default();
    let err = u
        .assign("tile", &ParamValue::Vec2(Vec2::ONE))
        .expect_err("vec2 into float slot");
    assert!(matches!(err, ShaderError::SlotTypeMismatch { .. }));
    assert_eq!(u.tile, Uniforms::default().tile);
}

#[test]
fn box_centre_scores_above_every_threshold() {
    let v = sd_box(Vec2::ZERO, Vec2::new(0.3, 0.3));
    assert!((v - 1.3).abs() < 1e-6, "sd_box at centre = {v}");
    for i in 1..100 {
        let thickness = i as f32 / 100.0;
        assert_eq!(step(v, 1.0 - thickness), 0.0, "centre passed mask at thickness {thickness}");
    }
}

#[test]
fn sd_box_is_inverted_outside() {
    let b = Vec2::new(0.3, 0.3);
    let edge = sd_box(Vec2::new(0.3, 0.0), b);
    let outside = sd_box(Vec2::new(0.5, 0.0), b);
    let inside = sd_box(Vec2::new(0.1, 0.0), b);
    assert!((edge - 1.0).abs() < 1e-6);
    assert!((outside - 0.8).abs() < 1e-6);
    assert!(inside > edge && edge > outside);
}

#[test]
fn step_matches_glsl() {
    assert_eq!(step(0.5, 0.4), 0.0);
    assert_eq!(step(0.5, 0.5), 1.0);
    assert_eq!(step(0.5, 0.6), 1.0);
}

#[test]
fn tiling_is_periodic_in_the_lattice() {
    for tile in [1.0f32, 2.0, 4.0, 3.0] {
        for &(px, py) in &[(0.13f32, 0.71f32), (0.5, 0.25), (0.9, 0.05)] {
            let p = Vec2::new(px, py);
            let base = fract(p * tile);
            for k in -3..=3 {
                let shifted = fract((p + Vec2::splat(k as f32 / tile)) * tile);
                assert!(
                    wrapped_distance(base.x, shifted.x) < 1e-4
                        && wrapped_distance(base.y, shifted.y) < 1e-4,
                    "tile={tile} k={k} base={base:?} shifted={shifted:?}"
                );
            }
        }
    }
}

#[test]
fn square_pattern_is_dark_at_cell_centre_and_bright_in_the_gap() {
    let u = square_uniforms();

    let centre = shade(Vec2::new(89.0, 89.0), &u);
    assert_eq!(centre.truncate(), Vec3::ZERO, "cell centre should be masked out");
    assert_eq!(centre.w, 1.0);

    let gap = shade(Vec2::new(34.0, 34.0), &u);
    assert!((gap.x - 1.2).abs() < 1e-5, "base color should be brightened by 1.2, got {}", gap.x);
    assert_eq!(gap.y, 0.0);
    assert_eq!(gap.z, 0.0);
}

#[test]
fn zero_box_gives_radial_silhouette() {
    let thickness = 0.25;
    let threshold = 1.0 - thickness;
    let b = Vec2::ZERO;
    for p in [Vec2::new(0.4, 0.0), Vec2::new(0.0, 0.4), Vec2::new(0.283, 0.283)] {
        assert_eq!(step(sd_box(p, b), threshold), 1.0, "p={p:?} should be lit");
    }
    for p in [Vec2::new(0.2, 0.0), Vec2::new(0.0, -0.2), Vec2::new(0.14, 0.14)] {
        assert_eq!(step(sd_box(p, b), threshold), 0.0, "p={p:?} should be dark");
    }
}

#[test]
fn rasterize_fills_opaque_pixels_with_clamped_color() {
    let mut u = square_uniforms();
    u.resolution = Vec2::new(20.0, 10.0);
    let (w, h) = (20usize, 10usize);
    let mut buf = vec![0u8; w * h * 4];
    shader::rasterize(&u, w, h, 1, &mut buf);

    assert!(buf.chunks_exact(4).all(|px| px[3] == 255));
    assert!(buf.chunks_exact(4).all(|px| px[1] == 0 && px[2] == 0));
    assert!(buf.chunks_exact(4).any(|px| px[0] == 255), "no lit pixels");
    assert!(buf.chunks_exact(4).any(|px| px[0] == 0), "no masked pixels");
}

#[test]
fn rasterize_supersampling_only_blends_edges() {
    let mut u = square_uniforms();
    u.resolution = Vec2::new(32.0, 32.0);
    let mut one = vec![0u8; 32 * 32 * 4];
    let mut four = vec![0u8; 32 * 32 * 4];
    shader::rasterize(&u, 32, 32, 1, &mut one);
    shader::rasterize(&u, 32, 32, 4, &mut four);

    let partial = four
        .chunks_exact(4)
        .filter(|px| px[0] != 0 && px[0] != 255)
        .count();
    assert!(partial > 0, "supersampling should produce blended edge pixels");
    let differing = one
        .chunks_exact(4)
        .zip(four.chunks_exact(4))
        .filter(|(a, b)| a[0] != b[0])
        .count();
    assert!(differing < 32 * 32 / 2, "supersampling changed too much: {differing}");
}

#[test]
fn rasterize_ignores_short_buffers() {
    let u = square_uniforms();
    let mut buf = vec![7u8; 8];
    shader::rasterize(&u, 4, 4, 1, &mut buf);
    assert!(buf.iter().all(|&b| b == 7));
}

#[test]
fn uniforms_start_zeroed_and_take_registered_defaults_on_push() {
    let mut u = Uniforms::default();
    assert_eq!(u.time, 0.0);
    assert_eq!(u.thickness, 0.0);
    assert_eq!(u.tile, 0.0);
    assert_eq!(u.base_color, Vec3::ZERO);

    let mut store = ParameterStore::new();
    let mut panel = TerminalPanel::new();
    BindingLayer::install(&mut store, &mut panel, &PresetLibrary::builtin(), 4.0)
        .expect("install");
    u.push_from(&store).unwrap();
    assert_eq!(u.thickness, 0.5);
    assert_eq!(u.tile, 4.0);
    assert_eq!(u.base_color, Vec3::new(255.0, 0.0, 0.0));
    assert_eq!(u.preset, "none");
}
