use glam::Vec2;
use sdf_sandbox::params::{
    AxisConfig, ParamDescriptor, ParamError, ParamKind, ParamValue, ParameterStore, Picker, Rgb,
    UiConfig,
};

fn float_param(name: &str, v: f32) -> ParamDescriptor {
    ParamDescriptor::new(name, ParamValue::Float(v), UiConfig::range(0.0, 1.0, 0.01))
}

fn sample_store() -> ParameterStore {
    let mut store = ParameterStore::new();
    store.register(float_param("size", 0.5)).unwrap();
    store
        .register(ParamDescriptor::new(
            "posOffset",
            ParamValue::Vec2(Vec2::ZERO),
            UiConfig::inline_vec2(
                AxisConfig::new(-1.0, 1.0, 0.01),
                AxisConfig::new(-1.0, 1.0, 0.01).inverted(),
            ),
        ))
        .unwrap();
    store
        .register(ParamDescriptor::new(
            "baseColor",
            ParamValue::Color(Rgb::new(255.0, 0.0, 0.0)),
            UiConfig::default(),
        ))
        .unwrap();
    store
        .register(ParamDescriptor::new(
            "mode",
            ParamValue::Choice("a".to_string()),
            UiConfig::options(["a", "b"]),
        ))
        .unwrap();
    store
}

#[test]
fn register_exposes_defaults_in_registration_order() {
    assert!(ParameterStore::new().is_empty());
    let store = sample_store();
    assert!(!store.is_empty());
    assert!(store.contains("posOffset"));
    assert!(!store.contains("tile"));
    let names: Vec<&str> = store.names().collect();
    assert_eq!(names, ["size", "posOffset", "baseColor", "mode"]);
    assert_eq!(store.len(), 4);
    assert_eq!(store.float("size").unwrap(), 0.5);
    assert_eq!(store.vec2("posOffset").unwrap(), Vec2::ZERO);
    assert_eq!(store.color("baseColor").unwrap(), Rgb::new(255.0, 0.0, 0.0));
    assert_eq!(store.choice("mode").unwrap(), "a");
}

#[test]
fn duplicate_registration_is_rejected_and_store_is_untouched() {
    let mut store = ParameterStore::new();
    store.register(float_param("size", 0.5)).unwrap();
    store.set("size", ParamValue::Float(0.25)).unwrap();
    let before = store.clone();

    let err = store
        .register(float_param("size", 0.9))
        .expect_err("second registration must fail");
    assert_eq!(err, ParamError::Duplicate("size".to_string()));
    assert_eq!(store, before, "store changed after rejected registration");
    assert_eq!(store.len(), 1);
    assert_eq!(store.float("size").unwrap(), 0.25);
}

#[test]
fn set_rejects_wrong_kind_without_coercion() {
    let mut store = sample_store();
    let err = store
        .set("size", ParamValue::Vec2(Vec2::ONE))
        .expect_err("vec2 into float must fail");
    assert_eq!(
        err,
        ParamError::TypeMismatch {
            name: "size".to_string(),
            expected: ParamKind::Float,
            found: ParamKind::Vec2,
        }
    );
    assert_eq!(store.float("size").unwrap(), 0.5);
}

#[test]
fn set_rejects_unknown_names_and_invalid_choices() {
    let mut store = sample_store();
    assert_eq!(
        store.set("missing", ParamValue::Float(1.0)),
        Err(ParamError::Unknown("missing".to_string()))
    );
    assert!(matches!(
        store.set("mode", ParamValue::Choice("zzz".to_string())),
        Err(ParamError::InvalidChoice { .. })
    ));
    store
        .set("mode", ParamValue::Choice("b".to_string()))
        .expect("listed option must be accepted");
    assert_eq!(store.choice("mode").unwrap(), "b");
}

#[test]
fn typed_accessors_report_kind_errors() {
    let store = sample_store();
    assert!(matches!(
        store.vec2("size"),
        Err(ParamError::TypeMismatch { expected: ParamKind::Vec2, found: ParamKind::Float, .. })
    ));
    assert_eq!(
        store.float("nope"),
        Err(ParamError::Unknown("nope".to_string()))
    );
}

#[test]
fn set_is_last_write_wins() {
    let mut store = sample_store();
    for v in [0.1, 0.7, 0.3] {
        store.set("size", ParamValue::Float(v)).unwrap();
    }
    assert_eq!(store.float("size").unwrap(), 0.3);
}

#[test]
fn descriptor_keeps_ui_metadata() {
    let store = sample_store();
    let d = store.descriptor("posOffset").expect("descriptor");
    assert_eq!(d.kind(), ParamKind::Vec2);
    assert_eq!(d.ui.picker, Some(Picker::Inline));
    assert!(d.ui.expanded);
    assert!(d.ui.y.expect("y axis").inverted);
    assert!(!d.ui.x.expect("x axis").inverted);
}

#[test]
fn error_messages_name_the_parameter() {
    let err = ParamError::TypeMismatch {
        name: "tile".to_string(),
        expected: ParamKind::Float,
        found: ParamKind::Color,
    };
    assert_eq!(err.to_string(), "type mismatch for 'tile': expected float, got color");
    assert_eq!(
        ParamError::Duplicate("size".to_string()).to_string(),
        "parameter already registered: size"
    );
}
