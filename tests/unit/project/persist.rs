use super::*;
use crate::media::handle::StillImage;
use crate::surface::model::SurfaceProps;

fn sample() -> Project {
    let mut p = Project::new(10);
    let src = p.sources_mut().add(
        "clip.mp4",
        MediaKind::Video,
        Box::new(StillImage::solid(2, 2, [0, 0, 0, 255])),
    );
    let id = p.add_surface(10.0, 20.0, 100.0, 50.0, &src).unwrap();
    p.set_surface_props(
        &id,
        SurfaceProps {
            opacity: Some(0.5),
            feather: Some(12.0),
            blend_mode: Some(BlendMode::Screen),
            ..SurfaceProps::default()
        },
    )
    .unwrap();
    p
}

#[test]
fn save_then_load_restores_surfaces_and_unbound_sources() {
    let original = sample();
    let text = original.to_json_string().unwrap();

    let mut loaded = Project::new(10);
    loaded.load_json_str(&text).unwrap();
    assert_eq!(loaded.surfaces(), original.surfaces());
    assert_eq!(loaded.sources().len(), 1);
    let src = loaded.sources().iter().next().unwrap();
    assert_eq!(src.display_name, "clip.mp4");
    assert_eq!(src.kind, MediaKind::Video);
    assert!(!src.is_bound());
    assert_eq!(loaded.history().len(), 1);
    assert!(!loaded.history().can_undo());
}

#[test]
fn json_uses_camel_case_field_names() {
    let text = sample().to_json_string().unwrap();
    assert!(text.contains("\"sourceId\""));
    assert!(text.contains("\"blendMode\": \"screen\""));
    assert!(text.contains("\"isVideo\": true"));
    assert!(text.contains("hsl("));
}

#[test]
fn optional_visual_fields_default_to_neutral() {
    let text = r#"{
        "version": 1,
        "surfaces": [{
            "id": "a",
            "points": [{"x":0,"y":0},{"x":1,"y":0},{"x":1,"y":1},{"x":0,"y":1}]
        }],
        "sources": []
    }"#;
    let p = Project::from_json_str(text, 10).unwrap();
    let s = &p.surfaces()[0];
    assert_eq!(s.opacity, 1.0);
    assert_eq!(s.brightness, 1.0);
    assert_eq!(s.contrast, 1.0);
    assert_eq!(s.saturate, 1.0);
    assert_eq!(s.feather, 0.0);
    assert_eq!(s.blend_mode, BlendMode::Normal);
    assert_eq!(s.source_id, None);
}

#[test]
fn malformed_load_leaves_project_unchanged() {
    let mut p = sample();
    let before = p.surfaces().to_vec();
    let depth = p.history().len();

    let three_points = r#"{"surfaces":[{"id":"a","points":[{"x":0,"y":0},{"x":1,"y":0},{"x":1,"y":1}]}]}"#;
    assert!(matches!(
        p.load_json_str(three_points),
        Err(QuadmapError::Load(_))
    ));
    let bad_opacity = r#"{"surfaces":[{"id":"a","opacity":4,"points":[{"x":0,"y":0},{"x":1,"y":0},{"x":1,"y":1},{"x":0,"y":1}]}]}"#;
    assert!(p.load_json_str(bad_opacity).is_err());
    let unknown_field = r#"{"surfaces":[{"id":"a","wobble":1,"points":[{"x":0,"y":0},{"x":1,"y":0},{"x":1,"y":1},{"x":0,"y":1}]}]}"#;
    assert!(p.load_json_str(unknown_field).is_err());
    let unknown_top_level = r#"{"version":1,"surfaces":[],"sources":[],"zoom":2}"#;
    assert!(p.load_json_str(unknown_top_level).is_err());
    let unknown_source_field =
        r#"{"sources":[{"id":"s","name":"a.png","isVideo":false,"muted":true}]}"#;
    assert!(p.load_json_str(unknown_source_field).is_err());
    let negative_saturate = r#"{"surfaces":[{"id":"a","saturate":-1,"points":[{"x":0,"y":0},{"x":1,"y":0},{"x":1,"y":1},{"x":0,"y":1}]}]}"#;
    assert!(p.load_json_str(negative_saturate).is_err());
    assert!(p.load_json_str("not json").is_err());

    assert_eq!(p.surfaces(), before.as_slice());
    assert_eq!(p.sources().len(), 1);
    assert_eq!(p.history().len(), depth);
}

#[test]
fn duplicate_ids_and_future_versions_are_rejected() {
    let dup = r#"{"surfaces":[
        {"id":"a","points":[{"x":0,"y":0},{"x":1,"y":0},{"x":1,"y":1},{"x":0,"y":1}]},
        {"id":"a","points":[{"x":0,"y":0},{"x":1,"y":0},{"x":1,"y":1},{"x":0,"y":1}]}
    ]}"#;
    assert!(Project::from_json_str(dup, 10).is_err());
    assert!(Project::from_json_str(r#"{"version": 99}"#, 10).is_err());
}

#[test]
fn save_and_load_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("show.json");
    let original = sample();
    original.save_to_path(&path).unwrap();

    let mut loaded = Project::default();
    loaded.load_from_path(&path).unwrap();
    assert_eq!(loaded.surfaces(), original.surfaces());

    let missing = dir.path().join("missing.json");
    assert!(matches!(
        loaded.load_from_path(&missing),
        Err(QuadmapError::Other(_))
    ));
}
