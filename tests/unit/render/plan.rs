use super::*;
use crate::foundation::config::EditorConfig;
use crate::media::handle::{StillImage, Unavailable};
use crate::media::registry::MediaKind;
use crate::surface::model::SurfaceProps;

fn session() -> EditorSession {
    EditorSession::new(EditorConfig::default(), Viewport::new(400, 300).unwrap())
}

fn label_of(op: &SurfaceOp) -> Option<&str> {
    op.overlay
        .as_ref()
        .and_then(|o| o.label.as_ref())
        .map(|(_, t)| t.as_str())
}

#[test]
fn ready_media_compiles_to_affine_fill() {
    let mut p = Project::new(10);
    let src = p
        .sources_mut()
        .add("a.png", MediaKind::Image, Box::new(StillImage::solid(4, 2, [1, 2, 3, 255])));
    p.add_surface(10.0, 20.0, 40.0, 20.0, &src).unwrap();

    let plan = compile_frame(&p, &session());
    let op = &plan.surfaces[0];
    let SurfaceFill::Media { transform, frame, .. } = &op.fill else {
        panic!("expected media fill");
    };
    assert_eq!(frame.width, 4);
    assert_eq!(*transform * Point::new(4.0, 2.0), Point::new(50.0, 40.0));
    assert_eq!(label_of(op), None);
}

#[test]
fn placeholder_labels_describe_why() {
    let mut p = Project::new(10);
    let pending = p
        .sources_mut()
        .add("a-very-long-video-name.mp4", MediaKind::Video, Box::new(Unavailable));
    let gone = p
        .sources_mut()
        .add("gone.png", MediaKind::Image, Box::new(Unavailable));
    let a = p.add_surface(0.0, 0.0, 10.0, 10.0, &pending).unwrap();
    let b = p.add_surface(0.0, 0.0, 10.0, 10.0, &gone).unwrap();
    p.remove_source(&gone);

    let c = p.add_surface(0.0, 0.0, 10.0, 10.0, &pending).unwrap();
    p.rebind_source(&c, None).unwrap();

    let plan = compile_frame(&p, &session());
    let by_id = |id: &SurfaceId| plan.surfaces.iter().find(|op| &op.surface == id).unwrap();
    assert_eq!(label_of(by_id(&a)), Some("a-very-long-vid"));
    assert_eq!(label_of(by_id(&b)), Some("missing source"));
    assert_eq!(label_of(by_id(&c)), Some("no source"));
    assert!(matches!(by_id(&a).fill, SurfaceFill::Placeholder { .. }));
}

#[test]
fn live_mode_drops_grid_overlays_and_feather() {
    let mut p = Project::new(10);
    let src = p
        .sources_mut()
        .add("a.png", MediaKind::Image, Box::new(Unavailable));
    let id = p.add_surface(0.0, 0.0, 100.0, 100.0, &src).unwrap();
    p.set_surface_props(
        &id,
        SurfaceProps {
            feather: Some(20.0),
            ..SurfaceProps::default()
        },
    )
    .unwrap();

    let mut s = session();
    let edit = compile_frame(&p, &s);
    assert_eq!(edit.grid, Some(20.0));
    assert!(edit.surfaces[0].overlay.is_some());
    assert!(edit.surfaces[0].feather.is_some());

    let vp = s.viewport();
    s.enter_live(&mut p, vp);
    let live = compile_frame(&p, &s);
    assert_eq!(live.grid, None);
    assert!(live.surfaces[0].overlay.is_none());
    assert!(live.surfaces[0].feather.is_none());
    assert!(matches!(live.surfaces[0].fill, SurfaceFill::Placeholder { .. }));
}

#[test]
fn selected_surface_gets_highlight_outline() {
    let mut p = Project::new(10);
    let src = p
        .sources_mut()
        .add("a.png", MediaKind::Image, Box::new(Unavailable));
    let a = p.add_surface(0.0, 0.0, 10.0, 10.0, &src).unwrap();
    p.add_surface(20.0, 0.0, 10.0, 10.0, &src).unwrap();
    let mut s = session();
    s.select(Some(a));

    let plan = compile_frame(&p, &s);
    let outline = |i: usize| plan.surfaces[i].overlay.as_ref().unwrap().outline_rgba;
    assert_eq!(outline(0), SELECTED_RGBA);
    assert_eq!(outline(1), OUTLINE_RGBA);
}

#[test]
fn paint_order_follows_insertion_order() {
    let mut p = Project::new(10);
    let src = p
        .sources_mut()
        .add("a.png", MediaKind::Image, Box::new(Unavailable));
    let ids: Vec<_> = (0..3)
        .map(|i| p.add_surface(f64::from(i), 0.0, 5.0, 5.0, &src).unwrap())
        .collect();
    let plan = compile_frame(&p, &session());
    let order: Vec<_> = plan.surfaces.iter().map(|op| op.surface.clone()).collect();
    assert_eq!(order, ids);
}
