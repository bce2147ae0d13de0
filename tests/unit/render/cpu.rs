use super::*;
use crate::foundation::core::Viewport;
use crate::media::handle::{MediaHandle, StillImage};
use crate::render::quad::{FeatherMask, content_affine, quad_path};
use crate::surface::model::{BlendMode, SurfaceId};

fn rect(x: f64, y: f64, w: f64, h: f64) -> [Point; 4] {
    [
        Point::new(x, y),
        Point::new(x + w, y),
        Point::new(x + w, y + h),
        Point::new(x, y + h),
    ]
}

fn placeholder(quad: [Point; 4], rgba: [u8; 4]) -> SurfaceOp {
    let [r, g, b, a] = rgba;
    SurfaceOp {
        surface: SurfaceId("s".to_owned()),
        quad,
        path: quad_path(&quad),
        fill: SurfaceFill::Placeholder {
            color: Rgba8Premul::from_straight_rgba(r, g, b, a),
        },
        opacity: 1.0,
        blend: BlendMode::Normal,
        brightness: 1.0,
        contrast: 1.0,
        saturate: 1.0,
        feather: None,
        overlay: None,
    }
}

fn media(quad: [Point; 4], rgba: [u8; 4]) -> SurfaceOp {
    let frame = StillImage::solid(4, 4, rgba).current_frame().unwrap();
    SurfaceOp {
        fill: SurfaceFill::Media {
            source: SourceId("src".to_owned()),
            transform: content_affine(&quad, 4.0, 4.0),
            frame,
        },
        ..placeholder(quad, [0, 0, 0, 0])
    }
}

fn plan(surfaces: Vec<SurfaceOp>) -> FramePlan {
    FramePlan {
        viewport: Viewport::new(64, 48).unwrap(),
        grid: None,
        surfaces,
    }
}

fn backend(clear: [u8; 4]) -> CpuBackend {
    CpuBackend::new(RenderSettings {
        clear_rgba: Some(clear),
        label_font: None,
    })
    .unwrap()
}

fn near(a: [u8; 4], b: [u8; 4], tol: i32) -> bool {
    a.iter().zip(b).all(|(x, y)| (i32::from(*x) - i32::from(y)).abs() <= tol)
}

#[test]
fn empty_plan_is_clear_color() {
    let f = backend([0, 0, 0, 255]).render_plan(&plan(Vec::new())).unwrap();
    assert_eq!((f.width, f.height), (64, 48));
    assert!(f.premultiplied);
    assert!(f.data.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
}

#[test]
fn placeholder_fills_only_the_quad() {
    let f = backend([0, 0, 0, 255])
        .render_plan(&plan(vec![placeholder(rect(8.0, 8.0, 32.0, 32.0), [255, 0, 0, 255])]))
        .unwrap();
    assert_eq!(f.pixel(20, 20), Some([255, 0, 0, 255]));
    assert_eq!(f.pixel(50, 20), Some([0, 0, 0, 255]));
}

#[test]
fn media_is_drawn_through_the_quad() {
    let f = backend([0, 0, 0, 255])
        .render_plan(&plan(vec![media(rect(10.0, 10.0, 20.0, 20.0), [0, 255, 0, 255])]))
        .unwrap();
    assert!(near(f.pixel(20, 20).unwrap(), [0, 255, 0, 255], 2));
    assert_eq!(f.pixel(5, 5), Some([0, 0, 0, 255]));
}

#[test]
fn media_is_clipped_to_non_parallelogram_quads() {
    let quad = [
        Point::new(0.0, 0.0),
        Point::new(40.0, 0.0),
        Point::new(20.0, 20.0),
        Point::new(0.0, 40.0),
    ];
    let f = backend([0, 0, 0, 255])
        .render_plan(&plan(vec![media(quad, [0, 0, 255, 255])]))
        .unwrap();
    assert!(near(f.pixel(5, 5).unwrap(), [0, 0, 255, 255], 2));
    assert_eq!(f.pixel(35, 35), Some([0, 0, 0, 255]));
}

#[test]
fn opacity_mixes_with_background() {
    let mut op = placeholder(rect(0.0, 0.0, 64.0, 48.0), [255, 255, 255, 255]);
    op.opacity = 0.5;
    let f = backend([0, 0, 0, 255]).render_plan(&plan(vec![op])).unwrap();
    assert!(near(f.pixel(30, 30).unwrap(), [128, 128, 128, 255], 2));
}

#[test]
fn multiply_blend_darkens_white_background() {
    let mut op = placeholder(rect(0.0, 0.0, 64.0, 48.0), [255, 0, 0, 255]);
    op.blend = BlendMode::Multiply;
    let f = backend([255, 255, 255, 255]).render_plan(&plan(vec![op])).unwrap();
    assert_eq!(f.pixel(30, 30), Some([255, 0, 0, 255]));
}

#[test]
fn brightness_filter_applies_to_surface_only() {
    let mut op = placeholder(rect(0.0, 0.0, 32.0, 48.0), [100, 100, 100, 255]);
    op.brightness = 2.0;
    let f = backend([10, 10, 10, 255]).render_plan(&plan(vec![op])).unwrap();
    assert!(near(f.pixel(10, 10).unwrap(), [200, 200, 200, 255], 1));
    assert_eq!(f.pixel(50, 10), Some([10, 10, 10, 255]));
}

#[test]
fn zero_saturation_renders_media_as_gray() {
    let mut op = media(rect(0.0, 0.0, 32.0, 48.0), [255, 0, 0, 255]);
    op.saturate = 0.0;
    let f = backend([0, 0, 0, 255]).render_plan(&plan(vec![op])).unwrap();
    assert!(near(f.pixel(16, 24).unwrap(), [54, 54, 54, 255], 2));
}

#[test]
fn feather_fades_toward_corners() {
    let quad = rect(0.0, 0.0, 48.0, 48.0);
    let mut op = placeholder(quad, [255, 255, 255, 255]);
    op.feather = FeatherMask::for_quad(&quad, 50.0);
    let f = backend([0, 0, 0, 255]).render_plan(&plan(vec![op])).unwrap();
    let center = f.pixel(24, 24).unwrap();
    let corner = f.pixel(1, 1).unwrap();
    assert!(center[0] > 240);
    assert!(corner[0] < 30);
}

#[test]
fn grid_lines_are_drawn_at_pitch() {
    let mut p = plan(Vec::new());
    p.grid = Some(10.0);
    let f = backend([0, 0, 0, 255]).render_plan(&p).unwrap();
    assert!(f.pixel(10, 5).unwrap()[0] > 0);
    assert_eq!(f.pixel(5, 5), Some([0, 0, 0, 255]));
}

#[test]
fn handles_are_drawn_at_corners() {
    let quad = rect(10.0, 10.0, 40.0, 30.0);
    let mut op = placeholder(quad, [0, 0, 0, 0]);
    op.overlay = Some(SurfaceOverlay {
        outline_rgba: [255, 0, 0, 255],
        outline_width: 1.0,
        handle_radius: 6.0,
        label: Some((Point::new(30.0, 25.0), "no source".to_owned())),
    });
    let f = backend([0, 0, 0, 255]).render_plan(&plan(vec![op])).unwrap();
    let handle = f.pixel(50, 40).unwrap();
    assert!(handle[2] > handle[0]);
    assert_eq!(f.pixel(30, 25), Some([0, 0, 0, 255]));
}

#[test]
fn degenerate_quads_render_without_panicking() {
    let quad = [Point::new(5.0, 5.0); 4];
    let f = backend([0, 0, 0, 255])
        .render_plan(&plan(vec![
            media(quad, [255, 255, 255, 255]),
            placeholder(quad, [255, 255, 255, 255]),
        ]))
        .unwrap();
    assert_eq!(f.pixel(30, 30), Some([0, 0, 0, 255]));
}

#[test]
fn image_cache_follows_frame_identity() {
    let mut b = backend([0, 0, 0, 255]);
    let quad = rect(0.0, 0.0, 64.0, 48.0);
    let red = b.render_plan(&plan(vec![media(quad, [255, 0, 0, 255])])).unwrap();
    let blue = b.render_plan(&plan(vec![media(quad, [0, 0, 255, 255])])).unwrap();
    assert!(near(red.pixel(30, 30).unwrap(), [255, 0, 0, 255], 2));
    assert!(near(blue.pixel(30, 30).unwrap(), [0, 0, 255, 255], 2));
}

#[test]
fn invalid_label_font_is_rejected() {
    let settings = RenderSettings {
        clear_rgba: None,
        label_font: Some(Arc::new(b"nope".to_vec())),
    };
    assert!(CpuBackend::new(settings).is_err());
}

#[derive(Clone, Default)]
struct LogBuf(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for LogBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn missing_label_font_is_logged_once_per_backend() {
    let buf = LogBuf::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut b = backend([0, 0, 0, 255]);
        let mut op = placeholder(rect(8.0, 8.0, 32.0, 32.0), [255, 0, 0, 255]);
        op.overlay = Some(SurfaceOverlay {
            outline_rgba: [255, 255, 255, 255],
            outline_width: 1.0,
            handle_radius: 6.0,
            label: Some((Point::new(24.0, 24.0), "no source".to_owned())),
        });
        b.render_plan(&plan(vec![op.clone()])).unwrap();
        b.render_plan(&plan(vec![op])).unwrap();
    });

    let logged = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
    assert_eq!(logged.matches("no label font configured").count(), 1, "{logged}");
}
