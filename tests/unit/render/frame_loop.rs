use super::*;
use crate::foundation::config::EditorConfig;
use crate::foundation::core::Viewport;
use crate::media::handle::{MediaFrame, MediaHandle};
use crate::media::registry::MediaKind;
use crate::render::backend::RenderSettings;
use crate::render::cpu::CpuBackend;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

struct Gate {
    ready: Arc<AtomicBool>,
}

impl MediaHandle for Gate {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn current_frame(&self) -> Option<MediaFrame> {
        self.is_ready().then(|| MediaFrame {
            width: 1,
            height: 1,
            rgba8_premul: Arc::new(vec![0, 255, 0, 255]),
            generation: 1,
        })
    }
}

fn live_session() -> EditorSession {
    let mut cfg = EditorConfig::default();
    cfg.show_grid = false;
    EditorSession::new(cfg, Viewport::new(32, 32).unwrap())
}

fn cpu() -> CpuBackend {
    CpuBackend::new(RenderSettings {
        clear_rgba: Some([0, 0, 0, 255]),
        label_font: None,
    })
    .unwrap()
}

#[test]
fn manual_clock_counts_up() {
    let mut c = ManualClock::default();
    assert_eq!(c.wait_next(), 0);
    assert_eq!(c.wait_next(), 1);
}

#[test]
fn fixed_rate_clock_rejects_bad_fps() {
    assert!(FixedRateClock::new(0.0).is_err());
    assert!(FixedRateClock::new(f64::NAN).is_err());
    let mut c = FixedRateClock::new(1000.0).unwrap();
    assert_eq!(c.wait_next(), 0);
    assert_eq!(c.wait_next(), 1);
}

#[test]
fn fixed_rate_clock_rejects_rates_with_unrepresentable_intervals() {
    let err = FixedRateClock::new(1e-30).unwrap_err();
    assert!(matches!(err, QuadmapError::Validation(_)));
    assert!(FixedRateClock::new(f64::MIN_POSITIVE).is_err());
}

#[test]
fn fixed_rate_clock_does_not_overflow_far_deadlines() {
    // Frame indices past u32::MAX have no representable deadline and return at once.
    let mut c = FixedRateClock::new(1e-9).unwrap();
    c.next = u64::from(u32::MAX) + 1;
    assert_eq!(c.wait_next(), u64::from(u32::MAX) + 1);

    let mut c = FixedRateClock::new(1000.0).unwrap();
    c.next = u64::MAX;
    assert_eq!(c.wait_next(), u64::MAX);
    assert_eq!(c.next, u64::MAX);
}

#[test]
fn run_pushes_frames_in_order() {
    let project = Project::new(10);
    let session = live_session();
    let mut backend = cpu();
    let mut clock = ManualClock::default();
    let mut sink = InMemorySink::new();

    let n = FrameLoop::new(&mut backend, &mut clock)
        .run(&project, &session, &mut sink, 3)
        .unwrap();
    assert_eq!(n, 3);
    assert_eq!(sink.config().unwrap().width, 32);
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| *i).collect();
    assert_eq!(idx, vec![0, 1, 2]);
}

#[test]
fn placeholder_switches_to_content_once_ready() {
    let ready = Arc::new(AtomicBool::new(false));
    let mut project = Project::new(10);
    let src = project.sources_mut().add(
        "cam",
        MediaKind::Video,
        Box::new(Gate {
            ready: ready.clone(),
        }),
    );
    project.add_surface(0.0, 0.0, 32.0, 32.0, &src).unwrap();
    let mut session = live_session();
    session.enter_live(&mut project, Viewport::new(32, 32).unwrap());

    let mut backend = cpu();
    let mut clock = ManualClock::default();
    let mut frame_loop = FrameLoop::new(&mut backend, &mut clock);

    let (_, before) = frame_loop.tick(&project, &session).unwrap();
    let placeholder = project.surfaces()[0].color.to_rgba().to_array();
    assert_eq!(before.pixel(16, 16), Some(placeholder));

    ready.store(true, Ordering::SeqCst);
    let (_, after) = frame_loop.tick(&project, &session).unwrap();
    let px = after.pixel(16, 16).unwrap();
    assert!(px[0] < 3 && px[1] > 252 && px[3] == 255);
}

#[test]
fn png_sequence_sink_writes_numbered_files() {
    let dir = tempfile::tempdir().unwrap();
    let project = Project::new(10);
    let session = live_session();
    let mut backend = cpu();
    let mut clock = ManualClock::default();
    let mut sink = PngSequenceSink::new(dir.path().join("out"));

    FrameLoop::new(&mut backend, &mut clock)
        .run(&project, &session, &mut sink, 2)
        .unwrap();
    assert_eq!(sink.written(), 2);
    assert!(dir.path().join("out/frame_000000.png").is_file());
    assert!(dir.path().join("out/frame_000001.png").is_file());
}
