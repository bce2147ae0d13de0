//! Fixed-rate frame driver: poll media, compile, rasterize, hand the frame to a sink.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::{
    editor::session::EditorSession,
    foundation::error::{QuadmapError, QuadmapResult},
    project::model::Project,
    render::backend::{FrameRGBA, RenderBackend},
    render::plan::compile_frame,
};

/// Paces the loop. `wait_next` blocks until the next frame is due and returns its index.
pub trait FrameClock {
    fn wait_next(&mut self) -> u64;
}

/// Wall-clock pacing at a fixed rate. Late frames are not skipped; pacing resumes from the
/// original schedule. Deadlines past `u32::MAX` frames or beyond what `Instant` can represent
/// do not sleep.
#[derive(Debug)]
pub struct FixedRateClock {
    interval: Duration,
    start: Option<Instant>,
    next: u64,
}

impl FixedRateClock {
    pub fn new(fps: f64) -> QuadmapResult<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(QuadmapError::validation("fps must be finite and > 0"));
        }
        let interval = Duration::try_from_secs_f64(1.0 / fps).map_err(|e| {
            QuadmapError::validation(format!("fps {fps} gives no usable interval: {e}"))
        })?;
        Ok(Self {
            interval,
            start: None,
            next: 0,
        })
    }
}

impl FrameClock for FixedRateClock {
    fn wait_next(&mut self) -> u64 {
        let start = *self.start.get_or_insert_with(Instant::now);
        // Unrepresentable deadlines are treated as already due.
        let due = u32::try_from(self.next)
            .ok()
            .and_then(|n| self.interval.checked_mul(n))
            .and_then(|offset| start.checked_add(offset));
        if let Some(wait) = due.and_then(|due| due.checked_duration_since(Instant::now())) {
            std::thread::sleep(wait);
        }
        let idx = self.next;
        self.next = self.next.saturating_add(1);
        idx
    }
}

/// Clock that never sleeps. For tests and offline rendering.
#[derive(Debug, Default)]
pub struct ManualClock {
    next: u64,
}

impl FrameClock for ManualClock {
    fn wait_next(&mut self) -> u64 {
        let idx = self.next;
        self.next += 1;
        idx
    }
}

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Clone, Debug)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
}

/// Consumer of rendered frames, called in strictly increasing frame order.
pub trait FrameSink {
    fn begin(&mut self, cfg: SinkConfig) -> QuadmapResult<()>;
    fn push_frame(&mut self, idx: u64, frame: &FrameRGBA) -> QuadmapResult<()>;
    fn end(&mut self) -> QuadmapResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(u64, FrameRGBA)>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    pub fn frames(&self) -> &[(u64, FrameRGBA)] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> QuadmapResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &FrameRGBA) -> QuadmapResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> QuadmapResult<()> {
        Ok(())
    }
}

/// Writes `frame_000000.png`, `frame_000001.png`, ... into a directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    written: u64,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: 0,
        }
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, _cfg: SinkConfig) -> QuadmapResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            QuadmapError::render(format!("create '{}': {e}", self.dir.display()))
        })?;
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &FrameRGBA) -> QuadmapResult<()> {
        frame.save_png(&self.dir.join(format!("frame_{idx:06}.png")))?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> QuadmapResult<()> {
        tracing::info!(frames = self.written, dir = %self.dir.display(), "png sequence written");
        Ok(())
    }
}

/// Drives `compile_frame` and a backend once per clock tick.
pub struct FrameLoop<'a> {
    backend: &'a mut dyn RenderBackend,
    clock: &'a mut dyn FrameClock,
}

impl<'a> FrameLoop<'a> {
    pub fn new(backend: &'a mut dyn RenderBackend, clock: &'a mut dyn FrameClock) -> Self {
        Self { backend, clock }
    }

    /// Render one frame of the current state.
    pub fn tick(
        &mut self,
        project: &Project,
        session: &EditorSession,
    ) -> QuadmapResult<(u64, FrameRGBA)> {
        let idx = self.clock.wait_next();
        let plan = compile_frame(project, session);
        let frame = self.backend.render_plan(&plan)?;
        Ok((idx, frame))
    }

    /// Render `frames` frames into `sink`. Media handles are polled afresh every frame, so
    /// sources that become ready mid-run switch from placeholder to content.
    pub fn run(
        &mut self,
        project: &Project,
        session: &EditorSession,
        sink: &mut dyn FrameSink,
        frames: u64,
    ) -> QuadmapResult<u64> {
        let vp = session.viewport();
        sink.begin(SinkConfig {
            width: vp.width,
            height: vp.height,
        })?;
        for _ in 0..frames {
            let (idx, frame) = self.tick(project, session)?;
            sink.push_frame(idx, &frame)?;
        }
        sink.end()?;
        tracing::debug!(frames, "frame loop finished");
        Ok(frames)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame_loop.rs"]
mod tests;
