//! Looping video playback through the system `ffmpeg` binary.
//!
//! Decoding runs on a background thread that publishes the most recent frame into a shared slot.
//! The render loop only polls that slot, so a slow or broken decoder never stalls a frame; a
//! stream that fails simply stays not-ready and renders as a placeholder.

use std::{
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::{
    foundation::error::{QuadmapError, QuadmapResult},
    media::handle::{MediaFrame, MediaHandle},
};

#[derive(Clone, Debug, PartialEq)]
/// Probed video stream metadata.
pub struct VideoSourceInfo {
    pub source_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps_num: u32,
    pub fps_den: u32,
}

impl VideoSourceInfo {
    pub fn source_fps(&self) -> f64 {
        if self.fps_den == 0 {
            0.0
        } else {
            f64::from(self.fps_num) / f64::from(self.fps_den)
        }
    }

    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

#[derive(Default)]
struct SharedSlot {
    latest: Mutex<Option<MediaFrame>>,
    failed: AtomicBool,
    stop: AtomicBool,
}

/// Looping video handle. Ready once the first frame has been decoded.
pub struct VideoStream {
    info: VideoSourceInfo,
    shared: Arc<SharedSlot>,
    worker: Option<std::thread::JoinHandle<()>>,
}

impl std::fmt::Debug for VideoStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoStream")
            .field("info", &self.info)
            .field("failed", &self.has_failed())
            .finish()
    }
}

impl VideoStream {
    /// Probe `path` and start looping playback on a background thread.
    pub fn open(path: &Path) -> QuadmapResult<Self> {
        let info = probe_video(path)?;
        let shared = Arc::new(SharedSlot::default());
        let worker = spawn_decoder(info.clone(), Arc::clone(&shared))?;
        Ok(Self {
            info,
            shared,
            worker: Some(worker),
        })
    }

    pub fn info(&self) -> &VideoSourceInfo {
        &self.info
    }

    /// Whether the decoder gave up. A failed stream never becomes ready again.
    pub fn has_failed(&self) -> bool {
        self.shared.failed.load(Ordering::Acquire)
    }
}

impl MediaHandle for VideoStream {
    fn is_ready(&self) -> bool {
        !self.has_failed()
            && self
                .shared
                .latest
                .lock()
                .map(|slot| slot.is_some())
                .unwrap_or(false)
    }

    fn current_frame(&self) -> Option<MediaFrame> {
        if self.has_failed() {
            return None;
        }
        self.shared
            .latest
            .lock()
            .ok()
            .and_then(|slot| slot.clone())
    }
}

impl Drop for VideoStream {
    fn drop(&mut self) {
        self.shared.stop.store(true, Ordering::Release);
        // The worker notices the flag after its next frame read; do not wait for it here.
        drop(self.worker.take());
    }
}

#[cfg(feature = "media-ffmpeg")]
pub fn probe_video(source_path: &Path) -> QuadmapResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
    }

    let out = std::process::Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_streams"])
        .arg(source_path)
        .output()
        .map_err(|e| QuadmapError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(QuadmapError::media(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| QuadmapError::media(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| QuadmapError::media("no video stream found"))?;
    let width = video_stream
        .width
        .filter(|&w| w > 0)
        .ok_or_else(|| QuadmapError::media("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .filter(|&h| h > 0)
        .ok_or_else(|| QuadmapError::media("missing video height from ffprobe"))?;
    let (fps_num, fps_den) = parse_ff_ratio(video_stream.r_frame_rate.as_deref().unwrap_or("0/1"))
        .ok_or_else(|| QuadmapError::media("invalid video r_frame_rate"))?;

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        fps_num,
        fps_den,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn probe_video(_source_path: &Path) -> QuadmapResult<VideoSourceInfo> {
    Err(QuadmapError::media(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

#[cfg(feature = "media-ffmpeg")]
fn spawn_decoder(
    info: VideoSourceInfo,
    shared: Arc<SharedSlot>,
) -> QuadmapResult<std::thread::JoinHandle<()>> {
    use std::io::Read;
    use std::process::{Command, Stdio};

    let mut child = Command::new("ffmpeg")
        .args(["-v", "error", "-re", "-stream_loop", "-1", "-i"])
        .arg(&info.source_path)
        .args(["-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| QuadmapError::media(format!("failed to spawn ffmpeg: {e}")))?;
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| QuadmapError::media("ffmpeg stdout was not captured"))?;

    let name = format!("quadmap-video-{}", info.source_path.display());
    std::thread::Builder::new()
        .name(name)
        .spawn(move || {
            let mut buf = vec![0u8; info.frame_len()];
            let mut generation = 0u64;
            while !shared.stop.load(Ordering::Acquire) {
                if let Err(e) = stdout.read_exact(&mut buf) {
                    tracing::warn!(
                        path = %info.source_path.display(),
                        error = %e,
                        "video decode stopped"
                    );
                    shared.failed.store(true, Ordering::Release);
                    break;
                }
                let mut pixels = buf.clone();
                crate::media::decode::premultiply_rgba8_in_place(&mut pixels);
                generation = generation.wrapping_add(1);
                let frame = MediaFrame {
                    width: info.width,
                    height: info.height,
                    rgba8_premul: Arc::new(pixels),
                    generation,
                };
                match shared.latest.lock() {
                    Ok(mut slot) => *slot = Some(frame),
                    Err(_) => {
                        shared.failed.store(true, Ordering::Release);
                        break;
                    }
                }
            }
            let _ = child.kill();
            let _ = child.wait();
        })
        .map_err(|e| QuadmapError::media(format!("failed to spawn decoder thread: {e}")))
}

#[cfg(not(feature = "media-ffmpeg"))]
fn spawn_decoder(
    _info: VideoSourceInfo,
    _shared: Arc<SharedSlot>,
) -> QuadmapResult<std::thread::JoinHandle<()>> {
    Err(QuadmapError::media(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

#[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.parse::<u32>().ok()?;
    let b = parts.next()?.parse::<u32>().ok()?;
    if b == 0 {
        return None;
    }
    Some((a, b))
}
