use std::sync::Arc;

#[derive(Clone, Debug)]
/// One drawable frame in premultiplied RGBA8 form.
pub struct MediaFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
    /// Increments whenever the handle publishes new pixels. Renderers key caches on it.
    pub generation: u64,
}

impl MediaFrame {
    /// Whether the byte length matches the declared dimensions.
    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.rgba8_premul.len() == self.width as usize * self.height as usize * 4
    }
}

/// A playable or displayable media resource.
///
/// Both methods are polled from the render loop once per frame and must not block.
pub trait MediaHandle: Send {
    /// Whether [`MediaHandle::current_frame`] would return a frame now.
    fn is_ready(&self) -> bool;

    /// Latest drawable frame, or `None` while not ready (or after a permanent failure).
    fn current_frame(&self) -> Option<MediaFrame>;
}

/// A decoded still image. Always ready.
#[derive(Clone, Debug)]
pub struct StillImage {
    frame: MediaFrame,
}

impl StillImage {
    pub fn new(frame: MediaFrame) -> Self {
        Self { frame }
    }

    /// Solid-color image, handy for tests and calibration patterns.
    pub fn solid(width: u32, height: u32, rgba8_premul: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&rgba8_premul);
        }
        Self::new(MediaFrame {
            width,
            height,
            rgba8_premul: Arc::new(data),
            generation: 0,
        })
    }

    pub fn frame(&self) -> &MediaFrame {
        &self.frame
    }
}

impl MediaHandle for StillImage {
    fn is_ready(&self) -> bool {
        self.frame.is_well_formed()
    }

    fn current_frame(&self) -> Option<MediaFrame> {
        self.is_ready().then(|| self.frame.clone())
    }
}

/// A handle that never becomes ready. Stands in for sources whose media failed to open.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unavailable;

impl MediaHandle for Unavailable {
    fn is_ready(&self) -> bool {
        false
    }

    fn current_frame(&self) -> Option<MediaFrame> {
        None
    }
}
