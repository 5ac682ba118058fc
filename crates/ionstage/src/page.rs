use gesture::{EventOutcome, InputEvent, MediaLayout};
use renderer::StageRect;
use winit::dpi::PhysicalSize;

/// The reveal page is this many viewports tall; the hero sits at the top.
const CONTENT_SCREENS: f32 = 3.0;

/// The stage never grows past these fractions of the viewport.
const STAGE_MAX_WIDTH: f32 = 0.95;
const STAGE_MAX_HEIGHT: f32 = 0.85;

/// Stand-in for the scrollable page hosting the stage.
///
/// Tracks a scroll offset in logical pixels, applies pass-through scrolling
/// the way the platform would, and turns the engine's [`MediaLayout`] into a
/// physical-pixel [`StageRect`] centered in the window.
#[derive(Debug)]
pub struct PageViewport {
    size: PhysicalSize<u32>,
    scale_factor: f64,
    offset: f32,
    touch_anchor: Option<f32>,
}

impl PageViewport {
    pub fn new(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        Self {
            size,
            scale_factor,
            offset: 0.0,
            touch_anchor: None,
        }
    }

    /// Current scroll offset in logical pixels.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Viewport width in logical pixels, the unit the breakpoint compares.
    pub fn logical_width(&self) -> f32 {
        (self.size.width as f64 / self.scale_factor) as f32
    }

    pub fn logical_height(&self) -> f32 {
        (self.size.height as f64 / self.scale_factor) as f32
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.size = size;
        self.offset = self.offset.clamp(0.0, self.max_offset());
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        if scale_factor > 0.0 {
            self.scale_factor = scale_factor;
        }
    }

    /// Applies one delivered event according to the engine's verdict.
    ///
    /// Consumed touch moves still advance the anchor, so a later pass-through
    /// drag measures from the finger's latest position instead of jumping.
    pub fn observe(&mut self, event: InputEvent, outcome: EventOutcome) {
        if outcome == EventOutcome::RestoreTop {
            self.restore_top();
        }
        match event {
            InputEvent::Wheel { delta_y } => {
                if outcome == EventOutcome::PassThrough {
                    self.scroll_by(delta_y);
                }
            }
            InputEvent::TouchStart { y } => {
                self.touch_anchor = Some(y);
            }
            InputEvent::TouchMove { y } => {
                if let Some(anchor) = self.touch_anchor.replace(y) {
                    if outcome == EventOutcome::PassThrough {
                        // A drag upward pulls the content up, scrolling down.
                        self.scroll_by(anchor - y);
                    }
                }
            }
            InputEvent::TouchEnd | InputEvent::TouchCancel => {
                self.touch_anchor = None;
            }
            InputEvent::PageScrolled { .. } | InputEvent::Resized { .. } => {}
        }
    }

    pub fn restore_top(&mut self) {
        self.offset = 0.0;
    }

    /// Where the stage lands on the surface for the current layout: centered,
    /// scaled to physical pixels, and held inside the viewport margins.
    pub fn stage_rect(&self, layout: &MediaLayout) -> StageRect {
        let surface_width = self.size.width as f32;
        let surface_height = self.size.height as f32;
        let width = ((layout.width as f64 * self.scale_factor) as f32)
            .min(surface_width * STAGE_MAX_WIDTH);
        let height = ((layout.height as f64 * self.scale_factor) as f32)
            .min(surface_height * STAGE_MAX_HEIGHT);
        StageRect {
            x: (surface_width - width) / 2.0,
            y: (surface_height - height) / 2.0,
            width,
            height,
        }
    }

    fn scroll_by(&mut self, delta: f32) {
        self.offset = (self.offset + delta).clamp(0.0, self.max_offset());
    }

    fn max_offset(&self) -> f32 {
        self.logical_height() * (CONTENT_SCREENS - 1.0)
    }
}
