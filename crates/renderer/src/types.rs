use winit::dpi::PhysicalSize;

/// Tunable inputs for the lightning fragment program.
///
/// `LightningParams` mirrors the per-section shader settings from the scene
/// file and tells the renderer what to feed the uniform block each frame.
/// The renderer deliberately has no serde surface of its own; callers convert
/// their config types into this struct at the boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightningParams {
    /// Base hue in degrees, `[0, 360)`.
    pub hue: f32,
    /// Horizontal offset applied to the noise domain.
    pub x_offset: f32,
    /// Time multiplier for the animation.
    pub speed: f32,
    /// Brightness multiplier applied to the final color.
    pub intensity: f32,
    /// Spatial frequency of the noise field.
    pub size: f32,
}

impl Default for LightningParams {
    /// Electric blue at unit speed, matching the built-in scene.
    fn default() -> Self {
        Self {
            hue: 230.0,
            x_offset: 0.0,
            speed: 1.0,
            intensity: 1.0,
            size: 1.0,
        }
    }
}

/// Placement of the lightning stage within the surface, in physical pixels.
///
/// The surface always covers the whole window; the stage is the sub-rectangle
/// the shader actually draws into (the media element grows and shrinks as the
/// reveal progresses). Origin is top-left, matching the windowing system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl StageRect {
    /// A stage covering the entire surface.
    pub fn full(size: PhysicalSize<u32>) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: size.width as f32,
            height: size.height as f32,
        }
    }

    /// Intersects the stage with the surface bounds.
    ///
    /// Viewports outside the render target are a validation error in wgpu, so
    /// the caller's layout math is clamped here rather than trusted.
    pub fn clamped_to(&self, size: PhysicalSize<u32>) -> Self {
        let max_w = size.width as f32;
        let max_h = size.height as f32;
        let x = self.x.clamp(0.0, max_w);
        let y = self.y.clamp(0.0, max_h);
        Self {
            x,
            y,
            width: self.width.max(0.0).min(max_w - x),
            height: self.height.max(0.0).min(max_h - y),
        }
    }

    /// True when the stage has no drawable area.
    pub fn is_empty(&self) -> bool {
        self.width < 1.0 || self.height < 1.0
    }
}
