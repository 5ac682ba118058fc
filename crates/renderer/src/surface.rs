use std::sync::Arc;
use std::time::Instant;

use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::fallback::GradientFallback;
use crate::gpu::{GpuContext, GpuState};
use crate::types::{LightningParams, StageRect};

enum SurfaceMode {
    /// GPU path: the lightning pipeline renders every scheduled frame.
    Animated {
        gpu: GpuState,
        _window: Arc<Window>,
    },
    /// No usable GPU: a static gradient is painted once per size.
    Static(GradientFallback),
    /// Nothing can be presented; every call is a no-op.
    Disabled,
}

/// Presentation facade for one window.
///
/// Construction never fails. If GPU context acquisition fails the surface
/// degrades to the software gradient; if the lightning pipeline itself is
/// rejected (or the software path is also unavailable) it goes quiet instead
/// of taking the host down.
pub struct LightningSurface {
    mode: SurfaceMode,
}

impl LightningSurface {
    pub fn new(window: Arc<Window>, size: PhysicalSize<u32>, params: &LightningParams) -> Self {
        let mode = match GpuContext::new(window.as_ref(), size) {
            Ok(context) => match GpuState::with_context(context, params) {
                Ok(gpu) => {
                    tracing::info!("initialised GPU surface {}x{}", size.width, size.height);
                    SurfaceMode::Animated {
                        gpu,
                        _window: window,
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "lightning pipeline rejected; surface disabled");
                    SurfaceMode::Disabled
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "GPU unavailable; falling back to static gradient");
                match GradientFallback::new(window, size, params) {
                    Ok(fallback) => SurfaceMode::Static(fallback),
                    Err(fallback_err) => {
                        tracing::error!(
                            error = %fallback_err,
                            "software fallback unavailable; surface disabled"
                        );
                        SurfaceMode::Disabled
                    }
                }
            }
        };
        Self { mode }
    }

    /// True when an animation loop should be driving this surface.
    pub fn is_animated(&self) -> bool {
        matches!(self.mode, SurfaceMode::Animated { .. })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        match &mut self.mode {
            SurfaceMode::Animated { gpu, .. } => gpu.resize(new_size),
            SurfaceMode::Static(fallback) => fallback.resize(new_size),
            SurfaceMode::Disabled => {}
        }
    }

    /// Presents one frame with the stage at `placement`.
    ///
    /// Surface errors only come back from the animated path; the fallback
    /// swallows its own failures by disabling the surface.
    pub fn render_frame(
        &mut self,
        now: Instant,
        placement: StageRect,
    ) -> Result<(), wgpu::SurfaceError> {
        match &mut self.mode {
            SurfaceMode::Animated { gpu, .. } => gpu.render(now, placement),
            SurfaceMode::Static(fallback) => {
                if let Err(err) = fallback.present_if_needed() {
                    tracing::error!(error = %err, "software fallback failed; disabling surface");
                    self.mode = SurfaceMode::Disabled;
                }
                Ok(())
            }
            SurfaceMode::Disabled => Ok(()),
        }
    }

    /// Releases GPU or software presentation resources. Idempotent; the
    /// surface stays usable as an inert shell afterwards.
    pub fn teardown(&mut self) {
        if !matches!(self.mode, SurfaceMode::Disabled) {
            tracing::debug!("tearing down lightning surface");
            self.mode = SurfaceMode::Disabled;
        }
    }
}
