//! Lightning renderer for ionstage.
//!
//! The crate glues the preview window surface, the `wgpu` pipeline, and the
//! built-in lightning shader together. The overall flow is:
//!
//! ```text
//!   host event loop ──▶ FramePacer ──▶ FrameTicket
//!          │                               │ redeem
//!          ▼                               ▼
//!   LightningSurface::render_frame ──▶ GpuState ──▶ uniform block ─▶ GPU
//!          │
//!          └─▶ GradientFallback (no GPU) or Disabled (validation failure)
//! ```
//!
//! `LightningSurface` owns all presentation resources (surface, device,
//! pipeline, uniforms) and never panics on a host without GPU acceleration;
//! it degrades to a software gradient instead. `FramePacer` hands the host an
//! owned ticket for every scheduled frame, so cancellation on teardown is
//! explicit rather than best-effort.

mod compile;
mod fallback;
mod frame;
mod gpu;
mod surface;
mod types;

pub use frame::{FramePacer, FrameTicket, TickDecision};
pub use surface::LightningSurface;
pub use types::{LightningParams, StageRect};
pub use wgpu::SurfaceError;
