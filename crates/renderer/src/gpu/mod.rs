//! GPU path for the lightning effect.
//!
//! - `context` owns wgpu instance/device/surface wiring and knows how to
//!   rebuild swapchain state when the window resizes.
//! - `uniforms` mirrors the shader's std140 parameter block and advances the
//!   animation clock.
//! - `pipeline` compiles the built-in GLSL into a render pipeline with a
//!   single validated bind group.
//! - `state` glues everything together and exposes the `GpuState` API the
//!   surface facade drives once per frame.

mod context;
mod pipeline;
mod state;
pub(crate) mod uniforms;

pub(crate) use context::GpuContext;
pub(crate) use state::GpuState;
