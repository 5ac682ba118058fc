use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, warn};
use winit::dpi::PhysicalSize;

use crate::types::{LightningParams, StageRect};

use super::context::GpuContext;
use super::pipeline::{LightningPipeline, QUAD_VERTEX_COUNT};
use super::uniforms::LightningUniforms;

/// Everything needed to put one lightning frame on screen.
pub(crate) struct GpuState {
    context: GpuContext,
    pipeline: LightningPipeline,
    uniforms: LightningUniforms,
    start_time: Instant,
    frame_count: u32,
    last_fps_update: Instant,
    frames_since_last_update: u32,
    frames_per_second: f32,
}

impl GpuState {
    /// Builds the pipeline on an already-acquired context.
    ///
    /// Context acquisition and pipeline validation fail differently upstream:
    /// the former falls back to the CPU gradient, the latter disables the
    /// surface entirely.
    pub(crate) fn with_context(context: GpuContext, params: &LightningParams) -> Result<Self> {
        let uniforms = LightningUniforms::new(params);
        let pipeline = LightningPipeline::new(&context.device, context.surface_format, &uniforms)?;
        Ok(Self {
            context,
            pipeline,
            uniforms,
            start_time: Instant::now(),
            frame_count: 0,
            last_fps_update: Instant::now(),
            frames_since_last_update: 0,
            frames_per_second: 60.0,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
    }

    /// Renders one frame with the stage placed at `placement`.
    ///
    /// The whole surface is cleared to black and the quad is drawn through a
    /// viewport covering the clamped stage rectangle. Surface errors are
    /// returned to the caller, which owns the reconfigure/stop policy.
    pub(crate) fn render(
        &mut self,
        now: Instant,
        placement: StageRect,
    ) -> Result<(), wgpu::SurfaceError> {
        // Acquiring can block on the compositor, so measure it against the
        // observed frame budget.
        let frame_acquisition_start = Instant::now();
        let frame = self.context.surface.get_current_texture()?;
        let frame_acquisition_duration = frame_acquisition_start.elapsed();
        let frame_time_budget = Duration::from_secs_f32(1.0 / self.frames_per_second);
        if frame_acquisition_duration > frame_time_budget {
            warn!(
                "acquiring frame took {}ms, which is over the frame budget of {}ms (at {} FPS)",
                frame_acquisition_duration.as_millis(),
                frame_time_budget.as_millis(),
                self.frames_per_second.round(),
            );
        }

        self.frames_since_last_update += 1;
        let stats_now = Instant::now();
        let elapsed_since_fps_update = stats_now.saturating_duration_since(self.last_fps_update);
        if elapsed_since_fps_update >= Duration::from_secs(1) {
            self.frames_per_second =
                self.frames_since_last_update as f32 / elapsed_since_fps_update.as_secs_f32();
            self.frames_since_last_update = 0;
            self.last_fps_update = stats_now;
            debug!(
                fps = self.frames_per_second.round(),
                frame_count = self.frame_count,
                time = self.uniforms.time,
                "render stats"
            );
        }

        let stage = placement.clamped_to(self.context.size);
        self.uniforms
            .update_time(&mut self.start_time, &mut self.frame_count, now);
        self.uniforms.set_placement(stage);
        self.context.queue.write_buffer(
            &self.pipeline.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.uniforms),
        );

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lightning pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            if !stage.is_empty() {
                render_pass.set_pipeline(&self.pipeline.pipeline);
                render_pass.set_bind_group(0, &self.pipeline.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.pipeline.vertex_buffer.slice(..));
                render_pass.set_viewport(stage.x, stage.y, stage.width, stage.height, 0.0, 1.0);
                render_pass.draw(0..QUAD_VERTEX_COUNT, 0..1);
            }
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
