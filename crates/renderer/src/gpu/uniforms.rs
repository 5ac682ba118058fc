use std::time::Instant;

use bytemuck::{Pod, Zeroable};

use crate::types::{LightningParams, StageRect};

#[repr(C, align(8))]
#[derive(Clone, Copy)]
pub(crate) struct Std140Vec2 {
    value: [f32; 2],
}

unsafe impl Zeroable for Std140Vec2 {}
unsafe impl Pod for Std140Vec2 {}

/// CPU mirror of the `StageParams` uniform block in the fragment shader.
///
/// Layout is std140: the vec4 leads, scalars pack four bytes apart, and the
/// trailing vec2 pad lands on an 8-byte boundary so the struct rounds to 48
/// bytes. `resolution` carries the stage size in `xy` and its origin within
/// the surface in `zw`.
#[repr(C, align(16))]
#[derive(Clone, Copy)]
pub(crate) struct LightningUniforms {
    pub resolution: [f32; 4],
    pub time: f32,
    pub hue: f32,
    pub x_offset: f32,
    pub speed: f32,
    pub intensity: f32,
    pub size: f32,
    pub _padding: Std140Vec2,
}

unsafe impl Zeroable for LightningUniforms {}
unsafe impl Pod for LightningUniforms {}

impl LightningUniforms {
    pub fn new(params: &LightningParams) -> Self {
        Self {
            resolution: [0.0; 4],
            time: 0.0,
            hue: params.hue,
            x_offset: params.x_offset,
            speed: params.speed,
            intensity: params.intensity,
            size: params.size,
            _padding: Std140Vec2 { value: [0.0, 0.0] },
        }
    }

    pub fn set_placement(&mut self, stage: StageRect) {
        self.resolution = [stage.width, stage.height, stage.x, stage.y];
    }

    /// Advances shader time. The first presented frame resets the epoch so
    /// time 0 lines up with the first visible frame rather than with surface
    /// creation.
    pub fn update_time(&mut self, start_time: &mut Instant, frame_count: &mut u32, now: Instant) {
        if *frame_count == 0 {
            *start_time = now;
        }
        let elapsed = now.duration_since(*start_time);
        self.time = elapsed.as_secs_f32();
        *frame_count = frame_count.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn uniform_layout_matches_std140_offsets() {
        let uniforms = LightningUniforms::new(&LightningParams::default());
        let base = &uniforms as *const _ as usize;
        assert_eq!((&uniforms.resolution as *const _ as usize) - base, 0);
        assert_eq!((&uniforms.time as *const _ as usize) - base, 16);
        assert_eq!((&uniforms.hue as *const _ as usize) - base, 20);
        assert_eq!((&uniforms.x_offset as *const _ as usize) - base, 24);
        assert_eq!((&uniforms.speed as *const _ as usize) - base, 28);
        assert_eq!((&uniforms.intensity as *const _ as usize) - base, 32);
        assert_eq!((&uniforms.size as *const _ as usize) - base, 36);
        assert_eq!((&uniforms._padding as *const _ as usize) - base, 40);
        assert_eq!(std::mem::size_of::<LightningUniforms>(), 48);
        assert_eq!(std::mem::align_of::<LightningUniforms>(), 16);
    }

    #[test]
    fn new_copies_shader_params() {
        let params = LightningParams {
            hue: 120.0,
            x_offset: -0.3,
            speed: 2.0,
            intensity: 0.5,
            size: 1.5,
        };
        let uniforms = LightningUniforms::new(&params);
        assert_eq!(uniforms.hue, 120.0);
        assert_eq!(uniforms.x_offset, -0.3);
        assert_eq!(uniforms.speed, 2.0);
        assert_eq!(uniforms.intensity, 0.5);
        assert_eq!(uniforms.size, 1.5);
        assert_eq!(uniforms.time, 0.0);
    }

    #[test]
    fn placement_packs_size_and_origin() {
        let mut uniforms = LightningUniforms::new(&LightningParams::default());
        uniforms.set_placement(StageRect {
            x: 40.0,
            y: 60.0,
            width: 800.0,
            height: 450.0,
        });
        assert_eq!(uniforms.resolution, [800.0, 450.0, 40.0, 60.0]);
    }

    #[test]
    fn first_frame_resets_the_time_epoch() {
        let mut uniforms = LightningUniforms::new(&LightningParams::default());
        let mut start_time = Instant::now() - Duration::from_secs(100);
        let mut frame_count = 0;

        let first = Instant::now();
        uniforms.update_time(&mut start_time, &mut frame_count, first);
        assert_eq!(uniforms.time, 0.0);
        assert_eq!(frame_count, 1);

        uniforms.update_time(&mut start_time, &mut frame_count, first + Duration::from_secs(2));
        assert!((uniforms.time - 2.0).abs() < 1e-3);
        assert_eq!(frame_count, 2);
    }
}
