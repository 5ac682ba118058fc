//! CPU gradient fallback for hosts without a usable GPU.
//!
//! When adapter or device acquisition fails, the surface is painted once per
//! size with a static diagonal gradient derived from the section hue. No
//! animation loop runs in this mode.

use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::types::LightningParams;

/// Converts an HSL color to 8-bit RGB. Hue is in degrees and wraps.
fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> (u8, u8, u8) {
    let hue = hue.rem_euclid(360.0);
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    let channel = |v: f32| ((v + m) * 255.0).round() as u8;
    (channel(r), channel(g), channel(b))
}

/// Packs RGB into softbuffer's `0x00RRGGBB` pixel format.
fn pack_rgb((r, g, b): (u8, u8, u8)) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Gradient endpoints for a hue: a bright stop and a darker stop 60 degrees
/// around the wheel, matching the page's static backdrop.
fn gradient_stops(hue: f32) -> (u32, u32) {
    let start = pack_rgb(hsl_to_rgb(hue, 0.7, 0.5));
    let end = pack_rgb(hsl_to_rgb(hue + 60.0, 0.7, 0.3));
    (start, end)
}

fn mix_packed(start: u32, end: u32, t: f32) -> u32 {
    let lerp = |a: u32, b: u32| -> u32 {
        let a = a as f32;
        let b = b as f32;
        (a + (b - a) * t).round() as u32
    };
    let r = lerp((start >> 16) & 0xff, (end >> 16) & 0xff);
    let g = lerp((start >> 8) & 0xff, (end >> 8) & 0xff);
    let b = lerp(start & 0xff, end & 0xff);
    (r << 16) | (g << 8) | b
}

/// Fills `pixels` with a top-left to bottom-right linear gradient.
fn paint_gradient(pixels: &mut [u32], width: u32, height: u32, start: u32, end: u32) {
    let w = width as f32;
    let h = height as f32;
    let inv_len = 1.0 / (w * w + h * h);
    for y in 0..height {
        let row = (y * width) as usize;
        let y_term = y as f32 * h;
        for x in 0..width {
            let t = (x as f32 * w + y_term) * inv_len;
            pixels[row + x as usize] = mix_packed(start, end, t);
        }
    }
}

/// Software-presented gradient bound to a window for the renderer's lifetime.
pub(crate) struct GradientFallback {
    _context: softbuffer::Context<Arc<Window>>,
    surface: softbuffer::Surface<Arc<Window>, Arc<Window>>,
    size: PhysicalSize<u32>,
    hue: f32,
    painted: bool,
}

impl GradientFallback {
    pub(crate) fn new(
        window: Arc<Window>,
        size: PhysicalSize<u32>,
        params: &LightningParams,
    ) -> Result<Self> {
        let context = softbuffer::Context::new(window.clone())
            .map_err(|err| anyhow!("failed to create software presentation context: {err}"))?;
        let surface = softbuffer::Surface::new(&context, window)
            .map_err(|err| anyhow!("failed to create software surface: {err}"))?;
        Ok(Self {
            _context: context,
            surface,
            size,
            hue: params.hue,
            painted: false,
        })
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size != self.size {
            self.size = new_size;
            self.painted = false;
        }
    }

    /// Paints and presents the gradient unless the current size already has a
    /// presented frame. Zero-sized surfaces are skipped until the next resize.
    pub(crate) fn present_if_needed(&mut self) -> Result<()> {
        if self.painted {
            return Ok(());
        }
        let (Some(width), Some(height)) = (
            NonZeroU32::new(self.size.width),
            NonZeroU32::new(self.size.height),
        ) else {
            return Ok(());
        };
        self.surface
            .resize(width, height)
            .map_err(|err| anyhow!("failed to size software surface: {err}"))?;
        let mut buffer = self
            .surface
            .buffer_mut()
            .map_err(|err| anyhow!("failed to map software surface: {err}"))?;
        let (start, end) = gradient_stops(self.hue);
        paint_gradient(&mut buffer, self.size.width, self.size.height, start, end);
        buffer
            .present()
            .map_err(|err| anyhow!("failed to present software surface: {err}"))?;
        self.painted = true;
        Ok(())
    }
}
