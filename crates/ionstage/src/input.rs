use gesture::InputEvent;
use winit::dpi::PhysicalPosition;
use winit::event::{MouseScrollDelta, TouchPhase};

/// Logical pixels one wheel notch scrolls a page.
const WHEEL_NOTCH_PX: f32 = 120.0;

/// Translates winit pointer input into engine events.
///
/// The engine speaks the page convention: logical pixels, positive wheel
/// delta scrolls down, touch y grows downward. Winit reports physical pixels
/// with the opposite wheel sign, so both are converted here. Touch tracking
/// adopts the first finger and ignores every other one until it lifts.
#[derive(Debug, Default)]
pub struct InputTranslator {
    active_touch: Option<u64>,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wheel(&self, delta: MouseScrollDelta, scale_factor: f64) -> InputEvent {
        let delta_y = match delta {
            MouseScrollDelta::LineDelta(_, lines) => -lines * WHEEL_NOTCH_PX,
            MouseScrollDelta::PixelDelta(position) => {
                -(position.to_logical::<f64>(scale_factor).y as f32)
            }
        };
        InputEvent::Wheel { delta_y }
    }

    pub fn touch(
        &mut self,
        id: u64,
        phase: TouchPhase,
        location: PhysicalPosition<f64>,
        scale_factor: f64,
    ) -> Option<InputEvent> {
        let y = location.to_logical::<f64>(scale_factor).y as f32;
        match phase {
            TouchPhase::Started => {
                if self.active_touch.is_some() {
                    return None;
                }
                self.active_touch = Some(id);
                Some(InputEvent::TouchStart { y })
            }
            TouchPhase::Moved => {
                (self.active_touch == Some(id)).then_some(InputEvent::TouchMove { y })
            }
            TouchPhase::Ended => {
                if self.active_touch != Some(id) {
                    return None;
                }
                self.active_touch = None;
                Some(InputEvent::TouchEnd)
            }
            TouchPhase::Cancelled => {
                if self.active_touch != Some(id) {
                    return None;
                }
                self.active_touch = None;
                Some(InputEvent::TouchCancel)
            }
        }
    }
}
