use sceneconfig::{GestureTuning, MediaExtents, MediaKind};

use crate::geometry::{media_layout, MediaLayout};

/// Identity of the content currently on the stage. Changing subject resets
/// the expansion state so the new content starts collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub kind: MediaKind,
    pub identity: String,
}

impl Subject {
    pub fn new(kind: MediaKind, identity: impl Into<String>) -> Self {
        Self {
            kind,
            identity: identity.into(),
        }
    }
}

/// Scroll-intent input, already translated out of any windowing toolkit.
/// `delta_y` and `y` follow page conventions: positive wheel delta scrolls
/// the page down, touch y grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Wheel { delta_y: f32 },
    TouchStart { y: f32 },
    TouchMove { y: f32 },
    TouchEnd,
    TouchCancel,
    PageScrolled { offset: f32 },
    Resized { viewport_width: f32 },
}

/// What the host must do with the event it just delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The engine claimed the event; the page must not scroll.
    Consumed,
    /// Native behavior proceeds unchanged.
    PassThrough,
    /// The page must snap back to offset zero.
    RestoreTop,
}

/// Which side of the expansion boundary the engine is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    /// Not expanded; the engine captures scroll intent to grow the stage.
    Capturing,
    /// Fully expanded; the page owns scrolling again.
    Expanded,
}

/// Converts heterogeneous scroll intent into a single expansion progress
/// value in [0, 1] plus the expanded/content-visible flags derived from it.
///
/// Wheel and touch input drive progress while capturing. Reaching 1 expands
/// the stage and reveals content in the same update; a directional gesture
/// at the top of the page collapses it again without disturbing progress.
/// Content visibility has a hysteresis band: it only clears once progress
/// falls below the reveal floor.
#[derive(Debug, Clone)]
pub struct GestureEngine {
    tuning: GestureTuning,
    subject: Subject,
    progress: f32,
    expanded: bool,
    content_visible: bool,
    touch_anchor_y: Option<f32>,
    page_offset: f32,
    is_mobile: bool,
}

impl GestureEngine {
    pub fn new(subject: Subject, tuning: GestureTuning, viewport_width: f32) -> Self {
        Self {
            tuning,
            subject,
            progress: 0.0,
            expanded: false,
            content_visible: false,
            touch_anchor_y: None,
            page_offset: 0.0,
            is_mobile: viewport_width < tuning.mobile_breakpoint,
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn content_visible(&self) -> bool {
        self.content_visible
    }

    pub fn is_mobile(&self) -> bool {
        self.is_mobile
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn phase(&self) -> GesturePhase {
        if self.expanded {
            GesturePhase::Expanded
        } else {
            GesturePhase::Capturing
        }
    }

    /// Stage geometry for the current progress and breakpoint.
    pub fn layout(&self, extents: &MediaExtents) -> MediaLayout {
        media_layout(self.progress, self.is_mobile, extents)
    }

    /// Swaps the content on the stage. A genuine change force-resets
    /// progress and both flags; re-setting the same subject is a no-op.
    pub fn set_subject(&mut self, subject: Subject) {
        if self.subject == subject {
            return;
        }
        self.subject = subject;
        self.progress = 0.0;
        self.expanded = false;
        self.content_visible = false;
    }

    /// Applies one input event and reports what the host should do with it.
    pub fn handle(&mut self, event: InputEvent) -> EventOutcome {
        match event {
            InputEvent::Wheel { delta_y } => self.handle_wheel(delta_y),
            InputEvent::TouchStart { y } => {
                self.touch_anchor_y = Some(y);
                EventOutcome::PassThrough
            }
            InputEvent::TouchMove { y } => self.handle_touch_move(y),
            InputEvent::TouchEnd | InputEvent::TouchCancel => {
                self.touch_anchor_y = None;
                EventOutcome::PassThrough
            }
            InputEvent::PageScrolled { offset } => {
                self.page_offset = offset;
                if !self.expanded && offset > 0.0 {
                    EventOutcome::RestoreTop
                } else {
                    EventOutcome::PassThrough
                }
            }
            InputEvent::Resized { viewport_width } => {
                self.is_mobile = viewport_width < self.tuning.mobile_breakpoint;
                EventOutcome::PassThrough
            }
        }
    }

    fn handle_wheel(&mut self, delta_y: f32) -> EventOutcome {
        if self.expanded {
            // Collapse only on an upward wheel while the page sits at the top.
            if delta_y < 0.0 && self.page_offset <= self.tuning.release_slack {
                self.expanded = false;
                return EventOutcome::Consumed;
            }
            return EventOutcome::PassThrough;
        }

        self.apply_progress_delta(delta_y * self.tuning.wheel_gain);
        EventOutcome::Consumed
    }

    fn handle_touch_move(&mut self, y: f32) -> EventOutcome {
        let Some(anchor) = self.touch_anchor_y else {
            return EventOutcome::PassThrough;
        };
        let delta = anchor - y;

        if self.expanded {
            // The anchor stays put while expanded so the collapse test sees
            // the cumulative drag since the finger went down.
            if delta < -self.tuning.touch_release_drag
                && self.page_offset <= self.tuning.release_slack
            {
                self.expanded = false;
                return EventOutcome::Consumed;
            }
            return EventOutcome::PassThrough;
        }

        let gain = if delta < 0.0 {
            self.tuning.touch_gain_retreat
        } else {
            self.tuning.touch_gain_advance
        };
        self.apply_progress_delta(delta * gain);
        self.touch_anchor_y = Some(y);
        EventOutcome::Consumed
    }

    fn apply_progress_delta(&mut self, delta: f32) {
        self.progress = (self.progress + delta).clamp(0.0, 1.0);
        if self.progress >= 1.0 {
            self.expanded = true;
            self.content_visible = true;
        } else if self.progress < self.tuning.reveal_floor {
            self.content_visible = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> GestureEngine {
        GestureEngine::new(
            Subject::new(MediaKind::Video, "storm"),
            GestureTuning::default(),
            1280.0,
        )
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn wheel_progress_is_clamped_to_unit_interval() {
        let mut engine = engine();

        assert_eq!(
            engine.handle(InputEvent::Wheel { delta_y: -1200.0 }),
            EventOutcome::Consumed
        );
        assert_eq!(engine.progress(), 0.0);

        assert_eq!(
            engine.handle(InputEvent::Wheel { delta_y: 1200.0 }),
            EventOutcome::Consumed
        );
        assert_eq!(engine.progress(), 1.0);
        assert!(engine.is_expanded());
        assert!(engine.content_visible());
    }

    #[test]
    fn arbitrary_wheel_sequence_stays_in_unit_interval() {
        let mut engine = engine();
        let deltas = [
            300.0, -900.0, 47.5, 2200.0, -3.0, -5000.0, 610.0, 0.0, -0.5, 999.0,
        ];
        for delta_y in deltas {
            engine.handle(InputEvent::Wheel { delta_y });
            if engine.is_expanded() {
                // Re-enter capture so later deltas keep exercising the clamp.
                engine.handle(InputEvent::Wheel { delta_y: -1.0 });
            }
            let progress = engine.progress();
            assert!((0.0..=1.0).contains(&progress), "progress {progress}");
        }
    }

    #[test]
    fn single_large_wheel_expands_immediately() {
        let mut engine = engine();
        engine.handle(InputEvent::Wheel { delta_y: 1200.0 });
        assert_eq!(engine.progress(), 1.0);
        assert!(engine.is_expanded());
        assert!(engine.content_visible());
        assert_eq!(engine.phase(), GesturePhase::Expanded);
    }

    #[test]
    fn collapse_leaves_progress_at_full() {
        let mut engine = engine();
        engine.handle(InputEvent::Wheel { delta_y: 1200.0 });

        assert_eq!(
            engine.handle(InputEvent::Wheel { delta_y: -10.0 }),
            EventOutcome::Consumed
        );
        assert!(!engine.is_expanded());
        assert_eq!(engine.progress(), 1.0);
        assert_eq!(engine.phase(), GesturePhase::Capturing);
        // Content stays revealed until progress drops below the floor.
        assert!(engine.content_visible());
    }

    #[test]
    fn content_visibility_has_hysteresis_band() {
        let mut engine = engine();
        engine.handle(InputEvent::Wheel { delta_y: 1200.0 });
        engine.handle(InputEvent::Wheel { delta_y: -10.0 });

        engine.handle(InputEvent::Wheel { delta_y: -100.0 });
        assert_close(engine.progress(), 0.91);
        assert!(engine.content_visible());

        engine.handle(InputEvent::Wheel { delta_y: -100.0 });
        assert_close(engine.progress(), 0.82);
        assert!(engine.content_visible());

        engine.handle(InputEvent::Wheel { delta_y: -100.0 });
        assert_close(engine.progress(), 0.73);
        assert!(!engine.content_visible());

        // Climbing back through the band does not re-reveal early.
        engine.handle(InputEvent::Wheel { delta_y: 100.0 });
        assert_close(engine.progress(), 0.82);
        assert!(!engine.content_visible());

        engine.handle(InputEvent::Wheel { delta_y: 250.0 });
        assert_eq!(engine.progress(), 1.0);
        assert!(engine.content_visible());
        assert!(engine.is_expanded());
    }

    #[test]
    fn upward_wheel_away_from_top_passes_through() {
        let mut engine = engine();
        engine.handle(InputEvent::Wheel { delta_y: 1200.0 });
        engine.handle(InputEvent::PageScrolled { offset: 80.0 });

        assert_eq!(
            engine.handle(InputEvent::Wheel { delta_y: -50.0 }),
            EventOutcome::PassThrough
        );
        assert!(engine.is_expanded());
    }

    #[test]
    fn downward_wheel_while_expanded_passes_through() {
        let mut engine = engine();
        engine.handle(InputEvent::Wheel { delta_y: 1200.0 });

        assert_eq!(
            engine.handle(InputEvent::Wheel { delta_y: 40.0 }),
            EventOutcome::PassThrough
        );
        assert_eq!(
            engine.handle(InputEvent::Wheel { delta_y: 0.0 }),
            EventOutcome::PassThrough
        );
        assert!(engine.is_expanded());
    }

    #[test]
    fn touch_advance_uses_advance_gain() {
        let mut engine = engine();
        engine.handle(InputEvent::TouchStart { y: 500.0 });

        assert_eq!(
            engine.handle(InputEvent::TouchMove { y: 400.0 }),
            EventOutcome::Consumed
        );
        assert_close(engine.progress(), 0.5);

        // The anchor tracked to 400, so the next 100 px finishes the job.
        engine.handle(InputEvent::TouchMove { y: 300.0 });
        assert_eq!(engine.progress(), 1.0);
        assert!(engine.is_expanded());
        assert!(engine.content_visible());
    }

    #[test]
    fn touch_retreat_uses_retreat_gain() {
        let mut engine = engine();
        engine.handle(InputEvent::TouchStart { y: 500.0 });
        engine.handle(InputEvent::TouchMove { y: 450.0 });
        assert_close(engine.progress(), 0.25);

        engine.handle(InputEvent::TouchMove { y: 475.0 });
        assert_close(engine.progress(), 0.25 - 25.0 * 0.008);
    }

    #[test]
    fn touch_move_without_anchor_is_inert() {
        let mut engine = engine();
        assert_eq!(
            engine.handle(InputEvent::TouchMove { y: 120.0 }),
            EventOutcome::PassThrough
        );
        assert_eq!(engine.progress(), 0.0);
    }

    #[test]
    fn touch_end_clears_anchor() {
        let mut engine = engine();
        engine.handle(InputEvent::TouchStart { y: 500.0 });
        engine.handle(InputEvent::TouchEnd);

        assert_eq!(
            engine.handle(InputEvent::TouchMove { y: 300.0 }),
            EventOutcome::PassThrough
        );
        assert_eq!(engine.progress(), 0.0);
    }

    #[test]
    fn touch_collapse_needs_cumulative_drag_at_top() {
        let mut engine = engine();
        engine.handle(InputEvent::Wheel { delta_y: 1200.0 });
        engine.handle(InputEvent::TouchStart { y: 200.0 });

        // 10 px down is under the release drag; nothing happens.
        assert_eq!(
            engine.handle(InputEvent::TouchMove { y: 210.0 }),
            EventOutcome::PassThrough
        );
        assert!(engine.is_expanded());

        // 25 px cumulative crosses it.
        assert_eq!(
            engine.handle(InputEvent::TouchMove { y: 225.0 }),
            EventOutcome::Consumed
        );
        assert!(!engine.is_expanded());
        assert_eq!(engine.progress(), 1.0);

        // The anchor never moved while expanded, so the next move measures
        // from the original touch point.
        engine.handle(InputEvent::TouchMove { y: 225.0 });
        assert_close(engine.progress(), 1.0 - 25.0 * 0.008);
    }

    #[test]
    fn touch_collapse_blocked_away_from_top() {
        let mut engine = engine();
        engine.handle(InputEvent::Wheel { delta_y: 1200.0 });
        engine.handle(InputEvent::PageScrolled { offset: 50.0 });
        engine.handle(InputEvent::TouchStart { y: 200.0 });

        assert_eq!(
            engine.handle(InputEvent::TouchMove { y: 230.0 }),
            EventOutcome::PassThrough
        );
        assert!(engine.is_expanded());
    }

    #[test]
    fn scroll_away_from_top_restores_while_capturing() {
        let mut engine = engine();
        assert_eq!(
            engine.handle(InputEvent::PageScrolled { offset: 12.0 }),
            EventOutcome::RestoreTop
        );
        assert_eq!(
            engine.handle(InputEvent::PageScrolled { offset: 0.0 }),
            EventOutcome::PassThrough
        );

        engine.handle(InputEvent::Wheel { delta_y: 1200.0 });
        assert_eq!(
            engine.handle(InputEvent::PageScrolled { offset: 12.0 }),
            EventOutcome::PassThrough
        );
    }

    #[test]
    fn resize_flips_mobile_at_breakpoint() {
        let mut engine = engine();
        assert!(!engine.is_mobile());

        engine.handle(InputEvent::Resized {
            viewport_width: 767.0,
        });
        assert!(engine.is_mobile());

        engine.handle(InputEvent::Resized {
            viewport_width: 768.0,
        });
        assert!(!engine.is_mobile());
    }

    #[test]
    fn subject_change_resets_expansion_state() {
        let mut engine = engine();
        engine.handle(InputEvent::Wheel { delta_y: 1200.0 });
        assert!(engine.is_expanded());

        engine.set_subject(Subject::new(MediaKind::Image, "stills"));
        assert_eq!(engine.progress(), 0.0);
        assert!(!engine.is_expanded());
        assert!(!engine.content_visible());

        // Re-setting the same subject keeps state.
        engine.handle(InputEvent::Wheel { delta_y: 1200.0 });
        engine.set_subject(Subject::new(MediaKind::Image, "stills"));
        assert!(engine.is_expanded());
        assert_eq!(engine.progress(), 1.0);
    }

    #[test]
    fn full_session_walkthrough() {
        let mut engine = engine();

        // Idle wiggle upward does nothing.
        engine.handle(InputEvent::Wheel { delta_y: -1200.0 });
        assert_eq!(engine.progress(), 0.0);
        assert!(!engine.is_expanded());

        // One hard wheel down expands and reveals in the same update.
        engine.handle(InputEvent::Wheel { delta_y: 1200.0 });
        assert_eq!(engine.progress(), 1.0);
        assert!(engine.is_expanded());
        assert!(engine.content_visible());

        // Reading the revealed page below; wheel-up mid-page passes through.
        engine.handle(InputEvent::PageScrolled { offset: 40.0 });
        assert_eq!(
            engine.handle(InputEvent::Wheel { delta_y: -120.0 }),
            EventOutcome::PassThrough
        );
        assert!(engine.is_expanded());

        // Back near the top, the same gesture collapses the stage.
        engine.handle(InputEvent::PageScrolled { offset: 3.0 });
        assert_eq!(
            engine.handle(InputEvent::Wheel { delta_y: -120.0 }),
            EventOutcome::Consumed
        );
        assert!(!engine.is_expanded());
        assert_eq!(engine.progress(), 1.0);
    }
}
