//! Frame scheduling with explicit, owned cancellation.
//!
//! The host event loop asks the pacer for a [`FrameTicket`] whenever it wants
//! a redraw, redeems the ticket when the redraw callback fires, and cancels it
//! on teardown. Every scheduled frame is retired exactly once, so a stopped
//! renderer can prove it has nothing in flight.

use std::time::{Duration, Instant};

/// Grace window so a callback arriving marginally early still renders.
const PACING_SLACK: Duration = Duration::from_micros(250);

/// One scheduled animation frame.
///
/// Tickets are linear: redeeming or cancelling consumes them, and a ticket
/// issued before [`FramePacer::stop`] is inert afterwards.
#[must_use = "an unredeemed ticket leaves its frame outstanding"]
#[derive(Debug, PartialEq, Eq)]
pub struct FrameTicket {
    serial: u64,
}

/// What the host should do with a redeemed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    /// Render and present this frame.
    Render,
    /// Drop the frame; the fps cap has not accumulated a full interval yet.
    Skip,
}

/// Issues frame tickets and applies an optional fps cap when they come back.
///
/// Pacing uses an accumulator over wall-clock deltas. After a long gap the
/// accumulator is clamped to one interval so the loop catches up with at most
/// one extra frame instead of a burst.
#[derive(Debug)]
pub struct FramePacer {
    interval: Option<Duration>,
    accumulator: Duration,
    last_tick: Option<Instant>,
    next_serial: u64,
    live_floor: u64,
    scheduled: u64,
    completed: u64,
    cancelled: u64,
    running: bool,
}

impl FramePacer {
    /// Creates a pacer; `target_fps` of `None` or `0` means uncapped.
    pub fn new(target_fps: Option<f32>) -> Self {
        let interval = target_fps
            .filter(|fps| *fps > 0.0)
            .map(|fps| Duration::from_secs_f32(1.0 / fps));
        Self {
            interval,
            accumulator: Duration::ZERO,
            last_tick: None,
            next_serial: 0,
            live_floor: 0,
            scheduled: 0,
            completed: 0,
            cancelled: 0,
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Issues a ticket for one future frame, or `None` once stopped.
    pub fn schedule(&mut self) -> Option<FrameTicket> {
        if !self.running {
            return None;
        }
        let serial = self.next_serial;
        self.next_serial += 1;
        self.scheduled += 1;
        Some(FrameTicket { serial })
    }

    /// Consumes a ticket at redraw time and decides whether to render.
    ///
    /// Tickets issued before a `stop()` were already retired there and come
    /// back as [`TickDecision::Skip`] without touching the counters.
    pub fn redeem(&mut self, ticket: FrameTicket, now: Instant) -> TickDecision {
        if ticket.serial < self.live_floor {
            return TickDecision::Skip;
        }
        self.completed += 1;
        self.pace(now)
    }

    /// Retires a ticket without rendering its frame.
    pub fn cancel(&mut self, ticket: FrameTicket) {
        if ticket.serial >= self.live_floor {
            self.cancelled += 1;
        }
    }

    /// Stops issuing tickets and retires everything still in flight.
    /// Idempotent.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.cancelled += self.outstanding();
        self.live_floor = self.next_serial;
    }

    /// Earliest instant at which a redeemed ticket would render, for hosts
    /// that sleep between frames. `None` means render immediately (uncapped,
    /// or nothing redeemed yet).
    pub fn next_deadline(&self) -> Option<Instant> {
        let interval = self.interval?;
        let last = self.last_tick?;
        let remaining = interval
            .saturating_sub(self.accumulator)
            .saturating_sub(PACING_SLACK);
        Some(last + remaining)
    }

    /// Scheduled frames not yet redeemed or cancelled.
    pub fn outstanding(&self) -> u64 {
        self.scheduled
            .saturating_sub(self.completed)
            .saturating_sub(self.cancelled)
    }

    pub fn scheduled(&self) -> u64 {
        self.scheduled
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }

    fn pace(&mut self, now: Instant) -> TickDecision {
        let Some(interval) = self.interval else {
            return TickDecision::Render;
        };
        let delta = match self.last_tick.replace(now) {
            Some(last) => now.saturating_duration_since(last),
            // First redeem renders immediately.
            None => interval,
        };
        self.accumulator = self.accumulator.saturating_add(delta);
        if self.accumulator + PACING_SLACK < interval {
            TickDecision::Skip
        } else {
            // Subtract one interval to keep the fractional remainder, then
            // clamp so a long gap yields at most one catch-up frame.
            self.accumulator = self.accumulator.saturating_sub(interval).min(interval);
            TickDecision::Render
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redeem_at(pacer: &mut FramePacer, now: Instant) -> TickDecision {
        let ticket = pacer.schedule().expect("pacer running");
        pacer.redeem(ticket, now)
    }

    #[test]
    fn uncapped_pacer_renders_every_redeem() {
        let mut pacer = FramePacer::new(None);
        let start = Instant::now();
        for step in 0..3 {
            let now = start + Duration::from_millis(step);
            assert_eq!(redeem_at(&mut pacer, now), TickDecision::Render);
        }
        assert_eq!(pacer.outstanding(), 0);
    }

    #[test]
    fn zero_fps_is_uncapped() {
        let mut pacer = FramePacer::new(Some(0.0));
        let now = Instant::now();
        assert_eq!(redeem_at(&mut pacer, now), TickDecision::Render);
        assert_eq!(redeem_at(&mut pacer, now), TickDecision::Render);
    }

    #[test]
    fn fps_cap_skips_early_ticks() {
        // 10 fps, so a 100ms interval.
        let mut pacer = FramePacer::new(Some(10.0));
        let start = Instant::now();
        assert_eq!(redeem_at(&mut pacer, start), TickDecision::Render);
        let samples = [
            (30, TickDecision::Skip),
            (60, TickDecision::Skip),
            (105, TickDecision::Render),
            (110, TickDecision::Skip),
            (205, TickDecision::Render),
        ];
        for (offset_ms, expected) in samples {
            let now = start + Duration::from_millis(offset_ms);
            assert_eq!(redeem_at(&mut pacer, now), expected, "at +{offset_ms}ms");
        }
    }

    #[test]
    fn long_gap_yields_at_most_one_catchup_frame() {
        let mut pacer = FramePacer::new(Some(10.0));
        let start = Instant::now();
        assert_eq!(redeem_at(&mut pacer, start), TickDecision::Render);

        // A full second of silence, then callbacks every 16ms.
        let gap = start + Duration::from_secs(1);
        assert_eq!(redeem_at(&mut pacer, gap), TickDecision::Render);
        assert_eq!(
            redeem_at(&mut pacer, gap + Duration::from_millis(16)),
            TickDecision::Render
        );
        assert_eq!(
            redeem_at(&mut pacer, gap + Duration::from_millis(32)),
            TickDecision::Skip
        );
    }

    #[test]
    fn tickets_are_counted_through_their_lifecycle() {
        let mut pacer = FramePacer::new(None);
        let now = Instant::now();
        let first = pacer.schedule().expect("running");
        let second = pacer.schedule().expect("running");
        let third = pacer.schedule().expect("running");
        assert_eq!(pacer.outstanding(), 3);

        pacer.redeem(first, now);
        pacer.redeem(second, now);
        pacer.cancel(third);
        assert_eq!(pacer.completed(), 2);
        assert_eq!(pacer.cancelled(), 1);
        assert_eq!(pacer.outstanding(), 0);
    }

    #[test]
    fn stop_retires_outstanding_tickets() {
        let mut pacer = FramePacer::new(None);
        let pending = pacer.schedule().expect("running");
        pacer.stop();
        assert!(!pacer.is_running());
        assert_eq!(pacer.outstanding(), 0);
        assert_eq!(pacer.cancelled(), 1);
        assert!(pacer.schedule().is_none());
        drop(pending);
    }

    #[test]
    fn stale_ticket_after_stop_is_inert() {
        let mut pacer = FramePacer::new(None);
        let pending = pacer.schedule().expect("running");
        pacer.stop();

        // The callback for the retired ticket may still fire afterwards.
        assert_eq!(pacer.redeem(pending, Instant::now()), TickDecision::Skip);
        assert_eq!(pacer.completed(), 0);
        assert_eq!(pacer.cancelled(), 1);
        assert_eq!(pacer.outstanding(), 0);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut pacer = FramePacer::new(None);
        let pending = pacer.schedule().expect("running");
        pacer.stop();
        pacer.stop();
        assert_eq!(pacer.cancelled(), 1);
        assert_eq!(pacer.outstanding(), 0);
        pacer.cancel(pending);
        assert_eq!(pacer.cancelled(), 1);
    }
}
