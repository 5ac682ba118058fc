use crate::engine::{EventOutcome, GestureEngine, InputEvent};

#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("input port is already attached")]
    AlreadyAttached,
}

/// Explicit attach/detach gate between the host's input sources and the
/// engine. Attaching twice is an error so two listeners can never feed the
/// same engine; delivery while detached is inert; detaching is idempotent
/// and safe even if attachment never happened.
#[derive(Debug)]
pub struct InputPort {
    engine: GestureEngine,
    attached: bool,
}

impl InputPort {
    /// Wraps an engine; starts detached.
    pub fn new(engine: GestureEngine) -> Self {
        Self {
            engine,
            attached: false,
        }
    }

    pub fn attach(&mut self) -> Result<(), PortError> {
        if self.attached {
            return Err(PortError::AlreadyAttached);
        }
        self.attached = true;
        Ok(())
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Forwards one event to the engine. While detached the event is dropped
    /// and the host keeps native behavior.
    pub fn deliver(&mut self, event: InputEvent) -> EventOutcome {
        if !self.attached {
            return EventOutcome::PassThrough;
        }
        self.engine.handle(event)
    }

    pub fn engine(&self) -> &GestureEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GestureEngine {
        &mut self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Subject;
    use sceneconfig::{GestureTuning, MediaKind};

    fn port() -> InputPort {
        InputPort::new(GestureEngine::new(
            Subject::new(MediaKind::Video, "storm"),
            GestureTuning::default(),
            1280.0,
        ))
    }

    #[test]
    fn double_attach_is_an_error() {
        let mut port = port();
        port.attach().expect("first attach");
        assert!(matches!(port.attach(), Err(PortError::AlreadyAttached)));
    }

    #[test]
    fn detach_is_idempotent() {
        let mut port = port();
        port.detach();
        port.attach().expect("attach");
        port.detach();
        port.detach();
        assert!(!port.is_attached());
        port.attach().expect("reattach after detach");
    }

    #[test]
    fn delivery_while_detached_is_inert() {
        let mut port = port();
        assert_eq!(
            port.deliver(InputEvent::Wheel { delta_y: 1200.0 }),
            EventOutcome::PassThrough
        );
        assert_eq!(port.engine().progress(), 0.0);

        port.attach().expect("attach");
        assert_eq!(
            port.deliver(InputEvent::Wheel { delta_y: 1200.0 }),
            EventOutcome::Consumed
        );
        assert!(port.engine().is_expanded());
    }
}
