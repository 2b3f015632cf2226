use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Visual bursts the camera (or external UI) can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectEvent {
    Glitch,
    Nova,
}

/// Everything the outside world can ask of the coordinator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Raw wheel delta, before gain.
    Scroll(f32),
    /// A click or scroll that counts as a user gesture for audio unlock.
    Gesture,
    Effect(EffectEvent),
    Collapse,
    /// Stop the current theme and bring up the other one after the fade.
    ToggleTheme,
}

/// Cloneable trigger handle given to input wiring and exported globals.
///
/// Commands are queued and applied at the start of the next frame, so callers
/// never touch the camera, particle field or synthesis engine directly.
#[derive(Clone, Default)]
pub struct EffectHandle {
    queue: Rc<RefCell<VecDeque<Command>>>,
}

impl EffectHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&self, command: Command) {
        self.queue.borrow_mut().push_back(command);
    }

    pub fn scroll(&self, raw_delta: f32) {
        self.send(Command::Scroll(raw_delta));
    }

    pub fn gesture(&self) {
        self.send(Command::Gesture);
    }

    pub fn fire_glitch(&self) {
        self.send(Command::Effect(EffectEvent::Glitch));
    }

    pub fn fire_nova(&self) {
        self.send(Command::Effect(EffectEvent::Nova));
    }

    pub fn collapse(&self) {
        self.send(Command::Collapse);
    }

    pub fn toggle_theme(&self) {
        self.send(Command::ToggleTheme);
    }

    pub(crate) fn drain(&self) -> Vec<Command> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}
