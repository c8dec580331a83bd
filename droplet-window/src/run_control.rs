use winit::keyboard::KeyCode;

use crate::input::InputState;

/// Whether the driver should keep stepping the simulation on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Paused,
    Running,
}

impl RunState {
    pub fn toggled(self) -> Self {
        match self {
            RunState::Paused => RunState::Running,
            RunState::Running => RunState::Paused,
        }
    }
}

/// Fires once on the transition from released to held.
#[derive(Debug, Default, Clone, Copy)]
pub struct EdgeTrigger {
    held: bool,
}

impl EdgeTrigger {
    /// Feed the current held state; returns true only on a rising edge.
    pub fn update(&mut self, held: bool) -> bool {
        let fired = held && !self.held;
        self.held = held;
        fired
    }
}

/// Run/pause state and the driver-facing flags edited from the panel.
///
/// The viewer never gates stepping itself. `last_frame` carries no meaning
/// here; the driver decides what it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunControl {
    pub state: RunState,
    pub last_frame: bool,
    /// Particle id to highlight, negative for none.
    pub highlight: i32,
}

impl Default for RunControl {
    fn default() -> Self {
        Self {
            state: RunState::Paused,
            last_frame: false,
            highlight: -1,
        }
    }
}

impl RunControl {
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn set_running(&mut self, running: bool) {
        self.state = if running {
            RunState::Running
        } else {
            RunState::Paused
        };
    }

    pub fn toggle(&mut self) {
        self.state = self.state.toggled();
    }
}

/// Keyboard shortcuts sampled once per frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Shortcuts {
    /// Space: flip between paused and running.
    pub toggle_run: bool,
    /// N: step one frame.
    pub advance: bool,
    /// Escape: close the viewer.
    pub close: bool,
}

impl Shortcuts {
    pub fn sample(input: &InputState, advance_key: &mut EdgeTrigger) -> Self {
        let n_held = input.key_down(KeyCode::KeyN) || input.just_pressed(KeyCode::KeyN);
        Self {
            toggle_run: input.just_pressed(KeyCode::Space),
            advance: advance_key.update(n_held),
            close: input.just_pressed(KeyCode::Escape),
        }
    }
}
