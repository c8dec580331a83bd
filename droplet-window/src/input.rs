use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, Ime, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Pixel-precise scroll deltas are scaled down to roughly one line per notch.
const PIXELS_PER_LINE: f32 = 0.1;

/// Window event reduced to what the viewer reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Resized { width: u32, height: u32 },
    PointerMoved(Vec2),
    Button { button: MouseButton, state: ElementState },
    Scroll(f32),
    Key { key: KeyCode, state: ElementState, repeat: bool },
    Text(String),
}

impl InputEvent {
    /// Translate a winit event. Returns `None` for events the viewer ignores.
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::Resized(size) => Some(Self::Resized {
                width: size.width,
                height: size.height,
            }),
            WindowEvent::CursorMoved { position, .. } => Some(Self::PointerMoved(Vec2::new(
                position.x as f32,
                position.y as f32,
            ))),
            WindowEvent::MouseInput { state, button, .. } => Some(Self::Button {
                button: *button,
                state: *state,
            }),
            WindowEvent::MouseWheel { delta, .. } => Some(Self::Scroll(match delta {
                MouseScrollDelta::LineDelta(_, y) => *y,
                MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * PIXELS_PER_LINE,
            })),
            WindowEvent::KeyboardInput { event, .. } => match event.physical_key {
                PhysicalKey::Code(key) => Some(Self::Key {
                    key,
                    state: event.state,
                    repeat: event.repeat,
                }),
                PhysicalKey::Unidentified(_) => None,
            },
            WindowEvent::Ime(Ime::Commit(text)) => Some(Self::Text(text.clone())),
            _ => None,
        }
    }
}

/// Up/down state of a single mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Up,
    Down,
}

impl From<ElementState> for ButtonState {
    fn from(state: ElementState) -> Self {
        match state {
            ElementState::Pressed => ButtonState::Down,
            ElementState::Released => ButtonState::Up,
        }
    }
}

/// Accumulated pointer, button and key state between two frames.
#[derive(Debug, Default)]
pub struct InputState {
    mouse_position: Option<Vec2>,
    mouse_delta: Vec2,
    left: ButtonState,
    right: ButtonState,
    middle: ButtonState,
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
    text: String,
    frame: u64,
}

impl InputState {
    pub fn mouse_position(&self) -> Option<Vec2> {
        self.mouse_position
    }

    /// Pending pointer delta without consuming it.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Consume the pointer delta. The next call returns zero until the pointer moves again.
    pub fn take_mouse_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.mouse_delta)
    }

    pub fn button(&self, button: MouseButton) -> ButtonState {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Right => self.right,
            MouseButton::Middle => self.middle,
            _ => ButtonState::Up,
        }
    }

    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn just_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// Text committed since the last frame.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of frames presented so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Record a pointer position. The first report only seeds the position.
    pub fn record_pointer(&mut self, position: Vec2) {
        if let Some(prev) = self.mouse_position {
            self.mouse_delta += position - prev;
        }
        self.mouse_position = Some(position);
    }

    /// Record a button transition. Buttons other than left/right/middle are dropped.
    pub fn record_button(&mut self, button: MouseButton, state: ElementState) -> bool {
        let slot = match button {
            MouseButton::Left => &mut self.left,
            MouseButton::Right => &mut self.right,
            MouseButton::Middle => &mut self.middle,
            _ => return false,
        };
        *slot = state.into();
        true
    }

    pub fn record_key(&mut self, key: KeyCode, state: ElementState, repeat: bool) {
        match state {
            ElementState::Pressed => {
                if self.keys_down.insert(key) && !repeat {
                    self.keys_pressed.insert(key);
                }
                self.keys_released.remove(&key);
            }
            // a tap inside one frame reports both edges
            ElementState::Released => {
                self.keys_down.remove(&key);
                self.keys_released.insert(key);
            }
        }
    }

    pub fn record_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Clear per-frame edge state and count the frame.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.text.clear();
        self.frame += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_move_has_zero_delta() {
        let mut input = InputState::default();
        input.record_pointer(Vec2::new(100.0, 100.0));
        assert_eq!(input.take_mouse_delta(), Vec2::ZERO);
        assert_eq!(input.mouse_position(), Some(Vec2::new(100.0, 100.0)));
    }

    #[test]
    fn delta_is_consumed_once() {
        let mut input = InputState::default();
        input.record_pointer(Vec2::new(100.0, 100.0));
        input.record_pointer(Vec2::new(120.0, 90.0));
        assert_eq!(input.mouse_delta(), Vec2::new(20.0, -10.0));
        assert_eq!(input.take_mouse_delta(), Vec2::new(20.0, -10.0));
        assert_eq!(input.take_mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn buttons_are_tracked_independently() {
        let mut input = InputState::default();
        assert!(input.record_button(MouseButton::Left, ElementState::Pressed));
        assert!(input.record_button(MouseButton::Middle, ElementState::Pressed));
        assert!(input.record_button(MouseButton::Middle, ElementState::Released));
        assert_eq!(input.button(MouseButton::Left), ButtonState::Down);
        assert_eq!(input.button(MouseButton::Right), ButtonState::Up);
        assert_eq!(input.button(MouseButton::Middle), ButtonState::Up);

        assert!(!input.record_button(MouseButton::Back, ElementState::Pressed));
        assert_eq!(input.button(MouseButton::Back), ButtonState::Up);
    }

    #[test]
    fn key_repeat_does_not_retrigger() {
        let mut input = InputState::default();
        input.record_key(KeyCode::KeyN, ElementState::Pressed, false);
        assert!(input.just_pressed(KeyCode::KeyN));
        input.end_frame();

        input.record_key(KeyCode::KeyN, ElementState::Pressed, true);
        assert!(input.key_down(KeyCode::KeyN));
        assert!(!input.just_pressed(KeyCode::KeyN));

        input.record_key(KeyCode::KeyN, ElementState::Released, false);
        assert!(input.just_released(KeyCode::KeyN));
        assert!(!input.key_down(KeyCode::KeyN));
    }

    #[test]
    fn tap_within_one_frame_keeps_both_edges() {
        let mut input = InputState::default();
        input.record_key(KeyCode::KeyN, ElementState::Pressed, false);
        input.record_key(KeyCode::KeyN, ElementState::Released, false);
        assert!(input.just_pressed(KeyCode::KeyN));
        assert!(input.just_released(KeyCode::KeyN));
        assert!(!input.key_down(KeyCode::KeyN));
    }

    #[test]
    fn end_frame_counts_and_clears_edges() {
        let mut input = InputState::default();
        input.record_key(KeyCode::Space, ElementState::Pressed, false);
        input.record_text("a");
        input.end_frame();
        assert!(!input.just_pressed(KeyCode::Space));
        assert!(input.key_down(KeyCode::Space));
        assert!(input.text().is_empty());
        assert_eq!(input.frame_count(), 1);
    }

    #[test]
    fn pixel_scroll_is_scaled() {
        let event = WindowEvent::MouseWheel {
            device_id: winit::event::DeviceId::dummy(),
            delta: MouseScrollDelta::PixelDelta(winit::dpi::PhysicalPosition::new(0.0, 20.0)),
            phase: winit::event::TouchPhase::Moved,
        };
        assert_eq!(InputEvent::from_window_event(&event), Some(InputEvent::Scroll(2.0)));
    }
}
