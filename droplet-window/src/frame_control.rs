//! Run, close and advance decisions for one frame, kept apart from the GPU
//! work so the viewer's frame order can be driven without a window.

use tracing::{debug, info};

use crate::input::InputState;
use crate::overlay::PanelResponse;
use crate::run_control::{EdgeTrigger, RunControl, Shortcuts};

/// Result of one [`Viewer::render`](crate::Viewer::render) call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// A frame was drawn and presented.
    Presented,
    /// The surface was unavailable; nothing was presented this call.
    Skipped,
    /// The window was asked to close. Nothing was drawn; stop calling `render`.
    Shutdown,
}

#[derive(Default)]
pub(crate) struct FrameControl {
    run: RunControl,
    advance_key: EdgeTrigger,
    on_advance: Option<Box<dyn FnMut()>>,
    close_requested: bool,
}

impl FrameControl {
    pub fn run(&self) -> &RunControl {
        &self.run
    }

    pub fn run_mut(&mut self) -> &mut RunControl {
        &mut self.run
    }

    pub fn set_on_advance(&mut self, callback: impl FnMut() + 'static) {
        self.on_advance = Some(Box::new(callback));
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    /// `Some(Frame::Shutdown)` once a close was requested; the frame must not be drawn.
    pub fn shutdown(&self) -> Option<Frame> {
        self.close_requested.then_some(Frame::Shutdown)
    }

    /// Read this frame's shortcuts. Escape takes effect immediately, the rest
    /// is applied by [`FrameControl::finish`].
    pub fn sample(&mut self, input: &InputState) -> Shortcuts {
        let shortcuts = Shortcuts::sample(input, &mut self.advance_key);
        if shortcuts.close {
            info!("Escape pressed, closing");
            self.close_requested = true;
        }
        shortcuts
    }

    /// Apply the frame's run edits and fire the advance callback at most once.
    ///
    /// `panel` carries the panel's response and its copy of the run flags,
    /// which were taken before any shortcut of this frame, so panel edits land
    /// first and keyboard toggles go on top.
    pub fn finish(&mut self, shortcuts: Shortcuts, panel: Option<(PanelResponse, &RunControl)>) {
        let mut advance = shortcuts.advance;
        if let Some((response, edited)) = panel {
            if response.run_changed {
                self.run = *edited;
            }
            advance |= response.advance_clicked;
        }
        if shortcuts.toggle_run {
            self.run.toggle();
            info!("Run state: {:?}", self.run.state);
        }
        if advance {
            self.fire_advance();
        }
    }

    fn fire_advance(&mut self) {
        match self.on_advance.as_mut() {
            Some(callback) => callback(),
            None => debug!("Advance requested with no callback registered"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run_control::RunState;
    use std::cell::Cell;
    use std::rc::Rc;
    use winit::event::ElementState;
    use winit::keyboard::KeyCode;

    fn counted() -> (FrameControl, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0));
        let mut control = FrameControl::default();
        let seen = calls.clone();
        control.set_on_advance(move || seen.set(seen.get() + 1));
        (control, calls)
    }

    fn clicked() -> PanelResponse {
        PanelResponse {
            advance_clicked: true,
            ..Default::default()
        }
    }

    #[test]
    fn open_viewer_draws() {
        assert_eq!(FrameControl::default().shutdown(), None);
    }

    #[test]
    fn close_request_skips_drawing() {
        let mut control = FrameControl::default();
        control.request_close();
        assert_eq!(control.shutdown(), Some(Frame::Shutdown));
        assert_eq!(control.shutdown(), Some(Frame::Shutdown));
    }

    #[test]
    fn escape_closes_on_next_frame() {
        let mut control = FrameControl::default();
        let mut input = InputState::default();
        input.record_key(KeyCode::Escape, ElementState::Pressed, false);
        let shortcuts = control.sample(&input);
        assert_eq!(control.shutdown(), Some(Frame::Shutdown));
        control.finish(shortcuts, None);
    }

    #[test]
    fn held_advance_key_calls_back_once() {
        let (mut control, calls) = counted();
        let mut input = InputState::default();

        input.record_key(KeyCode::KeyN, ElementState::Pressed, false);
        for _ in 0..5 {
            let shortcuts = control.sample(&input);
            control.finish(shortcuts, None);
            input.end_frame();
            input.record_key(KeyCode::KeyN, ElementState::Pressed, true);
        }
        assert_eq!(calls.get(), 1);

        input.record_key(KeyCode::KeyN, ElementState::Released, false);
        let shortcuts = control.sample(&input);
        control.finish(shortcuts, None);
        input.end_frame();

        input.record_key(KeyCode::KeyN, ElementState::Pressed, false);
        let shortcuts = control.sample(&input);
        control.finish(shortcuts, None);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn next_frame_button_calls_back_once() {
        let (mut control, calls) = counted();
        let run = *control.run();
        control.finish(Shortcuts::default(), Some((clicked(), &run)));
        control.finish(Shortcuts::default(), Some((PanelResponse::default(), &run)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn key_and_button_together_call_back_once() {
        let (mut control, calls) = counted();
        let mut input = InputState::default();
        input.record_key(KeyCode::KeyN, ElementState::Pressed, false);
        let shortcuts = control.sample(&input);
        let run = *control.run();
        control.finish(shortcuts, Some((clicked(), &run)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn advance_fires_while_running() {
        let (mut control, calls) = counted();
        control.run_mut().set_running(true);
        let run = *control.run();
        control.finish(Shortcuts::default(), Some((clicked(), &run)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn advance_without_callback_is_ignored() {
        let mut control = FrameControl::default();
        let run = *control.run();
        control.finish(Shortcuts::default(), Some((clicked(), &run)));
    }

    #[test]
    fn panel_run_toggle_is_applied() {
        let mut control = FrameControl::default();
        let mut edited = *control.run();
        edited.set_running(true);
        let response = PanelResponse {
            run_changed: true,
            ..Default::default()
        };
        control.finish(Shortcuts::default(), Some((response, &edited)));
        assert_eq!(control.run().state, RunState::Running);
    }

    #[test]
    fn space_toggle_survives_panel_edit_in_same_frame() {
        let mut control = FrameControl::default();
        let mut input = InputState::default();

        // panel copy taken at the start of the frame, then highlight edited
        let mut edited = *control.run();
        edited.highlight = 7;

        input.record_key(KeyCode::Space, ElementState::Pressed, false);
        let shortcuts = control.sample(&input);
        let response = PanelResponse {
            run_changed: true,
            ..Default::default()
        };
        control.finish(shortcuts, Some((response, &edited)));

        assert_eq!(control.run().state, RunState::Running);
        assert_eq!(control.run().highlight, 7);
    }

    #[test]
    fn space_toggles_on_skipped_frames() {
        let mut control = FrameControl::default();
        let mut input = InputState::default();
        input.record_key(KeyCode::Space, ElementState::Pressed, false);
        let shortcuts = control.sample(&input);
        control.finish(shortcuts, None);
        assert!(control.run().is_running());
    }
}
