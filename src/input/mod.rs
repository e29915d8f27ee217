use egui::{Context, PointerButton, Pos2, Rect};

/// Pointer input in canvas coordinates (origin at the canvas top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// A button was pressed over the canvas
    Down { pos: Pos2, button: PointerButton },
    /// The pointer moved while over the canvas or during a gesture
    Move { pos: Pos2 },
    /// A button was released
    Up { pos: Pos2, button: PointerButton },
    /// Primary button double-clicked over the canvas
    DoubleClick { pos: Pos2 },
}

/// What egui reported about the pointer this frame, in screen coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerFrame {
    pub pos: Option<Pos2>,
    pub pressed: Vec<PointerButton>,
    pub released: Vec<PointerButton>,
    pub double_clicked: bool,
}

const BUTTONS: [PointerButton; 3] = [PointerButton::Primary, PointerButton::Secondary, PointerButton::Middle];

impl PointerFrame {
    pub fn from_input(input: &egui::InputState) -> Self {
        Self {
            pos: input.pointer.hover_pos(),
            pressed: BUTTONS
                .into_iter()
                .filter(|&button| input.pointer.button_pressed(button))
                .collect(),
            released: BUTTONS
                .into_iter()
                .filter(|&button| input.pointer.button_released(button))
                .collect(),
            double_clicked: input.pointer.button_double_clicked(PointerButton::Primary),
        }
    }
}

/// Turns raw egui pointer input into [`PointerEvent`]s for one canvas.
///
/// Presses only count inside the canvas rectangle. Once a press has started
/// there, moves and the matching release are reported wherever the pointer
/// goes so gestures always end.
#[derive(Debug, Default)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    canvas_rect: Option<Rect>,
    held: Option<PointerButton>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update where the canvas is drawn on screen
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = Some(rect);
    }

    /// Process raw egui input and generate pointer events
    pub fn process_input(&mut self, ctx: &Context) -> Vec<PointerEvent> {
        let frame = ctx.input(PointerFrame::from_input);
        self.process_frame(&frame)
    }

    pub fn process_frame(&mut self, frame: &PointerFrame) -> Vec<PointerEvent> {
        let mut events = Vec::new();
        let Some(canvas) = self.canvas_rect else {
            return events;
        };

        // A release with no hover position still ends the gesture.
        let Some(screen_pos) = frame.pos.or(self.last_pointer_pos) else {
            return events;
        };
        let pos = (screen_pos - canvas.min).to_pos2();
        let inside = canvas.contains(screen_pos);

        if frame.pos.is_some() && frame.pos != self.last_pointer_pos && (inside || self.held.is_some()) {
            events.push(PointerEvent::Move { pos });
        }
        self.last_pointer_pos = frame.pos.or(self.last_pointer_pos);

        for &button in &frame.pressed {
            if inside && self.held.is_none() {
                self.held = Some(button);
                events.push(PointerEvent::Down { pos, button });
            }
        }
        if inside && frame.double_clicked {
            events.push(PointerEvent::DoubleClick { pos });
        }
        for &button in &frame.released {
            if self.held == Some(button) {
                self.held = None;
                events.push(PointerEvent::Up { pos, button });
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    fn handler() -> InputHandler {
        let mut handler = InputHandler::new();
        handler.set_canvas_rect(Rect::from_min_size(pos2(100.0, 50.0), vec2(400.0, 300.0)));
        handler
    }

    #[test]
    fn test_press_inside_is_canvas_local() {
        let mut handler = handler();
        let events = handler.process_frame(&PointerFrame {
            pos: Some(pos2(110.0, 60.0)),
            pressed: vec![PointerButton::Primary],
            ..Default::default()
        });
        assert_eq!(
            events,
            vec![
                PointerEvent::Move { pos: pos2(10.0, 10.0) },
                PointerEvent::Down {
                    pos: pos2(10.0, 10.0),
                    button: PointerButton::Primary
                },
            ]
        );
    }

    #[test]
    fn test_press_outside_ignored() {
        let mut handler = handler();
        let events = handler.process_frame(&PointerFrame {
            pos: Some(pos2(10.0, 10.0)),
            pressed: vec![PointerButton::Primary],
            released: vec![PointerButton::Primary],
            ..Default::default()
        });
        assert!(events.is_empty());
    }

    #[test]
    fn test_gesture_followed_outside_canvas() {
        let mut handler = handler();
        handler.process_frame(&PointerFrame {
            pos: Some(pos2(110.0, 60.0)),
            pressed: vec![PointerButton::Primary],
            ..Default::default()
        });
        let moved = handler.process_frame(&PointerFrame {
            pos: Some(pos2(700.0, 60.0)),
            ..Default::default()
        });
        assert_eq!(moved, vec![PointerEvent::Move { pos: pos2(600.0, 10.0) }]);

        let released = handler.process_frame(&PointerFrame {
            pos: None,
            released: vec![PointerButton::Primary],
            ..Default::default()
        });
        assert_eq!(
            released,
            vec![PointerEvent::Up {
                pos: pos2(600.0, 10.0),
                button: PointerButton::Primary
            }]
        );
    }

    #[test]
    fn test_no_canvas_no_events() {
        let mut handler = InputHandler::new();
        let events = handler.process_frame(&PointerFrame {
            pos: Some(pos2(1.0, 1.0)),
            pressed: vec![PointerButton::Primary],
            ..Default::default()
        });
        assert!(events.is_empty());
    }
}
