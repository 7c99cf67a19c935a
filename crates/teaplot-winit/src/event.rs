use teaplot_core::geometry::{LogicalPosition, PhysicalSize};
pub use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent as WinitEvent};
pub use winit::keyboard::*;

/// Lines scrolled per pixel for touchpads reporting pixel deltas.
const PIXELS_PER_LINE: f64 = 40.0;

/// Per-window queue, drained once per rendered frame.
///
/// Cursor motion and wheel deltas are coalesced so a burst of OS events
/// produces at most one of each per frame.
#[derive(Default)]
pub struct EventQueue {
    pending: Vec<Event>,
    latest_mouse_pos: Option<LogicalPosition<f64>>,
    scroll_lines: f32,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        match event {
            Event::MouseMoved(pos) => self.latest_mouse_pos = Some(pos),
            Event::MouseScrolled(lines) => self.scroll_lines += lines,
            // Close and resize must be seen before input that assumes the old size.
            Event::CloseRequested | Event::WindowResized(_) => self.pending.insert(0, event),
            _ => self.pending.push(event),
        }
    }

    pub fn drain(&mut self) -> EventBatch {
        let mut events = std::mem::take(&mut self.pending);

        if let Some(pos) = self.latest_mouse_pos.take() {
            events.push(Event::MouseMoved(pos));
        }
        if self.scroll_lines != 0.0 {
            events.push(Event::MouseScrolled(self.scroll_lines));
            self.scroll_lines = 0.0;
        }

        EventBatch { events }
    }
}

pub struct EventBatch {
    events: Vec<Event>,
}

impl EventBatch {
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Offer every event to `handler`, dropping the ones it consumes.
    pub fn dispatch<H>(&mut self, mut handler: H)
    where
        H: FnMut(&Event) -> HandleStatus,
    {
        self.events.retain(|event| !handler(event).is_consumed());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Window resized to a new physical size.
    WindowResized(PhysicalSize<u32>),
    ScaleFactorChanged(f64),
    CloseRequested,
    MouseButtonDown(MouseButton),
    MouseButtonUp(MouseButton),
    /// Wheel motion in lines, positive away from the user.
    MouseScrolled(f32),
    /// Cursor position in logical coordinates.
    MouseMoved(LogicalPosition<f64>),
    MouseLeft,
    KeyInput(KeyEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    pub physical_key: PhysicalKey,
    pub logical_key: Key,
    pub state: ElementState,
    pub repeat: bool,
}

impl KeyEvent {
    /// A fresh press, ignoring auto-repeat.
    pub fn is_press(&self) -> bool {
        self.state == ElementState::Pressed && !self.repeat
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HandleStatus: u8 {
        const HANDLED = 0b00000001;
        const CONSUMED = 0b00000010;
    }
}

impl HandleStatus {
    pub const fn is_consumed(&self) -> bool {
        self.contains(Self::CONSUMED)
    }

    pub const fn consumed() -> Self {
        Self::from_bits_truncate(Self::HANDLED.bits() | Self::CONSUMED.bits())
    }

    pub const fn handled() -> Self {
        Self::HANDLED
    }

    pub const fn ignored() -> Self {
        Self::empty()
    }
}

impl Event {
    pub(crate) fn from_winit(event: WinitEvent, scale_factor: f64) -> Option<Self> {
        match event {
            WinitEvent::Resized(size) => Some(Event::WindowResized(PhysicalSize::new(
                size.width,
                size.height,
            ))),
            WinitEvent::ScaleFactorChanged { scale_factor, .. } => {
                Some(Event::ScaleFactorChanged(scale_factor))
            }
            WinitEvent::CloseRequested => Some(Event::CloseRequested),
            WinitEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => Some(Event::MouseButtonDown(button)),
                ElementState::Released => Some(Event::MouseButtonUp(button)),
            },
            WinitEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
                };
                Some(Event::MouseScrolled(lines))
            }
            WinitEvent::CursorMoved { position, .. } => Some(Event::MouseMoved(
                LogicalPosition::new(position.x / scale_factor, position.y / scale_factor),
            )),
            WinitEvent::CursorLeft { .. } => Some(Event::MouseLeft),
            WinitEvent::KeyboardInput { event, .. } => Some(Event::KeyInput(KeyEvent {
                physical_key: event.physical_key,
                logical_key: event.logical_key,
                state: event.state,
                repeat: event.repeat,
            })),
            other => {
                tracing::trace!("ignored window event: {:?}", other);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_moves_are_coalesced() {
        let mut queue = EventQueue::new();
        queue.push(Event::MouseMoved(LogicalPosition::new(1.0, 1.0)));
        queue.push(Event::MouseMoved(LogicalPosition::new(5.0, 6.0)));

        let batch = queue.drain();
        assert_eq!(batch.len(), 1);
        assert_eq!(
            batch.iter().next(),
            Some(&Event::MouseMoved(LogicalPosition::new(5.0, 6.0)))
        );
    }

    #[test]
    fn test_scroll_is_accumulated() {
        let mut queue = EventQueue::new();
        queue.push(Event::MouseScrolled(1.0));
        queue.push(Event::MouseScrolled(0.5));

        let batch = queue.drain();
        assert_eq!(batch.iter().collect::<Vec<_>>(), vec![&Event::MouseScrolled(1.5)]);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_resize_comes_first() {
        let mut queue = EventQueue::new();
        queue.push(Event::MouseButtonDown(MouseButton::Left));
        queue.push(Event::WindowResized(PhysicalSize::new(800, 600)));

        let batch = queue.drain();
        assert_eq!(
            batch.iter().next(),
            Some(&Event::WindowResized(PhysicalSize::new(800, 600)))
        );
    }

    #[test]
    fn test_dispatch_removes_consumed() {
        let mut queue = EventQueue::new();
        queue.push(Event::MouseButtonDown(MouseButton::Left));
        queue.push(Event::MouseButtonUp(MouseButton::Left));

        let mut batch = queue.drain();
        batch.dispatch(|event| match event {
            Event::MouseButtonDown(_) => HandleStatus::consumed(),
            _ => HandleStatus::handled(),
        });

        assert_eq!(batch.len(), 1);
        assert!(matches!(batch.iter().next(), Some(Event::MouseButtonUp(_))));
    }
}
