use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseButton, MouseEventKind};

/// Unified event type consumed by the game loop
#[derive(Clone, Debug)]
pub enum TermEvent {
    Key(KeyEvent),
    /// Left mouse button pressed at screen cell (x, y)
    Click { x: u16, y: u16 },
    Resize,
    Tick,
}

/// Narrow a raw crossterm event to the ones the game reacts to. Mouse
/// traffic other than a left-button press (movement, drag, scroll) is
/// dropped here rather than flooding the channel.
pub fn map_event(ev: CtEvent) -> Option<TermEvent> {
    match ev {
        CtEvent::Key(key) => Some(TermEvent::Key(key)),
        CtEvent::Mouse(m) => match m.kind {
            MouseEventKind::Down(MouseButton::Left) => Some(TermEvent::Click {
                x: m.column,
                y: m.row,
            }),
            _ => None,
        },
        CtEvent::Resize(_, _) => Some(TermEvent::Resize),
        _ => None,
    }
}

/// Source of terminal events (keyboard, mouse, resize)
pub trait TermEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<TermEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<TermEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(ev) => {
                    if let Some(ev) = map_event(ev) {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                }
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TermEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TermEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<TermEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<TermEvent>) -> Self {
        Self { rx }
    }
}

impl TermEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TermEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the game one event/tick at a time
pub struct Runner<E: TermEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: TermEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> TermEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => TermEvent::Tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers, MouseEvent};
    use std::sync::mpsc;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> CtEvent {
        CtEvent::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        // With no events available, step should yield Tick
        let ev = runner.step();
        match ev {
            TermEvent::Tick => {}
            _ => panic!("expected Tick on timeout"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(TermEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        match runner.step() {
            TermEvent::Resize => {}
            _ => panic!("expected Resize event"),
        }
    }

    #[test]
    fn map_event_keeps_keys() {
        let ev = CtEvent::Key(crossterm::event::KeyEvent::new(
            KeyCode::Char('p'),
            KeyModifiers::NONE,
        ));

        match map_event(ev) {
            Some(TermEvent::Key(key)) => assert_eq!(key.code, KeyCode::Char('p')),
            other => panic!("expected key event, got {other:?}"),
        }
    }

    #[test]
    fn map_event_turns_left_down_into_click() {
        let ev = mouse(MouseEventKind::Down(MouseButton::Left), 12, 7);

        match map_event(ev) {
            Some(TermEvent::Click { x, y }) => {
                assert_eq!((x, y), (12, 7));
            }
            other => panic!("expected click, got {other:?}"),
        }
    }

    #[test]
    fn map_event_drops_other_mouse_traffic() {
        assert!(map_event(mouse(MouseEventKind::Moved, 1, 1)).is_none());
        assert!(map_event(mouse(MouseEventKind::Up(MouseButton::Left), 1, 1)).is_none());
        assert!(map_event(mouse(MouseEventKind::Down(MouseButton::Right), 1, 1)).is_none());
        assert!(map_event(mouse(MouseEventKind::ScrollDown, 1, 1)).is_none());
    }

    #[test]
    fn map_event_keeps_resize() {
        match map_event(CtEvent::Resize(80, 24)) {
            Some(TermEvent::Resize) => {}
            other => panic!("expected resize, got {other:?}"),
        }
    }
}
