//! Terminal input reader.
//!
//! A background task polls crossterm and forwards translated events over a
//! channel, so the main loop can `select!` on them next to I/O completions
//! and the search debounce timer.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind, MouseEvent};
use tokio::sync::mpsc;

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Bracketed paste.
    Paste(String),
    Resize,
    /// Nothing arrived within the tick rate.
    Tick,
}

/// Key releases and focus changes are dropped.
fn translate(ev: CtEvent) -> Option<AppEvent> {
    match ev {
        CtEvent::Key(k) if k.kind != KeyEventKind::Release => Some(AppEvent::Key(k)),
        CtEvent::Mouse(m) => Some(AppEvent::Mouse(m)),
        CtEvent::Paste(text) => Some(AppEvent::Paste(text)),
        CtEvent::Resize(..) => Some(AppEvent::Resize),
        _ => None,
    }
}

pub fn spawn_event_reader(tick_rate: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let next = if event::poll(tick_rate).unwrap_or(false) {
                match event::read() {
                    Ok(ev) => translate(ev),
                    Err(e) => {
                        tracing::debug!("event read failed: {e}");
                        None
                    }
                }
            } else {
                Some(AppEvent::Tick)
            };
            let Some(app_event) = next else { continue };
            if tx.send(app_event).is_err() {
                break;
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    #[test]
    fn releases_are_dropped() {
        let press = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        let release = KeyEvent {
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
            ..press
        };
        assert!(matches!(translate(CtEvent::Key(press)), Some(AppEvent::Key(_))));
        assert!(translate(CtEvent::Key(release)).is_none());
        assert!(translate(CtEvent::FocusGained).is_none());
    }
}
