use anyhow::Result;
use crossterm::event::{self, KeyEvent, KeyEventKind};
use std::time::Duration;

use crate::app::App;
use crate::config::Config;

/// Terminal events the main loop reacts to.
#[derive(Clone, Copy, Debug)]
pub enum Event {
    /// No input arrived within the tick interval
    Tick,
    /// Key press
    Key(KeyEvent),
}

/// Polls crossterm for input with a fixed tick rate.
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            if let event::Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(Event::Key(key));
                }
            }
        }
        Ok(Event::Tick)
    }
}

/// True when `key` matches a keymap binding such as "q", "up" or "enter".
fn matches_binding(key: &KeyEvent, binding: &str) -> bool {
    use crossterm::event::KeyCode;
    match binding {
        "up" => key.code == KeyCode::Up,
        "down" => key.code == KeyCode::Down,
        "left" => key.code == KeyCode::Left,
        "right" => key.code == KeyCode::Right,
        "enter" => key.code == KeyCode::Enter,
        "esc" => key.code == KeyCode::Esc,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => key.code == KeyCode::Char(c),
                _ => false,
            }
        }
    }
}

pub fn handle_key_event(key: KeyEvent, app: &mut App, config: &Config) -> Result<()> {
    let keymap = &config.keymap;
    if matches_binding(&key, &keymap.quit) {
        app.should_quit = true;
    } else if matches_binding(&key, &keymap.select_up) {
        app.select_up();
    } else if matches_binding(&key, &keymap.select_down) {
        app.select_down();
    } else if matches_binding(&key, &keymap.expand) {
        app.expand_selected()?;
    } else if matches_binding(&key, &keymap.collapse) {
        app.collapse_selected()?;
    } else if matches_binding(&key, &keymap.activate) {
        app.activate_selected()?;
    } else if matches_binding(&key, &keymap.add_tag) {
        app.tag_selected(&config.demo_tag)?;
    } else if matches_binding(&key, &keymap.remove_tag) {
        app.untag_selected(&config.demo_tag)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_matches_named_bindings() {
        assert!(matches_binding(&key(KeyCode::Up), "up"));
        assert!(matches_binding(&key(KeyCode::Enter), "enter"));
        assert!(!matches_binding(&key(KeyCode::Down), "up"));
    }

    #[test]
    fn test_matches_char_bindings() {
        assert!(matches_binding(&key(KeyCode::Char('q')), "q"));
        assert!(!matches_binding(&key(KeyCode::Char('x')), "q"));
        assert!(!matches_binding(&key(KeyCode::Char('q')), "quit"));
    }
}
