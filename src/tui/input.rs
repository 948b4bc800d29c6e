// Key behavior tracking
//
// Navigation keys repeat while held; action keys fire once per press, with a
// time-based debounce for terminals that never send Release events.

use crossterm::event::KeyCode;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Debounce window for once-per-press keys on terminals without key-release
/// reporting.
const ONCE_DEBOUNCE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy)]
pub enum KeyBehavior {
    /// Fire once per press (Enter, Space, letters).
    Once,
    /// Fire on press, then repeat after a delay while held (arrows).
    Repeating {
        initial_delay: Duration,
        interval: Duration,
    },
}

impl KeyBehavior {
    fn navigation() -> Self {
        Self::Repeating {
            initial_delay: Duration::from_millis(400),
            interval: Duration::from_millis(50),
        }
    }
}

#[derive(Debug, Default)]
struct KeyState {
    pressed: bool,
    pressed_at: Option<Instant>,
    last_fired: Option<Instant>,
}

/// Tracks per-key press state and decides when an action should fire.
pub struct KeyTracker {
    states: HashMap<KeyCode, KeyState>,
    behaviors: HashMap<KeyCode, KeyBehavior>,
}

impl KeyTracker {
    /// Tracker preconfigured for the board's key map.
    pub fn board_defaults() -> Self {
        let mut behaviors = HashMap::new();
        for key in [
            KeyCode::Up,
            KeyCode::Down,
            KeyCode::Char('j'),
            KeyCode::Char('k'),
        ] {
            behaviors.insert(key, KeyBehavior::navigation());
        }
        Self {
            states: HashMap::new(),
            behaviors,
        }
    }

    /// Returns true when the press should trigger its action.
    pub fn press(&mut self, key: KeyCode) -> bool {
        let now = Instant::now();
        let behavior = self
            .behaviors
            .get(&key)
            .copied()
            .unwrap_or(KeyBehavior::Once);
        let state = self.states.entry(key).or_default();

        if !state.pressed {
            state.pressed = true;
            state.pressed_at = Some(now);
            state.last_fired = Some(now);
            return true;
        }

        match behavior {
            KeyBehavior::Once => match state.last_fired {
                Some(last) if now.duration_since(last) >= ONCE_DEBOUNCE => {
                    state.last_fired = Some(now);
                    true
                }
                _ => false,
            },
            KeyBehavior::Repeating {
                initial_delay,
                interval,
            } => {
                let (Some(start), Some(last)) = (state.pressed_at, state.last_fired) else {
                    return false;
                };
                if now.duration_since(start) >= initial_delay
                    && now.duration_since(last) >= interval
                {
                    state.last_fired = Some(now);
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn release(&mut self, key: KeyCode) {
        if let Some(state) = self.states.get_mut(&key) {
            *state = KeyState::default();
        }
    }
}
