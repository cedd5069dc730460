use crate::machine::Button;
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent};
use crossterm::terminal;
use log::{debug, trace};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::Duration;

/// what a recognised key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press(Button),
    Exit,
}

/// key names as the terminal reports them, and what they mean to us
const DEFAULT_KEYMAP: [(&str, KeyAction); 9] = [
    ("a", KeyAction::Press(Button::A)),
    ("b", KeyAction::Press(Button::B)),
    ("return", KeyAction::Press(Button::Start)),
    ("space", KeyAction::Press(Button::Select)),
    ("up", KeyAction::Press(Button::Up)),
    ("down", KeyAction::Press(Button::Down)),
    ("left", KeyAction::Press(Button::Left)),
    ("right", KeyAction::Press(Button::Right)),
    ("q", KeyAction::Exit),
];

/// shown under the screen every frame
pub const CONTROLS_HINT: &str =
    "Controls: A, B, Enter (Start), Space (Select), Arrows, Q (Exit)";

pub struct Keymap {
    map: HashMap<&'static str, KeyAction>,
}

impl Keymap {
    /// None for anything we don't care about
    pub fn resolve(&self, name: &str) -> Option<KeyAction> {
        self.map.get(name).copied()
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Keymap {
            map: HashMap::from(DEFAULT_KEYMAP),
        }
    }
}

/// reads key-downs. the terminal can't tell us about key-ups, so there is no
/// such thing here either
pub trait Input {
    /// names of every key pressed since the last call, oldest first. must not
    /// block
    fn drain_keys(&mut self) -> Result<Vec<String>, io::Error>;
}

/// the terminal name for a key event, if it has one
fn key_name(evt: &KeyEvent) -> Option<String> {
    match evt.code {
        KeyCode::Char(' ') => Some("space".to_string()),
        KeyCode::Char(c) => Some(c.to_ascii_lowercase().to_string()),
        KeyCode::Enter => Some("return".to_string()),
        KeyCode::Up => Some("up".to_string()),
        KeyCode::Down => Some("down".to_string()),
        KeyCode::Left => Some("left".to_string()),
        KeyCode::Right => Some("right".to_string()),
        KeyCode::Esc => Some("escape".to_string()),
        KeyCode::Tab => Some("tab".to_string()),
        KeyCode::Backspace => Some("backspace".to_string()),
        KeyCode::F(n) => Some(format!("f{}", n)),
        _ => None,
    }
}

/// implementation of Input reading STDIN in raw mode, so keys arrive one at a
/// time instead of a line at a time
pub struct StdinInput;

impl StdinInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        debug!("terminal in raw mode");
        Ok(StdinInput)
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            debug!("couldn't leave raw mode: {}", e);
        }
    }
}

impl Input for StdinInput {
    fn drain_keys(&mut self) -> Result<Vec<String>, io::Error> {
        let mut keys = Vec::new();
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => match key_name(&evt) {
                    Some(name) => keys.push(name),
                    None => trace!("key event without a name: {:?}", evt.code),
                },
                other => trace!("ignoring event {:?}", other),
            }
        }
        Ok(keys)
    }
}

/// dummy Input implementation for testing
pub struct DummyInput {
    pending: VecDeque<Vec<String>>,
}

impl DummyInput {
    pub fn new() -> Self {
        DummyInput {
            pending: VecDeque::new(),
        }
    }

    /// queue up one batch of keys, handed out by the next drain
    pub fn push_batch(&mut self, keys: &[&str]) {
        self.pending
            .push_back(keys.iter().map(|k| k.to_string()).collect());
    }

    pub fn batches_left(&self) -> usize {
        self.pending.len()
    }
}

impl Default for DummyInput {
    fn default() -> Self {
        Self::new()
    }
}

impl Input for DummyInput {
    fn drain_keys(&mut self) -> Result<Vec<String>, io::Error> {
        Ok(self.pending.pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn test_keymap_buttons() {
        let km = Keymap::default();
        assert_eq!(km.resolve("a"), Some(KeyAction::Press(Button::A)));
        assert_eq!(km.resolve("b"), Some(KeyAction::Press(Button::B)));
        assert_eq!(km.resolve("return"), Some(KeyAction::Press(Button::Start)));
        assert_eq!(km.resolve("space"), Some(KeyAction::Press(Button::Select)));
        assert_eq!(km.resolve("up"), Some(KeyAction::Press(Button::Up)));
        assert_eq!(km.resolve("down"), Some(KeyAction::Press(Button::Down)));
        assert_eq!(km.resolve("left"), Some(KeyAction::Press(Button::Left)));
        assert_eq!(km.resolve("right"), Some(KeyAction::Press(Button::Right)));
    }

    #[test]
    fn test_keymap_exit() {
        assert_eq!(Keymap::default().resolve("q"), Some(KeyAction::Exit));
    }

    #[test]
    fn test_keymap_ignores_others() {
        let km = Keymap::default();
        for name in ["z", "escape", "f1", "", "A", "enter"] {
            assert_eq!(km.resolve(name), None, "{} should be ignored", name);
        }
    }

    #[test]
    fn test_every_button_is_mapped() {
        let km = Keymap::default();
        for b in Button::ALL {
            assert!(DEFAULT_KEYMAP
                .iter()
                .any(|(name, _)| km.resolve(name) == Some(KeyAction::Press(b))));
        }
    }

    #[test]
    fn test_key_names() {
        let name = |code| key_name(&KeyEvent::new(code, KeyModifiers::NONE));
        assert_eq!(name(KeyCode::Char('a')), Some("a".to_string()));
        assert_eq!(name(KeyCode::Char('Q')), Some("q".to_string()));
        assert_eq!(name(KeyCode::Char(' ')), Some("space".to_string()));
        assert_eq!(name(KeyCode::Enter), Some("return".to_string()));
        assert_eq!(name(KeyCode::Left), Some("left".to_string()));
        assert_eq!(name(KeyCode::Null), None);
    }

    #[test]
    fn test_dummy_input_hands_out_batches() -> Result<(), io::Error> {
        let mut i = DummyInput::new();
        i.push_batch(&["a", "up"]);
        i.push_batch(&[]);
        assert_eq!(i.drain_keys()?, vec!["a", "up"]);
        assert!(i.drain_keys()?.is_empty());
        assert!(i.drain_keys()?.is_empty());
        assert_eq!(i.batches_left(), 0);
        Ok(())
    }
}
