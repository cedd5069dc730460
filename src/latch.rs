use crate::machine::Button;
use std::collections::HashSet;

/// The set of buttons asserted for the current frame.
///
/// The terminal never tells us when a key goes up, so a press is latched
/// here until the driver clears the whole set at the end of the frame.
/// Single buttons are never released.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ButtonLatch {
    pressed: HashSet<Button>,
}

impl ButtonLatch {
    pub fn new() -> Self {
        ButtonLatch {
            pressed: HashSet::new(),
        }
    }

    /// assert a button; pressing an already-pressed button does nothing
    pub fn press(&mut self, button: Button) {
        self.pressed.insert(button);
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.pressed.contains(&button)
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pressed.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Button> + '_ {
        self.pressed.iter().copied()
    }

    /// forget every press
    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_latch_is_empty() {
        let l = ButtonLatch::new();
        assert!(l.is_empty());
        for b in Button::ALL {
            assert!(!l.is_pressed(b));
        }
    }

    #[test]
    fn test_press_is_idempotent() {
        let mut once = ButtonLatch::new();
        once.press(Button::A);
        let mut twice = ButtonLatch::new();
        twice.press(Button::A);
        twice.press(Button::A);
        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut l = ButtonLatch::new();
        l.press(Button::Up);
        l.press(Button::Start);
        assert_eq!(l.len(), 2);
        l.clear();
        assert!(l.is_empty());
        assert!(!l.is_pressed(Button::Up));
    }

    #[test]
    fn test_iter_yields_pressed() {
        let mut l = ButtonLatch::new();
        l.press(Button::Left);
        l.press(Button::B);
        let mut seen: Vec<_> = l.iter().collect();
        seen.sort_by_key(|b| *b as u8);
        assert_eq!(seen, vec![Button::B, Button::Left]);
    }
}
