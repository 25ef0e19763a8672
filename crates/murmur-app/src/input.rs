//! Terminal-agnostic keyboard input and text fields.

/// Keyboard input abstraction.
///
/// Decouples application logic from terminal libraries (crossterm, termion,
/// etc.) enabling deterministic simulation testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Backspace key (delete character before cursor).
    Backspace,
    /// Delete key (delete character at cursor).
    Delete,
    /// Tab key (cycle focus).
    Tab,
    /// Escape key (back or quit).
    Esc,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Home key (cursor to start).
    Home,
    /// End key (cursor to end).
    End,
}

/// Effect of a key on a [`TextInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// Content changed.
    Changed,
    /// Only the cursor moved.
    Moved,
    /// Key does not apply to text fields.
    Ignored,
}

/// Single-line text field.
///
/// The cursor counts characters, not bytes, so multi-byte input is safe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    buffer: String,
    cursor: usize,
}

impl TextInput {
    /// Create a field holding `text`, cursor at the end.
    pub fn with_text(text: impl Into<String>) -> Self {
        let buffer = text.into();
        let cursor = buffer.chars().count();
        Self { buffer, cursor }
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True when the field holds no text.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the field and return its previous text.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    /// Apply an editing key.
    pub fn apply(&mut self, key: KeyInput) -> Edit {
        let len = self.buffer.chars().count();
        match key {
            KeyInput::Char(c) => {
                let at = self.byte_offset(self.cursor);
                self.buffer.insert(at, c);
                self.cursor += 1;
                Edit::Changed
            },
            KeyInput::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                let at = self.byte_offset(self.cursor);
                self.buffer.remove(at);
                Edit::Changed
            },
            KeyInput::Delete if self.cursor < len => {
                let at = self.byte_offset(self.cursor);
                self.buffer.remove(at);
                Edit::Changed
            },
            KeyInput::Backspace | KeyInput::Delete => Edit::Moved,
            KeyInput::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                Edit::Moved
            },
            KeyInput::Right => {
                self.cursor = (self.cursor + 1).min(len);
                Edit::Moved
            },
            KeyInput::Home => {
                self.cursor = 0;
                Edit::Moved
            },
            KeyInput::End => {
                self.cursor = len;
                Edit::Moved
            },
            KeyInput::Enter | KeyInput::Tab | KeyInput::Esc | KeyInput::Up | KeyInput::Down => {
                Edit::Ignored
            },
        }
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.buffer.char_indices().nth(chars).map_or(self.buffer.len(), |(idx, _)| idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> TextInput {
        let mut input = TextInput::default();
        for c in text.chars() {
            input.apply(KeyInput::Char(c));
        }
        input
    }

    #[test]
    fn char_input_appends() {
        let input = typed("hi");
        assert_eq!(input.text(), "hi");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn backspace_removes_char_before_cursor() {
        let mut input = typed("ab");
        assert_eq!(input.apply(KeyInput::Backspace), Edit::Changed);
        assert_eq!(input.text(), "a");

        input.apply(KeyInput::Backspace);
        assert_eq!(input.apply(KeyInput::Backspace), Edit::Moved);
        assert!(input.is_empty());
    }

    #[test]
    fn multibyte_editing_is_char_based() {
        let mut input = typed("héllo");
        input.apply(KeyInput::Home);
        input.apply(KeyInput::Right);
        input.apply(KeyInput::Delete);
        assert_eq!(input.text(), "hllo");

        input.apply(KeyInput::Char('é'));
        assert_eq!(input.text(), "héllo");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn cursor_movement() {
        let mut input = typed("abc");

        input.apply(KeyInput::Home);
        assert_eq!(input.cursor(), 0);
        input.apply(KeyInput::End);
        assert_eq!(input.cursor(), 3);
        input.apply(KeyInput::Left);
        assert_eq!(input.cursor(), 2);
        input.apply(KeyInput::Right);
        input.apply(KeyInput::Right);
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn take_clears_field() {
        let mut input = TextInput::with_text("alice");
        assert_eq!(input.cursor(), 5);
        assert_eq!(input.take(), "alice");
        assert!(input.is_empty());
        assert_eq!(input.cursor(), 0);
    }
}
