//! A multi-line text buffer for the brief field.

/// Text plus a cursor measured in chars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BriefInput {
    text: String,
    cursor: usize,
}

impl BriefInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index();
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Insert pasted text at the cursor. Windows line endings are folded.
    pub fn insert_str(&mut self, s: &str) {
        let s = s.replace("\r\n", "\n");
        let at = self.byte_index();
        self.text.insert_str(at, &s);
        self.cursor += s.chars().count();
    }

    pub fn newline(&mut self) {
        self.insert('\n');
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index();
        self.text.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let at = self.byte_index();
            self.text.remove(at);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    /// Move to the start of the current line.
    pub fn home(&mut self) {
        let (_, col) = self.cursor_position();
        self.cursor -= col;
    }

    /// Move to the end of the current line.
    pub fn end(&mut self) {
        let rest = self.text.chars().skip(self.cursor).take_while(|&c| c != '\n');
        self.cursor += rest.count();
    }

    /// (row, column) of the cursor, both in chars.
    pub fn cursor_position(&self) -> (usize, usize) {
        let before = &self.text[..self.byte_index()];
        let row = before.matches('\n').count();
        let col = before
            .rsplit('\n')
            .next()
            .map(|line| line.chars().count())
            .unwrap_or(0);
        (row, col)
    }

    fn byte_index(&self) -> usize {
        self.text
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> BriefInput {
        let mut input = BriefInput::new();
        for c in s.chars() {
            input.insert(c);
        }
        input
    }

    #[test]
    fn typing_appends() {
        let input = typed("héllo");
        assert_eq!(input.text(), "héllo");
        assert_eq!(input.cursor_position(), (0, 5));
    }

    #[test]
    fn edit_in_the_middle() {
        let mut input = typed("helo");
        input.left();
        input.insert('l');
        assert_eq!(input.text(), "hello");
        input.backspace();
        input.backspace();
        assert_eq!(input.text(), "heo");
        input.delete();
        assert_eq!(input.text(), "he");
        input.delete();
        assert_eq!(input.text(), "he");
    }

    #[test]
    fn backspace_at_start_does_nothing() {
        let mut input = typed("a");
        input.left();
        input.left();
        input.backspace();
        assert_eq!(input.text(), "a");
    }

    #[test]
    fn lines_and_cursor_position() {
        let mut input = typed("first");
        input.newline();
        input.insert_str("second\r\nthird");
        assert_eq!(input.text(), "first\nsecond\nthird");
        assert_eq!(input.cursor_position(), (2, 5));

        input.home();
        assert_eq!(input.cursor_position(), (2, 0));
        input.left();
        assert_eq!(input.cursor_position(), (1, 6));
        input.home();
        input.end();
        assert_eq!(input.cursor_position(), (1, 6));
    }

    #[test]
    fn right_stops_at_end() {
        let mut input = typed("ab");
        input.right();
        assert_eq!(input.cursor_position(), (0, 2));
    }
}
