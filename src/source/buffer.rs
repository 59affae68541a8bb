use ropey::Rope;

/// Cursor position in the source buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column, in chars.
    pub col: usize,
    /// Column to return to when moving vertically through shorter lines.
    sticky_col: usize,
}

impl Cursor {
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            sticky_col: col,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// The diagram source text being edited.
///
/// Backed by a rope; columns are counted in chars so multi-byte text never
/// splits a code point.
#[derive(Debug, Clone)]
pub struct SourceBuffer {
    rope: Rope,
    cursor: Cursor,
}

impl SourceBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(&normalize_line_endings(text)),
            cursor: Cursor::default(),
        }
    }

    /// Replace the whole text and move the cursor to the start.
    pub fn replace(&mut self, text: &str) {
        self.rope = Rope::from_str(&normalize_line_endings(text));
        self.cursor = Cursor::default();
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Whether `text` equals the buffer once line endings are normalized.
    pub fn has_text(&self, text: &str) -> bool {
        self.rope == normalize_line_endings(text).as_str()
    }

    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Line content without its line break.
    pub fn line_at(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let text = self.rope.line(line).to_string();
        Some(text.trim_end_matches(['\n', '\r']).to_string())
    }

    /// Line length in chars, excluding the line break.
    pub fn line_len(&self, line: usize) -> usize {
        self.line_at(line).map_or(0, |s| s.chars().count())
    }

    pub fn insert_char(&mut self, ch: char) {
        let idx = self.cursor_char_idx();
        self.rope.insert_char(idx, ch);
        if ch == '\n' {
            self.cursor = Cursor::at(self.cursor.line + 1, 0);
        } else {
            self.cursor = Cursor::at(self.cursor.line, self.cursor.col + 1);
        }
    }

    /// Insert pasted text, normalizing CRLF to LF.
    pub fn insert_str(&mut self, text: &str) {
        let text = normalize_line_endings(text);
        if text.is_empty() {
            return;
        }
        let idx = self.cursor_char_idx();
        self.rope.insert(idx, &text);
        let end = idx + text.chars().count();
        let line = self.rope.char_to_line(end);
        let col = end - self.rope.line_to_char(line);
        self.cursor = Cursor::at(line, col);
    }

    pub fn split_line(&mut self) {
        self.insert_char('\n');
    }

    /// Delete the char before the cursor, joining lines at column 0.
    /// Returns false when there is nothing to delete.
    pub fn delete_back(&mut self) -> bool {
        let idx = self.cursor_char_idx();
        if idx == 0 {
            return false;
        }
        let (line, col) = if self.cursor.col == 0 {
            let prev = self.cursor.line - 1;
            (prev, self.line_len(prev))
        } else {
            (self.cursor.line, self.cursor.col - 1)
        };
        self.rope.remove(idx - 1..idx);
        self.cursor = Cursor::at(line, col);
        true
    }

    /// Delete the char under the cursor, joining lines at line end.
    pub fn delete_forward(&mut self) -> bool {
        let idx = self.cursor_char_idx();
        if idx >= self.rope.len_chars() {
            return false;
        }
        self.rope.remove(idx..=idx);
        true
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        let Cursor {
            line,
            col,
            sticky_col,
        } = self.cursor;
        match direction {
            Direction::Left if col > 0 => self.cursor = Cursor::at(line, col - 1),
            Direction::Left if line > 0 => {
                self.cursor = Cursor::at(line - 1, self.line_len(line - 1));
            }
            Direction::Right if col < self.line_len(line) => {
                self.cursor = Cursor::at(line, col + 1);
            }
            Direction::Right if line + 1 < self.line_count() => {
                self.cursor = Cursor::at(line + 1, 0);
            }
            Direction::Up if line > 0 => self.move_vertical(line - 1, sticky_col),
            Direction::Down if line + 1 < self.line_count() => {
                self.move_vertical(line + 1, sticky_col);
            }
            _ => {}
        }
    }

    pub const fn move_home(&mut self) {
        self.cursor = Cursor::at(self.cursor.line, 0);
    }

    pub fn move_end(&mut self) {
        self.cursor = Cursor::at(self.cursor.line, self.line_len(self.cursor.line));
    }

    pub const fn move_to_start(&mut self) {
        self.cursor = Cursor::at(0, 0);
    }

    pub fn move_to_end(&mut self) {
        let last = self.line_count().saturating_sub(1);
        self.cursor = Cursor::at(last, self.line_len(last));
    }

    /// Place the cursor, clamping to the buffer contents.
    pub fn move_to(&mut self, line: usize, col: usize) {
        let line = line.min(self.line_count().saturating_sub(1));
        self.cursor = Cursor::at(line, col.min(self.line_len(line)));
    }

    fn move_vertical(&mut self, line: usize, sticky_col: usize) {
        self.cursor = Cursor {
            line,
            col: sticky_col.min(self.line_len(line)),
            sticky_col,
        };
    }

    fn cursor_char_idx(&self) -> usize {
        let line = self.cursor.line.min(self.line_count().saturating_sub(1));
        self.rope.line_to_char(line) + self.cursor.col.min(self.line_len(line))
    }
}

impl Default for SourceBuffer {
    fn default() -> Self {
        Self::from_text("")
    }
}

/// CRLF and lone CR become LF.
fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
