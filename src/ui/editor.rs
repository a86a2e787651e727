//! Editor surface: wraps the embedded `tui-textarea` widget.
//!
//! The widget owns cursor, selection and undo/redo.  The shell feeds it
//! (text, language, theme) and reads back the new text and cursor position
//! after every input.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use tui_textarea::{CursorMove, Input, TextArea};

use crate::core::file::{EditorFile, FileId};

use super::theme::Theme;

/// Editing state for the active tab.
pub struct EditorPane {
    /// File currently loaded into the widget.
    pub file_id: Option<FileId>,
    textarea: TextArea<'static>,
}

impl Default for EditorPane {
    fn default() -> Self {
        Self {
            file_id: None,
            textarea: TextArea::default(),
        }
    }
}

impl EditorPane {
    /// Load `file` (or nothing) into a fresh widget, cursor at the top.
    pub fn load(&mut self, file: Option<&EditorFile>, theme: &Theme, tab_width: u8) {
        self.file_id = file.map(|f| f.id);
        self.textarea = new_textarea(file.map(|f| f.content.as_str()).unwrap_or(""));
        self.apply_style(theme, tab_width);
    }

    /// Replace the text of the loaded file, keeping the cursor where it was
    /// (clamped to the new text).  Undo history is reset.
    pub fn reload(&mut self, file: &EditorFile, theme: &Theme, tab_width: u8) {
        let (row, col) = self.textarea.cursor();
        self.file_id = Some(file.id);
        self.textarea = new_textarea(&file.content);
        self.apply_style(theme, tab_width);
        self.jump_to(row, col);
    }

    pub fn apply_style(&mut self, theme: &Theme, tab_width: u8) {
        self.textarea.set_style(theme.editor_style());
        self.textarea.set_line_number_style(theme.line_number_style());
        self.textarea.set_cursor_line_style(theme.cursor_line_style());
        self.textarea.set_tab_length(tab_width);
    }

    /// Forward an input event.  Returns the full new text when the buffer
    /// changed.
    pub fn input(&mut self, input: impl Into<Input>) -> Option<String> {
        if self.file_id.is_none() {
            return None;
        }
        self.textarea.input(input).then(|| self.text())
    }

    /// Insert pasted text at the cursor.
    pub fn paste(&mut self, text: &str) -> Option<String> {
        if self.file_id.is_none() {
            return None;
        }
        let normalised = text.replace("\r\n", "\n");
        self.textarea.insert_str(normalised).then(|| self.text())
    }

    pub fn text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    /// Zero-based (row, column) of the cursor.
    pub fn cursor(&self) -> (usize, usize) {
        self.textarea.cursor()
    }

    /// Move the cursor, clamping to the buffer.
    pub fn jump_to(&mut self, row: usize, col: usize) {
        let row = u16::try_from(row).unwrap_or(u16::MAX);
        let col = u16::try_from(col).unwrap_or(u16::MAX);
        self.textarea.move_cursor(CursorMove::Jump(row, col));
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }
}

/// Split on `\n` only, so a trailing newline survives the round trip
/// through the widget's line vector.
fn new_textarea(content: &str) -> TextArea<'static> {
    TextArea::new(content.split('\n').map(str::to_string).collect())
}

// ───────────────────────────────────────── widget ────────────

/// Renders the editor pane, or a welcome page when no file is open.
pub struct EditorView<'a> {
    pub pane: &'a EditorPane,
    pub file: Option<&'a EditorFile>,
    pub theme: &'a Theme,
    pub focused: bool,
    /// Hints shown on the welcome page (action label, binding).
    pub shortcuts: &'a [(&'static str, String)],
}

impl<'a> Widget for EditorView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = match self.file {
            Some(f) => format!(" {} — {} ", f.path, f.language),
            None => " Welcome ".to_string(),
        };
        let block = Block::default()
            .title(title)
            .title_style(self.theme.title_style())
            .borders(Borders::TOP)
            .border_style(self.theme.border_style(self.focused))
            .style(self.theme.editor_style());
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.file.is_some() {
            self.pane.textarea().render(inner, buf);
            return;
        }

        let mut lines = vec![
            Line::raw(""),
            Line::from(Span::styled("codeshell", self.theme.title_style())),
            Line::from(Span::styled(
                "Open a file from the explorer to start editing.",
                self.theme.muted_style(),
            )),
            Line::raw(""),
        ];
        for (label, keys) in self.shortcuts {
            lines.push(Line::from(vec![
                Span::styled(format!("{label:>16}  "), self.theme.muted_style()),
                Span::styled(keys.clone(), self.theme.file_style()),
            ]));
        }
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .style(self.theme.editor_style())
            .render(inner, buf);
    }
}
