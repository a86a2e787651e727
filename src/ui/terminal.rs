//! Bottom terminal panel: session tabs, scrollback and the prompt line.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::core::terminal::{LineKind, TerminalSessions};
use crate::core::tree::FileTree;
use crate::ui::theme::Theme;

pub struct TerminalPanel<'a> {
    pub sessions: &'a TerminalSessions,
    pub tree: &'a FileTree,
    pub theme: &'a Theme,
    pub focused: bool,
}

impl<'a> Widget for TerminalPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut title = vec![Span::styled(" TERMINAL ", self.theme.title_style())];
        for (i, term) in self.sessions.terminals.iter().enumerate() {
            title.push(Span::styled(
                format!(" {} ", term.title()),
                self.theme.tab_style(i == self.sessions.active),
            ));
        }
        let block = Block::default()
            .title(Line::from(title))
            .borders(Borders::TOP)
            .border_style(self.theme.border_style(self.focused))
            .style(self.theme.panel_style());
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height == 0 {
            return;
        }

        let Some(term) = self.sessions.active() else {
            Paragraph::new(Span::styled(
                " No terminal sessions.",
                self.theme.muted_style(),
            ))
            .render(inner, buf);
            return;
        };

        let mut lines: Vec<Line> = term
            .lines
            .iter()
            .map(|l| match l.kind {
                LineKind::Command => Line::from(l.text.as_str()),
                LineKind::Output => Line::from(Span::styled(l.text.as_str(), self.theme.file_style())),
                LineKind::Error => Line::from(Span::styled(l.text.as_str(), self.theme.error_style())),
            })
            .collect();
        let cursor = if self.focused { "█" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(term.prompt(self.tree), self.theme.prompt_style()),
            Span::raw(term.input.as_str()),
            Span::raw(cursor),
        ]));

        // Keep the prompt pinned to the bottom row.
        let skip = lines.len().saturating_sub(inner.height as usize);
        let visible: Vec<Line> = lines.into_iter().skip(skip).collect();
        Paragraph::new(visible).render(inner, buf);
    }
}
