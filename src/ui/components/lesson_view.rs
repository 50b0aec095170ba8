use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use grammr::content::Lesson;

use crate::ui::theme::Theme;

/// Explanation and example sentences of one lesson.
pub struct LessonView<'a> {
    lesson: &'a Lesson,
    example: usize,
    theme: &'a Theme,
}

impl<'a> LessonView<'a> {
    pub fn new(lesson: &'a Lesson, example: usize, theme: &'a Theme) -> Self {
        Self {
            lesson,
            example,
            theme,
        }
    }
}

impl Widget for LessonView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.lesson.title))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let example_rows = (self.lesson.examples.len() as u16).saturating_mul(2) + 1;
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(example_rows)])
            .split(inner);

        let mut prose: Vec<Line> = Vec::new();
        if !self.lesson.summary.is_empty() {
            prose.push(Line::from(Span::styled(
                self.lesson.summary.as_str(),
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )));
            prose.push(Line::from(""));
        }
        for paragraph in self.lesson.explanation.split("\n\n") {
            let text = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                continue;
            }
            prose.push(Line::from(Span::styled(text, Style::default().fg(colors.fg()))));
            prose.push(Line::from(""));
        }
        Paragraph::new(prose)
            .wrap(Wrap { trim: true })
            .render(layout[0], buf);

        let mut examples: Vec<Line> = vec![Line::from(Span::styled(
            "Examples",
            Style::default().fg(colors.muted()).add_modifier(Modifier::UNDERLINED),
        ))];
        for (i, example) in self.lesson.examples.iter().enumerate() {
            let current = i == self.example;
            let marker = if current { "▶ " } else { "  " };
            let style = if current {
                Style::default().fg(colors.hotkey()).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            examples.push(Line::from(Span::styled(format!("{marker}{}", example.text), style)));
            let note = example.note.as_deref().unwrap_or("");
            examples.push(Line::from(Span::styled(
                format!("    {note}"),
                Style::default().fg(colors.muted()),
            )));
        }
        Paragraph::new(examples).render(layout[1], buf);
    }
}
