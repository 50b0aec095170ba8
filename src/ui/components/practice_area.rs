use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use grammr::engine::EntityId;
use grammr::session::view::{EntityStatus, EntityView, ItemView, PracticeView, PromptView};

use crate::ui::theme::{Theme, ThemeColors};

/// Letter shown next to the pool entry at `position`.
pub fn hotkey_for(position: usize) -> Option<char> {
    (position < 26).then(|| (b'a' + position as u8) as char)
}

/// Pool position selected by a hotkey letter.
pub fn position_for(key: char) -> Option<usize> {
    let key = key.to_ascii_lowercase();
    key.is_ascii_lowercase().then(|| (key as u8 - b'a') as usize)
}

/// The current item of a practice session, with a hotkey on every pickable entity.
pub struct PracticeArea<'a> {
    view: &'a PracticeView,
    held: Option<EntityId>,
    theme: &'a Theme,
}

impl<'a> PracticeArea<'a> {
    pub fn new(view: &'a PracticeView, held: Option<EntityId>, theme: &'a Theme) -> Self {
        Self { view, held, theme }
    }
}

fn status_style(colors: &ThemeColors, status: EntityStatus) -> Style {
    match status {
        EntityStatus::Default => Style::default().fg(colors.fg()),
        EntityStatus::Correct => Style::default().fg(colors.correct()).add_modifier(Modifier::BOLD),
        EntityStatus::Incorrect => Style::default()
            .fg(colors.incorrect())
            .bg(colors.incorrect_bg())
            .add_modifier(Modifier::BOLD),
    }
}

fn pool_line<'s>(colors: &ThemeColors, pool: &'s [EntityView], held: Option<EntityId>) -> Line<'s> {
    let mut spans = Vec::new();
    for (position, entity) in pool.iter().enumerate() {
        let key = hotkey_for(position).map(|k| format!("[{k}]")).unwrap_or_default();
        spans.push(Span::styled(key, Style::default().fg(colors.hotkey())));
        let style = if held == Some(entity.id) {
            Style::default().fg(colors.held()).add_modifier(Modifier::REVERSED)
        } else {
            status_style(colors, entity.status)
        };
        spans.push(Span::styled(entity.label.as_str(), style));
        if let Some(gloss) = &entity.gloss {
            spans.push(Span::styled(format!(" ({gloss})"), Style::default().fg(colors.muted())));
        }
        spans.push(Span::raw("   "));
    }
    Line::from(spans)
}

fn label(colors: &ThemeColors, text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(colors.muted()).add_modifier(Modifier::ITALIC),
    ))
}

fn item_lines<'s>(colors: &ThemeColors, item: &'s ItemView, held: Option<EntityId>) -> Vec<Line<'s>> {
    let mut lines = Vec::new();
    match &item.prompt {
        PromptView::Assemble { prompt } => {
            lines.push(label(colors, prompt.as_deref().unwrap_or("Build the sentence.")));
            lines.push(Line::from(""));
            let built = item
                .placed
                .iter()
                .map(|e| e.label.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let built = if built.is_empty() { "…".to_string() } else { built };
            lines.push(Line::from(vec![
                Span::styled("  ▸ ", Style::default().fg(colors.accent())),
                Span::styled(built, status_style(colors, item.builder_status)),
            ]));
            lines.push(Line::from(""));
            lines.push(label(colors, "Words:"));
            lines.push(pool_line(colors, &item.pool, held));
        }
        PromptView::Blank { before, after, filled } => {
            lines.push(label(colors, "Fill in the blank."));
            lines.push(Line::from(""));
            let chosen_status = item.placed.first().map(|e| e.status).unwrap_or_default();
            lines.push(Line::from(vec![
                Span::styled(format!("  {before} "), Style::default().fg(colors.fg())),
                Span::styled(
                    filled.clone().unwrap_or_else(|| "_____".to_string()),
                    status_style(colors, chosen_status).add_modifier(Modifier::UNDERLINED),
                ),
                Span::styled(format!(" {after}"), Style::default().fg(colors.fg())),
            ]));
            lines.push(Line::from(""));
            lines.push(pool_line(colors, &item.pool, held));
        }
        PromptView::Select { category } => {
            lines.push(label(colors, &format!("Select every {category}.")));
            lines.push(Line::from(""));
            lines.push(pool_line(colors, &item.pool, held));
        }
        PromptView::Classify { prompt } => {
            lines.push(label(colors, "Sort the parts of the sentence."));
            lines.push(Line::from(Span::styled(
                format!("  {prompt}"),
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
            for (n, slot) in item.slots.iter().enumerate() {
                let occupant = slot
                    .occupant
                    .as_ref()
                    .map(|o| o.label.as_str())
                    .unwrap_or("      ");
                lines.push(Line::from(vec![
                    Span::styled(format!("  {} ", n + 1), Style::default().fg(colors.hotkey())),
                    Span::styled(format!("{:<10}", slot.label), Style::default().fg(colors.muted())),
                    Span::styled(format!("[ {occupant} ]"), status_style(colors, slot.status)),
                ]));
            }
            lines.push(Line::from(""));
            lines.push(label(colors, "Fragments:"));
            lines.push(pool_line(colors, &item.pool, held));
        }
    }
    lines
}

impl Widget for PracticeArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let border = if self.view.celebrating {
            colors.celebrate()
        } else if self.view.item.as_ref().is_some_and(|i| i.builder_status == EntityStatus::Incorrect) {
            colors.incorrect()
        } else {
            colors.border_focused()
        };
        let block = Block::bordered()
            .title(format!(" {} ", self.view.kind.title()))
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = match &self.view.item {
            Some(item) => item_lines(colors, item, self.held),
            None => vec![
                Line::from(""),
                Line::from(Span::styled(
                    "  Practice complete!",
                    Style::default().fg(colors.celebrate()).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "  Press Enter or → to continue.",
                    Style::default().fg(colors.muted()),
                )),
            ],
        };

        if self.view.celebrating {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "  ✓ Correct!",
                Style::default().fg(colors.celebrate()).add_modifier(Modifier::BOLD),
            )));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
