use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Widget;

use crate::ui::theme::Theme;

/// Columns taken by each dot, including the gap after it.
const DOT_STRIDE: u16 = 2;

/// One clickable dot per item: done, current, ahead.
pub struct ProgressDots<'a> {
    index: usize,
    total: usize,
    completed: bool,
    theme: &'a Theme,
}

impl<'a> ProgressDots<'a> {
    pub fn new(index: usize, total: usize, completed: bool, theme: &'a Theme) -> Self {
        Self {
            index,
            total,
            completed,
            theme,
        }
    }
}

fn origin(area: Rect, total: usize) -> u16 {
    let width = (total as u16).saturating_mul(DOT_STRIDE);
    area.x + area.width.saturating_sub(width) / 2
}

/// The item whose dot is at `(column, row)`, if any.
pub fn hit(area: Rect, total: usize, column: u16, row: u16) -> Option<usize> {
    if row != area.y || column < area.x || column >= area.x + area.width {
        return None;
    }
    let start = origin(area, total);
    if column < start {
        return None;
    }
    let offset = column - start;
    let index = (offset / DOT_STRIDE) as usize;
    (offset % DOT_STRIDE == 0 && index < total).then_some(index)
}

impl Widget for ProgressDots<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        if area.height == 0 {
            return;
        }
        let start = origin(area, self.total);
        for i in 0..self.total {
            let x = start + i as u16 * DOT_STRIDE;
            if x >= area.x + area.width {
                break;
            }
            let (symbol, style) = if self.completed || i < self.index {
                ("●", Style::default().fg(colors.correct()))
            } else if i == self.index {
                ("◉", Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD))
            } else {
                ("○", Style::default().fg(colors.muted()))
            };
            buf.set_string(x, area.y, symbol, style);
        }
    }
}
