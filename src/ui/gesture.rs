/// What a completed press/release pair amounts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    /// Release to the left of the press.
    SwipeLeft,
    /// Release to the right of the press.
    SwipeRight,
    Tap { column: u16, row: u16 },
}

/// Turns mouse press/release pairs into swipes or taps. Only the press position is kept.
#[derive(Clone, Debug)]
pub struct SwipeTracker {
    threshold: u16,
    start: Option<(u16, u16)>,
}

impl SwipeTracker {
    pub fn new(threshold: u16) -> Self {
        Self {
            threshold: threshold.max(1),
            start: None,
        }
    }

    pub fn press(&mut self, column: u16, row: u16) {
        self.start = Some((column, row));
    }

    pub fn release(&mut self, column: u16, row: u16) -> Option<Gesture> {
        let (start_col, start_row) = self.start.take()?;
        let dx = column as i32 - start_col as i32;
        let dy = row as i32 - start_row as i32;
        if dx.unsigned_abs() >= self.threshold as u32 && dx.unsigned_abs() > dy.unsigned_abs() {
            return Some(if dx < 0 {
                Gesture::SwipeLeft
            } else {
                Gesture::SwipeRight
            });
        }
        Some(Gesture::Tap {
            column: start_col,
            row: start_row,
        })
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }
}
