use lap_core::{Control, Stopwatch};

pub struct StopwatchState {
    pub timer: Stopwatch,
    pub lap_scroll_offset: usize,
}

impl StopwatchState {
    pub fn new() -> Self {
        Self {
            timer: Stopwatch::new(),
            lap_scroll_offset: 0,
        }
    }

    /// Applies `control` if it is currently offered. Returns whether the
    /// run state changed.
    pub fn press(&mut self, control: Control, now_ms: u64) -> bool {
        if !self.timer.controls().contains(&control) {
            log::debug!("ignoring {} in {:?}", control.label(), self.timer.phase());
            return false;
        }
        let applied = self.timer.activate(control, now_ms);
        if applied {
            log::info!(
                "{} at {}: phase {:?}, {} laps",
                control.label(),
                lap_core::format_ms_cs(self.timer.total_elapsed_ms(now_ms)),
                self.timer.phase(),
                self.timer.ledger().len()
            );
            match control {
                // New rows appear at the top; keep the view pinned there.
                Control::Lap | Control::Stop | Control::Reset => self.lap_scroll_offset = 0,
                _ => {}
            }
        }
        applied
    }

    /// The control bound to Enter: the rightmost one offered.
    pub fn primary(&self) -> Option<Control> {
        self.timer.controls().last().copied()
    }

    pub fn scroll_up(&mut self) -> bool {
        if self.lap_scroll_offset > 0 {
            self.lap_scroll_offset -= 1;
            true
        } else {
            false
        }
    }

    pub fn scroll_down(&mut self, visible_rows: usize) -> bool {
        let rows = self.row_count();
        if self.lap_scroll_offset + visible_rows < rows {
            self.lap_scroll_offset += 1;
            true
        } else {
            false
        }
    }

    /// Keeps the last row at the bottom edge when the view grows.
    pub fn clamp_scroll(&mut self, visible_rows: usize) {
        let max_offset = self.row_count().saturating_sub(visible_rows);
        self.lap_scroll_offset = self.lap_scroll_offset.min(max_offset);
    }

    fn row_count(&self) -> usize {
        let in_progress = usize::from(self.timer.phase() != lap_core::Phase::Idle);
        self.timer.ledger().len() + in_progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lap_core::Phase;

    #[test]
    fn test_primary_control() {
        let mut sw = StopwatchState::new();
        assert_eq!(sw.primary(), Some(Control::Start));
        sw.press(Control::Start, 0);
        assert_eq!(sw.primary(), Some(Control::Stop));
        sw.press(Control::Stop, 100);
        assert_eq!(sw.primary(), Some(Control::Resume));
    }

    #[test]
    fn test_press_hidden_control_is_ignored() {
        let mut sw = StopwatchState::new();
        assert!(!sw.press(Control::Lap, 0));
        assert!(!sw.press(Control::Reset, 0));
        assert_eq!(sw.timer.phase(), Phase::Idle);

        sw.press(Control::Start, 0);
        assert!(!sw.press(Control::Reset, 10));
        assert_eq!(sw.timer.phase(), Phase::Running);
    }

    #[test]
    fn test_scrolling() {
        let mut sw = StopwatchState::new();
        sw.press(Control::Start, 0);
        for t in 1..=5 {
            sw.press(Control::Lap, t * 100);
        }
        // 5 completed + 1 in progress, 4 visible.
        assert!(!sw.scroll_up());
        assert!(sw.scroll_down(4));
        assert!(sw.scroll_down(4));
        assert!(!sw.scroll_down(4));
        assert_eq!(sw.lap_scroll_offset, 2);

        sw.press(Control::Lap, 700);
        assert_eq!(sw.lap_scroll_offset, 0);
    }

    #[test]
    fn test_clamp_scroll() {
        let mut sw = StopwatchState::new();
        sw.press(Control::Start, 0);
        for t in 1..=5 {
            sw.press(Control::Lap, t * 100);
        }
        while sw.scroll_down(2) {}
        assert_eq!(sw.lap_scroll_offset, 4);

        sw.clamp_scroll(2);
        assert_eq!(sw.lap_scroll_offset, 4);
        sw.clamp_scroll(4);
        assert_eq!(sw.lap_scroll_offset, 2);
        sw.clamp_scroll(10);
        assert_eq!(sw.lap_scroll_offset, 0);
    }
}
