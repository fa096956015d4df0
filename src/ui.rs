use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;

use lap_core::{format_ms_cs, Control, DisplayState, LapRow};

/// Rows taken by everything except the lap list.
const CHROME_ROWS: u16 = 8;
const MARGIN: u16 = 2;

const FASTEST: Color = Color::Rgb { r: 0x4E, g: 0x7C, b: 0x55 };
const SLOWEST: Color = Color::Rgb { r: 0xD7, g: 0x18, b: 0x18 };

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LapTone {
    Plain,
    Fastest,
    Slowest,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LapLine {
    pub text: String,
    pub tone: LapTone,
}

pub fn visible_lap_rows(rows: u16) -> usize {
    rows.saturating_sub(CHROME_ROWS) as usize
}

pub fn lap_line(row: &LapRow, width: u16) -> LapLine {
    let label = format!("Lap {}", row.number);
    let time = format_ms_cs(row.duration_ms);
    let inner = width.saturating_sub(MARGIN * 2) as usize;
    let pad = inner.saturating_sub(label.len() + time.len()).max(1);
    // A lap carrying both marks shows as slowest.
    let tone = if row.is_slowest {
        LapTone::Slowest
    } else if row.is_fastest {
        LapTone::Fastest
    } else {
        LapTone::Plain
    };
    LapLine {
        text: format!("{}{}{}", label, " ".repeat(pad), time),
        tone,
    }
}

pub fn control_bar(controls: &[Control]) -> String {
    controls
        .iter()
        .map(|c| format!("[ {} ]", c.label()))
        .collect::<Vec<_>>()
        .join("   ")
}

fn centered_col(width: u16, text: &str) -> u16 {
    width.saturating_sub(text.chars().count() as u16) / 2
}

pub fn draw_stopwatch<W: Write>(
    out: &mut W,
    screensize: (u16, u16),
    state: &DisplayState,
    controls: &[Control],
    scroll: usize,
) -> io::Result<()> {
    let (width, height) = screensize;
    queue!(out, Clear(ClearType::All))?;

    queue!(
        out,
        MoveTo(MARGIN, 0),
        SetAttribute(Attribute::Bold),
        Print("LAPWATCH"),
        SetAttribute(Attribute::Reset)
    )?;

    let total = format_ms_cs(state.total_elapsed_ms);
    queue!(
        out,
        MoveTo(centered_col(width, &total), 2),
        SetAttribute(Attribute::Bold),
        Print(&total),
        SetAttribute(Attribute::Reset)
    )?;

    let rows = visible_lap_rows(height);
    for (i, row) in state.laps.iter().skip(scroll).take(rows).enumerate() {
        let line = lap_line(row, width);
        queue!(out, MoveTo(MARGIN, 4 + i as u16))?;
        match line.tone {
            LapTone::Fastest => queue!(out, SetForegroundColor(FASTEST))?,
            LapTone::Slowest => queue!(out, SetForegroundColor(SLOWEST))?,
            LapTone::Plain => {}
        }
        queue!(out, Print(&line.text), ResetColor)?;
    }

    let bar = control_bar(controls);
    queue!(
        out,
        MoveTo(centered_col(width, &bar), height.saturating_sub(3)),
        Print(&bar)
    )?;

    queue!(
        out,
        MoveTo(MARGIN, height.saturating_sub(1)),
        SetAttribute(Attribute::Dim),
        Print("ENTER=start/stop  l=lap  r=reset  h=help  q=quit"),
        SetAttribute(Attribute::Reset)
    )?;

    out.flush()
}

pub fn draw_help<W: Write>(out: &mut W, screensize: (u16, u16), help_text: &str) -> io::Result<()> {
    let (_, height) = screensize;
    queue!(out, Clear(ClearType::All))?;

    let mut y = 1u16;
    for (i, line) in help_text.lines().enumerate() {
        if y + 2 >= height {
            break;
        }
        queue!(out, MoveTo(MARGIN, y))?;
        if i == 0 {
            queue!(out, SetAttribute(Attribute::Bold), Print(line), SetAttribute(Attribute::Reset))?;
        } else {
            queue!(out, Print(line))?;
        }
        y += 1;
    }

    queue!(
        out,
        MoveTo(MARGIN, height.saturating_sub(1)),
        SetAttribute(Attribute::Dim),
        Print("Press any key to close"),
        SetAttribute(Attribute::Reset)
    )?;

    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lap_core::{Phase, Stopwatch};

    fn row(number: usize, duration_ms: u64, is_fastest: bool, is_slowest: bool) -> LapRow {
        LapRow {
            number,
            duration_ms,
            is_fastest,
            is_slowest,
            in_progress: false,
        }
    }

    #[test]
    fn test_lap_line_layout() {
        let line = lap_line(&row(3, 125_340, false, false), 24);
        assert_eq!(line.text, format!("Lap 3{}02:05.34", " ".repeat(7)));
        assert_eq!(line.text.len(), 20);
        assert_eq!(line.tone, LapTone::Plain);
    }

    #[test]
    fn test_lap_line_narrow_keeps_a_gap() {
        let line = lap_line(&row(12, 0, false, false), 4);
        assert_eq!(line.text, "Lap 12 00:00.00");
    }

    #[test]
    fn test_lap_tones() {
        assert_eq!(lap_line(&row(1, 150, true, false), 40).tone, LapTone::Fastest);
        assert_eq!(lap_line(&row(1, 50, false, true), 40).tone, LapTone::Slowest);
    }

    #[test]
    fn test_tied_laps_show_slowest() {
        let mut sw = Stopwatch::new();
        sw.start(0);
        sw.lap(400);
        sw.stop(800);
        let state = sw.display_state(800);
        let tied: Vec<&LapRow> = state.laps.iter().filter(|r| !r.in_progress).collect();
        assert_eq!(tied.len(), 2);
        for row in tied {
            assert!(row.is_fastest && row.is_slowest);
            assert_eq!(lap_line(row, 40).tone, LapTone::Slowest);
        }
    }

    #[test]
    fn test_control_bar() {
        assert_eq!(control_bar(&[Control::Start]), "[ Start ]");
        assert_eq!(control_bar(&[Control::Reset, Control::Resume]), "[ Reset ]   [ Resume ]");
    }

    #[test]
    fn test_visible_rows() {
        assert_eq!(visible_lap_rows(24), 16);
        assert_eq!(visible_lap_rows(5), 0);
    }

    #[test]
    fn test_draw_stopwatch_output() {
        let mut sw = Stopwatch::new();
        sw.start(0);
        sw.lap(50);
        sw.lap(150);
        sw.lap(300);
        let state = sw.display_state(300);
        assert_eq!(state.phase, Phase::Running);

        let mut out = Vec::new();
        draw_stopwatch(&mut out, (40, 20), &state, &sw.controls(), 0).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("00:00.30"));
        assert!(text.contains("Lap 4"));
        assert!(text.contains("Lap 1"));
        assert!(text.contains("[ Lap ]   [ Stop ]"));
        assert!(!text.contains("Resume"));
    }

    #[test]
    fn test_draw_stopwatch_scrolls() {
        let mut sw = Stopwatch::new();
        sw.start(0);
        for t in 1..=12u64 {
            sw.lap(t * 1000);
        }
        let state = sw.display_state(12_500);
        let mut out = Vec::new();
        // Height 10 leaves two lap rows.
        draw_stopwatch(&mut out, (40, 10), &state, &sw.controls(), 3).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("Lap 10"));
        assert!(text.contains("Lap 9"));
        assert!(!text.contains("Lap 13"));
        assert!(!text.contains("Lap 8 "));
    }

    #[test]
    fn test_draw_help() {
        let mut out = Vec::new();
        draw_help(&mut out, (40, 12), "HELP\n\nl  Record lap").unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("Record lap"));
        assert!(text.contains("Press any key to close"));
    }
}
