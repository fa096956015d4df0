//! Pure stopwatch logic with no platform dependencies.
//! Every operation takes the current instant in milliseconds, so the whole
//! state machine is testable on host without a real clock.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Idle,
    Running,
    Paused,
}

/// Times the lap in progress across pause/resume segments.
#[derive(Clone, Debug)]
pub struct TimerClock {
    phase: Phase,
    accumulated_ms: u64,
    segment_start_ms: Option<u64>,
}

impl TimerClock {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            accumulated_ms: 0,
            segment_start_ms: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.accumulated_ms = 0;
        self.segment_start_ms = Some(now_ms);
        self.phase = Phase::Running;
        true
    }

    /// Closes the lap in progress and opens a new one at `now_ms`.
    /// Returns the closed lap's duration.
    pub fn split(&mut self, now_ms: u64) -> Option<u64> {
        if self.phase != Phase::Running {
            return None;
        }
        let closed = self.elapsed_ms(now_ms);
        self.accumulated_ms = 0;
        self.segment_start_ms = Some(now_ms);
        Some(closed)
    }

    /// Closes the lap in progress like `split`, then pauses.
    pub fn stop(&mut self, now_ms: u64) -> Option<u64> {
        if self.phase != Phase::Running {
            return None;
        }
        let closed = self.elapsed_ms(now_ms);
        self.accumulated_ms = 0;
        self.segment_start_ms = None;
        self.phase = Phase::Paused;
        Some(closed)
    }

    pub fn resume(&mut self, now_ms: u64) -> bool {
        if self.phase != Phase::Paused {
            return false;
        }
        self.segment_start_ms = Some(now_ms);
        self.phase = Phase::Running;
        true
    }

    pub fn reset(&mut self) -> bool {
        if self.phase != Phase::Paused {
            return false;
        }
        self.accumulated_ms = 0;
        self.segment_start_ms = None;
        self.phase = Phase::Idle;
        true
    }

    /// Elapsed time of the lap in progress.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match (self.phase, self.segment_start_ms) {
            (Phase::Running, Some(start)) => {
                self.accumulated_ms + now_ms.saturating_sub(start)
            }
            _ => self.accumulated_ms,
        }
    }
}

impl Default for TimerClock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct LapMark {
    pub is_fastest: bool,
    pub is_slowest: bool,
}

/// Completed lap durations in the order they were closed.
#[derive(Clone, Debug, Default)]
pub struct LapLedger {
    laps: Vec<u64>,
}

impl LapLedger {
    pub fn new() -> Self {
        Self { laps: Vec::new() }
    }

    pub fn push(&mut self, duration_ms: u64) {
        self.laps.push(duration_ms);
    }

    pub fn clear(&mut self) {
        self.laps.clear();
    }

    pub fn len(&self) -> usize {
        self.laps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }

    pub fn laps(&self) -> &[u64] {
        &self.laps
    }

    pub fn total_ms(&self) -> u64 {
        self.laps.iter().sum()
    }

    /// `(min, max)` over the completed laps, or `None` with fewer than two.
    pub fn extremes(&self) -> Option<(u64, u64)> {
        if self.laps.len() < 2 {
            return None;
        }
        let min = self.laps.iter().copied().min()?;
        let max = self.laps.iter().copied().max()?;
        Some((min, max))
    }

    /// Marks for a lap of `duration_ms`.
    ///
    /// The longest lap carries the "fastest" mark and the shortest the
    /// "slowest" mark. Every lap sharing an extreme value is marked.
    pub fn classify(&self, duration_ms: u64) -> LapMark {
        match self.extremes() {
            Some((min, max)) => LapMark {
                is_fastest: duration_ms == max,
                is_slowest: duration_ms == min,
            },
            None => LapMark::default(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Control {
    Start,
    Lap,
    Stop,
    Reset,
    Resume,
}

impl Control {
    pub fn label(&self) -> &'static str {
        match self {
            Control::Start => "Start",
            Control::Lap => "Lap",
            Control::Stop => "Stop",
            Control::Reset => "Reset",
            Control::Resume => "Resume",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LapRow {
    /// 1-based, oldest lap is 1.
    pub number: usize,
    pub duration_ms: u64,
    pub is_fastest: bool,
    pub is_slowest: bool,
    pub in_progress: bool,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DisplayState {
    pub total_elapsed_ms: u64,
    /// Most recent first; the lap in progress leads whenever not idle.
    pub laps: Vec<LapRow>,
    pub phase: Phase,
}

/// The single run state: one clock plus the laps it has closed.
#[derive(Clone, Debug, Default)]
pub struct Stopwatch {
    clock: TimerClock,
    ledger: LapLedger,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            clock: TimerClock::new(),
            ledger: LapLedger::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.clock.phase()
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn ledger(&self) -> &LapLedger {
        &self.ledger
    }

    pub fn start(&mut self, now_ms: u64) -> bool {
        self.clock.start(now_ms)
    }

    pub fn lap(&mut self, now_ms: u64) -> Option<u64> {
        let closed = self.clock.split(now_ms)?;
        self.ledger.push(closed);
        Some(closed)
    }

    pub fn stop(&mut self, now_ms: u64) -> Option<u64> {
        let closed = self.clock.stop(now_ms)?;
        self.ledger.push(closed);
        Some(closed)
    }

    pub fn resume(&mut self, now_ms: u64) -> bool {
        self.clock.resume(now_ms)
    }

    pub fn reset(&mut self) -> bool {
        if self.ledger.is_empty() || !self.clock.reset() {
            return false;
        }
        self.ledger.clear();
        true
    }

    pub fn in_progress_ms(&self, now_ms: u64) -> u64 {
        self.clock.elapsed_ms(now_ms)
    }

    pub fn total_elapsed_ms(&self, now_ms: u64) -> u64 {
        self.ledger.total_ms() + self.in_progress_ms(now_ms)
    }

    pub fn display_state(&self, now_ms: u64) -> DisplayState {
        let completed = self.ledger.laps();
        let mut laps = Vec::with_capacity(completed.len() + 1);

        if self.phase() != Phase::Idle {
            laps.push(LapRow {
                number: completed.len() + 1,
                duration_ms: self.in_progress_ms(now_ms),
                is_fastest: false,
                is_slowest: false,
                in_progress: true,
            });
        }
        for (idx, &duration_ms) in completed.iter().enumerate().rev() {
            let mark = self.ledger.classify(duration_ms);
            laps.push(LapRow {
                number: idx + 1,
                duration_ms,
                is_fastest: mark.is_fastest,
                is_slowest: mark.is_slowest,
                in_progress: false,
            });
        }

        DisplayState {
            total_elapsed_ms: self.total_elapsed_ms(now_ms),
            laps,
            phase: self.phase(),
        }
    }

    /// Controls offered in the current phase, left to right.
    pub fn controls(&self) -> Vec<Control> {
        match self.phase() {
            Phase::Idle => vec![Control::Start],
            Phase::Running => vec![Control::Lap, Control::Stop],
            Phase::Paused if self.ledger.is_empty() => vec![Control::Resume],
            Phase::Paused => vec![Control::Reset, Control::Resume],
        }
    }

    /// Applies `control`; returns false when the current phase ignores it.
    pub fn activate(&mut self, control: Control, now_ms: u64) -> bool {
        match control {
            Control::Start => self.start(now_ms),
            Control::Lap => self.lap(now_ms).is_some(),
            Control::Stop => self.stop(now_ms).is_some(),
            Control::Reset => self.reset(),
            Control::Resume => self.resume(now_ms),
        }
    }
}

/// Format milliseconds as "MM:SS.cs" (centiseconds). Minutes do not wrap.
pub fn format_ms_cs(ms: u64) -> String {
    let m = ms / 60_000;
    let s = (ms % 60_000) / 1000;
    let cs = (ms % 1000) / 10;
    format!("{:02}:{:02}.{:02}", m, s, cs)
}
