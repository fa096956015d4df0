mod config;
mod logging;
mod pump;
mod stopwatch;
mod ui;

use std::io::{self, Write};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};

use lap_core::Control;

use crate::config::Config;
use crate::pump::Pump;
use crate::stopwatch::StopwatchState;

const FALLBACK_SCREENSIZE: (u16, u16) = (80, 24);

const HELP_TEXT: &str = "STOPWATCH HELP\n\n\
     ENTER  Start / Stop / Resume\n\
     SPACE  Same as ENTER\n\
     l      Record lap\n\
     r      Reset (when stopped)\n\
     up/k   Scroll laps up\n\
     down/j Scroll laps down\n\
     h/?    This help\n\
     q/ESC  Quit\n\n\
     Green marks the longest lap,\n\
     red the shortest.";

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    FocusChange(bool),
    Pump(u64),
    InputClosed,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Action {
    Primary,
    Press(Control),
    ScrollUp,
    ScrollDown,
    Help,
    Quit,
}

fn key_action(key: &KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Primary),
        KeyCode::Char('l') => Some(Action::Press(Control::Lap)),
        KeyCode::Char('r') => Some(Action::Press(Control::Reset)),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::ScrollUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::ScrollDown),
        KeyCode::Char('h') | KeyCode::Char('?') => Some(Action::Help),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

struct LapwatchApp<W: Write> {
    out: W,
    epoch: Instant,
    config: Config,
    stopwatch: StopwatchState,
    pump: Pump,
    screensize: (u16, u16),
    allow_redraw: bool,
    help_visible: bool,
    torn_down: bool,
}

impl<W: Write> LapwatchApp<W> {
    fn new(out: W, config: Config, events: Sender<AppEvent>, screensize: (u16, u16)) -> Self {
        Self {
            out,
            epoch: Instant::now(),
            config,
            stopwatch: StopwatchState::new(),
            pump: Pump::new(events),
            screensize,
            allow_redraw: true,
            help_visible: false,
            torn_down: false,
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn redraw(&mut self) -> io::Result<()> {
        if !self.allow_redraw || self.torn_down {
            return Ok(());
        }
        if self.help_visible {
            return ui::draw_help(&mut self.out, self.screensize, HELP_TEXT);
        }
        let now = self.now_ms();
        let state = self.stopwatch.timer.display_state(now);
        let controls = self.stopwatch.timer.controls();
        ui::draw_stopwatch(
            &mut self.out,
            self.screensize,
            &state,
            &controls,
            self.stopwatch.lap_scroll_offset,
        )
    }

    /// Ticks only while running and visible.
    fn sync_pump(&mut self) {
        if self.stopwatch.timer.is_running() && self.allow_redraw && !self.torn_down {
            if !self.pump.is_running() {
                self.pump.start(self.config.tick_ms);
            }
        } else {
            self.pump.stop();
        }
    }

    fn dispatch(&mut self, event: AppEvent) -> io::Result<bool> {
        match event {
            AppEvent::Key(key) => return self.handle_key(key),
            AppEvent::Resize(width, height) => {
                self.screensize = (width, height);
                self.stopwatch.clamp_scroll(ui::visible_lap_rows(height));
                self.redraw()?;
            }
            AppEvent::FocusChange(focused) => self.handle_focus(focused)?,
            AppEvent::Pump(session) => self.handle_pump(session)?,
            AppEvent::InputClosed => return Ok(false),
        }
        Ok(true)
    }

    fn handle_pump(&mut self, session: u64) -> io::Result<()> {
        if self.torn_down || !self.pump.accepts(session) {
            log::trace!("dropping stale tick from session {}", session);
            return Ok(());
        }
        self.redraw()
    }

    fn handle_key(&mut self, key: KeyEvent) -> io::Result<bool> {
        // Any key dismisses help.
        if self.help_visible {
            self.help_visible = false;
            self.redraw()?;
            return Ok(true);
        }

        match key_action(&key) {
            Some(Action::Primary) => {
                if let Some(control) = self.stopwatch.primary() {
                    self.press(control)?;
                }
            }
            Some(Action::Press(control)) => self.press(control)?,
            Some(Action::ScrollUp) => {
                if self.stopwatch.scroll_up() {
                    self.redraw()?;
                }
            }
            Some(Action::ScrollDown) => {
                let visible = ui::visible_lap_rows(self.screensize.1);
                if self.stopwatch.scroll_down(visible) {
                    self.redraw()?;
                }
            }
            Some(Action::Help) => {
                self.help_visible = true;
                self.redraw()?;
            }
            Some(Action::Quit) => return Ok(false),
            None => {}
        }
        Ok(true)
    }

    fn press(&mut self, control: Control) -> io::Result<()> {
        let now = self.now_ms();
        if self.stopwatch.press(control, now) {
            self.sync_pump();
            self.redraw()?;
        }
        Ok(())
    }

    fn handle_focus(&mut self, focused: bool) -> io::Result<()> {
        log::debug!("focus {}", if focused { "gained" } else { "lost" });
        self.allow_redraw = focused;
        self.sync_pump();
        if focused {
            self.redraw()?;
        }
        Ok(())
    }

    fn teardown(&mut self) {
        self.torn_down = true;
        self.pump.stop();
    }
}

fn run<W: Write>(app: &mut LapwatchApp<W>, events: &Receiver<AppEvent>) -> io::Result<()> {
    app.redraw()?;
    while let Ok(event) = events.recv() {
        if !app.dispatch(event)? {
            break;
        }
    }
    app.teardown();
    Ok(())
}

fn input_thread(events: Sender<AppEvent>) {
    loop {
        let forwarded = match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                events.send(AppEvent::Key(key))
            }
            Ok(Event::Resize(width, height)) => events.send(AppEvent::Resize(width, height)),
            Ok(Event::FocusGained) => events.send(AppEvent::FocusChange(true)),
            Ok(Event::FocusLost) => events.send(AppEvent::FocusChange(false)),
            Ok(_) => Ok(()),
            Err(e) => {
                log::error!("terminal input failed: {}", e);
                events.send(AppEvent::InputClosed).ok();
                break;
            }
        };
        if forwarded.is_err() {
            break;
        }
    }
}

fn restore_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    let shown = execute!(stdout, DisableFocusChange, Show, LeaveAlternateScreen);
    terminal::disable_raw_mode()?;
    shown
}

fn main() -> io::Result<()> {
    let config = Config::from_env();
    logging::init(config.log_file.as_deref())?;
    log::info!("lapwatch starting, tick every {} ms", config.tick_ms);

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableFocusChange, Hide) {
        restore_terminal().ok();
        return Err(e);
    }
    let screensize = terminal::size().unwrap_or(FALLBACK_SCREENSIZE);

    let (tx, rx) = crossbeam_channel::unbounded();
    let input_tx = tx.clone();
    std::thread::spawn(move || input_thread(input_tx));

    let result = {
        let mut app = LapwatchApp::new(stdout, config, tx, screensize);
        run(&mut app, &rx)
    };

    let restored = restore_terminal();
    if let Err(e) = &result {
        log::error!("lapwatch failed: {}", e);
    }
    log::info!("lapwatch exiting");
    result.and(restored)
}
