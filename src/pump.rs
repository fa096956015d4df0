use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::AppEvent;

struct Ticker {
    session: u64,
    cancel: Sender<()>,
    handle: JoinHandle<()>,
}

/// Periodic redraw source. At most one ticker thread is alive at a time;
/// every tick carries the session that produced it so the receiver can drop
/// ticks that were already in flight when their ticker was cancelled.
pub struct Pump {
    events: Sender<AppEvent>,
    ticker: Option<Ticker>,
    last_session: u64,
}

impl Pump {
    pub fn new(events: Sender<AppEvent>) -> Self {
        Self {
            events,
            ticker: None,
            last_session: 0,
        }
    }

    /// Cancels any running ticker, then starts a new one. Returns its session.
    pub fn start(&mut self, interval_ms: u64) -> u64 {
        self.stop();

        self.last_session += 1;
        let session = self.last_session;
        let interval = Duration::from_millis(interval_ms.max(1));
        let (cancel, cancelled) = crossbeam_channel::bounded::<()>(1);
        let events = self.events.clone();
        let handle = thread::spawn(move || tick_loop(session, interval, cancelled, events));

        log::debug!("pump session {} started at {} ms", session, interval_ms);
        self.ticker = Some(Ticker {
            session,
            cancel,
            handle,
        });
        session
    }

    pub fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            // Disconnecting the cancel channel wakes the ticker immediately.
            drop(ticker.cancel);
            if ticker.handle.join().is_err() {
                log::error!("pump session {} panicked", ticker.session);
            }
            log::debug!("pump session {} stopped", ticker.session);
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Whether a tick stamped with `session` came from the live ticker.
    pub fn accepts(&self, session: u64) -> bool {
        self.ticker.as_ref().map_or(false, |t| t.session == session)
    }
}

impl Drop for Pump {
    fn drop(&mut self) {
        self.stop();
    }
}

fn tick_loop(session: u64, interval: Duration, cancelled: Receiver<()>, events: Sender<AppEvent>) {
    loop {
        match cancelled.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                if events.send(AppEvent::Pump(session)).is_err() {
                    break;
                }
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn next_tick(rx: &Receiver<AppEvent>) -> u64 {
        match rx.recv_timeout(Duration::from_secs(2)) {
            Ok(AppEvent::Pump(session)) => session,
            other => panic!("expected a tick, got {:?}", other),
        }
    }

    #[test]
    fn test_ticks_carry_session() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut pump = Pump::new(tx);
        let session = pump.start(5);
        assert!(pump.is_running());
        assert_eq!(next_tick(&rx), session);
        assert!(pump.accepts(session));
    }

    #[test]
    fn test_restart_replaces_ticker() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut pump = Pump::new(tx);
        let first = pump.start(5);
        next_tick(&rx);
        let second = pump.start(5);
        assert_ne!(first, second);
        assert!(!pump.accepts(first));
        assert!(pump.accepts(second));

        // Old ticks may still be queued, but new ones come only from `second`.
        while next_tick(&rx) == first {}
        for _ in 0..3 {
            assert_eq!(next_tick(&rx), second);
        }
    }

    #[test]
    fn test_stop_ends_ticks() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut pump = Pump::new(tx);
        let session = pump.start(5);
        next_tick(&rx);
        pump.stop();
        assert!(!pump.is_running());
        assert!(!pump.accepts(session));

        while rx.try_recv().is_ok() {}
        thread::sleep(Duration::from_millis(30));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_drop_cancels_ticker() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut pump = Pump::new(tx);
        pump.start(5);
        next_tick(&rx);
        drop(pump);

        // Both senders are gone once the ticker thread has been joined.
        loop {
            match rx.recv_timeout(Duration::from_secs(2)) {
                Ok(_) => continue,
                Err(e) => {
                    assert_eq!(e, RecvTimeoutError::Disconnected);
                    break;
                }
            }
        }
    }
}
