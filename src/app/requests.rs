use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

/// One background request kind. Spawning replaces the pending receiver, so a
/// response from an older generation can never be observed.
pub(super) struct RequestSlot<T> {
    generation: u64,
    pending: Option<(u64, Receiver<Result<T, String>>)>,
}

impl<T> Default for RequestSlot<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            pending: None,
        }
    }
}

impl<T: Send + 'static> RequestSlot<T> {
    pub(super) fn spawn<F>(&mut self, label: &'static str, job: F)
    where
        F: FnOnce() -> Result<T, String> + Send + 'static,
    {
        self.generation += 1;
        let generation = self.generation;
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let _ = tx.send(job());
        });

        if let Some((stale, _)) = self.pending.replace((generation, rx)) {
            debug!(request = label, stale, generation, "superseded in-flight request");
        } else {
            debug!(request = label, generation, "spawned background request");
        }
    }

    pub(super) fn poll(&mut self) -> Option<Result<T, String>> {
        let (_, rx) = self.pending.as_ref()?;
        match rx.try_recv() {
            Ok(result) => {
                self.pending = None;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                Some(Err("Background worker disconnected".to_owned()))
            }
        }
    }

    pub(super) fn cancel(&mut self) {
        self.pending = None;
    }

    pub(super) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[derive(Debug)]
pub(super) struct Debounce {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Default for Debounce {
    fn default() -> Self {
        Self::new(Self::SEARCH_DELAY)
    }
}

impl Debounce {
    pub(super) const SEARCH_DELAY: Duration = Duration::from_millis(200);

    pub(super) fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub(super) fn schedule(&mut self, value: impl Into<String>, now: Instant) {
        self.pending = Some((value.into(), now + self.delay));
    }

    pub(super) fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    pub(super) fn time_left(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|(_, deadline)| deadline.saturating_duration_since(now))
    }

    pub(super) fn clear(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    fn wait_for<T: Send + 'static>(slot: &mut RequestSlot<T>) -> Result<T, String> {
        let started = Instant::now();
        loop {
            if let Some(result) = slot.poll() {
                return result;
            }
            assert!(started.elapsed() < Duration::from_secs(5), "request never finished");
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn delivers_the_response_once() {
        let mut slot = RequestSlot::default();
        slot.spawn("test", || Ok(7));
        assert!(slot.is_pending());
        assert_eq!(wait_for(&mut slot), Ok(7));
        assert!(!slot.is_pending());
        assert!(slot.poll().is_none());
    }

    #[test]
    fn newer_request_wins_over_slow_older_one() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let mut slot = RequestSlot::default();

        slot.spawn("test", move || {
            let _ = release_rx.recv();
            Ok("stale")
        });
        slot.spawn("test", || Ok("fresh"));
        assert_eq!(slot.generation, 2);

        assert_eq!(wait_for(&mut slot), Ok("fresh"));
        let _ = release_tx.send(());
        thread::sleep(Duration::from_millis(20));
        assert!(slot.poll().is_none());
    }

    #[test]
    fn cancelled_request_is_dropped() {
        let mut slot = RequestSlot::default();
        slot.spawn("test", || Ok(1));
        slot.cancel();
        thread::sleep(Duration::from_millis(20));
        assert!(slot.poll().is_none());
    }

    #[test]
    fn worker_errors_come_through() {
        let mut slot: RequestSlot<()> = RequestSlot::default();
        slot.spawn("test", || Err("store unavailable".to_owned()));
        assert_eq!(wait_for(&mut slot), Err("store unavailable".to_owned()));
    }

    #[test]
    fn debounce_fires_after_quiet_period() {
        let start = Instant::now();
        let mut debounce = Debounce::default();

        debounce.schedule("an", start);
        debounce.schedule("ann", start + Duration::from_millis(150));
        assert_eq!(debounce.poll(start + Duration::from_millis(300)), None);
        assert_eq!(
            debounce.time_left(start + Duration::from_millis(300)),
            Some(Duration::from_millis(50))
        );
        assert_eq!(
            debounce.poll(start + Duration::from_millis(350)),
            Some("ann".to_owned())
        );
        assert_eq!(debounce.poll(start + Duration::from_millis(400)), None);
    }

    #[test]
    fn cleared_debounce_never_fires() {
        let start = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(10));
        debounce.schedule("x", start);
        debounce.clear();
        assert_eq!(debounce.poll(start + Duration::from_secs(1)), None);
        assert_eq!(debounce.time_left(start), None);
    }
}
