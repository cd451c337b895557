use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use eframe::egui::Context;

#[derive(Clone, Debug, Default)]
pub(super) struct FrameToken(Arc<AtomicBool>);

impl FrameToken {
    pub(super) fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub(super) fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub(super) trait FrameScheduler {
    fn schedule_frame(&mut self) -> FrameToken;
}

pub(super) struct EguiFrames<'a>(pub(super) &'a Context);

impl FrameScheduler for EguiFrames<'_> {
    fn schedule_frame(&mut self) -> FrameToken {
        self.0.request_repaint();
        FrameToken::default()
    }
}

/// Animation loop: at most one step per scheduled frame, rescheduled for as
/// long as the step asks for more.
#[derive(Debug, Default)]
pub(super) struct FrameLoop {
    pending: Option<FrameToken>,
    frames_run: u64,
}

impl FrameLoop {
    pub(super) fn start<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if self.pending.is_none() {
            self.pending = Some(scheduler.schedule_frame());
        }
    }

    pub(super) fn run_frame<S, F>(&mut self, scheduler: &mut S, step: F) -> bool
    where
        S: FrameScheduler + ?Sized,
        F: FnOnce() -> bool,
    {
        let Some(token) = self.pending.take() else {
            return false;
        };
        if token.is_cancelled() {
            return false;
        }

        self.frames_run += 1;
        if step() {
            self.pending = Some(scheduler.schedule_frame());
        }
        true
    }

    pub(super) fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }

    pub(super) fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub(super) fn frames_run(&self) -> u64 {
        self.frames_run
    }
}
