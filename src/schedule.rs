//! Frame-loop timers. All times are seconds on the caller's monotonic clock.

/// Coalesces redraw requests so at most one frame is outstanding.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameRequest {
    pending: bool,
}

impl FrameRequest {
    /// Returns `true` only for the request that actually schedules a frame.
    pub fn request(&mut self) -> bool {
        !std::mem::replace(&mut self.pending, true)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Called when the frame runs; returns whether one had been requested.
    pub fn begin_frame(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

/// Fires once, `delay` seconds after the most recent `schedule` call.
#[derive(Clone, Copy, Debug)]
pub struct Debounce {
    delay: f64,
    deadline: Option<f64>,
}

impl Debounce {
    pub fn new(delay: f64) -> Self {
        Self {
            delay: delay.max(0.0),
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: f64) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_scheduled(&self) -> bool {
        self.deadline.is_some()
    }

    /// Seconds until the pending deadline, for repaint scheduling.
    pub fn remaining(&self, now: f64) -> Option<f64> {
        self.deadline.map(|deadline| (deadline - now).max(0.0))
    }

    pub fn poll(&mut self, now: f64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Window during which the layout keeps ticking after a disturbance.
///
/// Starting a new burst supersedes the running one.
#[derive(Clone, Copy, Debug, Default)]
pub struct Relaxation {
    until: Option<f64>,
}

impl Relaxation {
    pub fn start(&mut self, now: f64, duration: f64) {
        self.until = Some(now + duration.max(0.0));
    }

    pub fn cancel(&mut self) {
        self.until = None;
    }

    /// Whether the simulation should tick this frame; clears itself once expired.
    pub fn is_active(&mut self, now: f64) -> bool {
        match self.until {
            Some(until) if now < until => true,
            Some(_) => {
                self.until = None;
                false
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_requests_coalesce() {
        let mut frame = FrameRequest::default();
        assert!(frame.request());
        assert!(!frame.request());
        assert!(frame.is_pending());
        assert!(frame.begin_frame());
        assert!(!frame.begin_frame());
        assert!(frame.request());
    }

    #[test]
    fn debounce_restarts_on_each_schedule() {
        let mut debounce = Debounce::new(0.2);
        debounce.schedule(0.0);
        debounce.schedule(0.15);
        assert!(!debounce.poll(0.3));
        assert!(debounce.poll(0.35));
        assert!(!debounce.poll(0.5), "fires only once");
    }

    #[test]
    fn debounce_cancel() {
        let mut debounce = Debounce::new(0.1);
        debounce.schedule(1.0);
        debounce.cancel();
        assert!(!debounce.poll(5.0));
        assert_eq!(debounce.remaining(5.0), None);
    }

    #[test]
    fn relaxation_is_superseded() {
        let mut relaxation = Relaxation::default();
        relaxation.start(0.0, 1.0);
        assert!(relaxation.is_active(0.5));
        relaxation.start(0.9, 1.0);
        assert!(relaxation.is_active(1.5));
        assert!(!relaxation.is_active(1.9));
        assert!(!relaxation.is_active(1.0));
    }
}
