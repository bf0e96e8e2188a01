use crate::timing::elapsed::ElapsedTime;

/// Paces frames to a target frame duration.
///
/// Instead of blocking, [`synchronize`](Self::synchronize) reports how long the host should wait
/// before presenting the next frame.
#[derive(Debug)]
pub struct FrameSynchronization {
    frame_duration: f64,
    timer: ElapsedTime,
    next_frame_target: f64,
    last_sync: f64,
    active: bool,
}

impl FrameSynchronization {
    pub fn new(frame_duration: f64, timer: ElapsedTime) -> Self {
        let mut sync = Self {
            frame_duration,
            timer,
            next_frame_target: 0.0,
            last_sync: f64::NEG_INFINITY,
            active: false,
        };
        sync.mark_current_frame();
        sync
    }

    pub fn frame_duration(&self) -> f64 {
        self.frame_duration
    }

    pub fn mark_current_frame(&mut self) {
        self.next_frame_target = self.timer.elapsed() + self.frame_duration;
    }

    /// Remaining wait until the current frame target, then advance the target by one frame.
    ///
    /// Repeated calls at the same instant belong to one frame and leave the target alone.
    pub fn synchronize(&mut self) -> f64 {
        let now = self.timer.elapsed();
        if self.active && now <= self.last_sync {
            return 0.0;
        }
        self.last_sync = now;
        if !self.active {
            self.next_frame_target = now + self.frame_duration;
            return 0.0;
        }
        let wait = (self.next_frame_target - now).max(0.0);
        self.next_frame_target = now.max(self.next_frame_target) + self.frame_duration;
        wait
    }

    /// Time left until the frame after the last synchronized one is due.
    pub fn time_to_next_frame(&self) -> f64 {
        (self.next_frame_target - self.timer.elapsed()).max(0.0)
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/frame_sync.rs"]
mod tests;
