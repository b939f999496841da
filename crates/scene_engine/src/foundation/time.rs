//! Time management utilities

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Frame clock with a global frame counter and smoothed frame time
///
/// Frame-start events are kept for `smoothing_period`; the reported frame time
/// is the average delta between consecutive events inside that window. The
/// two most recent events always stay in the window, so a zero period yields
/// the raw last delta.
#[derive(Debug)]
pub struct FrameTimer {
    origin: Instant,
    smoothing_period: Duration,
    event_times: VecDeque<Duration>,
    delta_time: f32,
    smoothed_time: f32,
    frame_count: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl FrameTimer {
    /// Create a new timer with the given smoothing window
    pub fn new(smoothing_period: Duration) -> Self {
        Self {
            origin: Instant::now(),
            smoothing_period,
            event_times: VecDeque::new(),
            delta_time: 0.0,
            smoothed_time: 0.0,
            frame_count: 0,
        }
    }

    /// Change the smoothing window
    pub fn set_smoothing_period(&mut self, period: Duration) {
        self.smoothing_period = period;
    }

    /// Record a frame start now and return the smoothed frame time in seconds
    pub fn frame_started(&mut self) -> f32 {
        let now = self.origin.elapsed();
        self.frame_started_at(now)
    }

    /// Record a frame start at an explicit time since the timer origin
    pub fn frame_started_at(&mut self, now: Duration) -> f32 {
        if let Some(&last) = self.event_times.back() {
            self.delta_time = now.saturating_sub(last).as_secs_f32();
        }
        self.event_times.push_back(now);
        self.frame_count += 1;

        let cutoff = now.saturating_sub(self.smoothing_period);
        while self.event_times.len() > 2 {
            match self.event_times.front() {
                Some(&oldest) if oldest < cutoff => {
                    self.event_times.pop_front();
                }
                _ => break,
            }
        }

        self.smoothed_time = match (self.event_times.front(), self.event_times.back()) {
            (Some(&oldest), Some(&newest)) if self.event_times.len() > 1 => {
                (newest - oldest).as_secs_f32() / (self.event_times.len() - 1) as f32
            }
            _ => 0.0,
        };

        self.smoothed_time
    }

    /// Raw time between the last two frame starts in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Smoothed frame time in seconds
    pub fn smoothed_time(&self) -> f32 {
        self.smoothed_time
    }

    /// Number of frames started so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second derived from the smoothed frame time
    pub fn smoothed_fps(&self) -> f32 {
        if self.smoothed_time > 0.0 {
            1.0 / self.smoothed_time
        } else {
            0.0
        }
    }
}

/// Simple stopwatch for measuring elapsed time
#[derive(Debug)]
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time {
            self.elapsed += start.elapsed();
            self.start_time = None;
        }
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        let current_elapsed = self.start_time.map_or(Duration::ZERO, |start| start.elapsed());
        self.elapsed + current_elapsed
    }

    /// Get the elapsed time in milliseconds
    pub fn elapsed_millis(&self) -> f32 {
        self.elapsed().as_secs_f32() * 1000.0
    }

    /// Check if the stopwatch is currently running
    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }
}
