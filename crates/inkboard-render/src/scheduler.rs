//! Continuous frame scheduling.
//!
//! While running, every tick rebuilds the scene from a fresh snapshot.
//! There is no dirty tracking: a stopped scheduler only rebuilds when a
//! resize forces it.

use crate::pipeline::ScenePipeline;
use crate::renderer::{RenderContext, Renderer};
use std::time::{Duration, Instant};

/// Default target frame rate.
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// Drives a [`ScenePipeline`] once per frame.
#[derive(Debug, Clone)]
pub struct RenderScheduler {
    running: bool,
    frame: u64,
    needs_redraw: bool,
    frame_interval: Duration,
    last_frame: Option<Instant>,
}

impl Default for RenderScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_RATE)
    }
}

impl RenderScheduler {
    /// A stopped scheduler targeting `frame_rate` frames per second.
    pub fn new(frame_rate: u32) -> Self {
        let frame_interval = Duration::from_secs(1) / frame_rate.max(1);
        Self {
            running: false,
            frame: 0,
            needs_redraw: false,
            frame_interval,
            last_frame: None,
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            log::debug!("Render loop started");
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            log::debug!("Render loop stopped after {} frames", self.frame);
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of scenes built so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Request a rebuild on the next tick, even when stopped.
    pub fn resize(&mut self) {
        self.needs_redraw = true;
    }

    /// Whether enough time has passed since the last frame.
    pub fn frame_due(&self, now: Instant) -> bool {
        match self.last_frame {
            Some(last) => now.saturating_duration_since(last) >= self.frame_interval,
            None => true,
        }
    }

    /// Build a frame if the loop is running or a resize is pending.
    ///
    /// Returns true when a scene was built.
    pub fn tick(&mut self, pipeline: &mut ScenePipeline, ctx: &RenderContext) -> bool {
        if !self.running && !self.needs_redraw {
            return false;
        }
        pipeline.build_scene(ctx);
        self.needs_redraw = false;
        self.frame += 1;
        self.last_frame = Some(Instant::now());
        true
    }
}
