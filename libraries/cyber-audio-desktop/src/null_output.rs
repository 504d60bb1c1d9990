//! Clock-driven output without sound hardware
//!
//! Renders the device at real-time pace on a Tokio task and discards the
//! samples. Starts suspended, like a browser audio context before the first
//! user gesture.

use crate::device::DeviceRenderer;
use crate::error::OutputError;
use cyber_core::{AudioContext, ContextError, ContextState};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Render period of the clock
const TICK: Duration = Duration::from_millis(10);

pub struct NullOutput {
    renderer: DeviceRenderer,
    state: ContextState,
    clock: Option<JoinHandle<()>>,
}

impl NullOutput {
    /// Create an output; with `start_suspended` nothing renders until `resume`
    pub fn new(renderer: DeviceRenderer, start_suspended: bool) -> Result<Self, OutputError> {
        let mut output = Self {
            renderer,
            state: ContextState::Suspended,
            clock: None,
        };
        if !start_suspended {
            output.start_clock()?;
        }
        Ok(output)
    }

    fn start_clock(&mut self) -> Result<(), OutputError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| OutputError::NoRuntime)?;
        let renderer = self.renderer.clone();
        let frames_per_tick =
            (u64::from(renderer.sample_rate()) * TICK.as_millis() as u64 / 1000) as usize;

        self.clock = Some(runtime.spawn(async move {
            let mut interval = tokio::time::interval(TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
            let mut buffer = vec![0.0_f32; frames_per_tick.max(1) * 2];
            loop {
                interval.tick().await;
                renderer.render(&mut buffer);
            }
        }));
        self.state = ContextState::Running;
        debug!("Null output clock started");
        Ok(())
    }

    fn stop_clock(&mut self) {
        if let Some(clock) = self.clock.take() {
            clock.abort();
        }
    }
}

impl AudioContext for NullOutput {
    fn state(&self) -> ContextState {
        self.state
    }

    fn resume(&mut self) -> Result<(), ContextError> {
        match self.state {
            ContextState::Running => Ok(()),
            ContextState::Closed => Err(ContextError::Closed),
            ContextState::Suspended => self.start_clock().map_err(ContextError::from),
        }
    }

    fn close(&mut self) {
        self.stop_clock();
        self.state = ContextState::Closed;
        debug!("Null output closed");
    }
}

impl Drop for NullOutput {
    fn drop(&mut self) {
        self.stop_clock();
    }
}
