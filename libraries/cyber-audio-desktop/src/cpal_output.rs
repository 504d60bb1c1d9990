//! CPAL-based audio output
//!
//! A dedicated thread owns the CPAL stream, since streams are not `Send` on
//! every platform. The context talks to it over a channel.

use crate::device::DeviceRenderer;
use crate::error::{OutputError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use cyber_core::{AudioContext, ContextError, ContextState};
use std::thread::{self, JoinHandle};
use tracing::{error, warn};

/// Commands sent to the audio thread
enum AudioCommand {
    Resume,
    Shutdown,
}

/// System audio output driving a [`DeviceRenderer`]
pub struct CpalOutput {
    command_tx: Sender<AudioCommand>,
    state: ContextState,
    sample_rate: u32,
    audio_thread: Option<JoinHandle<()>>,
}

impl CpalOutput {
    /// Open the default output device
    ///
    /// The device must run at the renderer's rate; callers usually create the
    /// playback device with [`CpalOutput::default_sample_rate`].
    pub fn new(renderer: DeviceRenderer, start_suspended: bool) -> Result<Self> {
        let device = default_device()?;
        let config: StreamConfig = device
            .default_output_config()
            .map_err(|e| OutputError::StreamBuild(e.to_string()))?
            .config();
        let sample_rate = config.sample_rate;
        if sample_rate != renderer.sample_rate() {
            warn!(
                device_rate = sample_rate,
                render_rate = renderer.sample_rate(),
                "Output rate differs from render rate; pitch will be off"
            );
        }

        let (command_tx, command_rx) = bounded::<AudioCommand>(32);
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);

        let audio_thread = thread::spawn(move || {
            audio_thread_run(device, config, renderer, command_rx, ready_tx, start_suspended);
        });

        ready_rx
            .recv()
            .map_err(|_| OutputError::StreamBuild("audio thread exited".to_string()))??;

        Ok(Self {
            command_tx,
            state: if start_suspended {
                ContextState::Suspended
            } else {
                ContextState::Running
            },
            sample_rate,
            audio_thread: Some(audio_thread),
        })
    }

    /// Native rate of the default output device
    pub fn default_sample_rate() -> Result<u32> {
        let device = default_device()?;
        let config = device
            .default_output_config()
            .map_err(|e| OutputError::StreamBuild(e.to_string()))?;
        Ok(config.sample_rate())
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn shutdown(&mut self) {
        let _ = self.command_tx.send(AudioCommand::Shutdown);
        if let Some(handle) = self.audio_thread.take() {
            let _ = handle.join();
        }
    }
}

impl AudioContext for CpalOutput {
    fn state(&self) -> ContextState {
        self.state
    }

    fn resume(&mut self) -> std::result::Result<(), ContextError> {
        match self.state {
            ContextState::Running => Ok(()),
            ContextState::Closed => Err(ContextError::Closed),
            ContextState::Suspended => {
                self.command_tx
                    .send(AudioCommand::Resume)
                    .map_err(|_| ContextError::from(OutputError::Closed))?;
                self.state = ContextState::Running;
                Ok(())
            }
        }
    }

    fn close(&mut self) {
        self.shutdown();
        self.state = ContextState::Closed;
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn default_device() -> Result<Device> {
    cpal::default_host()
        .default_output_device()
        .ok_or(OutputError::DeviceNotFound)
}

fn audio_thread_run(
    device: Device,
    config: StreamConfig,
    renderer: DeviceRenderer,
    command_rx: Receiver<AudioCommand>,
    ready_tx: Sender<Result<()>>,
    start_suspended: bool,
) {
    let channels = usize::from(config.channels);
    let mut stereo = Vec::new();

    let stream: Stream = match device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            if channels == 2 {
                renderer.render(data);
                return;
            }
            let frames = data.len() / channels.max(1);
            stereo.resize(frames * 2, 0.0);
            renderer.render(&mut stereo);
            for (out, frame) in data.chunks_exact_mut(channels).zip(stereo.chunks_exact(2)) {
                for (i, sample) in out.iter_mut().enumerate() {
                    *sample = if channels == 1 {
                        0.5 * (frame[0] + frame[1])
                    } else {
                        frame.get(i).copied().unwrap_or(0.0)
                    };
                }
            }
        },
        |err| error!("Audio stream error: {err}"),
        None,
    ) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready_tx.send(Err(OutputError::StreamBuild(e.to_string())));
            return;
        }
    };

    let started = if start_suspended {
        stream.pause()
    } else {
        stream.play()
    };
    if let Err(e) = started {
        let _ = ready_tx.send(Err(OutputError::StreamBuild(e.to_string())));
        return;
    }
    let _ = ready_tx.send(Ok(()));

    while let Ok(cmd) = command_rx.recv() {
        match cmd {
            AudioCommand::Resume => {
                if let Err(e) = stream.play() {
                    error!("Failed to resume stream: {e}");
                }
            }
            AudioCommand::Shutdown => break,
        }
    }
}
