//! Shared test fixtures: a scripted device and context

use async_trait::async_trait;
use cyber_core::{
    AttachError, AudioContext, ContextError, ContextState, NewTrack, PlaybackDevice,
    PlaybackRejected, SignalProcessor, SourceRef, StoreError, StoreResult, StoredTrack, Track,
    TrackId, TrackStore,
};
use cyber_playback::{AudioEngine, Coordinator, EqualizerState, Playlist};
use cyber_storage::MemoryStore;
use std::collections::VecDeque;
use std::sync::Arc;

/// One call the engine made on the device
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    Load(SourceRef),
    Play,
    Pause,
    Seek(f64),
    Unload,
}

/// Device that records calls and answers `play` from a script
#[derive(Default)]
pub struct MockDevice {
    pub calls: Vec<DeviceCall>,
    pub play_results: VecDeque<Result<(), PlaybackRejected>>,
    processor: Option<Arc<dyn SignalProcessor>>,
    loaded: Option<SourceRef>,
    time: f64,
    generation: u64,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse the next `play` call
    pub fn reject_next_play(&mut self, rejection: PlaybackRejected) {
        self.play_results.push_back(Err(rejection));
    }

    pub fn loaded(&self) -> Option<&SourceRef> {
        self.loaded.as_ref()
    }

    pub fn take_calls(&mut self) -> Vec<DeviceCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn has_processor(&self) -> bool {
        self.processor.is_some()
    }
}

impl PlaybackDevice for MockDevice {
    fn attach_processor(&mut self, processor: Arc<dyn SignalProcessor>) -> Result<(), AttachError> {
        if self.processor.is_some() {
            return Err(AttachError::AlreadyAttached);
        }
        self.processor = Some(processor);
        Ok(())
    }

    fn load(&mut self, source: &SourceRef) {
        self.calls.push(DeviceCall::Load(source.clone()));
        self.loaded = Some(source.clone());
        self.time = 0.0;
        self.generation += 1;
    }

    fn play(&mut self) -> Result<(), PlaybackRejected> {
        self.calls.push(DeviceCall::Play);
        self.play_results.pop_front().unwrap_or(Ok(()))
    }

    fn pause(&mut self) {
        self.calls.push(DeviceCall::Pause);
    }

    fn seek(&mut self, seconds: f64) {
        self.calls.push(DeviceCall::Seek(seconds));
        self.time = seconds;
    }

    fn unload(&mut self) {
        self.calls.push(DeviceCall::Unload);
        self.loaded = None;
        self.generation += 1;
    }

    fn current_time(&self) -> f64 {
        self.time
    }

    fn duration(&self) -> Option<f64> {
        None
    }

    fn source_generation(&self) -> u64 {
        self.generation
    }
}

/// Context that starts suspended and counts resumes
pub struct MockContext {
    pub state: ContextState,
    pub resumes: usize,
}

impl MockContext {
    pub fn suspended() -> Self {
        Self {
            state: ContextState::Suspended,
            resumes: 0,
        }
    }
}

impl AudioContext for MockContext {
    fn state(&self) -> ContextState {
        self.state
    }

    fn resume(&mut self) -> Result<(), ContextError> {
        if self.state == ContextState::Closed {
            return Err(ContextError::Closed);
        }
        self.resumes += 1;
        self.state = ContextState::Running;
        Ok(())
    }

    fn close(&mut self) {
        self.state = ContextState::Closed;
    }
}

pub type TestEngine = AudioEngine<MockDevice, MockContext>;

pub fn catalog_track(id: &str, seconds: f64) -> Track {
    Track::catalog(id, id.to_uppercase(), "Test Artist", format!("{id}.mp3"), seconds)
}

/// Engine over a memory store with `tracks` loaded and call log cleared
pub fn engine_with(tracks: Vec<Track>) -> (TestEngine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let equalizer = EqualizerState::new(Default::default(), store.clone());
    let mut engine = AudioEngine::new(
        MockDevice::new(),
        MockContext::suspended(),
        Coordinator::with_seed(11),
        equalizer,
    );
    engine.replace_playlist(Playlist::new(tracks, vec![]));
    engine.device_mut().take_calls();
    engine.drain_events();
    (engine, store)
}

/// Track store that pretends `baseline` bytes are already used
///
/// Lets quota tests run against the real tier limits without allocating
/// hundreds of megabytes.
pub struct PrefilledStore {
    pub baseline: u64,
    pub inner: MemoryStore,
}

impl PrefilledStore {
    pub fn new(baseline: u64) -> Self {
        Self {
            baseline,
            inner: MemoryStore::new(),
        }
    }
}

#[async_trait]
impl TrackStore for PrefilledStore {
    async fn put(&self, track: NewTrack, limit_bytes: u64) -> StoreResult<StoredTrack> {
        let available = limit_bytes.saturating_sub(self.baseline);
        self.inner
            .put(track, available)
            .await
            .map_err(|e| match e {
                StoreError::QuotaExceeded {
                    used, requested, ..
                } => StoreError::QuotaExceeded {
                    used: used + self.baseline,
                    requested,
                    limit: limit_bytes,
                },
                other => other,
            })
    }

    async fn list_all(&self) -> StoreResult<Vec<StoredTrack>> {
        self.inner.list_all().await
    }

    async fn remove(&self, id: &TrackId) -> StoreResult<()> {
        self.inner.remove(id).await
    }

    async fn total_used_bytes(&self) -> StoreResult<u64> {
        Ok(self.baseline + self.inner.total_used_bytes().await?)
    }
}
