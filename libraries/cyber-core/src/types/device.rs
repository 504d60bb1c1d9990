use crate::error::DeviceError;

/// Notification emitted by a playback device
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// Playback position advanced
    TimeUpdate(f64),
    /// A finite duration became known for the loaded source
    DurationAvailable(f64),
    /// The loaded source played to its end
    Ended,
    /// Loading or playback failed
    Error(DeviceError),
}

/// A device event stamped with the load it belongs to
///
/// Devices bump their generation on every `load` and `unload`, so events
/// still queued from a replaced source can be told apart from current ones.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEvent {
    pub generation: u64,
    pub event: DeviceEvent,
}

/// Run state of the audio processing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Running,
    Suspended,
    Closed,
}
