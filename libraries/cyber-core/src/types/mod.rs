mod device;
mod equalizer;
mod ids;
mod storage;
mod track;

pub use device::{ContextState, DeviceEvent, SourceEvent};
pub use equalizer::{
    EqualizerSettings, EQ_BAND_COUNT, EQ_FREQUENCIES, EQ_MAX_GAIN_DB, EQ_MIN_GAIN_DB, EQ_Q,
};
pub use ids::TrackId;
pub use storage::{NewTrack, StorageTier, StoredTrack, MIB};
pub use track::{CatalogEntry, LocalBlob, SourceRef, Track, LOCAL_TRACK_ARTIST};
