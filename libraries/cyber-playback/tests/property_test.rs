//! Property-based tests for navigation, removal, and equalizer invariants

use cyber_audio::SignalChain;
use cyber_core::{DeviceEvent, Track, EQ_BAND_COUNT, EQ_MAX_GAIN_DB, EQ_MIN_GAIN_DB};
use cyber_playback::{Coordinator, Direction, EqualizerState, PlayMode, Playlist};
use cyber_storage::MemoryStore;
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

fn coordinator_with(len: usize, seed: u64) -> Coordinator {
    let tracks = (0..len)
        .map(|i| Track::catalog(format!("t{i}"), format!("Track {i}"), "Artist", format!("t{i}.mp3"), 60.0))
        .collect();
    let mut coordinator = Coordinator::with_seed(seed);
    coordinator.replace_playlist(Playlist::new(tracks, vec![]));
    coordinator
}

fn at_index(len: usize, index: usize, mode: PlayMode) -> Coordinator {
    let mut coordinator = coordinator_with(len, 5);
    coordinator.select_index(index);
    coordinator.set_mode(mode);
    coordinator
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

// ===== Navigation =====

proptest! {
    #[test]
    fn sequence_forward_wraps((len, i) in (1usize..40).prop_flat_map(|len| (Just(len), 0..len))) {
        let mut coordinator = at_index(len, i, PlayMode::Sequence);
        coordinator.advance(Direction::Forward, false);
        prop_assert_eq!(coordinator.transport().current_index, (i + 1) % len);
    }

    #[test]
    fn sequence_backward_wraps((len, i) in (1usize..40).prop_flat_map(|len| (Just(len), 0..len))) {
        let mut coordinator = at_index(len, i, PlayMode::Sequence);
        coordinator.advance(Direction::Backward, false);
        prop_assert_eq!(coordinator.transport().current_index, (i + len - 1) % len);
    }

    #[test]
    fn repeat_one_end_restarts_same_index(
        (len, i) in (1usize..40).prop_flat_map(|len| (Just(len), 0..len))
    ) {
        let mut coordinator = at_index(len, i, PlayMode::RepeatOne);
        coordinator.handle_device_event(DeviceEvent::TimeUpdate(30.0));
        coordinator.handle_device_event(DeviceEvent::Ended);

        prop_assert_eq!(coordinator.transport().current_index, i);
        prop_assert_eq!(coordinator.transport().current_time_seconds, 0.0);
    }

    #[test]
    fn repeat_one_manual_skip_steps(
        (len, i) in (1usize..40).prop_flat_map(|len| (Just(len), 0..len))
    ) {
        let mut coordinator = at_index(len, i, PlayMode::RepeatOne);
        coordinator.advance(Direction::Forward, false);
        prop_assert_eq!(coordinator.transport().current_index, (i + 1) % len);
    }

    #[test]
    fn shuffle_stays_in_range(len in 1usize..40, seed in any::<u64>(), steps in 1usize..20) {
        let mut coordinator = coordinator_with(len, seed);
        coordinator.set_mode(PlayMode::Shuffle);
        for _ in 0..steps {
            coordinator.advance(Direction::Forward, false);
            prop_assert!(coordinator.transport().current_index < len);
        }
    }

    #[test]
    fn shuffle_reaches_every_index(len in 1usize..8, seed in any::<u64>()) {
        let mut coordinator = coordinator_with(len, seed);
        coordinator.set_mode(PlayMode::Shuffle);

        let mut seen = HashSet::new();
        for _ in 0..500 {
            coordinator.advance(Direction::Forward, false);
            seen.insert(coordinator.transport().current_index);
        }
        prop_assert_eq!(seen.len(), len);
    }
}

// ===== Removal =====

proptest! {
    #[test]
    fn removing_below_current_keeps_track(
        (len, current, removed) in (2usize..30)
            .prop_flat_map(|len| (Just(len), 1..len))
            .prop_flat_map(|(len, current)| (Just(len), Just(current), 0..current))
    ) {
        let mut coordinator = at_index(len, current, PlayMode::Sequence);
        let selected = coordinator.current_track().map(|t| t.id.clone());

        coordinator.remove_at(removed);

        prop_assert_eq!(coordinator.transport().current_index, current - 1);
        prop_assert_eq!(coordinator.current_track().map(|t| t.id.clone()), selected);
    }

    #[test]
    fn removing_every_track_stops_playback(len in 1usize..10) {
        let mut coordinator = at_index(len, 0, PlayMode::Sequence);
        for _ in 0..len {
            coordinator.remove_at(0);
        }

        prop_assert!(coordinator.playlist().is_empty());
        prop_assert!(!coordinator.transport().is_playing);
        prop_assert_eq!(coordinator.transport().loaded_track_id.clone(), None);
    }
}

// ===== Equalizer =====

proptest! {
    #[test]
    fn set_gain_round_trips_clamped(band in 0usize..EQ_BAND_COUNT, value in -40.0f32..40.0) {
        block_on(async {
            let chain = SignalChain::new();
            let mut eq = EqualizerState::new(Default::default(), Arc::new(MemoryStore::new()));
            eq.apply_preset(&chain, [1.5; EQ_BAND_COUNT]).await.unwrap();

            eq.set_gain(&chain, band, value).await.unwrap();

            let gains = eq.gains();
            prop_assert_eq!(gains[band], value.clamp(EQ_MIN_GAIN_DB, EQ_MAX_GAIN_DB));
            for (i, gain) in gains.iter().enumerate() {
                if i != band {
                    prop_assert_eq!(*gain, 1.5);
                }
            }
            Ok(())
        })?;
    }

    #[test]
    fn toggling_enabled_never_touches_stored_gains(
        gains in prop::array::uniform10(-12.0f32..12.0),
        toggles in prop::collection::vec(any::<bool>(), 1..8)
    ) {
        block_on(async {
            let chain = SignalChain::new();
            let mut eq = EqualizerState::new(Default::default(), Arc::new(MemoryStore::new()));
            eq.apply_preset(&chain, gains).await.unwrap();

            for enabled in toggles {
                eq.set_enabled(&chain, enabled).await.unwrap();
                prop_assert_eq!(eq.gains(), gains);

                let expected = if enabled { gains } else { [0.0; EQ_BAND_COUNT] };
                prop_assert_eq!(eq.effective_gains(), expected);
                prop_assert_eq!(chain.band_target_gains(), expected);
            }
            Ok(())
        })?;
    }
}
