/// Full-source decoding using Symphonia
use crate::error::{AudioError, Result};
use crate::resampling::resample_interleaved;
use cyber_core::SourceRef;
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Decoded interleaved stereo audio
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }

    /// Duration in seconds; `None` when the rate is unknown
    pub fn duration_seconds(&self) -> Option<f64> {
        (self.sample_rate > 0).then(|| self.frames() as f64 / f64::from(self.sample_rate))
    }
}

/// Decode `source` to stereo f32 at `output_rate`
///
/// Supports MP3, FLAC, OGG/Vorbis, WAV, AAC and anything else Symphonia's
/// default registry knows.
pub fn decode_source(source: &SourceRef, output_rate: u32) -> Result<DecodedAudio> {
    let media: Box<dyn MediaSource> = match source {
        SourceRef::File(path) => {
            let file = std::fs::File::open(path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AudioError::FileNotFound(path.display().to_string())
                } else {
                    AudioError::Io(e)
                }
            })?;
            Box::new(file)
        }
        SourceRef::Local(blob) => Box::new(Cursor::new(blob.shared())),
    };

    let mut hint = Hint::new();
    if let Some(ext) = source.format_hint() {
        hint.with_extension(&ext);
    }

    let decoded = decode_stream(MediaSourceStream::new(media, Default::default()), &hint)?;
    debug!(
        source = %source.describe(),
        frames = decoded.frames(),
        sample_rate = decoded.sample_rate,
        "Decoded source"
    );

    if decoded.sample_rate == output_rate {
        return Ok(decoded);
    }

    let samples = resample_interleaved(&decoded.samples, 2, decoded.sample_rate, output_rate)?;
    Ok(DecodedAudio {
        samples,
        sample_rate: output_rate,
    })
}

fn decode_stream(mss: MediaSourceStream, hint: &Hint) -> Result<DecodedAudio> {
    let probed = symphonia::default::get_probe()
        .format(
            hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::UnsupportedFormat(format!("Failed to probe source: {e}")))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| AudioError::UnsupportedFormat("No audio tracks found".to_string()))?;

    let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::UnsupportedFormat(format!("Failed to create decoder: {e}")))?;

    let mut samples = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => {
                return Err(AudioError::DecodeError(format!("Error reading packet: {e}")));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // A corrupt packet is skipped; the rest of the stream may be fine
            Err(SymphoniaError::DecodeError(e)) => {
                skipped_packets += 1;
                debug!("Skipping undecodable packet: {e}");
                continue;
            }
            Err(e) => return Err(AudioError::DecodeError(e.to_string())),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count();
        let buf = sample_buf.get_or_insert_with(|| {
            SampleBuffer::<f32>::new(decoded.capacity() as u64, spec)
        });
        if buf.capacity() < decoded.capacity() * channels {
            *buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        }
        buf.copy_interleaved_ref(decoded);
        downmix_to_stereo(buf.samples(), channels, &mut samples);
    }

    if samples.is_empty() && skipped_packets > 0 {
        return Err(AudioError::DecodeError(format!(
            "No decodable audio ({skipped_packets} packets rejected)"
        )));
    }
    if skipped_packets > 0 {
        warn!(skipped_packets, "Source decoded with corrupt packets");
    }

    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}

/// Append `interleaved` to `out` as stereo
///
/// Mono is duplicated. Extra channels beyond the front pair are folded in at
/// -3 dB.
fn downmix_to_stereo(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    const SIDE_MIX: f32 = 0.707;

    match channels {
        0 => {}
        1 => {
            for s in interleaved {
                out.push(*s);
                out.push(*s);
            }
        }
        2 => out.extend_from_slice(interleaved),
        _ => {
            for frame in interleaved.chunks_exact(channels) {
                let extra: f32 = frame[2..].iter().sum::<f32>() * SIDE_MIX;
                out.push((frame[0] + extra).clamp(-1.0, 1.0));
                out.push((frame[1] + extra).clamp(-1.0, 1.0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_is_duplicated() {
        let mut out = Vec::new();
        downmix_to_stereo(&[0.1, 0.2], 1, &mut out);
        assert_eq!(out, vec![0.1, 0.1, 0.2, 0.2]);
    }

    #[test]
    fn surround_folds_into_front_pair() {
        let mut out = Vec::new();
        downmix_to_stereo(&[0.1, 0.2, 0.0, 0.0, 0.0, 0.0], 6, &mut out);
        assert_eq!(out.len(), 2);
        assert!((out[0] - 0.1).abs() < 1e-6);
        assert!((out[1] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let source = SourceRef::File("/definitely/not/here.mp3".into());
        let err = decode_source(&source, 44100).unwrap_err();
        assert!(matches!(err, AudioError::FileNotFound(_)));
    }
}
