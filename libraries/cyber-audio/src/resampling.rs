//! Load-time sample rate conversion
//!
//! Sources are decoded in full, so a single pass over the whole buffer is
//! enough. Uses Rubato's fast polynomial resampler.

use crate::error::{AudioError, Result};
use rubato::{FastFixedIn, PolynomialDegree, Resampler};

const CHUNK_FRAMES: usize = 1024;

/// Resample interleaved audio from `input_rate` to `output_rate`
pub fn resample_interleaved(
    input: &[f32],
    channels: usize,
    input_rate: u32,
    output_rate: u32,
) -> Result<Vec<f32>> {
    if channels == 0 {
        return Err(AudioError::Resampling("channel count is zero".to_string()));
    }
    if input_rate == output_rate || input.is_empty() {
        return Ok(input.to_vec());
    }
    if input_rate == 0 || output_rate == 0 {
        return Err(AudioError::Resampling(format!(
            "invalid rates {input_rate} -> {output_rate}"
        )));
    }

    let ratio = f64::from(output_rate) / f64::from(input_rate);
    let mut resampler = FastFixedIn::<f32>::new(
        ratio,
        2.0,
        PolynomialDegree::Linear,
        CHUNK_FRAMES,
        channels,
    )
    .map_err(|e| AudioError::Resampling(format!("FastFixedIn creation failed: {e}")))?;

    let planar = deinterleave(input, channels);
    let total_frames = planar[0].len();
    let mut output: Vec<Vec<f32>> = vec![Vec::new(); channels];
    let mut pos = 0;

    loop {
        let needed = resampler.input_frames_next();
        if pos + needed > total_frames {
            break;
        }
        let chunk: Vec<&[f32]> = planar.iter().map(|ch| &ch[pos..pos + needed]).collect();
        let out = resampler
            .process(&chunk, None)
            .map_err(|e| AudioError::Resampling(format!("resampling failed: {e}")))?;
        append(&mut output, out);
        pos += needed;
    }

    if pos < total_frames {
        let tail: Vec<&[f32]> = planar.iter().map(|ch| &ch[pos..]).collect();
        let out = resampler
            .process_partial(Some(tail.as_slice()), None)
            .map_err(|e| AudioError::Resampling(format!("resampling flush failed: {e}")))?;
        append(&mut output, out);
    }

    Ok(interleave(&output))
}

fn deinterleave(input: &[f32], channels: usize) -> Vec<Vec<f32>> {
    let frames = input.len() / channels;
    let mut planar = vec![Vec::with_capacity(frames); channels];
    for frame in input.chunks_exact(channels) {
        for (ch, sample) in planar.iter_mut().zip(frame) {
            ch.push(*sample);
        }
    }
    planar
}

fn append(output: &mut [Vec<f32>], chunk: Vec<Vec<f32>>) {
    for (dst, src) in output.iter_mut().zip(chunk) {
        dst.extend(src);
    }
}

fn interleave(planar: &[Vec<f32>]) -> Vec<f32> {
    let frames = planar.iter().map(Vec::len).min().unwrap_or(0);
    let mut out = Vec::with_capacity(frames * planar.len());
    for i in 0..frames {
        for ch in planar {
            out.push(ch[i]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_rate_is_passthrough() {
        let input = vec![0.1, 0.2, 0.3, 0.4];
        let out = resample_interleaved(&input, 2, 44100, 44100).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn resampling_scales_frame_count() {
        let frames = 48000;
        let input = vec![0.0; frames * 2];
        let out = resample_interleaved(&input, 2, 48000, 44100).unwrap();
        let out_frames = out.len() / 2;
        // Allow for resampler delay
        assert!((out_frames as i64 - 44100).abs() < 2048, "got {out_frames}");
    }

    #[test]
    fn zero_channels_is_an_error() {
        assert!(resample_interleaved(&[0.0], 0, 44100, 48000).is_err());
    }
}
