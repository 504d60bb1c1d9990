//! Text rendering of the analyser buffers

use cyber_audio::{AnalyserHandle, BIN_COUNT};
use serde::{Deserialize, Serialize};
use std::fmt;

const LEVELS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// What the visualizer line shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizerStyle {
    #[default]
    Spectrum,
    Waveform,
}

impl VisualizerStyle {
    pub fn next(self) -> Self {
        match self {
            Self::Spectrum => Self::Waveform,
            Self::Waveform => Self::Spectrum,
        }
    }

    /// Render the current analyser buffers as one framed line
    pub fn render(self, analyser: &AnalyserHandle, width: usize) -> String {
        let body = match self {
            Self::Spectrum => spectrum(&analyser.frequency_bytes(), width),
            Self::Waveform => waveform(&analyser.time_domain_bytes(), width),
        };
        format!("|{body}|")
    }
}

impl fmt::Display for VisualizerStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spectrum => write!(f, "spectrum"),
            Self::Waveform => write!(f, "waveform"),
        }
    }
}

/// One-line spectrum, bins averaged down to `width` columns
pub fn spectrum(bins: &[u8; BIN_COUNT], width: usize) -> String {
    let width = width.clamp(1, BIN_COUNT);
    let per_column = BIN_COUNT / width;

    bins.chunks(per_column)
        .take(width)
        .map(|chunk| {
            let sum: u32 = chunk.iter().map(|&b| u32::from(b)).sum();
            let average = sum / chunk.len() as u32;
            LEVELS[(average as usize * (LEVELS.len() - 1)) / 255]
        })
        .collect()
}

/// One-line waveform; 128 is the zero line
pub fn waveform(samples: &[u8; BIN_COUNT], width: usize) -> String {
    const WAVE: [char; 5] = ['_', '.', '-', '\'', '"'];

    let width = width.clamp(1, BIN_COUNT);
    let step = BIN_COUNT / width;
    samples
        .iter()
        .step_by(step)
        .take(width)
        .map(|&s| WAVE[(s as usize * (WAVE.len() - 1)) / 255])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_is_blank() {
        let line = spectrum(&[0; BIN_COUNT], 32);
        assert_eq!(line.chars().count(), 32);
        assert!(line.chars().all(|c| c == ' '));
    }

    #[test]
    fn full_scale_is_full_blocks() {
        let line = spectrum(&[255; BIN_COUNT], 16);
        assert_eq!(line, "█".repeat(16));
    }

    #[test]
    fn style_cycles_between_both_views() {
        let style = VisualizerStyle::default();
        assert_eq!(style, VisualizerStyle::Spectrum);
        assert_eq!(style.next(), VisualizerStyle::Waveform);
        assert_eq!(style.next().next(), style);
        assert_eq!(style.next().to_string(), "waveform");
    }

    #[test]
    fn flat_waveform_sits_mid() {
        let line = waveform(&[128; BIN_COUNT], 8);
        assert_eq!(line, "--------");
    }
}
