//! Typed command parsing
//!
//! One line of input is one command. Key tokens (`space`, `left`, `right`)
//! map to the keyboard bindings; everything else is a named command.

use cyber_audio::EqPreset;
use cyber_playback::Key;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Key(Key),
    Play,
    Pause,
    Next,
    Prev,
    Mode,
    /// 1-based playlist position
    Select(usize),
    Seek(f64),
    EqSet { band: usize, gain: f32 },
    EqEnable(bool),
    EqPreset(EqPreset),
    Import(PathBuf),
    Delete,
    Tier,
    Visualizer,
    /// Switch between spectrum and waveform
    VisualizerStyle,
    Volume(u8),
    Mute,
    Theme,
    List,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

pub const HELP: &str = "\
commands:
  space | play | pause      toggle / start / stop playback
  next | prev               skip tracks
  left | right              seek -5s / +5s
  select <n>                play track n
  seek <seconds>            jump to position
  mode                      cycle sequence / shuffle / repeat one
  list | status             show playlist / player state
  eq <band> <dB>            set band 1-10 (-12..12)
  eq on | eq off            enable / bypass equalizer
  eq preset <name>          FLAT, CYBER, BASS++, VOCAL
  import <path>             add a local file
  delete                    remove the current track
  tier                      toggle 256MB / 1GB storage
  vis                       toggle visualizer
  vis style                 switch spectrum / waveform
  volume <0-100> | mute     master volume
  theme                     next theme
  quit";

/// Parse one line; `Ok(None)` for blank input
pub fn parse(line: &str) -> Result<Option<Input>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if let Some(key) = Key::from_token(line) {
        return Ok(Some(Input::Key(key)));
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let input = match command.to_ascii_lowercase().as_str() {
        "play" => Input::Play,
        "pause" | "stop" => Input::Pause,
        "toggle" => Input::Key(Key::Space),
        "next" | "n" => Input::Next,
        "prev" | "previous" | "p" => Input::Prev,
        "mode" => Input::Mode,
        "select" | "s" => {
            let n = rest
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ParseError::Usage("select <n>"))?;
            Input::Select(n)
        }
        "seek" => Input::Seek(
            rest.parse::<f64>()
                .ok()
                .filter(|s| s.is_finite())
                .ok_or(ParseError::Usage("seek <seconds>"))?,
        ),
        "eq" => parse_eq(rest)?,
        "import" | "add" => {
            if rest.is_empty() {
                return Err(ParseError::Usage("import <path>"));
            }
            Input::Import(PathBuf::from(rest))
        }
        "delete" | "rm" => Input::Delete,
        "tier" => Input::Tier,
        "vis" | "visualizer" => match rest.to_ascii_lowercase().as_str() {
            "" => Input::Visualizer,
            "style" => Input::VisualizerStyle,
            _ => return Err(ParseError::Usage("vis | vis style")),
        },
        "volume" | "vol" => Input::Volume(
            rest.parse::<u8>()
                .ok()
                .filter(|v| *v <= 100)
                .ok_or(ParseError::Usage("volume <0-100>"))?,
        ),
        "mute" => Input::Mute,
        "theme" => Input::Theme,
        "list" | "ls" => Input::List,
        "status" => Input::Status,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(input))
}

fn parse_eq(rest: &str) -> Result<Input, ParseError> {
    const USAGE: &str = "eq <band 1-10> <dB> | eq on | eq off | eq preset <name>";

    let mut parts = rest.split_whitespace();
    match parts.next().map(str::to_ascii_lowercase).as_deref() {
        Some("on") => Ok(Input::EqEnable(true)),
        Some("off") => Ok(Input::EqEnable(false)),
        Some("preset") => {
            let name = parts.collect::<Vec<_>>().join(" ");
            EqPreset::from_name(&name)
                .map(Input::EqPreset)
                .ok_or(ParseError::Usage("eq preset FLAT|CYBER|BASS++|VOCAL"))
        }
        Some(band) => {
            let band = band
                .parse::<usize>()
                .ok()
                .filter(|b| *b >= 1)
                .ok_or(ParseError::Usage(USAGE))?;
            let gain = parts
                .next()
                .and_then(|g| g.parse::<f32>().ok())
                .ok_or(ParseError::Usage(USAGE))?;
            Ok(Input::EqSet {
                band: band - 1,
                gain,
            })
        }
        None => Err(ParseError::Usage(USAGE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_tokens() {
        assert_eq!(parse("space").unwrap(), Some(Input::Key(Key::Space)));
        assert_eq!(parse(" LEFT ").unwrap(), Some(Input::Key(Key::ArrowLeft)));
        assert_eq!(parse("toggle").unwrap(), Some(Input::Key(Key::Space)));
    }

    #[test]
    fn blank_line_is_nothing() {
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn select_is_one_based() {
        assert_eq!(parse("select 3").unwrap(), Some(Input::Select(3)));
        assert_eq!(parse("select 0"), Err(ParseError::Usage("select <n>")));
        assert!(parse("select").is_err());
    }

    #[test]
    fn eq_commands() {
        assert_eq!(
            parse("eq 10 -3.5").unwrap(),
            Some(Input::EqSet {
                band: 9,
                gain: -3.5
            })
        );
        assert_eq!(parse("eq off").unwrap(), Some(Input::EqEnable(false)));
        assert_eq!(
            parse("eq preset bass++").unwrap(),
            Some(Input::EqPreset(EqPreset::BassBoost))
        );
        assert!(parse("eq preset loud").is_err());
        assert!(parse("eq 0 3").is_err());
    }

    #[test]
    fn import_keeps_spaces_in_path() {
        assert_eq!(
            parse("import /music/Night Drive.mp3").unwrap(),
            Some(Input::Import(PathBuf::from("/music/Night Drive.mp3")))
        );
    }

    #[test]
    fn visualizer_commands() {
        assert_eq!(parse("vis").unwrap(), Some(Input::Visualizer));
        assert_eq!(parse("vis Style").unwrap(), Some(Input::VisualizerStyle));
        assert_eq!(parse("vis bars"), Err(ParseError::Usage("vis | vis style")));
    }

    #[test]
    fn volume_range() {
        assert_eq!(parse("volume 40").unwrap(), Some(Input::Volume(40)));
        assert!(parse("volume 101").is_err());
    }

    #[test]
    fn unknown_command() {
        assert_eq!(
            parse("dance"),
            Err(ParseError::Unknown("dance".to_string()))
        );
    }
}
