//! Audio files: decoding to mono samples and a clocked player
//!
//! Decoding uses symphonia and always works. Sound reaches the speakers only
//! when the `audio` feature brings in the cpal device output; otherwise the
//! player keeps time against a silent output.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

pub mod player;

#[cfg(feature = "audio")]
pub mod device;

pub use player::{build_output, AudioOutput, AudioPlayer, SilentOutput};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    #[error("cannot decode audio: {0}")]
    Decode(String),

    #[error("no playable audio track")]
    NoTrack,

    #[error("audio output failed: {0}")]
    Output(String),

    #[error("no audio loaded")]
    NothingLoaded,
}

impl From<SymphoniaError> for AudioError {
    fn from(err: SymphoniaError) -> Self {
        AudioError::Decode(err.to_string())
    }
}

/// Decoded audio, mixed down to one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            sample_rate,
        }
    }

    pub fn samples(&self) -> &Arc<[f32]> {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }

    /// Sample index at `position`, clamped to the end of the clip.
    pub fn sample_at(&self, position: Duration) -> usize {
        let index = (position.as_secs_f64() * self.sample_rate as f64) as usize;
        index.min(self.samples.len())
    }
}

/// Decode a whole file held in memory. `extension` is a hint for picking the
/// container format.
pub fn decode(bytes: Vec<u8>, extension: Option<&str>) -> Result<AudioClip, AudioError> {
    let source = Cursor::new(bytes);
    let mss = MediaSourceStream::new(Box::new(source), Default::default());
    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let detected = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = detected.format;

    let (track_id, params) = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .map(|t| (t.id, t.codec_params.clone()))
        .ok_or(AudioError::NoTrack)?;
    let sample_rate = params.sample_rate.ok_or(AudioError::NoTrack)?;
    let mut decoder =
        symphonia::default::get_codecs().make(&params, &DecoderOptions::default())?;

    let mut samples = Vec::new();
    while let Ok(packet) = format.next_packet() {
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(err)) => {
                debug!("skipping undecodable packet: {}", err);
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);
        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        samples.extend(
            buffer
                .samples()
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32),
        );
    }

    if samples.is_empty() {
        return Err(AudioError::Decode("no samples in file".to_string()));
    }
    debug!("decoded {} samples at {} Hz", samples.len(), sample_rate);
    Ok(AudioClip::new(samples, sample_rate))
}

/// `m:ss` for status lines.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A 16-bit PCM WAV file with the given samples.
    pub(crate) fn wav_bytes(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&channels.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * channels as u32 * 2).to_le_bytes());
        bytes.extend_from_slice(&(channels * 2).to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        for sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_decode_wav() {
        let clip = decode(wav_bytes(8000, 1, &[0; 800]), Some("wav")).unwrap();
        assert_eq!(clip.sample_rate(), 8000);
        assert_eq!(clip.samples().len(), 800);
        assert_eq!(clip.duration().as_millis(), 100);
    }

    #[test]
    fn test_decode_mixes_stereo_to_mono() {
        let frames: Vec<i16> = [i16::MAX, 0].repeat(400);
        let clip = decode(wav_bytes(8000, 2, &frames), Some("wav")).unwrap();
        assert_eq!(clip.samples().len(), 400);
        assert!((clip.samples()[0] - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode(b"definitely not audio".to_vec(), Some("mp3")),
            Err(AudioError::Decode(_))
        ));
    }

    #[test]
    fn test_sample_at_clamps() {
        let clip = AudioClip::new(vec![0.0; 100], 100);
        assert_eq!(clip.sample_at(Duration::from_millis(500)), 50);
        assert_eq!(clip.sample_at(Duration::from_secs(9)), 100);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(184)), "3:04");
        assert_eq!(format_duration(Duration::ZERO), "0:00");
    }
}
