use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{debug, error};

use super::player::AudioOutput;
use super::{AudioClip, AudioError};

fn output_error(err: impl std::fmt::Display) -> AudioError {
    AudioError::Output(err.to_string())
}

/// The default output device. A stream lives only while a clip sounds.
#[derive(Default)]
pub struct DeviceOutput {
    stream: Option<cpal::Stream>,
}

impl DeviceOutput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioOutput for DeviceOutput {
    fn start(&mut self, clip: &AudioClip, from: usize) -> Result<(), AudioError> {
        self.stream = None;

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| AudioError::Output("no output device available".to_string()))?;
        let config: cpal::StreamConfig = device
            .default_output_config()
            .map_err(output_error)?
            .into();
        let channels = (config.channels as usize).max(1);
        // Nearest-sample resampling from the clip rate to the device rate.
        let step = clip.sample_rate() as f64 / config.sample_rate.0 as f64;
        debug!(
            "audio output at {} Hz, {} channels, step {:.3}",
            config.sample_rate.0, channels, step
        );

        let samples = Arc::clone(clip.samples());
        let mut position = from as f64;
        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(channels) {
                        let value = samples.get(position as usize).copied().unwrap_or(0.0);
                        frame.fill(value);
                        position += step;
                    }
                },
                |err| error!("audio stream error: {}", err),
                None,
            )
            .map_err(output_error)?;
        stream.play().map_err(output_error)?;
        self.stream = Some(stream);
        Ok(())
    }

    fn halt(&mut self) {
        self.stream = None;
    }
}
