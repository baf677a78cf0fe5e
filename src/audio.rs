//! Plays a [`StreamProcessor`] through the default output device.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;
use tracing::{error, info};

use crate::config::RuntimeConfig;
use crate::schedule::StreamProcessor;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no output device available")]
    NoDevice,
    #[error("too many channels: {0}")]
    Channels(usize),
    #[error(transparent)]
    Build(#[from] cpal::BuildStreamError),
    #[error(transparent)]
    Play(#[from] cpal::PlayStreamError),
}

/// Builds and starts an output stream. Audio runs as long as the returned
/// stream is alive.
pub fn start(config: &RuntimeConfig, mut processor: StreamProcessor) -> Result<cpal::Stream, AudioError> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
    info!(device = %device.name().unwrap_or_default(), "opening output device");

    let channels = config.channels;
    let stream_config = cpal::StreamConfig {
        channels: u16::try_from(channels).map_err(|_| AudioError::Channels(channels))?,
        sample_rate: cpal::SampleRate(config.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let quantum = processor.quantum_size();
    let mut buffers = vec![vec![0.0f32; quantum]; channels];
    // Frames of the current quantum already handed to the device.
    let mut cursor = quantum;

    let stream = device.build_output_stream(
        &stream_config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                if cursor == quantum {
                    processor.process(&mut buffers);
                    cursor = 0;
                }
                for (sample, channel) in frame.iter_mut().zip(buffers.iter()) {
                    *sample = channel[cursor];
                }
                cursor += 1;
            }
        },
        |err| error!("audio stream error: {err}"),
        None,
    )?;
    stream.play()?;
    Ok(stream)
}
