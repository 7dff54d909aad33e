//! Default-device output through cpal.
//!
//! The render thread pushes frames into a ring buffer; the device callback
//! pops one frame per output frame and plays silence on underrun.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};
use pp_engine::StereoFrame;
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::traits::{AudioError, AudioOutput};

/// Output to the host's default device.
pub struct CpalOutput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    producer: HeapProd<StereoFrame>,
    running: Arc<AtomicBool>,
}

impl CpalOutput {
    /// Open the default output device, asking for `preferred_rate` Hz.
    ///
    /// Falls back to the device's default rate when the preferred one is
    /// not supported; check [`AudioOutput::sample_rate`] afterwards.
    pub fn new(preferred_rate: u32) -> Result<(Self, HeapCons<StereoFrame>), AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let mut config: StreamConfig = match supported_stereo_config(&device, preferred_rate) {
            Some(config) => config,
            None => {
                let config = device
                    .default_output_config()
                    .map_err(|e| AudioError::DeviceInit(e.to_string()))?;
                warn!(
                    preferred_rate,
                    device_rate = config.sample_rate().0,
                    "preferred sample rate unsupported, using device default"
                );
                config.into()
            }
        };
        // Force stereo output: the stream callback assumes 2-channel interleaving
        config.channels = 2;

        info!(
            device = %device.name().unwrap_or_else(|_| "<unnamed>".into()),
            sample_rate = config.sample_rate.0,
            "opened audio output"
        );

        // About 100 ms of queued audio
        let buffer_size = (config.sample_rate.0 as usize / 10).max(1);
        let rb = HeapRb::<StereoFrame>::new(buffer_size);
        let (producer, consumer) = rb.split();

        let output = Self {
            device,
            config,
            stream: None,
            producer,
            running: Arc::new(AtomicBool::new(false)),
        };

        Ok((output, consumer))
    }

    /// Build the device stream around the consumer half returned by `new`.
    pub fn build_stream(&mut self, mut consumer: HeapCons<StereoFrame>) -> Result<(), AudioError> {
        let running = self.running.clone();
        let channels = self.config.channels as usize;

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !running.load(Ordering::Relaxed) {
                        data.fill(0.0);
                        return;
                    }
                    for chunk in data.chunks_mut(channels) {
                        chunk.fill(0.0);
                        consumer.try_pop().unwrap_or_default().write_to(chunk);
                    }
                },
                |err| error!(%err, "audio stream error"),
                None,
            )
            .map_err(|e| AudioError::StreamCreate(e.to_string()))?;

        stream.play().map_err(|e| AudioError::Playback(e.to_string()))?;
        self.stream = Some(stream);

        Ok(())
    }
}

/// A stereo f32 config at exactly `rate`, if the device offers one.
fn supported_stereo_config(device: &Device, rate: u32) -> Option<StreamConfig> {
    let ranges = device.supported_output_configs().ok()?;
    ranges
        .filter(|r| r.channels() >= 2 && r.sample_format() == cpal::SampleFormat::F32)
        .find(|r| r.min_sample_rate().0 <= rate && r.max_sample_rate().0 >= rate)
        .map(|r| r.with_sample_rate(SampleRate(rate)).into())
}

impl AudioOutput for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn write(&mut self, frames: &[StereoFrame]) {
        for frame in frames {
            while self.producer.try_push(*frame).is_err() {
                std::thread::sleep(Duration::from_micros(500));
            }
        }
    }

    fn start(&mut self) -> Result<(), AudioError> {
        self.running.store(true, Ordering::Relaxed);
        if let Some(ref stream) = self.stream {
            stream.play().map_err(|e| AudioError::Playback(e.to_string()))?;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.running.store(false, Ordering::Relaxed);
        if let Some(ref stream) = self.stream {
            stream.pause().map_err(|e| AudioError::Playback(e.to_string()))?;
        }
        Ok(())
    }
}
