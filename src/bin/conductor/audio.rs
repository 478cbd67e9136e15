//! Audio output: rendered stereo frames travel to cpal through a ring.
//!
//! The conductor renders on the UI thread (the bus registry is not shared),
//! so the device callback only pops frames. An underrun plays silence.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{info, warn};

use lane_conductor::MAX_BLOCK_SIZE;

/// Ring capacity in stereo frames (~40 ms at 48 kHz).
const RING_FRAMES: usize = MAX_BLOCK_SIZE;

pub struct AudioOut {
    _stream: cpal::Stream,
    tx: Producer<[f32; 2]>,
    sample_rate: f32,
}

impl AudioOut {
    /// Open the default output device.
    pub fn open() -> EyreResult<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        let (tx, rx) = RingBuffer::<[f32; 2]>::new(RING_FRAMES);

        let stream = build_stream(&device, &config.into(), channels, rx)?;
        stream.play().wrap_err("failed to start output stream")?;

        info!(
            device = %device.name().unwrap_or_else(|_| "unknown".into()),
            sample_rate,
            channels,
            "audio output started"
        );
        Ok(Self {
            _stream: stream,
            tx,
            sample_rate,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Frames the ring can take right now.
    pub fn free_frames(&self) -> usize {
        self.tx.slots()
    }

    /// Queue interleaved stereo samples; frames that do not fit are dropped.
    pub fn push_interleaved(&mut self, samples: &[f32]) {
        for frame in samples.chunks_exact(2) {
            if self.tx.push([frame[0], frame[1]]).is_err() {
                break;
            }
        }
    }
}

fn build_stream(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    mut rx: Consumer<[f32; 2]>,
) -> EyreResult<cpal::Stream> {
    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _| {
            for frame in data.chunks_mut(channels) {
                let [l, r] = rx.pop().unwrap_or([0.0, 0.0]);
                match frame {
                    [mono] => *mono = 0.5 * (l + r),
                    [left, right, rest @ ..] => {
                        *left = l;
                        *right = r;
                        rest.fill(0.0);
                    }
                    [] => {}
                }
            }
        },
        |err| warn!(error = %err, "audio stream error"),
        None,
    )?;
    Ok(stream)
}
