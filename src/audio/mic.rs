use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;
use tokio::sync::mpsc;
use tracing::{error, info};

use super::capture::{AudioChunk, CaptureSource};
use crate::error::{Result, SonharioError};

/// Microphone capture via cpal.
///
/// The cpal stream is `!Send`, so it lives on a dedicated thread for the
/// duration of the capture; the source itself only holds the run flag and
/// the thread handle.
pub struct MicSource {
    target_sample_rate: u32,
    running: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<()>>,
}

impl MicSource {
    pub fn new(target_sample_rate: u32) -> Self {
        Self {
            target_sample_rate,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }
}

#[async_trait::async_trait]
impl CaptureSource for MicSource {
    async fn start(&mut self) -> Result<mpsc::UnboundedReceiver<AudioChunk>> {
        if self.running.load(Ordering::SeqCst) {
            return Err(SonharioError::DeviceUnavailable(
                "capture already active".to_string(),
            ));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<std::result::Result<(), String>>();

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let target_rate = self.target_sample_rate;

        let worker = thread::spawn(move || {
            let host = cpal::default_host();

            let Some(device) = host.default_input_device() else {
                let _ = ready_tx.send(Err("no input device available".to_string()));
                return;
            };

            let supported = match device.default_input_config() {
                Ok(c) => c,
                Err(e) => {
                    let _ = ready_tx.send(Err(format!("failed to get input config: {e}")));
                    return;
                }
            };

            let config: StreamConfig = supported.into();
            let device_rate = config.sample_rate.0;
            let channels = config.channels as usize;

            info!(
                "Using input device: {} ({} Hz, {} channels)",
                device.name().unwrap_or_else(|_| "unknown".to_string()),
                device_rate,
                channels
            );

            let stream = match device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let mono = fold_to_mono(data, channels);
                    let samples = decimate(&mono, device_rate, target_rate);
                    // Unbounded send keeps the device callback non-blocking
                    // and lossless; the recorder preserves arrival order.
                    let _ = tx.send(AudioChunk { samples });
                },
                |err| error!("Audio input stream error: {}", err),
                None,
            ) {
                Ok(s) => s,
                Err(e) => {
                    let _ = ready_tx.send(Err(format!("failed to build input stream: {e}")));
                    return;
                }
            };

            if let Err(e) = stream.play() {
                let _ = ready_tx.send(Err(format!("failed to start input stream: {e}")));
                return;
            }

            let _ = ready_tx.send(Ok(()));

            while running.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(50));
            }

            // Dropping the stream releases the device and closes the chunk
            // channel (the sender lives in the stream callback).
            drop(stream);
        });

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.worker = Some(worker);
                Ok(rx)
            }
            Ok(Err(message)) => {
                self.running.store(false, Ordering::SeqCst);
                let _ = worker.join();
                Err(SonharioError::DeviceUnavailable(message))
            }
            Err(_) => {
                self.running.store(false, Ordering::SeqCst);
                let _ = worker.join();
                Err(SonharioError::DeviceUnavailable(
                    "capture thread exited before starting".to_string(),
                ))
            }
        }
    }

    async fn stop(&mut self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = tokio::task::spawn_blocking(move || worker.join()).await;
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "cpal-mic"
    }
}

fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

fn fold_to_mono(data: &[f32], channels: usize) -> Vec<i16> {
    if channels <= 1 {
        data.iter().copied().map(f32_to_i16).collect()
    } else {
        data.chunks(channels)
            .map(|frame| f32_to_i16(frame.iter().sum::<f32>() / channels as f32))
            .collect()
    }
}

/// Downsample by decimation: take every Nth sample. Upsampling is never
/// needed; a device rate at or below the target passes through unchanged.
fn decimate(samples: &[i16], source_rate: u32, target_rate: u32) -> Vec<i16> {
    if source_rate <= target_rate {
        return samples.to_vec();
    }
    let ratio = (source_rate / target_rate).max(1) as usize;
    samples.iter().step_by(ratio).copied().collect()
}
