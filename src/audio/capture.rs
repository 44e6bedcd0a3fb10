use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::encode::AudioArtifact;
use crate::error::{Result, SonharioError};

/// One block of PCM samples (16-bit, interleaved) as emitted by the
/// capture stream.
#[derive(Debug, Clone, Default)]
pub struct AudioChunk {
    pub samples: Vec<i16>,
}

impl AudioChunk {
    pub fn byte_len(&self) -> usize {
        self.samples.len() * 2
    }
}

/// Capture stream seam over the platform audio stack.
///
/// Implementations:
/// - `MicSource`: cpal microphone input (behind the `mic` feature)
/// - `ScriptedSource`: predefined chunks, for tests and demo runs
#[async_trait::async_trait]
pub trait CaptureSource: Send {
    /// Start capturing audio.
    ///
    /// Returns the channel the source emits chunks on. The channel is
    /// unbounded so the device callback never blocks or drops a chunk;
    /// emission order is the only ordering the recorder ever sees.
    async fn start(&mut self) -> Result<mpsc::UnboundedReceiver<AudioChunk>>;

    /// Stop capturing and release the device. Closes the chunk channel.
    async fn stop(&mut self) -> Result<()>;

    /// Check if the source is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get source name for logging
    fn name(&self) -> &str;
}

/// A recording in progress: owns the growing chunk sequence between
/// `Recorder::begin` and `Recorder::end`.
pub struct ActiveRecording {
    collector: JoinHandle<Vec<AudioChunk>>,
}

/// Two-phase recording protocol over a capture source.
///
/// `begin()` acquires the stream and starts accumulating chunks in arrival
/// order; `end()` releases the device and finalizes exactly one
/// `AudioArtifact` per completed recording.
pub struct Recorder {
    source: Box<dyn CaptureSource>,
    sample_rate: u32,
    channels: u16,
}

impl Recorder {
    pub fn new(source: Box<dyn CaptureSource>, sample_rate: u32, channels: u16) -> Self {
        Self {
            source,
            sample_rate,
            channels,
        }
    }

    /// Acquire the capture stream and start accumulating chunks.
    ///
    /// Fails with `DeviceUnavailable` when the device is missing or
    /// permission was denied; no task is left running in that case.
    pub async fn begin(&mut self) -> Result<ActiveRecording> {
        let mut rx = self.source.start().await?;

        info!("Capture started on source: {}", self.source.name());

        let collector = tokio::spawn(async move {
            let mut chunks = Vec::new();
            while let Some(chunk) = rx.recv().await {
                chunks.push(chunk);
            }
            chunks
        });

        Ok(ActiveRecording { collector })
    }

    /// Stop the stream and finalize the recording into one artifact.
    ///
    /// The source is stopped before the outcome is inspected, so the device
    /// is released even when finalization fails.
    pub async fn end(&mut self, recording: ActiveRecording) -> Result<AudioArtifact> {
        let stop_result = self.source.stop().await;

        let chunks = recording
            .collector
            .await
            .map_err(|e| SonharioError::DeviceUnavailable(format!("capture task failed: {e}")))?;

        stop_result?;

        let artifact = AudioArtifact::from_chunks(&chunks, self.sample_rate, self.channels)?;

        info!(
            "Capture finished: {} chunks, {:.1}s, {} bytes",
            chunks.len(),
            artifact.duration_seconds(),
            artifact.pcm.len()
        );

        Ok(artifact)
    }
}

/// Capture source that replays predefined takes instead of touching a device.
///
/// Each `start()` pops the next take; once the script runs out, a short
/// silent take is emitted so demo runs can re-record indefinitely.
pub struct ScriptedSource {
    takes: VecDeque<Vec<AudioChunk>>,
    available: bool,
    capturing: Arc<AtomicBool>,
}

impl ScriptedSource {
    pub fn new(takes: Vec<Vec<AudioChunk>>) -> Self {
        Self {
            takes: takes.into(),
            available: true,
            capturing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Source whose every take is silence.
    pub fn silence(chunks: usize, samples_per_chunk: usize) -> Self {
        Self::new(vec![vec![
            AudioChunk {
                samples: vec![0i16; samples_per_chunk],
            };
            chunks
        ]])
    }

    /// Source that fails acquisition, as a missing or denied microphone does.
    pub fn unavailable() -> Self {
        Self {
            takes: VecDeque::new(),
            available: false,
            capturing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared handle to the capturing flag, for asserting release in tests.
    pub fn capture_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.capturing)
    }
}

#[async_trait::async_trait]
impl CaptureSource for ScriptedSource {
    async fn start(&mut self) -> Result<mpsc::UnboundedReceiver<AudioChunk>> {
        if !self.available {
            return Err(SonharioError::DeviceUnavailable(
                "no input device available".to_string(),
            ));
        }

        let take = self.takes.pop_front().unwrap_or_else(|| {
            warn!("Scripted source ran out of takes, emitting silence");
            vec![AudioChunk {
                samples: vec![0i16; 1600],
            }]
        });

        let (tx, rx) = mpsc::unbounded_channel();
        for chunk in take {
            let _ = tx.send(chunk);
        }
        // tx drops here, closing the channel once the take is delivered.

        self.capturing.store(true, Ordering::SeqCst);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
