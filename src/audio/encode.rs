use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hound::{SampleFormat, WavSpec, WavWriter};

use super::capture::AudioChunk;
use crate::error::{Result, SonharioError};

/// The one container format a finished recording is encoded in.
pub const MIME_TYPE: &str = "audio/wav";

/// A finalized recording: the immutable audio object a completed capture
/// session produces, owned by the session until superseded by a re-record.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    /// Concatenated chunk bytes (16-bit little-endian PCM), emission order.
    pub pcm: Vec<u8>,
    /// WAV-encoded container bytes, what the transcription upload carries.
    pub wav: Vec<u8>,
    pub mime_type: &'static str,
    /// Base64 of the WAV bytes.
    pub base64: String,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioArtifact {
    /// Finalize captured chunks into one artifact.
    ///
    /// Concatenation order is exactly the slice order, which the recorder
    /// guarantees matches emission order.
    pub fn from_chunks(chunks: &[AudioChunk], sample_rate: u32, channels: u16) -> Result<Self> {
        let total: usize = chunks.iter().map(|c| c.samples.len()).sum();
        let mut samples = Vec::with_capacity(total);
        for chunk in chunks {
            samples.extend_from_slice(&chunk.samples);
        }

        let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).map_err(finalize_err)?;
            for sample in &samples {
                writer.write_sample(*sample).map_err(finalize_err)?;
            }
            writer.finalize().map_err(finalize_err)?;
        }
        let wav = cursor.into_inner();

        let base64 = STANDARD.encode(&wav);

        Ok(Self {
            pcm,
            wav,
            mime_type: MIME_TYPE,
            base64,
            sample_rate,
            channels,
        })
    }

    pub fn duration_seconds(&self) -> f64 {
        let sample_count = self.pcm.len() as f64 / 2.0;
        sample_count / (self.sample_rate as f64 * self.channels as f64)
    }
}

fn finalize_err(e: hound::Error) -> SonharioError {
    SonharioError::DeviceUnavailable(format!("failed to finalize recording: {e}"))
}
