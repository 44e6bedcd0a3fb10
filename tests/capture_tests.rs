// Integration tests for the two-phase recording protocol.
//
// These verify that chunk accumulation preserves emission order, that
// exactly one artifact comes out of a completed recording, and that the
// capture source is released on end() in every case.

use std::io::Cursor;
use std::sync::atomic::Ordering;

use anyhow::Result;
use sonhario::{AudioChunk, Recorder, ScriptedSource};

fn chunk(samples: Vec<i16>) -> AudioChunk {
    AudioChunk { samples }
}

#[tokio::test]
async fn artifact_bytes_equal_chunk_sum_in_emission_order() -> Result<()> {
    let take = vec![
        chunk(vec![1, 2, 3]),
        chunk(vec![4]),
        chunk(vec![5, 6, 7, 8]),
    ];
    let expected_bytes: usize = take.iter().map(|c| c.byte_len()).sum();
    let expected_pcm: Vec<u8> = [1i16, 2, 3, 4, 5, 6, 7, 8]
        .iter()
        .flat_map(|s| s.to_le_bytes())
        .collect();

    let mut recorder = Recorder::new(Box::new(ScriptedSource::new(vec![take])), 16000, 1);

    let handle = recorder.begin().await?;
    let artifact = recorder.end(handle).await?;

    assert_eq!(artifact.pcm.len(), expected_bytes);
    assert_eq!(artifact.pcm, expected_pcm);
    Ok(())
}

#[tokio::test]
async fn each_completed_recording_yields_exactly_one_artifact() -> Result<()> {
    let mut recorder = Recorder::new(
        Box::new(ScriptedSource::new(vec![
            vec![chunk(vec![1, 1])],
            vec![chunk(vec![2, 2, 2])],
        ])),
        16000,
        1,
    );

    let first = {
        let handle = recorder.begin().await?;
        recorder.end(handle).await?
    };
    let second = {
        let handle = recorder.begin().await?;
        recorder.end(handle).await?
    };

    // Each end() finalizes only its own take; the first take is gone.
    assert_eq!(first.pcm.len(), 4);
    assert_eq!(second.pcm.len(), 6);
    let expected: Vec<u8> = [2i16, 2, 2].iter().flat_map(|s| s.to_le_bytes()).collect();
    assert_eq!(second.pcm, expected);
    Ok(())
}

#[tokio::test]
async fn source_is_released_on_end_even_with_no_chunks() -> Result<()> {
    let source = ScriptedSource::new(vec![vec![]]);
    let flag = source.capture_flag();
    let mut recorder = Recorder::new(Box::new(source), 16000, 1);

    let handle = recorder.begin().await?;
    assert!(flag.load(Ordering::SeqCst), "source should be capturing");

    let artifact = recorder.end(handle).await?;
    assert!(!flag.load(Ordering::SeqCst), "source should be released");
    assert!(artifact.pcm.is_empty());
    Ok(())
}

#[tokio::test]
async fn unavailable_device_fails_begin_with_device_error() {
    let mut recorder = Recorder::new(Box::new(ScriptedSource::unavailable()), 16000, 1);

    let err = recorder.begin().await.err().expect("begin should fail");
    assert!(matches!(err, sonhario::SonharioError::DeviceUnavailable(_)));
}

#[tokio::test]
async fn artifact_wav_parses_with_the_configured_format() -> Result<()> {
    let take = vec![chunk(vec![100, -100, 200, -200])];
    let mut recorder = Recorder::new(Box::new(ScriptedSource::new(vec![take])), 16000, 1);

    let handle = recorder.begin().await?;
    let artifact = recorder.end(handle).await?;

    let reader = hound::WavReader::new(Cursor::new(&artifact.wav))?;
    assert_eq!(reader.spec().sample_rate, 16000);
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.spec().bits_per_sample, 16);

    let samples: Vec<i16> = reader.into_samples::<i16>().collect::<Result<_, _>>()?;
    assert_eq!(samples, vec![100, -100, 200, -200]);
    Ok(())
}
