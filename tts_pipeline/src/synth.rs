//! Abstraction over the external speech synthesis service.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;
use futures_util::StreamExt;
use tracing::debug;

use crate::error::PipelineError;
use crate::params::VoiceParams;

/// One item of a synthesis response stream. Services interleave audio
/// payloads with textual metadata (word boundaries and the like); the
/// pipeline keeps only the audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthChunk {
    Audio(Vec<u8>),
    Metadata(String),
}

pub type SynthStream = Pin<Box<dyn Stream<Item = Result<SynthChunk, PipelineError>> + Send>>;

/// A backend that can turn one sentence of text into audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn stream_synthesize(
        &self,
        text: &str,
        params: &VoiceParams,
    ) -> Result<SynthStream, PipelineError>;
}

/// Run one sentence through the synthesizer and collect the audio bytes.
/// An error mid-stream, or a stream that carried no audio at all, is a
/// synthesis failure for this sentence only.
pub async fn synthesize_sentence(
    synth: &dyn SpeechSynthesizer,
    text: &str,
    params: &VoiceParams,
) -> Result<Vec<u8>, PipelineError> {
    let mut stream = synth.stream_synthesize(text, params).await?;
    let mut audio = Vec::new();
    let mut metadata_items = 0usize;
    while let Some(chunk) = stream.next().await {
        match chunk? {
            SynthChunk::Audio(bytes) => audio.extend_from_slice(&bytes),
            SynthChunk::Metadata(_) => metadata_items += 1,
        }
    }
    if metadata_items > 0 {
        debug!(metadata_items, "discarded non-audio chunks");
    }
    if audio.is_empty() {
        return Err(PipelineError::Synthesis(format!(
            "service returned no audio for {} chars of text",
            text.chars().count()
        )));
    }
    Ok(audio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_stream::stream;

    struct ScriptedSynth(Vec<Result<SynthChunk, PipelineError>>);

    #[async_trait]
    impl SpeechSynthesizer for ScriptedSynth {
        async fn stream_synthesize(
            &self,
            _text: &str,
            _params: &VoiceParams,
        ) -> Result<SynthStream, PipelineError> {
            let chunks: Vec<_> = self
                .0
                .iter()
                .map(|c| match c {
                    Ok(c) => Ok(c.clone()),
                    Err(e) => Err(PipelineError::Synthesis(e.to_string())),
                })
                .collect();
            Ok(Box::pin(stream! {
                for chunk in chunks {
                    yield chunk;
                }
            }))
        }
    }

    #[tokio::test]
    async fn audio_chunks_are_concatenated_in_order() {
        let synth = ScriptedSynth(vec![
            Ok(SynthChunk::Audio(vec![1, 2])),
            Ok(SynthChunk::Metadata("boundary".into())),
            Ok(SynthChunk::Audio(vec![3])),
        ]);
        let audio = synthesize_sentence(&synth, "hi", &VoiceParams::default())
            .await
            .unwrap();
        assert_eq!(audio, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn empty_stream_is_a_synthesis_error() {
        let synth = ScriptedSynth(vec![Ok(SynthChunk::Metadata("only words".into()))]);
        let err = synthesize_sentence(&synth, "hi", &VoiceParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Synthesis(_)));
    }

    #[tokio::test]
    async fn mid_stream_error_propagates() {
        let synth = ScriptedSynth(vec![
            Ok(SynthChunk::Audio(vec![1])),
            Err(PipelineError::Synthesis("upstream reset".into())),
        ]);
        assert!(
            synthesize_sentence(&synth, "hi", &VoiceParams::default())
                .await
                .is_err()
        );
    }
}
