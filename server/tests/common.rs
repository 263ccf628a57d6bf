//! Common utilities for integration tests

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;

use server::config::ServerConfig;
use server::{app, AppState};
use tts_pipeline::codec::{self, PcmClip};
use tts_pipeline::synth::SynthStream;
use tts_pipeline::{
    PipelineConfig, PipelineError, SpeechSynthesizer, StreamProcessor, SynthChunk, VoiceParams,
};

/// Synthesizer that renders every sentence as two seconds of silence, so
/// handlers can be exercised without a live synthesis service.
pub struct MockSynthesizer;

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn stream_synthesize(
        &self,
        _text: &str,
        _params: &VoiceParams,
    ) -> Result<SynthStream, PipelineError> {
        let bytes = codec::encode_wav(&PcmClip {
            samples: vec![0; 48_000],
            sample_rate: 24_000,
            channels: 1,
        })
        .map_err(|e| PipelineError::Synthesis(e.to_string()))?;
        Ok(Box::pin(tokio_stream::once(Ok(SynthChunk::Audio(bytes)))))
    }
}

/// Create a test app instance
pub fn create_test_app() -> Router {
    let processor = StreamProcessor::new(
        Arc::new(MockSynthesizer),
        PipelineConfig {
            dispatch_delay: Duration::ZERO,
            ..Default::default()
        },
    );
    app(AppState {
        processor,
        request_count: Arc::new(AtomicU64::new(0)),
        config: ServerConfig::default(),
    })
}
