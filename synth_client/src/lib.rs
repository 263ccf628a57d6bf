//! HTTP client for the external speech synthesis service.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Serialize;
use tracing::{debug, info, warn};

use tts_pipeline::synth::SynthStream;
use tts_pipeline::{PipelineError, SpeechSynthesizer, SynthChunk, VoiceParams};

const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5500";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Request body for the service's streaming synthesis endpoint.
#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    voice: &'a str,
    rate: String,
    pitch: String,
    volume: String,
}

/// Streams audio from a synthesis service over HTTP.
pub struct HttpSynthesizer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSynthesizer {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Read the service address from `SYNTH_SERVICE_URL`, falling back to
    /// the local default.
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url =
            env::var("SYNTH_SERVICE_URL").unwrap_or_else(|_| DEFAULT_SERVICE_URL.to_string());
        Self::new(base_url)
    }

    /// Issue a throwaway request so the service loads its model before the
    /// first real caller arrives. Failure is logged, never fatal.
    pub async fn warm_up(&self) {
        let params = VoiceParams::default();
        match self.stream_synthesize("Service warming up.", &params).await {
            Ok(mut stream) => {
                let mut bytes = 0usize;
                while let Some(chunk) = stream.next().await {
                    match chunk {
                        Ok(SynthChunk::Audio(audio)) => bytes += audio.len(),
                        Ok(SynthChunk::Metadata(_)) => {}
                        Err(e) => {
                            warn!(error = %e, "warm-up stream failed");
                            return;
                        }
                    }
                }
                info!(voice = %params.voice, bytes, "synthesis service warmed up");
            }
            Err(e) => warn!(error = %e, "warm-up request failed"),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSynthesizer {
    async fn stream_synthesize(
        &self,
        text: &str,
        params: &VoiceParams,
    ) -> Result<SynthStream, PipelineError> {
        let body = SynthesisRequest {
            text,
            voice: &params.voice,
            rate: params.rate_param(),
            pitch: params.pitch_param(),
            volume: params.volume_param(),
        };
        let url = format!("{}/v1/synthesize/stream", self.base_url);
        debug!(voice = %params.voice, chars = text.chars().count(), "requesting synthesis");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| PipelineError::Synthesis(e.to_string()))?;

        let bytes = response.bytes_stream().map(|chunk| {
            chunk
                .map(|b| SynthChunk::Audio(b.to_vec()))
                .map_err(|e| PipelineError::Synthesis(e.to_string()))
        });
        Ok(Box::pin(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_signed_prosody_params() {
        let params = VoiceParams {
            voice: "de-DE-KatjaNeural".into(),
            rate: 5.into(),
            pitch: (-2).into(),
            volume: 0.into(),
        };
        let body = SynthesisRequest {
            text: "hallo",
            voice: &params.voice,
            rate: params.rate_param(),
            pitch: params.pitch_param(),
            volume: params.volume_param(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["voice"], "de-DE-KatjaNeural");
        assert_eq!(json["rate"], "+5%");
        assert_eq!(json["pitch"], "-2Hz");
        assert_eq!(json["volume"], "+0%");
    }

    #[test]
    fn from_env_falls_back_to_the_local_default() {
        // Only meaningful when the variable is absent, which is the normal
        // test environment.
        if env::var("SYNTH_SERVICE_URL").is_err() {
            let client = HttpSynthesizer::from_env().unwrap();
            assert_eq!(client.base_url, DEFAULT_SERVICE_URL);
        }
    }
}
