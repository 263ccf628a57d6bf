//! Output assembly: one WAV file, or a live header-prefixed byte stream.

use futures_core::Stream;
use futures_util::StreamExt;
use tracing::warn;

use crate::codec::{self, PcmClip, StreamFormat};
use crate::error::PipelineError;
use crate::trim::{AudioSegment, SegmentPayload};

/// A finished single-file synthesis result.
#[derive(Debug, Clone)]
pub struct JoinedAudio {
    pub bytes: Vec<u8>,
    pub sample_rate: u32,
    pub duration_ms: u64,
}

/// Collect an ordered segment stream into one WAV file. Undecodable
/// segments cannot be merged into a PCM container and are dropped with a
/// warning. `Ok(None)` when no segment contributed audio.
pub async fn join_to_file<S>(segments: S) -> Result<Option<JoinedAudio>, PipelineError>
where
    S: Stream<Item = AudioSegment> + Send,
{
    let mut clips: Vec<PcmClip> = Vec::new();
    let mut segments = std::pin::pin!(segments);
    while let Some(segment) = segments.next().await {
        match segment.payload {
            SegmentPayload::Pcm(clip) => clips.push(clip),
            SegmentPayload::Encoded(bytes) => {
                warn!(
                    sequence = segment.sequence,
                    bytes = bytes.len(),
                    "dropping undecodable segment from single-file output"
                );
            }
        }
    }
    let Some(joined) = codec::concat_clips(&clips) else {
        return Ok(None);
    };
    let sample_rate = joined.sample_rate;
    let duration_ms = joined.duration_ms();
    let bytes = tokio::task::spawn_blocking(move || codec::encode_wav(&joined))
        .await
        .map_err(|e| PipelineError::Assembly(e.to_string()))??;
    Ok(Some(JoinedAudio {
        bytes,
        sample_rate,
        duration_ms,
    }))
}

/// Turn an ordered segment stream into transmittable frames: a streaming
/// WAV header first, then raw samples conformed to `format`. Undecodable
/// segments are forwarded verbatim so the listener hears them even if the
/// container bookkeeping is off.
pub fn stream_frames<S>(segments: S, format: StreamFormat) -> impl Stream<Item = Vec<u8>> + Send
where
    S: Stream<Item = AudioSegment> + Send + 'static,
{
    async_stream::stream! {
        yield codec::streaming_wav_header(format);
        let mut segments = std::pin::pin!(segments);
        while let Some(segment) = segments.next().await {
            match segment.payload {
                SegmentPayload::Pcm(clip) => {
                    let conformed = codec::conform(&clip, format);
                    let bytes = codec::sample_bytes(&conformed);
                    if !bytes.is_empty() {
                        yield bytes;
                    }
                }
                SegmentPayload::Encoded(bytes) => {
                    warn!(
                        sequence = segment.sequence,
                        "forwarding undecodable segment verbatim"
                    );
                    yield bytes;
                }
            }
        }
    }
}
