//! Pipeline orchestration: text chunks in, audio out.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::assemble::{self, JoinedAudio};
use crate::codec::StreamFormat;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::normalize::normalize_chunk;
use crate::params::VoiceParams;
use crate::scheduler::ordered_dispatch;
use crate::segment::{Sentence, SentenceSegmenter};
use crate::synth::{synthesize_sentence, SpeechSynthesizer};
use crate::trim::{trim_segment, AudioSegment};

/// Drives the full pipeline: normalize, segment, dispatch, trim, assemble.
#[derive(Clone)]
pub struct StreamProcessor {
    synth: Arc<dyn SpeechSynthesizer>,
    config: PipelineConfig,
    format: StreamFormat,
}

impl StreamProcessor {
    pub fn new(synth: Arc<dyn SpeechSynthesizer>, config: PipelineConfig) -> Self {
        Self {
            synth,
            config: config.normalized(),
            format: StreamFormat::default(),
        }
    }

    pub fn with_stream_format(mut self, format: StreamFormat) -> Self {
        self.format = format;
        self
    }

    /// Live streaming entry point. Frames are produced into a bounded queue
    /// so a slow consumer applies backpressure all the way up to synthesis
    /// dispatch. The queue closing is the end-of-stream signal; dropping
    /// the returned stream cancels every in-flight synthesis task.
    pub fn process_stream<S>(&self, chunks: S, params: VoiceParams) -> AudioByteStream
    where
        S: Stream<Item = String> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(self.config.queue_depth);
        let frames = assemble::stream_frames(self.segments(chunks, params), self.format);
        let producer = tokio::spawn(async move {
            let mut frames = std::pin::pin!(frames);
            while let Some(frame) = frames.next().await {
                // Consumer gone; stop synthesizing.
                if tx.send(frame).await.is_err() {
                    debug!("output stream dropped, stopping frame production");
                    break;
                }
            }
        });
        AudioByteStream {
            frames: ReceiverStream::new(rx),
            producer,
        }
    }

    /// One-shot entry point: synthesize a complete message into a single
    /// WAV file. `Ok(None)` when nothing speakable came out of the text.
    pub async fn process_to_single_file(
        &self,
        message: &str,
        params: VoiceParams,
    ) -> Result<Option<JoinedAudio>, PipelineError> {
        let chunks = tokio_stream::once(message.to_string());
        assemble::join_to_file(self.segments(chunks, params)).await
    }

    /// The shared middle of both entry points: an ordered stream of trimmed
    /// segments. Failed sentences are logged and skipped.
    fn segments<S>(
        &self,
        chunks: S,
        params: VoiceParams,
    ) -> impl Stream<Item = AudioSegment> + Send + 'static
    where
        S: Stream<Item = String> + Send + 'static,
    {
        let max_chars = self.config.max_sentence_chars;
        let lookahead = self.config.whitespace_lookahead;
        let sentences = async_stream::stream! {
            let mut segmenter = SentenceSegmenter::new(max_chars, lookahead);
            let mut chunks = std::pin::pin!(chunks);
            while let Some(chunk) = chunks.next().await {
                for sentence in segmenter.push_chunk(&normalize_chunk(&chunk)) {
                    yield sentence;
                }
            }
            if let Some(sentence) = segmenter.finish() {
                yield sentence;
            }
        };

        let synth = self.synth.clone();
        let trim_tail_ms = self.config.trim_tail_ms;
        ordered_dispatch(
            sentences,
            self.config.window,
            self.config.dispatch_delay,
            move |sentence: Sentence| {
                let synth = synth.clone();
                let params = params.clone();
                async move {
                    debug!(
                        sequence = sentence.sequence,
                        chars = sentence.text.chars().count(),
                        "synthesizing sentence"
                    );
                    match synthesize_sentence(synth.as_ref(), &sentence.text, &params).await {
                        Ok(bytes) => {
                            Some(trim_segment(bytes, sentence.sequence, trim_tail_ms).await)
                        }
                        Err(e) => {
                            warn!(sequence = sentence.sequence, error = %e, "sentence failed, skipping");
                            None
                        }
                    }
                }
            },
        )
    }
}

/// The live output: a stream of transmittable byte frames, header first.
/// Dropping it aborts the producer task, which in turn aborts all pending
/// synthesis tasks.
pub struct AudioByteStream {
    frames: ReceiverStream<Vec<u8>>,
    producer: JoinHandle<()>,
}

impl Stream for AudioByteStream {
    type Item = Vec<u8>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.get_mut().frames).poll_next(cx)
    }
}

impl Drop for AudioByteStream {
    fn drop(&mut self) {
        self.producer.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::codec::{self, PcmClip};
    use crate::synth::{SynthChunk, SynthStream};

    /// Produces a silent WAV clip whose duration scales with text length.
    struct FakeSynth {
        ms_per_char: u64,
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeSynth {
        async fn stream_synthesize(
            &self,
            text: &str,
            _params: &VoiceParams,
        ) -> Result<SynthStream, PipelineError> {
            let ms = 1000 + self.ms_per_char * text.chars().count() as u64;
            let frames = (24_000 * ms / 1000) as usize;
            let bytes = codec::encode_wav(&PcmClip {
                samples: vec![0; frames],
                sample_rate: 24_000,
                channels: 1,
            })
            .unwrap();
            Ok(Box::pin(tokio_stream::once(Ok(SynthChunk::Audio(bytes)))))
        }
    }

    fn processor() -> StreamProcessor {
        StreamProcessor::new(
            Arc::new(FakeSynth { ms_per_char: 10 }),
            PipelineConfig {
                dispatch_delay: Duration::ZERO,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn single_file_output_is_a_trimmed_wav() {
        let joined = processor()
            .process_to_single_file("One. Two.", VoiceParams::default())
            .await
            .unwrap()
            .unwrap();
        let clip = codec::decode_clip(&joined.bytes).unwrap();
        // Two clips of 1040 ms each lose 750 ms a piece.
        assert_eq!(clip.duration_ms(), 2 * (1040 - 750));
    }

    #[tokio::test]
    async fn unspeakable_text_yields_no_file() {
        let joined = processor()
            .process_to_single_file("...", VoiceParams::default())
            .await
            .unwrap();
        assert!(joined.is_none());
    }

    #[tokio::test]
    async fn live_stream_starts_with_a_riff_header() {
        let chunks = tokio_stream::iter(vec!["Hello there. ".to_string(), "Bye.".to_string()]);
        let mut stream = processor().process_stream(chunks, VoiceParams::default());
        let header = stream.next().await.unwrap();
        assert_eq!(&header[..4], b"RIFF");
        assert_eq!(&header[4..8], &u32::MAX.to_le_bytes());
        let mut audio_frames = 0;
        while stream.next().await.is_some() {
            audio_frames += 1;
        }
        assert_eq!(audio_frames, 2);
    }

    #[tokio::test]
    async fn dropping_the_stream_cancels_cleanly() {
        let chunks = tokio_stream::iter(
            (0..50).map(|i| format!("Sentence number {i} is reasonably long. ")),
        );
        let mut stream = processor().process_stream(chunks, VoiceParams::default());
        let first = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("first frame should arrive");
        assert!(first.is_some());
        drop(stream);
        // Nothing to assert beyond not hanging; abort propagation is
        // covered by the scheduler's drop behavior.
    }
}
