//! Streaming text-to-speech pipeline.
//!
//! Turns an incrementally arriving text stream into a continuous audio
//! stream: chunks are normalized, segmented into speakable sentences,
//! dispatched to an external synthesis service under a bounded concurrency
//! window, trimmed to remove the service's trailing artifact, and
//! reassembled in the original sentence order as either one WAV file or a
//! live header-prefixed byte stream.

pub mod assemble;
pub mod codec;
pub mod config;
pub mod error;
pub mod normalize;
pub mod params;
pub mod scheduler;
pub mod segment;
pub mod stream;
pub mod synth;
pub mod trim;
pub mod voices;

pub use assemble::JoinedAudio;
pub use codec::StreamFormat;
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use params::{Prosody, VoiceParams};
pub use segment::Sentence;
pub use stream::{AudioByteStream, StreamProcessor};
pub use synth::{SpeechSynthesizer, SynthChunk, SynthStream};
pub use trim::{AudioSegment, SegmentPayload};
pub use voices::VoiceRegistry;
