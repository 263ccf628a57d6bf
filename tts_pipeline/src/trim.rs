//! Tail trimming of synthesized clips.
//!
//! The synthesis service appends a fixed-length silence/artifact to every
//! clip; audible as a gap when clips are played back to back. Each clip
//! loses that tail before assembly.

use tracing::warn;

use crate::codec::{self, PcmClip};

/// A processed clip tagged with the sequence number of the sentence it was
/// synthesized from.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    pub payload: SegmentPayload,
    pub sequence: u64,
}

/// Trimmed PCM when the clip decoded cleanly, otherwise the service bytes
/// untouched. Keeping undecodable clips lets the live stream still play
/// them; the single-file path drops them instead.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentPayload {
    Pcm(PcmClip),
    Encoded(Vec<u8>),
}

/// Decode and tail-trim one synthesized clip off the async runtime's worker
/// threads.
pub async fn trim_segment(encoded: Vec<u8>, sequence: u64, trim_tail_ms: u64) -> AudioSegment {
    let fallback = encoded.clone();
    match tokio::task::spawn_blocking(move || trim_clip(&encoded, trim_tail_ms)).await {
        Ok(payload) => AudioSegment { payload, sequence },
        Err(e) => {
            warn!(sequence, error = %e, "trim task failed, passing clip through untrimmed");
            AudioSegment {
                payload: SegmentPayload::Encoded(fallback),
                sequence,
            }
        }
    }
}

fn trim_clip(encoded: &[u8], trim_tail_ms: u64) -> SegmentPayload {
    match codec::decode_clip(encoded) {
        Ok(mut clip) => {
            // Clips shorter than the tail are artifact-free in practice;
            // trimming them would silence the whole sentence.
            if clip.duration_ms() > trim_tail_ms {
                clip.cut_tail(trim_tail_ms);
            }
            SegmentPayload::Pcm(clip)
        }
        Err(e) => {
            warn!(error = %e, "clip did not decode, passing through untrimmed");
            SegmentPayload::Encoded(encoded.to_vec())
        }
    }
}
