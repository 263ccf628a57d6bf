// Tuning parameters for the synthesis pipeline.

use std::time::Duration;

/// Empirically chosen defaults; none of them is a correctness invariant
/// beyond the bounds enforced by [`PipelineConfig::normalized`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Milliseconds cut from the tail of every synthesized clip to remove
    /// the service's trailing artifact.
    pub trim_tail_ms: u64,
    /// Maximum number of concurrently outstanding synthesize+trim
    /// operations.
    pub window: usize,
    /// Buffer length at which the segmenter force-splits unpunctuated text.
    pub max_sentence_chars: usize,
    /// How far past the threshold the segmenter searches for a whitespace
    /// split point.
    pub whitespace_lookahead: usize,
    /// Depth of the output frame queue between producer and consumer.
    pub queue_depth: usize,
    /// Pause inserted before each synthesis dispatch to stay under the
    /// upstream request rate.
    pub dispatch_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            trim_tail_ms: 750,
            window: 3,
            max_sentence_chars: 200,
            whitespace_lookahead: 20,
            queue_depth: 10,
            dispatch_delay: Duration::from_millis(100),
        }
    }
}

impl PipelineConfig {
    /// Clamp fields to their valid ranges (window >= 1, threshold > 0,
    /// queue depth >= 1).
    pub fn normalized(mut self) -> Self {
        self.window = self.window.max(1);
        self.max_sentence_chars = self.max_sentence_chars.max(1);
        self.queue_depth = self.queue_depth.max(1);
        self
    }
}
