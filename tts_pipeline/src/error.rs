use thiserror::Error;

/// Pipeline error taxonomy.
///
/// Per-sentence failures (`Synthesis`, `Decode`) are isolated by the
/// scheduler and never abort a running stream; `Assembly` only surfaces
/// from the one-shot join path.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("synthesis failed: {0}")]
    Synthesis(String),

    #[error("could not decode audio clip: {0}")]
    Decode(String),

    #[error("failed to assemble output audio: {0}")]
    Assembly(String),

    #[error("pipeline cancelled")]
    Cancelled,
}
