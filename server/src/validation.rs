use crate::error::ApiError;

use tts_pipeline::VoiceRegistry;

/// Maximum text length for synthesis requests
const MAX_TEXT_LENGTH: usize = 5000;

/// Validate a synthesis request
pub fn validate_synthesis_request(text: &str, voice: Option<&str>) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::InvalidInput("Text cannot be empty".to_string()));
    }
    if text.chars().count() > MAX_TEXT_LENGTH {
        return Err(ApiError::InvalidInput(format!(
            "Text too long (max {} characters)",
            MAX_TEXT_LENGTH
        )));
    }

    if let Some(voice) = voice {
        if !VoiceRegistry::global().contains(voice) {
            return Err(ApiError::InvalidInput(format!(
                "Unknown voice: {}. See /voices/detail for the supported list.",
                voice
            )));
        }
    }

    Ok(())
}

/// Validate numeric prosody offsets; the synthesis service rejects extreme
/// values with an opaque error, so they are bounded here instead. Literal
/// string values are passed through to the service untouched.
pub fn validate_prosody(params: &tts_pipeline::VoiceParams) -> Result<(), ApiError> {
    for (value, what) in [
        (&params.rate, "Rate"),
        (&params.pitch, "Pitch"),
        (&params.volume, "Volume"),
    ] {
        if let Some(offset) = value.offset() {
            if !(-100..=100).contains(&offset) {
                return Err(ApiError::InvalidInput(format!(
                    "{} offset must be between -100 and 100",
                    what
                )));
            }
        }
    }
    Ok(())
}
