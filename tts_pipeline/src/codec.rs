//! WAV decode/encode and sample manipulation for synthesized clips.
//!
//! The pipeline only needs a narrow slice of codec functionality: duration
//! queries, tail slicing, concatenation, re-encoding, and conforming clips
//! to the declared streaming format.

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::PipelineError;

/// Fixed output format declared by the streaming container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub channels: u16,
}

impl Default for StreamFormat {
    fn default() -> Self {
        Self {
            sample_rate: 24_000,
            bits_per_sample: 16,
            channels: 1,
        }
    }
}

/// Decoded PCM audio, interleaved 16-bit samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmClip {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmClip {
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0;
        }
        let frames = self.samples.len() as u64 / self.channels as u64;
        frames * 1000 / self.sample_rate as u64
    }

    /// Remove `tail_ms` milliseconds from the end of the clip.
    pub fn cut_tail(&mut self, tail_ms: u64) {
        if self.channels == 0 {
            return;
        }
        let cut_frames = (self.sample_rate as u64 * tail_ms / 1000) as usize;
        let keep_frames = (self.samples.len() / self.channels as usize).saturating_sub(cut_frames);
        self.samples.truncate(keep_frames * self.channels as usize);
    }
}

/// Decode an in-memory WAV clip to 16-bit PCM.
pub fn decode_clip(bytes: &[u8]) -> Result<PcmClip, PipelineError> {
    let reader =
        WavReader::new(Cursor::new(bytes)).map_err(|e| PipelineError::Decode(e.to_string()))?;
    let spec = reader.spec();
    let samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => reader
            .into_samples::<i16>()
            .collect::<Result<_, _>>()
            .map_err(|e| PipelineError::Decode(e.to_string()))?,
        (SampleFormat::Int, bits) => {
            let shift = bits as i32 - 16;
            reader
                .into_samples::<i32>()
                .map(|s| {
                    s.map(|v| {
                        if shift >= 0 {
                            (v >> shift) as i16
                        } else {
                            (v << -shift) as i16
                        }
                    })
                })
                .collect::<Result<_, _>>()
                .map_err(|e| PipelineError::Decode(e.to_string()))?
        }
        (SampleFormat::Float, _) => reader
            .into_samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
            .collect::<Result<_, _>>()
            .map_err(|e| PipelineError::Decode(e.to_string()))?,
    };
    Ok(PcmClip {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Encode a clip as a complete 16-bit PCM WAV file.
pub fn encode_wav(clip: &PcmClip) -> Result<Vec<u8>, PipelineError> {
    let spec = WavSpec {
        channels: clip.channels,
        sample_rate: clip.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::with_capacity(44 + clip.samples.len() * 2));
    let mut writer =
        WavWriter::new(&mut cursor, spec).map_err(|e| PipelineError::Assembly(e.to_string()))?;
    for &s in &clip.samples {
        writer
            .write_sample(s)
            .map_err(|e| PipelineError::Assembly(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| PipelineError::Assembly(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Concatenate clips in order, conforming later clips to the format of the
/// first. `None` for an empty input.
pub fn concat_clips(clips: &[PcmClip]) -> Option<PcmClip> {
    let first = clips.first()?;
    let sample_rate = first.sample_rate;
    let channels = first.channels;
    let mut samples = Vec::new();
    for clip in clips {
        if clip.sample_rate == sample_rate && clip.channels == channels {
            samples.extend_from_slice(&clip.samples);
        } else {
            samples.extend(
                conform(
                    clip,
                    StreamFormat {
                        sample_rate,
                        bits_per_sample: 16,
                        channels,
                    },
                )
                .samples,
            );
        }
    }
    Some(PcmClip {
        samples,
        sample_rate,
        channels,
    })
}

/// Remix and resample a clip to the given stream format.
pub fn conform(clip: &PcmClip, format: StreamFormat) -> PcmClip {
    let remixed = remix_channels(clip, format.channels);
    resample(&remixed, format.sample_rate)
}

/// Raw little-endian sample bytes, ready for emission after a streaming
/// header.
pub fn sample_bytes(clip: &PcmClip) -> Vec<u8> {
    let mut out = Vec::with_capacity(clip.samples.len() * 2);
    for &s in &clip.samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}

/// RIFF header for a stream of unknown total length. Both size fields carry
/// the maximum representable value so players treat the payload as
/// unbounded.
pub fn streaming_wav_header(format: StreamFormat) -> Vec<u8> {
    let byte_rate =
        format.sample_rate * format.channels as u32 * (format.bits_per_sample as u32 / 8);
    let block_align = format.channels * (format.bits_per_sample / 8);

    let mut out = Vec::with_capacity(44);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&u32::MAX.to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&format.channels.to_le_bytes());
    out.extend_from_slice(&format.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&format.bits_per_sample.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&u32::MAX.to_le_bytes());
    out
}

fn remix_channels(clip: &PcmClip, channels: u16) -> PcmClip {
    if clip.channels == channels || clip.channels == 0 {
        return clip.clone();
    }
    let src = clip.channels as usize;
    let frames = clip.samples.len() / src;
    let mut mono = Vec::with_capacity(frames);
    for f in 0..frames {
        let sum: i32 = clip.samples[f * src..(f + 1) * src]
            .iter()
            .map(|&s| s as i32)
            .sum();
        mono.push((sum / src as i32) as i16);
    }
    let samples = if channels <= 1 {
        mono
    } else {
        let mut out = Vec::with_capacity(frames * channels as usize);
        for s in mono {
            for _ in 0..channels {
                out.push(s);
            }
        }
        out
    };
    PcmClip {
        samples,
        sample_rate: clip.sample_rate,
        channels: channels.max(1),
    }
}

fn resample(clip: &PcmClip, sample_rate: u32) -> PcmClip {
    if clip.sample_rate == sample_rate || clip.sample_rate == 0 {
        return PcmClip {
            samples: clip.samples.clone(),
            sample_rate,
            channels: clip.channels,
        };
    }
    let ch = clip.channels.max(1) as usize;
    let src_frames = clip.samples.len() / ch;
    if src_frames == 0 {
        return PcmClip {
            samples: Vec::new(),
            sample_rate,
            channels: clip.channels,
        };
    }
    let dst_frames = (src_frames as u64 * sample_rate as u64 / clip.sample_rate as u64) as usize;
    let mut samples = Vec::with_capacity(dst_frames * ch);
    for f in 0..dst_frames {
        let pos = f as f64 * clip.sample_rate as f64 / sample_rate as f64;
        let i0 = pos.floor() as usize;
        let i1 = (i0 + 1).min(src_frames - 1);
        let t = pos - i0 as f64;
        for c in 0..ch {
            let a = clip.samples[i0 * ch + c] as f64;
            let b = clip.samples[i1 * ch + c] as f64;
            samples.push((a + (b - a) * t).round() as i16);
        }
    }
    PcmClip {
        samples,
        sample_rate,
        channels: clip.channels,
    }
}
