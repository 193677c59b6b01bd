//! Compression oracle.
//!
//! The engine only ever needs one number from a compressor: the length of
//! its output. [`Compressor`] exposes that, and [`Codec`] implements it for
//! the shipped codecs (Zstandard via `zstd`, bzip2 via `bzip2`, raw DEFLATE
//! via `flate2`).
//!
//! # Window size
//!
//! NCD only sees similarity the encoder can reach: while compressing `b` in
//! `a ++ b`, the encoder must still be able to match against `a`. Zstandard
//! at the default level keeps an 8 MiB window and bzip2 sorts blocks of up
//! to 900 kB, so both work for ordinary text files. DEFLATE looks back at
//! most 32 KiB; once `a` is longer than that, `C(ab)` approaches
//! `C(a) + C(b)` and near-duplicates score like unrelated files. Use it
//! only for small inputs.
//!
//! Output bytes are counted, never kept: the encoder writes into a
//! [`ByteCounter`] sink, so a pair evaluation allocates nothing beyond the
//! encoder's own state.
//!
//! # Determinism
//!
//! A [`Codec`] holds only its kind and level. Every call builds a fresh
//! encoder, so identical input always yields the identical length and the
//! oracle can be shared across worker threads without locking.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use bzip2::write::BzEncoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use serde::Deserialize;
use thiserror::Error;

/// Failure reported by the underlying encoder.
#[derive(Debug, Error)]
pub enum CompressError {
    #[error("{codec} encoder failed: {source}")]
    Encode {
        codec: CodecKind,
        #[source]
        source: io::Error,
    },
    #[error("{codec} does not support level {level} (valid: {min}..={max})")]
    InvalidLevel {
        codec: CodecKind,
        level: i32,
        min: i32,
        max: i32,
    },
    #[error("unknown compressor '{0}'. Must be zstd, bzip2 or deflate.")]
    UnknownCodec(String),
}

/// Anything that can report the compressed length of a byte sequence.
///
/// Implementations must be deterministic and free of shared mutable state;
/// the dispatcher calls them from many threads at once.
pub trait Compressor: Sync {
    /// Compressed length of the concatenation of `parts`, in order.
    fn compressed_len_chain(&self, parts: &[&[u8]]) -> Result<u64, CompressError>;

    /// Compressed length of `data` alone.
    fn compressed_len(&self, data: &[u8]) -> Result<u64, CompressError> {
        self.compressed_len_chain(&[data])
    }
}

/// Supported codec families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    /// Zstandard, 8 MiB window at the default level.
    #[default]
    Zstd,
    /// bzip2, 100-900 kB blocks depending on level.
    Bzip2,
    /// Raw DEFLATE. 32 KiB window, see the module docs.
    Deflate,
}

impl CodecKind {
    /// Level used when none is configured.
    pub fn default_level(self) -> i32 {
        match self {
            CodecKind::Zstd => 19,
            CodecKind::Bzip2 => 9,
            CodecKind::Deflate => 9,
        }
    }

    /// Inclusive range of accepted levels.
    pub fn level_range(self) -> (i32, i32) {
        match self {
            CodecKind::Zstd => (1, 22),
            CodecKind::Bzip2 => (1, 9),
            CodecKind::Deflate => (0, 9),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecKind::Zstd => f.write_str("zstd"),
            CodecKind::Bzip2 => f.write_str("bzip2"),
            CodecKind::Deflate => f.write_str("deflate"),
        }
    }
}

impl FromStr for CodecKind {
    type Err = CompressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zstd" => Ok(CodecKind::Zstd),
            "bzip2" | "bz2" => Ok(CodecKind::Bzip2),
            "deflate" => Ok(CodecKind::Deflate),
            _ => Err(CompressError::UnknownCodec(s.to_string())),
        }
    }
}

/// A codec at a fixed level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    kind: CodecKind,
    level: i32,
}

impl Codec {
    /// Create a codec, validating `level` against the codec's range.
    ///
    /// `None` selects [`CodecKind::default_level`].
    pub fn new(kind: CodecKind, level: Option<i32>) -> Result<Self, CompressError> {
        let level = level.unwrap_or_else(|| kind.default_level());
        let (min, max) = kind.level_range();
        if !(min..=max).contains(&level) {
            return Err(CompressError::InvalidLevel {
                codec: kind,
                level,
                min,
                max,
            });
        }
        Ok(Self { kind, level })
    }

    pub fn kind(&self) -> CodecKind {
        self.kind
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    fn encode(&self, parts: &[&[u8]]) -> io::Result<u64> {
        match self.kind {
            CodecKind::Zstd => {
                let mut enc = zstd::stream::write::Encoder::new(ByteCounter::default(), self.level)?;
                for part in parts {
                    enc.write_all(part)?;
                }
                Ok(enc.finish()?.count)
            }
            CodecKind::Bzip2 => {
                let mut enc = BzEncoder::new(
                    ByteCounter::default(),
                    bzip2::Compression::new(self.level as u32),
                );
                for part in parts {
                    enc.write_all(part)?;
                }
                Ok(enc.finish()?.count)
            }
            CodecKind::Deflate => {
                let mut enc =
                    DeflateEncoder::new(ByteCounter::default(), Compression::new(self.level as u32));
                for part in parts {
                    enc.write_all(part)?;
                }
                Ok(enc.finish()?.count)
            }
        }
    }
}

impl Default for Codec {
    fn default() -> Self {
        let kind = CodecKind::default();
        Self {
            kind,
            level: kind.default_level(),
        }
    }
}

impl Compressor for Codec {
    fn compressed_len_chain(&self, parts: &[&[u8]]) -> Result<u64, CompressError> {
        self.encode(parts).map_err(|source| CompressError::Encode {
            codec: self.kind,
            source,
        })
    }
}

/// Write sink that discards bytes and counts them.
#[derive(Debug, Default)]
struct ByteCounter {
    count: u64,
}

impl Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.count += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"the quick brown fox jumps over the lazy dog. \
        the quick brown fox jumps over the lazy dog again.";

    #[test]
    fn test_deterministic() {
        for kind in [CodecKind::Zstd, CodecKind::Bzip2, CodecKind::Deflate] {
            let codec = Codec::new(kind, None).unwrap();
            let a = codec.compressed_len(SAMPLE).unwrap();
            let b = codec.compressed_len(SAMPLE).unwrap();
            assert_eq!(a, b, "{} not deterministic", kind);
            assert!(a > 0);
        }
    }

    #[test]
    fn test_redundant_input_compresses_smaller() {
        let codec = Codec::default();
        let repetitive = vec![b'a'; 4096];
        let varied: Vec<u8> = (0..4096u32)
            .map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8)
            .collect();
        let r = codec.compressed_len(&repetitive).unwrap();
        let v = codec.compressed_len(&varied).unwrap();
        assert!(r < v, "repetitive={} varied={}", r, v);
    }

    #[test]
    fn test_chain_of_one_matches_single() {
        let codec = Codec::new(CodecKind::Zstd, Some(3)).unwrap();
        assert_eq!(
            codec.compressed_len_chain(&[SAMPLE]).unwrap(),
            codec.compressed_len(SAMPLE).unwrap()
        );
    }

    #[test]
    fn test_empty_input() {
        let codec = Codec::default();
        // A finished stream still carries framing.
        assert!(codec.compressed_len(b"").is_ok());
    }

    #[test]
    fn test_level_validation() {
        assert!(Codec::new(CodecKind::Deflate, Some(10)).is_err());
        assert!(Codec::new(CodecKind::Deflate, Some(0)).is_ok());
        assert!(Codec::new(CodecKind::Zstd, Some(0)).is_err());
        assert!(Codec::new(CodecKind::Zstd, Some(22)).is_ok());
        assert!(Codec::new(CodecKind::Bzip2, Some(0)).is_err());
        assert!(Codec::new(CodecKind::Bzip2, Some(1)).is_ok());
        let err = Codec::new(CodecKind::Zstd, Some(40)).unwrap_err();
        assert!(err.to_string().contains("1..=22"));
    }

    #[test]
    fn test_codec_kind_parse() {
        assert_eq!("deflate".parse::<CodecKind>().unwrap(), CodecKind::Deflate);
        assert_eq!(" ZSTD ".parse::<CodecKind>().unwrap(), CodecKind::Zstd);
        assert_eq!("bz2".parse::<CodecKind>().unwrap(), CodecKind::Bzip2);
        assert_eq!("bzip2".parse::<CodecKind>().unwrap(), CodecKind::Bzip2);
        assert!("lzma".parse::<CodecKind>().is_err());
    }

    #[test]
    fn test_default_codec() {
        let codec = Codec::default();
        assert_eq!(codec.kind(), CodecKind::Zstd);
        assert_eq!(codec.level(), 19);
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for kind in [CodecKind::Zstd, CodecKind::Bzip2, CodecKind::Deflate] {
            assert_eq!(kind.to_string().parse::<CodecKind>().unwrap(), kind);
        }
    }
}
