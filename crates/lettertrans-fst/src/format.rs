// Artifact header: magic marker, feature flags, layout detection.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::LtError;
use crate::compression::read_u64_le;

/// Magic marker opening every artifact written in the versioned layout.
pub const MAGIC: [u8; 4] = *b"LTTB";

/// Transitions and finals carry `f64` weights.
pub const FEATURE_WEIGHTS: u64 = 1 << 0;

/// Smallest feature value this implementation does not understand.
/// Any flag word at or above it makes an artifact unreadable.
pub const FEATURE_UNKNOWN: u64 = 1 << 1;

/// Features written by this implementation.
pub const CURRENT_FEATURES: u64 = FEATURE_WEIGHTS;

/// Binary layout of an artifact, resolved once before decoding the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    /// No header: the body starts at the first byte, no optional features.
    Legacy,
    /// Magic marker followed by a little-endian feature flag word.
    Versioned { features: u64 },
}

impl FormatVersion {
    /// Feature flags in effect for the body. Legacy data has none.
    pub fn features(self) -> u64 {
        match self {
            FormatVersion::Legacy => 0,
            FormatVersion::Versioned { features } => features,
        }
    }

    /// Resolve the layout at the current stream position.
    ///
    /// Peeks four bytes: when they are [`MAGIC`] the header is consumed and
    /// the feature word checked, otherwise the stream is rewound to where it
    /// was and the data is treated as legacy.
    pub fn detect<R: Read + Seek>(r: &mut R) -> Result<Self, LtError> {
        let start = r.stream_position()?;
        let mut marker = [0u8; 4];
        let matched = match r.read_exact(&mut marker) {
            Ok(()) => marker == MAGIC,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => false,
            Err(e) => return Err(LtError::Io(e)),
        };

        if !matched {
            r.seek(SeekFrom::Start(start))?;
            return Ok(FormatVersion::Legacy);
        }

        let features = read_u64_le(r)?;
        if features >= FEATURE_UNKNOWN {
            return Err(LtError::UpgradeRequired { features });
        }
        Ok(FormatVersion::Versioned { features })
    }

    /// Write the header for this layout. Legacy writes nothing.
    pub fn write<W: Write + ?Sized>(self, w: &mut W) -> Result<(), LtError> {
        if let FormatVersion::Versioned { features } = self {
            w.write_all(&MAGIC)?;
            w.write_all(&features.to_le_bytes())?;
        }
        Ok(())
    }
}
