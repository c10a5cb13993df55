// Compilation options shared by both front-ends.

use std::fmt;
use std::path::PathBuf;

use crate::CompileError;

/// Which side of the dictionary is read as input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Left to right: left side is input (analysis for monolingual dictionaries).
    #[default]
    Forward,
    /// Right to left: right side is input (generation).
    Reverse,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Reverse => write!(f, "reverse"),
        }
    }
}

/// Options threaded from the command line to the selected front-end.
///
/// Not every option applies to both front-ends: variants, boundaries and the
/// restriction file are markup-only, `extended_symbols` is flat-only.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub direction: Direction,
    /// Emit morpheme boundaries instead of dropping them.
    pub keep_boundaries: bool,
    /// Language variant (`v` entry attribute).
    pub variant: Option<String>,
    /// Alternative (`alt` entry attribute).
    pub alt: Option<String>,
    /// Left-side variant (`vl` entry attribute).
    pub variant_left: Option<String>,
    /// Right-side variant (`vr` entry attribute).
    pub variant_right: Option<String>,
    /// Analysis-chars file, applied in forward direction only.
    pub restriction: Option<PathBuf>,
    /// Accept multi-character symbols without angle brackets in flat sources.
    pub extended_symbols: bool,
    pub verbose: bool,
}

impl CompileOptions {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    /// Reject variant selectors that cannot apply to the chosen direction.
    ///
    /// A right variant alone makes no sense left to right, and a left
    /// variant alone makes no sense right to left.
    pub fn validate(&self) -> Result<(), CompileError> {
        match self.direction {
            Direction::Forward if self.variant_right.is_some() && self.variant_left.is_none() => {
                Err(CompileError::VariantConflict {
                    option: "right variant",
                    direction: self.direction,
                })
            }
            Direction::Reverse if self.variant_left.is_some() && self.variant_right.is_none() => {
                Err(CompileError::VariantConflict {
                    option: "left variant",
                    direction: self.direction,
                })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(CompileOptions::new(Direction::Forward).validate().is_ok());
        assert!(CompileOptions::new(Direction::Reverse).validate().is_ok());
    }

    #[test]
    fn right_variant_alone_conflicts_with_forward() {
        let mut options = CompileOptions::new(Direction::Forward);
        options.variant_right = Some("val".to_string());
        let err = options.validate().unwrap_err();
        assert!(matches!(
            err,
            CompileError::VariantConflict {
                direction: Direction::Forward,
                ..
            }
        ));
        assert_eq!(err.to_string(), "right variant specified, but direction is forward");

        options.variant_left = Some("cat".to_string());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn left_variant_alone_conflicts_with_reverse() {
        let mut options = CompileOptions::new(Direction::Reverse);
        options.variant_left = Some("val".to_string());
        assert!(options.validate().is_err());

        let mut options = CompileOptions::new(Direction::Forward);
        options.variant_left = Some("val".to_string());
        assert!(options.validate().is_ok());
    }
}
