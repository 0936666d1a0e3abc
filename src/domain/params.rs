//! Sketch sizing parameters.
//!
//! A count-min sketch is sized by its number of hash rows (`depth`) and the
//! number of counters per row (`width`). Both can be given directly, or
//! derived from a target accuracy via the standard bounds:
//!
//! - `width = ⌈e / error_margin⌉`
//! - `depth = ⌈ln(1 / certainty)⌉`
//!
//! Larger depth lowers the probability of exceeding the error bound; larger
//! width lowers the magnitude of overestimation.

use std::fmt;

/// Error returned when sketch sizing validation fails.
#[derive(Debug, Clone, PartialEq)]
pub enum SizingError {
    /// Depth (number of hash rows) must be at least 1
    ZeroDepth,
    /// Width (counters per row) must be at least 1
    ZeroWidth,
    /// Certainty must be a finite value strictly between 0 and 1
    InvalidCertainty(f64),
    /// Error margin must be a finite value strictly between 0 and 1
    InvalidErrorMargin(f64),
}

impl fmt::Display for SizingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizingError::ZeroDepth => write!(f, "sketch depth must be at least 1"),
            SizingError::ZeroWidth => write!(f, "sketch width must be at least 1"),
            SizingError::InvalidCertainty(v) => {
                write!(f, "certainty must be in (0, 1), got {}", v)
            }
            SizingError::InvalidErrorMargin(v) => {
                write!(f, "error margin must be in (0, 1), got {}", v)
            }
        }
    }
}

impl std::error::Error for SizingError {}

/// Validated dimensions of a count-min sketch.
///
/// Fixed for the process lifetime once a counter is constructed.
///
/// # Example
/// ```
/// use floodgate::SketchParams;
///
/// let direct = SketchParams::new(3, 4).unwrap();
/// assert_eq!((direct.depth(), direct.width()), (3, 4));
///
/// // 1% error margin, 1% residual failure probability
/// let derived = SketchParams::from_error_bounds(0.01, 0.01).unwrap();
/// assert_eq!(derived.depth(), 5); // ⌈ln(100)⌉
/// assert_eq!(derived.width(), 272); // ⌈e / 0.01⌉
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SketchParams {
    depth: usize,
    width: usize,
}

impl SketchParams {
    /// Create parameters from explicit dimensions.
    ///
    /// # Errors
    /// Returns `SizingError` if either dimension is zero.
    pub fn new(depth: usize, width: usize) -> Result<Self, SizingError> {
        if depth == 0 {
            return Err(SizingError::ZeroDepth);
        }
        if width == 0 {
            return Err(SizingError::ZeroWidth);
        }
        Ok(Self { depth, width })
    }

    /// Derive parameters from accuracy targets.
    ///
    /// `certainty` is the residual probability that the estimate exceeds the
    /// error bound; `error_margin` is the target maximum overestimation
    /// relative to the total number of updates. Both must lie strictly
    /// between 0 and 1.
    ///
    /// # Errors
    /// Returns `SizingError` if either value is non-finite or out of range.
    pub fn from_error_bounds(certainty: f64, error_margin: f64) -> Result<Self, SizingError> {
        if !certainty.is_finite() || certainty <= 0.0 || certainty >= 1.0 {
            return Err(SizingError::InvalidCertainty(certainty));
        }
        if !error_margin.is_finite() || error_margin <= 0.0 || error_margin >= 1.0 {
            return Err(SizingError::InvalidErrorMargin(error_margin));
        }

        let width = (std::f64::consts::E / error_margin).ceil() as usize;
        let depth = (1.0 / certainty).ln().ceil() as usize;

        // ceil of a positive value; both are >= 1 for inputs in (0, 1)
        Ok(Self {
            depth: depth.max(1),
            width,
        })
    }

    /// Number of hash rows.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of counters per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Total number of cells in the table.
    pub fn cells(&self) -> usize {
        self.depth * self.width
    }
}

impl Default for SketchParams {
    /// Default tuning: 5 rows of 25 counters.
    ///
    /// Small enough to dump legibly, wide enough for a handful of clients
    /// per decay window without meaningful collision error.
    fn default() -> Self {
        Self {
            depth: 5,
            width: 25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_dimensions() {
        let params = SketchParams::new(3, 4).unwrap();
        assert_eq!(params.depth(), 3);
        assert_eq!(params.width(), 4);
        assert_eq!(params.cells(), 12);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert_eq!(SketchParams::new(0, 4), Err(SizingError::ZeroDepth));
        assert_eq!(SketchParams::new(3, 0), Err(SizingError::ZeroWidth));
    }

    #[test]
    fn test_derivation_from_bounds() {
        // width = ⌈e / 0.01⌉ = 272, depth = ⌈ln(100)⌉ = 5
        let params = SketchParams::from_error_bounds(0.01, 0.01).unwrap();
        assert_eq!(params.depth(), 5);
        assert_eq!(params.width(), 272);
    }

    #[test]
    fn test_loose_bounds_still_positive() {
        // ln(1/0.9) ≈ 0.105 rounds up to a single row
        let params = SketchParams::from_error_bounds(0.9, 0.9).unwrap();
        assert_eq!(params.depth(), 1);
        assert!(params.width() >= 1);
    }

    #[test]
    fn test_tighter_margin_widens_table() {
        let loose = SketchParams::from_error_bounds(0.05, 0.1).unwrap();
        let tight = SketchParams::from_error_bounds(0.05, 0.001).unwrap();
        assert!(tight.width() > loose.width());
        assert_eq!(tight.depth(), loose.depth());
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        assert!(matches!(
            SketchParams::from_error_bounds(0.0, 0.01),
            Err(SizingError::InvalidCertainty(_))
        ));
        assert!(matches!(
            SketchParams::from_error_bounds(1.0, 0.01),
            Err(SizingError::InvalidCertainty(_))
        ));
        assert!(matches!(
            SketchParams::from_error_bounds(0.01, 0.0),
            Err(SizingError::InvalidErrorMargin(_))
        ));
        assert!(matches!(
            SketchParams::from_error_bounds(0.01, f64::NAN),
            Err(SizingError::InvalidErrorMargin(_))
        ));
        assert!(matches!(
            SketchParams::from_error_bounds(f64::INFINITY, 0.01),
            Err(SizingError::InvalidCertainty(_))
        ));
    }

    #[test]
    fn test_default_matches_documented_tuning() {
        let params = SketchParams::default();
        assert_eq!(params.depth(), 5);
        assert_eq!(params.width(), 25);
    }
}
