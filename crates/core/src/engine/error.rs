//! Engine error taxonomy
//!
//! Every failure mode of a run is enumerated here; the engine never panics
//! out of a deep stack. Local recoveries (clamped property envelopes,
//! defaulted optional fields) do not error — they warn through
//! `diagnostics.warnings` instead.

use thiserror::Error;

use crate::chemistry::PropertyError;
use crate::dispersion::DispersionError;
use crate::source::SourceError;

/// A run aborted; no partial result is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A request field failed validation.
    #[error("invalid input at {field}: {reason}")]
    InvalidInput {
        /// Dotted path of the offending field
        field: String,
        /// What was wrong with it
        reason: String,
    },
    /// The source geometry produces no physical release.
    #[error("infeasible source: {reason}")]
    InfeasibleSource {
        /// What made the geometry unworkable
        reason: String,
    },
    /// A property query left its fit envelope and extrapolation was off.
    #[error("{property} out of envelope at {value_k:.1} K (valid {min_k:.1}..{max_k:.1} K)")]
    ChemicalOutOfEnvelope {
        /// Which property table rejected the query
        property: String,
        /// Requested temperature (K)
        value_k: f64,
        /// Envelope lower bound (K)
        min_k: f64,
        /// Envelope upper bound (K)
        max_k: f64,
    },
    /// A non-finite value appeared mid-computation.
    #[error("non-finite value during {stage}")]
    Numerical {
        /// Pipeline stage that produced it
        stage: String,
    },
    /// The caller's cancellation token fired.
    #[error("run cancelled")]
    Cancelled,
}

impl From<SourceError> for EngineError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Infeasible { reason } => EngineError::InfeasibleSource { reason },
            SourceError::Property(PropertyError::OutOfEnvelope {
                property,
                value_k,
                min_k,
                max_k,
            }) => EngineError::ChemicalOutOfEnvelope { property, value_k, min_k, max_k },
        }
    }
}

impl From<DispersionError> for EngineError {
    fn from(err: DispersionError) -> Self {
        match err {
            DispersionError::Cancelled => EngineError::Cancelled,
            DispersionError::NonFinite => {
                EngineError::Numerical { stage: "dispersion".to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_mapping() {
        let err: EngineError =
            SourceError::Infeasible { reason: "tank below ambient".to_owned() }.into();
        assert!(matches!(err, EngineError::InfeasibleSource { .. }));
        assert!(err.to_string().contains("tank below ambient"));
    }

    #[test]
    fn test_dispersion_error_mapping() {
        assert_eq!(EngineError::from(DispersionError::Cancelled), EngineError::Cancelled);
        assert!(matches!(
            EngineError::from(DispersionError::NonFinite),
            EngineError::Numerical { .. }
        ));
    }

    #[test]
    fn test_invalid_input_names_the_field() {
        let err = EngineError::InvalidInput {
            field: "weather.wind_direction".to_owned(),
            reason: "must be in [0, 360)".to_owned(),
        };
        let text = err.to_string();
        assert!(text.contains("weather.wind_direction"));
        assert!(text.contains("[0, 360)"));
    }
}
