//! Shared types for the replication feature.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Default number of days before the deal's start boundary.
pub const DEFAULT_DELAY_START_DAYS: i64 = 3;

pub const MIN_DELAY_START_DAYS: i64 = 1;
pub const MAX_DELAY_START_DAYS: i64 = 14;

pub const MIN_ADVANCE_END_DAYS: i64 = 0;
pub const MAX_ADVANCE_END_DAYS: i64 = 20;

/// Deal timing parameters supplied by the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DealParams {
    /// Days until the deal must start (1-14).
    pub delay_start_days: i64,
    /// Days subtracted from the dataset's deal duration to advance the deal
    /// end (0-20).
    pub advance_end_days: i64,
}

impl Default for DealParams {
    fn default() -> Self {
        Self {
            delay_start_days: DEFAULT_DELAY_START_DAYS,
            advance_end_days: 0,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DealParamsError {
    #[error("delay_start_days must be between {MIN_DELAY_START_DAYS} and {MAX_DELAY_START_DAYS}")]
    DelayOutOfRange,

    #[error("advance_end_days must be between {MIN_ADVANCE_END_DAYS} and {MAX_ADVANCE_END_DAYS}")]
    AdvanceOutOfRange,
}

impl DealParams {
    /// Build params from optional caller input, applying defaults and bounds.
    pub fn new(
        delay_start_days: Option<i64>,
        advance_end_days: Option<i64>,
    ) -> Result<Self, DealParamsError> {
        let delay = delay_start_days.unwrap_or(DEFAULT_DELAY_START_DAYS);
        if !(MIN_DELAY_START_DAYS..=MAX_DELAY_START_DAYS).contains(&delay) {
            return Err(DealParamsError::DelayOutOfRange);
        }

        let advance = advance_end_days.unwrap_or(0);
        if !(MIN_ADVANCE_END_DAYS..=MAX_ADVANCE_END_DAYS).contains(&advance) {
            return Err(DealParamsError::AdvanceOutOfRange);
        }

        Ok(Self {
            delay_start_days: delay,
            advance_end_days: advance,
        })
    }
}

/// A content piece eligible for a new replication, joined with the dataset
/// policy and profile flags needed to build the deal request.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EligibleContent {
    pub piece_cid: String,
    pub payload_cid: String,
    pub size: i64,
    pub padded_size: i64,
    pub dataset_id: i64,
    pub dataset_name: String,
    pub deal_duration_days: i64,
    pub unsealed: bool,
    pub indexed: bool,
}

/// An eligible piece paired with the wallet that will fund its deal.
#[derive(Debug, Clone)]
pub struct DealCandidate {
    pub content: EligibleContent,
    pub wallet_address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_defaults() {
        let params = DealParams::new(None, None).unwrap();
        assert_eq!(params.delay_start_days, DEFAULT_DELAY_START_DAYS);
        assert_eq!(params.advance_end_days, 0);
    }

    #[test]
    fn test_params_bounds() {
        assert!(DealParams::new(Some(1), Some(0)).is_ok());
        assert!(DealParams::new(Some(14), Some(20)).is_ok());
        assert_eq!(
            DealParams::new(Some(0), None),
            Err(DealParamsError::DelayOutOfRange)
        );
        assert_eq!(
            DealParams::new(Some(15), None),
            Err(DealParamsError::DelayOutOfRange)
        );
        assert_eq!(
            DealParams::new(None, Some(-1)),
            Err(DealParamsError::AdvanceOutOfRange)
        );
        assert_eq!(
            DealParams::new(None, Some(21)),
            Err(DealParamsError::AdvanceOutOfRange)
        );
    }
}
