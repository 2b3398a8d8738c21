//! Scorer
//!
//! Computes a comparative impact score per log group under one of two
//! modes, then apportions percentages and (optionally) cost.
//!
//! - **normalized** (default): share of provisioned disk plus share of
//!   provisioned heap
//! - **weighted**: operator-tuned linear combination of raw metrics

mod scorer;
mod weights;

pub use scorer::{
    normalized_score, score_groups, weighted_score, Caveat, ScoreReport, ScoredGroup,
};
pub use weights::{ScoreMode, ScoringOptions, Weights};
