//! Candlestick pattern recognizers
//!
//! One recognizer per pattern, each exposing the same two operations:
//! `lookback` (how many prior bars the computation consumes) and
//! `compute_into` (one signed strength code per requested bar).
//!
//! # Pattern Categories
//!
//! - **Single-bar (17)**: Doji variants, Hammer family, Marubozu, etc.
//! - **Two-bar (15)**: Engulfing, Harami, Piercing, Kicking, etc.
//! - **Three-bar (22)**: Morning/Evening Star, Three Soldiers/Crows, etc.
//! - **Multi-bar (6)**: Breakaway, Mat Hold, the latched Hikkake, etc.

/// Generate `with_defaults()` -> `Self::default()` for multiple recognizer types.
macro_rules! impl_with_defaults {
  ($($recognizer:ty),* $(,)?) => {
    $(impl $recognizer {
      pub fn with_defaults() -> Self { Self::default() }
    })*
  };
}

pub mod multi_bar;
pub mod single_bar;
pub mod three_bar;
pub mod two_bar;

// Re-export all recognizers for convenience
pub use multi_bar::*;
pub use single_bar::*;
pub use three_bar::*;
pub use two_bar::*;
