//! Two-bar candlestick pattern recognizers
//!
//! Patterns: CDLENGULFING, CDLHARAMI, CDLHARAMICROSS, CDLPIERCING,
//! CDLDARKCLOUDCOVER, CDLDOJISTAR, CDLCOUNTERATTACK, CDLINNECK, CDLONNECK,
//! CDLTHRUSTING, CDLKICKING, CDLKICKINGBYLENGTH, CDLMATCHINGLOW,
//! CDLHOMINGPIGEON, CDLSEPARATINGLINES
//!
//! Body containment and engulfment comparisons are strict; "equal" price
//! comparisons are inclusive within the Equal tolerance band.

use crate::settings::CandleConfig;
use crate::settings::SettingKind::{
  BodyDoji, BodyLong, BodyShort, Equal, ShadowVeryShort,
};
use crate::window::{lookback_for, run_recognizer, Need};
use crate::{CandleRecognizer, OHLCVExt, OutSpan, PatternId, Penetration, Result, OHLCV};

impl_with_defaults!(
  EngulfingRecognizer,
  HaramiRecognizer,
  HaramiCrossRecognizer,
  PiercingRecognizer,
  DojiStarRecognizer,
  CounterattackRecognizer,
  InNeckRecognizer,
  OnNeckRecognizer,
  ThrustingRecognizer,
  KickingRecognizer,
  KickingByLengthRecognizer,
  MatchingLowRecognizer,
  HomingPigeonRecognizer,
  SeparatingLinesRecognizer,
);

// ============================================================
// ENGULFING / HARAMI
// ============================================================

/// CDLENGULFING - Engulfing Pattern
#[derive(Debug, Clone, Copy, Default)]
pub struct EngulfingRecognizer;

impl CandleRecognizer for EngulfingRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_ENGULFING")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &[], 2)
  }

  fn compute_into<T: OHLCV>(
    &self,
    config: &CandleConfig,
    bars: &[T],
    start_idx: usize,
    end_idx: usize,
    out: &mut [i32],
  ) -> Result<OutSpan> {
    let lookback = self.lookback(config);
    run_recognizer(config, bars, start_idx, end_idx, lookback, &[], out, |_, i| {
      let first = &bars[i - 1];
      let second = &bars[i];
      // White engulfing black
      if second.is_white()
        && first.is_black()
        && second.close() > first.open()
        && second.open() < first.close()
      {
        return 100;
      }
      // Black engulfing white
      if second.is_black()
        && first.is_white()
        && second.open() > first.close()
        && second.close() < first.open()
      {
        return -100;
      }
      0
    })
  }
}

/// CDLHARAMI - Harami Pattern
#[derive(Debug, Clone, Copy, Default)]
pub struct HaramiRecognizer;

const HARAMI_NEEDS: [Need; 2] = [Need::at(BodyLong, 1), Need::at(BodyShort, 0)];

impl CandleRecognizer for HaramiRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_HARAMI")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &HARAMI_NEEDS, 1)
  }

  fn compute_into<T: OHLCV>(
    &self,
    config: &CandleConfig,
    bars: &[T],
    start_idx: usize,
    end_idx: usize,
    out: &mut [i32],
  ) -> Result<OutSpan> {
    let lookback = self.lookback(config);
    run_recognizer(config, bars, start_idx, end_idx, lookback, &HARAMI_NEEDS, out, |w, i| {
      let first = &bars[i - 1];
      let second = &bars[i];
      // Long first body, short second body strictly inside the first
      if first.real_body() > w.avg(BodyLong, 1, i)
        && second.real_body() <= w.avg(BodyShort, 0, i)
        && second.body_top() < first.body_top()
        && second.body_bottom() > first.body_bottom()
      {
        -first.candle_color() * 100
      } else {
        0
      }
    })
  }
}

/// CDLHARAMICROSS - Harami Cross (second bar is a doji)
#[derive(Debug, Clone, Copy, Default)]
pub struct HaramiCrossRecognizer;

const HARAMI_CROSS_NEEDS: [Need; 2] = [Need::at(BodyLong, 1), Need::at(BodyDoji, 0)];

impl CandleRecognizer for HaramiCrossRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_HARAMICROSS")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &HARAMI_CROSS_NEEDS, 1)
  }

  fn compute_into<T: OHLCV>(
    &self,
    config: &CandleConfig,
    bars: &[T],
    start_idx: usize,
    end_idx: usize,
    out: &mut [i32],
  ) -> Result<OutSpan> {
    let lookback = self.lookback(config);
    run_recognizer(config, bars, start_idx, end_idx, lookback, &HARAMI_CROSS_NEEDS, out, |w, i| {
      let first = &bars[i - 1];
      let second = &bars[i];
      if first.real_body() > w.avg(BodyLong, 1, i)
        && second.real_body() <= w.avg(BodyDoji, 0, i)
        && second.body_top() < first.body_top()
        && second.body_bottom() > first.body_bottom()
      {
        -first.candle_color() * 100
      } else {
        0
      }
    })
  }
}

// ============================================================
// PIERCING / DARK CLOUD COVER
// ============================================================

/// CDLPIERCING - Piercing Pattern
#[derive(Debug, Clone, Copy, Default)]
pub struct PiercingRecognizer;

const PIERCING_NEEDS: [Need; 2] = [Need::at(BodyLong, 1), Need::at(BodyLong, 0)];

impl CandleRecognizer for PiercingRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_PIERCING")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &PIERCING_NEEDS, 1)
  }

  fn compute_into<T: OHLCV>(
    &self,
    config: &CandleConfig,
    bars: &[T],
    start_idx: usize,
    end_idx: usize,
    out: &mut [i32],
  ) -> Result<OutSpan> {
    let lookback = self.lookback(config);
    run_recognizer(config, bars, start_idx, end_idx, lookback, &PIERCING_NEEDS, out, |w, i| {
      let first = &bars[i - 1];
      let second = &bars[i];
      // Long black, then long white opening below the prior low and closing
      // above the prior body midpoint without closing the body
      if first.is_black()
        && first.real_body() > w.avg(BodyLong, 1, i)
        && second.is_white()
        && second.real_body() > w.avg(BodyLong, 0, i)
        && second.open() < first.low()
        && second.close() < first.open()
        && second.close() > first.close() + first.real_body() * 0.5
      {
        100
      } else {
        0
      }
    })
  }
}

/// CDLDARKCLOUDCOVER - Dark Cloud Cover
#[derive(Debug, Clone, Copy)]
pub struct DarkCloudCoverRecognizer {
  pub penetration: Penetration,
}

impl Default for DarkCloudCoverRecognizer {
  fn default() -> Self {
    Self { penetration: Penetration::new_const(0.5) }
  }
}

impl DarkCloudCoverRecognizer {
  pub fn with_defaults() -> Self {
    Self::default()
  }

  pub fn new(penetration: f64) -> Result<Self> {
    Ok(Self { penetration: Penetration::new(penetration)? })
  }
}

const DARK_CLOUD_NEEDS: [Need; 1] = [Need::at(BodyLong, 1)];

impl CandleRecognizer for DarkCloudCoverRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_DARKCLOUDCOVER")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &DARK_CLOUD_NEEDS, 1)
  }

  fn compute_into<T: OHLCV>(
    &self,
    config: &CandleConfig,
    bars: &[T],
    start_idx: usize,
    end_idx: usize,
    out: &mut [i32],
  ) -> Result<OutSpan> {
    let lookback = self.lookback(config);
    let penetration = self.penetration.get();
    run_recognizer(config, bars, start_idx, end_idx, lookback, &DARK_CLOUD_NEEDS, out, |w, i| {
      let first = &bars[i - 1];
      let second = &bars[i];
      // Long white, then black opening above the prior high and closing
      // into the prior body past the penetration depth
      if first.is_white()
        && first.real_body() > w.avg(BodyLong, 1, i)
        && second.is_black()
        && second.open() > first.high()
        && second.close() > first.open()
        && second.close() < first.close() - first.real_body() * penetration
      {
        -100
      } else {
        0
      }
    })
  }
}

// ============================================================
// DOJI STAR / COUNTERATTACK
// ============================================================

/// CDLDOJISTAR - Doji Star
#[derive(Debug, Clone, Copy, Default)]
pub struct DojiStarRecognizer;

const DOJI_STAR_NEEDS: [Need; 2] = [Need::at(BodyLong, 1), Need::at(BodyDoji, 0)];

impl CandleRecognizer for DojiStarRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_DOJISTAR")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &DOJI_STAR_NEEDS, 1)
  }

  fn compute_into<T: OHLCV>(
    &self,
    config: &CandleConfig,
    bars: &[T],
    start_idx: usize,
    end_idx: usize,
    out: &mut [i32],
  ) -> Result<OutSpan> {
    let lookback = self.lookback(config);
    run_recognizer(config, bars, start_idx, end_idx, lookback, &DOJI_STAR_NEEDS, out, |w, i| {
      let first = &bars[i - 1];
      let second = &bars[i];
      // Long first body, doji gapping away in the direction of the first bar
      if first.real_body() > w.avg(BodyLong, 1, i)
        && second.real_body() <= w.avg(BodyDoji, 0, i)
        && ((first.is_white() && second.real_body_gap_up(first))
          || (first.is_black() && second.real_body_gap_down(first)))
      {
        -first.candle_color() * 100
      } else {
        0
      }
    })
  }
}

/// CDLCOUNTERATTACK - Counterattack
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterattackRecognizer;

const COUNTERATTACK_NEEDS: [Need; 3] = [
  Need::at(Equal, 1),
  Need::at(BodyLong, 1),
  Need::at(BodyLong, 0),
];

impl CandleRecognizer for CounterattackRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_COUNTERATTACK")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &COUNTERATTACK_NEEDS, 1)
  }

  fn compute_into<T: OHLCV>(
    &self,
    config: &CandleConfig,
    bars: &[T],
    start_idx: usize,
    end_idx: usize,
    out: &mut [i32],
  ) -> Result<OutSpan> {
    let lookback = self.lookback(config);
    run_recognizer(config, bars, start_idx, end_idx, lookback, &COUNTERATTACK_NEEDS, out, |w, i| {
      let first = &bars[i - 1];
      let second = &bars[i];
      let equal = w.avg(Equal, 1, i);
      // Opposite long bodies closing at the same price
      if second.candle_color() == -first.candle_color()
        && first.real_body() > w.avg(BodyLong, 1, i)
        && second.real_body() > w.avg(BodyLong, 0, i)
        && second.close() <= first.close() + equal
        && second.close() >= first.close() - equal
      {
        second.candle_color() * 100
      } else {
        0
      }
    })
  }
}

// ============================================================
// NECK LINES / THRUSTING
// ============================================================

/// CDLINNECK - In-Neck Pattern
#[derive(Debug, Clone, Copy, Default)]
pub struct InNeckRecognizer;

const IN_NECK_NEEDS: [Need; 2] = [Need::at(Equal, 1), Need::at(BodyLong, 1)];

impl CandleRecognizer for InNeckRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_INNECK")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &IN_NECK_NEEDS, 1)
  }

  fn compute_into<T: OHLCV>(
    &self,
    config: &CandleConfig,
    bars: &[T],
    start_idx: usize,
    end_idx: usize,
    out: &mut [i32],
  ) -> Result<OutSpan> {
    let lookback = self.lookback(config);
    run_recognizer(config, bars, start_idx, end_idx, lookback, &IN_NECK_NEEDS, out, |w, i| {
      let first = &bars[i - 1];
      let second = &bars[i];
      // Long black, then white opening below the prior low and closing just
      // barely into the prior body
      if first.is_black()
        && first.real_body() > w.avg(BodyLong, 1, i)
        && second.is_white()
        && second.open() < first.low()
        && second.close() <= first.close() + w.avg(Equal, 1, i)
        && second.close() >= first.close()
      {
        -100
      } else {
        0
      }
    })
  }
}

/// CDLONNECK - On-Neck Pattern
#[derive(Debug, Clone, Copy, Default)]
pub struct OnNeckRecognizer;

const ON_NECK_NEEDS: [Need; 2] = [Need::at(Equal, 1), Need::at(BodyLong, 1)];

impl CandleRecognizer for OnNeckRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_ONNECK")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &ON_NECK_NEEDS, 1)
  }

  fn compute_into<T: OHLCV>(
    &self,
    config: &CandleConfig,
    bars: &[T],
    start_idx: usize,
    end_idx: usize,
    out: &mut [i32],
  ) -> Result<OutSpan> {
    let lookback = self.lookback(config);
    run_recognizer(config, bars, start_idx, end_idx, lookback, &ON_NECK_NEEDS, out, |w, i| {
      let first = &bars[i - 1];
      let second = &bars[i];
      let equal = w.avg(Equal, 1, i);
      // Long black, then white opening below the prior low and closing at
      // the prior low
      if first.is_black()
        && first.real_body() > w.avg(BodyLong, 1, i)
        && second.is_white()
        && second.open() < first.low()
        && second.close() <= first.low() + equal
        && second.close() >= first.low() - equal
      {
        -100
      } else {
        0
      }
    })
  }
}

/// CDLTHRUSTING - Thrusting Pattern
#[derive(Debug, Clone, Copy, Default)]
pub struct ThrustingRecognizer;

const THRUSTING_NEEDS: [Need; 2] = [Need::at(Equal, 1), Need::at(BodyLong, 1)];

impl CandleRecognizer for ThrustingRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_THRUSTING")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &THRUSTING_NEEDS, 1)
  }

  fn compute_into<T: OHLCV>(
    &self,
    config: &CandleConfig,
    bars: &[T],
    start_idx: usize,
    end_idx: usize,
    out: &mut [i32],
  ) -> Result<OutSpan> {
    let lookback = self.lookback(config);
    run_recognizer(config, bars, start_idx, end_idx, lookback, &THRUSTING_NEEDS, out, |w, i| {
      let first = &bars[i - 1];
      let second = &bars[i];
      // Closes above the in-neck band but below the prior body midpoint
      if first.is_black()
        && first.real_body() > w.avg(BodyLong, 1, i)
        && second.is_white()
        && second.open() < first.low()
        && second.close() > first.close() + w.avg(Equal, 1, i)
        && second.close() <= first.close() + first.real_body() * 0.5
      {
        -100
      } else {
        0
      }
    })
  }
}

// ============================================================
// KICKING
// ============================================================

const KICKING_NEEDS: [Need; 4] = [
  Need::at(BodyLong, 1),
  Need::at(BodyLong, 0),
  Need::at(ShadowVeryShort, 1),
  Need::at(ShadowVeryShort, 0),
];

/// Shared shape test for both kicking variants: two opposite marubozu with a
/// full-range gap in the direction of the second.
fn kicking_shape<T: OHLCV>(w: &crate::window::WindowSet<'_, T>, bars: &[T], i: usize) -> bool {
  let first = &bars[i - 1];
  let second = &bars[i];
  second.candle_color() == -first.candle_color()
    && first.real_body() > w.avg(BodyLong, 1, i)
    && first.upper_shadow() < w.avg(ShadowVeryShort, 1, i)
    && first.lower_shadow() < w.avg(ShadowVeryShort, 1, i)
    && second.real_body() > w.avg(BodyLong, 0, i)
    && second.upper_shadow() < w.avg(ShadowVeryShort, 0, i)
    && second.lower_shadow() < w.avg(ShadowVeryShort, 0, i)
    && ((first.is_black() && second.candle_gap_up(first))
      || (first.is_white() && second.candle_gap_down(first)))
}

/// CDLKICKING - Kicking
#[derive(Debug, Clone, Copy, Default)]
pub struct KickingRecognizer;

impl CandleRecognizer for KickingRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_KICKING")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &KICKING_NEEDS, 1)
  }

  fn compute_into<T: OHLCV>(
    &self,
    config: &CandleConfig,
    bars: &[T],
    start_idx: usize,
    end_idx: usize,
    out: &mut [i32],
  ) -> Result<OutSpan> {
    let lookback = self.lookback(config);
    run_recognizer(config, bars, start_idx, end_idx, lookback, &KICKING_NEEDS, out, |w, i| {
      if kicking_shape(w, bars, i) {
        bars[i].candle_color() * 100
      } else {
        0
      }
    })
  }
}

/// CDLKICKINGBYLENGTH - Kicking, direction set by the longer marubozu
#[derive(Debug, Clone, Copy, Default)]
pub struct KickingByLengthRecognizer;

impl CandleRecognizer for KickingByLengthRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_KICKINGBYLENGTH")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &KICKING_NEEDS, 1)
  }

  fn compute_into<T: OHLCV>(
    &self,
    config: &CandleConfig,
    bars: &[T],
    start_idx: usize,
    end_idx: usize,
    out: &mut [i32],
  ) -> Result<OutSpan> {
    let lookback = self.lookback(config);
    run_recognizer(config, bars, start_idx, end_idx, lookback, &KICKING_NEEDS, out, |w, i| {
      if kicking_shape(w, bars, i) {
        let longer = if bars[i].real_body() > bars[i - 1].real_body() { i } else { i - 1 };
        bars[longer].candle_color() * 100
      } else {
        0
      }
    })
  }
}

// ============================================================
// MATCHING LOW / HOMING PIGEON / SEPARATING LINES
// ============================================================

/// CDLMATCHINGLOW - Matching Low
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchingLowRecognizer;

const MATCHING_LOW_NEEDS: [Need; 1] = [Need::at(Equal, 1)];

impl CandleRecognizer for MatchingLowRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_MATCHINGLOW")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &MATCHING_LOW_NEEDS, 1)
  }

  fn compute_into<T: OHLCV>(
    &self,
    config: &CandleConfig,
    bars: &[T],
    start_idx: usize,
    end_idx: usize,
    out: &mut [i32],
  ) -> Result<OutSpan> {
    let lookback = self.lookback(config);
    run_recognizer(config, bars, start_idx, end_idx, lookback, &MATCHING_LOW_NEEDS, out, |w, i| {
      let first = &bars[i - 1];
      let second = &bars[i];
      let equal = w.avg(Equal, 1, i);
      // Two black bars closing at the same level
      if first.is_black()
        && second.is_black()
        && second.close() <= first.close() + equal
        && second.close() >= first.close() - equal
      {
        100
      } else {
        0
      }
    })
  }
}

/// CDLHOMINGPIGEON - Homing Pigeon
#[derive(Debug, Clone, Copy, Default)]
pub struct HomingPigeonRecognizer;

const HOMING_PIGEON_NEEDS: [Need; 2] = [Need::at(BodyLong, 1), Need::at(BodyShort, 0)];

impl CandleRecognizer for HomingPigeonRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_HOMINGPIGEON")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &HOMING_PIGEON_NEEDS, 1)
  }

  fn compute_into<T: OHLCV>(
    &self,
    config: &CandleConfig,
    bars: &[T],
    start_idx: usize,
    end_idx: usize,
    out: &mut [i32],
  ) -> Result<OutSpan> {
    let lookback = self.lookback(config);
    run_recognizer(config, bars, start_idx, end_idx, lookback, &HOMING_PIGEON_NEEDS, out, |w, i| {
      let first = &bars[i - 1];
      let second = &bars[i];
      // Long black, then short black with its body inside the first body
      if first.is_black()
        && second.is_black()
        && first.real_body() > w.avg(BodyLong, 1, i)
        && second.real_body() < w.avg(BodyShort, 0, i)
        && second.open() < first.open()
        && second.close() > first.close()
      {
        100
      } else {
        0
      }
    })
  }
}

/// CDLSEPARATINGLINES - Separating Lines
#[derive(Debug, Clone, Copy, Default)]
pub struct SeparatingLinesRecognizer;

const SEPARATING_LINES_NEEDS: [Need; 3] = [
  Need::at(Equal, 1),
  Need::at(BodyLong, 0),
  Need::at(ShadowVeryShort, 0),
];

impl CandleRecognizer for SeparatingLinesRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_SEPARATINGLINES")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &SEPARATING_LINES_NEEDS, 1)
  }

  fn compute_into<T: OHLCV>(
    &self,
    config: &CandleConfig,
    bars: &[T],
    start_idx: usize,
    end_idx: usize,
    out: &mut [i32],
  ) -> Result<OutSpan> {
    let lookback = self.lookback(config);
    run_recognizer(
      config,
      bars,
      start_idx,
      end_idx,
      lookback,
      &SEPARATING_LINES_NEEDS,
      out,
      |w, i| {
        let first = &bars[i - 1];
        let second = &bars[i];
        let equal = w.avg(Equal, 1, i);
        // Opposite colors sharing the same open; the second is a belt hold
        if second.candle_color() == -first.candle_color()
          && second.open() <= first.open() + equal
          && second.open() >= first.open() - equal
          && second.real_body() > w.avg(BodyLong, 0, i)
          && ((second.is_white() && second.lower_shadow() < w.avg(ShadowVeryShort, 0, i))
            || (second.is_black() && second.upper_shadow() < w.avg(ShadowVeryShort, 0, i)))
        {
          second.candle_color() * 100
        } else {
          0
        }
      },
    )
  }
}

// ============================================================
// TESTS
// ============================================================
