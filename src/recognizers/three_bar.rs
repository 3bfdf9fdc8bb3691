//! Three-bar candlestick pattern recognizers
//!
//! Patterns: CDL2CROWS, CDLUPSIDEGAP2CROWS, CDLIDENTICAL3CROWS, CDL3BLACKCROWS,
//! CDL3WHITESOLDIERS, CDL3INSIDE, CDL3OUTSIDE, CDL3LINESTRIKE, CDL3STARSINSOUTH,
//! CDLMORNINGSTAR, CDLEVENINGSTAR, CDLMORNINGDOJISTAR, CDLEVENINGDOJISTAR,
//! CDLABANDONEDBABY, CDLADVANCEBLOCK, CDLSTALLEDPATTERN, CDLSTICKSANDWICH,
//! CDLTASUKIGAP, CDLTRISTAR, CDLUNIQUE3RIVER, CDLGAPSIDESIDEWHITE,
//! CDLXSIDEGAP3METHODS
//!
//! Multi-bar classifications evaluate each bar against the trailing average at
//! that bar's own position, so one pattern may carry several windows of the
//! same kind at different offsets.

#![allow(clippy::collapsible_if)]

use crate::settings::CandleConfig;
use crate::settings::SettingKind::{
  BodyDoji, BodyLong, BodyShort, Equal, Far, Near, ShadowLong, ShadowShort, ShadowVeryShort,
};
use crate::window::{lookback_for, run_recognizer, Need};
use crate::{CandleRecognizer, OHLCVExt, OutSpan, PatternId, Penetration, Result, OHLCV};

impl_with_defaults!(
  TwoCrowsRecognizer,
  UpsideGapTwoCrowsRecognizer,
  IdenticalThreeCrowsRecognizer,
  ThreeBlackCrowsRecognizer,
  ThreeWhiteSoldiersRecognizer,
  ThreeInsideRecognizer,
  ThreeOutsideRecognizer,
  ThreeLineStrikeRecognizer,
  ThreeStarsInSouthRecognizer,
  AdvanceBlockRecognizer,
  StalledPatternRecognizer,
  StickSandwichRecognizer,
  TasukiGapRecognizer,
  TristarRecognizer,
  UniqueThreeRiverRecognizer,
  GapSideSideWhiteRecognizer,
  XSideGapThreeMethodsRecognizer,
);

// ============================================================
// CROWS
// ============================================================

/// CDL2CROWS - Two Crows
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoCrowsRecognizer;

const TWO_CROWS_NEEDS: [Need; 1] = [Need::at(BodyLong, 2)];

impl CandleRecognizer for TwoCrowsRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_2CROWS")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &TWO_CROWS_NEEDS, 2)
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
    run_recognizer(config, bars, start_idx, end_idx, lookback, &TWO_CROWS_NEEDS, out, |w, i| {
      let first = &bars[i - 2];
      let second = &bars[i - 1];
      let third = &bars[i];
      // Long white, black gapping up, black closing into the white body
      if first.is_white()
        && first.real_body() > w.avg(BodyLong, 2, i)
        && second.is_black()
        && second.real_body_gap_up(first)
        && third.is_black()
        && third.open() < second.open()
        && third.open() > second.close()
        && third.close() > first.open()
        && third.close() < first.close()
      {
        -100
      } else {
        0
      }
    })
  }
}

/// CDLUPSIDEGAP2CROWS - Upside Gap Two Crows
#[derive(Debug, Clone, Copy, Default)]
pub struct UpsideGapTwoCrowsRecognizer;

const UPSIDE_GAP_TWO_CROWS_NEEDS: [Need; 2] = [Need::at(BodyLong, 2), Need::at(BodyShort, 1)];

impl CandleRecognizer for UpsideGapTwoCrowsRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_UPSIDEGAP2CROWS")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &UPSIDE_GAP_TWO_CROWS_NEEDS, 2)
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
      &UPSIDE_GAP_TWO_CROWS_NEEDS,
      out,
      |w, i| {
        let first = &bars[i - 2];
        let second = &bars[i - 1];
        let third = &bars[i];
        if first.is_white()
          && first.real_body() > w.avg(BodyLong, 2, i)
          && second.is_black()
          && second.real_body() < w.avg(BodyShort, 1, i)
          && second.real_body_gap_up(first)
          && third.is_black()
          && third.open() > second.open()
          && third.close() < second.close()
          && third.close() > first.close()
        {
          -100
        } else {
          0
        }
      },
    )
  }
}

/// CDLIDENTICAL3CROWS - Identical Three Crows
#[derive(Debug, Clone, Copy, Default)]
pub struct IdenticalThreeCrowsRecognizer;

const IDENTICAL_CROWS_NEEDS: [Need; 2] = [Need::at(Equal, 2), Need::at(Equal, 1)];

impl CandleRecognizer for IdenticalThreeCrowsRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_IDENTICAL3CROWS")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &IDENTICAL_CROWS_NEEDS, 2)
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
      &IDENTICAL_CROWS_NEEDS,
      out,
      |w, i| {
        let first = &bars[i - 2];
        let second = &bars[i - 1];
        let third = &bars[i];
        let equal_first = w.avg(Equal, 2, i);
        let equal_second = w.avg(Equal, 1, i);
        // Three declining black bars, each opening at the prior close
        if first.is_black()
          && second.is_black()
          && third.is_black()
          && second.close() < first.close()
          && third.close() < second.close()
          && second.open() <= first.close() + equal_first
          && second.open() >= first.close() - equal_first
          && third.open() <= second.close() + equal_second
          && third.open() >= second.close() - equal_second
        {
          -100
        } else {
          0
        }
      },
    )
  }
}

/// CDL3BLACKCROWS - Three Black Crows
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeBlackCrowsRecognizer;

const BLACK_CROWS_NEEDS: [Need; 3] = [
  Need::at(ShadowVeryShort, 2),
  Need::at(ShadowVeryShort, 1),
  Need::at(ShadowVeryShort, 0),
];

impl CandleRecognizer for ThreeBlackCrowsRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_3BLACKCROWS")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &BLACK_CROWS_NEEDS, 3)
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
    run_recognizer(config, bars, start_idx, end_idx, lookback, &BLACK_CROWS_NEEDS, out, |w, i| {
      let prior = &bars[i - 3];
      let first = &bars[i - 2];
      let second = &bars[i - 1];
      let third = &bars[i];
      // White bar, then three declining black bars with no lower shadows,
      // each opening within the prior crow's body
      if prior.is_white()
        && first.is_black()
        && first.lower_shadow() < w.avg(ShadowVeryShort, 2, i)
        && second.is_black()
        && second.lower_shadow() < w.avg(ShadowVeryShort, 1, i)
        && third.is_black()
        && third.lower_shadow() < w.avg(ShadowVeryShort, 0, i)
        && second.open() < first.open()
        && second.open() > first.close()
        && third.open() < second.open()
        && third.open() > second.close()
        && prior.high() > first.close()
        && second.close() < first.close()
        && third.close() < second.close()
      {
        -100
      } else {
        0
      }
    })
  }
}

/// CDL3WHITESOLDIERS - Three Advancing White Soldiers
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeWhiteSoldiersRecognizer;

const WHITE_SOLDIERS_NEEDS: [Need; 8] = [
  Need::at(ShadowVeryShort, 2),
  Need::at(ShadowVeryShort, 1),
  Need::at(ShadowVeryShort, 0),
  Need::at(Near, 2),
  Need::at(Near, 1),
  Need::at(Far, 2),
  Need::at(Far, 1),
  Need::at(BodyShort, 0),
];

impl CandleRecognizer for ThreeWhiteSoldiersRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_3WHITESOLDIERS")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &WHITE_SOLDIERS_NEEDS, 2)
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
      &WHITE_SOLDIERS_NEEDS,
      out,
      |w, i| {
        let first = &bars[i - 2];
        let second = &bars[i - 1];
        let third = &bars[i];
        // Three white bars with bare tops and ascending closes
        if !(first.is_white() && second.is_white() && third.is_white()) {
          return 0;
        }
        if first.upper_shadow() >= w.avg(ShadowVeryShort, 2, i)
          || second.upper_shadow() >= w.avg(ShadowVeryShort, 1, i)
          || third.upper_shadow() >= w.avg(ShadowVeryShort, 0, i)
        {
          return 0;
        }
        if !(third.close() > second.close() && second.close() > first.close()) {
          return 0;
        }
        // Each opens within or near the prior body
        if !(second.open() > first.open()
          && second.open() <= first.close() + w.avg(Near, 2, i)
          && third.open() > second.open()
          && third.open() <= second.close() + w.avg(Near, 1, i))
        {
          return 0;
        }
        // Bodies must not shrink by more than the Far threshold
        if second.real_body() <= first.real_body() - w.avg(Far, 2, i)
          || third.real_body() <= second.real_body() - w.avg(Far, 1, i)
        {
          return 0;
        }
        if third.real_body() <= w.avg(BodyShort, 0, i) {
          return 0;
        }
        100
      },
    )
  }
}

// ============================================================
// INSIDE / OUTSIDE / LINE STRIKE
// ============================================================

/// CDL3INSIDE - Three Inside Up/Down
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeInsideRecognizer;

const THREE_INSIDE_NEEDS: [Need; 2] = [Need::at(BodyLong, 2), Need::at(BodyShort, 1)];

impl CandleRecognizer for ThreeInsideRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_3INSIDE")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &THREE_INSIDE_NEEDS, 2)
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
    run_recognizer(config, bars, start_idx, end_idx, lookback, &THREE_INSIDE_NEEDS, out, |w, i| {
      let first = &bars[i - 2];
      let second = &bars[i - 1];
      let third = &bars[i];
      // Long first bar, short second strictly inside it, third confirming
      // beyond the first bar's open
      if first.real_body() > w.avg(BodyLong, 2, i)
        && second.real_body() <= w.avg(BodyShort, 1, i)
        && second.body_top() < first.body_top()
        && second.body_bottom() > first.body_bottom()
      {
        if first.is_white() && third.is_black() && third.close() < first.open() {
          return -100;
        }
        if first.is_black() && third.is_white() && third.close() > first.open() {
          return 100;
        }
      }
      0
    })
  }
}

/// CDL3OUTSIDE - Three Outside Up/Down
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeOutsideRecognizer;

impl CandleRecognizer for ThreeOutsideRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_3OUTSIDE")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &[], 3)
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
      let first = &bars[i - 2];
      let second = &bars[i - 1];
      let third = &bars[i];
      // Engulfing followed by a close beyond the engulfing bar
      if second.is_white()
        && first.is_black()
        && second.close() > first.open()
        && second.open() < first.close()
        && third.close() > second.close()
      {
        return 100;
      }
      if second.is_black()
        && first.is_white()
        && second.open() > first.close()
        && second.close() < first.open()
        && third.close() < second.close()
      {
        return -100;
      }
      0
    })
  }
}

/// CDL3LINESTRIKE - Three-Line Strike
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeLineStrikeRecognizer;

const LINE_STRIKE_NEEDS: [Need; 2] = [Need::at(Near, 3), Need::at(Near, 2)];

impl CandleRecognizer for ThreeLineStrikeRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_3LINESTRIKE")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &LINE_STRIKE_NEEDS, 3)
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
    run_recognizer(config, bars, start_idx, end_idx, lookback, &LINE_STRIKE_NEEDS, out, |w, i| {
      let first = &bars[i - 3];
      let second = &bars[i - 2];
      let third = &bars[i - 1];
      let fourth = &bars[i];
      // Three same-color bars, each opening near the prior body, then an
      // opposite bar engulfing all three closes
      if !(second.candle_color() == first.candle_color()
        && third.candle_color() == second.candle_color()
        && fourth.candle_color() == -third.candle_color())
      {
        return 0;
      }
      let near_first = w.avg(Near, 3, i);
      let near_second = w.avg(Near, 2, i);
      if !(second.open() >= first.body_bottom() - near_first
        && second.open() <= first.body_top() + near_first
        && third.open() >= second.body_bottom() - near_second
        && third.open() <= second.body_top() + near_second)
      {
        return 0;
      }
      if third.is_white() {
        if third.close() > second.close()
          && second.close() > first.close()
          && fourth.open() > third.close()
          && fourth.close() < first.open()
        {
          return 100;
        }
      } else {
        if third.close() < second.close()
          && second.close() < first.close()
          && fourth.open() < third.close()
          && fourth.close() > first.open()
        {
          return -100;
        }
      }
      0
    })
  }
}

/// CDL3STARSINSOUTH - Three Stars In The South
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeStarsInSouthRecognizer;

const STARS_IN_SOUTH_NEEDS: [Need; 5] = [
  Need::at(BodyLong, 2),
  Need::at(ShadowLong, 2),
  Need::at(ShadowVeryShort, 1),
  Need::at(ShadowVeryShort, 0),
  Need::at(BodyShort, 0),
];

impl CandleRecognizer for ThreeStarsInSouthRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_3STARSINSOUTH")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &STARS_IN_SOUTH_NEEDS, 2)
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
      &STARS_IN_SOUTH_NEEDS,
      out,
      |w, i| {
        let first = &bars[i - 2];
        let second = &bars[i - 1];
        let third = &bars[i];
        // Long black with a long lower shadow, a shrinking black holding the
        // low, then a small black marubozu inside the second bar's range
        if first.is_black()
          && second.is_black()
          && third.is_black()
          && first.real_body() > w.avg(BodyLong, 2, i)
          && first.lower_shadow() > w.avg(ShadowLong, 2, i)
          && second.real_body() < first.real_body()
          && second.open() > first.close()
          && second.open() <= first.high()
          && second.low() < first.close()
          && second.low() >= first.low()
          && second.lower_shadow() > w.avg(ShadowVeryShort, 1, i)
          && third.real_body() < w.avg(BodyShort, 0, i)
          && third.lower_shadow() < w.avg(ShadowVeryShort, 0, i)
          && third.upper_shadow() < w.avg(ShadowVeryShort, 0, i)
          && third.low() > second.low()
          && third.high() < second.high()
        {
          100
        } else {
          0
        }
      },
    )
  }
}

// ============================================================
// STARS
// ============================================================

/// CDLMORNINGSTAR - Morning Star
#[derive(Debug, Clone, Copy)]
pub struct MorningStarRecognizer {
  pub penetration: Penetration,
}

impl Default for MorningStarRecognizer {
  fn default() -> Self {
    Self { penetration: Penetration::new_const(0.3) }
  }
}

impl MorningStarRecognizer {
  pub fn with_defaults() -> Self {
    Self::default()
  }

  pub fn new(penetration: f64) -> Result<Self> {
    Ok(Self { penetration: Penetration::new(penetration)? })
  }
}

const MORNING_STAR_NEEDS: [Need; 3] = [
  Need::at(BodyLong, 2),
  Need::at(BodyShort, 1),
  Need::at(BodyShort, 0),
];

impl CandleRecognizer for MorningStarRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_MORNINGSTAR")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &MORNING_STAR_NEEDS, 2)
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
    run_recognizer(config, bars, start_idx, end_idx, lookback, &MORNING_STAR_NEEDS, out, |w, i| {
      let first = &bars[i - 2];
      let star = &bars[i - 1];
      let third = &bars[i];
      // Long black, short body gapping down, white closing well into the
      // black body
      if first.is_black()
        && first.real_body() > w.avg(BodyLong, 2, i)
        && star.real_body() <= w.avg(BodyShort, 1, i)
        && star.real_body_gap_down(first)
        && third.is_white()
        && third.real_body() > w.avg(BodyShort, 0, i)
        && third.close() > first.close() + first.real_body() * penetration
      {
        100
      } else {
        0
      }
    })
  }
}

/// CDLEVENINGSTAR - Evening Star
#[derive(Debug, Clone, Copy)]
pub struct EveningStarRecognizer {
  pub penetration: Penetration,
}

impl Default for EveningStarRecognizer {
  fn default() -> Self {
    Self { penetration: Penetration::new_const(0.3) }
  }
}

impl EveningStarRecognizer {
  pub fn with_defaults() -> Self {
    Self::default()
  }

  pub fn new(penetration: f64) -> Result<Self> {
    Ok(Self { penetration: Penetration::new(penetration)? })
  }
}

const EVENING_STAR_NEEDS: [Need; 3] = [
  Need::at(BodyLong, 2),
  Need::at(BodyShort, 1),
  Need::at(BodyShort, 0),
];

impl CandleRecognizer for EveningStarRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_EVENINGSTAR")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &EVENING_STAR_NEEDS, 2)
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
    run_recognizer(config, bars, start_idx, end_idx, lookback, &EVENING_STAR_NEEDS, out, |w, i| {
      let first = &bars[i - 2];
      let star = &bars[i - 1];
      let third = &bars[i];
      if first.is_white()
        && first.real_body() > w.avg(BodyLong, 2, i)
        && star.real_body() <= w.avg(BodyShort, 1, i)
        && star.real_body_gap_up(first)
        && third.is_black()
        && third.real_body() > w.avg(BodyShort, 0, i)
        && third.close() < first.close() - first.real_body() * penetration
      {
        -100
      } else {
        0
      }
    })
  }
}

/// CDLMORNINGDOJISTAR - Morning Doji Star
#[derive(Debug, Clone, Copy)]
pub struct MorningDojiStarRecognizer {
  pub penetration: Penetration,
}

impl Default for MorningDojiStarRecognizer {
  fn default() -> Self {
    Self { penetration: Penetration::new_const(0.3) }
  }
}

impl MorningDojiStarRecognizer {
  pub fn with_defaults() -> Self {
    Self::default()
  }

  pub fn new(penetration: f64) -> Result<Self> {
    Ok(Self { penetration: Penetration::new(penetration)? })
  }
}

const MORNING_DOJI_NEEDS: [Need; 3] = [
  Need::at(BodyLong, 2),
  Need::at(BodyDoji, 1),
  Need::at(BodyShort, 0),
];

impl CandleRecognizer for MorningDojiStarRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_MORNINGDOJISTAR")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &MORNING_DOJI_NEEDS, 2)
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
    run_recognizer(config, bars, start_idx, end_idx, lookback, &MORNING_DOJI_NEEDS, out, |w, i| {
      let first = &bars[i - 2];
      let star = &bars[i - 1];
      let third = &bars[i];
      if first.is_black()
        && first.real_body() > w.avg(BodyLong, 2, i)
        && star.real_body() <= w.avg(BodyDoji, 1, i)
        && star.real_body_gap_down(first)
        && third.is_white()
        && third.real_body() > w.avg(BodyShort, 0, i)
        && third.close() > first.close() + first.real_body() * penetration
      {
        100
      } else {
        0
      }
    })
  }
}

/// CDLEVENINGDOJISTAR - Evening Doji Star
#[derive(Debug, Clone, Copy)]
pub struct EveningDojiStarRecognizer {
  pub penetration: Penetration,
}

impl Default for EveningDojiStarRecognizer {
  fn default() -> Self {
    Self { penetration: Penetration::new_const(0.3) }
  }
}

impl EveningDojiStarRecognizer {
  pub fn with_defaults() -> Self {
    Self::default()
  }

  pub fn new(penetration: f64) -> Result<Self> {
    Ok(Self { penetration: Penetration::new(penetration)? })
  }
}

const EVENING_DOJI_NEEDS: [Need; 3] = [
  Need::at(BodyLong, 2),
  Need::at(BodyDoji, 1),
  Need::at(BodyShort, 0),
];

impl CandleRecognizer for EveningDojiStarRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_EVENINGDOJISTAR")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &EVENING_DOJI_NEEDS, 2)
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
    run_recognizer(config, bars, start_idx, end_idx, lookback, &EVENING_DOJI_NEEDS, out, |w, i| {
      let first = &bars[i - 2];
      let star = &bars[i - 1];
      let third = &bars[i];
      // Long white, doji gapping up, black closing well into the white body
      if first.is_white()
        && first.real_body() > w.avg(BodyLong, 2, i)
        && star.real_body() <= w.avg(BodyDoji, 1, i)
        && star.real_body_gap_up(first)
        && third.is_black()
        && third.real_body() > w.avg(BodyShort, 0, i)
        && third.close() < first.close() - first.real_body() * penetration
      {
        -100
      } else {
        0
      }
    })
  }
}

/// CDLABANDONEDBABY - Abandoned Baby
#[derive(Debug, Clone, Copy)]
pub struct AbandonedBabyRecognizer {
  pub penetration: Penetration,
}

impl Default for AbandonedBabyRecognizer {
  fn default() -> Self {
    Self { penetration: Penetration::new_const(0.3) }
  }
}

impl AbandonedBabyRecognizer {
  pub fn with_defaults() -> Self {
    Self::default()
  }

  pub fn new(penetration: f64) -> Result<Self> {
    Ok(Self { penetration: Penetration::new(penetration)? })
  }
}

const ABANDONED_BABY_NEEDS: [Need; 3] = [
  Need::at(BodyLong, 2),
  Need::at(BodyDoji, 1),
  Need::at(BodyShort, 0),
];

impl CandleRecognizer for AbandonedBabyRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_ABANDONEDBABY")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &ABANDONED_BABY_NEEDS, 2)
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
    run_recognizer(
      config,
      bars,
      start_idx,
      end_idx,
      lookback,
      &ABANDONED_BABY_NEEDS,
      out,
      |w, i| {
        let first = &bars[i - 2];
        let star = &bars[i - 1];
        let third = &bars[i];
        if first.real_body() > w.avg(BodyLong, 2, i)
          && star.real_body() <= w.avg(BodyDoji, 1, i)
          && third.real_body() > w.avg(BodyShort, 0, i)
        {
          // The doji is abandoned by a full-range gap on both sides
          if first.is_black()
            && third.is_white()
            && third.close() > first.close() + first.real_body() * penetration
            && star.candle_gap_down(first)
            && third.candle_gap_up(star)
          {
            return 100;
          }
          if first.is_white()
            && third.is_black()
            && third.close() < first.close() - first.real_body() * penetration
            && star.candle_gap_up(first)
            && third.candle_gap_down(star)
          {
            return -100;
          }
        }
        0
      },
    )
  }
}

// ============================================================
// ADVANCE BLOCK / STALLED / SANDWICH
// ============================================================

/// CDLADVANCEBLOCK - Advance Block
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvanceBlockRecognizer;

const ADVANCE_BLOCK_NEEDS: [Need; 9] = [
  Need::at(ShadowShort, 2),
  Need::at(ShadowShort, 1),
  Need::at(ShadowShort, 0),
  Need::at(ShadowLong, 0),
  Need::at(Far, 2),
  Need::at(Far, 1),
  Need::at(Near, 2),
  Need::at(Near, 1),
  Need::at(BodyLong, 2),
];

impl CandleRecognizer for AdvanceBlockRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_ADVANCEBLOCK")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &ADVANCE_BLOCK_NEEDS, 2)
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
    run_recognizer(config, bars, start_idx, end_idx, lookback, &ADVANCE_BLOCK_NEEDS, out, |w, i| {
      let first = &bars[i - 2];
      let second = &bars[i - 1];
      let third = &bars[i];
      // Three advancing whites opening within the prior body, first long and
      // bare-topped
      if !(first.is_white()
        && second.is_white()
        && third.is_white()
        && third.close() > second.close()
        && second.close() > first.close()
        && second.open() > first.open()
        && second.open() <= first.close() + w.avg(Near, 2, i)
        && third.open() > second.open()
        && third.open() <= second.close() + w.avg(Near, 1, i)
        && first.real_body() > w.avg(BodyLong, 2, i)
        && first.upper_shadow() < w.avg(ShadowShort, 2, i))
      {
        return 0;
      }
      // Signs of weakening: shrinking bodies or growing upper shadows
      let fading = (second.real_body() < first.real_body() - w.avg(Far, 2, i)
        && third.real_body() < second.real_body() + w.avg(Near, 1, i))
        || (third.real_body() < second.real_body() - w.avg(Far, 1, i))
        || (third.real_body() < second.real_body()
          && second.real_body() < first.real_body()
          && (third.upper_shadow() > w.avg(ShadowShort, 0, i)
            || second.upper_shadow() > w.avg(ShadowShort, 1, i)))
        || (third.real_body() < first.real_body()
          && third.upper_shadow() > w.avg(ShadowLong, 0, i));
      if fading {
        -100
      } else {
        0
      }
    })
  }
}

/// CDLSTALLEDPATTERN - Stalled Pattern
#[derive(Debug, Clone, Copy, Default)]
pub struct StalledPatternRecognizer;

const STALLED_NEEDS: [Need; 6] = [
  Need::at(BodyLong, 2),
  Need::at(BodyLong, 1),
  Need::at(BodyShort, 0),
  Need::at(ShadowVeryShort, 1),
  Need::at(Near, 2),
  Need::at(Near, 1),
];

impl CandleRecognizer for StalledPatternRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_STALLEDPATTERN")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &STALLED_NEEDS, 2)
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
    run_recognizer(config, bars, start_idx, end_idx, lookback, &STALLED_NEEDS, out, |w, i| {
      let first = &bars[i - 2];
      let second = &bars[i - 1];
      let third = &bars[i];
      // Two long whites, then a small white riding the second one's shoulder
      if first.is_white()
        && second.is_white()
        && third.is_white()
        && third.close() > second.close()
        && second.close() > first.close()
        && first.real_body() > w.avg(BodyLong, 2, i)
        && second.real_body() > w.avg(BodyLong, 1, i)
        && second.upper_shadow() < w.avg(ShadowVeryShort, 1, i)
        && second.open() > first.open()
        && second.open() <= first.close() + w.avg(Near, 2, i)
        && third.real_body() < w.avg(BodyShort, 0, i)
        && third.open() >= second.close() - third.real_body() - w.avg(Near, 1, i)
      {
        -100
      } else {
        0
      }
    })
  }
}

/// CDLSTICKSANDWICH - Stick Sandwich
#[derive(Debug, Clone, Copy, Default)]
pub struct StickSandwichRecognizer;

const STICK_SANDWICH_NEEDS: [Need; 1] = [Need::at(Equal, 2)];

impl CandleRecognizer for StickSandwichRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_STICKSANDWICH")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &STICK_SANDWICH_NEEDS, 2)
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
      &STICK_SANDWICH_NEEDS,
      out,
      |w, i| {
        let first = &bars[i - 2];
        let second = &bars[i - 1];
        let third = &bars[i];
        let equal = w.avg(Equal, 2, i);
        // Black, white trading above the first close, black closing back at
        // the first close
        if first.is_black()
          && second.is_white()
          && third.is_black()
          && second.low() > first.close()
          && third.close() <= first.close() + equal
          && third.close() >= first.close() - equal
        {
          100
        } else {
          0
        }
      },
    )
  }
}

// ============================================================
// GAP CONTINUATIONS
// ============================================================

/// CDLTASUKIGAP - Tasuki Gap
#[derive(Debug, Clone, Copy, Default)]
pub struct TasukiGapRecognizer;

const TASUKI_NEEDS: [Need; 1] = [Need::at(Near, 1)];

impl CandleRecognizer for TasukiGapRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_TASUKIGAP")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &TASUKI_NEEDS, 2)
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
    run_recognizer(config, bars, start_idx, end_idx, lookback, &TASUKI_NEEDS, out, |w, i| {
      let first = &bars[i - 2];
      let second = &bars[i - 1];
      let third = &bars[i];
      let near = w.avg(Near, 1, i);
      let similar = (second.real_body() - third.real_body()).abs() < near;
      // Upside gap, white then black closing into (not below) the gap
      if second.real_body_gap_up(first)
        && second.is_white()
        && third.is_black()
        && third.open() < second.close()
        && third.open() > second.open()
        && third.close() < second.open()
        && third.close() > first.body_top()
        && similar
      {
        return 100;
      }
      // Downside gap, black then white closing into (not above) the gap
      if second.real_body_gap_down(first)
        && second.is_black()
        && third.is_white()
        && third.open() > second.close()
        && third.open() < second.open()
        && third.close() > second.open()
        && third.close() < first.body_bottom()
        && similar
      {
        return -100;
      }
      0
    })
  }
}

/// CDLTRISTAR - Tristar Pattern
#[derive(Debug, Clone, Copy, Default)]
pub struct TristarRecognizer;

const TRISTAR_NEEDS: [Need; 1] = [Need::at(BodyDoji, 2)];

impl CandleRecognizer for TristarRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_TRISTAR")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &TRISTAR_NEEDS, 2)
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
    run_recognizer(config, bars, start_idx, end_idx, lookback, &TRISTAR_NEEDS, out, |w, i| {
      let first = &bars[i - 2];
      let second = &bars[i - 1];
      let third = &bars[i];
      // Three dojis, all judged against the average at the first doji
      let doji = w.avg(BodyDoji, 2, i);
      if first.real_body() <= doji
        && second.real_body() <= doji
        && third.real_body() <= doji
      {
        if second.real_body_gap_up(first) && third.body_top() < second.body_top() {
          return -100;
        }
        if second.real_body_gap_down(first) && third.body_bottom() > second.body_bottom() {
          return 100;
        }
      }
      0
    })
  }
}

/// CDLUNIQUE3RIVER - Unique 3 River
#[derive(Debug, Clone, Copy, Default)]
pub struct UniqueThreeRiverRecognizer;

const UNIQUE_RIVER_NEEDS: [Need; 2] = [Need::at(BodyLong, 2), Need::at(BodyShort, 0)];

impl CandleRecognizer for UniqueThreeRiverRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_UNIQUE3RIVER")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &UNIQUE_RIVER_NEEDS, 2)
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
    run_recognizer(config, bars, start_idx, end_idx, lookback, &UNIQUE_RIVER_NEEDS, out, |w, i| {
      let first = &bars[i - 2];
      let second = &bars[i - 1];
      let third = &bars[i];
      // Long black, black harami making a new low, then a small white above
      // that low
      if first.is_black()
        && first.real_body() > w.avg(BodyLong, 2, i)
        && second.is_black()
        && second.close() > first.close()
        && second.open() <= first.open()
        && second.low() < first.low()
        && third.is_white()
        && third.real_body() < w.avg(BodyShort, 0, i)
        && third.open() > second.low()
      {
        100
      } else {
        0
      }
    })
  }
}

/// CDLGAPSIDESIDEWHITE - Up/Down-gap side-by-side white lines
#[derive(Debug, Clone, Copy, Default)]
pub struct GapSideSideWhiteRecognizer;

const GAP_SIDE_NEEDS: [Need; 1] = [Need::at(Near, 1)];

impl CandleRecognizer for GapSideSideWhiteRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_GAPSIDESIDEWHITE")
  }

  fn lookback(&self, config: &CandleConfig) -> usize {
    lookback_for(config, &GAP_SIDE_NEEDS, 2)
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
    run_recognizer(config, bars, start_idx, end_idx, lookback, &GAP_SIDE_NEEDS, out, |w, i| {
      let first = &bars[i - 2];
      let second = &bars[i - 1];
      let third = &bars[i];
      let gap_up = second.real_body_gap_up(first) && third.real_body_gap_up(first);
      let gap_down = second.real_body_gap_down(first) && third.real_body_gap_down(first);
      if !(gap_up || gap_down) {
        return 0;
      }
      let near = w.avg(Near, 1, i);
      // Two similar white bars on the far side of the gap
      if second.is_white()
        && third.is_white()
        && third.real_body() > second.real_body() - near
        && third.real_body() < second.real_body() + near
        && third.open() > second.open() - near
        && third.open() < second.open() + near
      {
        if gap_up {
          100
        } else {
          -100
        }
      } else {
        0
      }
    })
  }
}

/// CDLXSIDEGAP3METHODS - Upside/Downside Gap Three Methods
#[derive(Debug, Clone, Copy, Default)]
pub struct XSideGapThreeMethodsRecognizer;

impl CandleRecognizer for XSideGapThreeMethodsRecognizer {
  fn id(&self) -> PatternId {
    PatternId("CDL_XSIDEGAP3METHODS")
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
      let first = &bars[i - 2];
      let second = &bars[i - 1];
      let third = &bars[i];
      // Two same-color bars with a body gap, third opposite bar opening in
      // the second body and closing the gap into the first body
      if second.candle_color() == first.candle_color()
        && third.candle_color() == -second.candle_color()
        && third.open() < second.body_top()
        && third.open() > second.body_bottom()
        && third.close() < first.body_top()
        && third.close() > first.body_bottom()
        && ((first.is_white() && second.real_body_gap_up(first))
          || (first.is_black() && second.real_body_gap_down(first)))
      {
        first.candle_color() * 100
      } else {
        0
      }
    })
  }
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
  use super::*;
  use crate::settings::CandleConfig;

  #[derive(Debug, Clone, Copy)]
  struct Bar {
    o: f64,
    h: f64,
    l: f64,
    c: f64,
  }

  impl Bar {
    fn new(o: f64, h: f64, l: f64, c: f64) -> Self {
      Self { o, h, l, c }
    }
  }

  impl OHLCV for Bar {
    fn open(&self) -> f64 {
      self.o
    }

    fn high(&self) -> f64 {
      self.h
    }

    fn low(&self) -> f64 {
      self.l
    }

    fn close(&self) -> f64 {
      self.c
    }
  }

  fn plain(n: usize) -> Vec<Bar> {
    (0..n).map(|_| Bar::new(100.0, 102.0, 98.0, 101.0)).collect()
  }

  fn compute_last(recognizer: &impl CandleRecognizer, bars: &[Bar]) -> i32 {
    let config = CandleConfig::default();
    let mut out = vec![0i32; bars.len()];
    let last = bars.len() - 1;
    let span = recognizer.compute_into(&config, bars, last, last, &mut out).unwrap();
    assert_eq!(span.n_elements, 1);
    out[0]
  }

  #[test]
  fn test_two_crows() {
    let mut bars = plain(12);
    bars.push(Bar::new(98.0, 104.5, 97.8, 104.0)); // long white
    bars.push(Bar::new(105.5, 106.0, 104.6, 104.8)); // black gapping up
    bars.push(Bar::new(105.2, 105.6, 100.5, 101.0)); // black into the white body
    assert_eq!(compute_last(&TwoCrowsRecognizer, &bars), -100);
  }

  #[test]
  fn test_morning_star() {
    let mut bars = plain(12);
    bars.push(Bar::new(104.0, 104.5, 97.5, 98.0)); // long black
    bars.push(Bar::new(96.5, 97.0, 95.5, 96.2)); // star gapping down
    bars.push(Bar::new(96.8, 102.0, 96.5, 101.5)); // white closing into the body
    assert_eq!(compute_last(&MorningStarRecognizer::with_defaults(), &bars), 100);
  }

  #[test]
  fn test_morning_star_penetration_boundary() {
    let mut bars = plain(12);
    bars.push(Bar::new(104.0, 104.5, 97.5, 98.0));
    bars.push(Bar::new(96.5, 97.0, 95.5, 96.2));
    // Closes above the close but short of 30% into the body
    bars.push(Bar::new(96.8, 99.6, 96.5, 99.5));
    assert_eq!(compute_last(&MorningStarRecognizer::with_defaults(), &bars), 0);
  }

  #[test]
  fn test_evening_star() {
    let mut bars = plain(12);
    bars.push(Bar::new(98.0, 104.5, 97.5, 104.0)); // long white
    bars.push(Bar::new(105.5, 106.5, 105.0, 105.8)); // star gapping up
    bars.push(Bar::new(105.0, 105.5, 99.0, 100.0)); // black closing deep
    assert_eq!(compute_last(&EveningStarRecognizer::with_defaults(), &bars), -100);
  }

  #[test]
  fn test_evening_doji_star_requires_doji() {
    let mut bars = plain(12);
    bars.push(Bar::new(98.0, 104.5, 97.5, 104.0));
    bars.push(Bar::new(105.5, 106.5, 105.0, 105.6)); // star body 0.1, within doji band
    bars.push(Bar::new(105.0, 105.5, 99.0, 100.0));
    assert_eq!(compute_last(&EveningDojiStarRecognizer::with_defaults(), &bars), -100);

    // Fatten the star beyond the doji threshold: no longer a doji star
    let mut bars = plain(12);
    bars.push(Bar::new(98.0, 104.5, 97.5, 104.0));
    bars.push(Bar::new(105.0, 106.5, 104.9, 106.0));
    bars.push(Bar::new(105.0, 105.5, 99.0, 100.0));
    assert_eq!(compute_last(&EveningDojiStarRecognizer::with_defaults(), &bars), 0);
  }

  #[test]
  fn test_three_outside_up() {
    let mut bars = plain(12);
    bars.push(Bar::new(101.0, 101.5, 99.0, 99.5)); // black
    bars.push(Bar::new(99.0, 102.5, 98.8, 102.0)); // white engulfing
    bars.push(Bar::new(102.0, 103.5, 101.8, 103.0)); // confirmation
    assert_eq!(compute_last(&ThreeOutsideRecognizer, &bars), 100);
  }

  #[test]
  fn test_tristar_bullish() {
    let mut bars = plain(12);
    bars.push(Bar::new(100.0, 101.0, 99.0, 100.2)); // doji
    bars.push(Bar::new(98.5, 99.2, 98.0, 98.6)); // doji gapping down
    bars.push(Bar::new(98.8, 99.5, 98.6, 98.9)); // doji back up
    assert_eq!(compute_last(&TristarRecognizer, &bars), 100);
  }

  #[test]
  fn test_stick_sandwich() {
    let mut bars = plain(12);
    bars.push(Bar::new(101.0, 101.2, 98.8, 99.0)); // black
    bars.push(Bar::new(99.5, 102.0, 99.2, 101.5)); // white above the close
    bars.push(Bar::new(101.8, 102.0, 98.9, 99.01)); // black back to the close
    assert_eq!(compute_last(&StickSandwichRecognizer, &bars), 100);
  }

  #[test]
  fn test_xside_gap_three_methods_up() {
    let mut bars = plain(12);
    bars.push(Bar::new(100.0, 102.0, 99.5, 101.5)); // white
    bars.push(Bar::new(102.5, 104.0, 102.2, 103.5)); // white gapping up
    bars.push(Bar::new(103.0, 103.2, 100.5, 100.8)); // black closing the gap
    assert_eq!(compute_last(&XSideGapThreeMethodsRecognizer, &bars), 100);
  }

  #[test]
  fn test_upside_gap_two_crows() {
    let mut bars = plain(12);
    bars.push(Bar::new(98.0, 104.5, 97.8, 104.0)); // long white
    bars.push(Bar::new(105.5, 105.8, 104.9, 105.0)); // short black gapping up
    bars.push(Bar::new(105.7, 106.0, 104.3, 104.5)); // black engulfing, above white close
    assert_eq!(compute_last(&UpsideGapTwoCrowsRecognizer, &bars), -100);
  }

  #[test]
  fn test_identical_three_crows() {
    let mut bars = plain(12);
    bars.push(Bar::new(104.0, 104.2, 101.9, 102.0)); // black
    bars.push(Bar::new(102.05, 102.2, 99.9, 100.0)); // opens at prior close
    bars.push(Bar::new(100.02, 100.3, 97.9, 98.0)); // opens at prior close
    assert_eq!(compute_last(&IdenticalThreeCrowsRecognizer, &bars), -100);
  }
}
