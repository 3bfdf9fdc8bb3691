//! Multi-bar candlestick pattern recognizers (4+ bars)
//!
//! Patterns: CDLBREAKAWAY, CDLCONCEALBABYSWALL, CDLHIKKAKE, CDLLADDERBOTTOM,
//! CDLMATHOLD, CDLRISEFALL3METHODS
//!
//! Hikkake is the one stateful pattern in the crate: a detected inside-bar
//! breakout is latched and may emit a composite confirmation code up to three
//! bars later. The latch lives for one computation and is never persisted.

use crate::settings::CandleConfig;
use crate::settings::SettingKind::{BodyLong, BodyShort, ShadowVeryShort};
use crate::window::{lookback_for, run_recognizer, OutBuf, Need};
use crate::{
    CandleError, CandleRecognizer, OHLCVExt, OutSpan, PatternId, Penetration, Result, OHLCV,
};

impl_with_defaults!(
    BreakawayRecognizer,
    ConcealingBabySwallowRecognizer,
    HikkakeRecognizer,
    LadderBottomRecognizer,
    RiseFallThreeMethodsRecognizer,
);

// ============================================================
// BREAKAWAY
// ============================================================

/// CDLBREAKAWAY - Breakaway (5-bar pattern)
#[derive(Debug, Clone, Copy, Default)]
pub struct BreakawayRecognizer;

const BREAKAWAY_NEEDS: [Need; 1] = [Need::at(BodyLong, 4)];

impl CandleRecognizer for BreakawayRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_BREAKAWAY")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &BREAKAWAY_NEEDS, 4)
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
            &BREAKAWAY_NEEDS,
            out,
            |w, i| {
                let first = &bars[i - 4];
                let second = &bars[i - 3];
                let third = &bars[i - 2];
                let fourth = &bars[i - 1];
                let fifth = &bars[i];
                // Colors: first three non-gap bars agree, last one opposes
                // (the middle bar's color is free)
                if !(second.candle_color() == first.candle_color()
                    && fourth.candle_color() == second.candle_color()
                    && fifth.candle_color() == -fourth.candle_color())
                {
                    return 0;
                }
                if first.real_body() <= w.avg(BodyLong, 4, i) {
                    return 0;
                }
                if first.is_white() {
                    // Gap up, drift further up, then a black bar closing back
                    // into (not beyond) the gap
                    if second.real_body_gap_up(first)
                        && third.high() > second.high()
                        && third.low() > second.low()
                        && fourth.high() > third.high()
                        && fourth.low() > third.low()
                        && fifth.close() < second.open()
                        && fifth.close() > first.close()
                    {
                        return -100;
                    }
                } else {
                    // Mirror image after a gap down
                    if second.real_body_gap_down(first)
                        && third.high() < second.high()
                        && third.low() < second.low()
                        && fourth.high() < third.high()
                        && fourth.low() < third.low()
                        && fifth.close() > second.open()
                        && fifth.close() < first.close()
                    {
                        return 100;
                    }
                }
                0
            },
        )
    }
}

// ============================================================
// CONCEALING BABY SWALLOW
// ============================================================

/// CDLCONCEALBABYSWALL - Concealing Baby Swallow (4-bar pattern)
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcealingBabySwallowRecognizer;

const CONCEALING_NEEDS: [Need; 3] = [
    Need::at(ShadowVeryShort, 3),
    Need::at(ShadowVeryShort, 2),
    Need::at(ShadowVeryShort, 1),
];

impl CandleRecognizer for ConcealingBabySwallowRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_CONCEALBABYSWALL")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &CONCEALING_NEEDS, 3)
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
            &CONCEALING_NEEDS,
            out,
            |w, i| {
                let first = &bars[i - 3];
                let second = &bars[i - 2];
                let third = &bars[i - 1];
                let fourth = &bars[i];
                // Two black marubozu, a black gapping down with an upper
                // shadow reaching into the prior body, then a black engulfing
                // the third entirely
                if first.is_black()
                    && second.is_black()
                    && third.is_black()
                    && fourth.is_black()
                    && first.lower_shadow() < w.avg(ShadowVeryShort, 3, i)
                    && first.upper_shadow() < w.avg(ShadowVeryShort, 3, i)
                    && second.lower_shadow() < w.avg(ShadowVeryShort, 2, i)
                    && second.upper_shadow() < w.avg(ShadowVeryShort, 2, i)
                    && third.real_body_gap_down(second)
                    && third.upper_shadow() > w.avg(ShadowVeryShort, 1, i)
                    && third.high() > second.close()
                    && fourth.high() > third.high()
                    && fourth.low() < third.low()
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
// HIKKAKE
// ============================================================

/// Breakout latch carried across the Hikkake output loop.
#[derive(Debug, Clone, Copy)]
enum Latch {
    Idle,
    Pending { index: usize, strength: i32 },
}

/// One Hikkake step: the detection/confirmation decision at bar `i`.
///
/// A fresh inside-bar breakout always replaces a pending confirmation; a
/// pending breakout confirms when price closes beyond the inside bar within
/// three bars of the detection.
fn hikkake_step<T: OHLCV>(bars: &[T], i: usize, latch: Latch) -> (Latch, i32) {
    let inside = bars[i - 1].high() < bars[i - 2].high() && bars[i - 1].low() > bars[i - 2].low();
    let breaks_lower = bars[i].high() < bars[i - 1].high() && bars[i].low() < bars[i - 1].low();
    let breaks_upper = bars[i].high() > bars[i - 1].high() && bars[i].low() > bars[i - 1].low();

    if inside && (breaks_lower || breaks_upper) {
        // A downside fake-break sets up a bullish hikkake and vice versa
        let strength = if breaks_lower { 100 } else { -100 };
        return (Latch::Pending { index: i, strength }, strength);
    }

    if let Latch::Pending { index, strength } = latch {
        if i <= index + 3
            && ((strength > 0 && bars[i].close() > bars[index - 1].high())
                || (strength < 0 && bars[i].close() < bars[index - 1].low()))
        {
            return (Latch::Idle, strength + 100 * strength.signum());
        }
    }

    (latch, 0)
}

/// CDLHIKKAKE - Hikkake Pattern
///
/// The only stateful pattern: emits `±100` on the inside-bar breakout and a
/// composite `±200` when the breakout is confirmed within the next three bars.
#[derive(Debug, Clone, Copy, Default)]
pub struct HikkakeRecognizer;

impl CandleRecognizer for HikkakeRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_HIKKAKE")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        // Three warm-up steps, each reaching two bars back
        lookback_for(config, &[], 5)
    }

    fn compute_into<T: OHLCV>(
        &self,
        config: &CandleConfig,
        bars: &[T],
        start_idx: usize,
        end_idx: usize,
        out: &mut [i32],
    ) -> Result<OutSpan> {
        crate::window::validate_range(bars, start_idx, end_idx)?;
        let lookback = self.lookback(config);
        let start = start_idx.max(lookback);
        if start > end_idx {
            return Ok(OutSpan::empty());
        }
        let span = end_idx - start + 1;
        if out.len() < span {
            return Err(CandleError::OutputTooSmall {
                need: span,
                got: out.len(),
            });
        }

        // Warm up the latch over the three bars before the first output so a
        // breakout just inside the prefix can still confirm in range
        let mut latch = Latch::Idle;
        for i in start - 3..start {
            let (next, _) = hikkake_step(bars, i, latch);
            latch = next;
        }

        let mut writer = OutBuf::new(&mut out[..span]);
        for i in start..=end_idx {
            let (next, code) = hikkake_step(bars, i, latch);
            latch = next;
            writer.push(code);
        }
        Ok(writer.finish(start))
    }
}

// ============================================================
// LADDER BOTTOM
// ============================================================

/// CDLLADDERBOTTOM - Ladder Bottom (5-bar pattern)
#[derive(Debug, Clone, Copy, Default)]
pub struct LadderBottomRecognizer;

const LADDER_BOTTOM_NEEDS: [Need; 1] = [Need::at(ShadowVeryShort, 1)];

impl CandleRecognizer for LadderBottomRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_LADDERBOTTOM")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &LADDER_BOTTOM_NEEDS, 4)
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
            &LADDER_BOTTOM_NEEDS,
            out,
            |w, i| {
                let first = &bars[i - 4];
                let second = &bars[i - 3];
                let third = &bars[i - 2];
                let fourth = &bars[i - 1];
                let fifth = &bars[i];
                // Three declining blacks, a black with an upper shadow, then a
                // white gapping open and closing above the prior high
                if first.is_black()
                    && second.is_black()
                    && third.is_black()
                    && first.open() > second.open()
                    && second.open() > third.open()
                    && first.close() > second.close()
                    && second.close() > third.close()
                    && fourth.is_black()
                    && fourth.upper_shadow() > w.avg(ShadowVeryShort, 1, i)
                    && fifth.is_white()
                    && fifth.open() > fourth.open()
                    && fifth.close() > fourth.high()
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
// MAT HOLD
// ============================================================

/// CDLMATHOLD - Mat Hold (5-bar continuation)
#[derive(Debug, Clone, Copy)]
pub struct MatHoldRecognizer {
    pub penetration: Penetration,
}

impl Default for MatHoldRecognizer {
    fn default() -> Self {
        Self {
            penetration: Penetration::new_const(0.5),
        }
    }
}

impl MatHoldRecognizer {
    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn new(penetration: f64) -> Result<Self> {
        Ok(Self {
            penetration: Penetration::new(penetration)?,
        })
    }
}

const MAT_HOLD_NEEDS: [Need; 4] = [
    Need::at(BodyLong, 4),
    Need::at(BodyShort, 3),
    Need::at(BodyShort, 2),
    Need::at(BodyShort, 1),
];

impl CandleRecognizer for MatHoldRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_MATHOLD")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &MAT_HOLD_NEEDS, 4)
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
            &MAT_HOLD_NEEDS,
            out,
            |w, i| {
                let first = &bars[i - 4];
                let second = &bars[i - 3];
                let third = &bars[i - 2];
                let fourth = &bars[i - 1];
                let fifth = &bars[i];
                if !(first.real_body() > w.avg(BodyLong, 4, i)
                    && second.real_body() < w.avg(BodyShort, 3, i)
                    && third.real_body() < w.avg(BodyShort, 2, i)
                    && fourth.real_body() < w.avg(BodyShort, 1, i))
                {
                    return 0;
                }
                if !(first.is_white() && second.is_black() && fifth.is_white()) {
                    return 0;
                }
                if !second.real_body_gap_up(first) {
                    return 0;
                }
                // Reaction days dip into the first body but hold above the
                // penetration floor, with declining body tops
                let floor = first.close() - first.real_body() * penetration;
                if !(third.body_bottom() < first.close()
                    && fourth.body_bottom() < first.close()
                    && third.body_bottom() > floor
                    && fourth.body_bottom() > floor
                    && third.body_top() < second.open()
                    && fourth.body_top() < third.body_top())
                {
                    return 0;
                }
                // The fifth gaps over the reaction days and clears their highs
                if fifth.open() > fourth.close()
                    && fifth.close() > second.high().max(third.high()).max(fourth.high())
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
// RISING / FALLING THREE METHODS
// ============================================================

/// CDLRISEFALL3METHODS - Rising/Falling Three Methods
#[derive(Debug, Clone, Copy, Default)]
pub struct RiseFallThreeMethodsRecognizer;

const RISE_FALL_NEEDS: [Need; 5] = [
    Need::at(BodyLong, 4),
    Need::at(BodyShort, 3),
    Need::at(BodyShort, 2),
    Need::at(BodyShort, 1),
    Need::at(BodyLong, 0),
];

impl CandleRecognizer for RiseFallThreeMethodsRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_RISEFALL3METHODS")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &RISE_FALL_NEEDS, 4)
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
            &RISE_FALL_NEEDS,
            out,
            |w, i| {
                let first = &bars[i - 4];
                let second = &bars[i - 3];
                let third = &bars[i - 2];
                let fourth = &bars[i - 1];
                let fifth = &bars[i];
                if !(first.real_body() > w.avg(BodyLong, 4, i)
                    && second.real_body() < w.avg(BodyShort, 3, i)
                    && third.real_body() < w.avg(BodyShort, 2, i)
                    && fourth.real_body() < w.avg(BodyShort, 1, i)
                    && fifth.real_body() > w.avg(BodyLong, 0, i))
                {
                    return 0;
                }
                // Long bar, three opposite-color reaction bars, long same-color bar
                if !(second.candle_color() == -first.candle_color()
                    && third.candle_color() == second.candle_color()
                    && fourth.candle_color() == third.candle_color()
                    && fifth.candle_color() == -fourth.candle_color())
                {
                    return 0;
                }
                // Reaction bars hold inside the first bar's range
                let held = second.low().min(third.low()).min(fourth.low()) > first.low()
                    && second.high().max(third.high()).max(fourth.high()) < first.high();
                if !held {
                    return 0;
                }
                if first.is_white() && fifth.open() > fourth.close() && fifth.close() > first.close()
                {
                    return 100;
                }
                if first.is_black() && fifth.open() < fourth.close() && fifth.close() < first.close()
                {
                    return -100;
                }
                0
            },
        )
    }
}

// ============================================================
// TESTS
// ============================================================
