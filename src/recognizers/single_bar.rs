//! Single-bar candlestick pattern recognizers
//!
//! Patterns: CDLDOJI, CDLDRAGONFLYDOJI, CDLGRAVESTONEDOJI, CDLLONGLEGGEDDOJI,
//! CDLRICKSHAWMAN, CDLHAMMER, CDLHANGINGMAN, CDLINVERTEDHAMMER, CDLSHOOTINGSTAR,
//! CDLTAKURI, CDLMARUBOZU, CDLCLOSINGMARUBOZU, CDLLONGLINE, CDLSHORTLINE,
//! CDLSPINNINGTOP, CDLHIGHWAVE, CDLBELTHOLD
//!
//! A bar's body and shadows are classified against the trailing averages
//! declared per pattern. Doji classification is inclusive (`<=`), long/short
//! classification is strict (`<`/`>`).

use crate::settings::SettingKind::{
    BodyDoji, BodyLong, BodyShort, Near, ShadowLong, ShadowShort, ShadowVeryLong, ShadowVeryShort,
};
use crate::settings::CandleConfig;
use crate::window::{lookback_for, run_recognizer, Need};
use crate::{CandleRecognizer, OHLCVExt, OutSpan, PatternId, Result, OHLCV};

impl_with_defaults!(
    DojiRecognizer,
    DragonflyDojiRecognizer,
    GravestoneDojiRecognizer,
    LongLeggedDojiRecognizer,
    RickshawManRecognizer,
    HammerRecognizer,
    HangingManRecognizer,
    InvertedHammerRecognizer,
    ShootingStarRecognizer,
    TakuriRecognizer,
    MarubozuRecognizer,
    ClosingMarubozuRecognizer,
    LongLineRecognizer,
    ShortLineRecognizer,
    SpinningTopRecognizer,
    HighWaveRecognizer,
    BeltHoldRecognizer,
);

// ============================================================
// DOJI FAMILY
// ============================================================

/// CDLDOJI - Doji
#[derive(Debug, Clone, Copy, Default)]
pub struct DojiRecognizer;

const DOJI_NEEDS: [Need; 1] = [Need::at(BodyDoji, 0)];

impl CandleRecognizer for DojiRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_DOJI")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &DOJI_NEEDS, 0)
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
        run_recognizer(config, bars, start_idx, end_idx, lookback, &DOJI_NEEDS, out, |w, i| {
            if bars[i].real_body() <= w.avg(BodyDoji, 0, i) {
                100
            } else {
                0
            }
        })
    }
}

/// CDLDRAGONFLYDOJI - Dragonfly Doji
#[derive(Debug, Clone, Copy, Default)]
pub struct DragonflyDojiRecognizer;

const DRAGONFLY_NEEDS: [Need; 2] = [Need::at(BodyDoji, 0), Need::at(ShadowVeryShort, 0)];

impl CandleRecognizer for DragonflyDojiRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_DRAGONFLYDOJI")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &DRAGONFLY_NEEDS, 0)
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
            &DRAGONFLY_NEEDS,
            out,
            |w, i| {
                let bar = &bars[i];
                if bar.real_body() <= w.avg(BodyDoji, 0, i)
                    && bar.upper_shadow() < w.avg(ShadowVeryShort, 0, i)
                    && bar.lower_shadow() > w.avg(ShadowVeryShort, 0, i)
                {
                    100
                } else {
                    0
                }
            },
        )
    }
}

/// CDLGRAVESTONEDOJI - Gravestone Doji
#[derive(Debug, Clone, Copy, Default)]
pub struct GravestoneDojiRecognizer;

const GRAVESTONE_NEEDS: [Need; 2] = [Need::at(BodyDoji, 0), Need::at(ShadowVeryShort, 0)];

impl CandleRecognizer for GravestoneDojiRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_GRAVESTONEDOJI")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &GRAVESTONE_NEEDS, 0)
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
            &GRAVESTONE_NEEDS,
            out,
            |w, i| {
                let bar = &bars[i];
                if bar.real_body() <= w.avg(BodyDoji, 0, i)
                    && bar.lower_shadow() < w.avg(ShadowVeryShort, 0, i)
                    && bar.upper_shadow() > w.avg(ShadowVeryShort, 0, i)
                {
                    100
                } else {
                    0
                }
            },
        )
    }
}

/// CDLLONGLEGGEDDOJI - Long Legged Doji
#[derive(Debug, Clone, Copy, Default)]
pub struct LongLeggedDojiRecognizer;

const LONG_LEGGED_NEEDS: [Need; 2] = [Need::at(BodyDoji, 0), Need::at(ShadowLong, 0)];

impl CandleRecognizer for LongLeggedDojiRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_LONGLEGGEDDOJI")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &LONG_LEGGED_NEEDS, 0)
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
            &LONG_LEGGED_NEEDS,
            out,
            |w, i| {
                let bar = &bars[i];
                if bar.real_body() <= w.avg(BodyDoji, 0, i)
                    && (bar.lower_shadow() > w.avg(ShadowLong, 0, i)
                        || bar.upper_shadow() > w.avg(ShadowLong, 0, i))
                {
                    100
                } else {
                    0
                }
            },
        )
    }
}

/// CDLRICKSHAWMAN - Rickshaw Man
#[derive(Debug, Clone, Copy, Default)]
pub struct RickshawManRecognizer;

const RICKSHAW_NEEDS: [Need; 3] = [
    Need::at(BodyDoji, 0),
    Need::at(ShadowLong, 0),
    Need::at(Near, 0),
];

impl CandleRecognizer for RickshawManRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_RICKSHAWMAN")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &RICKSHAW_NEEDS, 0)
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
            &RICKSHAW_NEEDS,
            out,
            |w, i| {
                let bar = &bars[i];
                let midpoint = bar.low() + bar.hl_range() / 2.0;
                let near = w.avg(Near, 0, i);
                // Doji with both shadows long and the body centered in the range
                if bar.real_body() <= w.avg(BodyDoji, 0, i)
                    && bar.lower_shadow() > w.avg(ShadowLong, 0, i)
                    && bar.upper_shadow() > w.avg(ShadowLong, 0, i)
                    && bar.body_bottom() <= midpoint + near
                    && bar.body_top() >= midpoint - near
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
// HAMMER FAMILY
// ============================================================

/// CDLHAMMER - Hammer
#[derive(Debug, Clone, Copy, Default)]
pub struct HammerRecognizer;

const HAMMER_NEEDS: [Need; 4] = [
    Need::at(BodyShort, 0),
    Need::at(ShadowLong, 0),
    Need::at(ShadowVeryShort, 0),
    Need::at(Near, 1),
];

impl CandleRecognizer for HammerRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_HAMMER")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &HAMMER_NEEDS, 1)
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
            &HAMMER_NEEDS,
            out,
            |w, i| {
                let bar = &bars[i];
                // Small body, long lower shadow, no upper shadow to speak of,
                // body near or above the previous bar's low
                if bar.real_body() < w.avg(BodyShort, 0, i)
                    && bar.lower_shadow() > w.avg(ShadowLong, 0, i)
                    && bar.upper_shadow() < w.avg(ShadowVeryShort, 0, i)
                    && bar.body_bottom() >= bars[i - 1].low() - w.avg(Near, 1, i)
                {
                    100
                } else {
                    0
                }
            },
        )
    }
}

/// CDLHANGINGMAN - Hanging Man
#[derive(Debug, Clone, Copy, Default)]
pub struct HangingManRecognizer;

const HANGING_MAN_NEEDS: [Need; 4] = [
    Need::at(BodyShort, 0),
    Need::at(ShadowLong, 0),
    Need::at(ShadowVeryShort, 0),
    Need::at(Near, 1),
];

impl CandleRecognizer for HangingManRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_HANGINGMAN")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &HANGING_MAN_NEEDS, 1)
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
            &HANGING_MAN_NEEDS,
            out,
            |w, i| {
                let bar = &bars[i];
                // Same shape as a hammer, but the body rides near or above the
                // previous bar's high
                if bar.real_body() < w.avg(BodyShort, 0, i)
                    && bar.lower_shadow() > w.avg(ShadowLong, 0, i)
                    && bar.upper_shadow() < w.avg(ShadowVeryShort, 0, i)
                    && bar.body_bottom() >= bars[i - 1].high() - w.avg(Near, 1, i)
                {
                    -100
                } else {
                    0
                }
            },
        )
    }
}

/// CDLINVERTEDHAMMER - Inverted Hammer
#[derive(Debug, Clone, Copy, Default)]
pub struct InvertedHammerRecognizer;

const INVERTED_HAMMER_NEEDS: [Need; 3] = [
    Need::at(BodyShort, 0),
    Need::at(ShadowLong, 0),
    Need::at(ShadowVeryShort, 0),
];

impl CandleRecognizer for InvertedHammerRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_INVERTEDHAMMER")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &INVERTED_HAMMER_NEEDS, 1)
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
            &INVERTED_HAMMER_NEEDS,
            out,
            |w, i| {
                let bar = &bars[i];
                if bar.real_body() < w.avg(BodyShort, 0, i)
                    && bar.upper_shadow() > w.avg(ShadowLong, 0, i)
                    && bar.lower_shadow() < w.avg(ShadowVeryShort, 0, i)
                    && bar.real_body_gap_down(&bars[i - 1])
                {
                    100
                } else {
                    0
                }
            },
        )
    }
}

/// CDLSHOOTINGSTAR - Shooting Star
#[derive(Debug, Clone, Copy, Default)]
pub struct ShootingStarRecognizer;

const SHOOTING_STAR_NEEDS: [Need; 3] = [
    Need::at(BodyShort, 0),
    Need::at(ShadowLong, 0),
    Need::at(ShadowVeryShort, 0),
];

impl CandleRecognizer for ShootingStarRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_SHOOTINGSTAR")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &SHOOTING_STAR_NEEDS, 1)
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
            &SHOOTING_STAR_NEEDS,
            out,
            |w, i| {
                let bar = &bars[i];
                if bar.real_body() < w.avg(BodyShort, 0, i)
                    && bar.upper_shadow() > w.avg(ShadowLong, 0, i)
                    && bar.lower_shadow() < w.avg(ShadowVeryShort, 0, i)
                    && bar.real_body_gap_up(&bars[i - 1])
                {
                    -100
                } else {
                    0
                }
            },
        )
    }
}

/// CDLTAKURI - Takuri (dragonfly doji with a very long lower shadow)
#[derive(Debug, Clone, Copy, Default)]
pub struct TakuriRecognizer;

const TAKURI_NEEDS: [Need; 3] = [
    Need::at(BodyDoji, 0),
    Need::at(ShadowVeryShort, 0),
    Need::at(ShadowVeryLong, 0),
];

impl CandleRecognizer for TakuriRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_TAKURI")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &TAKURI_NEEDS, 0)
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
            &TAKURI_NEEDS,
            out,
            |w, i| {
                let bar = &bars[i];
                if bar.real_body() <= w.avg(BodyDoji, 0, i)
                    && bar.upper_shadow() < w.avg(ShadowVeryShort, 0, i)
                    && bar.lower_shadow() > w.avg(ShadowVeryLong, 0, i)
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
// MARUBOZU / LINE FAMILY
// ============================================================

/// CDLMARUBOZU - Marubozu
#[derive(Debug, Clone, Copy, Default)]
pub struct MarubozuRecognizer;

const MARUBOZU_NEEDS: [Need; 2] = [Need::at(BodyLong, 0), Need::at(ShadowVeryShort, 0)];

impl CandleRecognizer for MarubozuRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_MARUBOZU")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &MARUBOZU_NEEDS, 0)
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
            &MARUBOZU_NEEDS,
            out,
            |w, i| {
                let bar = &bars[i];
                if bar.real_body() > w.avg(BodyLong, 0, i)
                    && bar.upper_shadow() < w.avg(ShadowVeryShort, 0, i)
                    && bar.lower_shadow() < w.avg(ShadowVeryShort, 0, i)
                {
                    bar.candle_color() * 100
                } else {
                    0
                }
            },
        )
    }
}

/// CDLCLOSINGMARUBOZU - Closing Marubozu (no shadow on the close side)
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosingMarubozuRecognizer;

const CLOSING_MARUBOZU_NEEDS: [Need; 2] = [Need::at(BodyLong, 0), Need::at(ShadowVeryShort, 0)];

impl CandleRecognizer for ClosingMarubozuRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_CLOSINGMARUBOZU")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &CLOSING_MARUBOZU_NEEDS, 0)
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
            &CLOSING_MARUBOZU_NEEDS,
            out,
            |w, i| {
                let bar = &bars[i];
                let very_short = w.avg(ShadowVeryShort, 0, i);
                if bar.real_body() > w.avg(BodyLong, 0, i)
                    && ((bar.is_white() && bar.upper_shadow() < very_short)
                        || (bar.is_black() && bar.lower_shadow() < very_short))
                {
                    bar.candle_color() * 100
                } else {
                    0
                }
            },
        )
    }
}

/// CDLLONGLINE - Long Line Candle
#[derive(Debug, Clone, Copy, Default)]
pub struct LongLineRecognizer;

const LONG_LINE_NEEDS: [Need; 2] = [Need::at(BodyLong, 0), Need::at(ShadowShort, 0)];

impl CandleRecognizer for LongLineRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_LONGLINE")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &LONG_LINE_NEEDS, 0)
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
            &LONG_LINE_NEEDS,
            out,
            |w, i| {
                let bar = &bars[i];
                let short = w.avg(ShadowShort, 0, i);
                if bar.real_body() > w.avg(BodyLong, 0, i)
                    && bar.upper_shadow() < short
                    && bar.lower_shadow() < short
                {
                    bar.candle_color() * 100
                } else {
                    0
                }
            },
        )
    }
}

/// CDLSHORTLINE - Short Line Candle
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortLineRecognizer;

const SHORT_LINE_NEEDS: [Need; 2] = [Need::at(BodyShort, 0), Need::at(ShadowShort, 0)];

impl CandleRecognizer for ShortLineRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_SHORTLINE")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &SHORT_LINE_NEEDS, 0)
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
            &SHORT_LINE_NEEDS,
            out,
            |w, i| {
                let bar = &bars[i];
                let short = w.avg(ShadowShort, 0, i);
                if bar.real_body() < w.avg(BodyShort, 0, i)
                    && bar.upper_shadow() < short
                    && bar.lower_shadow() < short
                {
                    bar.candle_color() * 100
                } else {
                    0
                }
            },
        )
    }
}

/// CDLSPINNINGTOP - Spinning Top
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinningTopRecognizer;

const SPINNING_TOP_NEEDS: [Need; 1] = [Need::at(BodyShort, 0)];

impl CandleRecognizer for SpinningTopRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_SPINNINGTOP")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &SPINNING_TOP_NEEDS, 0)
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
            &SPINNING_TOP_NEEDS,
            out,
            |w, i| {
                let bar = &bars[i];
                let body = bar.real_body();
                if body < w.avg(BodyShort, 0, i)
                    && bar.upper_shadow() > body
                    && bar.lower_shadow() > body
                {
                    bar.candle_color() * 100
                } else {
                    0
                }
            },
        )
    }
}

/// CDLHIGHWAVE - High-Wave Candle
#[derive(Debug, Clone, Copy, Default)]
pub struct HighWaveRecognizer;

const HIGH_WAVE_NEEDS: [Need; 2] = [Need::at(BodyShort, 0), Need::at(ShadowVeryLong, 0)];

impl CandleRecognizer for HighWaveRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_HIGHWAVE")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &HIGH_WAVE_NEEDS, 0)
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
            &HIGH_WAVE_NEEDS,
            out,
            |w, i| {
                let bar = &bars[i];
                let very_long = w.avg(ShadowVeryLong, 0, i);
                if bar.real_body() < w.avg(BodyShort, 0, i)
                    && bar.upper_shadow() > very_long
                    && bar.lower_shadow() > very_long
                {
                    bar.candle_color() * 100
                } else {
                    0
                }
            },
        )
    }
}

/// CDLBELTHOLD - Belt-hold (long bar with no shadow on the open side)
#[derive(Debug, Clone, Copy, Default)]
pub struct BeltHoldRecognizer;

const BELT_HOLD_NEEDS: [Need; 2] = [Need::at(BodyLong, 0), Need::at(ShadowVeryShort, 0)];

impl CandleRecognizer for BeltHoldRecognizer {
    fn id(&self) -> PatternId {
        PatternId("CDL_BELTHOLD")
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        lookback_for(config, &BELT_HOLD_NEEDS, 0)
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
            &BELT_HOLD_NEEDS,
            out,
            |w, i| {
                let bar = &bars[i];
                let very_short = w.avg(ShadowVeryShort, 0, i);
                if bar.real_body() > w.avg(BodyLong, 0, i)
                    && ((bar.is_white() && bar.lower_shadow() < very_short)
                        || (bar.is_black() && bar.upper_shadow() < very_short))
                {
                    bar.candle_color() * 100
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
