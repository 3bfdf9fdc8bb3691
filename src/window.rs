//! Incremental window aggregation.
//!
//! Every recognizer compares per-bar metrics against trailing averages. Those
//! averages are maintained here as running sums that advance in O(1) per bar:
//! subtract the value leaving the window, add the value entering it. The sums
//! are recomputed from scratch only once, when a computation is primed.
//!
//! A recognizer declares its windows as a list of [`Need`]s: a setting kind
//! plus the bar offset (0 = current bar, 1 = previous bar, ...) at which that
//! kind's average is evaluated. The same declaration drives both the lookback
//! arithmetic and the priming of the sums, so the two cannot drift apart.

use crate::settings::{range_value, CandleConfig, RangeType, SettingKind};
use crate::{CandleError, OutSpan, Result, OHLCV};

// ============================================================
// WINDOW SUM
// ============================================================

/// Running total of one setting kind's range values over a trailing window.
///
/// Invariant: `total` equals the sum of the range value over the half-open
/// index interval `[trailing, trailing + period)`.
#[derive(Debug, Clone, Copy)]
pub struct WindowSum {
    kind: SettingKind,
    total: f64,
    trailing: usize,
}

impl WindowSum {
    /// Sum the range values over `[from, to)`. `trailing` starts at `from`.
    pub fn prime<T: OHLCV>(
        config: &CandleConfig,
        bars: &[T],
        kind: SettingKind,
        from: usize,
        to: usize,
    ) -> Self {
        let mut total = 0.0;
        for bar in &bars[from..to] {
            total += config.range_value(kind, bar);
        }
        Self {
            kind,
            total,
            trailing: from,
        }
    }

    /// Slide the window forward one bar: `entering` joins, the trailing bar
    /// leaves.
    #[inline]
    pub fn advance<T: OHLCV>(&mut self, config: &CandleConfig, bars: &[T], entering: usize) {
        self.total += config.range_value(self.kind, &bars[entering])
            - config.range_value(self.kind, &bars[self.trailing]);
        self.trailing += 1;
    }

    /// The scaled trailing average, referenced at bar `at`.
    ///
    /// With `avg_period == 0` the bar at `at` supplies its own average (spot
    /// value). The Shadows range type sums two shadows per bar, so its average
    /// is halved to stay a per-shadow quantity.
    #[inline]
    pub fn average<T: OHLCV>(&self, config: &CandleConfig, bars: &[T], at: usize) -> f64 {
        let setting = config.setting(self.kind);
        let base = if setting.avg_period == 0 {
            range_value(setting.range_type, &bars[at])
        } else {
            self.total / setting.avg_period as f64
        };
        let divisor = if setting.range_type == RangeType::Shadows {
            2.0
        } else {
            1.0
        };
        setting.factor * base / divisor
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.total
    }

    #[inline]
    pub fn trailing(&self) -> usize {
        self.trailing
    }
}

// ============================================================
// NEEDS & LOOKBACK
// ============================================================

/// One windowed average a recognizer evaluates: `kind` at bar offset `offset`
/// behind the output bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Need {
    pub kind: SettingKind,
    pub offset: usize,
}

impl Need {
    pub const fn at(kind: SettingKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

/// Minimum prefix length consumed before the first output bar.
///
/// Each need requires `avg_period(kind) + offset` prior bars; `min_history`
/// covers fixed-offset comparisons with no rolling average attached (e.g. a
/// five-bar shape with no averaged metric still needs four prior bars).
pub fn lookback_for(config: &CandleConfig, needs: &[Need], min_history: usize) -> usize {
    needs
        .iter()
        .map(|n| config.avg_period(n.kind) + n.offset)
        .chain(std::iter::once(min_history))
        .max()
        .unwrap_or(min_history)
}

// ============================================================
// WINDOW SET
// ============================================================

/// All running sums of one in-flight computation, keyed by `(kind, offset)`.
#[derive(Debug)]
pub struct WindowSet<'a, T: OHLCV> {
    config: &'a CandleConfig,
    bars: &'a [T],
    entries: Vec<(Need, WindowSum)>,
}

impl<'a, T: OHLCV> WindowSet<'a, T> {
    /// Prime one sum per need so that each is positioned for output bar
    /// `start`: the window for `(kind, offset)` covers
    /// `[start - offset - period, start - offset)`.
    pub fn prime(config: &'a CandleConfig, bars: &'a [T], needs: &[Need], start: usize) -> Self {
        let entries = needs
            .iter()
            .map(|n| {
                let to = start - n.offset;
                let from = to - config.avg_period(n.kind);
                (*n, WindowSum::prime(config, bars, n.kind, from, to))
            })
            .collect();
        Self {
            config,
            bars,
            entries,
        }
    }

    /// The scaled average for `kind` declared at `offset`, evaluated while
    /// producing output bar `i` (reference bar `i - offset`).
    ///
    /// Asking for a `(kind, offset)` pair that was not declared is a
    /// programmer error and panics.
    #[inline]
    pub fn avg(&self, kind: SettingKind, offset: usize, i: usize) -> f64 {
        let (_, sum) = self
            .entries
            .iter()
            .find(|(n, _)| n.kind == kind && n.offset == offset)
            .unwrap_or_else(|| panic!("window not primed for {} at offset {offset}", kind.as_str()));
        sum.average(self.config, self.bars, i - offset)
    }

    /// Slide every window one bar forward after producing output bar `i`.
    #[inline]
    pub fn advance(&mut self, i: usize) {
        for (need, sum) in &mut self.entries {
            sum.advance(self.config, self.bars, i - need.offset);
        }
    }
}

// ============================================================
// OUTPUT WRITER
// ============================================================

/// Append-only strength-code writer.
///
/// Indices are written strictly ascending, each exactly once, and every read
/// a rule performs for output bar `i` happens before the write of `i`. That
/// loop discipline is the API contract that makes prefix outputs stable
/// regardless of how the caller slices the request range.
#[derive(Debug)]
pub struct OutBuf<'a> {
    out: &'a mut [i32],
    pos: usize,
}

impl<'a> OutBuf<'a> {
    pub fn new(out: &'a mut [i32]) -> Self {
        Self { out, pos: 0 }
    }

    #[inline]
    pub fn push(&mut self, code: i32) {
        self.out[self.pos] = code;
        self.pos += 1;
    }

    pub fn finish(self, beg_idx: usize) -> OutSpan {
        OutSpan {
            beg_idx,
            n_elements: self.pos,
        }
    }
}

// ============================================================
// SHARED DRIVER
// ============================================================

pub(crate) fn validate_range<T: OHLCV>(
    bars: &[T],
    start_idx: usize,
    end_idx: usize,
) -> Result<()> {
    if start_idx > end_idx || end_idx >= bars.len() {
        return Err(CandleError::BadIndexRange {
            start_idx,
            end_idx,
            len: bars.len(),
        });
    }
    Ok(())
}

/// Run one memoryless recognizer over `[start_idx, end_idx]`.
///
/// Clamps the start to `lookback`, primes the declared windows, then walks the
/// range once: evaluate `rule` at `i`, write its code, slide the windows. The
/// empty clamped range is a trivial success.
pub fn run_recognizer<T: OHLCV>(
    config: &CandleConfig,
    bars: &[T],
    start_idx: usize,
    end_idx: usize,
    lookback: usize,
    needs: &[Need],
    out: &mut [i32],
    mut rule: impl FnMut(&WindowSet<'_, T>, usize) -> i32,
) -> Result<OutSpan> {
    validate_range(bars, start_idx, end_idx)?;
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

    let mut windows = WindowSet::prime(config, bars, needs, start);
    let mut writer = OutBuf::new(&mut out[..span]);
    for i in start..=end_idx {
        writer.push(rule(&windows, i));
        if i < end_idx {
            windows.advance(i);
        }
    }
    Ok(writer.finish(start))
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CandleSetting;
    use crate::OHLCVExt;

    #[derive(Debug, Clone, Copy)]
    struct Bar {
        o: f64,
        h: f64,
        l: f64,
        c: f64,
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

    fn bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let base = 100.0 + (i as f64) * 0.7;
                let spread = 1.0 + (i % 4) as f64;
                Bar {
                    o: base,
                    h: base + spread,
                    l: base - spread,
                    c: base + spread * 0.5,
                }
            })
            .collect()
    }

    #[test]
    fn test_running_total_matches_recompute() {
        let config = CandleConfig::default();
        let bars = bars(40);
        let kind = SettingKind::BodyLong;
        let period = config.avg_period(kind);

        let mut sum = WindowSum::prime(&config, &bars, kind, 0, period);
        for i in period..bars.len() - 1 {
            let expected: f64 = bars[i - period..i]
                .iter()
                .map(|b| config.range_value(kind, b))
                .sum();
            assert!((sum.total() - expected).abs() < 1e-9, "drift at {i}");
            sum.advance(&config, &bars, i);
        }
    }

    #[test]
    fn test_average_period_zero_uses_spot_value() {
        let config = CandleConfig::default();
        let bars = bars(5);
        // shadow_long has avg_period 0: average == factor * real body at `at`
        let sum = WindowSum::prime(&config, &bars, SettingKind::ShadowLong, 3, 3);
        let avg = sum.average(&config, &bars, 3);
        assert!((avg - bars[3].real_body()).abs() < 1e-12);
    }

    #[test]
    fn test_shadows_average_halved() {
        let config = CandleConfig::default();
        let bars = bars(20);
        let kind = SettingKind::ShadowShort;
        let period = config.avg_period(kind);
        let sum = WindowSum::prime(&config, &bars, kind, 0, period);
        let expected: f64 = bars[..period]
            .iter()
            .map(|b| b.upper_shadow() + b.lower_shadow())
            .sum::<f64>()
            / period as f64
            / 2.0;
        assert!((sum.average(&config, &bars, period) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_lookback_for_takes_per_need_maximum() {
        let config = CandleConfig::default();
        let needs = [
            Need::at(SettingKind::BodyLong, 2),  // 10 + 2
            Need::at(SettingKind::Near, 1),      // 5 + 1
            Need::at(SettingKind::ShadowLong, 0), // 0
        ];
        assert_eq!(lookback_for(&config, &needs, 2), 12);

        // Raising one period moves the maximum
        let config = config.with(
            SettingKind::Near,
            CandleSetting::new(RangeType::HighLow, 30, 0.2),
        );
        assert_eq!(lookback_for(&config, &needs, 2), 31);
    }

    #[test]
    fn test_lookback_for_floors_at_min_history() {
        let config = CandleConfig::default();
        assert_eq!(lookback_for(&config, &[], 4), 4);
    }

    #[test]
    fn test_run_recognizer_trivial_when_clamped_past_end() {
        let config = CandleConfig::default();
        let bars = bars(8);
        let mut out = [0i32; 8];
        let span = run_recognizer(&config, &bars, 0, 3, 10, &[], &mut out, |_, _| 100).unwrap();
        assert_eq!(span.n_elements, 0);
    }

    #[test]
    fn test_run_recognizer_rejects_inverted_range() {
        let config = CandleConfig::default();
        let bars = bars(8);
        let mut out = [0i32; 8];
        let err = run_recognizer(&config, &bars, 5, 2, 0, &[], &mut out, |_, _| 0).unwrap_err();
        assert!(matches!(err, CandleError::BadIndexRange { .. }));
    }

    #[test]
    fn test_run_recognizer_rejects_short_output() {
        let config = CandleConfig::default();
        let bars = bars(8);
        let mut out = [0i32; 2];
        let err = run_recognizer(&config, &bars, 0, 7, 0, &[], &mut out, |_, _| 0).unwrap_err();
        assert!(matches!(err, CandleError::OutputTooSmall { need: 8, got: 2 }));
    }

    #[test]
    fn test_window_set_avg_matches_direct_sum() {
        let config = CandleConfig::default();
        let bars = bars(30);
        let needs = [Need::at(SettingKind::BodyDoji, 1)];
        let start = 15;
        let mut set = WindowSet::prime(&config, &bars, &needs, start);

        for i in start..25 {
            let at = i - 1;
            let period = config.avg_period(SettingKind::BodyDoji);
            let expected: f64 = bars[at - period..at]
                .iter()
                .map(|b| b.hl_range())
                .sum::<f64>()
                / period as f64
                * 0.1;
            assert!((set.avg(SettingKind::BodyDoji, 1, i) - expected).abs() < 1e-9);
            set.advance(i);
        }
    }
}
