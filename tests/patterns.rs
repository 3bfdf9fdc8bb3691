//! Integration tests for the candlescan pattern recognition library.
//!
//! These tests validate the two-operation API (lookback / compute) and the
//! documented end-to-end scenarios.

use candlescan::prelude::*;

/// Simple test bar structure
#[derive(Debug, Clone, Copy)]
struct TestBar {
    o: f64,
    h: f64,
    l: f64,
    c: f64,
}

impl TestBar {
    fn new(o: f64, h: f64, l: f64, c: f64) -> Self {
        Self { o, h, l, c }
    }
}

impl OHLCV for TestBar {
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

/// Deterministic pseudo-random walk, varied enough to exercise every window
fn make_walk(n: usize) -> Vec<TestBar> {
    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0;
    for i in 0..n {
        let drift = ((i * 7 + 13) % 100) as f64 / 50.0 - 1.0;
        let spread = 1.0 + ((i * 3) % 10) as f64 / 5.0;
        let o = price;
        let c = price + drift;
        let h = o.max(c) + spread * 0.5;
        let l = o.min(c) - spread * 0.5;
        bars.push(TestBar::new(o, h, l, c));
        price = c;
    }
    bars
}

fn flat_bars(n: usize) -> Vec<TestBar> {
    (0..n)
        .map(|_| TestBar::new(100.0, 102.0, 98.0, 101.0))
        .collect()
}

// ============================================================
// Lookback / compute agreement
// ============================================================

#[test]
fn lookback_is_first_producible_index_for_every_pattern() {
    let config = CandleConfig::default();
    let bars = make_walk(80);

    for recognizer in Recognizer::all_defaults() {
        let lookback = recognizer.lookback(&config);
        assert!(lookback < bars.len(), "{}", recognizer.id().as_str());

        // At exactly the lookback index a single output is produced...
        let series = recognizer
            .compute(&config, &bars, lookback, lookback)
            .unwrap();
        assert_eq!(
            series.len(),
            1,
            "{} produced no output at its lookback",
            recognizer.id().as_str()
        );
        assert_eq!(series.beg_idx, lookback);

        // ...and one bar earlier the request clamps to empty
        if lookback > 0 {
            let series = recognizer
                .compute(&config, &bars, lookback - 1, lookback - 1)
                .unwrap();
            assert_eq!(
                series.len(),
                0,
                "{} produced output before its lookback",
                recognizer.id().as_str()
            );
        }
    }
}

#[test]
fn raising_a_period_moves_the_lookback() {
    let default_config = CandleConfig::default();
    let slow_config = CandleConfig::default().with(
        SettingKind::BodyDoji,
        CandleSetting::new(RangeType::HighLow, 25, 0.1),
    );

    let doji = DojiRecognizer::with_defaults();
    assert_eq!(CandleRecognizer::lookback(&doji, &default_config), 10);
    assert_eq!(CandleRecognizer::lookback(&doji, &slow_config), 25);
}

// ============================================================
// Output code invariants
// ============================================================

#[test]
fn stateless_patterns_emit_only_plus_minus_100() {
    let config = CandleConfig::default();
    let bars = make_walk(120);

    for recognizer in Recognizer::all_defaults() {
        if recognizer.id() == PatternId("CDL_HIKKAKE") {
            continue;
        }
        let series = recognizer
            .compute(&config, &bars, 0, bars.len() - 1)
            .unwrap();
        for (idx, &code) in series.values.iter().enumerate() {
            assert!(
                matches!(code, -100 | 0 | 100),
                "{} emitted {} at {}",
                recognizer.id().as_str(),
                code,
                series.beg_idx + idx
            );
        }
    }
}

#[test]
fn hikkake_emits_only_documented_codes() {
    let config = CandleConfig::default();
    let bars = make_walk(200);
    let series = HikkakeRecognizer::with_defaults()
        .compute(&config, &bars, 0, bars.len() - 1)
        .unwrap();
    for &code in &series.values {
        assert!(matches!(code, -200 | -100 | 0 | 100 | 200));
    }
}

#[test]
fn prefix_outputs_are_stable_under_longer_ranges() {
    let config = CandleConfig::default();
    let bars = make_walk(100);

    for recognizer in Recognizer::all_defaults() {
        let full = recognizer
            .compute(&config, &bars, 0, bars.len() - 1)
            .unwrap();
        let partial = recognizer.compute(&config, &bars, 0, 59).unwrap();
        assert_eq!(partial.beg_idx, full.beg_idx, "{}", recognizer.id().as_str());
        assert_eq!(
            &partial.values[..],
            &full.values[..partial.len()],
            "{} prefix drifted",
            recognizer.id().as_str()
        );
    }
}

#[test]
fn identical_inputs_produce_identical_outputs() {
    let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
    let bars = make_walk(90);
    let first = engine.scan(&bars).unwrap();
    let second = engine.scan(&bars).unwrap();
    assert_eq!(first, second);
}

// ============================================================
// Scenario: evening doji star
// ============================================================

/// Config with three-bar averaging so a six-bar sequence is past every lookback
fn short_window_config() -> CandleConfig {
    CandleConfig::default()
        .with(
            SettingKind::BodyLong,
            CandleSetting::new(RangeType::RealBody, 3, 1.0),
        )
        .with(
            SettingKind::BodyShort,
            CandleSetting::new(RangeType::RealBody, 3, 1.0),
        )
        .with(
            SettingKind::BodyDoji,
            CandleSetting::new(RangeType::HighLow, 3, 0.1),
        )
}

fn evening_doji_star_bars() -> Vec<TestBar> {
    vec![
        TestBar::new(100.0, 102.0, 98.0, 101.0),
        TestBar::new(100.0, 102.0, 98.0, 101.0),
        TestBar::new(100.0, 102.0, 98.0, 101.0),
        TestBar::new(98.0, 104.5, 97.5, 104.0),     // long white body
        TestBar::new(105.5, 106.0, 105.2, 105.55),  // doji gapping up
        TestBar::new(105.0, 105.2, 101.0, 101.5),   // black closing deep into the body
    ]
}

#[test]
fn evening_doji_star_fires_on_the_reference_sequence() {
    let config = short_window_config();
    let recognizer = EveningDojiStarRecognizer::with_defaults();
    let series = recognizer.compute(&config, &evening_doji_star_bars(), 0, 5).unwrap();
    assert_eq!(series.at(5), -100);
}

#[test]
fn evening_doji_star_zero_when_any_condition_breaks() {
    let config = short_window_config();
    let recognizer = EveningDojiStarRecognizer::with_defaults();

    // Star bar too fat to be a doji
    let mut bars = evening_doji_star_bars();
    bars[4] = TestBar::new(105.2, 106.4, 105.1, 106.2);
    let series = recognizer.compute(&config, &bars, 0, 5).unwrap();
    assert_eq!(series.at(5), 0);

    // Third bar stops short of the 30% penetration
    let mut bars = evening_doji_star_bars();
    bars[5] = TestBar::new(105.0, 105.2, 102.0, 102.5);
    let series = recognizer.compute(&config, &bars, 0, 5).unwrap();
    assert_eq!(series.at(5), 0);

    // Star no longer gaps above the white body
    let mut bars = evening_doji_star_bars();
    bars[4] = TestBar::new(103.5, 104.2, 103.2, 103.55);
    let series = recognizer.compute(&config, &bars, 0, 5).unwrap();
    assert_eq!(series.at(5), 0);
}

// ============================================================
// Scenario: hikkake breakout + delayed confirmation
// ============================================================

#[test]
fn hikkake_confirms_two_bars_later_then_goes_quiet() {
    let mut bars = flat_bars(5);
    bars.push(TestBar::new(100.0, 105.0, 95.0, 101.0)); // 5: wide bar
    bars.push(TestBar::new(100.0, 103.0, 97.0, 101.0)); // 6: inside bar
    bars.push(TestBar::new(100.0, 102.0, 96.0, 99.0)); // 7: lower break -> +100
    bars.push(TestBar::new(100.0, 102.5, 96.5, 100.0)); // 8: drifting, no confirmation
    bars.push(TestBar::new(100.0, 104.5, 99.5, 104.0)); // 9: close above 103 -> +200
    bars.push(TestBar::new(104.0, 105.5, 103.5, 105.0)); // 10: latch is cleared

    let config = CandleConfig::default();
    let series = HikkakeRecognizer::with_defaults()
        .compute(&config, &bars, 0, bars.len() - 1)
        .unwrap();

    assert_eq!(series.at(7), 100);
    assert_eq!(series.at(8), 0);
    assert_eq!(series.at(9), 200);
    // No second confirmation once the latch is cleared
    assert_eq!(series.at(10), 0);
}

#[test]
fn hikkake_warmup_allows_confirmation_of_prefix_breakout() {
    // The breakout fires below the requested range; the confirmation falls
    // inside it and must still be emitted.
    let mut bars = flat_bars(5);
    bars.push(TestBar::new(100.0, 105.0, 95.0, 101.0)); // 5
    bars.push(TestBar::new(100.0, 103.0, 97.0, 101.0)); // 6
    bars.push(TestBar::new(100.0, 102.0, 96.0, 99.0)); // 7: breakout
    bars.push(TestBar::new(100.0, 104.5, 99.0, 104.0)); // 8: confirmation

    let config = CandleConfig::default();
    let mut out = vec![0i32; 1];
    let span = CandleRecognizer::compute_into(
        &HikkakeRecognizer::with_defaults(),
        &config,
        &bars,
        8,
        8,
        &mut out,
    )
    .unwrap();
    assert_eq!(span.beg_idx, 8);
    assert_eq!(out[0], 200);
}

// ============================================================
// Error paths
// ============================================================

#[test]
fn inverted_range_is_rejected_before_any_output() {
    let config = CandleConfig::default();
    let bars = make_walk(20);
    let mut out = vec![7i32; 20];
    let err = CandleRecognizer::compute_into(
        &DojiRecognizer::with_defaults(),
        &config,
        &bars,
        15,
        3,
        &mut out,
    )
    .unwrap_err();
    assert!(matches!(err, CandleError::BadIndexRange { .. }));
    // Output untouched on failure
    assert!(out.iter().all(|&v| v == 7));
}

#[test]
fn range_past_the_data_is_rejected() {
    let config = CandleConfig::default();
    let bars = make_walk(20);
    let mut out = vec![0i32; 32];
    let err = CandleRecognizer::compute_into(
        &DojiRecognizer::with_defaults(),
        &config,
        &bars,
        0,
        25,
        &mut out,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CandleError::BadIndexRange {
            start_idx: 0,
            end_idx: 25,
            len: 20
        }
    ));
}

#[test]
fn negative_penetration_is_rejected_at_construction() {
    assert!(EveningDojiStarRecognizer::new(-0.5).is_err());
    assert!(MatHoldRecognizer::new(f64::NAN).is_err());
    assert!(DarkCloudCoverRecognizer::new(0.7).is_ok());
}

#[test]
fn clamped_empty_range_is_a_trivial_success() {
    let config = CandleConfig::default();
    let bars = make_walk(8);
    let mut out = vec![0i32; 8];
    // Doji lookback is 10 with defaults: the whole request clamps away
    let span = CandleRecognizer::compute_into(
        &DojiRecognizer::with_defaults(),
        &config,
        &bars,
        0,
        7,
        &mut out,
    )
    .unwrap();
    assert_eq!(span.n_elements, 0);
    assert_eq!(span.beg_idx, 0);
}
