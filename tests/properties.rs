//! Property tests for the recognizer contracts.
//!
//! Random bar sequences check the invariants that hold for every pattern:
//! documented output codes, prefix stability, lookback agreement, and the
//! window accumulator staying exact while sliding.

use candlescan::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
struct TestBar {
    o: f64,
    h: f64,
    l: f64,
    c: f64,
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

fn arb_bar() -> impl Strategy<Value = TestBar> {
    (50.0..150.0f64, 0.0..5.0f64, 0.0..5.0f64, -4.0..4.0f64).prop_map(
        |(base, up, down, drift)| {
            let o = base;
            let c = base + drift;
            TestBar {
                o,
                h: o.max(c) + up,
                l: o.min(c) - down,
                c,
            }
        },
    )
}

fn arb_bars(min: usize, max: usize) -> impl Strategy<Value = Vec<TestBar>> {
    prop::collection::vec(arb_bar(), min..max)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn every_output_code_is_documented(bars in arb_bars(20, 80)) {
        let config = CandleConfig::default();
        for recognizer in Recognizer::all_defaults() {
            let series = recognizer.compute(&config, &bars, 0, bars.len() - 1).unwrap();
            let stateful = recognizer.id() == PatternId("CDL_HIKKAKE");
            for &code in &series.values {
                if stateful {
                    prop_assert!(matches!(code, -200 | -100 | 0 | 100 | 200));
                } else {
                    prop_assert!(
                        matches!(code, -100 | 0 | 100),
                        "{} emitted {}",
                        recognizer.id().as_str(),
                        code
                    );
                }
            }
        }
    }

    #[test]
    fn computing_a_longer_range_never_rewrites_the_prefix(
        bars in arb_bars(40, 90),
        cut in 20usize..39,
    ) {
        let config = CandleConfig::default();
        for recognizer in Recognizer::all_defaults() {
            let full = recognizer.compute(&config, &bars, 0, bars.len() - 1).unwrap();
            let partial = recognizer.compute(&config, &bars, 0, cut).unwrap();
            prop_assert_eq!(partial.beg_idx, full.beg_idx);
            prop_assert_eq!(
                &partial.values[..],
                &full.values[..partial.len()],
                "{} prefix drifted",
                recognizer.id().as_str()
            );
        }
    }

    #[test]
    fn lookback_matches_the_first_producible_index(bars in arb_bars(20, 40)) {
        let config = CandleConfig::default();
        for recognizer in Recognizer::all_defaults() {
            let lookback = recognizer.lookback(&config);
            prop_assert!(lookback < bars.len());

            let at = recognizer.compute(&config, &bars, lookback, lookback).unwrap();
            prop_assert_eq!(at.len(), 1);

            if lookback > 0 {
                let before = recognizer
                    .compute(&config, &bars, lookback - 1, lookback - 1)
                    .unwrap();
                prop_assert_eq!(before.len(), 0);
            }
        }
    }

    #[test]
    fn window_sum_stays_exact_while_sliding(bars in arb_bars(25, 60)) {
        let config = CandleConfig::default();
        for kind in [SettingKind::BodyLong, SettingKind::BodyDoji, SettingKind::ShadowShort] {
            let period = config.avg_period(kind);
            let mut sum = WindowSum::prime(&config, &bars, kind, 0, period);
            for i in period..bars.len() - 1 {
                let expected: f64 = bars[i - period..i]
                    .iter()
                    .map(|b| config.range_value(kind, b))
                    .sum();
                prop_assert!((sum.total() - expected).abs() < 1e-6);
                sum.advance(&config, &bars, i);
            }
        }
    }

    #[test]
    fn scans_are_deterministic(bars in arb_bars(20, 60)) {
        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
        let first = engine.scan(&bars).unwrap();
        let second = engine.scan(&bars).unwrap();
        prop_assert_eq!(first, second);
    }
}
