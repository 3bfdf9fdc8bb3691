//! # candlescan
//!
//! Incremental sliding-window candlestick pattern recognition.
//!
//! Each recognizer classifies bars against trailing averages maintained as
//! O(1)-per-bar running sums, and emits one signed strength code per bar:
//! `±100` for a definite pattern, `0` for absence, `±200` for the confirmed
//! form of the one latched pattern (Hikkake).
//!
//! ## Quick Start
//!
//! ```rust
//! use candlescan::prelude::*;
//!
//! // Define your OHLCV data
//! struct Bar { o: f64, h: f64, l: f64, c: f64 }
//!
//! impl OHLCV for Bar {
//!     fn open(&self) -> f64 { self.o }
//!     fn high(&self) -> f64 { self.h }
//!     fn low(&self) -> f64 { self.l }
//!     fn close(&self) -> f64 { self.c }
//! }
//!
//! // Create engine with default recognizers
//! let engine = EngineBuilder::new()
//!     .with_all_defaults()
//!     .build()
//!     .unwrap();
//!
//! // Scan your data
//! let bars: Vec<Bar> = vec![];
//! let series = engine.scan(&bars).unwrap();
//! assert!(series.is_empty());
//! ```

pub mod recognizers;
pub mod settings;
pub mod window;

pub mod prelude {
    pub use crate::{
        // Recognizers
        recognizers::*,
        // Settings
        settings::{CandleConfig, CandleSetting, RangeType, SettingKind},
        // Windows
        window::{lookback_for, run_recognizer, Need, WindowSet, WindowSum},
        // Parallel
        scan_parallel,
        // Engine
        CandleEngine,
        // Core traits
        CandleRecognizer,
        DynCandleRecognizer,
        EngineBuilder,
        EngineOptions,
        OHLCVExt,
        // Errors
        CandleError,
        // Types
        OutSpan,
        PatternId,
        PatternSeries,
        Penetration,
        Recognizer,
        Result,
        ScanError,
        ScanResult,
        OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, CandleError>;

/// Errors that can occur during pattern recognition
#[derive(Debug, Clone, thiserror::Error)]
pub enum CandleError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Index range {start_idx}..={end_idx} is invalid for {len} bars")]
    BadIndexRange {
        start_idx: usize,
        end_idx: usize,
        len: usize,
    },

    #[error("Output buffer too small: need {need}, got {got}")]
    OutputTooSmall { need: usize, got: usize },

    #[error("Invalid OHLCV at index {index}: {reason}")]
    InvalidOHLCV { index: usize, reason: &'static str },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Penetration depth into a prior real body, as a fraction of that body.
///
/// `0.3` means "must close at least 30% into the first candle's body".
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Penetration(f64);

impl Penetration {
    /// Create a new Penetration, validating the value is finite and >= 0
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(CandleError::InvalidValue(
                "Penetration cannot be NaN or infinite",
            ));
        }
        if value < 0.0 {
            return Err(CandleError::OutOfRange {
                field: "Penetration",
                value,
                min: 0.0,
                max: f64::MAX,
            });
        }
        Ok(Self(value))
    }

    /// Create a Penetration from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Penetration {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Penetration {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Penetration::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;

    /// Carried for callers that have it; no builtin recognizer reads volume.
    fn volume(&self) -> f64 {
        0.0
    }

    fn timestamp(&self) -> Option<i64> {
        None
    }
}

/// Blanket impl for references to dyn OHLCV
impl OHLCV for &dyn OHLCV {
    fn open(&self) -> f64 {
        (*self).open()
    }

    fn high(&self) -> f64 {
        (*self).high()
    }

    fn low(&self) -> f64 {
        (*self).low()
    }

    fn close(&self) -> f64 {
        (*self).close()
    }

    fn volume(&self) -> f64 {
        (*self).volume()
    }

    fn timestamp(&self) -> Option<i64> {
        (*self).timestamp()
    }
}

/// Extension trait with the per-bar shape metrics recognizers work from
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn real_body(&self) -> f64 {
        (self.close() - self.open()).abs()
    }

    #[inline]
    fn hl_range(&self) -> f64 {
        self.high() - self.low()
    }

    #[inline]
    fn upper_shadow(&self) -> f64 {
        self.high() - self.open().max(self.close())
    }

    #[inline]
    fn lower_shadow(&self) -> f64 {
        self.open().min(self.close()) - self.low()
    }

    /// +1 for a white bar (close >= open), -1 for a black one.
    #[inline]
    fn candle_color(&self) -> i32 {
        if self.close() >= self.open() {
            1
        } else {
            -1
        }
    }

    #[inline]
    fn is_white(&self) -> bool {
        self.close() >= self.open()
    }

    #[inline]
    fn is_black(&self) -> bool {
        self.close() < self.open()
    }

    #[inline]
    fn body_top(&self) -> f64 {
        self.open().max(self.close())
    }

    #[inline]
    fn body_bottom(&self) -> f64 {
        self.open().min(self.close())
    }

    /// Real bodies do not overlap, this bar's strictly above the prior one's.
    #[inline]
    fn real_body_gap_up<U: OHLCV>(&self, prior: &U) -> bool {
        self.open().min(self.close()) > prior.open().max(prior.close())
    }

    /// Real bodies do not overlap, this bar's strictly below the prior one's.
    #[inline]
    fn real_body_gap_down<U: OHLCV>(&self, prior: &U) -> bool {
        self.open().max(self.close()) < prior.open().min(prior.close())
    }

    /// Full-range gap up: this bar's low above the prior bar's high.
    #[inline]
    fn candle_gap_up<U: OHLCV>(&self, prior: &U) -> bool {
        self.low() > prior.high()
    }

    /// Full-range gap down: this bar's high below the prior bar's low.
    #[inline]
    fn candle_gap_down<U: OHLCV>(&self, prior: &U) -> bool {
        self.high() < prior.low()
    }

    /// Validate OHLCV data consistency
    fn validate(&self) -> Result<()> {
        if self.high() < self.low() {
            return Err(CandleError::InvalidOHLCV {
                index: 0,
                reason: "high < low",
            });
        }
        if self.open().is_nan()
            || self.high().is_nan()
            || self.low().is_nan()
            || self.close().is_nan()
        {
            return Err(CandleError::InvalidOHLCV {
                index: 0,
                reason: "NaN in OHLCV",
            });
        }
        if self.open().is_infinite()
            || self.high().is_infinite()
            || self.low().is_infinite()
            || self.close().is_infinite()
        {
            return Err(CandleError::InvalidOHLCV {
                index: 0,
                reason: "Infinite value in OHLCV",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV> OHLCVExt for T {}

// ============================================================
// OUTPUT TYPES
// ============================================================

/// Unique identifier for a pattern type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternId(pub &'static str);

impl PatternId {
    /// Returns the string identifier
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Where a computation's output landed: the index of the first produced code
/// and how many codes were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutSpan {
    pub beg_idx: usize,
    pub n_elements: usize,
}

impl OutSpan {
    pub const fn empty() -> Self {
        Self {
            beg_idx: 0,
            n_elements: 0,
        }
    }
}

/// One recognizer's strength codes over a bar sequence.
///
/// `values[k]` is the code for bar `beg_idx + k`; bars before `beg_idx` fall
/// inside the lookback prefix and have no code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSeries {
    pub id: PatternId,
    pub beg_idx: usize,
    pub values: Vec<i32>,
}

impl PatternSeries {
    /// Code at an absolute bar index; `0` outside the produced span.
    #[inline]
    pub fn at(&self, bar_index: usize) -> i32 {
        if bar_index < self.beg_idx {
            return 0;
        }
        self.values
            .get(bar_index - self.beg_idx)
            .copied()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(bar_index, code)` over the non-zero codes.
    pub fn matches(&self) -> impl Iterator<Item = (usize, i32)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0)
            .map(|(k, &v)| (self.beg_idx + k, v))
    }
}

// ============================================================
// RECOGNIZER TRAITS
// ============================================================

use settings::CandleConfig;

/// Generic pattern recognizer trait - for concrete types
///
/// Two operations per pattern: `lookback` reports the minimum prefix the
/// computation consumes, `compute_into` produces one signed code per bar of
/// the (clamped) request range. Both derive from the same window declarations,
/// so they agree by construction.
pub trait CandleRecognizer: Send + Sync {
    fn id(&self) -> PatternId;

    /// Minimum index at which the first output can be produced.
    fn lookback(&self, config: &CandleConfig) -> usize;

    /// Write codes for `[max(start_idx, lookback), end_idx]` into `out`
    /// starting at offset 0.
    fn compute_into<T: OHLCV>(
        &self,
        config: &CandleConfig,
        bars: &[T],
        start_idx: usize,
        end_idx: usize,
        out: &mut [i32],
    ) -> Result<OutSpan>;

    /// Allocating convenience wrapper around
    /// [`compute_into`](CandleRecognizer::compute_into).
    fn compute<T: OHLCV>(
        &self,
        config: &CandleConfig,
        bars: &[T],
        start_idx: usize,
        end_idx: usize,
    ) -> Result<PatternSeries>
    where
        Self: Sized,
    {
        window::validate_range(bars, start_idx, end_idx)?;
        let mut values = vec![0i32; end_idx - start_idx + 1];
        let span = self.compute_into(config, bars, start_idx, end_idx, &mut values)?;
        values.truncate(span.n_elements);
        Ok(PatternSeries {
            id: self.id(),
            beg_idx: span.beg_idx,
            values,
        })
    }
}

/// Object-safe recognizer trait - for custom recognizers
pub trait DynCandleRecognizer: Send + Sync {
    fn id(&self) -> PatternId;
    fn lookback(&self, config: &CandleConfig) -> usize;
    fn compute_into(
        &self,
        config: &CandleConfig,
        bars: &[&dyn OHLCV],
        start_idx: usize,
        end_idx: usize,
        out: &mut [i32],
    ) -> Result<OutSpan>;
}

impl<R: CandleRecognizer> DynCandleRecognizer for R {
    fn id(&self) -> PatternId {
        CandleRecognizer::id(self)
    }

    fn lookback(&self, config: &CandleConfig) -> usize {
        CandleRecognizer::lookback(self, config)
    }

    fn compute_into(
        &self,
        config: &CandleConfig,
        bars: &[&dyn OHLCV],
        start_idx: usize,
        end_idx: usize,
        out: &mut [i32],
    ) -> Result<OutSpan> {
        CandleRecognizer::compute_into(self, config, bars, start_idx, end_idx, out)
    }
}

// ============================================================
// BUILTIN RECOGNIZERS - generated via macro
// ============================================================

use recognizers::*;

/// Macro to generate the Recognizer enum without boilerplate
macro_rules! define_recognizers {
    (
        $(
            $variant:ident($recognizer:ty)
        ),* $(,)?
    ) => {
        /// All builtin recognizers - fast path via enum dispatch
        #[derive(Debug, Clone)]
        pub enum Recognizer {
            $($variant($recognizer)),*
        }

        impl Recognizer {
            /// One of each builtin recognizer, default-configured.
            pub fn all_defaults() -> Vec<Recognizer> {
                vec![$(Self::$variant(Default::default())),*]
            }

            #[inline]
            pub fn id(&self) -> PatternId {
                match self {
                    $(Self::$variant(r) => CandleRecognizer::id(r)),*
                }
            }

            #[inline]
            pub fn lookback(&self, config: &CandleConfig) -> usize {
                match self {
                    $(Self::$variant(r) => CandleRecognizer::lookback(r, config)),*
                }
            }

            #[inline]
            pub fn compute_into<T: OHLCV>(
                &self,
                config: &CandleConfig,
                bars: &[T],
                start_idx: usize,
                end_idx: usize,
                out: &mut [i32],
            ) -> Result<OutSpan> {
                match self {
                    $(Self::$variant(r) => {
                        CandleRecognizer::compute_into(r, config, bars, start_idx, end_idx, out)
                    }),*
                }
            }

            pub fn compute<T: OHLCV>(
                &self,
                config: &CandleConfig,
                bars: &[T],
                start_idx: usize,
                end_idx: usize,
            ) -> Result<PatternSeries> {
                match self {
                    $(Self::$variant(r) => {
                        CandleRecognizer::compute(r, config, bars, start_idx, end_idx)
                    }),*
                }
            }
        }
    };
}

// Apply macro - all 60 patterns
define_recognizers! {
    // Single bar (17)
    Doji(DojiRecognizer),
    DragonflyDoji(DragonflyDojiRecognizer),
    GravestoneDoji(GravestoneDojiRecognizer),
    LongLeggedDoji(LongLeggedDojiRecognizer),
    RickshawMan(RickshawManRecognizer),
    Hammer(HammerRecognizer),
    HangingMan(HangingManRecognizer),
    InvertedHammer(InvertedHammerRecognizer),
    ShootingStar(ShootingStarRecognizer),
    Takuri(TakuriRecognizer),
    Marubozu(MarubozuRecognizer),
    ClosingMarubozu(ClosingMarubozuRecognizer),
    LongLine(LongLineRecognizer),
    ShortLine(ShortLineRecognizer),
    SpinningTop(SpinningTopRecognizer),
    HighWave(HighWaveRecognizer),
    BeltHold(BeltHoldRecognizer),

    // Two bar (15)
    Engulfing(EngulfingRecognizer),
    Harami(HaramiRecognizer),
    HaramiCross(HaramiCrossRecognizer),
    Piercing(PiercingRecognizer),
    DarkCloudCover(DarkCloudCoverRecognizer),
    DojiStar(DojiStarRecognizer),
    Counterattack(CounterattackRecognizer),
    InNeck(InNeckRecognizer),
    OnNeck(OnNeckRecognizer),
    Thrusting(ThrustingRecognizer),
    Kicking(KickingRecognizer),
    KickingByLength(KickingByLengthRecognizer),
    MatchingLow(MatchingLowRecognizer),
    HomingPigeon(HomingPigeonRecognizer),
    SeparatingLines(SeparatingLinesRecognizer),

    // Three bar (22)
    TwoCrows(TwoCrowsRecognizer),
    UpsideGapTwoCrows(UpsideGapTwoCrowsRecognizer),
    IdenticalThreeCrows(IdenticalThreeCrowsRecognizer),
    ThreeBlackCrows(ThreeBlackCrowsRecognizer),
    ThreeWhiteSoldiers(ThreeWhiteSoldiersRecognizer),
    ThreeInside(ThreeInsideRecognizer),
    ThreeOutside(ThreeOutsideRecognizer),
    ThreeLineStrike(ThreeLineStrikeRecognizer),
    ThreeStarsInSouth(ThreeStarsInSouthRecognizer),
    MorningStar(MorningStarRecognizer),
    EveningStar(EveningStarRecognizer),
    MorningDojiStar(MorningDojiStarRecognizer),
    EveningDojiStar(EveningDojiStarRecognizer),
    AbandonedBaby(AbandonedBabyRecognizer),
    AdvanceBlock(AdvanceBlockRecognizer),
    StalledPattern(StalledPatternRecognizer),
    StickSandwich(StickSandwichRecognizer),
    TasukiGap(TasukiGapRecognizer),
    Tristar(TristarRecognizer),
    UniqueThreeRiver(UniqueThreeRiverRecognizer),
    GapSideSideWhite(GapSideSideWhiteRecognizer),
    XSideGapThreeMethods(XSideGapThreeMethodsRecognizer),

    // Multi-bar (6)
    Breakaway(BreakawayRecognizer),
    ConcealingBabySwallow(ConcealingBabySwallowRecognizer),
    Hikkake(HikkakeRecognizer),
    LadderBottom(LadderBottomRecognizer),
    MatHold(MatHoldRecognizer),
    RiseFallThreeMethods(RiseFallThreeMethodsRecognizer),
}

// ============================================================
// ENGINE
// ============================================================

/// Engine options
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    pub validate_data: bool,
    pub pattern_filter: Option<Vec<PatternId>>,
}

/// Main recognition engine: a candle config plus a recognizer set
pub struct CandleEngine {
    config: CandleConfig,
    builtin: Vec<Recognizer>,
    custom: Vec<Box<dyn DynCandleRecognizer>>,
    options: EngineOptions,
}

impl CandleEngine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    #[inline]
    pub fn config(&self) -> &CandleConfig {
        &self.config
    }

    /// Scan the full bar sequence with every included recognizer.
    pub fn scan<T: OHLCV>(&self, bars: &[T]) -> Result<Vec<PatternSeries>> {
        if self.options.validate_data {
            self.validate_bars(bars)?;
        }
        if bars.is_empty() {
            return Ok(Vec::new());
        }
        self.scan_range(bars, 0, bars.len() - 1)
    }

    /// Scan a sub-range `[start_idx, end_idx]` of the bar sequence.
    pub fn scan_range<T: OHLCV>(
        &self,
        bars: &[T],
        start_idx: usize,
        end_idx: usize,
    ) -> Result<Vec<PatternSeries>> {
        window::validate_range(bars, start_idx, end_idx)?;
        let mut results = Vec::new();

        // Fast path: builtin recognizers (enum dispatch, no vtable)
        for recognizer in &self.builtin {
            if !self.included(recognizer.id()) {
                continue;
            }
            results.push(recognizer.compute(&self.config, bars, start_idx, end_idx)?);
        }

        // Slow path: custom recognizers (vtable)
        if !self.custom.is_empty() {
            let bar_refs: Vec<&dyn OHLCV> = bars.iter().map(|b| b as &dyn OHLCV).collect();
            for recognizer in &self.custom {
                if !self.included(recognizer.id()) {
                    continue;
                }
                let mut values = vec![0i32; end_idx - start_idx + 1];
                let span = recognizer.compute_into(
                    &self.config,
                    &bar_refs,
                    start_idx,
                    end_idx,
                    &mut values,
                )?;
                values.truncate(span.n_elements);
                results.push(PatternSeries {
                    id: recognizer.id(),
                    beg_idx: span.beg_idx,
                    values,
                });
            }
        }

        Ok(results)
    }

    fn included(&self, id: PatternId) -> bool {
        match &self.options.pattern_filter {
            Some(filter) => filter.contains(&id),
            None => true,
        }
    }

    fn validate_bars<T: OHLCV>(&self, bars: &[T]) -> Result<()> {
        for (i, bar) in bars.iter().enumerate() {
            bar.validate().map_err(|e| match e {
                CandleError::InvalidOHLCV { reason, .. } => {
                    CandleError::InvalidOHLCV { index: i, reason }
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating CandleEngine instances
pub struct EngineBuilder {
    config: CandleConfig,
    builtin: Vec<Recognizer>,
    custom: Vec<Box<dyn DynCandleRecognizer>>,
    options: EngineOptions,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate an array of `Recognizer` variants using `Default::default()` for each inner type.
macro_rules! recognizer_defaults {
  ($($variant:ident),* $(,)?) => {
    [$(Recognizer::$variant(Default::default())),*]
  };
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: CandleConfig::default(),
            builtin: Vec::new(),
            custom: Vec::new(),
            options: EngineOptions::default(),
        }
    }

    /// Replace the candle classification settings
    pub fn candle_config(mut self, config: CandleConfig) -> Self {
        self.config = config;
        self
    }

    /// Add all builtin patterns with default configurations
    pub fn with_all_defaults(self) -> Self {
        self.with_single_bar_defaults()
            .with_two_bar_defaults()
            .with_three_bar_defaults()
            .with_multi_bar_defaults()
    }

    /// Add only single-bar patterns with defaults (17)
    pub fn with_single_bar_defaults(mut self) -> Self {
        self.builtin.extend(recognizer_defaults![
            Doji,
            DragonflyDoji,
            GravestoneDoji,
            LongLeggedDoji,
            RickshawMan,
            Hammer,
            HangingMan,
            InvertedHammer,
            ShootingStar,
            Takuri,
            Marubozu,
            ClosingMarubozu,
            LongLine,
            ShortLine,
            SpinningTop,
            HighWave,
            BeltHold,
        ]);
        self
    }

    /// Add two-bar patterns with defaults (15)
    pub fn with_two_bar_defaults(mut self) -> Self {
        self.builtin.extend(recognizer_defaults![
            Engulfing,
            Harami,
            HaramiCross,
            Piercing,
            DarkCloudCover,
            DojiStar,
            Counterattack,
            InNeck,
            OnNeck,
            Thrusting,
            Kicking,
            KickingByLength,
            MatchingLow,
            HomingPigeon,
            SeparatingLines,
        ]);
        self
    }

    /// Add three-bar patterns with defaults (22)
    pub fn with_three_bar_defaults(mut self) -> Self {
        self.builtin.extend(recognizer_defaults![
            TwoCrows,
            UpsideGapTwoCrows,
            IdenticalThreeCrows,
            ThreeBlackCrows,
            ThreeWhiteSoldiers,
            ThreeInside,
            ThreeOutside,
            ThreeLineStrike,
            ThreeStarsInSouth,
            MorningStar,
            EveningStar,
            MorningDojiStar,
            EveningDojiStar,
            AbandonedBaby,
            AdvanceBlock,
            StalledPattern,
            StickSandwich,
            TasukiGap,
            Tristar,
            UniqueThreeRiver,
            GapSideSideWhite,
            XSideGapThreeMethods,
        ]);
        self
    }

    /// Add multi-bar patterns with defaults (6)
    pub fn with_multi_bar_defaults(mut self) -> Self {
        self.builtin.extend(recognizer_defaults![
            Breakaway,
            ConcealingBabySwallow,
            Hikkake,
            LadderBottom,
            MatHold,
            RiseFallThreeMethods,
        ]);
        self
    }

    /// Add a builtin recognizer
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, recognizer: Recognizer) -> Self {
        self.builtin.push(recognizer);
        self
    }

    /// Add a custom recognizer (slow path)
    pub fn add_custom<R: DynCandleRecognizer + 'static>(mut self, recognizer: R) -> Self {
        self.custom.push(Box::new(recognizer));
        self
    }

    /// Enable/disable data validation
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.options.validate_data = enable;
        self
    }

    /// Filter to specific patterns only
    pub fn only_patterns(mut self, ids: impl IntoIterator<Item = PatternId>) -> Self {
        self.options.pattern_filter = Some(ids.into_iter().collect());
        self
    }

    /// Build the engine, validating the candle config
    pub fn build(self) -> Result<CandleEngine> {
        self.config.validate()?;
        Ok(CandleEngine {
            config: self.config,
            builtin: self.builtin,
            custom: self.custom,
            options: self.options,
        })
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Result of scanning a single instrument
#[derive(Debug)]
pub struct ScanResult {
    pub symbol: String,
    pub series: Vec<PatternSeries>,
}

/// Error from scanning a single instrument
#[derive(Debug)]
pub struct ScanError {
    pub symbol: String,
    pub error: CandleError,
}

/// Parallel scanning of multiple instruments
pub fn scan_parallel<'a, T, I>(
    engine: &CandleEngine,
    instruments: I,
) -> (Vec<ScanResult>, Vec<ScanError>)
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| {
            engine
                .scan(bars)
                .map(|series| ScanResult {
                    symbol: symbol.to_string(),
                    series,
                })
                .map_err(|error| ScanError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{CandleSetting, RangeType, SettingKind};
    use crate::window::run_recognizer;

    /// Test OHLCV bar
    #[derive(Debug, Clone)]
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

    fn make_flat_bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let base = 100.0 + (i % 3) as f64;
                Bar::new(base, base + 2.0, base - 2.0, base + 1.0)
            })
            .collect()
    }

    #[test]
    fn test_penetration_validation() {
        assert!(Penetration::new(0.0).is_ok());
        assert!(Penetration::new(0.3).is_ok());
        assert!(Penetration::new(2.0).is_ok());
        assert!(Penetration::new(-0.1).is_err());
        assert!(Penetration::new(f64::NAN).is_err());
        assert!(Penetration::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_ohlcv_ext_metrics() {
        let bar = Bar::new(100.0, 110.0, 90.0, 105.0);
        assert_eq!(bar.real_body(), 5.0);
        assert_eq!(bar.hl_range(), 20.0);
        assert_eq!(bar.upper_shadow(), 5.0);
        assert_eq!(bar.lower_shadow(), 10.0);
        assert_eq!(bar.candle_color(), 1);
        assert!(bar.is_white());

        // close == open counts as white
        let flat = Bar::new(100.0, 101.0, 99.0, 100.0);
        assert_eq!(flat.candle_color(), 1);
    }

    #[test]
    fn test_gap_predicates() {
        let prior = Bar::new(100.0, 103.0, 97.0, 102.0);
        let above = Bar::new(104.0, 106.0, 103.5, 105.0);
        assert!(above.real_body_gap_up(&prior));
        assert!(above.candle_gap_up(&prior));
        assert!(!above.real_body_gap_down(&prior));

        let overlap = Bar::new(101.0, 104.0, 100.0, 103.0);
        assert!(!overlap.real_body_gap_up(&prior));
    }

    #[test]
    fn test_engine_builder_counts() {
        let engine = EngineBuilder::new()
            .with_single_bar_defaults()
            .build()
            .unwrap();
        assert_eq!(engine.builtin.len(), 17);

        let engine = EngineBuilder::new().with_two_bar_defaults().build().unwrap();
        assert_eq!(engine.builtin.len(), 15);

        let engine = EngineBuilder::new()
            .with_three_bar_defaults()
            .build()
            .unwrap();
        assert_eq!(engine.builtin.len(), 22);

        let engine = EngineBuilder::new()
            .with_multi_bar_defaults()
            .build()
            .unwrap();
        assert_eq!(engine.builtin.len(), 6);

        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
        assert_eq!(engine.builtin.len(), 60);
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let config = CandleConfig::default().with(
            SettingKind::BodyDoji,
            CandleSetting::new(RangeType::HighLow, 10, -1.0),
        );
        let result = EngineBuilder::new().candle_config(config).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_scan() {
        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
        let bars: Vec<Bar> = vec![];
        let series = engine.scan(&bars).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_scan_produces_one_series_per_recognizer() {
        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
        let bars = make_flat_bars(40);
        let series = engine.scan(&bars).unwrap();
        assert_eq!(series.len(), 60);
        for s in &series {
            assert!(s.beg_idx + s.len() <= bars.len());
        }
    }

    #[test]
    fn test_doji_scan() {
        let engine = EngineBuilder::new()
            .add(Recognizer::Doji(DojiRecognizer::with_defaults()))
            .build()
            .unwrap();

        // Ten ordinary bars then a clean doji
        let mut bars = make_flat_bars(12);
        bars.push(Bar::new(100.0, 110.0, 90.0, 100.0));

        let series = engine.scan(&bars).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].id, PatternId("CDL_DOJI"));
        assert_eq!(series[0].at(bars.len() - 1), 100);
    }

    #[test]
    fn test_pattern_filter() {
        let engine = EngineBuilder::new()
            .with_single_bar_defaults()
            .only_patterns([PatternId("CDL_MARUBOZU")])
            .build()
            .unwrap();

        let bars = make_flat_bars(30);
        let series = engine.scan(&bars).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].id, PatternId("CDL_MARUBOZU"));
    }

    #[test]
    fn test_validate_data_reports_bar_index() {
        let engine = EngineBuilder::new()
            .with_single_bar_defaults()
            .validate_data(true)
            .build()
            .unwrap();

        let mut bars = make_flat_bars(5);
        bars[3] = Bar::new(100.0, 90.0, 110.0, 100.0); // high < low
        let err = engine.scan(&bars).unwrap_err();
        assert!(matches!(err, CandleError::InvalidOHLCV { index: 3, .. }));
    }

    #[test]
    fn test_custom_recognizer() {
        /// Flags every white bar.
        #[derive(Debug, Default, Clone)]
        struct UpCloseRecognizer;

        impl CandleRecognizer for UpCloseRecognizer {
            fn id(&self) -> PatternId {
                PatternId("X_UPCLOSE")
            }

            fn lookback(&self, _config: &CandleConfig) -> usize {
                0
            }

            fn compute_into<T: OHLCV>(
                &self,
                config: &CandleConfig,
                bars: &[T],
                start_idx: usize,
                end_idx: usize,
                out: &mut [i32],
            ) -> Result<OutSpan> {
                run_recognizer(config, bars, start_idx, end_idx, 0, &[], out, |_, i| {
                    if bars[i].is_white() {
                        100
                    } else {
                        0
                    }
                })
            }
        }

        let engine = EngineBuilder::new()
            .add_custom(UpCloseRecognizer)
            .build()
            .unwrap();

        let bars = make_flat_bars(5);
        let series = engine.scan(&bars).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].id, PatternId("X_UPCLOSE"));
        assert_eq!(series[0].values, vec![100, 100, 100, 100, 100]);
    }

    #[test]
    fn test_parallel_scan() {
        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();

        let bars1 = make_flat_bars(30);
        let bars2 = make_flat_bars(25);
        let instruments: Vec<(&str, &[Bar])> = vec![("AAPL", &bars1), ("GOOGL", &bars2)];

        let (results, errors) = scan_parallel(&engine, instruments);
        assert_eq!(results.len(), 2);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_pattern_series_at() {
        let series = PatternSeries {
            id: PatternId("CDL_DOJI"),
            beg_idx: 10,
            values: vec![0, 100, 0],
        };
        assert_eq!(series.at(9), 0);
        assert_eq!(series.at(10), 0);
        assert_eq!(series.at(11), 100);
        assert_eq!(series.at(13), 0);
        assert_eq!(series.matches().collect::<Vec<_>>(), vec![(11, 100)]);
    }
}
