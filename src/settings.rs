//! Candle classification settings.
//!
//! Every recognizer classifies bars as "long", "short", "doji", "near", etc. by
//! comparing a per-bar metric against a trailing average scaled by a factor.
//! Which metric, how many bars of history, and which factor are all selected
//! per [`SettingKind`] by a [`CandleConfig`].
//!
//! The configuration is an explicit value passed into every computation; there
//! is no process-wide registry. "Mutating" a setting means building a new
//! config with [`CandleConfig::with`], which cannot interfere with an in-flight
//! computation.

use crate::{CandleError, Result, OHLCV, OHLCVExt};

// ============================================================
// RANGE TYPES
// ============================================================

/// Which per-bar quantity a setting averages over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum RangeType {
    /// `|close - open|`
    RealBody,
    /// `high - low`
    HighLow,
    /// `upper shadow + lower shadow`
    Shadows,
}

/// Per-bar value of a range type.
#[inline]
pub fn range_value<T: OHLCV>(range_type: RangeType, bar: &T) -> f64 {
    match range_type {
        RangeType::RealBody => bar.real_body(),
        RangeType::HighLow => bar.hl_range(),
        RangeType::Shadows => bar.upper_shadow() + bar.lower_shadow(),
    }
}

// ============================================================
// SETTING KINDS
// ============================================================

/// Classification thresholds a recognizer can ask for.
///
/// Each kind is bound to one range type for the lifetime of a config; changing
/// the range type of a kind is done by installing a new [`CandleSetting`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKind {
    BodyLong,
    BodyVeryLong,
    BodyShort,
    BodyDoji,
    ShadowLong,
    ShadowVeryLong,
    ShadowShort,
    ShadowVeryShort,
    Near,
    Far,
    Equal,
}

impl SettingKind {
    pub const ALL: [SettingKind; 11] = [
        SettingKind::BodyLong,
        SettingKind::BodyVeryLong,
        SettingKind::BodyShort,
        SettingKind::BodyDoji,
        SettingKind::ShadowLong,
        SettingKind::ShadowVeryLong,
        SettingKind::ShadowShort,
        SettingKind::ShadowVeryShort,
        SettingKind::Near,
        SettingKind::Far,
        SettingKind::Equal,
    ];

    /// Stable name, used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            SettingKind::BodyLong => "body_long",
            SettingKind::BodyVeryLong => "body_very_long",
            SettingKind::BodyShort => "body_short",
            SettingKind::BodyDoji => "body_doji",
            SettingKind::ShadowLong => "shadow_long",
            SettingKind::ShadowVeryLong => "shadow_very_long",
            SettingKind::ShadowShort => "shadow_short",
            SettingKind::ShadowVeryShort => "shadow_very_short",
            SettingKind::Near => "near",
            SettingKind::Far => "far",
            SettingKind::Equal => "equal",
        }
    }
}

// ============================================================
// SETTINGS
// ============================================================

/// One classification threshold: a range type, an averaging period and a scale
/// factor.
///
/// `avg_period == 0` is the documented degenerate case: the bar under test
/// supplies its own "average" (the spot value of the range type at the
/// reference bar).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CandleSetting {
    pub range_type: RangeType,
    pub avg_period: usize,
    pub factor: f64,
}

impl CandleSetting {
    pub const fn new(range_type: RangeType, avg_period: usize, factor: f64) -> Self {
        Self {
            range_type,
            avg_period,
            factor,
        }
    }

    fn validate(&self, kind: SettingKind) -> Result<()> {
        if !self.factor.is_finite() || self.factor <= 0.0 {
            return Err(CandleError::OutOfRange {
                field: kind.as_str(),
                value: self.factor,
                min: f64::MIN_POSITIVE,
                max: f64::MAX,
            });
        }
        Ok(())
    }
}

/// The full threshold table, one [`CandleSetting`] per [`SettingKind`].
///
/// `Default` is the factory table; field-level `#[serde(default)]` lets a
/// config file override only the kinds it cares about.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CandleConfig {
    pub body_long: CandleSetting,
    pub body_very_long: CandleSetting,
    pub body_short: CandleSetting,
    pub body_doji: CandleSetting,
    pub shadow_long: CandleSetting,
    pub shadow_very_long: CandleSetting,
    pub shadow_short: CandleSetting,
    pub shadow_very_short: CandleSetting,
    pub near: CandleSetting,
    pub far: CandleSetting,
    pub equal: CandleSetting,
}

impl Default for CandleConfig {
    fn default() -> Self {
        Self {
            body_long: CandleSetting::new(RangeType::RealBody, 10, 1.0),
            body_very_long: CandleSetting::new(RangeType::RealBody, 10, 3.0),
            body_short: CandleSetting::new(RangeType::RealBody, 10, 1.0),
            body_doji: CandleSetting::new(RangeType::HighLow, 10, 0.1),
            shadow_long: CandleSetting::new(RangeType::RealBody, 0, 1.0),
            shadow_very_long: CandleSetting::new(RangeType::RealBody, 0, 2.0),
            shadow_short: CandleSetting::new(RangeType::Shadows, 10, 1.0),
            shadow_very_short: CandleSetting::new(RangeType::HighLow, 10, 0.1),
            near: CandleSetting::new(RangeType::HighLow, 5, 0.2),
            far: CandleSetting::new(RangeType::HighLow, 5, 0.6),
            equal: CandleSetting::new(RangeType::HighLow, 5, 0.05),
        }
    }
}

impl CandleConfig {
    #[inline]
    pub fn setting(&self, kind: SettingKind) -> CandleSetting {
        match kind {
            SettingKind::BodyLong => self.body_long,
            SettingKind::BodyVeryLong => self.body_very_long,
            SettingKind::BodyShort => self.body_short,
            SettingKind::BodyDoji => self.body_doji,
            SettingKind::ShadowLong => self.shadow_long,
            SettingKind::ShadowVeryLong => self.shadow_very_long,
            SettingKind::ShadowShort => self.shadow_short,
            SettingKind::ShadowVeryShort => self.shadow_very_short,
            SettingKind::Near => self.near,
            SettingKind::Far => self.far,
            SettingKind::Equal => self.equal,
        }
    }

    #[inline]
    pub fn avg_period(&self, kind: SettingKind) -> usize {
        self.setting(kind).avg_period
    }

    /// Configured range-type value of `bar` for `kind`.
    #[inline]
    pub fn range_value<T: OHLCV>(&self, kind: SettingKind, bar: &T) -> f64 {
        range_value(self.setting(kind).range_type, bar)
    }

    /// Returns a copy of this config with one setting replaced.
    #[must_use]
    pub fn with(mut self, kind: SettingKind, setting: CandleSetting) -> Self {
        match kind {
            SettingKind::BodyLong => self.body_long = setting,
            SettingKind::BodyVeryLong => self.body_very_long = setting,
            SettingKind::BodyShort => self.body_short = setting,
            SettingKind::BodyDoji => self.body_doji = setting,
            SettingKind::ShadowLong => self.shadow_long = setting,
            SettingKind::ShadowVeryLong => self.shadow_very_long = setting,
            SettingKind::ShadowShort => self.shadow_short = setting,
            SettingKind::ShadowVeryShort => self.shadow_very_short = setting,
            SettingKind::Near => self.near = setting,
            SettingKind::Far => self.far = setting,
            SettingKind::Equal => self.equal = setting,
        }
        self
    }

    /// Check every setting has a usable scale factor.
    pub fn validate(&self) -> Result<()> {
        for kind in SettingKind::ALL {
            self.setting(kind).validate(kind)?;
        }
        Ok(())
    }
}

// ============================================================
// TESTS
// ============================================================
