//! Strategy registry — string keys to strategy factories.
//!
//! Factories take a flat `name -> f64` parameter map; missing parameters fall
//! back to each strategy's defaults. The registry is an explicit map that
//! callers populate (usually via [`StrategyRegistry::with_builtins`]) so the
//! available catalog is always inspectable and deterministic.

use std::collections::BTreeMap;

use thiserror::Error;

use super::{
    BollingerBreakout, BollingerReversion, FactorScore, MaCrossover, MacdTrend, MomentumBreaker,
    ParamError, RsiReversion, Strategy, TrendMomentumCombo, ValueQualityTrend, VolRegime,
    VolTarget, VolumeTrendConfirmation,
};

// ─── Error type ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown strategy: {0}")]
    Unknown(String),
    #[error("strategy already registered: {0}")]
    Duplicate(String),
    #[error(transparent)]
    Param(#[from] ParamError),
}

// ─── Parameter helpers ───────────────────────────────────────────────

/// Named f64 parameter with a default.
fn param(params: &BTreeMap<String, f64>, name: &str, default: f64) -> f64 {
    params.get(name).copied().unwrap_or(default)
}

/// Named usize parameter with a default. Fractional values truncate.
fn param_usize(params: &BTreeMap<String, f64>, name: &str, default: usize) -> usize {
    params
        .get(name)
        .copied()
        .map(|v| v as usize)
        .unwrap_or(default)
}

// ─── Registry ────────────────────────────────────────────────────────

/// Builds a strategy from a flat parameter map.
pub type StrategyFactory =
    fn(&BTreeMap<String, f64>) -> Result<Box<dyn Strategy>, RegistryError>;

/// Name-keyed catalog of strategy factories.
#[derive(Debug, Default)]
pub struct StrategyRegistry {
    factories: BTreeMap<String, StrategyFactory>,
}

impl StrategyRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in strategy under its canonical name.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        // Registration of a fixed builtin set cannot collide.
        let builtins: [(&str, StrategyFactory); 12] = [
            ("ma_crossover", make_ma_crossover),
            ("macd_trend", make_macd_trend),
            ("rsi_reversion", make_rsi_reversion),
            ("bollinger_reversion", make_bollinger_reversion),
            ("bollinger_breakout", make_bollinger_breakout),
            ("trend_momentum_combo", make_trend_momentum_combo),
            ("volume_trend_confirmation", make_volume_trend_confirmation),
            ("momentum_breaker", make_momentum_breaker),
            ("factor_score", make_factor_score),
            ("vol_target", make_vol_target),
            ("vol_regime", make_vol_regime),
            ("value_quality_trend", make_value_quality_trend),
        ];
        for (name, factory) in builtins {
            registry
                .factories
                .insert(name.to_string(), factory);
        }
        registry
    }

    /// Register a factory under `name`. A second registration of the same
    /// name is a configuration error and fails fast.
    pub fn register(&mut self, name: &str, factory: StrategyFactory) -> Result<(), RegistryError> {
        if self.factories.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        self.factories.insert(name.to_string(), factory);
        Ok(())
    }

    /// Build `name` with the given parameters (defaults fill the gaps).
    pub fn build(
        &self,
        name: &str,
        params: &BTreeMap<String, f64>,
    ) -> Result<Box<dyn Strategy>, RegistryError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RegistryError::Unknown(name.to_string()))?;
        factory(params)
    }

    /// Build `name` with its default parameterization.
    pub fn build_default(&self, name: &str) -> Result<Box<dyn Strategy>, RegistryError> {
        self.build(name, &BTreeMap::new())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// A registry narrowed to `names`. Unknown names fail rather than
    /// silently shrinking the sweep.
    pub fn subset(&self, names: &[String]) -> Result<StrategyRegistry, RegistryError> {
        let mut narrowed = StrategyRegistry::new();
        for name in names {
            let factory = self
                .factories
                .get(name)
                .ok_or_else(|| RegistryError::Unknown(name.clone()))?;
            narrowed.register(name, *factory)?;
        }
        Ok(narrowed)
    }
}

// ─── Builtin factories ───────────────────────────────────────────────

fn make_ma_crossover(p: &BTreeMap<String, f64>) -> Result<Box<dyn Strategy>, RegistryError> {
    let fast = param_usize(p, "fast", 10);
    let slow = param_usize(p, "slow", 30);
    Ok(Box::new(MaCrossover::new(fast, slow)?))
}

fn make_macd_trend(p: &BTreeMap<String, f64>) -> Result<Box<dyn Strategy>, RegistryError> {
    let fast = param_usize(p, "fast", 12);
    let slow = param_usize(p, "slow", 26);
    let signal = param_usize(p, "signal", 9);
    Ok(Box::new(MacdTrend::new(fast, slow, signal)?))
}

fn make_rsi_reversion(p: &BTreeMap<String, f64>) -> Result<Box<dyn Strategy>, RegistryError> {
    let period = param_usize(p, "period", 14);
    let oversold = param(p, "oversold", 30.0);
    let overbought = param(p, "overbought", 70.0);
    Ok(Box::new(RsiReversion::new(period, oversold, overbought)?))
}

fn make_bollinger_reversion(p: &BTreeMap<String, f64>) -> Result<Box<dyn Strategy>, RegistryError> {
    let period = param_usize(p, "period", 20);
    let width = param(p, "width", 2.0);
    Ok(Box::new(BollingerReversion::new(period, width)?))
}

fn make_bollinger_breakout(p: &BTreeMap<String, f64>) -> Result<Box<dyn Strategy>, RegistryError> {
    let period = param_usize(p, "period", 20);
    let width = param(p, "width", 2.0);
    Ok(Box::new(BollingerBreakout::new(period, width)?))
}

fn make_trend_momentum_combo(
    p: &BTreeMap<String, f64>,
) -> Result<Box<dyn Strategy>, RegistryError> {
    let trend_window = param_usize(p, "trend_window", 30);
    let momentum_window = param_usize(p, "momentum_window", 20);
    Ok(Box::new(TrendMomentumCombo::new(
        trend_window,
        momentum_window,
    )?))
}

fn make_volume_trend_confirmation(
    p: &BTreeMap<String, f64>,
) -> Result<Box<dyn Strategy>, RegistryError> {
    let trend_window = param_usize(p, "trend_window", 20);
    let volume_window = param_usize(p, "volume_window", 20);
    let volume_multiple = param(p, "volume_multiple", 1.2);
    Ok(Box::new(VolumeTrendConfirmation::new(
        trend_window,
        volume_window,
        volume_multiple,
    )?))
}

fn make_momentum_breaker(p: &BTreeMap<String, f64>) -> Result<Box<dyn Strategy>, RegistryError> {
    let momentum_window = param_usize(p, "momentum_window", 20);
    let drawdown_window = param_usize(p, "drawdown_window", 60);
    let max_drawdown = param(p, "max_drawdown", 0.15);
    let rearm_drawdown = param(p, "rearm_drawdown", 0.05);
    Ok(Box::new(MomentumBreaker::new(
        momentum_window,
        drawdown_window,
        max_drawdown,
        rearm_drawdown,
    )?))
}

fn make_factor_score(p: &BTreeMap<String, f64>) -> Result<Box<dyn Strategy>, RegistryError> {
    let rank_window = param_usize(p, "rank_window", 60);
    let min_rank = param(p, "min_rank", 0.7);
    Ok(Box::new(FactorScore::new(rank_window, min_rank)?))
}

fn make_vol_target(p: &BTreeMap<String, f64>) -> Result<Box<dyn Strategy>, RegistryError> {
    let vol_window = param_usize(p, "vol_window", 20);
    let target_vol = param(p, "target_vol", 0.01);
    Ok(Box::new(VolTarget::new(vol_window, target_vol)?))
}

fn make_vol_regime(p: &BTreeMap<String, f64>) -> Result<Box<dyn Strategy>, RegistryError> {
    let trend_window = param_usize(p, "trend_window", 20);
    let vol_threshold = param(p, "vol_threshold", 0.03);
    let defensive_exposure = param(p, "defensive_exposure", 0.3);
    Ok(Box::new(VolRegime::new(
        trend_window,
        vol_threshold,
        defensive_exposure,
    )?))
}

fn make_value_quality_trend(p: &BTreeMap<String, f64>) -> Result<Box<dyn Strategy>, RegistryError> {
    let max_pe = param(p, "max_pe", 30.0);
    let min_roe = param(p, "min_roe", 0.10);
    let trend_window = param_usize(p, "trend_window", 20);
    Ok(Box::new(ValueQualityTrend::new(
        max_pe,
        min_roe,
        trend_window,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_cover_the_catalog() {
        let registry = StrategyRegistry::with_builtins();
        assert_eq!(registry.len(), 12);
        for name in registry.names() {
            let strategy = registry.build_default(&name).unwrap();
            assert_eq!(strategy.name(), name);
        }
    }

    #[test]
    fn unknown_name_errors() {
        let registry = StrategyRegistry::with_builtins();
        let err = registry.build_default("no_such_strategy").unwrap_err();
        assert!(matches!(err, RegistryError::Unknown(_)));
    }

    #[test]
    fn duplicate_registration_fails_fast() {
        let mut registry = StrategyRegistry::with_builtins();
        let err = registry
            .register("ma_crossover", make_ma_crossover)
            .unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(_)));
    }

    #[test]
    fn parameters_override_defaults() {
        let registry = StrategyRegistry::with_builtins();
        let params = BTreeMap::from([("fast".to_string(), 5.0), ("slow".to_string(), 40.0)]);
        let strategy = registry.build("ma_crossover", &params).unwrap();
        assert_eq!(strategy.params()["fast"], 5.0);
        assert_eq!(strategy.params()["slow"], 40.0);
        assert_eq!(strategy.warmup_bars(), 40);
    }

    #[test]
    fn invalid_parameters_surface_param_error() {
        let registry = StrategyRegistry::with_builtins();
        let params = BTreeMap::from([("fast".to_string(), 50.0), ("slow".to_string(), 10.0)]);
        let err = registry.build("ma_crossover", &params).unwrap_err();
        assert!(matches!(err, RegistryError::Param(_)));
    }

    #[test]
    fn subset_keeps_only_requested_names() {
        let registry = StrategyRegistry::with_builtins();
        let names = vec!["ma_crossover".to_string(), "rsi_reversion".to_string()];
        let narrowed = registry.subset(&names).unwrap();
        assert_eq!(narrowed.len(), 2);
        assert!(narrowed.contains("ma_crossover"));
        assert!(!narrowed.contains("macd_trend"));

        let err = registry.subset(&["bogus".to_string()]).unwrap_err();
        assert!(matches!(err, RegistryError::Unknown(_)));
    }

    #[test]
    fn names_are_sorted() {
        let registry = StrategyRegistry::with_builtins();
        let names = registry.names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
