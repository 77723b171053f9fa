//! Indicator registry: identifier → source file + display metadata.
//!
//! The registry is loaded once at startup (built-in table or a JSON file) and
//! never mutated afterwards. Every other stage keys off it.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use crate::domain::{IndicatorDef, ProfileKind};
use crate::error::MtmError;

#[derive(Debug, Clone)]
pub struct IndicatorRegistry {
    defs: Vec<IndicatorDef>,
}

impl IndicatorRegistry {
    /// Build a registry, rejecting empty fields and duplicate identifiers.
    ///
    /// Ids name files under the processed directory, so they may not contain
    /// separators or `..`.
    pub fn new(defs: Vec<IndicatorDef>) -> Result<Self, MtmError> {
        let mut seen = HashSet::new();
        for def in &defs {
            if def.id.trim().is_empty() {
                return Err(MtmError::Registry("indicator with empty id".to_string()));
            }
            if def.id.contains(['/', '\\']) || def.id.contains("..") {
                return Err(MtmError::Registry(format!(
                    "indicator id '{}' must not contain path components",
                    def.id
                )));
            }
            if def.file.trim().is_empty() {
                return Err(MtmError::Registry(format!("indicator '{}' has no source file", def.id)));
            }
            if !seen.insert(def.id.as_str()) {
                return Err(MtmError::Registry(format!("duplicate indicator id '{}'", def.id)));
            }
        }
        Ok(Self { defs })
    }

    /// Load a JSON array of indicator definitions.
    pub fn from_json_file(path: &Path) -> Result<Self, MtmError> {
        let file = File::open(path).map_err(|e| MtmError::io("Failed to open registry", path, e))?;
        let defs: Vec<IndicatorDef> = serde_json::from_reader(file)
            .map_err(|e| MtmError::Registry(format!("'{}': {e}", path.display())))?;
        Self::new(defs)
    }

    /// Registry file when configured, otherwise the built-in table.
    pub fn load(path: Option<&Path>) -> Result<Self, MtmError> {
        match path {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::builtin()),
        }
    }

    /// The curated default indicator set.
    pub fn builtin() -> Self {
        let def = |id: &str,
                   file: &str,
                   country: &str,
                   category: &str,
                   display: &str,
                   fred: Option<&str>| IndicatorDef {
            id: id.to_string(),
            file: file.to_string(),
            country: country.to_string(),
            category: category.to_string(),
            display: display.to_string(),
            fred_series: fred.map(str::to_string),
            profile: None,
        };

        let mut defs = vec![
            def("fed_funds", "fed_funds.csv", "US", "Interest Rates", "US: Fed Funds Rate", Some("FEDFUNDS")),
            def("us_cpi", "us_cpi.csv", "US", "Inflation", "US: CPI Inflation", Some("CPIAUCSL")),
            def("us_10y", "us_10y.csv", "US", "Bond Market", "US: 10Y Treasury Yield", Some("DGS10")),
            def(
                "us_yield_curve_10y_2y",
                "T10Y2Y.csv",
                "US",
                "Stress Indicator",
                "US: 10Y–2Y Yield Curve",
                Some("T10Y2Y"),
            ),
            def(
                "us_hy_spread",
                "BAMLH0A0HYM2.csv",
                "US",
                "Credit Spread",
                "US: High Yield Spread (BAML)",
                Some("BAMLH0A0HYM2"),
            ),
            def("vix", "vix.csv", "US", "Market Volatility", "US: VIX Index", Some("VIXCLS")),
            def("crude_oil", "crude_oil.csv", "Global", "Commodities", "Crude Oil Price", Some("DCOILWTICO")),
            def("dxy", "dxy.csv", "US", "Currencies", "US Dollar Index (DXY)", Some("DTWEXBGS")),
            def("in_fx_spot", "in_fx_spot.csv", "India", "Currencies", "INR/USD FX Spot", Some("DEXINUS")),
            def("in_policy_rate", "in_policy_rate.csv", "India", "Interest Rates", "India: Policy Repo Rate", None),
            def("in_cpi", "in_cpi.csv", "India", "Inflation", "India: CPI Inflation", Some("INDCPIALLMINMEI")),
            def("in_m3", "in_m3.csv", "India", "Money Supply", "India: M3 Money Supply", Some("MABMM301INM189S")),
            def(
                "in_production",
                "in_production.csv",
                "India",
                "Growth",
                "India: Industrial Production",
                Some("INDPROINDMISMEI"),
            ),
        ];

        for d in &mut defs {
            d.profile = match d.id.as_str() {
                "us_yield_curve_10y_2y" => Some(ProfileKind::YieldCurve),
                "vix" => Some(ProfileKind::Volatility),
                _ => None,
            };
        }

        Self { defs }
    }

    pub fn get(&self, id: &str) -> Option<&IndicatorDef> {
        self.defs.iter().find(|d| d.id == id)
    }

    /// Like [`get`](Self::get), but an unknown id is an error.
    pub fn require(&self, id: &str) -> Result<&IndicatorDef, MtmError> {
        self.get(id).ok_or_else(|| MtmError::UnknownIndicator(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndicatorDef> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Resolve a subset of ids (registry order when `ids` is empty).
    pub fn select(&self, ids: &[String]) -> Result<Vec<&IndicatorDef>, MtmError> {
        if ids.is_empty() {
            return Ok(self.defs.iter().collect());
        }
        ids.iter().map(|id| self.require(id)).collect()
    }
}
