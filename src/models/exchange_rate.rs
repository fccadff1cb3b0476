use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body of `currencies/eur.json`: the publication date and every rate quoted
/// against one euro, keyed by lowercase currency code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EurRates {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub eur: HashMap<String, f64>,
}

impl EurRates {
    pub fn rate(&self, currency: &str) -> Option<f64> {
        self.eur.get(&currency.to_lowercase()).copied()
    }
}
