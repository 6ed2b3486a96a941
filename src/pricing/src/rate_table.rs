//! Fixed-point pricing lookup, grounded on the per-model pricing tables the
//! rest of the corpus keeps (one rate per named category, a fallback for
//! anything unlisted).

use std::collections::HashMap;

use rtc_types::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-category USD rates. Tool rates are priced per call; embedding and
/// analysis rates are priced per 1000 tokens; storage is priced per MB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTable {
    tool_rates: HashMap<String, Money>,
    default_tool_rate: Money,
    embedding_rate_per_1k_tokens: HashMap<String, Money>,
    default_embedding_model: String,
    analysis_rate_per_1k_tokens: Money,
    storage_rate_per_mb: Money,
}

impl Default for RateTable {
    fn default() -> Self {
        let mut tool_rates = HashMap::new();
        tool_rates.insert("http_get".to_string(), Money::new(1, 3)); // $0.001
        tool_rates.insert("http_post".to_string(), Money::new(2, 3)); // $0.002
        tool_rates.insert("database_query".to_string(), Money::new(5, 4)); // $0.0005
        tool_rates.insert("file_operation".to_string(), Money::new(2, 4)); // $0.0002
        tool_rates.insert("compute_intensive".to_string(), Money::new(1, 2)); // $0.01

        let mut embedding_rate_per_1k_tokens = HashMap::new();
        embedding_rate_per_1k_tokens.insert("text-embedding-3-small".to_string(), Money::new(2, 5)); // $0.00002
        embedding_rate_per_1k_tokens.insert("text-embedding-3-large".to_string(), Money::new(13, 5)); // $0.00013

        Self {
            tool_rates,
            default_tool_rate: Money::new(1, 3),
            embedding_rate_per_1k_tokens,
            default_embedding_model: "text-embedding-3-small".to_string(),
            analysis_rate_per_1k_tokens: Money::new(1, 5), // $0.00001
            storage_rate_per_mb: Money::new(5, 5),         // $0.00005
        }
    }
}

impl RateTable {
    pub fn tool_rate(&self, tool_type: &str) -> Money {
        self.tool_rates
            .get(tool_type)
            .copied()
            .unwrap_or(self.default_tool_rate)
    }

    pub fn set_tool_rate(&mut self, tool_type: impl Into<String>, rate: Money) {
        self.tool_rates.insert(tool_type.into(), rate);
    }

    pub fn default_embedding_model(&self) -> &str {
        &self.default_embedding_model
    }

    fn embedding_rate_for(&self, model: &str) -> Money {
        self.embedding_rate_per_1k_tokens
            .get(model)
            .copied()
            .unwrap_or_else(|| {
                self.embedding_rate_per_1k_tokens
                    .get(&self.default_embedding_model)
                    .copied()
                    .unwrap_or(Money::ZERO)
            })
    }

    /// `tokens * rate / 1000`, using the default embedding model.
    pub fn embedding_cost(&self, tokens: u64) -> Money {
        self.embedding_cost_for_model(tokens, &self.default_embedding_model.clone())
    }

    pub fn embedding_cost_for_model(&self, tokens: u64, model: &str) -> Money {
        per_thousand(tokens, self.embedding_rate_for(model))
    }

    pub fn analysis_cost(&self, tokens: u64) -> Money {
        per_thousand(tokens, self.analysis_rate_per_1k_tokens)
    }

    pub fn storage_cost(&self, megabytes: f64) -> Money {
        let mb = Decimal::try_from(megabytes).unwrap_or(Money::ZERO);
        mb * self.storage_rate_per_mb
    }
}

fn per_thousand(count: u64, rate: Money) -> Money {
    Decimal::from(count) * rate / Decimal::from(1000u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tool_type_falls_back_to_default_rate() {
        let table = RateTable::default();
        assert_eq!(table.tool_rate("unknown_tool"), table.default_tool_rate);
    }

    #[test]
    fn embedding_cost_scales_linearly_with_tokens() {
        let table = RateTable::default();
        let cost_1k = table.embedding_cost(1000);
        let cost_2k = table.embedding_cost(2000);
        assert_eq!(cost_2k, cost_1k * Decimal::from(2u32));
    }

    #[test]
    fn storage_cost_is_exact_for_fractional_megabytes() {
        let table = RateTable::default();
        let cost = table.storage_cost(2.5);
        assert_eq!(cost, Decimal::new(25, 1) * table.storage_rate_per_mb);
    }
}
