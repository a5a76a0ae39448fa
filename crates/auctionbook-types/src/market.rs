//! Market records. A market is keyed by its treasury mint, the currency its
//! orders are priced and settled in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Mint;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub treasury_mint: Mint,
    pub token_name: String,
    pub token_symbol: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Market {
    #[must_use]
    pub fn new(
        treasury_mint: Mint,
        token_name: impl Into<String>,
        token_symbol: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            treasury_mint,
            token_name: token_name.into(),
            token_symbol: token_symbol.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.token_symbol, self.treasury_mint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_serializes_camel_case() {
        let market = Market::new(Mint::native(), "Solana", "SOL");
        let json = serde_json::to_value(&market).unwrap();
        assert!(json.get("treasuryMint").is_some());
        assert_eq!(json["tokenSymbol"], "SOL");
    }
}
