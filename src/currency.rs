//! Currency types and the traded pair

use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency enumeration (ISO 4217 codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// US Dollar
    USD,
    /// Nigerian Naira
    NGN,
    /// Euro
    EUR,
    /// British Pound Sterling
    GBP,
}

impl Currency {
    /// Get ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::NGN => "NGN",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
        }
    }

    /// Get currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::NGN => "₦",
            Currency::EUR => "€",
            Currency::GBP => "£",
        }
    }

    /// Display name, e.g. "Naira"
    pub fn name(&self) -> &'static str {
        match self {
            Currency::USD => "Dollar",
            Currency::NGN => "Naira",
            Currency::EUR => "Euro",
            Currency::GBP => "Pound",
        }
    }

    /// Lower-case plural used in running text ("buy dollars", "convert to naira")
    pub fn plural(&self) -> &'static str {
        match self {
            Currency::USD => "dollars",
            Currency::NGN => "naira",
            Currency::EUR => "euros",
            Currency::GBP => "pounds",
        }
    }

    /// Parse from ISO code
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "USD" => Some(Currency::USD),
            "NGN" => Some(Currency::NGN),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            _ => None,
        }
    }

    /// Format an amount as symbol plus two decimals, e.g. `₦1575.00`
    pub fn format_amount(&self, amount: f64) -> String {
        format!("{}{:.2}", self.symbol(), amount)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Exchange rate quoted as `quote` units per one `base` unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub base: Currency,
    pub quote: Currency,
}

impl CurrencyPair {
    /// The instrument this pipeline forecasts
    pub const USD_NGN: CurrencyPair = CurrencyPair {
        base: Currency::USD,
        quote: Currency::NGN,
    };

    pub fn new(base: Currency, quote: Currency) -> Self {
        Self { base, quote }
    }

    /// Yahoo Finance ticker. Dollar-based pairs use the short `NGN=X` form.
    pub fn yahoo_symbol(&self) -> String {
        if self.base == Currency::USD {
            format!("{}=X", self.quote.code())
        } else {
            format!("{}{}=X", self.base.code(), self.quote.code())
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_codes() {
        assert_eq!(Currency::NGN.code(), "NGN");
        assert_eq!(Currency::NGN.symbol(), "₦");
        assert_eq!(Currency::from_code("ngn"), Some(Currency::NGN));
        assert_eq!(Currency::from_code("XYZ"), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(Currency::NGN.format_amount(1575.0), "₦1575.00");
        assert_eq!(Currency::NGN.format_amount(1500.456), "₦1500.46");
        assert_eq!(Currency::USD.format_amount(0.5), "$0.50");
    }

    #[test]
    fn test_pair_symbols() {
        assert_eq!(CurrencyPair::USD_NGN.yahoo_symbol(), "NGN=X");
        assert_eq!(
            CurrencyPair::new(Currency::EUR, Currency::USD).yahoo_symbol(),
            "EURUSD=X"
        );
        assert_eq!(CurrencyPair::USD_NGN.to_string(), "USD/NGN");
    }
}
