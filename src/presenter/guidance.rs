//! Advice panel keyed by forecast direction

use super::metrics::Direction;
use crate::currency::CurrencyPair;
use serde::Serialize;

/// Headline plus advice for individuals and businesses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Guidance {
    pub direction: Direction,
    pub headline: String,
    pub individuals: Vec<String>,
    pub businesses: Vec<String>,
}

/// Build the advice panel for `direction`, quoting the magnitude of `change_pct_30d`
pub fn guidance(pair: CurrencyPair, direction: Direction, change_pct_30d: f64) -> Guidance {
    let magnitude = change_pct_30d.abs();
    let quote = pair.quote;
    let base = pair.base;

    match direction {
        Direction::Weakening => Guidance {
            direction,
            headline: format!("{} Expected to Weaken by {:.2}%", quote.name(), magnitude),
            individuals: vec![
                format!(
                    "Consider buying {} now if you have upcoming foreign expenses",
                    base.plural()
                ),
                "Book international trips soon before prices increase".to_string(),
                "Shopping online from abroad? Buy now rather than later".to_string(),
            ],
            businesses: vec![
                "Importers: lock in current rates or hedge against increases".to_string(),
                format!(
                    "Budget for a {:.1}% increase in {}-denominated costs",
                    magnitude,
                    base.name().to_lowercase()
                ),
                format!(
                    "Exporters: consider delaying {}-to-{} conversions",
                    base.name().to_lowercase(),
                    quote.name().to_lowercase()
                ),
            ],
        },
        Direction::Strengthening => Guidance {
            direction,
            headline: format!("{} Expected to Strengthen by {:.2}%", quote.name(), magnitude),
            individuals: vec![
                format!(
                    "Wait to buy {} if not urgent, rates are expected to improve",
                    base.plural()
                ),
                format!(
                    "Good time to convert {} to {}",
                    base.plural(),
                    quote.plural()
                ),
            ],
            businesses: vec![
                "Importers: prices may decrease, consider delaying major purchases".to_string(),
                format!(
                    "Exporters: convert foreign earnings to {} sooner",
                    quote.plural()
                ),
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weakening_panel() {
        let g = guidance(CurrencyPair::USD_NGN, Direction::Weakening, 5.0);

        assert_eq!(g.headline, "Naira Expected to Weaken by 5.00%");
        assert_eq!(g.individuals.len(), 3);
        assert_eq!(g.businesses.len(), 3);
        assert!(g.individuals[0].contains("buying dollars"));
        assert_eq!(
            g.businesses[1],
            "Budget for a 5.0% increase in dollar-denominated costs"
        );
        assert!(g.businesses[2].contains("dollar-to-naira"));
    }

    #[test]
    fn test_strengthening_panel_uses_magnitude() {
        let g = guidance(CurrencyPair::USD_NGN, Direction::Strengthening, -2.345);

        assert_eq!(g.headline, "Naira Expected to Strengthen by 2.35%");
        assert_eq!(g.individuals.len(), 2);
        assert_eq!(g.businesses.len(), 2);
        assert_eq!(g.individuals[1], "Good time to convert dollars to naira");
    }
}
