use std::collections::BTreeMap;

use anyhow::{Result, bail};

// ---------------------------------------------------------------------------
// Currency conversion (presentation only)
// ---------------------------------------------------------------------------

/// Base currency of every salary figure in the survey.
pub const BASE_CURRENCY: &str = "USD";

/// Source of exchange rates, handed to the presentation state explicitly.
pub trait CurrencyConverter {
    /// Units of `to` per one unit of `from`.
    fn rate(&self, from: &str, to: &str) -> Result<f64>;

    /// Currency codes this converter knows, base currency included.
    fn currencies(&self) -> Vec<String>;
}

/// Static rate table: units of each currency per one [`BASE_CURRENCY`].
#[derive(Debug, Clone, Default)]
pub struct FixedRates {
    rates: BTreeMap<String, f64>,
}

impl FixedRates {
    pub fn new(rates: BTreeMap<String, f64>) -> Self {
        let rates = rates
            .into_iter()
            .filter(|(code, rate)| {
                let ok = rate.is_finite() && *rate > 0.0;
                if !ok {
                    log::warn!("Ignoring exchange rate {code} = {rate}");
                }
                ok
            })
            .map(|(code, rate)| (code.to_ascii_uppercase(), rate))
            .collect();
        Self { rates }
    }

    fn per_base(&self, code: &str) -> Result<f64> {
        let code = code.to_ascii_uppercase();
        if code == BASE_CURRENCY {
            return Ok(1.0);
        }
        match self.rates.get(&code) {
            Some(rate) => Ok(*rate),
            None => bail!("No exchange rate configured for {code}"),
        }
    }
}

impl CurrencyConverter for FixedRates {
    fn rate(&self, from: &str, to: &str) -> Result<f64> {
        Ok(self.per_base(to)? / self.per_base(from)?)
    }

    fn currencies(&self) -> Vec<String> {
        let mut codes = vec![BASE_CURRENCY.to_string()];
        codes.extend(self.rates.keys().filter(|c| *c != BASE_CURRENCY).cloned());
        codes
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// `$1,234.56` for US dollars, `1,234.56 EUR` for anything else.
pub fn format_currency(amount: f64, currency: &str) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let digits = group_thousands(amount.abs());
    if currency == BASE_CURRENCY {
        format!("{sign}${digits}")
    } else {
        format!("{sign}{digits} {currency}")
    }
}

/// Two decimals with comma thousands separators.
fn group_thousands(amount: f64) -> String {
    let fixed = format!("{amount:.2}");
    let (int_part, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{grouped}.{frac}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_usd_with_symbol_and_grouping() {
        assert_eq!(format_currency(1234567.891, "USD"), "$1,234,567.89");
        assert_eq!(format_currency(999.5, "USD"), "$999.50");
        assert_eq!(format_currency(0.0, "USD"), "$0.00");
        assert_eq!(format_currency(-1500.0, "USD"), "-$1,500.00");
    }

    #[test]
    fn formats_other_currencies_with_code() {
        assert_eq!(format_currency(100000.0, "EUR"), "100,000.00 EUR");
    }

    #[test]
    fn fixed_rates_convert_through_base() {
        let rates = FixedRates::new(BTreeMap::from([
            ("eur".to_string(), 0.5),
            ("GBP".to_string(), 0.25),
            ("BAD".to_string(), 0.0),
        ]));
        assert_eq!(rates.rate("USD", "EUR").unwrap(), 0.5);
        assert_eq!(rates.rate("EUR", "GBP").unwrap(), 0.5);
        assert_eq!(rates.rate("USD", "USD").unwrap(), 1.0);
        assert!(rates.rate("USD", "BAD").is_err());
        assert!(rates.rate("USD", "JPY").is_err());
        assert_eq!(rates.currencies(), vec!["USD", "EUR", "GBP"]);
    }
}
