//! Formatting of monetary amounts for pages and PDF reports.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};
use serde::{Deserialize, Serialize};

/// How to display amounts of money, e.g. "$1,234.56" or "R$1.234,56".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    /// The symbol placed before the amount.
    pub symbol: String,
    /// Swap the separators so that commas mark decimals and periods group
    /// thousands.
    pub decimal_comma: bool,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "$".to_owned(),
            decimal_comma: false,
        }
    }
}

impl CurrencyFormat {
    /// Format `amount` with two decimal places and grouped thousands.
    pub fn format(&self, amount: f64) -> String {
        let cents = (amount.abs() * 100.0).round();
        let whole = group_thousands((cents / 100.0).trunc());
        let fraction = (cents % 100.0) as u8;
        let sign = if amount < 0.0 && cents > 0.0 { "-" } else { "" };

        let (whole, decimal_separator) = if self.decimal_comma {
            (whole.replace(',', "."), ',')
        } else {
            (whole, '.')
        };

        format!(
            "{sign}{}{whole}{decimal_separator}{fraction:02}",
            self.symbol
        )
    }
}

/// Format a whole number with commas between groups of thousands.
fn group_thousands(whole: f64) -> String {
    static WHOLE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();

    let formatter = WHOLE_FMT.get_or_init(|| {
        Formatter::currency("")
            .map(|formatter| formatter.precision(Precision::Decimals(0)))
            .ok()
    });

    match formatter {
        // Zero is hardcoded as "0" by numfmt, which is what we want here.
        Some(formatter) if whole > 0.0 => formatter.fmt_string(whole),
        _ => format!("{whole:.0}"),
    }
}

#[cfg(test)]
mod tests {
    use super::CurrencyFormat;

    fn dollars() -> CurrencyFormat {
        CurrencyFormat::default()
    }

    fn reais() -> CurrencyFormat {
        CurrencyFormat {
            symbol: "R$".to_owned(),
            decimal_comma: true,
        }
    }

    #[test]
    fn formats_thousands_and_decimals() {
        assert_eq!(dollars().format(1234.56), "$1,234.56");
        assert_eq!(dollars().format(1_234_567.8), "$1,234,567.80");
    }

    #[test]
    fn keeps_trailing_zeros() {
        assert_eq!(dollars().format(12.3), "$12.30");
        assert_eq!(dollars().format(12.0), "$12.00");
    }

    #[test]
    fn formats_zero_and_small_amounts() {
        assert_eq!(dollars().format(0.0), "$0.00");
        assert_eq!(dollars().format(0.05), "$0.05");
    }

    #[test]
    fn formats_negative_amounts() {
        assert_eq!(dollars().format(-45.99), "-$45.99");
    }

    #[test]
    fn swaps_separators_for_decimal_comma() {
        assert_eq!(reais().format(1234.56), "R$1.234,56");
        assert_eq!(reais().format(7.5), "R$7,50");
    }

    #[test]
    fn rounds_to_nearest_cent() {
        assert_eq!(dollars().format(2.999), "$3.00");
        assert_eq!(dollars().format(999.999), "$1,000.00");
    }
}
