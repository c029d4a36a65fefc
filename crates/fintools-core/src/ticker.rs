use std::fmt::{Display, Formatter};

use crate::error::{DomainError, ValidationError};

const PROVIDER_PREFIXES: [&str; 2] = ["C:", "X:"];

/// Normalized two-currency identifier, e.g. `EUR`/`USD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TickerPair {
    base: String,
    quote: String,
}

impl TickerPair {
    /// Parses `EURUSD`, `EUR-USD` or their `C:`/`X:` prefixed forms.
    ///
    /// Anything else is rejected with [`DomainError::InvalidInput`].
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let clean = strip_prefixes(&input.trim().to_ascii_uppercase());
        let invalid = || {
            DomainError::from(ValidationError::InvalidTickerPair {
                value: input.to_owned(),
            })
        };

        if clean.contains('-') {
            let mut parts = clean.split('-');
            return match (parts.next(), parts.next(), parts.next()) {
                (Some(base), Some(quote), None) if is_currency(base) && is_currency(quote) => {
                    Ok(Self::new(base, quote))
                }
                _ => Err(invalid()),
            };
        }

        if clean.len() == 6 && clean.is_ascii() {
            let (base, quote) = clean.split_at(3);
            if is_currency(base) && is_currency(quote) {
                return Ok(Self::new(base, quote));
            }
        }

        Err(invalid())
    }

    fn new(base: &str, quote: &str) -> Self {
        Self {
            base: base.to_owned(),
            quote: quote.to_owned(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }
}

impl Display for TickerPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// Provider form of a forex ticker: upper-cased with a single `C:` prefix.
pub fn forex_symbol(ticker: &str) -> String {
    let normalized = ticker.trim().to_ascii_uppercase();
    format!("C:{}", strip_prefixes(&normalized))
}

fn strip_prefixes(value: &str) -> String {
    PROVIDER_PREFIXES
        .iter()
        .fold(value.to_owned(), |acc, prefix| acc.replace(prefix, ""))
        .trim()
        .to_owned()
}

/// Three ASCII letters, e.g. `EUR`.
fn is_currency(value: &str) -> bool {
    value.len() == 3 && value.bytes().all(|byte| byte.is_ascii_alphabetic())
}
