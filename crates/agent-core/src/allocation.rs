//! Allocation Detection
//!
//! Decides whether a reply carries a portfolio allocation: at least two
//! percentage figures, each tied to an asset class in the same clause, that
//! add up to roughly a whole portfolio. Market figures quoted in passing
//! ("inflation is 2.5%") do not count.

use regex::Regex;

use crate::error::{AgentError, Result};

/// Tolerance around 100% for rounding in model output
const WHOLE_PORTFOLIO_SLACK: f64 = 5.0;

/// Matches percentage figures such as `60%`, `12.5 %`, `12,5%`
const PERCENT_PATTERN: &str = r"(\d{1,3}(?:[.,]\d+)?)\s*%";

const ASSET_PATTERN: &str = r"(?i)\b(?:stocks?|shares?|equit(?:y|ies)|bonds?|gold|crypto\w*|bitcoin|btc|ethereum|eth|cash|deposits?|deposito|savings|funds?|fixed income|etfs?|money market|reits?|property|real estate|saham|obligasi|emas|reksa dana|sbn|sukuk)\b";

#[derive(Clone, Debug)]
pub struct AllocationDetector {
    percent: Regex,
    asset: Regex,
}

impl AllocationDetector {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| AgentError::Config(format!("invalid pattern: {}", e)))
        };

        Ok(Self {
            percent: compile(PERCENT_PATTERN)?,
            asset: compile(ASSET_PATTERN)?,
        })
    }

    /// True when some run of asset-weighted percentages sums to ~100%
    pub fn detect(&self, text: &str) -> bool {
        let mut total = 0.0;
        let mut items = 0;

        for caps in self.percent.captures_iter(text) {
            let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if !self.asset.is_match(clause_around(text, whole.start(), whole.end())) {
                continue;
            }
            let Ok(value) = number.as_str().replace(',', ".").parse::<f64>() else {
                continue;
            };

            if total + value > 100.0 + WHOLE_PORTFOLIO_SLACK {
                // a second scenario starts here
                total = 0.0;
                items = 0;
            }
            total += value;
            items += 1;

            if items >= 2 && (total - 100.0).abs() <= WHOLE_PORTFOLIO_SLACK {
                return true;
            }
        }

        false
    }
}

/// Text of the clause containing `start..end`. Clauses end at commas,
/// semicolons, line breaks and sentence stops.
fn clause_around(text: &str, start: usize, end: usize) -> &str {
    let is_break = |i: usize, c: char| {
        matches!(c, ',' | ';' | '\n')
            || (c == '.' && text[i + 1..].chars().next().is_none_or(char::is_whitespace))
    };

    let from = text[..start]
        .char_indices()
        .rev()
        .find(|&(i, c)| is_break(i, c))
        .map_or(0, |(i, c)| i + c.len_utf8());
    let to = text[end..]
        .char_indices()
        .map(|(i, c)| (end + i, c))
        .find(|&(i, c)| is_break(i, c))
        .map_or(text.len(), |(i, _)| i);

    &text[from..to]
}

/// Make `reply` end with `disclaimer`.
///
/// A copy elsewhere in the reply is moved to the end; with no copy, it is
/// only added when `required`. Returns whether the reply was changed.
pub fn place_disclaimer(reply: &mut String, disclaimer: &str, required: bool) -> bool {
    let body = reply.trim_end();
    if body.ends_with(disclaimer) {
        return false;
    }
    if !required && !body.contains(disclaimer) {
        return false;
    }

    let mut stripped = body.replace(disclaimer, "");
    while stripped.contains("\n\n\n") {
        stripped = stripped.replace("\n\n\n", "\n\n");
    }

    let stripped = stripped.trim();
    *reply = if stripped.is_empty() {
        disclaimer.to_string()
    } else {
        format!("{}\n\n{}", stripped, disclaimer)
    };
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> AllocationDetector {
        AllocationDetector::new().unwrap()
    }

    #[test]
    fn test_allocation_detected() {
        let d = detector();
        assert!(d.detect("Allocation: 60% stocks, 40% bonds."));
        assert!(d.detect("- Saham BBCA.JK: 50%\n- Reksa dana pasar uang: 30%\n- Gold (GLD): 20%"));
        assert!(d.detect("Put 33.3% in equities, 33.3% in bonds and 33.4 % in cash."));
    }

    #[test]
    fn test_market_figures_are_not_allocations() {
        let d = detector();
        assert!(!d.detect("Inflation is 2.5% and the BI rate is 6%. How old are you?"));
        assert!(!d.detect("Gold rose 5% this week while stocks fell 3%."));
        assert!(!d.detect("100%"));
        assert!(!d.detect("How old are you?"));
    }

    #[test]
    fn test_allocation_among_other_figures() {
        let d = detector();
        let reply = "With inflation at 2.5%, I suggest 70% stocks, 20% bonds, 10% gold. \
                     Expected return is about 8% a year.";
        assert!(d.detect(reply));
    }

    #[test]
    fn test_second_scenario_still_detected() {
        let d = detector();
        assert!(d.detect("Conservative: 80% bonds, 20% stocks. Aggressive: 30% bonds, 70% stocks."));
    }

    #[test]
    fn test_place_disclaimer_appends_when_required() {
        let mut reply = "60% stocks, 40% bonds.".to_string();
        assert!(place_disclaimer(&mut reply, "DISCLAIMER", true));
        assert_eq!(reply, "60% stocks, 40% bonds.\n\nDISCLAIMER");

        let mut question = "How old are you?".to_string();
        assert!(!place_disclaimer(&mut question, "DISCLAIMER", false));
        assert_eq!(question, "How old are you?");
    }

    #[test]
    fn test_place_disclaimer_moves_misplaced_copy() {
        let mut reply = "Allocation: 60% stocks, 40% bonds.\n\nDISCLAIMER\n\nAnything else I can help with?"
            .to_string();
        assert!(place_disclaimer(&mut reply, "DISCLAIMER", true));
        assert_eq!(
            reply,
            "Allocation: 60% stocks, 40% bonds.\n\nAnything else I can help with?\n\nDISCLAIMER"
        );
    }

    #[test]
    fn test_place_disclaimer_keeps_trailing_copy() {
        let mut reply = "60% stocks, 40% bonds.\n\nDISCLAIMER  \n".to_string();
        assert!(!place_disclaimer(&mut reply, "DISCLAIMER", true));
    }
}
