use regex::Regex;
use std::sync::LazyLock;

/// Assumed working days per year, for day-rate postings.
const DAYS_PER_YEAR: f64 = 220.0;

static NON_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9.]").expect("static pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SalaryFigures {
    pub annual_min: Option<f64>,
    pub annual_max: Option<f64>,
    pub is_mentioned: bool,
}

/// Extracts an annualized min/max salary from free-form salary text.
///
/// The text is French-market data ("45 k€ à 55 k€ par an", "450 par jour",
/// "3 500 € par mois") with the occasional English variant. Parsing never
/// fails: anything unreadable simply yields `None` on that side.
pub fn parse_salary(raw: Option<&str>) -> SalaryFigures {
    let Some(raw) = raw else {
        return SalaryFigures::default();
    };
    if raw.trim().is_empty() {
        return SalaryFigures::default();
    }

    let lower = raw.to_lowercase();

    // Period keywords contain spaces, so they are checked before the
    // whitespace stripping below.
    let period = if lower.contains("par jour") || lower.contains("per day") {
        DAYS_PER_YEAR
    } else if lower.contains("par mois") || lower.contains("per month") {
        12.0
    } else {
        1.0
    };
    let thousands = if lower.contains('k') { 1000.0 } else { 1.0 };

    let normalized = normalize_numeric_text(&lower);
    let (min_side, max_side) = split_range(&normalized);

    SalaryFigures {
        annual_min: numeric_value(min_side).map(|v| annualize(v, thousands, period)),
        annual_max: numeric_value(max_side).map(|v| annualize(v, thousands, period)),
        is_mentioned: true,
    }
}

/// Decimal commas become dots; whitespace and currency symbols go away.
/// Applied to the whole text before range splitting, so both sides of a
/// range are normalized identically.
fn normalize_numeric_text(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            ',' => Some('.'),
            '€' | '$' | '£' => None,
            c if c.is_whitespace() => None,
            c => Some(c),
        })
        .collect()
}

/// Splits "45kà55k" into min and max sides. The French connector "à" is the
/// primary range marker; a plain hyphen ("45-55") is accepted as a fallback.
/// Without a connector both sides are the whole text.
fn split_range(text: &str) -> (&str, &str) {
    if let Some(idx) = text.find('à') {
        (&text[..idx], &text[idx + 'à'.len_utf8()..])
    } else if let Some(idx) = text.find('-') {
        (&text[..idx], &text[idx + 1..])
    } else {
        (text, text)
    }
}

fn numeric_value(side: &str) -> Option<f64> {
    let digits = NON_NUMERIC.replace_all(side, "");
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok()
}

fn annualize(value: f64, thousands: f64, period: f64) -> f64 {
    let annual = value * thousands * period;
    // Postings sometimes state a yearly salary "in k" without the letter
    // ("45-55"). No real annual salary in this market is below 1000.
    if period == 1.0 && annual < 1000.0 {
        annual * 1000.0
    } else {
        annual
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_or_blank_text_means_no_salary() {
        assert_eq!(parse_salary(None), SalaryFigures::default());
        assert_eq!(parse_salary(Some("")), SalaryFigures::default());
        assert_eq!(parse_salary(Some("   ")), SalaryFigures::default());
    }

    #[test]
    fn yearly_range_in_k_euros() {
        let s = parse_salary(Some("45k€ à 55k€"));
        assert_eq!(s.annual_min, Some(45_000.0));
        assert_eq!(s.annual_max, Some(55_000.0));
        assert!(s.is_mentioned);
    }

    #[test]
    fn day_rate_is_annualized_over_220_days() {
        let s = parse_salary(Some("450 par jour"));
        assert_eq!(s.annual_min, Some(99_000.0));
        assert_eq!(s.annual_max, Some(99_000.0));
    }

    #[test]
    fn monthly_salary_is_annualized() {
        let s = parse_salary(Some("3500 par mois"));
        assert_eq!(s.annual_min, Some(42_000.0));
        assert_eq!(s.annual_max, Some(42_000.0));
    }

    #[test]
    fn bare_range_without_k_gets_the_thousands_correction() {
        let s = parse_salary(Some("45-55"));
        assert_eq!(s.annual_min, Some(45_000.0));
        assert_eq!(s.annual_max, Some(55_000.0));
    }

    #[test]
    fn unparseable_text_still_counts_as_mentioned() {
        let s = parse_salary(Some("selon profil"));
        assert_eq!(s.annual_min, None);
        assert_eq!(s.annual_max, None);
        assert!(s.is_mentioned);
    }

    // The decimal-comma normalization happens once, before the range split,
    // so both sides of a range are treated identically.
    #[test]
    fn decimal_commas_are_normalized_on_both_sides_of_a_range() {
        let s = parse_salary(Some("45,5 k€ à 55,5 k€"));
        assert_eq!(s.annual_min, Some(45_500.0));
        assert_eq!(s.annual_max, Some(55_500.0));
    }

    #[test]
    fn thousands_separators_survive_via_the_low_value_correction() {
        // "45 000" loses its space and parses as 45000 directly.
        let s = parse_salary(Some("45 000 € à 55 000 € par an"));
        assert_eq!(s.annual_min, Some(45_000.0));
        assert_eq!(s.annual_max, Some(55_000.0));
    }

    #[test]
    fn open_ended_range_leaves_the_empty_side_null() {
        // "à partir de 45k" has nothing numeric before the connector.
        let s = parse_salary(Some("à partir de 45k"));
        assert_eq!(s.annual_min, None);
        assert_eq!(s.annual_max, Some(45_000.0));
    }

    #[test]
    fn day_rate_values_skip_the_low_value_correction() {
        let s = parse_salary(Some("4 par jour"));
        // 4 * 220 = 880: below 1000, but the correction only applies when no
        // period keyword was present.
        assert_eq!(s.annual_min, Some(880.0));
    }
}
