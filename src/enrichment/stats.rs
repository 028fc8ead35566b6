//! Upper-tail tests for the binomial and hypergeometric families.

use statrs::distribution::{Binomial, DiscreteCDF, Hypergeometric};
use tracing::debug;

/// Binomial upper-tail p-value: `P(X >= observed)` for `X ~ Binom(trials, fraction)`.
///
/// Returns 1.0 when nothing was observed or the distribution is degenerate.
pub fn binomial_pvalue(observed: u64, trials: u64, fraction: f64) -> f64 {
    if observed == 0 || trials == 0 || fraction <= 0.0 {
        return 1.0;
    }
    if fraction >= 1.0 {
        return 1.0;
    }
    match Binomial::new(fraction, trials) {
        // sf(k) is P(X > k), so shift by one to include `observed`
        Ok(binom) => clamp_pvalue(binom.sf(observed - 1)),
        Err(err) => {
            debug!(%err, fraction, trials, "Binomial distribution rejected its parameters");
            1.0
        }
    }
}

/// Hypergeometric upper-tail p-value: `P(X >= observed)` when drawing `draws`
/// items from `population` items of which `successes` are successes.
pub fn hypergeometric_pvalue(observed: u64, population: u64, successes: u64, draws: u64) -> f64 {
    if observed == 0 || population == 0 || successes == 0 || draws == 0 {
        return 1.0;
    }
    match Hypergeometric::new(population, successes, draws) {
        Ok(hyper) => clamp_pvalue(hyper.sf(observed - 1)),
        Err(err) => {
            debug!(%err, population, successes, draws, "Hypergeometric distribution rejected its parameters");
            1.0
        }
    }
}

/// Observed over expected; infinite when nothing was expected.
pub fn fold_enrichment(observed: f64, expected: f64) -> f64 {
    if expected > 0.0 {
        observed / expected
    } else {
        f64::INFINITY
    }
}

/// `numerator / denominator`, or 0 for an empty denominator.
pub fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn clamp_pvalue(p: f64) -> f64 {
    if p.is_nan() {
        1.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_binomial_pvalue() {
        // P(X >= 1) for Binom(2, 0.5) = 0.75
        assert_close(binomial_pvalue(1, 2, 0.5), 0.75);
        // P(X >= 2) for Binom(2, 0.5) = 0.25
        assert_close(binomial_pvalue(2, 2, 0.5), 0.25);
        assert_close(binomial_pvalue(3, 3, 0.1), 0.001);
    }

    #[test]
    fn test_binomial_degenerate_cases() {
        assert_eq!(binomial_pvalue(0, 10, 0.5), 1.0);
        assert_eq!(binomial_pvalue(3, 0, 0.5), 1.0);
        assert_eq!(binomial_pvalue(3, 10, 0.0), 1.0);
        assert_eq!(binomial_pvalue(3, 10, 1.0), 1.0);
    }

    #[test]
    fn test_hypergeometric_pvalue() {
        // Population 10, 5 successes, 5 draws: P(X >= 5) = 1 / C(10, 5)
        assert_close(hypergeometric_pvalue(5, 10, 5, 5), 1.0 / 252.0);
        // All draws are the whole population
        assert_close(hypergeometric_pvalue(2, 4, 2, 4), 1.0);
        assert_eq!(hypergeometric_pvalue(0, 10, 5, 5), 1.0);
        assert_eq!(hypergeometric_pvalue(1, 0, 0, 0), 1.0);
    }

    #[test]
    fn test_fold_enrichment_and_ratio() {
        assert_eq!(fold_enrichment(4.0, 2.0), 2.0);
        assert!(fold_enrichment(1.0, 0.0).is_infinite());
        assert_eq!(ratio(1, 4), 0.25);
        assert_eq!(ratio(1, 0), 0.0);
    }
}
