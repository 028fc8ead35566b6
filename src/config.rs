//! Configuration and defaults for localgreat.
//!
//! This module contains the configuration structure and default values that
//! control domain construction, term selection and post-hoc filtering.

use crate::error::{GreatError, Result};
use crate::types::AssociationRule;

/// Default basal upstream extent in bp.
pub const DEFAULT_UPSTREAM: i64 = 5000;
/// Default basal downstream extent in bp.
pub const DEFAULT_DOWNSTREAM: i64 = 1000;
/// Default maximum extension from the TSS in bp.
pub const DEFAULT_MAX_EXTENSION: i64 = 1_000_000;
/// Largest accepted extent or extension in bp (about 1.1 Tbp).
pub const MAX_DISTANCE: i64 = 1 << 40;

/// Configuration for an enrichment run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Association rule for building regulatory domains.
    pub rule: AssociationRule,
    /// Basal domain extent upstream of the TSS in bp.
    pub upstream: i64,
    /// Basal domain extent downstream of the TSS in bp.
    pub downstream: i64,
    /// Maximum distance a domain may reach from its TSS in bp.
    pub max_extension: i64,
    /// Whether region starts are zero-based (BED) or one-based.
    pub zero_based: bool,
    /// Smallest resolved term size that is tested.
    pub min_term_size: usize,
    /// Largest resolved term size that is tested.
    pub max_term_size: usize,
    /// Post-hoc filter: minimum observed genes.
    pub min_genes: usize,
    /// Post-hoc filter: maximum binomial FDR.
    pub max_fdr: f64,
    /// GTF tag for gene ID.
    pub gene_id_tag: String,
    /// GTF tag for gene name.
    pub gene_name_tag: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rule: AssociationRule::BasalPlusExt,
            upstream: DEFAULT_UPSTREAM,
            downstream: DEFAULT_DOWNSTREAM,
            max_extension: DEFAULT_MAX_EXTENSION,
            zero_based: true,
            min_term_size: 1,
            max_term_size: 10_000,
            min_genes: 1,
            max_fdr: 1.0,
            gene_id_tag: "gene_id".to_string(),
            gene_name_tag: "gene_name".to_string(),
        }
    }
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and set the association rule by name.
    pub fn set_rule(&mut self, rule: &str) -> Result<()> {
        self.rule = rule.parse()?;
        Ok(())
    }

    /// Set max extension in kb (converts to bp internally).
    ///
    /// Negative or overflowing values are rejected and leave the config unchanged.
    pub fn set_max_extension_kb(&mut self, kb: i64) -> Result<()> {
        if kb < 0 {
            return Err(GreatError::InvalidConfig(
                "the maximum extension cannot be lower than 0 kb".to_string(),
            ));
        }
        self.max_extension = kb.checked_mul(1000).ok_or_else(|| {
            GreatError::InvalidConfig(format!("maximum extension of {} kb is out of range", kb))
        })?;
        Ok(())
    }

    /// Check that every field is within its valid range.
    pub fn validate(&self) -> Result<()> {
        if self.upstream < 0 || self.downstream < 0 {
            return Err(GreatError::InvalidConfig(
                "basal extents cannot be lower than 0 bps".to_string(),
            ));
        }
        if self.max_extension < 0 {
            return Err(GreatError::InvalidConfig(
                "the maximum extension cannot be lower than 0 bps".to_string(),
            ));
        }
        for (name, value) in [
            ("upstream extent", self.upstream),
            ("downstream extent", self.downstream),
            ("maximum extension", self.max_extension),
        ] {
            if value > MAX_DISTANCE {
                return Err(GreatError::InvalidConfig(format!(
                    "{} of {} bps exceeds the limit of {} bps",
                    name, value, MAX_DISTANCE
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.max_fdr) {
            return Err(GreatError::InvalidConfig(format!(
                "max FDR must range between 0 and 1, got {}",
                self.max_fdr
            )));
        }
        if self.min_term_size > self.max_term_size {
            return Err(GreatError::InvalidConfig(format!(
                "minimum term size {} exceeds maximum term size {}",
                self.min_term_size, self.max_term_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.rule, AssociationRule::BasalPlusExt);
        assert_eq!(config.upstream, 5000);
        assert_eq!(config.downstream, 1000);
        assert_eq!(config.max_extension, 1_000_000);
        assert!(config.zero_based);
        assert_eq!(config.min_genes, 1);
        assert_eq!(config.max_fdr, 1.0);
        assert_eq!(config.gene_id_tag, "gene_id");
        assert_eq!(config.gene_name_tag, "gene_name");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_set_rule() {
        let mut config = Config::new();
        config.set_rule("oneClosest").unwrap();
        assert_eq!(config.rule, AssociationRule::OneClosest);

        let err = config.set_rule("threeClosest").unwrap_err();
        assert!(matches!(err, GreatError::UnknownAssociationRule(_)));
        // Unchanged after a failed parse
        assert_eq!(config.rule, AssociationRule::OneClosest);
    }

    #[test]
    fn test_set_max_extension_kb() {
        let mut config = Config::new();
        config.set_max_extension_kb(20).unwrap();
        assert_eq!(config.max_extension, 20000);

        assert!(matches!(config.set_max_extension_kb(-1), Err(GreatError::InvalidConfig(_))));
        assert_eq!(config.max_extension, 20000);
    }

    #[test]
    fn test_set_max_extension_kb_overflow() {
        let mut config = Config::new();
        let err = config.set_max_extension_kb(i64::MAX / 10).unwrap_err();
        assert!(matches!(err, GreatError::InvalidConfig(_)));
        assert_eq!(config.max_extension, DEFAULT_MAX_EXTENSION);

        // Fits in i64 but is past the distance limit
        config.set_max_extension_kb(i64::MAX / 1000).unwrap();
        assert!(matches!(config.validate(), Err(GreatError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::new();
        config.upstream = -1;
        assert!(matches!(config.validate(), Err(GreatError::InvalidConfig(_))));

        let mut config = Config::new();
        config.max_fdr = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.min_term_size = 10;
        config.max_term_size = 5;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.max_extension = -10;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.upstream = MAX_DISTANCE + 1;
        assert!(config.validate().is_err());
        config.upstream = MAX_DISTANCE;
        assert!(config.validate().is_ok());
    }
}
