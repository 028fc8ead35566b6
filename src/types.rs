//! Core data structures for localgreat.
//!
//! This module contains the fundamental types shared by the gene catalog, the
//! regulatory domain builder, the region associator and the enrichment engine.
//! All coordinates are zero-based and half-open.

use std::fmt;
use std::str::FromStr;

use crate::error::GreatError;

/// Strand orientation for genomic features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Positive,
    Negative,
}

/// Error type for parsing strand from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStrandError;

impl fmt::Display for ParseStrandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid strand: expected '+' or '-'")
    }
}

impl std::error::Error for ParseStrandError {}

impl FromStr for Strand {
    type Err = ParseStrandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Positive),
            "-" => Ok(Strand::Negative),
            _ => Err(ParseStrandError),
        }
    }
}

impl Strand {
    /// Convert strand to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strand::Positive => "+",
            Strand::Negative => "-",
        }
    }

    /// Lenient strand parsing for annotation rows: anything but `-` is forward.
    pub fn from_annotation(s: &str) -> Self {
        s.parse().unwrap_or(Strand::Positive)
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A gene from the annotation table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gene {
    pub gene_id: String,
    /// Display name; equals `gene_id` when the annotation has no name.
    pub gene_name: String,
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
    /// First transcribed base: `start` on `+`, `end - 1` on `-`.
    pub tss: i64,
}

impl Gene {
    /// Create a new gene, deriving the TSS from the strand.
    pub fn new(
        gene_id: String,
        gene_name: String,
        chrom: String,
        start: i64,
        end: i64,
        strand: Strand,
    ) -> Self {
        let tss = match strand {
            Strand::Positive => start,
            Strand::Negative => end - 1,
        };
        Gene {
            gene_id,
            gene_name,
            chrom,
            start,
            end,
            strand,
            tss,
        }
    }
}

/// The interval within which a region is considered to regulate a gene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegulatoryDomain {
    /// Catalog index of the owning gene.
    pub gene: usize,
    pub chrom: String,
    pub start: i64,
    pub end: i64,
}

impl RegulatoryDomain {
    pub fn new(gene: usize, chrom: String, start: i64, end: i64) -> Self {
        RegulatoryDomain {
            gene,
            chrom,
            start,
            end,
        }
    }

    /// Half-open overlap test against `[start, end)`.
    pub fn overlaps(&self, start: i64, end: i64) -> bool {
        self.start < end && self.end > start
    }
}

/// A genomic region from the input BED file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomicRegion {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub name: Option<String>,
}

impl GenomicRegion {
    /// Create a new region.
    pub fn new(chrom: String, start: i64, end: i64, name: Option<String>) -> Self {
        GenomicRegion {
            chrom,
            start,
            end,
            name,
        }
    }

    /// Get the midpoint of the region (integer division).
    pub fn midpoint(&self) -> i64 {
        (self.start + self.end) / 2
    }

    /// Get the region label: its name, or `chrom:start-end` when unnamed.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{}:{}-{}", self.chrom, self.start, self.end),
        }
    }
}

/// An ontology term as read from a gene-set file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub term_id: String,
    pub term_name: String,
    pub category: String,
    /// Member symbols or ids exactly as listed in the file.
    pub members: Vec<String>,
}

impl Term {
    pub fn new(term_id: String, term_name: String, category: String, members: Vec<String>) -> Self {
        Term {
            term_id,
            term_name,
            category,
            members,
        }
    }
}

/// Rule used to turn the gene catalog into regulatory domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AssociationRule {
    #[default]
    BasalPlusExt,
    TwoClosest,
    OneClosest,
}

impl AssociationRule {
    /// Convert rule to its canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssociationRule::BasalPlusExt => "basalPlusExt",
            AssociationRule::TwoClosest => "twoClosest",
            AssociationRule::OneClosest => "oneClosest",
        }
    }
}

impl fmt::Display for AssociationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AssociationRule {
    type Err = GreatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basalplusext" => Ok(AssociationRule::BasalPlusExt),
            "twoclosest" => Ok(AssociationRule::TwoClosest),
            "oneclosest" => Ok(AssociationRule::OneClosest),
            _ => Err(GreatError::UnknownAssociationRule(s.to_string())),
        }
    }
}
