//! Output formatting for localgreat results.
//!
//! This module handles writing enrichment tables and the region-gene
//! association table as TSV with a fixed column order. Floats use Rust's
//! shortest round-trip formatting, so identical inputs give identical bytes.

use std::io::Write;

use crate::associate::AssociationRow;
use crate::enrichment::EnrichmentRecord;
use crate::error::Result;

/// Enrichment table columns, in output order.
pub const ENRICHMENT_COLUMNS: [&str; 24] = [
    "term_id",
    "term_name",
    "category",
    "binom_rank",
    "binom_p",
    "binom_bonferroni",
    "binom_fdr",
    "binom_fold_enrichment",
    "observed_regions",
    "expected_regions",
    "genome_fraction",
    "region_coverage",
    "hyper_rank",
    "hyper_p",
    "hyper_bonferroni",
    "hyper_fdr",
    "hyper_fold_enrichment",
    "observed_genes",
    "expected_genes",
    "total_genes",
    "gene_coverage",
    "term_coverage",
    "regions",
    "genes",
];

/// Association table columns, in output order.
pub const ASSOCIATION_COLUMNS: [&str; 6] = ["region", "gene_id", "gene_name", "chrom", "tss", "distance"];

/// Enrichment results of one category, ordered by binomial rank.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentTable {
    pub category: String,
    pub records: Vec<EnrichmentRecord>,
}

impl EnrichmentTable {
    pub fn new(category: String, records: Vec<EnrichmentRecord>) -> Self {
        EnrichmentTable { category, records }
    }

    /// Rows with at least `min_genes` observed genes and a binomial FDR of at
    /// most `max_fdr`. Ranks are kept from the unfiltered table.
    pub fn filter(&self, min_genes: usize, max_fdr: f64) -> EnrichmentTable {
        EnrichmentTable {
            category: self.category.clone(),
            records: self
                .records
                .iter()
                .filter(|r| r.observed_genes >= min_genes && r.binom_fdr <= max_fdr)
                .cloned()
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Tabs and newlines inside a field would break the TSV layout.
fn clean_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

/// Write the enrichment table header.
pub fn write_header<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, "{}", ENRICHMENT_COLUMNS.join("\t"))?;
    Ok(())
}

/// Format a single output line for an enrichment record.
pub fn format_record_line(record: &EnrichmentRecord) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        clean_field(&record.term_id),
        clean_field(&record.term_name),
        clean_field(&record.category),
        record.binom_rank,
        record.binom_p,
        record.binom_bonferroni,
        record.binom_fdr,
        record.binom_fold_enrichment,
        record.observed_regions,
        record.expected_regions,
        record.genome_fraction,
        record.region_coverage,
        record.hyper_rank,
        record.hyper_p,
        record.hyper_bonferroni,
        record.hyper_fdr,
        record.hyper_fold_enrichment,
        record.observed_genes,
        record.expected_genes,
        record.total_genes,
        record.gene_coverage,
        record.term_coverage,
        clean_field(&record.regions.join(",")),
        clean_field(&record.genes.join(",")),
    )
}

/// Write one category table with its header.
pub fn write_table<W: Write>(writer: &mut W, table: &EnrichmentTable) -> Result<()> {
    write_header(writer)?;
    for record in &table.records {
        writeln!(writer, "{}", format_record_line(record))?;
    }
    Ok(())
}

/// Write every table under a single header, categories in the given order.
pub fn write_all<'a, W, I>(writer: &mut W, tables: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a EnrichmentTable>,
{
    write_header(writer)?;
    for table in tables {
        for record in &table.records {
            writeln!(writer, "{}", format_record_line(record))?;
        }
    }
    Ok(())
}

/// Write the region-gene association table.
pub fn write_associations<W: Write>(writer: &mut W, rows: &[AssociationRow]) -> Result<()> {
    writeln!(writer, "{}", ASSOCIATION_COLUMNS.join("\t"))?;
    for row in rows {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}",
            clean_field(&row.region),
            row.gene_id,
            row.gene_name,
            row.chrom,
            row.tss,
            row.distance
        )?;
    }
    Ok(())
}

/// File name for a category table: characters outside `[A-Za-z0-9._-]`
/// become `_`.
pub fn table_file_name(category: &str) -> String {
    let mut name: String = category
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if name.is_empty() || name.starts_with('.') {
        name.insert(0, '_');
    }
    name.push_str(".tsv");
    name
}
