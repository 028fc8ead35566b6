//! Term annotation index.
//!
//! Groups parsed gene-set terms by category and resolves their member symbols
//! to catalog gene indices.

use ahash::AHashSet;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::catalog::GeneCatalog;
use crate::error::{GreatError, Result};
use crate::types::Term;

/// A term with its members resolved against the gene catalog.
#[derive(Debug, Clone)]
pub struct ResolvedTerm {
    pub term: Term,
    /// Sorted, distinct catalog indices of the members found in the catalog.
    pub genes: Vec<usize>,
    /// Member symbols with no match in the catalog.
    pub dropped: usize,
}

impl ResolvedTerm {
    /// Resolve a term's members. Unknown symbols are counted, not rejected.
    pub fn resolve(term: Term, catalog: &GeneCatalog) -> Self {
        let mut genes = Vec::with_capacity(term.members.len());
        let mut dropped = 0usize;
        for member in &term.members {
            match catalog.resolve_symbol(member) {
                Some(idx) => genes.push(idx),
                None => dropped += 1,
            }
        }
        genes.sort_unstable();
        genes.dedup();

        ResolvedTerm {
            term,
            genes,
            dropped,
        }
    }

    /// Number of distinct catalog genes annotated with the term.
    pub fn size(&self) -> usize {
        self.genes.len()
    }
}

/// Category -> term id -> resolved term, in input order.
#[derive(Debug, Clone, Default)]
pub struct TermIndex {
    categories: IndexMap<String, IndexMap<String, ResolvedTerm>>,
    dropped_symbols: usize,
    filtered_terms: usize,
}

impl TermIndex {
    /// Build the index from terms of any number of files.
    ///
    /// Terms whose resolved size falls outside `[min_size, max_size]` are left
    /// out of the index and counted.
    pub fn build<I>(terms: I, catalog: &GeneCatalog, min_size: usize, max_size: usize) -> Result<Self>
    where
        I: IntoIterator<Item = Term>,
    {
        let mut categories: IndexMap<String, IndexMap<String, ResolvedTerm>> = IndexMap::new();
        let mut seen: AHashSet<(String, String)> = AHashSet::new();
        let mut dropped_symbols = 0usize;
        let mut filtered_terms = 0usize;

        for term in terms {
            if !seen.insert((term.category.clone(), term.term_id.clone())) {
                return Err(GreatError::DuplicateTerm {
                    category: term.category,
                    term_id: term.term_id,
                });
            }

            let resolved = ResolvedTerm::resolve(term, catalog);
            if resolved.dropped > 0 {
                debug!(
                    term = %resolved.term.term_id,
                    dropped = resolved.dropped,
                    "Gene-set members not found in the annotation"
                );
                dropped_symbols += resolved.dropped;
            }

            let in_bounds = (min_size..=max_size).contains(&resolved.size());
            let category_terms = categories.entry(resolved.term.category.clone()).or_default();
            if !in_bounds {
                filtered_terms += 1;
                continue;
            }
            category_terms.insert(resolved.term.term_id.clone(), resolved);
        }

        if dropped_symbols > 0 {
            warn!(dropped_symbols, "Gene-set symbols missing from the annotation were ignored");
        }
        if filtered_terms > 0 {
            info!(filtered_terms, min_size, max_size, "Skipped terms outside the size bounds");
        }

        Ok(TermIndex {
            categories,
            dropped_symbols,
            filtered_terms,
        })
    }

    /// Categories with their terms, in input order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &IndexMap<String, ResolvedTerm>)> {
        self.categories.iter().map(|(c, t)| (c.as_str(), t))
    }

    /// Terms of one category.
    pub fn category(&self, name: &str) -> Option<&IndexMap<String, ResolvedTerm>> {
        self.categories.get(name)
    }

    /// Total number of indexed terms over all categories.
    pub fn len(&self) -> usize {
        self.categories.values().map(|t| t.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Member symbols dropped over all terms.
    pub fn dropped_symbols(&self) -> usize {
        self.dropped_symbols
    }

    /// Terms left out by the size bounds.
    pub fn filtered_terms(&self) -> usize {
        self.filtered_terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Gene, Strand};

    fn catalog() -> GeneCatalog {
        let genes = ["TP53", "MDM2", "BRCA1"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                Gene::new(
                    format!("ENSG{}", i),
                    name.to_string(),
                    "chr1".to_string(),
                    (i as i64) * 10_000,
                    (i as i64) * 10_000 + 500,
                    Strand::Positive,
                )
            })
            .collect();
        GeneCatalog::from_genes(genes)
    }

    fn term(category: &str, id: &str, members: &[&str]) -> Term {
        Term::new(
            id.to_string(),
            id.to_string(),
            category.to_string(),
            members.iter().map(|m| m.to_string()).collect(),
        )
    }

    #[test]
    fn test_resolve_drops_unknown_symbols() {
        let resolved = ResolvedTerm::resolve(term("go", "T1", &["tp53", "NOPE", "ENSG1", "MDM2"]), &catalog());
        // ENSG1 and MDM2 are the same gene
        assert_eq!(resolved.genes, vec![0, 1]);
        assert_eq!(resolved.dropped, 1);
        assert_eq!(resolved.size(), 2);
    }

    #[test]
    fn test_build_groups_by_category_in_order() {
        let terms = vec![
            term("kegg", "K1", &["TP53"]),
            term("go", "G1", &["BRCA1"]),
            term("kegg", "K2", &["MDM2", "GHOST"]),
            // Same id in another category is fine
            term("go", "K1", &["TP53"]),
        ];
        let index = TermIndex::build(terms, &catalog(), 1, 10_000).unwrap();

        let names: Vec<&str> = index.categories().map(|(c, _)| c).collect();
        assert_eq!(names, vec!["kegg", "go"]);
        let kegg: Vec<&String> = index.category("kegg").unwrap().keys().collect();
        assert_eq!(kegg, vec!["K1", "K2"]);
        assert_eq!(index.len(), 4);
        assert_eq!(index.dropped_symbols(), 1);
    }

    #[test]
    fn test_duplicate_term_in_category() {
        let terms = vec![term("go", "G1", &["TP53"]), term("go", "G1", &["MDM2"])];
        let err = TermIndex::build(terms, &catalog(), 1, 10_000).unwrap_err();
        assert!(matches!(err, GreatError::DuplicateTerm { ref term_id, .. } if term_id == "G1"));
    }

    #[test]
    fn test_size_bounds_filter_terms() {
        let terms = vec![
            term("go", "EMPTY", &["GHOST"]),
            term("go", "ONE", &["TP53"]),
            term("go", "THREE", &["TP53", "MDM2", "BRCA1"]),
        ];
        let index = TermIndex::build(terms, &catalog(), 1, 2).unwrap();
        let kept: Vec<&String> = index.category("go").unwrap().keys().collect();
        assert_eq!(kept, vec!["ONE"]);
        assert_eq!(index.filtered_terms(), 2);
    }
}
