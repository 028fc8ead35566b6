//! GMT gene-set parser (`term_id<TAB>term_name<TAB>gene...`).

use std::io::BufRead;
use std::path::Path;
use tracing::{info, warn};

use crate::error::Result;
use crate::parser::util::{file_stem, open_input};
use crate::types::Term;

/// Parse a gene-set file into terms of one category.
///
/// When `category` is `None` the category is the file name stem.
pub fn parse_gmt(path: &Path, category: Option<&str>) -> Result<Vec<Term>> {
    let category = match category {
        Some(c) => c.to_string(),
        None => file_stem(path),
    };

    let terms = parse_gmt_reader(open_input(path)?, &category)?;
    info!(
        terms = terms.len(),
        category = %category,
        path = %path.display(),
        "Loaded gene sets"
    );
    Ok(terms)
}

/// Parse an MSigDB collection, placing each gene set in a category named
/// after its id prefix (see [`msigdb_category`]).
pub fn parse_msigdb_gmt(path: &Path) -> Result<Vec<Term>> {
    let mut terms = parse_gmt_reader(open_input(path)?, "")?;
    for term in &mut terms {
        term.category = msigdb_category(&term.term_id);
    }
    info!(
        terms = terms.len(),
        path = %path.display(),
        "Loaded MSigDB gene sets"
    );
    Ok(terms)
}

/// Category of an MSigDB gene set: the text before the first `_` with
/// well-known collections spelled out, or `OTHER` for ids without one.
pub fn msigdb_category(term_id: &str) -> String {
    let prefix = match term_id.split_once('_') {
        Some((prefix, _)) if !prefix.is_empty() => prefix,
        _ => return "OTHER".to_string(),
    };
    match prefix {
        "HALLMARK" => "Hallmark",
        "KEGG" => "KEGG Pathway",
        "REACTOME" => "Reactome Pathway",
        "BIOCARTA" => "BioCarta Pathway",
        "PID" => "PID Pathway",
        "GO" => "Gene Ontology",
        "HP" => "Human Phenotype",
        other => other,
    }
    .to_string()
}

pub(crate) fn parse_gmt_reader<R: BufRead>(reader: R, category: &str) -> Result<Vec<Term>> {
    let mut terms = Vec::new();

    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let line = line.trim_end();
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split('\t');
        let term_id = fields.next().unwrap_or("").trim();
        let term_name = fields.next().unwrap_or("").trim();
        let members: Vec<String> = fields
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();

        if term_id.is_empty() || members.is_empty() {
            warn!(line = idx + 1, category, "Skipping gene set without id or members");
            continue;
        }

        let term_name = if term_name.is_empty() { term_id } else { term_name };
        terms.push(Term::new(
            term_id.to_string(),
            term_name.to_string(),
            category.to_string(),
            members,
        ));
    }

    Ok(terms)
}
