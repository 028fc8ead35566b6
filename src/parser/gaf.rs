//! GO annotation (GAF) parser.
//!
//! Each annotation row links a gene symbol (column 3) to a GO id (column 5).
//! Terms are split into one category per GO aspect, taken from column 9 or,
//! when that is missing, from the ontology namespace. Rows whose qualifier
//! negates the annotation (`NOT`) are skipped.

use ahash::AHashMap;
use indexmap::{IndexMap, IndexSet};
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::parser::obo::OboTerm;
use crate::parser::util::open_input;
use crate::types::Term;

/// The three GO sub-ontologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoAspect {
    BiologicalProcess,
    MolecularFunction,
    CellularComponent,
}

impl GoAspect {
    /// Category order used for output.
    pub const ALL: [GoAspect; 3] = [
        GoAspect::BiologicalProcess,
        GoAspect::MolecularFunction,
        GoAspect::CellularComponent,
    ];

    /// Aspect from the single-letter GAF code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "P" => Some(GoAspect::BiologicalProcess),
            "F" => Some(GoAspect::MolecularFunction),
            "C" => Some(GoAspect::CellularComponent),
            _ => None,
        }
    }

    /// Aspect from an OBO `namespace` value.
    pub fn from_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            "biological_process" => Some(GoAspect::BiologicalProcess),
            "molecular_function" => Some(GoAspect::MolecularFunction),
            "cellular_component" => Some(GoAspect::CellularComponent),
            _ => None,
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            GoAspect::BiologicalProcess => "GO Biological Process",
            GoAspect::MolecularFunction => "GO Molecular Function",
            GoAspect::CellularComponent => "GO Cellular Component",
        }
    }
}

/// Parse a GAF file into GO terms, one category per aspect.
///
/// Term names come from `ontology` when given, and fall back to the GO id.
pub fn parse_gaf(path: &Path, ontology: Option<&AHashMap<String, OboTerm>>) -> Result<Vec<Term>> {
    let terms = parse_gaf_reader(open_input(path)?, ontology)?;
    info!(terms = terms.len(), path = %path.display(), "Loaded GO annotations");
    Ok(terms)
}

pub(crate) fn parse_gaf_reader<R: BufRead>(
    reader: R,
    ontology: Option<&AHashMap<String, OboTerm>>,
) -> Result<Vec<Term>> {
    let mut by_aspect: AHashMap<GoAspect, IndexMap<String, IndexSet<String>>> = AHashMap::new();
    let mut negated = 0usize;
    let mut unplaced = 0usize;

    for line_result in reader.lines() {
        let line = line_result?;
        if line.trim().is_empty() || line.starts_with('!') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        if fields.len() < 5 {
            continue;
        }
        let (symbol, qualifier, go_id) = (fields[2], fields[3], fields[4]);
        if symbol.is_empty() || go_id.is_empty() {
            continue;
        }
        if qualifier.split('|').any(|q| q.eq_ignore_ascii_case("NOT")) {
            negated += 1;
            continue;
        }

        let aspect = fields
            .get(8)
            .and_then(|code| GoAspect::from_code(code))
            .or_else(|| {
                ontology
                    .and_then(|terms| terms.get(go_id))
                    .and_then(|term| GoAspect::from_namespace(&term.namespace))
            });
        let Some(aspect) = aspect else {
            unplaced += 1;
            continue;
        };

        by_aspect
            .entry(aspect)
            .or_default()
            .entry(go_id.to_string())
            .or_default()
            .insert(symbol.to_string());
    }

    debug!(negated, "Skipped negated GO annotations");
    if unplaced > 0 {
        warn!(unplaced, "Skipped GO annotations without a known aspect");
    }

    let mut terms = Vec::new();
    for aspect in GoAspect::ALL {
        let Some(go_terms) = by_aspect.remove(&aspect) else {
            continue;
        };
        for (go_id, members) in go_terms {
            let name = ontology
                .and_then(|terms| terms.get(&go_id))
                .map(|term| term.name.clone())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| go_id.clone());
            terms.push(Term::new(
                go_id,
                name,
                aspect.category().to_string(),
                members.into_iter().collect(),
            ));
        }
    }

    Ok(terms)
}
