//! OBO ontology parser.
//!
//! Only `[Term]` stanzas are read, and only their `id`, `alt_id`, `name` and
//! `namespace` tags. Alternative ids map to the same entry as the primary id.

use ahash::AHashMap;
use std::io::BufRead;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::parser::util::open_input;

/// Name and namespace of an ontology term.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OboTerm {
    pub name: String,
    pub namespace: String,
}

/// Parse an OBO file into a term id -> [`OboTerm`] map.
pub fn parse_obo(path: &Path) -> Result<AHashMap<String, OboTerm>> {
    let terms = parse_obo_reader(open_input(path)?)?;
    info!(terms = terms.len(), path = %path.display(), "Loaded ontology terms");
    Ok(terms)
}

#[derive(Default)]
struct Stanza {
    id: Option<String>,
    alt_ids: Vec<String>,
    term: OboTerm,
}

impl Stanza {
    /// Primary ids replace earlier entries; alternative ids never do.
    fn flush_into(self, terms: &mut AHashMap<String, OboTerm>) {
        let Some(id) = self.id else {
            return;
        };
        for alt_id in self.alt_ids {
            terms.entry(alt_id).or_insert_with(|| self.term.clone());
        }
        terms.insert(id, self.term);
    }
}

pub(crate) fn parse_obo_reader<R: BufRead>(reader: R) -> Result<AHashMap<String, OboTerm>> {
    let mut terms = AHashMap::new();
    let mut current: Option<Stanza> = None;

    for line_result in reader.lines() {
        let line = line_result?;
        let line = line.trim();

        if line.starts_with('[') {
            if let Some(stanza) = current.take() {
                stanza.flush_into(&mut terms);
            }
            if line == "[Term]" {
                current = Some(Stanza::default());
            }
            continue;
        }

        let Some(stanza) = current.as_mut() else {
            continue;
        };
        let Some((tag, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match tag {
            "id" => stanza.id = Some(value.to_string()),
            "alt_id" => stanza.alt_ids.push(value.to_string()),
            "name" => stanza.term.name = value.to_string(),
            "namespace" => stanza.term.namespace = value.to_string(),
            _ => {}
        }
    }

    if let Some(stanza) = current {
        stanza.flush_into(&mut terms);
    }
    Ok(terms)
}
