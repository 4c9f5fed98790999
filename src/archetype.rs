//! Archetype derivation
//!
//! An archetype is the named personality profile computed once from a
//! complete answer set. It drives both the result copy and the image prompt.
//! Derivation is total: the optional enrichment call is tried first and any
//! failure falls back to the local rule table.

use crate::quiz::{AnswerSet, QuestionCatalog};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

pub mod enrich;
pub mod rules;

pub use enrich::ArchetypeEnricher;
pub use rules::derive_local;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchetypeSource {
    Local,
    Enriched,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archetype {
    pub name: String,
    pub descriptor: String,
    pub value_line: String,
    pub color_palette: String,
    pub background_style: String,
    pub character_type: String,
    pub character_pose: String,
    pub source: ArchetypeSource,
}

/// Computes archetypes, preferring enrichment when one is configured.
#[derive(Clone)]
pub struct ArchetypeDeriver {
    catalog: Arc<QuestionCatalog>,
    enricher: Option<Arc<ArchetypeEnricher>>,
}

impl ArchetypeDeriver {
    pub fn local(catalog: Arc<QuestionCatalog>) -> Self {
        Self {
            catalog,
            enricher: None,
        }
    }

    pub fn with_enricher(catalog: Arc<QuestionCatalog>, enricher: Arc<ArchetypeEnricher>) -> Self {
        Self {
            catalog,
            enricher: Some(enricher),
        }
    }

    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    /// Never fails; enrichment errors are logged and replaced by the local result.
    pub async fn derive(&self, answers: &AnswerSet) -> Archetype {
        if let Some(enricher) = &self.enricher {
            match enricher.enrich(&self.catalog, answers).await {
                Ok(archetype) => {
                    info!(archetype = %archetype.name, "archetype enriched");
                    return archetype;
                }
                Err(err) => {
                    warn!(error = %err, "archetype enrichment failed, using local rules");
                }
            }
        }
        derive_local(&self.catalog, answers)
    }
}
