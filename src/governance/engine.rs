//! Governance engine: the allow/block decision core.
//!
//! Each guarded operation loads a fresh snapshot of the governance
//! document, consults the similarity matcher and the phase gate, and
//! returns a [`Decision`]. Decisions are total — no path on this surface
//! returns an error. Internal failures (unreadable document, failed save)
//! degrade per the fail-open contract and leave a diagnostic line behind.

use crate::core::diag::Diag;
use crate::core::error::PhasegateError;
use crate::core::store::Store;
use crate::core::time;
use crate::governance::kind::ArtifactKind;
use crate::governance::phase::{Operation, Phase};
use crate::governance::registry::{ArtifactRecord, GovernanceDoc, HistoryEntry, Registry};
use crate::governance::similarity::{STRONG_MATCH, find_similar};

/// Outcome of a guarded operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub allow: bool,
    pub message: Option<String>,
}

impl Decision {
    pub fn allow(message: String) -> Decision {
        Decision {
            allow: true,
            message: Some(message),
        }
    }

    pub fn block(message: String) -> Decision {
        Decision {
            allow: false,
            message: Some(message),
        }
    }
}

/// Maximum length of the stored content snippet.
const SNIPPET_LEN: usize = 200;

pub struct Engine {
    kind: ArtifactKind,
    registry: Registry,
    diag: Diag,
}

impl Engine {
    pub fn new(store: &Store, kind: ArtifactKind) -> Engine {
        let diag = Diag::new(store);
        let registry = Registry::new(store.governance_path(kind), diag.clone());
        Engine {
            kind,
            registry,
            diag,
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Pre-create gate. Never blocks: similarity findings are advisory
    /// only, nudging the caller toward cloning instead of duplicating.
    pub fn check_create(&self, name: &str, content_text: &str) -> Decision {
        let doc = self.registry.load();
        let query = format!("{} {}", name, content_text);
        let matches = find_similar(&query, &doc);
        let banner = self.kind.banner();
        let label = self.kind.label();

        let decision = match matches.first() {
            Some(top) if top.similarity >= STRONG_MATCH => Decision::allow(format!(
                "⚠️ {banner}: Found very similar {label} \"{}\" ({}% match, phase: {}).\n\
                 Consider cloning it instead of creating new (id: {}).\n\
                 If you proceed, the new {label} will be tagged DEV.",
                top.name, top.similarity, top.phase, top.id
            )),
            Some(_) => {
                let listing: Vec<String> = matches
                    .iter()
                    .take(3)
                    .map(|m| format!("  - \"{}\" ({}% match, {})", m.name, m.similarity, m.phase))
                    .collect();
                Decision::allow(format!(
                    "📋 {banner}: Found similar {label}s:\n{}\nNew {label} will be tagged DEV.",
                    listing.join("\n")
                ))
            }
            None => Decision::allow(format!(
                "📋 {banner}: No similar {label}s found. New {label} \"{name}\" will be tagged DEV."
            )),
        };

        self.diag.log(
            self.kind.component(),
            "pre-create check",
            Some(serde_json::json!({
                "name": name,
                "top_match": matches.first().map(|m| serde_json::json!({
                    "id": m.id, "similarity": m.similarity
                })),
                "allow": decision.allow,
            })),
        );
        decision
    }

    /// Pre-update gate: apply the phase legality table to the artifact's
    /// current phase.
    ///
    /// Lookup is by id, falling back to first-match-by-name when the id is
    /// absent from the document. The fallback is a heuristic: with the
    /// `BTreeMap` store, "first match" means lowest id in lexicographic
    /// order when names collide.
    pub fn check_update(&self, id: Option<&str>, name: &str) -> Decision {
        let doc = self.registry.load();
        let record = lookup(&doc, id, name);
        let banner = self.kind.banner();
        let label = self.kind.label();

        let decision = match record {
            None => Decision::allow(format!(
                "📋 {banner}: {label} \"{name}\" is not tracked. Register it as DEV once \
                 the update succeeds (`phasegate registry register`)."
            )),
            Some(rec) if rec.phase.permits(Operation::Mutate) => Decision::allow(format!(
                "✅ {banner}: {label} \"{}\" is in {} phase - modification allowed.",
                rec.name, rec.phase
            )),
            Some(rec) if rec.phase == Phase::Archived => Decision::block(format!(
                "❌ {banner} BLOCKED: {label} \"{}\" is ARCHIVED.\n\
                 Archived {label}s cannot be modified or cloned. Resurrect by creating \
                 a new DEV {label} from its definition.",
                rec.name
            )),
            Some(rec) => Decision::block(format!(
                "❌ {banner} BLOCKED: {label} \"{}\" is in {} phase and cannot be modified.\n\
                 Protected phases ({}) can only be CLONED, not edited.\n\
                 To modify: clone the {label}, work on the DEV copy, then promote when ready.",
                rec.name,
                rec.phase,
                Phase::protected_list()
            )),
        };

        self.diag.log(
            self.kind.component(),
            "pre-update check",
            Some(serde_json::json!({
                "id": id,
                "name": name,
                "phase": record.map(|r| r.phase.to_string()),
                "allow": decision.allow,
            })),
        );
        decision
    }

    /// Pre-delete gate: unconditional block, for every id, tracked or not,
    /// in every phase. Deletion of governed artifacts is never authorized.
    pub fn check_delete(&self, id: Option<&str>) -> Decision {
        let banner = self.kind.banner();
        let label = self.kind.label();
        let subject = match id {
            Some(id) => format!("{label} \"{id}\""),
            None => format!("this {label}"),
        };

        let decision = Decision::block(format!(
            "❌ {banner} BLOCKED: Deletion is not allowed.\n\
             Instead, do one of:\n\
             1. ARCHIVE: set the {label} phase to ARCHIVED (`phasegate registry set-phase`)\n\
             2. DEACTIVATE: switch {subject} off but keep it for reference\n\
             3. RENAME: prefix the name with \"[DEPRECATED] \" to mark it obsolete"
        ));

        self.diag.log(
            self.kind.component(),
            "pre-delete blocked",
            Some(serde_json::json!({ "id": id })),
        );
        decision
    }

    /// Post-success registration hook. Inserts a new record when the id is
    /// unknown; re-registration of a tracked id is a no-op (history stays
    /// intact, `created` is never overwritten). Persistence is best-effort:
    /// the external mutation already committed, so a failed save is logged
    /// and swallowed.
    pub fn register_artifact(
        &self,
        id: &str,
        name: &str,
        content_snippet: &str,
        phase: Phase,
    ) -> bool {
        let mut doc = self.registry.load();
        if doc.artifacts.contains_key(id) {
            self.diag.log(
                self.kind.component(),
                "already registered, skipping",
                Some(serde_json::json!({ "id": id })),
            );
            return true;
        }

        let now = time::now_epoch_z();
        let snippet: String = content_snippet.chars().take(SNIPPET_LEN).collect();
        doc.artifacts.insert(
            id.to_string(),
            ArtifactRecord {
                name: name.to_string(),
                phase,
                description: format!("{}: {}", capitalize(self.kind.label()), name),
                content_snippet: snippet,
                created: now.clone(),
                modified: now.clone(),
                history: vec![HistoryEntry {
                    action: "created".to_string(),
                    phase,
                    timestamp: now,
                }],
            },
        );

        let saved = self.registry.save(&doc);
        self.diag.log(
            self.kind.component(),
            if saved {
                "registered artifact"
            } else {
                "registration not persisted"
            },
            Some(serde_json::json!({ "id": id, "name": name, "phase": phase.to_string() })),
        );
        saved
    }

    /// Explicit phase reassignment (operator-side). Any phase value may be
    /// written; the gate above only cares about the current value. Appends
    /// a `phase_change` history entry and bumps `modified`.
    pub fn set_phase(&self, id: &str, phase: Phase) -> Result<(), PhasegateError> {
        let mut doc = self.registry.load();
        let record = doc.artifacts.get_mut(id).ok_or_else(|| {
            PhasegateError::NotFound(format!("{} '{}' is not tracked", self.kind.label(), id))
        })?;

        let now = time::now_epoch_z();
        record.phase = phase;
        record.modified = now.clone();
        record.history.push(HistoryEntry {
            action: "phase_change".to_string(),
            phase,
            timestamp: now,
        });

        if !self.registry.save(&doc) {
            return Err(PhasegateError::ValidationError(format!(
                "failed to persist governance document at {}",
                self.registry.path().display()
            )));
        }
        self.diag.log(
            self.kind.component(),
            "phase reassigned",
            Some(serde_json::json!({ "id": id, "phase": phase.to_string() })),
        );
        Ok(())
    }
}

fn lookup<'a>(doc: &'a GovernanceDoc, id: Option<&str>, name: &str) -> Option<&'a ArtifactRecord> {
    if let Some(id) = id {
        if let Some(rec) = doc.artifacts.get(id) {
            return Some(rec);
        }
    }
    doc.artifacts.values().find(|r| r.name == name)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
