//! Case title lookup for a person's name, following the record references.

use crate::error::{ArbgraphError, Result};
use crate::snapshot::Snapshot;

const PERSON_PARTY_TYPE: &str = "person";

/// Title of the case a named person appears in.
///
/// Individuals are checked first (individual -> decision -> case); if no
/// individual carries the exact name, parties of type `person` are checked
/// (party -> case). The first match decides the outcome, even when its chain
/// is broken.
pub fn case_title_for_name(snapshot: &Snapshot, name: &str) -> Result<String> {
    if let Some(individual) = snapshot.individuals.values().find(|i| i.name == name) {
        let decision_id = individual.decision_id.as_deref().ok_or_else(|| {
            ArbgraphError::DecisionNotFound(format!("no decision recorded for '{}'", name))
        })?;
        let decision = snapshot
            .decisions
            .get(decision_id)
            .ok_or_else(|| ArbgraphError::DecisionNotFound(decision_id.to_string()))?;
        return case_title(snapshot, decision.case_id.as_deref(), name);
    }

    let party = snapshot.parties.values().find(|p| {
        p.name == name
            && p.party_type
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case(PERSON_PARTY_TYPE))
    });
    if let Some(party) = party {
        return case_title(snapshot, party.case_id.as_deref(), name);
    }

    Err(ArbgraphError::NameNotFound(name.to_string()))
}

fn case_title(snapshot: &Snapshot, case_id: Option<&str>, name: &str) -> Result<String> {
    let case_id = case_id
        .ok_or_else(|| ArbgraphError::CaseNotFound(format!("no case recorded for '{}'", name)))?;
    snapshot
        .cases
        .get(case_id)
        .map(|case| case.title.clone())
        .ok_or_else(|| ArbgraphError::CaseNotFound(case_id.to_string()))
}
