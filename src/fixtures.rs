//! Shared snapshots for unit tests.

use crate::snapshot::Snapshot;

pub const CASES: &str = r#"{
    "c1": {"title": "Pinnacle Mining Ltd v. Republic of Quorra", "decision_ids": ["d1"], "party_ids": ["p1", "p2"]}
}"#;
pub const DECISIONS: &str = r#"{
    "d1": {"case_id": "c1", "individual_ids": ["i1", "i2", "i3"]}
}"#;
pub const INDIVIDUALS: &str = r#"{
    "i1": {"name": "Ada Park", "decision_id": "d1"},
    "i2": {"name": "Bo Lin", "decision_id": "d1"},
    "i3": {"name": "Cy Ortiz", "decision_id": "d1"}
}"#;
pub const PARTIES: &str = r#"{
    "p1": {"name": "Pinnacle Mining Ltd", "type": "Company", "case_id": "c1"},
    "p2": {"name": "Republic of Quorra", "type": "State", "case_id": "c1"}
}"#;

/// Three arbitrators on one decision of a case between two parties.
/// Node ids: Ada Park=0, Bo Lin=1, Cy Ortiz=2, Pinnacle Mining Ltd=3, Republic of Quorra=4.
pub fn arbitration_snapshot() -> Snapshot {
    Snapshot::from_json_strs(CASES, DECISIONS, INDIVIDUALS, PARTIES).unwrap()
}

/// A path Ada - Bo - Cy - Dee built from three decisions, plus Eve with no decisions.
/// Node ids: Ada=0, Bo=1, Cy=2, Dee=3, Eve=4.
pub fn chain_snapshot() -> Snapshot {
    let decisions = r#"{
        "d1": {"individual_ids": ["a", "b"]},
        "d2": {"individual_ids": ["b", "c"]},
        "d3": {"individual_ids": ["c", "d"]}
    }"#;
    let individuals = r#"{
        "a": {"name": "Ada"},
        "b": {"name": "Bo"},
        "c": {"name": "Cy"},
        "d": {"name": "Dee"},
        "e": {"name": "Eve"}
    }"#;
    Snapshot::from_json_strs("{}", decisions, individuals, "{}").unwrap()
}

/// A square Ada - Bo - Dee - Cy - Ada: two shortest paths between Ada and Dee.
/// Node ids: Ada=0, Bo=1, Cy=2, Dee=3.
pub fn square_snapshot() -> Snapshot {
    let decisions = r#"{
        "d1": {"individual_ids": ["a", "b"]},
        "d2": {"individual_ids": ["b", "d"]},
        "d3": {"individual_ids": ["d", "c"]},
        "d4": {"individual_ids": ["c", "a"]}
    }"#;
    let individuals = r#"{
        "a": {"name": "Ada"},
        "b": {"name": "Bo"},
        "c": {"name": "Cy"},
        "d": {"name": "Dee"}
    }"#;
    Snapshot::from_json_strs("{}", decisions, individuals, "{}").unwrap()
}

/// Write the arbitration snapshot files into `dir`.
pub fn write_arbitration_snapshot(dir: &std::path::Path) {
    use crate::snapshot::{CASES_FILE, DECISIONS_FILE, INDIVIDUALS_FILE, PARTIES_FILE};
    std::fs::write(dir.join(CASES_FILE), CASES).unwrap();
    std::fs::write(dir.join(DECISIONS_FILE), DECISIONS).unwrap();
    std::fs::write(dir.join(INDIVIDUALS_FILE), INDIVIDUALS).unwrap();
    std::fs::write(dir.join(PARTIES_FILE), PARTIES).unwrap();
}
