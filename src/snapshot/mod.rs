//! Typed source records for the four arbitration snapshots.
//!
//! The ingestion pipeline writes one JSON object per collection, keyed by the
//! upstream record id. Validation happens here, at load time: required fields
//! must be present and id lists must hold strings or integers. Anything that
//! parses is accepted by the graph builder as-is, dangling references included.

mod collection;

pub use collection::Collection;

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{ArbgraphError, Result};

pub const CASES_FILE: &str = "cases.json";
pub const DECISIONS_FILE: &str = "decisions.json";
pub const INDIVIDUALS_FILE: &str = "individuals.json";
pub const PARTIES_FILE: &str = "parties.json";

/// The four files that make up one snapshot, in load order.
pub const SNAPSHOT_FILES: [&str; 4] = [CASES_FILE, DECISIONS_FILE, INDIVIDUALS_FILE, PARTIES_FILE];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Case {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub commencement_date: Option<String>,
    #[serde(default)]
    pub arbitral_institution: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default, deserialize_with = "de_ids")]
    pub decision_ids: Vec<String>,
    #[serde(default, deserialize_with = "de_ids")]
    pub party_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Decision {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub case_id: Option<String>,
    #[serde(default, deserialize_with = "de_ids")]
    pub individual_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Individual {
    pub name: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub decision_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    #[serde(default, rename = "type")]
    pub party_type: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub case_id: Option<String>,
}

/// Upstream ids arrive as strings, but some exports carry them as integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Str(String),
    Int(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Str(s) => s,
            RawId::Int(n) => n.to_string(),
        }
    }
}

fn de_ids<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<RawId>> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default().into_iter().map(String::from).collect())
}

fn de_opt_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawId> = Option::deserialize(deserializer)?;
    Ok(raw.map(String::from))
}

/// One immutable set of source collections.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub cases: Collection<Case>,
    pub decisions: Collection<Decision>,
    pub individuals: Collection<Individual>,
    pub parties: Collection<Party>,
}

impl Snapshot {
    pub fn new(
        cases: Collection<Case>,
        decisions: Collection<Decision>,
        individuals: Collection<Individual>,
        parties: Collection<Party>,
    ) -> Self {
        Self {
            cases,
            decisions,
            individuals,
            parties,
        }
    }

    /// Parse a snapshot from the raw contents of its four files.
    pub fn from_json_strs(
        cases: &str,
        decisions: &str,
        individuals: &str,
        parties: &str,
    ) -> Result<Self> {
        Self::from_json_slices(
            cases.as_bytes(),
            decisions.as_bytes(),
            individuals.as_bytes(),
            parties.as_bytes(),
        )
    }

    fn from_json_slices(
        cases: &[u8],
        decisions: &[u8],
        individuals: &[u8],
        parties: &[u8],
    ) -> Result<Self> {
        Ok(Self {
            cases: parse_collection(CASES_FILE, cases)?,
            decisions: parse_collection(DECISIONS_FILE, decisions)?,
            individuals: parse_collection(INDIVIDUALS_FILE, individuals)?,
            parties: parse_collection(PARTIES_FILE, parties)?,
        })
    }

    /// Load `cases.json`, `decisions.json`, `individuals.json` and `parties.json` from `dir`.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        Ok(Self::load_dir_with_fingerprint(dir)?.0)
    }

    /// Load the snapshot and fingerprint it from the same bytes, so the
    /// fingerprint always describes exactly what was parsed.
    pub fn load_dir_with_fingerprint(dir: &Path) -> Result<(Self, String)> {
        let [cases, decisions, individuals, parties] = read_snapshot_files(dir)?;
        let fingerprint = hash_snapshot_files([&cases, &decisions, &individuals, &parties]);
        let snapshot = Self::from_json_slices(&cases, &decisions, &individuals, &parties)?;

        log::info!(
            "Loaded snapshot from {}: {} cases, {} decisions, {} individuals, {} parties",
            dir.display(),
            snapshot.cases.len(),
            snapshot.decisions.len(),
            snapshot.individuals.len(),
            snapshot.parties.len()
        );

        Ok((snapshot, fingerprint))
    }

    /// SHA-256 over the four snapshot files, hex encoded.
    pub fn fingerprint(dir: &Path) -> Result<String> {
        let [cases, decisions, individuals, parties] = read_snapshot_files(dir)?;
        Ok(hash_snapshot_files([&cases, &decisions, &individuals, &parties]))
    }
}

/// Raw bytes of the snapshot files, in `SNAPSHOT_FILES` order.
fn read_snapshot_files(dir: &Path) -> Result<[Vec<u8>; 4]> {
    let read = |file: &str| std::fs::read(dir.join(file)).map_err(ArbgraphError::Io);
    Ok([
        read(CASES_FILE)?,
        read(DECISIONS_FILE)?,
        read(INDIVIDUALS_FILE)?,
        read(PARTIES_FILE)?,
    ])
}

fn hash_snapshot_files(contents: [&Vec<u8>; 4]) -> String {
    let mut hasher = Sha256::new();
    for (file, bytes) in SNAPSHOT_FILES.iter().zip(contents) {
        hasher.update(file.as_bytes());
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    format!("{:x}", hasher.finalize())
}

fn parse_collection<T>(file: &str, content: &[u8]) -> Result<Collection<T>>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_slice(content).map_err(|source| ArbgraphError::Snapshot {
        file: file.to_string(),
        source,
    })
}
