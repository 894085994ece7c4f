//! Snapshot persistence for `MemoryStore`.
//!
//! Two encodings of the same `StoreSnapshotV1`:
//! - JSON (`*.json`): hand-editable fixtures
//! - CBOR with a small header (anything else): compact snapshots
//!
//! Binary layout: `FVSN` magic, `u32` little-endian version, CBOR body.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use facetview_model::{CanonicalNode, NodeId};

use crate::memory::{MemoryStore, StoreState, ROOT_ID};

pub const SNAPSHOT_VERSION_V1: &str = "facetview_snapshot_v1";
const MAGIC: &[u8; 4] = b"FVSN";
const BINARY_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotNode {
    #[serde(default)]
    pub parent: Option<NodeId>,
    #[serde(flatten)]
    pub node: CanonicalNode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshotV1 {
    pub version: String,
    /// Live nodes in insertion order; parents precede their children.
    pub nodes: Vec<SnapshotNode>,
}

impl MemoryStore {
    pub fn snapshot(&self) -> StoreSnapshotV1 {
        self.read(|state| StoreSnapshotV1 {
            version: SNAPSHOT_VERSION_V1.to_string(),
            nodes: state
                .live()
                .map(|(_, node)| SnapshotNode {
                    parent: state.parents.get(&node.id).copied(),
                    node: node.clone(),
                })
                .collect(),
        })
    }

    pub fn from_snapshot(snapshot: StoreSnapshotV1) -> Result<Self> {
        if snapshot.version != SNAPSHOT_VERSION_V1 {
            return Err(anyhow!("unsupported snapshot version `{}`", snapshot.version));
        }

        let mut state = StoreState::default();
        for (ordinal, entry) in snapshot.nodes.into_iter().enumerate() {
            let id = entry.node.id;
            if state.ordinals.insert(id, ordinal as u32).is_some() {
                return Err(anyhow!("duplicate node {id} in snapshot"));
            }
            if let Some(parent) = entry.parent {
                state.parents.insert(id, parent);
            }
            state.slots.push(Some(entry.node));
        }
        if !state.ordinals.contains_key(&ROOT_ID) {
            return Err(anyhow!("snapshot has no root node {ROOT_ID}"));
        }
        Ok(MemoryStore::from_state(state))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&BINARY_VERSION.to_le_bytes());
        ciborium::ser::into_writer(&self.snapshot(), &mut out)?;
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 8 || &bytes[0..4] != MAGIC {
            return Err(anyhow!("invalid snapshot file"));
        }
        let version = u32::from_le_bytes(bytes[4..8].try_into()?);
        if version != BINARY_VERSION {
            return Err(anyhow!("unsupported snapshot encoding version: {version}"));
        }
        let snapshot: StoreSnapshotV1 = ciborium::de::from_reader(&bytes[8..])?;
        Self::from_snapshot(snapshot)
    }

    /// Write a snapshot; the encoding follows the file extension.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = if is_json(path) {
            serde_json::to_vec_pretty(&self.snapshot())?
        } else {
            self.to_bytes()?
        };
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, path)?;
        tracing::debug!(path = %path.display(), nodes = self.len(), "saved store snapshot");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let store = if is_json(path) {
            let snapshot: StoreSnapshotV1 = serde_json::from_slice(&bytes)
                .with_context(|| format!("parsing {}", path.display()))?;
            Self::from_snapshot(snapshot)?
        } else {
            Self::from_bytes(&bytes)?
        };
        tracing::debug!(path = %path.display(), nodes = store.len(), "loaded store snapshot");
        Ok(store)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
