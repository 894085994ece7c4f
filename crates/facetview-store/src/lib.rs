//! FacetView reference store
//!
//! In-memory implementations of the two collaborator seams of the projection
//! engine:
//!
//! - `MemoryStore`: a `CanonicalStore` with ordered children, links and
//!   snapshot persistence (JSON or CBOR)
//! - `MemorySearchEngine`: a `FacetedQueryEngine` backed by a roaring-bitmap
//!   facet index rebuilt per store generation

mod facet_index;
mod memory;
mod search;
mod snapshot;

pub use facet_index::FacetIndex;
pub use memory::{MemoryStore, ROOT_ID, ROOT_TYPE};
pub use search::MemorySearchEngine;
pub use snapshot::{SnapshotNode, StoreSnapshotV1, SNAPSHOT_VERSION_V1};
