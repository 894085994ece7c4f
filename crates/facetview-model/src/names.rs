//! Vocabulary shared by the store, the engine and fixtures.
//!
//! Everything here is a default: the engine reads node-kind and deny-list
//! vocabulary from its configuration, which starts from these values.

// ============================================================================
// Node types
// ============================================================================

pub const NT_FOLDER: &str = "content:folder";
pub const NT_HANDLE: &str = "content:handle";
pub const NT_DOCUMENT: &str = "content:document";
pub const NT_REQUEST: &str = "content:request";
pub const NT_TRANSLATION: &str = "content:translation";

/// Plain dereference of `content:docbase`.
pub const NT_MIRROR: &str = "content:mirror";
/// Dereference plus facet rules (`content:facets` / `values` / `modes`).
pub const NT_FACET_SELECT: &str = "content:facetselect";
/// Stored faceted query whose hits become virtual children.
pub const NT_FACET_SEARCH: &str = "content:facetsearch";
/// Type marker of a materialized result set.
pub const NT_FACET_RESULT: &str = "content:facetresult";

// ============================================================================
// Capability tags (mixins)
// ============================================================================

pub const MIX_REFERENCEABLE: &str = "mix:referenceable";
pub const MIX_VERSIONABLE: &str = "mix:versionable";
pub const MIX_SOFT_DOCUMENT: &str = "content:softdocument";
pub const MIX_SOFT_HANDLE: &str = "content:softhandle";

// ============================================================================
// Properties
// ============================================================================

pub const PROP_PRIMARY_TYPE: &str = "core:primaryType";
/// The store's own identity property.
pub const PROP_UUID: &str = "core:uuid";
/// Where the identity of a mirrored document/handle is exposed instead.
pub const PROP_VIRTUAL_UUID: &str = "content:uuid";

pub const PROP_DOCBASE: &str = "content:docbase";
pub const PROP_FACETS: &str = "content:facets";
pub const PROP_VALUES: &str = "content:values";
pub const PROP_MODES: &str = "content:modes";

pub const PROP_QUERY_NAME: &str = "content:queryname";
pub const PROP_SEARCH: &str = "content:search";
pub const PROP_CONSTRAINTS: &str = "content:constraints";
pub const PROP_RANGES: &str = "content:ranges";
pub const PROP_ORDER_BY: &str = "content:orderby";
pub const PROP_LIMIT: &str = "content:limit";
pub const PROP_COUNT: &str = "content:count";

/// Operational properties never copied onto a virtual node.
pub const DENIED_PROPERTIES: &[&str] = &[
    "core:baseVersion",
    "core:versionHistory",
    "core:predecessors",
    "core:isCheckedOut",
    "core:mergeFailed",
    "content:related",
    "content:computedRelated",
];

// ============================================================================
// Reserved values
// ============================================================================

/// References ending with this suffix point into system areas and are never
/// dereferenced (the store root uses `cafebabe-cafe-babe-cafe-babecafebabe`).
pub const SYSTEM_SENTINEL_SUFFIX: &str = "babecafebabe";

/// Joins a docbase and an inherited filter into one query string.
pub const QUERY_DELIMITER: &str = "#";

pub const DEFAULT_RESULT_LIMIT: usize = 1000;

/// Namespace prefixes a facet path may use.
pub const KNOWN_NAMESPACES: &[&str] = &["core", "content", "mix"];
