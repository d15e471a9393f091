//! Collection and index declarations for the project database.
//!
//! MongoDB has no textual DDL, so the schema is a pair of static tables the
//! bootstrapper walks: collection names, and index specs carrying the
//! uniqueness/sparseness constraints the application relies on.

use bson::Document;
use mongodb::IndexModel;
use mongodb::options::IndexOptions;

pub const API_KEYS: &str = "api_keys";
pub const PROJECTS: &str = "projects";
pub const DOCUMENTS: &str = "documents";
pub const CONVERSATIONS: &str = "conversations";
pub const OAUTH_CLIENTS: &str = "oauth_clients";
pub const OAUTH_TOKENS: &str = "oauth_tokens";
pub const USERS: &str = "users";

/// Every collection the application expects to exist.
pub const COLLECTIONS: [&str; 7] = [
    API_KEYS,
    PROJECTS,
    DOCUMENTS,
    CONVERSATIONS,
    OAUTH_CLIENTS,
    OAUTH_TOKENS,
    USERS,
];

/// Ascending sort direction for index keys.
pub const ASC: i32 = 1;

/// Declarative index: ordered `(field, direction)` keys plus constraint flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpec {
    pub collection: &'static str,
    pub keys: &'static [(&'static str, i32)],
    pub unique: bool,
    pub sparse: bool,
}

/// Every index the application expects. The unique entries double as the
/// correctness backstop for the seeding path's check-then-insert.
pub const INDEXES: [IndexSpec; 10] = [
    IndexSpec {
        collection: API_KEYS,
        keys: &[("key", ASC)],
        unique: true,
        sparse: false,
    },
    IndexSpec {
        collection: PROJECTS,
        keys: &[("project_id", ASC)],
        unique: true,
        sparse: false,
    },
    IndexSpec {
        collection: DOCUMENTS,
        keys: &[("project_id", ASC)],
        unique: false,
        sparse: false,
    },
    IndexSpec {
        collection: DOCUMENTS,
        keys: &[("project_id", ASC), ("document_type", ASC)],
        unique: false,
        sparse: false,
    },
    IndexSpec {
        collection: CONVERSATIONS,
        keys: &[("project_id", ASC), ("timestamp", ASC)],
        unique: false,
        sparse: false,
    },
    IndexSpec {
        collection: OAUTH_CLIENTS,
        keys: &[("client_id", ASC)],
        unique: true,
        sparse: false,
    },
    IndexSpec {
        collection: OAUTH_TOKENS,
        keys: &[("access_token", ASC)],
        unique: true,
        sparse: false,
    },
    // Sparse: tokens issued via client_credentials carry no refresh token.
    IndexSpec {
        collection: OAUTH_TOKENS,
        keys: &[("refresh_token", ASC)],
        unique: true,
        sparse: true,
    },
    IndexSpec {
        collection: USERS,
        keys: &[("username", ASC)],
        unique: true,
        sparse: false,
    },
    IndexSpec {
        collection: USERS,
        keys: &[("email", ASC)],
        unique: true,
        sparse: false,
    },
];

impl IndexSpec {
    /// Deterministic identifier matching the server's default index naming:
    /// each `field_direction` pair joined with `_`.
    pub fn name(&self) -> String {
        self.keys
            .iter()
            .map(|(field, direction)| format!("{field}_{direction}"))
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Ordered key document for `createIndexes`.
    pub fn key_document(&self) -> Document {
        let mut keys = Document::new();
        for (field, direction) in self.keys {
            keys.insert(*field, *direction);
        }
        keys
    }

    /// Driver model carrying the derived name explicitly, so the existence
    /// check and the created index always agree on the identifier.
    pub fn model(&self) -> IndexModel {
        let options = IndexOptions::builder()
            .name(self.name())
            .unique(self.unique.then_some(true))
            .sparse(self.sparse.then_some(true))
            .build();
        IndexModel::builder()
            .keys(self.key_document())
            .options(options)
            .build()
    }
}
