use bson::DateTime;
use bson::oid::ObjectId;
use chrono::{Months, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Client id of the record seeded when `API_KEY` is present.
pub const DEFAULT_CLIENT_ID: &str = "default-client";

const DEFAULT_CLIENT_URI: &str = "http://localhost:5000";
const DEFAULT_REDIRECT_URI: &str = "http://localhost:5000/oauth/callback";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub project_id: String,
    pub name: String,
    pub description: String,
    pub status: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Project {
    pub fn new(project_id: &str, name: &str, description: &str) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            project_id: project_id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            status: "active".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A document attached to a project ("ideation", "business_case", "charter",
/// "technical", ...). The type tag is free text, indexed but not validated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub project_id: String,
    pub document_type: String,
    pub content: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub project_id: String,
    pub timestamp: DateTime,
    pub user: String,
    pub message: String,
    pub metadata: ConversationMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConversationMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OAuthClient {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub client_id: String,
    pub client_secret: String,
    pub client_name: String,
    pub client_uri: String,
    pub redirect_uris: Vec<String>,
    pub grant_types: Vec<String>,
    pub response_types: Vec<String>,
    pub scope: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl OAuthClient {
    /// The fixed-shape client seeded at bootstrap.
    ///
    /// The secret is stored exactly as given, matching the source
    /// deployment. Anything production-facing must hash instead.
    pub fn default_client(secret: &str) -> Result<Self, url::ParseError> {
        // Validate the fixed URIs without normalizing the stored strings.
        Url::parse(DEFAULT_CLIENT_URI)?;
        Url::parse(DEFAULT_REDIRECT_URI)?;
        let now = DateTime::now();
        Ok(Self {
            id: None,
            client_id: DEFAULT_CLIENT_ID.to_string(),
            client_secret: secret.to_string(),
            client_name: "Default Client".to_string(),
            client_uri: DEFAULT_CLIENT_URI.to_string(),
            redirect_uris: vec![DEFAULT_REDIRECT_URI.to_string()],
            grant_types: vec![
                "authorization_code".to_string(),
                "refresh_token".to_string(),
                "client_credentials".to_string(),
            ],
            response_types: vec!["code".to_string(), "token".to_string()],
            scope: "read write".to_string(),
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OAuthToken {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub access_token: String,
    /// Absent for client_credentials grants; the sparse unique index only
    /// applies where the field is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub scope: Option<String>,
    pub issued_at: DateTime,
    pub expires_at: DateTime,
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    pub password: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl User {
    /// The fixed-shape admin seeded alongside the default client. The
    /// password is the raw shared secret (plaintext pass-through, as in the
    /// source deployment).
    pub fn default_admin(secret: &str) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password: secret.to_string(),
            is_active: true,
            is_admin: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiKey {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub key: String,
    pub description: String,
    pub created_at: DateTime,
    pub expires_at: DateTime,
    pub active: bool,
}

impl ApiKey {
    /// New active key with the default one-year expiry.
    pub fn new(key: &str, description: &str) -> Self {
        let now = Utc::now();
        let expires = now + Months::new(12);
        Self {
            id: None,
            key: key.to_string(),
            description: description.to_string(),
            created_at: DateTime::from_chrono(now),
            expires_at: DateTime::from_chrono(expires),
            active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::Bson;

    #[test]
    fn default_client_matches_the_seed_shape() {
        let client = OAuthClient::default_client("s3cret").expect("fixed URIs parse");
        assert_eq!(client.client_id, "default-client");
        assert_eq!(client.client_secret, "s3cret");
        assert_eq!(client.client_name, "Default Client");
        assert_eq!(client.client_uri, "http://localhost:5000");
        assert_eq!(
            client.redirect_uris,
            ["http://localhost:5000/oauth/callback"]
        );
        assert_eq!(
            client.grant_types,
            ["authorization_code", "refresh_token", "client_credentials"]
        );
        assert_eq!(client.response_types, ["code", "token"]);
        assert_eq!(client.scope, "read write");

        let doc = bson::to_document(&client).expect("serializes");
        assert!(!doc.contains_key("_id"), "server assigns the _id");
        assert!(matches!(doc.get("created_at"), Some(Bson::DateTime(_))));
        assert!(matches!(doc.get("updated_at"), Some(Bson::DateTime(_))));
    }

    #[test]
    fn default_admin_matches_the_seed_shape() {
        let admin = User::default_admin("s3cret");
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.email, "admin@example.com");
        assert_eq!(admin.password, "s3cret");
        assert!(admin.is_active);
        assert!(admin.is_admin);

        let doc = bson::to_document(&admin).expect("serializes");
        assert!(!doc.contains_key("_id"));
        assert_eq!(doc.get_str("password").expect("password present"), "s3cret");
    }

    #[test]
    fn api_key_defaults_to_one_year_active() {
        let key = ApiKey::new("abc123", "Default API key from environment variables");
        assert!(key.active);
        let lifetime_days =
            (key.expires_at.timestamp_millis() - key.created_at.timestamp_millis())
                / (24 * 60 * 60 * 1000);
        assert!((365..=366).contains(&lifetime_days), "{lifetime_days} days");
    }

    #[test]
    fn token_without_refresh_omits_the_sparse_fields() {
        let now = DateTime::now();
        let token = OAuthToken {
            id: None,
            access_token: "tok".to_string(),
            refresh_token: None,
            client_id: DEFAULT_CLIENT_ID.to_string(),
            user_id: None,
            scope: Some("read".to_string()),
            issued_at: now,
            expires_at: now,
            token_type: "Bearer".to_string(),
        };
        let doc = bson::to_document(&token).expect("serializes");
        assert!(!doc.contains_key("refresh_token"));
        assert!(!doc.contains_key("user_id"));
    }

    #[test]
    fn new_projects_start_active() {
        let project = Project::new("p-1", "Demo", "demo project");
        assert_eq!(project.status, "active");
        assert_eq!(project.created_at, project.updated_at);
    }
}
