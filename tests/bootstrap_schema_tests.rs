use std::collections::BTreeMap;

use projectdb_init::config::BootstrapConfig;
use projectdb_init::db::models::{ApiKey, OAuthClient, User};
use projectdb_init::db::schema::{COLLECTIONS, INDEXES};
use projectdb_init::db::{DEFAULT_CLIENT_ID, SchemaBootstrap};

/// The deployment contract: every collection with the index names expected
/// on it after one bootstrap run.
#[test]
fn schema_inventory_matches_the_deployment_contract() {
    let mut inventory: BTreeMap<&str, Vec<String>> =
        COLLECTIONS.iter().map(|name| (*name, Vec::new())).collect();
    for spec in &INDEXES {
        inventory
            .get_mut(spec.collection)
            .expect("index on undeclared collection")
            .push(spec.name());
    }

    let expected: BTreeMap<&str, Vec<String>> = [
        ("api_keys", vec!["key_1".to_string()]),
        ("projects", vec!["project_id_1".to_string()]),
        (
            "documents",
            vec![
                "project_id_1".to_string(),
                "project_id_1_document_type_1".to_string(),
            ],
        ),
        ("conversations", vec!["project_id_1_timestamp_1".to_string()]),
        ("oauth_clients", vec!["client_id_1".to_string()]),
        (
            "oauth_tokens",
            vec!["access_token_1".to_string(), "refresh_token_1".to_string()],
        ),
        (
            "users",
            vec!["username_1".to_string(), "email_1".to_string()],
        ),
    ]
    .into_iter()
    .collect();

    assert_eq!(inventory, expected);
}

/// Every field the seeding path inserts through has a unique index declared
/// as its race backstop.
#[test]
fn unique_backstops_cover_the_seeded_records() {
    let unique_on = |collection: &str, field: &str| {
        INDEXES
            .iter()
            .any(|spec| spec.collection == collection && spec.unique && spec.keys[0].0 == field)
    };
    assert!(unique_on("oauth_clients", "client_id"));
    assert!(unique_on("users", "username"));
    assert!(unique_on("users", "email"));
    assert!(unique_on("api_keys", "key"));
}

/// The one secret from the environment flows verbatim into every seeded
/// credential field (pass-through behavior preserved from the source).
#[test]
fn seeded_records_share_the_secret_verbatim() {
    let client = OAuthClient::default_client("s3cret").expect("fixed URIs parse");
    let admin = User::default_admin("s3cret");
    let key = ApiKey::new("s3cret", "Default API key from environment variables");

    assert_eq!(client.client_id, DEFAULT_CLIENT_ID);
    assert_eq!(client.client_secret, "s3cret");
    assert_eq!(admin.password, "s3cret");
    assert_eq!(key.key, "s3cret");
}

/// Seed documents never carry a client-side `_id`; the server assigns it.
#[test]
fn seed_documents_leave_id_assignment_to_the_server() {
    let client = OAuthClient::default_client("k").expect("fixed URIs parse");
    let admin = User::default_admin("k");

    let client_doc = bson::to_document(&client).expect("client serializes");
    let admin_doc = bson::to_document(&admin).expect("admin serializes");
    assert!(!client_doc.contains_key("_id"));
    assert!(!admin_doc.contains_key("_id"));
}

#[test]
fn config_reads_the_container_environment() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("MONGO_INITDB_DATABASE", "project_db_test");
        jail.set_env("API_KEY", "s3cret");
        let cfg: BootstrapConfig = BootstrapConfig::figment().extract()?;
        assert_eq!(cfg.database, "project_db_test");
        assert_eq!(cfg.api_key.as_deref(), Some("s3cret"));
        Ok(())
    });
}

/// The driver connects lazily, so wiring can be checked without a server.
#[tokio::test]
async fn bootstrap_binds_the_configured_database() {
    let client = mongodb::Client::with_uri_str("mongodb://localhost:27017")
        .await
        .expect("client builds without connecting");
    let bootstrap = SchemaBootstrap::new(client.database("project_db"));
    assert_eq!(bootstrap.database().name(), "project_db");
}
