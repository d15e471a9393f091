use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use bson::{Document, doc};
use mongodb::Database;
use tracing::{debug, info, warn};

use crate::db::models::{ApiKey, DEFAULT_CLIENT_ID, OAuthClient, User};
use crate::db::schema::{self, COLLECTIONS, INDEXES, IndexSpec};
use crate::error::{InitError, MongoErrorExt};

/// Outcome of the schema pass, for the final completion log.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SchemaReport {
    pub collections_created: usize,
    pub indexes_created: usize,
}

/// Outcome of a full bootstrap run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapReport {
    pub schema: SchemaReport,
    pub client_seeded: bool,
    pub api_key_seeded: bool,
}

/// Idempotent one-shot initialization of a project database.
///
/// Holds an explicit database handle; every operation is safe to re-run.
/// The existence checks are an optimization to keep re-runs quiet; the
/// unique indexes are the actual backstop, and rejections from a concurrent
/// run are tolerated rather than propagated.
#[derive(Clone)]
pub struct SchemaBootstrap {
    db: Database,
}

impl SchemaBootstrap {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Ping the server until it answers, with bounded exponential backoff.
    /// Propagates the final error once retries exhaust.
    pub async fn ping_until_ready(&self) -> Result<(), InitError> {
        let retry_policy = ExponentialBuilder::default()
            .with_min_delay(Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(5))
            .with_max_times(5)
            .with_jitter();

        (|| async {
            self.db
                .run_command(doc! { "ping": 1 })
                .await
                .map(|_| ())
                .map_err(InitError::from)
        })
        .retry(retry_policy)
        .notify(|err: &InitError, dur: Duration| {
            warn!(error = %err, "database not ready, retrying in {:?}", dur);
        })
        .await
    }

    /// Create the collection if it is not already present. Returns whether a
    /// collection was created.
    pub async fn ensure_collection(&self, name: &str) -> Result<bool, InitError> {
        let existing = self.db.list_collection_names().await?;
        if existing.iter().any(|collection| collection == name) {
            info!(collection = name, "collection already exists");
            return Ok(false);
        }
        match self.db.create_collection(name).await {
            Ok(()) => {
                info!(collection = name, "created collection");
                Ok(true)
            }
            Err(err) if err.is_namespace_exists() => {
                info!(collection = name, "collection created concurrently");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Create the index if no index with its derived name exists on the
    /// collection. Returns whether an index was created.
    ///
    /// Expects the collection to exist already; `run` ensures collections
    /// before indexes.
    pub async fn ensure_index(&self, spec: &IndexSpec) -> Result<bool, InitError> {
        let collection = self.db.collection::<Document>(spec.collection);
        let index_name = spec.name();
        let existing = collection.list_index_names().await?;
        if existing.iter().any(|name| name == &index_name) {
            info!(
                collection = spec.collection,
                index = %index_name,
                "index already exists"
            );
            return Ok(false);
        }
        collection.create_index(spec.model()).await?;
        info!(
            collection = spec.collection,
            index = %index_name,
            unique = spec.unique,
            sparse = spec.sparse,
            "created index"
        );
        Ok(true)
    }

    /// Walk the static schema tables: all collections, then all indexes.
    pub async fn apply_schema(&self) -> Result<SchemaReport, InitError> {
        let mut report = SchemaReport::default();
        for name in COLLECTIONS {
            if self.ensure_collection(name).await? {
                report.collections_created += 1;
            }
        }
        for spec in &INDEXES {
            if self.ensure_index(spec).await? {
                report.indexes_created += 1;
            }
        }
        Ok(report)
    }

    /// Insert the default OAuth client and admin user, both carrying
    /// `api_key` as credential, unless the client already exists.
    ///
    /// The guard is the client's existence only: a missing admin user is not
    /// re-created on its own. Returns whether the pair was seeded.
    pub async fn seed_default_client_and_admin(&self, api_key: &str) -> Result<bool, InitError> {
        let clients = self.db.collection::<Document>(schema::OAUTH_CLIENTS);
        if clients
            .find_one(doc! { "client_id": DEFAULT_CLIENT_ID })
            .await?
            .is_some()
        {
            info!("default OAuth client already exists");
            return Ok(false);
        }

        let client = OAuthClient::default_client(api_key)?;
        let insert = self
            .db
            .collection::<OAuthClient>(schema::OAUTH_CLIENTS)
            .insert_one(&client)
            .await;
        match insert {
            Ok(_) => info!(client_id = DEFAULT_CLIENT_ID, "inserted default OAuth client"),
            Err(err) if err.is_duplicate_key() => {
                // A concurrent bootstrap won the race; its run seeds the admin.
                warn!("default OAuth client inserted concurrently, skipping seed");
                return Ok(false);
            }
            Err(err) => return Err(err.into()),
        }

        let admin = User::default_admin(api_key);
        let insert = self
            .db
            .collection::<User>(schema::USERS)
            .insert_one(&admin)
            .await;
        match insert {
            Ok(_) => info!(username = %admin.username, "inserted default admin user"),
            Err(err) if err.is_duplicate_key() => {
                warn!(username = %admin.username, "admin user already exists, left as-is");
            }
            Err(err) => return Err(err.into()),
        }
        Ok(true)
    }

    /// Insert the default API key record unless one with this key exists.
    /// Returns whether a record was inserted.
    pub async fn seed_default_api_key(&self, api_key: &str) -> Result<bool, InitError> {
        let keys = self.db.collection::<Document>(schema::API_KEYS);
        if keys.find_one(doc! { "key": api_key }).await?.is_some() {
            info!("default API key already exists");
            return Ok(false);
        }

        let record = ApiKey::new(api_key, "Default API key from environment variables");
        let insert = self
            .db
            .collection::<ApiKey>(schema::API_KEYS)
            .insert_one(&record)
            .await;
        match insert {
            Ok(_) => {
                info!("inserted default API key");
                Ok(true)
            }
            Err(err) if err.is_duplicate_key() => {
                warn!("default API key inserted concurrently");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Full linear run: ensure collections, ensure indexes, then seed the
    /// default records when a shared secret is configured.
    pub async fn run(&self, api_key: Option<&str>) -> Result<BootstrapReport, InitError> {
        let schema = self.apply_schema().await?;
        let mut report = BootstrapReport {
            schema,
            ..BootstrapReport::default()
        };
        match api_key {
            Some(key) => {
                report.client_seeded = self.seed_default_client_and_admin(key).await?;
                report.api_key_seeded = self.seed_default_api_key(key).await?;
            }
            None => debug!("API_KEY not set, skipping default client and admin seeding"),
        }
        Ok(report)
    }
}
