pub mod models;
pub mod queries;

#[cfg(test)]
pub mod memory;

use anyhow::{Result, Context, anyhow};
use futures::future::{BoxFuture, FutureExt, Shared};
use mongodb::{Client, Database};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Create MongoDB connection
pub async fn create_client(uri: &str) -> Result<Client> {
    let client = Client::with_uri_str(uri)
        .await
        .context("Failed to connect to MongoDB")?;

    // Ping to verify connection
    client
        .database("admin")
        .run_command(mongodb::bson::doc! {"ping": 1})
        .await
        .context("Failed to ping MongoDB")?;

    tracing::info!("Successfully connected to MongoDB");
    Ok(client)
}

/// Single shared link to MongoDB.
///
/// The client is created on first use and reused for the lifetime of the
/// process. Concurrent first callers await one shared connection attempt; if
/// it fails, every one of them gets that error and the slot is cleared so the
/// next caller starts a fresh attempt.
pub struct MongoConnection {
    uri: Arc<str>,
    db_name: String,
    pending: Mutex<Option<PendingClient>>,
}

type PendingClient = Shared<BoxFuture<'static, Result<Client, Arc<anyhow::Error>>>>;

impl MongoConnection {
    pub fn new(uri: impl Into<String>, db_name: impl Into<String>) -> Self {
        Self {
            uri: Arc::from(uri.into()),
            db_name: db_name.into(),
            pending: Mutex::new(None),
        }
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    #[cfg(test)]
    pub async fn is_connected(&self) -> bool {
        self.pending
            .lock()
            .await
            .as_ref()
            .and_then(|attempt| attempt.peek())
            .is_some_and(|result| result.is_ok())
    }

    pub async fn client(&self) -> Result<Client> {
        let attempt = {
            let mut pending = self.pending.lock().await;
            match pending.as_ref() {
                Some(attempt) => attempt.clone(),
                None => {
                    let uri = self.uri.clone();
                    let attempt = async move { create_client(&uri).await.map_err(Arc::new) }
                        .boxed()
                        .shared();
                    *pending = Some(attempt.clone());
                    attempt
                }
            }
        };

        match attempt.clone().await {
            Ok(client) => Ok(client),
            Err(e) => {
                let mut pending = self.pending.lock().await;
                // Only clear the slot if no newer attempt replaced this one
                if pending.as_ref().is_some_and(|current| current.ptr_eq(&attempt)) {
                    *pending = None;
                }
                Err(anyhow!("{:#}", e))
            }
        }
    }

    /// Get database handle
    pub async fn database(&self) -> Result<Database> {
        let client = self.client().await?;
        Ok(client.database(&self.db_name))
    }
}
