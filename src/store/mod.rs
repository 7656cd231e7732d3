//! Entity stores: the CRUD collaborators behind the controllers.
//!
//! Every entity kind gets one [`EntityStore`]. Two interchangeable
//! implementations exist, the seeded in-memory [`local::LocalStore`] and the
//! hosted [`crate::api::RemoteStore`]; which one is used is decided once, in
//! [`Stores::from_config`].

pub mod local;
pub mod seed;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::api::{RemoteClient, RemoteStore};
use crate::config::{Backend, Config};
use crate::error::StoreError;
use crate::models::{Category, Record, Task};

use self::local::{Latency, LocalStore};

#[async_trait]
pub trait EntityStore<R: Record>: Send + Sync {
    async fn get_all(&self) -> Result<Vec<R>, StoreError>;

    /// Fails with [`StoreError::NotFound`] when no record has this id.
    async fn get_by_id(&self, id: u64) -> Result<R, StoreError>;

    /// The store assigns the id and the timestamps.
    async fn create(&self, draft: R::Draft) -> Result<R, StoreError>;

    /// Merge update; fields not set in `patch` are left untouched.
    async fn update(&self, id: u64, patch: R::Patch) -> Result<R, StoreError>;

    async fn delete(&self, id: u64) -> Result<bool, StoreError>;
}

/// The pair of stores handed to the controllers.
#[derive(Clone)]
pub struct Stores {
    pub tasks: Arc<dyn EntityStore<Task>>,
    pub categories: Arc<dyn EntityStore<Category>>,
}

impl Stores {
    pub fn new(
        tasks: Arc<dyn EntityStore<Task>>,
        categories: Arc<dyn EntityStore<Category>>,
    ) -> Self {
        Stores { tasks, categories }
    }

    /// In-memory stores filled with the bundled sample data.
    pub fn seeded(latency: Latency) -> Self {
        Stores::new(
            Arc::new(LocalStore::new(seed::tasks(), latency)),
            Arc::new(LocalStore::new(seed::categories(), latency)),
        )
    }

    pub fn from_config(config: &Config) -> Self {
        match &config.backend {
            Backend::Local { latency } => {
                info!(latency = *latency, "using local seeded store");
                let latency = if *latency {
                    Latency::simulated()
                } else {
                    Latency::none()
                };
                Stores::seeded(latency)
            }
            Backend::Remote(remote) => {
                info!(base_url = %remote.base_url, project = %remote.project_id, "using remote store");
                let client = RemoteClient::new(remote);
                Stores::new(
                    Arc::new(RemoteStore::<Task>::new(client.clone())),
                    Arc::new(RemoteStore::<Category>::new(client)),
                )
            }
        }
    }
}
