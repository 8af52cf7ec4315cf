#[cfg(not(any(feature = "memory", feature = "sqlite")))]
compile_error!("Enable a repo feature: `memory` or `sqlite`.");

use orders_types::domain::order::{Order, OrderId};
use orders_types::ports::order_repository::{OrderRepository, RepoError};

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(not(feature = "memory"))]
const DEFAULT_SQLITE_URL: &str = "sqlite://orders.db";

/// The store adapter selected at build time.
#[derive(Clone)]
pub enum Repo {
    #[cfg(feature = "memory")]
    Memory(memory::InMemoryRepo),
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite::SqliteRepo),
}

/// SQLite when a URL is given and the feature is on; memory otherwise.
pub async fn build_repo(url: Option<&str>) -> anyhow::Result<Repo> {
    Repo::build_repo(url).await
}

impl Repo {
    pub async fn build_repo(url: Option<&str>) -> anyhow::Result<Self> {
        match url {
            #[cfg(feature = "sqlite")]
            Some(url) => Ok(Repo::Sqlite(sqlite::SqliteRepo::new(url).await?)),
            #[cfg(feature = "memory")]
            _ => Ok(Repo::Memory(memory::InMemoryRepo::new())),
            #[cfg(not(feature = "memory"))]
            _ => Ok(Repo::Sqlite(
                sqlite::SqliteRepo::new(DEFAULT_SQLITE_URL).await?,
            )),
        }
    }

    /// Releases the underlying connections.
    pub async fn close(&self) {
        match self {
            #[cfg(feature = "memory")]
            Repo::Memory(_) => {}
            #[cfg(feature = "sqlite")]
            Repo::Sqlite(repo) => repo.close().await,
        }
    }
}

#[cfg(feature = "memory")]
impl From<memory::InMemoryRepo> for Repo {
    fn from(repo: memory::InMemoryRepo) -> Self {
        Repo::Memory(repo)
    }
}

#[cfg(feature = "sqlite")]
impl From<sqlite::SqliteRepo> for Repo {
    fn from(repo: sqlite::SqliteRepo) -> Self {
        Repo::Sqlite(repo)
    }
}

#[async_trait::async_trait]
impl OrderRepository for Repo {
    async fn create(&self, order: Order) -> Result<Order, RepoError> {
        match self {
            #[cfg(feature = "memory")]
            Repo::Memory(repo) => repo.create(order).await,
            #[cfg(feature = "sqlite")]
            Repo::Sqlite(repo) => repo.create(order).await,
        }
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepoError> {
        match self {
            #[cfg(feature = "memory")]
            Repo::Memory(repo) => repo.get(id).await,
            #[cfg(feature = "sqlite")]
            Repo::Sqlite(repo) => repo.get(id).await,
        }
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: String,
    ) -> Result<Option<Order>, RepoError> {
        match self {
            #[cfg(feature = "memory")]
            Repo::Memory(repo) => repo.update_status(id, status).await,
            #[cfg(feature = "sqlite")]
            Repo::Sqlite(repo) => repo.update_status(id, status).await,
        }
    }

    async fn delete(&self, id: OrderId) -> Result<bool, RepoError> {
        match self {
            #[cfg(feature = "memory")]
            Repo::Memory(repo) => repo.delete(id).await,
            #[cfg(feature = "sqlite")]
            Repo::Sqlite(repo) => repo.delete(id).await,
        }
    }

    async fn ping(&self) -> Result<(), RepoError> {
        match self {
            #[cfg(feature = "memory")]
            Repo::Memory(repo) => repo.ping().await,
            #[cfg(feature = "sqlite")]
            Repo::Sqlite(repo) => repo.ping().await,
        }
    }
}
