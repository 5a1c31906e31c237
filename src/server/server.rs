use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::settings::Settings;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use std::time::Duration;

/// Everything a request handler needs, built once from settings.
pub struct Server {
    pub friending_service: Arc<dyn FriendingService>,
    pub identity: Arc<dyn IdentityResolver>,
    pub session_verifier: Arc<dyn SessionVerifier>,
    pub presenter: Arc<Presenter>,
    pub op_timeout: Duration,
    pool: Option<Pool<MySql>>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let (user_repo, request_repo, friendship_repo, pool): (
            Arc<dyn UserRepo>,
            Arc<dyn FriendRequestRepo>,
            Arc<dyn FriendshipRepo>,
            Option<Pool<MySql>>,
        ) = match settings.storage.backend.as_str() {
            "memory" => (
                Arc::new(MemoryUserRepo::new()),
                Arc::new(MemoryFriendRequestRepo::new()),
                Arc::new(MemoryFriendshipRepo::new()),
                None,
            ),
            "mysql" => {
                let dsn = settings
                    .storage
                    .mysql_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("storage.mysql_dsn is required for mysql"))?;
                let pool = MySqlPoolOptions::new()
                    .max_connections(settings.storage.max_connections)
                    .connect(dsn)
                    .await?;
                (
                    Arc::new(MySqlUserRepo::new(pool.clone())),
                    Arc::new(MySqlFriendRequestRepo::new(pool.clone())),
                    Arc::new(MySqlFriendshipRepo::new(pool.clone())),
                    Some(pool),
                )
            }
            other => return Err(anyhow::anyhow!("Unknown storage backend: {}", other)),
        };

        let directory = Arc::new(DirectoryIdentityResolver::new(user_repo));
        for username in &settings.identity.seed_users {
            let user_id = directory.register(username).await?;
            debug!(%user_id, %username, "seeded user");
        }
        let identity: Arc<dyn IdentityResolver> = directory;

        let friending_service: Arc<dyn FriendingService> = Arc::new(RealFriendingService::new(
            request_repo,
            friendship_repo,
            identity.clone(),
        ));
        let session_verifier: Arc<dyn SessionVerifier> =
            Arc::new(FakeSessionVerifier::new(identity.clone()));
        let presenter = Arc::new(Presenter::new(identity.clone()));

        info!(backend = %settings.storage.backend, "server started");

        Ok(Self {
            friending_service,
            identity,
            session_verifier,
            presenter,
            op_timeout: settings.friending.op_timeout(),
            pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
            info!("mysql pool closed");
        }
    }
}
