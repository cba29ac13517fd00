use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::server::*;
use crate::settings::Settings;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use std::time::Duration;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub identity_resolver: Arc<dyn IdentityResolver>,
    pub user_service: Arc<dyn UserService>,
    pub hint_service: Arc<dyn HintService>,
    pub login_limiter: Arc<dyn RateLimiter>,
    pub refresh_cookie: RefreshCookie,
    pub demo_guard: DemoGuard,
    pool: Option<Pool<MySql>>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        Self::try_new_with_clock(settings, Arc::new(SystemClock)).await
    }

    pub async fn try_new_with_clock(
        settings: &Settings,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        if settings.auth.secret.is_empty() {
            return Err(anyhow::anyhow!("auth.secret must not be empty"));
        }

        let store: Arc<dyn KvStore> = match settings.store.backend.as_str() {
            "memory" => Arc::new(MemoryKvStore::new(clock.clone())),
            "redis" => Arc::new(
                RedisKvStore::connect(&settings.store.redis_dsn, settings.store.op_timeout())
                    .await?,
            ),
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        let (directory, user_repo, hint_repo, login_log, pool): (
            Arc<dyn UserDirectory>,
            Arc<dyn UserRepo>,
            Arc<dyn HintRepo>,
            Arc<dyn LoginLogRepo>,
            Option<Pool<MySql>>,
        ) = match settings.directory.backend.as_str() {
            "memory" => {
                let users = Arc::new(MemoryUserDirectory::new());
                let directory: Arc<dyn UserDirectory> = users.clone();
                let user_repo: Arc<dyn UserRepo> = users;
                let hint_repo: Arc<dyn HintRepo> = Arc::new(MemoryHintRepo::new());
                let login_log: Arc<dyn LoginLogRepo> = Arc::new(MemoryLoginLogRepo::new());
                (directory, user_repo, hint_repo, login_log, None)
            }
            "mysql" => {
                let pool = MySqlPoolOptions::new()
                    .max_connections(settings.directory.max_connections)
                    .acquire_timeout(settings.directory.op_timeout())
                    .connect(&settings.directory.mysql_dsn)
                    .await?;
                let timeout = settings.directory.op_timeout();
                let users = Arc::new(MySqlUserDirectory::new(pool.clone(), timeout));
                let directory: Arc<dyn UserDirectory> = users.clone();
                let user_repo: Arc<dyn UserRepo> = users;
                let hint_repo: Arc<dyn HintRepo> =
                    Arc::new(MySqlHintRepo::new(pool.clone(), timeout));
                let login_log: Arc<dyn LoginLogRepo> =
                    Arc::new(MySqlLoginLogRepo::new(pool.clone(), timeout));
                (directory, user_repo, hint_repo, login_log, Some(pool))
            }
            other => return Err(anyhow::anyhow!("Unknown directory backend: {}", other)),
        };

        let auth = &settings.auth;
        let keys = KeyLayout {
            access_prefix: auth.access_prefix.clone(),
            refresh_prefix: auth.refresh_prefix.clone(),
            identity_prefix: auth.identity_prefix.clone(),
        };
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: auth.issuer.clone(),
            audience: auth.audience.clone(),
            signing_key: auth.secret.clone().into_bytes(),
            leeway_secs: auth.leeway_secs,
        }));
        let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);

        let token_service: Arc<dyn TokenService> = Arc::new(RealTokenService::new(
            store.clone(),
            token_codec.clone(),
            clock.clone(),
            TokenSettings {
                access_ttl: Duration::from_secs(auth.access_ttl_secs),
                refresh_ttl: Duration::from_secs(auth.refresh_ttl_secs),
                keys: keys.clone(),
            },
        ));
        let login_limiter: Arc<dyn RateLimiter> = Arc::new(FixedWindowRateLimiter::new(
            store.clone(),
            format!("{}:login", auth.rate_limit_prefix),
            auth.login_rate_limit,
            Duration::from_secs(auth.login_rate_window_secs),
        ));
        let identity_resolver: Arc<dyn IdentityResolver> = Arc::new(RealIdentityResolver::new(
            store,
            directory.clone(),
            token_codec,
            clock.clone(),
            keys,
            Duration::from_secs(auth.identity_ttl_secs),
        ));

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            directory.clone(),
            user_repo.clone(),
            credential_hasher.clone(),
            token_service.clone(),
            identity_resolver.clone(),
            login_log,
            clock.clone(),
        ));
        let user_service: Arc<dyn UserService> = Arc::new(RealUserService::new(
            directory,
            user_repo,
            credential_hasher,
            token_service,
            identity_resolver.clone(),
            clock,
        ));
        let hint_service: Arc<dyn HintService> = Arc::new(RealHintService::new(hint_repo));

        // an in-memory directory starts empty, so nobody could ever log in
        if settings.directory.backend == "memory" {
            let seed = &settings.seed;
            let admin = user_service
                .add(
                    Actor::System(&SystemActor::seeder()),
                    AddUserInput::super_admin(
                        seed.username.clone(),
                        seed.password.clone(),
                        seed.email.clone(),
                    ),
                )
                .await?;
            info!(username = %admin.username, "seeded in-memory super admin");
        }

        info!(
            store = %settings.store.backend,
            directory = %settings.directory.backend,
            "server started"
        );

        Ok(Self {
            auth_service,
            identity_resolver,
            user_service,
            hint_service,
            login_limiter,
            refresh_cookie: RefreshCookie {
                name: auth.refresh_cookie.clone(),
                max_age_secs: auth.refresh_ttl_secs,
            },
            demo_guard: DemoGuard::new(settings.demo.enabled, &settings.demo.exclude),
            pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
