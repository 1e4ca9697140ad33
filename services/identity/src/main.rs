use std::sync::Arc;

use sea_orm::Database;
use tracing::{info, warn};

use clubhouse_core::tracing::init_tracing;
use clubhouse_domain::clock::SystemClock;
use clubhouse_identity::config::IdentityConfig;
use clubhouse_identity::infra::cache::RedisStores;
use clubhouse_identity::infra::ephemeral::EphemeralStores;
use clubhouse_identity::infra::memory::MemoryStores;
use clubhouse_identity::infra::sms::SmsNotifier;
use clubhouse_identity::router::build_router;
use clubhouse_identity::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = IdentityConfig::from_env();
    if config.uses_default_secret() {
        if config.production_mode {
            warn!("SECRET_SALT is the default value in production; sessions can be forged");
        } else {
            warn!("SECRET_SALT not set, using the development default");
        }
    }

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let ephemeral = match &config.redis_url {
        Some(url) => {
            let pool = deadpool_redis::Config::from_url(url)
                .create_pool(Some(deadpool_redis::Runtime::Tokio1))
                .expect("failed to create Redis pool");
            EphemeralStores::Redis(RedisStores {
                pool,
                secret: config.secret_salt.clone(),
            })
        }
        None => {
            info!("REDIS_URL not set, keeping login codes in memory; run a single instance only");
            EphemeralStores::Memory(MemoryStores::new(
                &config.secret_salt,
                Arc::new(SystemClock),
            ))
        }
    };

    let notifier = SmsNotifier::new(config.textbelt_key.clone());
    if !notifier.is_live() {
        info!("TEXTBELT_KEY not set, SMS will be logged instead of sent");
    }

    let addr = format!("0.0.0.0:{}", config.identity_port);
    let state = AppState {
        db,
        ephemeral,
        notifier,
        config: Arc::new(config),
    };

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("identity service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
