use std::sync::Arc;

use sea_orm::DatabaseConnection;

use clubhouse_auth_types::identity::SessionSecret;

use crate::config::IdentityConfig;
use crate::infra::db::{DbInviteLedger, DbMemberDirectory};
use crate::infra::ephemeral::EphemeralStores;
use crate::infra::sms::SmsNotifier;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub ephemeral: EphemeralStores,
    pub notifier: SmsNotifier,
    pub config: Arc<IdentityConfig>,
}

impl AppState {
    pub fn member_directory(&self) -> DbMemberDirectory {
        DbMemberDirectory {
            db: self.db.clone(),
        }
    }

    pub fn invite_ledger(&self) -> DbInviteLedger {
        DbInviteLedger {
            db: self.db.clone(),
        }
    }

    pub fn secure_cookies(&self) -> bool {
        self.config.production_mode
    }
}

impl SessionSecret for AppState {
    fn session_secret(&self) -> &str {
        &self.config.secret_salt
    }
}
