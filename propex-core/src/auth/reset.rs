use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::{debug, info};
use uuid::Uuid;

use propex_model::UserId;

use crate::Result;

/// Password-reset tokens, externalized to redis with a TTL.
///
/// A process-local map would not survive restarts and could not be shared
/// across instances; every instance of the auth surface must see a token
/// issued by any other, and expiry must hold without a sweeper.
#[derive(Clone)]
pub struct ResetTokenStore {
    conn: ConnectionManager,
    ttl_secs: u64,
}

impl std::fmt::Debug for ResetTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetTokenStore")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl ResetTokenStore {
    pub async fn connect(redis_url: &str, ttl_secs: u64) -> Result<Self> {
        info!(url = %redis_url, "connecting to reset-token store");
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn, ttl_secs })
    }

    /// Issues a fresh opaque token bound to the user for the configured TTL.
    pub async fn issue(&self, user_id: UserId) -> Result<String> {
        let token = Uuid::new_v4().simple().to_string();
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::key(&token), user_id.to_string(), self.ttl_secs)
            .await?;
        debug!(user = %user_id, "password reset token issued");
        Ok(token)
    }

    /// Resolves and consumes a token in one step. A token resolves at most
    /// once; unknown and expired tokens both come back as `None`.
    pub async fn consume(&self, token: &str) -> Result<Option<UserId>> {
        let mut conn = self.conn.clone();
        let stored: Option<String> = conn.get_del(Self::key(token)).await?;
        Ok(stored
            .and_then(|value| value.parse::<Uuid>().ok())
            .map(UserId))
    }

    fn key(token: &str) -> String {
        format!("reset:{token}")
    }
}
