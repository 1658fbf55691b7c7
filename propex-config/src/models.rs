use crate::loader::DEFAULT_JWT_SECRET;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub amqp: AmqpConfig,
    pub auth: AuthConfig,
    pub gateway: GatewayConfig,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct AmqpConfig {
    pub url: String,
    /// Topic exchange the listing domain publishes on.
    pub exchange: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared symmetric secret. The server signs with it, the gateway
    /// verifies with it; the two deployments must carry the same value.
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub reset_token_ttl_secs: u64,
}

impl AuthConfig {
    pub fn is_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

/// One entry of the gateway's ordered route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRoute {
    pub prefix: String,
    pub backend: String,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Path prefixes that bypass authentication entirely.
    pub public_prefixes: Vec<String>,
    /// Ordered prefix -> backend table; the first matching prefix wins.
    pub routes: Vec<GatewayRoute>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub env_file_loaded: bool,
}
