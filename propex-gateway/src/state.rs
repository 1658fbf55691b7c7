use propex_config::{GatewayConfig, GatewayRoute};

/// Immutable gateway wiring, assembled once at startup.
#[derive(Clone)]
pub struct GatewayState {
    pub client: reqwest::Client,
    pub jwt_secret: String,
    public_prefixes: Vec<String>,
    routes: Vec<GatewayRoute>,
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("public_prefixes", &self.public_prefixes)
            .field("routes", &self.routes)
            .finish()
    }
}

impl GatewayState {
    pub fn new(config: &GatewayConfig, jwt_secret: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            jwt_secret,
            public_prefixes: config.public_prefixes.clone(),
            routes: config.routes.clone(),
        }
    }

    /// Simple prefix match; any hit short-circuits.
    pub fn is_public(&self, path: &str) -> bool {
        self.public_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// First matching prefix in declaration order wins.
    pub fn resolve(&self, path: &str) -> Option<&GatewayRoute> {
        self.routes
            .iter()
            .find(|route| path.starts_with(route.prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GatewayState {
        let config = GatewayConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            public_prefixes: vec!["/api/auth/login".to_string(), "/api/listings".to_string()],
            routes: vec![
                GatewayRoute {
                    prefix: "/api/listings".to_string(),
                    backend: "http://listing:8081".to_string(),
                },
                GatewayRoute {
                    prefix: "/api".to_string(),
                    backend: "http://fallback:8089".to_string(),
                },
            ],
        };
        GatewayState::new(&config, "secret".to_string())
    }

    #[test]
    fn public_prefix_matching_is_prefix_based() {
        let state = state();
        assert!(state.is_public("/api/listings"));
        assert!(state.is_public("/api/listings/123"));
        assert!(!state.is_public("/api/wallets"));
    }

    #[test]
    fn first_matching_route_wins() {
        let state = state();
        assert_eq!(
            state.resolve("/api/listings/abc").unwrap().backend,
            "http://listing:8081"
        );
        assert_eq!(
            state.resolve("/api/wallets").unwrap().backend,
            "http://fallback:8089"
        );
        assert!(state.resolve("/metrics").is_none());
    }
}
