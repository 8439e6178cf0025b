use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub graphql: GraphqlConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphqlConfig {
    pub enable_playground: bool,
    pub enable_introspection: bool,
    pub apq_cache_size: usize,
    pub max_depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

/// Where the identity middleware reads the caller's role from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentitySource {
    /// Raw role header, trusted as sent
    Header,
    /// HS256 bearer token carrying `sub` and `role` claims
    Bearer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub identity_source: IdentitySource,
    pub role_header: String,
    pub user_id_header: String,
    pub anonymous_principal_id: String,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("BIND_ADDRESS") {
            self.server.bind = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
                self.database.backend = StorageBackend::Postgres;
            }
        }
        if let Ok(v) = env::var("DATABASE_BACKEND") {
            match v.to_ascii_lowercase().as_str() {
                "memory" => self.database.backend = StorageBackend::Memory,
                "postgres" | "postgresql" => self.database.backend = StorageBackend::Postgres,
                other => tracing::warn!("Ignoring unknown DATABASE_BACKEND '{}'", other),
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // GraphQL overrides
        if let Ok(v) = env::var("GRAPHQL_ENABLE_PLAYGROUND") {
            self.graphql.enable_playground = v.parse().unwrap_or(self.graphql.enable_playground);
        }
        if let Ok(v) = env::var("GRAPHQL_ENABLE_INTROSPECTION") {
            self.graphql.enable_introspection = v.parse().unwrap_or(self.graphql.enable_introspection);
        }
        if let Ok(v) = env::var("GRAPHQL_APQ_CACHE_SIZE") {
            self.graphql.apq_cache_size = v.parse().unwrap_or(self.graphql.apq_cache_size);
        }
        if let Ok(v) = env::var("GRAPHQL_MAX_DEPTH") {
            self.graphql.max_depth = v.parse().unwrap_or(self.graphql.max_depth);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SECURITY_IDENTITY_SOURCE") {
            match v.to_ascii_lowercase().as_str() {
                "header" => self.security.identity_source = IdentitySource::Header,
                "bearer" | "jwt" => self.security.identity_source = IdentitySource::Bearer,
                other => tracing::warn!("Ignoring unknown SECURITY_IDENTITY_SOURCE '{}'", other),
            }
        }
        if let Ok(v) = env::var("SECURITY_ROLE_HEADER") {
            self.security.role_header = v;
        }
        if let Ok(v) = env::var("SECURITY_USER_ID_HEADER") {
            self.security.user_id_header = v;
        }
        if let Ok(v) = env::var("SECURITY_ANONYMOUS_PRINCIPAL_ID") {
            self.security.anonymous_principal_id = v;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                backend: StorageBackend::Memory,
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            graphql: GraphqlConfig {
                enable_playground: true,
                enable_introspection: true,
                apq_cache_size: 100,
                max_depth: 16,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                identity_source: IdentitySource::Header,
                role_header: "X-User-Role".to_string(),
                user_id_header: "X-User-Id".to_string(),
                anonymous_principal_id: "anonymous".to_string(),
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            graphql: GraphqlConfig {
                enable_playground: true,
                enable_introspection: true,
                apq_cache_size: 100,
                max_depth: 12,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                identity_source: IdentitySource::Header,
                role_header: "X-User-Role".to_string(),
                user_id_header: "X-User-Id".to_string(),
                anonymous_principal_id: "anonymous".to_string(),
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            graphql: GraphqlConfig {
                enable_playground: false,
                enable_introspection: false,
                apq_cache_size: 1000,
                max_depth: 10,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                identity_source: IdentitySource::Header,
                role_header: "X-User-Role".to_string(),
                user_id_header: "X-User-Id".to_string(),
                anonymous_principal_id: "anonymous".to_string(),
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
            },
        }
    }
}

// Global singleton config - initialized once at startup by the binaries.
// Library code receives the parts it needs as arguments.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.database.backend, StorageBackend::Memory);
        assert!(config.graphql.enable_playground);
        assert_eq!(config.security.identity_source, IdentitySource::Header);
        assert_eq!(config.security.role_header, "X-User-Role");
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.database.backend, StorageBackend::Postgres);
        assert!(!config.graphql.enable_introspection);
        assert!(!config.graphql.enable_playground);
        assert!(!config.database.run_migrations);
    }

    #[test]
    fn jwt_secret_is_never_serialized() {
        let mut config = AppConfig::development();
        config.security.jwt_secret = "s3cret".to_string();
        let rendered = serde_json::to_string(&config).unwrap();
        assert!(!rendered.contains("s3cret"));
    }
}
