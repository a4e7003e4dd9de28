//! Configuration for Products API

use core_config::{app_info, env_or_default, env_parse, server::ServerConfig, AppInfo, FromEnv};
use database::mongodb::MongoConfig;
use domain_products::StatusMode;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub products: ProductsConfig,
}

/// Settings for the product resource and its realtime feed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductsConfig {
    pub collection: String,
    pub status_mode: StatusMode,
    pub broadcast_capacity: usize,
}

impl Default for ProductsConfig {
    fn default() -> Self {
        Self {
            collection: domain_products::mongodb::DEFAULT_COLLECTION.to_string(),
            status_mode: StatusMode::default(),
            broadcast_capacity: domain_products::realtime::DEFAULT_CAPACITY,
        }
    }
}

impl FromEnv for ProductsConfig {
    fn from_env() -> Result<Self, core_config::ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            collection: env_or_default("PRODUCTS_COLLECTION", &defaults.collection),
            status_mode: env_parse("PRODUCTS_STATUS_MODE", defaults.status_mode)?,
            broadcast_capacity: env_parse("PRODUCTS_BROADCAST_CAPACITY", defaults.broadcast_capacity)?
                .max(1),
        })
    }
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            mongodb: MongoConfig::from_env()?.with_app_name(env!("CARGO_PKG_NAME")),
            server: ServerConfig::from_env()?,
            environment: Environment::from_env(),
            products: ProductsConfig::from_env()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONGO_VARS: [(&str, Option<&str>); 2] = [
        ("MONGODB_URL", Some("mongodb://localhost:27017")),
        ("MONGODB_DATABASE", Some("shop")),
    ];

    #[test]
    fn test_products_defaults() {
        temp_env::with_vars_unset(
            [
                "PRODUCTS_COLLECTION",
                "PRODUCTS_STATUS_MODE",
                "PRODUCTS_BROADCAST_CAPACITY",
            ],
            || {
                let config = ProductsConfig::from_env().unwrap();
                assert_eq!(config.collection, "products");
                assert_eq!(config.status_mode, StatusMode::Legacy);
                assert_eq!(config.broadcast_capacity, 64);
            },
        );
    }

    #[test]
    fn test_products_overrides() {
        temp_env::with_vars(
            [
                ("PRODUCTS_COLLECTION", Some("catalogue")),
                ("PRODUCTS_STATUS_MODE", Some("conventional")),
                ("PRODUCTS_BROADCAST_CAPACITY", Some("0")),
            ],
            || {
                let config = ProductsConfig::from_env().unwrap();
                assert_eq!(config.collection, "catalogue");
                assert_eq!(config.status_mode, StatusMode::Conventional);
                assert_eq!(config.broadcast_capacity, 1);
            },
        );
    }

    #[test]
    fn test_unknown_status_mode_is_rejected() {
        temp_env::with_var("PRODUCTS_STATUS_MODE", Some("strict"), || {
            assert!(ProductsConfig::from_env().is_err());
        });
    }

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(MONGO_VARS, || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.app.name, "products_api");
            assert_eq!(config.mongodb.database, "shop");
            assert_eq!(config.mongodb.app_name.as_deref(), Some("products_api"));
        });
    }

    #[test]
    fn test_config_requires_mongodb_url() {
        temp_env::with_vars_unset(["MONGODB_URL", "MONGO_URL"], || {
            assert!(Config::from_env().is_err());
        });
    }
}
