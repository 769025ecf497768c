pub mod config {
    use serde::Deserialize;

    #[derive(Deserialize, Debug, Clone)]
    pub struct Config {
        #[serde(default = "default_db_url")]
        pub db_url: String,
        #[serde(default = "default_db_name")]
        pub db_name: String,
        #[serde(default = "default_collection")]
        pub collection: String,
        #[serde(default = "default_port")]
        pub port: u16,
        /// Seconds in-flight requests get to finish once shutdown is requested.
        #[serde(default = "default_shutdown_grace_secs")]
        pub shutdown_grace_secs: u64,
        #[serde(default = "default_request_timeout_secs")]
        pub request_timeout_secs: u64,
    }

    impl Config {
        /// Loads configuration from environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            let settings = config::Config::builder()
                .add_source(config::Environment::default().try_parsing(true))
                .build()?;

            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }
    }

    impl Default for Config {
        fn default() -> Self {
            Self {
                db_url: default_db_url(),
                db_name: default_db_name(),
                collection: default_collection(),
                port: default_port(),
                shutdown_grace_secs: default_shutdown_grace_secs(),
                request_timeout_secs: default_request_timeout_secs(),
            }
        }
    }

    fn default_db_url() -> String {
        "mongodb://localhost:27017".to_string()
    }

    fn default_db_name() -> String {
        "demo_todo".to_string()
    }

    fn default_collection() -> String {
        "todo".to_string()
    }

    fn default_port() -> u16 {
        9000
    }

    fn default_shutdown_grace_secs() -> u64 {
        5
    }

    fn default_request_timeout_secs() -> u64 {
        60
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn can_fall_back_to_defaults_when_nothing_is_set() {
            let settings = config::Config::builder().build().unwrap();

            let config: Config = settings.try_deserialize().unwrap();

            assert_eq!(config.db_url, "mongodb://localhost:27017");
            assert_eq!(config.db_name, "demo_todo");
            assert_eq!(config.collection, "todo");
            assert_eq!(config.port, 9000);
            assert_eq!(config.shutdown_grace_secs, 5);
            assert_eq!(config.request_timeout_secs, 60);
        }

        #[test]
        fn can_override_individual_values() {
            let settings = config::Config::builder()
                .set_override("db_url", "mongodb://db.internal:27018")
                .unwrap()
                .set_override("port", 8081_i64)
                .unwrap()
                .build()
                .unwrap();

            let config: Config = settings.try_deserialize().unwrap();

            assert_eq!(config.db_url, "mongodb://db.internal:27018");
            assert_eq!(config.port, 8081);
            assert_eq!(config.db_name, "demo_todo");
        }

        #[test]
        fn rejects_non_numeric_port() {
            let settings = config::Config::builder()
                .set_override("port", "not-a-port")
                .unwrap()
                .build()
                .unwrap();

            let result = settings.try_deserialize::<Config>();

            assert!(result.is_err());
        }
    }
}

pub mod todo;
pub mod web;
