#[cfg(test)]
mod tests {
    use crate::config::{
        ConfigBuilder, ConfigError, ConfigLoader, LogFormat, LogLevel, RelgraphConfig,
        StorageEngine, validation,
    };
    use figment::providers::Serialized;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = RelgraphConfig::default();
        assert_eq!(config.storage.engine, StorageEngine::Memory);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.search.default_per_page, 10);
        assert_eq!(config.search.max_per_page, 100);
        assert!(!config.auth.enabled);
        assert!(validation::validate_config(&config).is_ok());
    }

    #[test]
    fn test_predefined_configs() {
        let dev = ConfigBuilder::development().build().unwrap();
        assert_eq!(dev.logging.level, LogLevel::Debug);
        assert_eq!(dev.logging.format, LogFormat::Pretty);

        let test = ConfigBuilder::testing().build().unwrap();
        assert_eq!(test.logging.level, LogLevel::Warn);
        assert!(!test.logging.stdout);

        let defaults = ConfigBuilder::defaults().build().unwrap();
        assert_eq!(defaults.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_production_requires_secret() {
        let err = ConfigBuilder::production().build().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));

        let prod = ConfigBuilder::production()
            .with_auth_secret("s3cret")
            .build()
            .unwrap();
        assert!(prod.auth.enabled);
        assert_eq!(prod.auth.secret, "s3cret");
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::Warn.to_string().parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_token_leeway() {
        let config = ConfigBuilder::new()
            .with_auth_secret("s")
            .with_token_leeway(5)
            .build()
            .unwrap();
        assert_eq!(config.auth.leeway_secs, 5);
    }

    #[test]
    fn test_page_size_validation() {
        assert!(ConfigBuilder::new().with_page_size(0, 10).build().is_err());
        assert!(ConfigBuilder::new().with_page_size(20, 10).build().is_err());
        let config = ConfigBuilder::new().with_page_size(5, 50).build().unwrap();
        assert_eq!(config.search.default_per_page, 5);
    }

    #[test]
    fn test_secret_not_in_debug_output() {
        let config = ConfigBuilder::new().with_auth_secret("hunter2").build().unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[logging]\nlevel = \"debug\"\n\n[auth]\nenabled = true\nsecret = \"from-file\"\n\n[search]\ndefault_per_page = 25"
        )
        .unwrap();

        let config = ConfigLoader::new().load_file(file.path()).unwrap().extract().unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.auth.secret, "from-file");
        assert_eq!(config.search.default_per_page, 25);
        assert_eq!(config.search.max_per_page, 100);
    }

    #[test]
    fn test_load_json_file_failing_validation() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"auth": {{"enabled": true}}}}"#).unwrap();

        let err = ConfigLoader::new().load_file(file.path()).unwrap().extract().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_load_file_errors() {
        let mut loader = ConfigLoader::new();
        assert!(matches!(
            loader.load_file("/definitely/not/here.toml"),
            Err(ConfigError::FileLoadError(_))
        ));

        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(matches!(
            loader.load_file(file.path()),
            Err(ConfigError::FileLoadError(_))
        ));
    }

    #[test]
    fn test_merge_custom_provider_overrides() {
        let override_config = ConfigBuilder::new().with_log_level(LogLevel::Error).build().unwrap();
        let config = ConfigLoader::new()
            .merge(Serialized::defaults(override_config))
            .extract()
            .unwrap();
        assert_eq!(config.logging.level, LogLevel::Error);
    }

    #[test]
    fn test_config_serialization() {
        let config = ConfigBuilder::development().build().unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: RelgraphConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.logging.level, deserialized.logging.level);
        assert_eq!(config.storage.engine, deserialized.storage.engine);
    }
}
