//! Configuration loading tests

#[cfg(test)]
mod tests {
    use std::io::Write;

    use marketplace_rbac::config::Config;
    use marketplace_rbac::utils::error::RbacError;
    use tempfile::NamedTempFile;

    use crate::{assert_err, assert_ok};

    fn yaml_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_partial_file_keeps_defaults() {
        let file = yaml_file(
            r#"
client:
  base_url: "https://rbac.marketplace.test/api"
  timeout_secs: 5
engine:
  max_hierarchy_depth: 3
"#,
        );

        let config = assert_ok!(Config::from_file(file.path()).await);
        assert_eq!(config.client.base_url, "https://rbac.marketplace.test/api");
        assert_eq!(config.client.timeout_secs, 5);
        assert_eq!(config.client.default_page_size, 20);
        assert_eq!(config.engine.max_hierarchy_depth, 3);
        assert_eq!(config.engine.sweep_interval_secs, 60);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[tokio::test]
    async fn test_invalid_values_are_rejected() {
        let cases = [
            "client:\n  base_url: \"not a url\"\n",
            "client:\n  timeout_secs: 0\n",
            "engine:\n  max_hierarchy_depth: 0\n",
            "engine:\n  default_page_size: 500\n  max_page_size: 100\n",
            "client: [1, 2\n",
        ];
        for content in cases {
            let file = yaml_file(content);
            let err = assert_err!(Config::from_file(file.path()).await);
            assert!(matches!(err, RbacError::Config(_)), "{} gave {:?}", content, err);
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = assert_err!(Config::from_file(dir.path().join("absent.yaml")).await);
        assert!(matches!(err, RbacError::Config(_)));
    }

    #[tokio::test]
    async fn test_yaml_round_trip() {
        let mut config = Config::default();
        config.engine.max_page_size = 250;
        config.logging.json = true;

        let file = yaml_file(&assert_ok!(config.to_yaml()));
        let loaded = assert_ok!(Config::from_file(file.path()).await);
        assert_eq!(loaded.engine.max_page_size, 250);
        assert!(loaded.logging.json);
    }
}
