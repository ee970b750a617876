mod support;

use abcd_analysis::db::repository::DateRepository;
use abcd_analysis::db::{RepositoryConfig, RepositoryFactory, RepositoryType};

use support::with_scoped_env;

#[test]
fn test_repository_type_from_env_defaults_to_local() {
    with_scoped_env(&[("REPOSITORY_TYPE", None)], || {
        assert_eq!(RepositoryType::from_env().unwrap(), RepositoryType::Local);
    });
}

#[test]
fn test_repository_type_from_env_rejects_unknown() {
    with_scoped_env(&[("REPOSITORY_TYPE", Some("postgres"))], || {
        assert!(RepositoryType::from_env().is_err());
        assert!(RepositoryFactory::from_env().is_err());
    });
}

#[test]
fn test_env_overrides_config_file_type() {
    with_scoped_env(&[("REPOSITORY_TYPE", Some("bogus"))], || {
        assert!(RepositoryFactory::from_config(&RepositoryConfig::default()).is_err());
    });
}

#[test]
fn test_load_uses_explicit_config_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analysis.toml");
    std::fs::write(
        &path,
        "[repository]\ntype = \"local\"\n\n[analysis]\ndefault_hour_count = 6\n",
    )
    .unwrap();
    let path_str = path.to_string_lossy().to_string();

    with_scoped_env(&[("ANALYSIS_CONFIG", Some(path_str.as_str()))], || {
        let config = RepositoryConfig::load().unwrap();
        assert_eq!(config.analysis.default_hour_count, 6);
        assert_eq!(config.analysis.batch_chunk_size, 5);
    });
}

#[test]
fn test_load_with_missing_explicit_path_fails() {
    with_scoped_env(
        &[("ANALYSIS_CONFIG", Some("/nonexistent/analysis.toml"))],
        || {
            assert!(RepositoryConfig::load().is_err());
        },
    );
}

#[tokio::test]
async fn test_factory_creates_healthy_local_repository() {
    let repo = RepositoryFactory::create(RepositoryType::Local);
    assert!(repo.health_check().await.unwrap());
}
