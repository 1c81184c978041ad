use spamguard::{ArtifactError, ArtifactInfo, ArtifactManager, ClassifierConfig};
use std::fs;

#[tokio::test]
async fn test_artifact_paths() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let manager = ArtifactManager::new(dir.path())?;
    let vectorizer_path = manager.get_vectorizer_path("default");
    let model_path = manager.get_model_path("default");

    assert!(vectorizer_path.ends_with("default/vectorizer.json"));
    assert!(model_path.ends_with("default/model.json"));
    Ok(())
}

#[tokio::test]
async fn test_config_and_manager_agree_on_layout() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let manager = ArtifactManager::new(dir.path())?;
    let config = ClassifierConfig {
        artifacts_dir: Some(dir.path().to_path_buf()),
        artifact_name: "v3".into(),
        ..Default::default()
    };

    assert_eq!(config.vectorizer_path(), manager.get_vectorizer_path("v3"));
    assert_eq!(config.model_path(), manager.get_model_path("v3"));
    Ok(())
}

#[tokio::test]
async fn test_verification_against_hashes() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let manager = ArtifactManager::new(dir.path())?;
    let info = ArtifactInfo::new("hashed");

    assert!(!manager.verify_artifacts(&info)?);

    fs::create_dir_all(dir.path().join("hashed"))?;
    fs::write(manager.get_vectorizer_path("hashed"), b"vectorizer")?;
    fs::write(manager.get_model_path("hashed"), b"model")?;

    let info = info.with_hashes(
        Some(ArtifactManager::sha256_hex(b"vectorizer")),
        Some(ArtifactManager::sha256_hex(b"model")),
    );
    assert!(manager.verify_artifacts(&info)?);

    fs::write(manager.get_vectorizer_path("hashed"), b"tampered")?;
    assert!(!manager.verify_artifacts(&info)?);
    Ok(())
}

#[tokio::test]
async fn test_missing_set_without_source() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let manager = ArtifactManager::new(dir.path())?;

    let result = manager.ensure_downloaded(&ArtifactInfo::new("absent")).await;
    assert!(matches!(result, Err(ArtifactError::MissingSource(_))));
    assert!(!manager.is_downloaded("absent"));
    Ok(())
}

#[test]
fn test_sha256_hex() {
    assert_eq!(
        ArtifactManager::sha256_hex(b""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}
