use std::path::PathBuf;

/// Returns the workspace root directory.
fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir).parent().unwrap().to_path_buf()
}

/// Returns the path to a shared test fixture under `test_resources/`.
pub fn test_resource_path(name: &str) -> PathBuf {
    workspace_root().join("test_resources").join(name)
}
