use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Directory name for a clone of `url`: the URL with every character
/// outside `[A-Za-z0-9]` removed. Deterministic so a repeat request for the
/// same URL reuses the same slot.
pub fn clone_dir_name(url: &str) -> String {
    url.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Clones `url` into `<work_dir>/<clone_dir_name(url)>` via the git CLI and
/// returns the clone path. A failed clone is returned as an error, not
/// swallowed.
pub async fn clone_repo(work_dir: &Path, url: &str) -> Result<PathBuf, String> {
    let target = work_dir.join(clone_dir_name(url));
    tracing::info!("Cloning {} into {}", url, target.display());

    let output = Command::new("git")
        .arg("clone")
        .arg(url)
        .arg(&target)
        .current_dir(work_dir)
        .output()
        .await
        .map_err(|e| format!("Failed to run git clone: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("git clone of {url} failed: {stderr}"));
    }

    tracing::info!("Clone complete: {}", target.display());
    Ok(target)
}

/// Forcibly removes a clone directory. Runs after analysis whether it
/// succeeded or not, so a failed report pass cannot leak the checkout.
pub async fn remove_clone(target: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(target).await {
        tracing::warn!("Failed to remove clone {}: {e}", target.display());
    }
}
