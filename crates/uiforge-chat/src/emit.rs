//! Writing generated artifacts to disk.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uiforge::turn::CodeArtifact;

/// Write each artifact to `dir/<file name>`, creating `dir` if needed.
///
/// Only the final path component of an artifact's filename is used, so a
/// reply cannot write outside `dir`. Artifacts without a usable file name
/// are skipped. Returns the paths written, in artifact order.
pub fn emit_artifacts(dir: &Path, artifacts: &[CodeArtifact]) -> Result<Vec<PathBuf>, String> {
    if artifacts.is_empty() {
        return Ok(Vec::new());
    }
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create output dir {}: {e}", dir.display()))?;

    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let Some(name) = Path::new(&artifact.filename).file_name() else {
            warn!("Skipping artifact with unusable filename '{}'", artifact.filename);
            continue;
        };
        let path = dir.join(name);
        let mut code = artifact.code.clone();
        code.push('\n');
        std::fs::write(&path, code)
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
        debug!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
