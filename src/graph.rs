//! Graph-layout collaborator used by the Mapping renderer.
//!
//! The renderer builds a DOT description of each mind-map segment and asks a
//! [`GraphLayout`] for rasterised PNG bytes. Keeping the bytes in memory —
//! rather than round-tripping through a temporary file — means a failed run
//! leaves no artifacts behind and two concurrent runs cannot race on a shared
//! output path.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

/// Failure reported by a graph-layout collaborator.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct GraphLayoutError(pub String);

/// Lays out a DOT graph description as a raster image.
pub trait GraphLayout: Send + Sync {
    /// Render `dot_source` to PNG bytes.
    fn layout(&self, dot_source: &str) -> Result<Vec<u8>, GraphLayoutError>;
}

/// A [`GraphLayout`] backed by the Graphviz `dot` binary.
///
/// DOT is piped through stdin and the PNG is read from stdout, so no file is
/// ever written. Requires Graphviz on `PATH` (or an explicit binary path).
pub struct GraphvizLayout {
    dot_binary: PathBuf,
}

impl GraphvizLayout {
    pub fn new() -> Self {
        Self {
            dot_binary: PathBuf::from("dot"),
        }
    }

    /// Use an explicit `dot` binary instead of resolving from `PATH`.
    pub fn with_binary(dot_binary: impl Into<PathBuf>) -> Self {
        Self {
            dot_binary: dot_binary.into(),
        }
    }
}

impl Default for GraphvizLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphLayout for GraphvizLayout {
    fn layout(&self, dot_source: &str) -> Result<Vec<u8>, GraphLayoutError> {
        debug!("laying out {} chars of DOT", dot_source.len());

        let mut child = Command::new(&self.dot_binary)
            .arg("-Tpng")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                GraphLayoutError(format!(
                    "failed to run '{}': {e}\nInstall Graphviz or set an explicit binary path.",
                    self.dot_binary.display()
                ))
            })?;

        child
            .stdin
            .take()
            .ok_or_else(|| GraphLayoutError("dot stdin unavailable".into()))?
            .write_all(dot_source.as_bytes())
            .map_err(|e| GraphLayoutError(format!("failed to write DOT to dot: {e}")))?;

        let output = child
            .wait_with_output()
            .map_err(|e| GraphLayoutError(format!("dot did not exit cleanly: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GraphLayoutError(format!(
                "dot exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        if output.stdout.is_empty() {
            return Err(GraphLayoutError("dot produced no image data".into()));
        }

        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_reports_install_hint() {
        let layout = GraphvizLayout::with_binary("/definitely/not/a/real/dot");
        let err = layout.layout("digraph g { a -> b; }").unwrap_err();
        assert!(err.to_string().contains("Graphviz"), "got: {err}");
    }
}
