//! container-diff integration
//!
//! Wraps container-diff (https://github.com/GoogleContainerTools/container-diff)
//! as a best-effort auxiliary stage: the remote source image is compared
//! against the locally retagged destination image and the file-level report
//! is written next to the run. A missing binary disables the stage
//! entirely; a failing invocation is reported but never fails the run.

use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::error::Result;
use crate::logging::Logger;
use crate::pipeline::StageMode;
use crate::reference::Reference;

pub const DIFF_TOOL: &str = "container-diff";

/// Locate the diff tool on the search path.
pub fn find_tool() -> Option<PathBuf> {
    which::which(DIFF_TOOL).ok()
}

pub struct DiffRunner {
    tool: Option<PathBuf>,
    report_dir: PathBuf,
    output: Logger,
}

impl DiffRunner {
    pub fn new(tool: Option<PathBuf>, report_dir: impl Into<PathBuf>, output: Logger) -> Self {
        Self {
            tool,
            report_dir: report_dir.into(),
            output,
        }
    }

    /// The report file for one (image-set, image, destination-tag) triple.
    /// The same triple always maps to the same file, which is overwritten
    /// on each run.
    pub fn report_path(&self, set_name: &str, image: &str, destination_tag: &str) -> PathBuf {
        self.report_dir.join(format!(
            "{}_{}_{}_{}.txt",
            DIFF_TOOL,
            sanitize(set_name),
            sanitize(image),
            sanitize(destination_tag)
        ))
    }

    /// Diff the remote source reference against the locally tagged
    /// destination reference and write the report file.
    pub async fn run(
        &self,
        set_name: &str,
        image: &str,
        source: &Reference,
        destination: &Reference,
        mode: StageMode,
    ) -> Result<()> {
        let Some(tool) = &self.tool else {
            // Diffing is auxiliary: no tool, no stage.
            return Ok(());
        };

        let remote = format!("remote://{}", source);
        let daemon = format!("daemon://{}", destination);
        self.output.step(&format!(
            "{} diff {} {} --type=file",
            tool.display(),
            remote,
            daemon
        ));
        if !mode.should_execute() {
            return Ok(());
        }

        let invocation = Command::new(tool)
            .arg("diff")
            .arg(&remote)
            .arg(&daemon)
            .arg("--type=file")
            .output()
            .await;
        let captured = match invocation {
            Ok(captured) if captured.status.success() => captured,
            Ok(captured) => {
                self.output.warning(&format!(
                    "{} exited with {}: {}",
                    DIFF_TOOL,
                    captured.status,
                    String::from_utf8_lossy(&captured.stderr).trim()
                ));
                return Ok(());
            }
            Err(e) => {
                self.output
                    .warning(&format!("{} could not be run: {}", DIFF_TOOL, e));
                return Ok(());
            }
        };

        let path = self.report_path(set_name, image, &destination.tag);
        tokio::fs::write(&path, &captured.stdout).await?;
        self.output
            .detail(&format!("diff report written to {}", path.display()));
        Ok(())
    }
}

fn sanitize(part: &str) -> String {
    part.replace('/', "_").replace(':', "_").replace('@', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::StageMode;

    fn runner(tool: Option<PathBuf>, dir: &Path) -> DiffRunner {
        DiffRunner::new(tool, dir, Logger::new_quiet())
    }

    #[test]
    fn test_report_path_is_deterministic() {
        let diff = runner(None, Path::new("/tmp/reports"));
        let path = diff.report_path("demo", "api", "v2");
        assert_eq!(
            path,
            Path::new("/tmp/reports/container-diff_demo_api_v2.txt")
        );
        assert_eq!(path, diff.report_path("demo", "api", "v2"));
    }

    #[test]
    fn test_report_path_sanitizes_components() {
        let diff = runner(None, Path::new("."));
        let path = diff.report_path("demo", "team/api", "v2");
        assert_eq!(path, Path::new("./container-diff_demo_team_api_v2.txt"));
    }

    #[tokio::test]
    async fn test_missing_tool_is_a_silent_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let diff = runner(None, dir.path());
        let source = Reference::new("", "team", "api", "v1");
        let destination = Reference::new("registry.example.com", "team", "api", "v2");
        let mode = StageMode {
            dry_run: false,
            force_execute: false,
        };

        diff.run("demo", "api", &source, &destination, mode)
            .await
            .unwrap();

        // No report file appears when the tool is absent.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
