//! Base image build context
//!
//! Renders a Dockerfile for an IDE type into a temporary build context,
//! with the downloaded IDE artifact copied alongside so the build can
//! ADD it without network access.

use crate::{CoreError, Result};
use idebox_config::{ConfigError, IdeTypeConfig};
use std::path::{Path, PathBuf};

/// Web (noVNC) port served inside the container
pub const CONTAINER_WEB_PORT: u16 = 80;
/// VNC port served inside the container
pub const CONTAINER_VNC_PORT: u16 = 5900;

/// Validate that an image name is safe to embed in a Dockerfile FROM instruction.
///
/// Rejects empty names and names containing whitespace or control characters
/// which could inject arbitrary Dockerfile instructions.
fn validate_image_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CoreError::Config(ConfigError::Invalid(
            "Base image name cannot be empty".into(),
        )));
    }
    if name.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(CoreError::Config(ConfigError::Invalid(format!(
            "Base image name contains invalid characters: {:?}",
            name
        ))));
    }
    Ok(())
}

/// Temporary build context holding a rendered Dockerfile and the IDE artifact
pub struct BuildContext {
    temp_dir: tempfile::TempDir,
    dockerfile_path: PathBuf,
}

impl BuildContext {
    /// Prepare a build context for an IDE type.
    ///
    /// `artifact_path` is the downloaded IDE archive; it is copied into the
    /// context so the Dockerfile can reference it by file name.
    pub fn prepare(ide: &IdeTypeConfig, artifact_path: &Path) -> Result<Self> {
        validate_image_name(&ide.base_image)?;

        let temp_dir = tempfile::tempdir()?;

        let artifact_name = artifact_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                CoreError::Config(ConfigError::Invalid(format!(
                    "Artifact path has no file name: {}",
                    artifact_path.display()
                )))
            })?;
        std::fs::copy(artifact_path, temp_dir.path().join(artifact_name))?;

        let dockerfile_path = temp_dir.path().join("Dockerfile");
        let content = render_dockerfile(ide, artifact_name);
        std::fs::write(&dockerfile_path, content)?;

        Ok(Self {
            temp_dir,
            dockerfile_path,
        })
    }

    /// Path to the build context directory
    pub fn context_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of the rendered Dockerfile
    pub fn dockerfile_path(&self) -> &Path {
        &self.dockerfile_path
    }
}

fn render_dockerfile(ide: &IdeTypeConfig, artifact_name: &str) -> String {
    let install = ide
        .install_command
        .as_deref()
        .map(|cmd| format!("RUN {}\n", cmd))
        .unwrap_or_default();

    format!(
        r#"FROM {base}

ENV DEBIAN_FRONTEND=noninteractive
RUN apt-get update -qq && \
    apt-get install -y -qq xvfb x11vnc novnc websockify supervisor && \
    rm -rf /var/lib/apt/lists/*

ADD {artifact} /opt/ide/
{install}
EXPOSE {web} {vnc}
CMD ["supervisord", "-n"]
"#,
        base = ide.base_image,
        artifact = artifact_name,
        install = install,
        web = CONTAINER_WEB_PORT,
        vnc = CONTAINER_VNC_PORT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ide(base: &str, install: Option<&str>) -> IdeTypeConfig {
        IdeTypeConfig {
            name: "sublime".to_string(),
            download: "https://example.com/sublime.tar.xz".to_string(),
            base_image: base.to_string(),
            install_command: install.map(String::from),
        }
    }

    #[test]
    fn prepare_copies_artifact_and_renders_dockerfile() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("sublime.tar.xz");
        std::fs::write(&artifact, b"bytes").unwrap();

        let ctx = BuildContext::prepare(&ide("ubuntu:22.04", None), &artifact).unwrap();

        assert!(ctx.context_path().join("sublime.tar.xz").exists());
        let content = std::fs::read_to_string(ctx.dockerfile_path()).unwrap();
        assert!(content.starts_with("FROM ubuntu:22.04\n"));
        assert!(content.contains("ADD sublime.tar.xz /opt/ide/"));
        assert!(content.contains("EXPOSE 80 5900"));
    }

    #[test]
    fn install_command_is_included() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("a.tar");
        std::fs::write(&artifact, b"x").unwrap();

        let ctx =
            BuildContext::prepare(&ide("ubuntu:22.04", Some("tar xf /opt/ide/a.tar")), &artifact)
                .unwrap();
        let content = std::fs::read_to_string(ctx.dockerfile_path()).unwrap();
        assert!(content.contains("RUN tar xf /opt/ide/a.tar"));
    }

    #[test]
    fn rejects_injection_in_base_image() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("a.tar");
        std::fs::write(&artifact, b"x").unwrap();

        assert!(BuildContext::prepare(&ide("ubuntu\nRUN evil", None), &artifact).is_err());
        assert!(BuildContext::prepare(&ide("", None), &artifact).is_err());
    }
}
