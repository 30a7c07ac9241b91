//! Docker daemon implementation of the runtime capability

use async_trait::async_trait;
use base64::Engine;
use bollard::Docker;
use bollard::auth::DockerCredentials;
use futures_util::StreamExt;

use super::ContainerRuntime;
use crate::error::{PromoterError, Result};
use crate::logging::Logger;
use crate::reference::Reference;

pub struct DockerRuntime {
    docker: Docker,
    output: Logger,
}

impl DockerRuntime {
    /// Connect to the local daemon and verify it responds.
    pub async fn connect(output: Logger) -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| PromoterError::Connection(e.to_string()))?;
        docker.ping().await.map_err(|e| {
            PromoterError::Connection(format!("docker daemon is not responding: {}", e))
        })?;
        Ok(Self { docker, output })
    }
}

/// Convert the configured opaque credential blob into daemon credentials.
///
/// A blob that base64-decodes to `user:password` becomes a structured
/// username/password pair; anything else is handed to the daemon untouched
/// in the `auth` field.
fn credentials(auth: &str) -> Option<DockerCredentials> {
    if auth.is_empty() {
        return None;
    }
    if let Ok(decoded) = base64::engine::general_purpose::STANDARD.decode(auth) {
        if let Ok(text) = String::from_utf8(decoded) {
            if let Some((username, password)) = text.split_once(':') {
                return Some(DockerCredentials {
                    username: Some(username.to_string()),
                    password: Some(password.to_string()),
                    ..Default::default()
                });
            }
        }
    }
    Some(DockerCredentials {
        auth: Some(auth.to_string()),
        ..Default::default()
    })
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn local_references(&self) -> Result<Vec<String>> {
        #[allow(deprecated)]
        let options = bollard::image::ListImagesOptions::<String> {
            all: false,
            ..Default::default()
        };
        let images = self.docker.list_images(Some(options)).await?;
        Ok(images
            .into_iter()
            .flat_map(|summary| summary.repo_tags)
            .collect())
    }

    async fn pull(&self, reference: &Reference, auth: &str) -> Result<()> {
        #[allow(deprecated)]
        let options = bollard::image::CreateImageOptions::<String> {
            from_image: reference.repository(),
            tag: reference.tag.clone(),
            ..Default::default()
        };

        #[allow(deprecated)]
        let mut stream = self
            .docker
            .create_image(Some(options), None, credentials(auth));
        while let Some(info) = stream.next().await {
            let info = info?;
            if let Some(error) = info.error {
                return Err(PromoterError::Transport(error));
            }
            if let Some(status) = info.status {
                self.output.detail(&status);
            }
        }
        Ok(())
    }

    async fn tag(&self, source: &Reference, destination: &Reference) -> Result<()> {
        #[allow(deprecated)]
        let options = bollard::image::TagImageOptions::<String> {
            repo: destination.repository(),
            tag: destination.tag.clone(),
        };
        self.docker
            .tag_image(&source.to_string(), Some(options))
            .await?;
        Ok(())
    }

    async fn push(&self, reference: &Reference, auth: &str) -> Result<()> {
        #[allow(deprecated)]
        let options = bollard::image::PushImageOptions::<String> {
            tag: reference.tag.clone(),
        };

        #[allow(deprecated)]
        let mut stream =
            self.docker
                .push_image(&reference.repository(), Some(options), credentials(auth));
        while let Some(result) = stream.next().await {
            let info = result?;
            if let Some(error) = info.error {
                return Err(PromoterError::Transport(error));
            }
            if let Some(status) = info.status {
                self.output.detail(&status);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_empty_blob() {
        assert!(credentials("").is_none());
    }

    #[test]
    fn test_credentials_decodes_user_password() {
        // base64("staging:secret")
        let creds = credentials("c3RhZ2luZzpzZWNyZXQ=").unwrap();
        assert_eq!(creds.username.as_deref(), Some("staging"));
        assert_eq!(creds.password.as_deref(), Some("secret"));
        assert!(creds.auth.is_none());
    }

    #[test]
    fn test_credentials_opaque_blob_passes_through() {
        let creds = credentials("not-base64-material").unwrap();
        assert_eq!(creds.auth.as_deref(), Some("not-base64-material"));
        assert!(creds.username.is_none());
    }
}
