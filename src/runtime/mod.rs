//! Container runtime capability
//!
//! The promotion pipeline talks to the container daemon exclusively through
//! the [`ContainerRuntime`] trait so the driver can be exercised against a
//! mock runtime in tests. [`DockerRuntime`] is the production
//! implementation over the local Docker daemon.

pub mod docker;

use async_trait::async_trait;

use crate::error::Result;
use crate::reference::Reference;

#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Tag references currently held by the local daemon.
    async fn local_references(&self) -> Result<Vec<String>>;

    /// Pull a reference, authenticating with the registry's opaque
    /// credential blob.
    async fn pull(&self, reference: &Reference, auth: &str) -> Result<()>;

    /// Apply a new tag to an existing local reference.
    async fn tag(&self, source: &Reference, destination: &Reference) -> Result<()>;

    /// Push a reference to its registry.
    async fn push(&self, reference: &Reference, auth: &str) -> Result<()>;
}

pub use docker::DockerRuntime;
