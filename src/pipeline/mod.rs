//! Promotion pipeline driver
//!
//! Runs the four promotion stages over an image-set in stage-major order:
//! every image is pulled, then every image is retagged, then diffed, then
//! pushed. Each stage announces the docker command it stands for, consults
//! the action gate, and delegates the real work to the injected
//! [`ContainerRuntime`] or [`DiffRunner`]. The driver owns the single
//! fatal-vs-continue decision for stage failures.

use std::sync::Arc;

use crate::config::ResolvedImageSet;
use crate::diff::DiffRunner;
use crate::error::Result;
use crate::logging::Logger;
use crate::reference::Reference;
use crate::runtime::ContainerRuntime;

/// Source and destination tags of one promotion run.
#[derive(Debug, Clone)]
pub struct TagPair {
    pub source: String,
    pub destination: String,
}

/// Effective execution mode of one stage.
#[derive(Debug, Clone, Copy)]
pub struct StageMode {
    pub dry_run: bool,
    pub force_execute: bool,
}

impl StageMode {
    /// The action gate: a stage runs live unless the run is a dry-run, and
    /// a per-stage force-execute flag punches through the dry-run.
    pub fn should_execute(&self) -> bool {
        !self.dry_run || self.force_execute
    }
}

/// Per-stage force-execute overrides for dry-run mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageOverrides {
    pub pull: bool,
    pub retag: bool,
    pub diff: bool,
    pub push: bool,
}

/// Whether a stage failure ends the run or only that item.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailurePolicy {
    pub exit_on_fail: bool,
}

/// The four promotion stages, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Pull,
    Retag,
    Diff,
    Push,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Pull => "pull",
            Stage::Retag => "retag",
            Stage::Diff => "diff",
            Stage::Push => "push",
        }
    }
}

/// The pipeline driver.
pub struct Promoter {
    runtime: Arc<dyn ContainerRuntime>,
    diff: DiffRunner,
    output: Logger,
    dry_run: bool,
    overrides: StageOverrides,
    policy: FailurePolicy,
}

impl Promoter {
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        diff: DiffRunner,
        output: Logger,
        dry_run: bool,
        overrides: StageOverrides,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            runtime,
            diff,
            output,
            dry_run,
            overrides,
            policy,
        }
    }

    /// Promote every image of the set from the source tag to the
    /// destination tag, stage-major.
    pub async fn run(&self, set: &ResolvedImageSet, tags: &TagPair) -> Result<()> {
        self.output.subsection(&format!(
            "Promoting image-set '{}' ({} images)",
            set.name,
            set.images.len()
        ));

        for image in &set.images {
            let result = self.pull(set, image, tags).await;
            self.check(Stage::Pull, image, result)?;
        }

        for image in &set.images {
            let result = self.retag(set, image, tags).await;
            self.check(Stage::Retag, image, result)?;
        }

        for image in &set.images {
            let result = self
                .diff
                .run(
                    &set.name,
                    image,
                    &self.source_ref(set, image, tags),
                    &self.destination_ref(set, image, tags),
                    self.mode(Stage::Diff),
                )
                .await;
            self.check(Stage::Diff, image, result)?;
        }

        for image in &set.images {
            let result = self.push(set, image, tags).await;
            self.check(Stage::Push, image, result)?;
        }

        Ok(())
    }

    /// The central fatal-vs-continue decision for a stage outcome.
    fn check(&self, stage: Stage, image: &str, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                self.output
                    .error(&format!("{} failed for '{}': {}", stage.label(), image, e));
                if self.policy.exit_on_fail {
                    Err(e)
                } else {
                    Ok(())
                }
            }
        }
    }

    fn mode(&self, stage: Stage) -> StageMode {
        let force_execute = match stage {
            Stage::Pull => self.overrides.pull,
            Stage::Retag => self.overrides.retag,
            Stage::Diff => self.overrides.diff,
            Stage::Push => self.overrides.push,
        };
        StageMode {
            dry_run: self.dry_run,
            force_execute,
        }
    }

    fn source_ref(&self, set: &ResolvedImageSet, image: &str, tags: &TagPair) -> Reference {
        Reference::new(&set.source.url, &set.source.namespace, image, &tags.source)
    }

    fn destination_ref(&self, set: &ResolvedImageSet, image: &str, tags: &TagPair) -> Reference {
        Reference::new(
            &set.destination.url,
            &set.destination.namespace,
            image,
            &tags.destination,
        )
    }

    async fn pull(&self, set: &ResolvedImageSet, image: &str, tags: &TagPair) -> Result<()> {
        let reference = self.source_ref(set, image, tags);

        // A reference the daemon already holds is not pulled again. The
        // comparison is on parsed (repository, tag) pairs, so a local
        // `myapi:v1` never shadows `api:v1`.
        let local = self.runtime.local_references().await?;
        let held = local.iter().any(|held| {
            Reference::parse(held)
                .map(|r| r.same_image(&reference))
                .unwrap_or(false)
        });
        if held {
            self.output.step(&format!("# docker pull {}", reference));
            self.output.detail("already present locally, skipping pull");
            return Ok(());
        }

        self.output.step(&format!("docker pull {}", reference));
        if !self.mode(Stage::Pull).should_execute() {
            return Ok(());
        }
        self.runtime.pull(&reference, &set.source.auth).await
    }

    async fn retag(&self, set: &ResolvedImageSet, image: &str, tags: &TagPair) -> Result<()> {
        let source = self.source_ref(set, image, tags);
        let destination = self.destination_ref(set, image, tags);

        self.output
            .step(&format!("docker tag {} {}", source, destination));
        if !self.mode(Stage::Retag).should_execute() {
            return Ok(());
        }
        self.runtime.tag(&source, &destination).await
    }

    async fn push(&self, set: &ResolvedImageSet, image: &str, tags: &TagPair) -> Result<()> {
        let reference = self.destination_ref(set, image, tags);

        self.output.step(&format!("docker push {}", reference));
        if !self.mode(Stage::Push).should_execute() {
            return Ok(());
        }
        self.runtime.push(&reference, &set.destination.auth).await
    }
}
