//! Runner wiring configuration, preconditions, and the pipeline

use std::path::Path;
use std::sync::Arc;

use crate::cli::args::Args;
use crate::config::{ImageSet, PromotionConfig};
use crate::diff::{self, DiffRunner};
use crate::error::{PromoterError, Result};
use crate::logging::Logger;
use crate::pipeline::{FailurePolicy, Promoter, StageOverrides, TagPair};
use crate::runtime::DockerRuntime;

pub struct Runner {
    args: Args,
    output: Logger,
}

impl Runner {
    pub fn new(args: Args) -> Self {
        let output = if args.quiet {
            Logger::new_quiet()
        } else {
            Logger::new(args.verbose)
        };
        Self { args, output }
    }

    pub async fn run(&self) -> Result<()> {
        self.output.section("Docker Image Promoter");

        let config = PromotionConfig::load(Path::new(&self.args.config))?;
        let (set, tags) = self.validate_request(&config)?;
        let resolved = set.resolve()?;

        if self.args.dry_run {
            self.output
                .info("dry-run enabled - actions are reported, not executed");
        }

        let runtime = DockerRuntime::connect(self.output.clone()).await?;
        let diff = DiffRunner::new(
            diff::find_tool(),
            self.args.report_dir.as_str(),
            self.output.clone(),
        );
        let promoter = Promoter::new(
            Arc::new(runtime),
            diff,
            self.output.clone(),
            self.args.dry_run,
            self.overrides(),
            FailurePolicy {
                exit_on_fail: self.args.exit_on_fail,
            },
        );

        promoter.run(&resolved, &tags).await?;
        self.output.success("Promotion completed");
        Ok(())
    }

    fn overrides(&self) -> StageOverrides {
        StageOverrides {
            pull: self.args.pull,
            retag: self.args.retag,
            diff: self.args.diff,
            push: self.args.push,
        }
    }

    /// Check the CLI preconditions, reporting every missing input before
    /// failing. No stage runs when any of them is violated.
    fn validate_request<'a>(&self, config: &'a PromotionConfig) -> Result<(&'a ImageSet, TagPair)> {
        let mut missing = Vec::new();

        let selected = self.args.set.as_deref().unwrap_or("");
        let set = config.get(selected).filter(|set| !set.name().is_empty());
        if set.is_none() {
            missing.push("missing flag 'set' for configuration item to choose");
        }

        let source = self.args.source.clone().unwrap_or_default();
        if source.is_empty() {
            missing.push("missing flag 'source' for input tag reference");
        }

        let destination = self.args.destination.clone().unwrap_or_default();
        if destination.is_empty() {
            missing.push("missing flag 'destination' for input tag reference");
        }

        if missing.is_empty() {
            if let Some(set) = set {
                return Ok((set, TagPair {
                    source,
                    destination,
                }));
            }
        }

        for message in &missing {
            self.output.error(message);
        }
        Err(PromoterError::Validation(
            "required promotion inputs are missing".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
demo:
  name: demo
  images: [api, worker]
  registry:
    destination: registry.example.com
  namespace:
    source: team
"#;

    fn args(set: Option<&str>, source: Option<&str>, destination: Option<&str>) -> Args {
        Args {
            config: "config.yml".to_string(),
            set: set.map(str::to_string),
            source: source.map(str::to_string),
            destination: destination.map(str::to_string),
            dry_run: false,
            exit_on_fail: false,
            pull: false,
            retag: false,
            diff: false,
            push: false,
            report_dir: ".".to_string(),
            verbose: false,
            quiet: true,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        let config = PromotionConfig::from_yaml(CONFIG).unwrap();
        let runner = Runner::new(args(Some("demo"), Some("v1"), Some("v2")));
        let (set, tags) = runner.validate_request(&config).unwrap();
        assert_eq!(set.name(), "demo");
        assert_eq!(tags.source, "v1");
        assert_eq!(tags.destination, "v2");
    }

    #[test]
    fn test_missing_destination_is_rejected() {
        let config = PromotionConfig::from_yaml(CONFIG).unwrap();
        let runner = Runner::new(args(Some("demo"), Some("v1"), None));
        let err = runner.validate_request(&config).unwrap_err();
        assert!(matches!(err, PromoterError::Validation(_)));
    }

    #[test]
    fn test_unknown_set_is_rejected() {
        let config = PromotionConfig::from_yaml(CONFIG).unwrap();
        let runner = Runner::new(args(Some("other"), Some("v1"), Some("v2")));
        assert!(runner.validate_request(&config).is_err());
    }

    #[test]
    fn test_all_missing_inputs_are_rejected_together() {
        let config = PromotionConfig::from_yaml(CONFIG).unwrap();
        let runner = Runner::new(args(None, None, None));
        assert!(runner.validate_request(&config).is_err());
    }
}
