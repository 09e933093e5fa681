use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Deserialize;

use crate::results::StateResult;
use crate::serialization::registry;
use crate::storage::EnvSecretResolver;
use crate::storage::secrets::DEFAULT_SECRET_PREFIX;

const DEFAULT_CONFIG_FILE: &str = "ironflow-results.yaml";

/// Result declarations loaded from `ironflow-results.yaml`.
///
/// ```yaml
/// secrets_prefix: "MYAPP_SECRET_"
/// results:
///   extract:
///     type: S3Result
///     bucket: artifacts
///     filepath: "runs/${ctx.run_id}/extract.json"
///     credentials_secret: aws-creds
///   summary:
///     type: PrefectResult
/// ```
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ResultsConfig {
    pub secrets_prefix: Option<String>,
    /// Task name → result wire object.
    pub results: BTreeMap<String, serde_yml::Value>,
}

impl ResultsConfig {
    /// Load configuration from a YAML file.
    ///
    /// - If `path` is `Some`, load that specific file (error if missing).
    /// - If `path` is `None`, look for `ironflow-results.yaml` in cwd; return defaults if absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file_path = match path {
            Some(p) => {
                if !p.exists() {
                    anyhow::bail!("Config file not found: {}", p.display());
                }
                p.to_path_buf()
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if !default_path.exists() {
                    return Ok(Self::default());
                }
                default_path.to_path_buf()
            }
        };

        let contents = std::fs::read_to_string(&file_path)
            .with_context(|| format!("Failed to read config file: {}", file_path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", file_path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(serde_yml::from_str(contents)?)
    }

    /// Decode every declared result. Fails on the first invalid entry,
    /// naming its task.
    pub fn decode_results(&self) -> Result<BTreeMap<String, StateResult>> {
        self.results
            .iter()
            .map(|(task, wire)| {
                let result = registry()
                    .decode_yaml(wire)
                    .with_context(|| format!("Invalid result for task '{}'", task))?;
                Ok((task.clone(), result))
            })
            .collect()
    }

    pub fn secret_resolver(&self) -> EnvSecretResolver {
        EnvSecretResolver::new(
            self.secrets_prefix
                .as_deref()
                .unwrap_or(DEFAULT_SECRET_PREFIX),
        )
    }
}
