//! Deployment state persistence
//!
//! Tracks the last successful deployment in a single JSON file inside the
//! project working directory, so that a later rollback knows which tag and
//! service set to return to. The file is overwritten on every save.

use crate::error::DeployError;
use chrono::{DateTime, Utc};
use convoy_core::{LoadedStack, StackDescriptor};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// File name of the deployment record, one per project directory
pub const STATE_FILE: &str = ".convoy-deploy.json";

/// Durable record of the last successful deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// Image tag the stack was deployed with
    pub last_tag: String,
    /// When the deployment finished
    pub deployed_at: DateTime<Utc>,
    /// Service names present in the deployed stack
    pub services: Vec<String>,
    /// Manifest files the stack was loaded from
    pub compose_files: Vec<String>,
    /// Resolved project name
    pub project_name: String,
}

impl DeploymentRecord {
    /// Capture a record for a stack that was just deployed successfully
    pub fn capture(descriptor: &StackDescriptor, stack: &LoadedStack, tag: &str) -> Self {
        Self {
            last_tag: tag.to_string(),
            deployed_at: Utc::now(),
            services: stack.service_names(),
            compose_files: descriptor
                .files
                .iter()
                .map(|file| file.display().to_string())
                .collect(),
            project_name: stack.name.clone(),
        }
    }
}

/// Reads and writes the per-project deployment record
pub struct StateStore {
    project_dir: PathBuf,
}

impl StateStore {
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            project_dir: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Resolve the store location for a descriptor
    ///
    /// Uses the same working-directory rule as the manifest loader.
    pub fn for_descriptor(descriptor: &StackDescriptor) -> Result<Self, DeployError> {
        Ok(Self::new(descriptor.working_dir()?))
    }

    /// Path of the state file
    pub fn path(&self) -> PathBuf {
        self.project_dir.join(STATE_FILE)
    }

    /// Persist the record, replacing any previous one
    ///
    /// The content goes to a temp file first and is renamed into place, so a
    /// concurrent reader never observes a torn record.
    pub async fn save(&self, record: &DeploymentRecord) -> Result<(), DeployError> {
        let path = self.path();
        let content = serde_json::to_string_pretty(record)?;

        let tmp = self.project_dir.join(format!("{}.tmp", STATE_FILE));
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &path).await?;

        tracing::debug!(
            path = %path.display(),
            tag = %record.last_tag,
            "deployment record saved"
        );
        Ok(())
    }

    /// Load the last record
    ///
    /// A missing or unreadable file means there is no prior deployment to
    /// roll back to, which is a normal condition rather than a crash.
    pub async fn load(&self) -> Result<DeploymentRecord, DeployError> {
        let path = self.path();
        let content = fs::read_to_string(&path)
            .await
            .map_err(|_| DeployError::NoDeploymentState(path.clone()))?;

        let record: DeploymentRecord = serde_json::from_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            tag = %record.last_tag,
            "deployment record loaded"
        );
        Ok(record)
    }
}
