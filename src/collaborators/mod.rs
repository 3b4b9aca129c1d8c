//! External collaborators: the optional AI service and version control.

pub mod agent;
pub mod agent_client;
pub mod ai;
pub mod git;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::{AgentSettings, Configuration};
use crate::error::Result;

pub use agent::AgentCollaborator;
pub use agent_client::{AgentClient, AgentMessage};
pub use ai::{AiCollaborator, DirectoryInsight, ParsedSummary};
pub use git::{find_repository_root, CommitInfo, GitCli, NoVersionControl, VersionControl};

/// Boxed future returned by collaborator trait methods.
pub type CollaboratorFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

pub const AI_TIMEOUT: Duration = Duration::from_secs(60);
pub const GIT_TIMEOUT: Duration = Duration::from_secs(10);

/// The collaborators one analysis run talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub ai: Option<Arc<dyn AiCollaborator>>,
    pub vcs: Arc<dyn VersionControl>,
}

impl Collaborators {
    /// No AI and no version control.
    pub fn offline() -> Self {
        Self {
            ai: None,
            vcs: Arc::new(NoVersionControl),
        }
    }

    /// Wire collaborators according to `integrations` in the configuration.
    pub fn from_config(config: &Configuration, settings: AgentSettings) -> Result<Self> {
        let vcs: Arc<dyn VersionControl> = if config.integrations.git {
            Arc::new(GitCli)
        } else {
            Arc::new(NoVersionControl)
        };

        let ai: Option<Arc<dyn AiCollaborator>> = if config.integrations.claude {
            let agent = AgentCollaborator::new(settings, true)?;
            if !agent.is_available() {
                debug!("AI integration enabled but no API key is configured");
            }
            Some(Arc::new(agent))
        } else {
            None
        };

        Ok(Self { ai, vcs })
    }

    /// The AI collaborator, if one is configured and reports itself available.
    pub fn available_ai(&self) -> Option<&dyn AiCollaborator> {
        self.ai
            .as_deref()
            .filter(|ai| ai.is_available())
    }
}

/// Await a collaborator call with a bounded wait. Failures and timeouts are
/// logged and become `None`.
pub async fn soft_call<T>(what: &str, limit: Duration, call: CollaboratorFuture<'_, T>) -> Option<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            warn!("{} failed: {}", what, e);
            None
        }
        Err(_) => {
            warn!("{} timed out after {:?}", what, limit);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContextError;

    #[test]
    fn test_from_config_respects_integrations() {
        let mut config = Configuration::default();
        config.integrations.git = false;
        config.integrations.claude = false;

        let settings = AgentSettings {
            endpoint: "http://127.0.0.1:9".to_string(),
            model: "m".to_string(),
            api_key: Some("k".to_string()),
            timeout: Duration::from_secs(1),
        };
        let offline = Collaborators::from_config(&config, settings.clone()).unwrap();
        assert!(offline.ai.is_none());
        assert!(offline.available_ai().is_none());

        config.integrations.claude = true;
        let online = Collaborators::from_config(&config, settings.clone()).unwrap();
        assert!(online.available_ai().is_some());

        let keyless = AgentSettings {
            api_key: None,
            ..settings
        };
        let keyless = Collaborators::from_config(&config, keyless).unwrap();
        assert!(keyless.ai.is_some());
        assert!(keyless.available_ai().is_none());
    }

    #[tokio::test]
    async fn test_soft_call_success() {
        let call: CollaboratorFuture<'_, u32> = Box::pin(async { Ok(7) });
        assert_eq!(soft_call("answer", Duration::from_secs(1), call).await, Some(7));
    }

    #[tokio::test]
    async fn test_soft_call_error_is_none() {
        let call: CollaboratorFuture<'_, u32> =
            Box::pin(async { Err(ContextError::Agent("down".into())) });
        assert_eq!(soft_call("answer", Duration::from_secs(1), call).await, None);
    }

    #[tokio::test]
    async fn test_soft_call_timeout_is_none() {
        let call: CollaboratorFuture<'_, u32> = Box::pin(async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(1)
        });
        assert_eq!(soft_call("slow", Duration::from_millis(20), call).await, None);
    }
}
