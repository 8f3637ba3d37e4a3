//! Decides where the schema comes from.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{ConfigStore, Lookup, SOURCE_KEY};
use crate::error::ZeusError;

const URL_SCHEMES: [&str; 2] = ["http://", "https://"];

/// How the schema source is acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Url,
    Path,
}

/// A non-empty schema location and its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub value: String,
    pub kind: SourceKind,
}

impl ResolvedSource {
    /// Classify `value` with a literal prefix test. No existence check is
    /// done for paths.
    pub fn classify(value: impl Into<String>) -> Self {
        let value = value.into();
        let kind = if URL_SCHEMES.iter().any(|scheme| value.starts_with(scheme)) {
            SourceKind::Url
        } else {
            SourceKind::Path
        };
        Self { value, kind }
    }

    pub fn is_url(&self) -> bool {
        self.kind == SourceKind::Url
    }
}

/// Background persistence of a freshly entered source.
#[derive(Debug)]
pub struct PendingSave(JoinHandle<Result<(), ZeusError>>);

impl PendingSave {
    /// Wait for the save to finish. Failures are logged, never returned.
    pub async fn finish(self) {
        match self.0.await {
            Ok(Ok(())) => debug!("Persisted schema source."),
            Ok(Err(err)) => warn!(error = %err, "Failed to persist schema source."),
            Err(err) => warn!(error = %err, "Schema source persistence task failed."),
        }
    }
}

/// Resolve the schema source from the command line, the store, or a prompt.
///
/// A non-empty command-line value always wins. Otherwise a stored value is
/// reused, and as a last resort the user is prompted. Values coming from the
/// command line or the prompt are persisted in the background when
/// `save_on_input` is set; the returned [`PendingSave`] never blocks or fails
/// the resolution. Must be called from within a tokio runtime.
pub fn resolve_source(
    cli_value: Option<&str>,
    store: &Arc<dyn ConfigStore>,
    save_on_input: bool,
) -> Result<(ResolvedSource, Option<PendingSave>), ZeusError> {
    let cli_value = cli_value.map(str::trim).filter(|v| !v.is_empty());

    let (value, entered) = match cli_value {
        Some(v) => (v.to_string(), true),
        None => match store.get_or_prompt(SOURCE_KEY, "Schema URL or path") {
            Ok(Some(Lookup::Stored(v))) => (v, false),
            Ok(Some(Lookup::Prompted(v))) => (v, true),
            Ok(None) => return Err(ZeusError::MissingSchemaSource),
            Err(err) => {
                warn!(error = %err, "Failed to prompt for schema source.");
                return Err(ZeusError::MissingSchemaSource);
            }
        },
    };

    let resolved = ResolvedSource::classify(value);
    info!(source = %resolved.value, kind = ?resolved.kind, "Resolved schema source.");

    let already_stored = store.get(SOURCE_KEY).as_deref() == Some(resolved.value.as_str());
    let pending = if entered && save_on_input && !already_stored {
        let store = Arc::clone(store);
        let value = resolved.value.clone();
        Some(PendingSave(tokio::task::spawn_blocking(move || {
            store.set(SOURCE_KEY, &value)
        })))
    } else {
        None
    };

    Ok((resolved, pending))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::MemoryConfigStore;

    fn store_with(value: Option<&str>) -> Arc<dyn ConfigStore> {
        match value {
            Some(v) => Arc::new(MemoryConfigStore::with_value(SOURCE_KEY, v)),
            None => Arc::new(MemoryConfigStore::new()),
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            ResolvedSource::classify("https://x/schema").kind,
            SourceKind::Url
        );
        assert_eq!(
            ResolvedSource::classify("http://localhost:4000/graphql").kind,
            SourceKind::Url
        );
        assert_eq!(
            ResolvedSource::classify("./schema.graphql").kind,
            SourceKind::Path
        );
        // prefix test only, no URI parsing
        assert_eq!(ResolvedSource::classify("ftp://x/schema").kind, SourceKind::Path);
        assert_eq!(ResolvedSource::classify("HTTPS://x").kind, SourceKind::Path);
    }

    #[tokio::test]
    async fn test_cli_value_wins_and_is_saved() {
        let store = store_with(Some("./old.graphql"));
        let (resolved, pending) =
            resolve_source(Some("https://x/schema"), &store, true).unwrap();
        assert_eq!(resolved.value, "https://x/schema");
        assert!(resolved.is_url());

        pending.expect("save scheduled").finish().await;
        assert_eq!(store.get(SOURCE_KEY).as_deref(), Some("https://x/schema"));
    }

    #[tokio::test]
    async fn test_stored_value_reused_without_save() {
        let store = store_with(Some("./schema.graphql"));
        let (resolved, pending) = resolve_source(None, &store, true).unwrap();
        assert_eq!(resolved.value, "./schema.graphql");
        assert_eq!(resolved.kind, SourceKind::Path);
        assert!(pending.is_none());
    }

    #[tokio::test]
    async fn test_empty_cli_value_falls_back_to_store() {
        let store = store_with(Some("./schema.graphql"));
        let (resolved, _) = resolve_source(Some(""), &store, true).unwrap();
        assert_eq!(resolved.value, "./schema.graphql");
    }

    #[tokio::test]
    async fn test_no_save_when_disabled() {
        let store = store_with(None);
        let (_, pending) = resolve_source(Some("./schema.graphql"), &store, false).unwrap();
        assert!(pending.is_none());
        assert_eq!(store.get(SOURCE_KEY), None);
    }

    #[tokio::test]
    async fn test_missing_source() {
        let store = store_with(None);
        let err = resolve_source(None, &store, true).unwrap_err();
        assert!(matches!(err, ZeusError::MissingSchemaSource));
    }
}
