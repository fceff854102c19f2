//! Raw text provider for pasted articles and notes

use crate::error::{AgentRagError, Result};
use crate::providers::{Source, SourceItem, SourceProvider};
use async_trait::async_trait;

/// Label given to pasted text when the user does not name it
pub const RAW_TEXT_LABEL: &str = "raw text";

/// Provider wrapping text supplied inline
pub struct TextProvider;

#[async_trait]
impl SourceProvider for TextProvider {
    fn provider_type(&self) -> &'static str {
        "text"
    }

    async fn load(&self, source: &Source) -> Result<Vec<SourceItem>> {
        let Source::Text { label, body } = source else {
            return Err(AgentRagError::InvalidInput(format!(
                "text provider cannot load {}",
                source.label()
            )));
        };

        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let label = if label.trim().is_empty() {
            RAW_TEXT_LABEL.to_string()
        } else {
            label.clone()
        };

        Ok(vec![SourceItem::new(
            label.clone(),
            label,
            body.clone(),
            "text",
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_named_text() {
        let items = TextProvider
            .load(&Source::text("meeting notes", "We agreed on Friday."))
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].uri, "meeting notes");
        assert_eq!(items[0].source_type, "text");
    }

    #[tokio::test]
    async fn test_unnamed_text_gets_default_label() {
        let items = TextProvider
            .load(&Source::text("", "Anonymous paste"))
            .await
            .unwrap();
        assert_eq!(items[0].uri, RAW_TEXT_LABEL);
    }

    #[tokio::test]
    async fn test_blank_text_yields_nothing() {
        let items = TextProvider.load(&Source::text("x", "  \n")).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_other_sources() {
        assert!(TextProvider.load(&Source::url("https://a.b")).await.is_err());
    }
}
