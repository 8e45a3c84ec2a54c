use picora_core::{ItemError, ItemResult};

/// Content-type allow-list enforcement.
///
/// Built per batch from the options. With no allow-list configured, every
/// type is accepted: images are transformed, everything else takes the
/// document pass-through path.
#[derive(Debug, Clone)]
pub struct MediaValidator {
    allowed_content_types: Option<Vec<String>>,
}

impl MediaValidator {
    pub fn new(allowed_content_types: Option<Vec<String>>) -> Self {
        Self {
            allowed_content_types: allowed_content_types
                .map(|list| list.into_iter().map(|ct| ct.to_lowercase()).collect()),
        }
    }

    /// Check a detected content type against the allow-list.
    pub fn validate_content_type(&self, content_type: &str) -> ItemResult<()> {
        let Some(allowed) = &self.allowed_content_types else {
            return Ok(());
        };

        let normalized = content_type.to_lowercase();
        if !allowed.iter().any(|ct| ct == &normalized) {
            return Err(ItemError::UnsupportedFormat(format!(
                "{} (allowed: {})",
                content_type,
                allowed.join(", ")
            )));
        }

        Ok(())
    }
}
