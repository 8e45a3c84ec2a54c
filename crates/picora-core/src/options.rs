use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Default number of pipelines admitted to the compute-heavy stages at once.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 3;

// Size-adaptive quality bands, applied only when the caller supplies no
// explicit compression level.
const ADAPTIVE_LARGE_PIXELS: u64 = 1_500_000;
const ADAPTIVE_MEDIUM_PIXELS: u64 = 800_000;
const ADAPTIVE_LARGE_QUALITY: u8 = 40;
const ADAPTIVE_MEDIUM_QUALITY: u8 = 50;
const ADAPTIVE_SMALL_QUALITY: u8 = 65;

/// Compression policy selector. Each level maps to a max long-edge bound and
/// a JPEG encode quality; `None` keeps the source bytes untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// Pass-through: the original bytes persist unchanged.
    None,
    Low,
    Medium,
    High,
}

impl CompressionLevel {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "none" => Ok(CompressionLevel::None),
            "low" => Ok(CompressionLevel::Low),
            "medium" => Ok(CompressionLevel::Medium),
            "high" => Ok(CompressionLevel::High),
            _ => Err(format!("Invalid compression level: {}", s)),
        }
    }

    /// Max long-edge bound for resized output; `None` leaves dimensions
    /// alone. Resizing only ever scales down.
    pub fn max_dimension(self) -> Option<u32> {
        match self {
            CompressionLevel::None => None,
            CompressionLevel::Low => Some(1920),
            CompressionLevel::Medium | CompressionLevel::High => Some(1280),
        }
    }

    /// JPEG encode quality (0-100); `None` means no re-encode at all.
    pub fn jpeg_quality(self) -> Option<u8> {
        match self {
            CompressionLevel::None => None,
            CompressionLevel::Low => Some(70),
            CompressionLevel::Medium => Some(60),
            CompressionLevel::High => Some(50),
        }
    }

    /// Whether this level re-encodes pixels at all.
    pub fn reencodes(self) -> bool {
        !matches!(self, CompressionLevel::None)
    }
}

/// Size-adaptive JPEG quality for images submitted without an explicit
/// level: larger images compress harder.
pub fn adaptive_jpeg_quality(pixel_count: u64) -> u8 {
    if pixel_count > ADAPTIVE_LARGE_PIXELS {
        ADAPTIVE_LARGE_QUALITY
    } else if pixel_count > ADAPTIVE_MEDIUM_PIXELS {
        ADAPTIVE_MEDIUM_QUALITY
    } else {
        ADAPTIVE_SMALL_QUALITY
    }
}

/// How the item set was selected. Single-select surfaces a failure directly;
/// multi-select accumulates failures and still reports what succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    Single,
    #[default]
    Multiple,
}

/// Configuration shared by one whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingOptions {
    /// Explicit compression level. When absent, images are re-encoded at a
    /// size-adaptive quality with no dimension bound.
    pub compression: Option<CompressionLevel>,
    /// Extract a structured metadata record per image.
    pub include_metadata: bool,
    /// Positive concurrency budget; zero is clamped to one.
    pub concurrency_limit: usize,
    pub selection_mode: SelectionMode,
    /// Optional content-type allow-list. `None` accepts anything: images are
    /// transformed, other types take the document pass-through path.
    pub allowed_content_types: Option<Vec<String>>,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            compression: None,
            include_metadata: false,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            selection_mode: SelectionMode::Multiple,
            allowed_content_types: None,
        }
    }
}

impl ProcessingOptions {
    /// Concurrency budget with the positive-value contract applied.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency_limit.max(1)
    }
}

/// Per-batch state threaded explicitly through the pipeline, so concurrent
/// batches never share mutable coordination state.
#[derive(Debug, Clone)]
pub struct BatchContext {
    options: ProcessingOptions,
    cancel: CancellationToken,
}

impl BatchContext {
    pub fn new(options: ProcessingOptions) -> Self {
        Self {
            options,
            cancel: CancellationToken::new(),
        }
    }

    pub fn options(&self) -> &ProcessingOptions {
        &self.options
    }

    /// Token workers observe between admission and execution.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request cooperative cancellation: in-flight items run to completion,
    /// unstarted items report a `Cancelled` failure.
    pub fn cancel(&self) {
        tracing::debug!("batch cancellation requested");
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
