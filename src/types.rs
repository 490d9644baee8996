//! Shared Stability AI API types

use serde::{Deserialize, Serialize, Serializer};
use std::path::PathBuf;

// ============ Configuration ============

/// Configuration for the Stability AI client
#[derive(Debug, Clone)]
pub struct StabilityConfig {
    /// API key for authentication
    pub api_key: String,
    /// Base URL for the API (default: https://api.stability.ai)
    pub base_url: Option<String>,
    /// Request timeout in seconds (default: 60)
    pub timeout: Option<u64>,
    /// Organization id sent as the `Organization` header on v1 calls
    pub organization: Option<String>,
    /// Value for the `Stability-Client-ID` header
    pub client_id: Option<String>,
    /// Value for the `Stability-Client-Version` header
    pub client_version: Option<String>,
}

impl StabilityConfig {
    /// Create a new configuration with just an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            timeout: None,
            organization: None,
            client_id: None,
            client_version: None,
        }
    }

    /// Set a custom base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set a custom timeout in seconds
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the organization id
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Set the client id reported to the API
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set the client version reported to the API
    pub fn with_client_version(mut self, client_version: impl Into<String>) -> Self {
        self.client_version = Some(client_version.into());
        self
    }
}

// ============ Versioning ============

/// API generation, used as the leading path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ApiVersion {
    V1,
    V2Beta,
}

impl ApiVersion {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V2Beta => "v2beta",
        }
    }
}

// ============ Media formats ============

/// Kind of media carried by a [`ContentResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Image,
    Video,
    ThreeD,
}

/// Concrete encoding of a generated output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Jpeg,
    #[default]
    Png,
    Webp,
    /// Video container, fixed for all stable-video results
    Mp4,
    /// 3D mesh container, fixed for all 3D results
    Glb,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Glb => "glb",
        }
    }

    /// File extension used when persisting results to scratch storage
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            OutputFormat::Jpeg | OutputFormat::Png | OutputFormat::Webp => ContentType::Image,
            OutputFormat::Mp4 => ContentType::Video,
            OutputFormat::Glb => ContentType::ThreeD,
        }
    }
}

impl Serialize for OutputFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Aspect ratio accepted by the v2beta generation endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    Ratio16x9,
    Ratio1x1,
    Ratio21x9,
    Ratio2x3,
    Ratio3x2,
    Ratio4x5,
    Ratio5x4,
    Ratio9x16,
    Ratio9x21,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Ratio16x9 => "16:9",
            AspectRatio::Ratio1x1 => "1:1",
            AspectRatio::Ratio21x9 => "21:9",
            AspectRatio::Ratio2x3 => "2:3",
            AspectRatio::Ratio3x2 => "3:2",
            AspectRatio::Ratio4x5 => "4:5",
            AspectRatio::Ratio5x4 => "5:4",
            AspectRatio::Ratio9x16 => "9:16",
            AspectRatio::Ratio9x21 => "9:21",
        }
    }
}

impl Serialize for AspectRatio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ============ Results ============

/// A terminal generation result persisted to scratch storage
#[derive(Debug, Clone)]
pub struct ContentResult {
    /// Location of the locally persisted output file
    pub filepath: PathBuf,
    /// Name of the output file
    pub filename: String,
    /// Kind of media in the file
    pub content_type: ContentType,
    /// Encoding of the file, echoing what was requested or defaulted
    pub output_format: OutputFormat,
    /// True when upstream moderation suppressed the output; the call still
    /// succeeds structurally but the file carries no usable media guarantee
    pub content_filtered: bool,
    /// True when upstream reported a generation failure despite a 200 status
    pub errored: bool,
    /// Seed actually used for the generation, 0 when upstream omits it
    pub seed: u64,
}

/// In-progress status of an asynchronous job
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobStatus {
    /// Opaque job identifier assigned on submission
    pub id: String,
    /// Always `in-progress`; terminal outcomes are surfaced as
    /// [`ContentResult`] or an error instead
    pub status: String,
}

/// Handle returned by asynchronous submission endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub id: String,
}

/// Handle for a creative upscale job.
///
/// Carries the requested output format because the result endpoint does not
/// remember it; thread it back into
/// [`fetch_creative_upscale_result`](crate::Stability::fetch_creative_upscale_result).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreativeUpscaleHandle {
    pub id: String,
    pub output_format: OutputFormat,
}

/// Outcome of polling an asynchronous job.
///
/// The SDK never sleeps or retries internally; callers poll until a terminal
/// outcome is reached, typically with a fixed delay of around 2.5 seconds
/// between requests. Results are retained upstream for 24 hours.
#[derive(Debug, Clone)]
pub enum AsyncResult {
    /// Terminal success, media decoded and persisted
    Content(ContentResult),
    /// Job still running; poll again later
    InProgress(JobStatus),
}

impl AsyncResult {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, AsyncResult::InProgress(_))
    }

    /// Consume the result, returning the content if terminal
    pub fn into_content(self) -> Option<ContentResult> {
        match self {
            AsyncResult::Content(content) => Some(content),
            AsyncResult::InProgress(_) => None,
        }
    }
}

// ============ Engines (v1) ============

/// Engine category reported by the v1 engines list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineType {
    Audio,
    Classification,
    Picture,
    Storage,
    Text,
    Video,
}

/// A v1 generation engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Engine {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub engine_type: EngineType,
}
