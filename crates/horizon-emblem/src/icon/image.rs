//! Icon identity and self-contained image payloads.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

/// Opaque identifier for an icon within a compiled table.
///
/// Icon ids are assigned by the mapping compiler and carry no meaning to
/// the engine beyond keying the image store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconId(String);

impl IconId {
    /// Create a new icon id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for IconId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for IconId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for IconId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A self-contained, directly displayable image payload.
///
/// The payload is carried base64-encoded so a compiled table ships as plain
/// JSON and renders through a `data:` URI with no fetch at display time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderableImage {
    /// IANA media type of the payload, e.g. `image/svg+xml`.
    pub media_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

impl RenderableImage {
    /// Create a payload from raw image bytes.
    pub fn from_bytes(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            media_type: media_type.into(),
            data: BASE64.encode(bytes),
        }
    }

    /// Render the payload as a `data:` URI suitable for an image `src`.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }

    /// Decode the payload back to raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(&self.data)
    }
}
