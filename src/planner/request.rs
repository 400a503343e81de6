//! Update request types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::formatter::format_update_plan;
use super::response::PlanResponse;

/// Verbosity of a plan response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Summary and next steps only.
    #[default]
    Concise,
    /// Summary, next steps, raw identifiers and the full plan.
    Detailed,
}

impl ResponseFormat {
    /// Maps a caller-supplied label to a format.
    ///
    /// Only `"concise"` selects the concise form. Every other label,
    /// including unrecognised ones, selects the detailed form.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        if label == "concise" {
            Self::Concise
        } else {
            Self::Detailed
        }
    }

    /// Returns the wire label of this format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Concise => "concise",
            Self::Detailed => "detailed",
        }
    }
}

impl std::fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Any present value decodes, absent fields fall back to `Default`.
impl<'de> Deserialize<'de> for ResponseFormat {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map_or(Self::Detailed, Self::from_label))
    }
}

/// A request to plan a service update.
///
/// `service` and `image` are free-form and are not validated; when absent
/// they decode to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Service to update.
    #[serde(default)]
    pub service: String,
    /// Target image reference.
    #[serde(default)]
    pub image: String,
    /// Requested response verbosity.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl UpdateRequest {
    /// Creates a request with the default (concise) response format.
    #[must_use]
    pub fn new(service: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            image: image.into(),
            response_format: ResponseFormat::default(),
        }
    }

    /// Sets the response format.
    #[must_use]
    pub const fn with_format(mut self, response_format: ResponseFormat) -> Self {
        self.response_format = response_format;
        self
    }

    /// Formats the plan response for this request.
    #[must_use]
    pub fn format(&self) -> PlanResponse {
        format_update_plan(&self.service, &self.image, self.response_format)
    }
}
