use {
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

use crate::{Result, filter::CommandFilter};

/// Configuration of one messaging-extension router.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagingExtensionConfig {
    /// Command handled by the router. Unset handles every command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,

    /// Report activity diagnostics through `tracing`.
    pub trace_activities: bool,
}

impl MessagingExtensionConfig {
    pub fn for_command(command_id: impl Into<String>) -> Self {
        Self {
            command_id: Some(command_id.into()),
            ..Self::default()
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_json(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn filter(&self) -> CommandFilter {
        CommandFilter::new(self.command_id.clone())
    }
}
