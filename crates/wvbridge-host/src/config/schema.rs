use serde::Deserialize;
use wvbridge_core::error::{BridgeError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    pub version: u32,

    #[serde(default)]
    pub bridge: BridgeSection,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            bridge: BridgeSection::default(),
        }
    }
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(BridgeError::BadRequest(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.bridge.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeSection {
    /// Forward web console calls to the log sink.
    #[serde(default)]
    pub debug: bool,

    /// How long a web method call waits for its response.
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,

    /// Turn a `webMethodError` into a rejected call instead of an empty result.
    #[serde(default)]
    pub reject_on_web_error: bool,
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            debug: false,
            response_timeout_ms: default_response_timeout_ms(),
            reject_on_web_error: false,
        }
    }
}

impl BridgeSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=600_000).contains(&self.response_timeout_ms) {
            return Err(BridgeError::BadRequest(
                "bridge.response_timeout_ms must be between 1 and 600000".into(),
            ));
        }
        Ok(())
    }
}

fn default_response_timeout_ms() -> u64 {
    2000
}
