//! Runtime configuration for the relay.
//!
//! All configuration is read once at process start into an immutable
//! [`RelayConfig`] that is passed explicitly to the gateway and the bot
//! client. Nothing reads the ambient environment after startup.

use std::{env, fmt, str::FromStr};

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_BOT_NAME: &str = "신한투자증권 프로봇";
pub const DEFAULT_BOT_API_URL: &str =
    "https://bm0l8cj2xl.execute-api.ap-northeast-2.amazonaws.com/default/llm-lamda";

// ── Response mode ────────────────────────────────────────────────────────────

/// How the bot endpoint's response body is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    /// Parse JSON and extract `choices[0].message.content`; HTTP errors fail.
    #[default]
    Structured,
    /// Relay the body verbatim; the HTTP status is ignored entirely.
    Raw,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown response mode `{0}`, expected `structured` or `raw`")]
pub struct UnknownResponseMode(String);

impl FromStr for ResponseMode {
    type Err = UnknownResponseMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" => Ok(Self::Structured),
            "raw" => Ok(Self::Raw),
            _ => Err(UnknownResponseMode(s.to_string())),
        }
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured => write!(f, "structured"),
            Self::Raw => write!(f, "raw"),
        }
    }
}

// ── Relay config ─────────────────────────────────────────────────────────────

/// Immutable process-wide configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Display name used in greeting and typing prompts.
    pub bot_name: String,
    /// Base URL of the external bot endpoint.
    pub bot_api_url: String,
    /// Response-handling variant, fixed for the lifetime of the process.
    pub response_mode: ResponseMode,
}

impl RelayConfig {
    /// Read configuration from `BOT_NAME`, `BOT_API_URL` and
    /// `BOT_RESPONSE_MODE`, applying defaults for anything unset. An
    /// unrecognized response mode logs a warning and falls back to
    /// [`ResponseMode::Structured`] rather than aborting startup.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let bot_name = get("BOT_NAME").unwrap_or_else(|| DEFAULT_BOT_NAME.to_string());
        let bot_api_url = get("BOT_API_URL").unwrap_or_else(|| DEFAULT_BOT_API_URL.to_string());
        let response_mode = match get("BOT_RESPONSE_MODE") {
            Some(raw) => raw.parse().unwrap_or_else(|e: UnknownResponseMode| {
                tracing::warn!("{e}, falling back to structured");
                ResponseMode::Structured
            }),
            None => ResponseMode::Structured,
        };

        Self {
            bot_name,
            bot_api_url,
            response_mode,
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bot_name: DEFAULT_BOT_NAME.to_string(),
            bot_api_url: DEFAULT_BOT_API_URL.to_string(),
            response_mode: ResponseMode::Structured,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + '_ {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |key| map.get(key).map(|v| (*v).to_string())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = RelayConfig::from_lookup(lookup(&[]));
        assert_eq!(config.bot_name, DEFAULT_BOT_NAME);
        assert_eq!(config.bot_api_url, DEFAULT_BOT_API_URL);
        assert_eq!(config.response_mode, ResponseMode::Structured);
    }

    #[test]
    fn env_values_override_defaults() {
        let config = RelayConfig::from_lookup(lookup(&[
            ("BOT_NAME", "테스트봇"),
            ("BOT_API_URL", "http://127.0.0.1:9/bot"),
            ("BOT_RESPONSE_MODE", "raw"),
        ]));
        assert_eq!(config.bot_name, "테스트봇");
        assert_eq!(config.bot_api_url, "http://127.0.0.1:9/bot");
        assert_eq!(config.response_mode, ResponseMode::Raw);
    }

    #[test]
    fn unknown_response_mode_falls_back_to_structured() {
        let config = RelayConfig::from_lookup(lookup(&[("BOT_RESPONSE_MODE", "verbose")]));
        assert_eq!(config.response_mode, ResponseMode::Structured);
    }

    #[test]
    fn response_mode_parse_is_case_insensitive() {
        assert_eq!(
            "Structured".parse::<ResponseMode>().unwrap(),
            ResponseMode::Structured
        );
        assert_eq!("RAW".parse::<ResponseMode>().unwrap(), ResponseMode::Raw);
        assert_eq!(
            " raw ".parse::<ResponseMode>().unwrap(),
            ResponseMode::Raw
        );
        assert!("json".parse::<ResponseMode>().is_err());
    }

    #[test]
    fn response_mode_display_round_trips() {
        for mode in [ResponseMode::Structured, ResponseMode::Raw] {
            assert_eq!(mode.to_string().parse::<ResponseMode>().unwrap(), mode);
        }
    }
}
