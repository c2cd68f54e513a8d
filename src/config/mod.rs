// ABOUTME: Runtime configuration for pipedeploy, read from the environment and CLI flags.
// ABOUTME: Holds control-plane connection settings and wait options.

mod env_value;
mod wait;

pub use env_value::EnvValue;
pub use wait::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, WaitOptions};

use crate::client::HttpClient;
use crate::error::{Error, Result};

pub const URL_VAR: &str = "PIPEDEPLOY_URL";
pub const TOKEN_VAR: &str = "PIPEDEPLOY_TOKEN";
pub const NAMESPACE_VAR: &str = "PIPEDEPLOY_NAMESPACE";

/// Connection settings for the control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub url: String,
    pub token: Option<String>,
    pub namespace: Option<String>,
}

impl ClientConfig {
    /// Read settings from `PIPEDEPLOY_URL`, `PIPEDEPLOY_TOKEN` and
    /// `PIPEDEPLOY_NAMESPACE`. Only the URL is required.
    pub fn from_env() -> Result<Self> {
        let url = EnvValue::required(URL_VAR).resolve()?;
        if url.trim().is_empty() {
            return Err(Error::InvalidConfig(format!("{URL_VAR} cannot be empty")));
        }

        Ok(Self {
            url,
            token: EnvValue::optional(TOKEN_VAR).resolve_optional(),
            namespace: EnvValue::optional(NAMESPACE_VAR).resolve_optional(),
        })
    }

    /// Pick the namespace: the flag wins over the environment.
    pub fn namespace_or(&self, flag: Option<String>) -> Result<String> {
        flag.filter(|ns| !ns.is_empty())
            .or_else(|| self.namespace.clone())
            .ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "no namespace given: pass --namespace or set {NAMESPACE_VAR}"
                ))
            })
    }

    /// Build an HTTP client bound to `namespace`.
    pub fn client(&self, namespace: &str) -> Result<HttpClient> {
        let client = HttpClient::new(&self.url, namespace)?;
        Ok(match &self.token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_all_variables() {
        temp_env::with_vars(
            [
                (URL_VAR, Some("http://127.0.0.1:8080/api")),
                (TOKEN_VAR, Some("s3cret")),
                (NAMESPACE_VAR, Some("dev")),
            ],
            || {
                let config = ClientConfig::from_env().unwrap();
                assert_eq!(config.url, "http://127.0.0.1:8080/api");
                assert_eq!(config.token.as_deref(), Some("s3cret"));
                assert_eq!(config.namespace.as_deref(), Some("dev"));
            },
        );
    }

    #[test]
    fn missing_url_is_reported() {
        temp_env::with_vars_unset([URL_VAR, TOKEN_VAR, NAMESPACE_VAR], || {
            let err = ClientConfig::from_env().unwrap_err();
            assert!(matches!(err, Error::MissingEnvVar(ref var) if var == URL_VAR));
        });
    }

    #[test]
    fn empty_optional_values_are_ignored() {
        temp_env::with_vars(
            [
                (URL_VAR, Some("http://localhost")),
                (TOKEN_VAR, Some("")),
                (NAMESPACE_VAR, None),
            ],
            || {
                let config = ClientConfig::from_env().unwrap();
                assert_eq!(config.token, None);
                assert_eq!(config.namespace, None);
            },
        );
    }

    #[test]
    fn namespace_flag_wins() {
        let config = ClientConfig {
            url: "http://localhost".to_string(),
            token: None,
            namespace: Some("env-ns".to_string()),
        };
        assert_eq!(config.namespace_or(Some("flag-ns".to_string())).unwrap(), "flag-ns");
        assert_eq!(config.namespace_or(None).unwrap(), "env-ns");

        let bare = ClientConfig {
            namespace: None,
            ..config
        };
        assert!(bare.namespace_or(None).is_err());
    }

    #[test]
    fn client_rejects_https() {
        let config = ClientConfig {
            url: "https://localhost".to_string(),
            token: None,
            namespace: None,
        };
        assert!(config.client("dev").is_err());
    }
}
