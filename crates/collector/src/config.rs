// Driver configuration
//
// Selecting how the browser session is obtained used to be an inline
// environment-conditional branch; it is now an explicit enum resolved
// once at startup.

use crate::error::{Error, Result};
use url::Url;

/// How the collector obtains a browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverConfig {
    /// Launch an installed browser with a fresh throwaway profile.
    ///
    /// This is the default and what CI should use: every session starts
    /// from a clean scratch directory that is removed on teardown.
    LocalInstall,

    /// Launch an installed browser with a named persistent profile.
    ///
    /// The profile directory is created under the collector's data
    /// directory on first use and reused across sessions.
    LocalProfile { name: String },

    /// Attach to an already-running browser's DevTools endpoint.
    Remote { endpoint: String },
}

impl DriverConfig {
    /// Resolves the driver configuration from the environment.
    ///
    /// `JS_COLLECTOR_DRIVER` selects the mode: `local-install` (the
    /// default when unset), `local-profile` or `remote`. The payload
    /// variables `JS_COLLECTOR_PROFILE` and `JS_COLLECTOR_REMOTE_URL`
    /// are required by their respective modes. Unknown modes and
    /// missing payloads are configuration errors, not fallbacks.
    pub fn from_env() -> Result<Self> {
        let mode = std::env::var("JS_COLLECTOR_DRIVER").ok();
        let profile = std::env::var("JS_COLLECTOR_PROFILE").ok();
        let remote = std::env::var("JS_COLLECTOR_REMOTE_URL").ok();
        Self::resolve(mode.as_deref(), profile.as_deref(), remote.as_deref())
    }

    /// Resolves a configuration from already-read settings.
    ///
    /// Split out of [`DriverConfig::from_env`] so resolution rules can
    /// be tested without mutating process environment.
    pub fn resolve(
        mode: Option<&str>,
        profile: Option<&str>,
        remote: Option<&str>,
    ) -> Result<Self> {
        match mode {
            None | Some("local-install") => Ok(DriverConfig::LocalInstall),
            Some("local-profile") => {
                let name = profile.filter(|p| !p.is_empty()).ok_or_else(|| {
                    Error::Config(
                        "driver mode 'local-profile' requires JS_COLLECTOR_PROFILE".to_string(),
                    )
                })?;
                Ok(DriverConfig::LocalProfile {
                    name: name.to_string(),
                })
            }
            Some("remote") => {
                let endpoint = remote.filter(|r| !r.is_empty()).ok_or_else(|| {
                    Error::Config(
                        "driver mode 'remote' requires JS_COLLECTOR_REMOTE_URL".to_string(),
                    )
                })?;
                let parsed = Url::parse(endpoint)
                    .map_err(|e| Error::Config(format!("invalid remote URL '{endpoint}': {e}")))?;
                if parsed.scheme() != "ws" && parsed.scheme() != "wss" {
                    return Err(Error::Config(format!(
                        "remote URL '{endpoint}' must use the ws:// or wss:// scheme"
                    )));
                }
                Ok(DriverConfig::Remote {
                    endpoint: endpoint.to_string(),
                })
            }
            Some(other) => Err(Error::Config(format!(
                "unknown driver mode '{other}' (expected local-install, local-profile or remote)"
            ))),
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig::LocalInstall
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_mode_defaults_to_local_install() {
        let config = DriverConfig::resolve(None, None, None).unwrap();
        assert_eq!(config, DriverConfig::LocalInstall);
    }

    #[test]
    fn test_explicit_local_install() {
        let config = DriverConfig::resolve(Some("local-install"), None, None).unwrap();
        assert_eq!(config, DriverConfig::LocalInstall);
    }

    #[test]
    fn test_local_profile_requires_name() {
        let err = DriverConfig::resolve(Some("local-profile"), None, None).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got: {err:?}");

        let config =
            DriverConfig::resolve(Some("local-profile"), Some("SELENIUM"), None).unwrap();
        assert_eq!(
            config,
            DriverConfig::LocalProfile {
                name: "SELENIUM".to_string()
            }
        );
    }

    #[test]
    fn test_remote_requires_ws_url() {
        let err = DriverConfig::resolve(Some("remote"), None, None).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got: {err:?}");

        let err =
            DriverConfig::resolve(Some("remote"), None, Some("http://localhost:9222")).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got: {err:?}");

        let config = DriverConfig::resolve(
            Some("remote"),
            None,
            Some("ws://127.0.0.1:9222/devtools/browser/abc"),
        )
        .unwrap();
        assert_eq!(
            config,
            DriverConfig::Remote {
                endpoint: "ws://127.0.0.1:9222/devtools/browser/abc".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_mode_is_an_error() {
        let err = DriverConfig::resolve(Some("grid"), None, None).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got: {err:?}");
    }

    #[test]
    fn test_empty_payloads_are_missing() {
        let err = DriverConfig::resolve(Some("local-profile"), Some(""), None).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got: {err:?}");
    }
}
