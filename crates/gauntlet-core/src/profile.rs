use std::collections::BTreeMap;

/// Option key for the path to a local browser binary.
pub const KEY_BINARY: &str = "bin";
/// Option key for a remote WebDriver hub endpoint. Its presence makes the
/// profile a remote one.
pub const KEY_REMOTE_URL: &str = "remoteDriverUrl";
/// Option key overriding the local WebDriver endpoint (chromedriver /
/// geckodriver) for this profile.
pub const KEY_WEBDRIVER_URL: &str = "webdriverUrl";
/// Option key for the per-profile test resource folder.
pub const KEY_RESOURCE_FOLDER: &str = "resourceFolder";

/// A named browser/automation target with its per-profile options.
///
/// One instance exists per configured browser (e.g. `FF`, `Chrome`, `HU_IE`),
/// built from configuration at startup. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverProfile {
    name: String,
    options: BTreeMap<String, String>,
}

impl DriverProfile {
    /// Create a profile with no options.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: BTreeMap::new(),
        }
    }

    /// Create a profile with the given option map.
    pub fn with_options(name: impl Into<String>, options: BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a raw option value.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// The remote WebDriver hub endpoint, if this is a remote profile.
    pub fn remote_url(&self) -> Option<&str> {
        self.option(KEY_REMOTE_URL)
    }

    /// The local browser binary path, if configured.
    pub fn binary(&self) -> Option<&str> {
        self.option(KEY_BINARY)
    }

    /// Whether this profile names a Firefox family browser (`FF`, `FF_38`, ...).
    pub fn is_firefox(&self) -> bool {
        self.name.to_ascii_uppercase().starts_with("FF")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firefox_family_matches_name_prefix() {
        assert!(DriverProfile::new("FF").is_firefox());
        assert!(DriverProfile::new("ff_esr").is_firefox());
        assert!(!DriverProfile::new("Chrome").is_firefox());
        // headless profiles are not local Firefox even though they emulate it
        assert!(!DriverProfile::new("HU_FF").is_firefox());
    }

    #[test]
    fn test_option_lookup() {
        let mut options = BTreeMap::new();
        options.insert(KEY_BINARY.to_string(), "/opt/firefox/firefox".to_string());
        let profile = DriverProfile::with_options("FF", options);

        assert_eq!(profile.binary(), Some("/opt/firefox/firefox"));
        assert_eq!(profile.remote_url(), None);
    }
}
