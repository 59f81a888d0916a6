use crate::{Error, Result};
use serde_json::{json, Map, Value};
use std::path::Path;

pub(crate) type Capabilities = Map<String, Value>;

/// Capabilities for a remote WebDriver session, inferred from the profile
/// name. Families without a known remote mapping (notably the in-process
/// headless profiles) are rejected with a distinct error.
pub(crate) fn remote_capabilities(profile_name: &str) -> Result<Capabilities> {
    let browser_name = if is_firefox_family(profile_name) {
        "firefox"
    } else if profile_name.eq_ignore_ascii_case("chrome") {
        "chrome"
    } else if profile_name.eq_ignore_ascii_case("ie") {
        "internet explorer"
    } else {
        return Err(Error::RemoteUnsupported(profile_name.to_string()));
    };

    let mut caps = Capabilities::new();
    caps.insert("browserName".to_string(), json!(browser_name));
    Ok(caps)
}

pub(crate) fn chrome_capabilities() -> Capabilities {
    let mut caps = Capabilities::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps
}

pub(crate) fn ie_capabilities() -> Capabilities {
    let mut caps = Capabilities::new();
    caps.insert("browserName".to_string(), json!("internet explorer"));
    caps
}

/// Capabilities for a local Firefox session.
///
/// Points `browser.bookmarks.file` at an empty bookmarks file so the browser
/// does not fetch the RSS feeds referenced by its default bookmarks on
/// startup.
pub(crate) fn firefox_capabilities(binary: Option<&str>, bookmarks_file: &Path) -> Capabilities {
    let mut firefox_options = Map::new();
    if let Some(binary) = binary {
        firefox_options.insert("binary".to_string(), json!(binary));
    }
    firefox_options.insert(
        "prefs".to_string(),
        json!({ "browser.bookmarks.file": bookmarks_file.display().to_string() }),
    );

    let mut caps = Capabilities::new();
    caps.insert("browserName".to_string(), json!("firefox"));
    caps.insert("moz:firefoxOptions".to_string(), Value::Object(firefox_options));
    caps
}

fn is_firefox_family(name: &str) -> bool {
    name.to_ascii_uppercase().starts_with("FF")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_remote_capabilities_known_families() {
        assert_eq!(
            remote_capabilities("FF").unwrap()["browserName"],
            json!("firefox")
        );
        assert_eq!(
            remote_capabilities("chrome").unwrap()["browserName"],
            json!("chrome")
        );
        assert_eq!(
            remote_capabilities("IE").unwrap()["browserName"],
            json!("internet explorer")
        );
    }

    #[test]
    fn test_remote_capabilities_rejects_unmapped_family() {
        let err = remote_capabilities("HU_FF").unwrap_err();
        assert!(matches!(err, Error::RemoteUnsupported(name) if name == "HU_FF"));
    }

    #[test]
    fn test_firefox_capabilities_sets_bookmarks_pref() {
        let caps = firefox_capabilities(None, &PathBuf::from("/tmp/empty-bookmarks.html"));

        let prefs = &caps["moz:firefoxOptions"]["prefs"];
        assert_eq!(
            prefs["browser.bookmarks.file"],
            json!("/tmp/empty-bookmarks.html")
        );
        assert!(caps["moz:firefoxOptions"].get("binary").is_none());
    }

    #[test]
    fn test_firefox_capabilities_with_binary() {
        let caps = firefox_capabilities(
            Some("/opt/firefox/firefox"),
            &PathBuf::from("/tmp/bookmarks.html"),
        );
        assert_eq!(
            caps["moz:firefoxOptions"]["binary"],
            json!("/opt/firefox/firefox")
        );
    }
}
