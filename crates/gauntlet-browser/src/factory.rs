use crate::capabilities;
use crate::handle::{DriverFactory, DriverHandle};
use crate::headless::{EmulatedBrowser, HeadlessSession};
use crate::webdriver::WebDriverSession;
use crate::{Error, Result};
use gauntlet_core::profile::KEY_WEBDRIVER_URL;
use gauntlet_core::DriverProfile;
use std::io::Write;
use tempfile::NamedTempFile;
use url::Url;

/// Default chromedriver endpoint.
pub const DEFAULT_CHROMEDRIVER_URL: &str = "http://localhost:9515";
/// Default geckodriver endpoint.
pub const DEFAULT_GECKODRIVER_URL: &str = "http://localhost:4444";
/// Default IEDriverServer endpoint.
pub const DEFAULT_IEDRIVER_URL: &str = "http://localhost:5555";

/// The standard [`DriverFactory`]: dispatches on the profile name.
///
/// Precedence: a profile carrying a `remoteDriverUrl` option always becomes
/// a remote session; otherwise known local families are matched by name
/// (case-insensitive), and anything else is an unknown driver.
pub struct GauntletDriverFactory;

impl DriverFactory for GauntletDriverFactory {
    fn build(&self, profile: &DriverProfile) -> Result<Box<dyn DriverHandle>> {
        let name = profile.name();

        if let Some(raw_url) = profile.remote_url() {
            let capabilities = capabilities::remote_capabilities(name)?;
            let url = Url::parse(raw_url).map_err(|source| Error::InvalidRemoteUrl {
                url: raw_url.to_string(),
                source,
            })?;
            tracing::info!(profile = name, endpoint = %url, "building remote driver");
            let session = WebDriverSession::connect(url.as_str(), capabilities)?;
            return Ok(Box::new(session));
        }

        if name.eq_ignore_ascii_case("chrome") {
            let session = WebDriverSession::connect(
                endpoint(profile, DEFAULT_CHROMEDRIVER_URL),
                capabilities::chrome_capabilities(),
            )?;
            Ok(Box::new(session))
        } else if name.eq_ignore_ascii_case("hu_ff") {
            Ok(Box::new(HeadlessSession::launch(EmulatedBrowser::Firefox)?))
        } else if name.eq_ignore_ascii_case("hu_ie") {
            Ok(Box::new(HeadlessSession::launch(
                EmulatedBrowser::InternetExplorer,
            )?))
        } else if profile.is_firefox() {
            let bookmarks = empty_bookmarks_file()?;
            let capabilities =
                capabilities::firefox_capabilities(profile.binary(), bookmarks.path());
            let session = WebDriverSession::connect_with_bookmarks(
                endpoint(profile, DEFAULT_GECKODRIVER_URL),
                capabilities,
                Some(bookmarks),
            )?;
            Ok(Box::new(session))
        } else if name.eq_ignore_ascii_case("ie") {
            let session = WebDriverSession::connect(
                endpoint(profile, DEFAULT_IEDRIVER_URL),
                capabilities::ie_capabilities(),
            )?;
            Ok(Box::new(session))
        } else {
            Err(Error::UnknownDriver(name.to_string()))
        }
    }
}

fn endpoint<'a>(profile: &'a DriverProfile, default: &'a str) -> &'a str {
    profile.option(KEY_WEBDRIVER_URL).unwrap_or(default)
}

/// An empty bookmarks page, so Firefox does not fetch the feeds referenced
/// by its default bookmarks on startup. The file lives as long as the
/// session that uses it.
fn empty_bookmarks_file() -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("empty-bookmarks")
        .suffix(".html")
        .tempfile()?;
    file.write_all(b"<!DOCTYPE html><html><head><title>Bookmarks</title></head><body></body></html>")?;
    file.flush()?;
    Ok(file)
}
