use crate::Result;
use gauntlet_core::DriverProfile;
use serde_json::Value;

/// An open session to a browser instance.
///
/// Operations are synchronous blocking calls: test execution is strictly
/// sequential and there is never more than one active session per process.
/// Implementations backed by async clients own their runtime internally.
pub trait DriverHandle {
    /// Navigate to the given URL.
    fn goto(&mut self, url: &str) -> Result<()>;

    /// Execute a JavaScript snippet in the page.
    ///
    /// The script body sees its arguments through the conventional
    /// `arguments` array and may `return` a JSON-serializable value.
    fn execute_script(&mut self, script: &str, args: Vec<Value>) -> Result<Value>;

    /// Capture a PNG screenshot of the current page.
    fn screenshot(&mut self) -> Result<Vec<u8>>;

    /// The URL the browser is currently on.
    fn current_url(&mut self) -> Result<String>;

    /// End the session and release the browser.
    ///
    /// Idempotent: quitting an already-closed session is a no-op.
    fn quit(&mut self) -> Result<()>;
}

impl std::fmt::Debug for dyn DriverHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn DriverHandle")
    }
}

/// Builds a concrete [`DriverHandle`] for a profile.
///
/// The execution context only ever talks to this seam, so tests can swap in
/// a recording fake instead of a real browser.
pub trait DriverFactory {
    fn build(&self, profile: &DriverProfile) -> Result<Box<dyn DriverHandle>>;
}
