use crate::profile::DriverProfile;
use crate::Result;
use std::collections::BTreeMap;
use std::net::{IpAddr, UdpSocket};
use std::path::Path;

/// Configuration key listing the comma-separated driver profile names.
pub const KEY_DRIVERS: &str = "drivers";
/// Configuration key for the base URL of the server under test.
pub const KEY_BASE_URL: &str = "config.baseUrl";
/// Placeholder in `config.baseUrl` replaced by the host's own address, so a
/// remote browser can reach the server running on this machine.
const LOCALHOST_TOKEN: &str = "$localhost";

/// Test harness settings loaded from a flat `key=value` properties source.
///
/// Constructed once at startup and passed by reference into the orchestrator
/// and driver factory; there is no process-wide singleton.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    properties: BTreeMap<String, String>,
}

impl TestConfig {
    /// Load configuration from a properties file.
    ///
    /// A missing file is not an error: it yields an empty configuration and
    /// callers fall back to their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no configuration file, using empty settings");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Parse configuration from properties text.
    ///
    /// Lines are `key=value`; blank lines and lines starting with `#` or `!`
    /// are skipped; keys and values are trimmed. A later occurrence of a key
    /// overrides an earlier one.
    pub fn parse(text: &str) -> Self {
        let mut properties = BTreeMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                properties.insert(key.trim().to_string(), value.trim().to_string());
            } else {
                tracing::debug!(line, "skipping malformed configuration line");
            }
        }
        Self { properties }
    }

    /// Raw property lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// The driver profiles defined in the configuration, in declaration order.
    ///
    /// The `drivers` key holds comma-separated profile names; every
    /// `<profile>.<option>` key is attributed to that profile with the prefix
    /// stripped:
    ///
    /// ```text
    /// drivers=ff,ie,hu_ff
    /// ie.remoteDriverUrl=http://grid:4444/wd/hub
    /// ```
    ///
    /// Returns an empty list when the `drivers` key is absent.
    pub fn driver_profiles(&self) -> Vec<DriverProfile> {
        let Some(drivers) = self.get(KEY_DRIVERS) else {
            return Vec::new();
        };

        let mut profiles = Vec::new();
        for name in drivers.split(',') {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let prefix = format!("{name}.");
            let options: BTreeMap<String, String> = self
                .properties
                .iter()
                .filter_map(|(key, value)| {
                    key.strip_prefix(&prefix)
                        .map(|option| (option.to_string(), value.clone()))
                })
                .collect();
            profiles.push(DriverProfile::with_options(name, options));
        }
        profiles
    }

    /// The configured base URL of the server under test, with the
    /// `$localhost` placeholder expanded to this host's address.
    pub fn server_url(&self) -> Option<String> {
        self.get(KEY_BASE_URL)
            .map(|value| expand_localhost(value, &host_address()))
    }

    /// Look up an option scoped to a profile, falling back to the unscoped
    /// key when the profile defines no override (or no profile is active).
    pub fn scoped_option(&self, profile: Option<&str>, key: &str) -> Option<&str> {
        if let Some(profile) = profile {
            if let Some(value) = self.get(&format!("{profile}.{key}")) {
                return Some(value);
            }
        }
        self.get(key)
    }
}

fn expand_localhost(value: &str, address: &str) -> String {
    if value.contains(LOCALHOST_TOKEN) {
        value.replace(LOCALHOST_TOKEN, address)
    } else {
        value.to_string()
    }
}

/// The first non-loopback IPv4 address of this host, or `localhost` when none
/// can be determined.
///
/// Uses a connected UDP socket to learn the outbound interface address; no
/// packet is actually sent.
fn host_address() -> String {
    fn probe() -> std::io::Result<IpAddr> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect("8.8.8.8:80")?;
        Ok(socket.local_addr()?.ip())
    }

    match probe() {
        Ok(IpAddr::V4(ip)) if !ip.is_loopback() => ip.to_string(),
        _ => "localhost".to_string(),
    }
}
