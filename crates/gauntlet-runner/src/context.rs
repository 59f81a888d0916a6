use gauntlet_browser::{DriverFactory, DriverHandle};
use gauntlet_core::profile::KEY_RESOURCE_FOLDER;
use gauntlet_core::{DriverProfile, TestConfig};
use std::sync::Arc;

/// Owns the single active driver handle of the test process.
///
/// The orchestrator points the context at the profile of the upcoming test;
/// the handle itself is built lazily on first use and reused across
/// consecutive tests of the same profile. Switching profiles always closes
/// the previous handle before building the new one.
pub struct ExecutionContext {
    config: Arc<TestConfig>,
    factory: Box<dyn DriverFactory>,
    active: Option<ActiveDriver>,
    next_profile: Option<DriverProfile>,
}

struct ActiveDriver {
    profile: DriverProfile,
    handle: Box<dyn DriverHandle>,
}

impl ExecutionContext {
    pub fn new(config: Arc<TestConfig>, factory: Box<dyn DriverFactory>) -> Self {
        Self {
            config,
            factory,
            active: None,
            next_profile: None,
        }
    }

    /// Select the profile the next [`driver`](Self::driver) call must serve.
    pub(crate) fn set_next_profile(&mut self, profile: DriverProfile) {
        self.next_profile = Some(profile);
    }

    /// The driver for the current test, building or swapping as needed.
    ///
    /// Invariant: the returned handle always corresponds to the most
    /// recently selected profile.
    pub fn driver(&mut self) -> gauntlet_browser::Result<&mut dyn DriverHandle> {
        let wanted = self.next_profile.clone().ok_or_else(|| {
            gauntlet_browser::Error::Session(
                "no driver profile selected for the current test".to_string(),
            )
        })?;

        let reusable = self
            .active
            .as_ref()
            .is_some_and(|active| active.profile.name() == wanted.name());
        if !reusable {
            self.close_quietly();
            tracing::info!(profile = wanted.name(), "building driver");
            let handle = self.factory.build(&wanted)?;
            self.active = Some(ActiveDriver {
                profile: wanted,
                handle,
            });
        }

        let active = self.active.as_mut().ok_or_else(|| {
            gauntlet_browser::Error::Session("driver slot unexpectedly empty".to_string())
        })?;
        Ok(active.handle.as_mut())
    }

    /// The active driver, if one exists. Never creates one.
    pub fn current_driver(&mut self) -> Option<&mut (dyn DriverHandle + '_)> {
        self.active.as_mut().map(|active| &mut *active.handle as _)
    }

    /// The profile whose driver is currently active, if any.
    pub fn active_profile(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.profile.name())
    }

    /// Quit the active driver, if any, and clear the slot.
    ///
    /// Close errors are logged and swallowed: when a test timed out
    /// mid-command the session may already be unusable, and there is nothing
    /// better to do than move on.
    pub fn close_quietly(&mut self) {
        if let Some(mut active) = self.active.take() {
            if let Err(e) = active.handle.quit() {
                tracing::warn!(
                    profile = active.profile.name(),
                    error = %e,
                    "error quitting driver"
                );
            }
        }
    }

    /// The test resource folder for the active profile, falling back to the
    /// unscoped `resourceFolder` setting.
    pub fn resource_folder(&self) -> Option<&str> {
        self.config
            .scoped_option(self.active_profile(), KEY_RESOURCE_FOLDER)
    }

    pub fn config(&self) -> &TestConfig {
        &self.config
    }
}
