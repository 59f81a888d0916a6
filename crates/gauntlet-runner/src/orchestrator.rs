use crate::context::ExecutionContext;
use crate::decorate;
use crate::error::{Error, Result};
use crate::filter::NameFilter;
use crate::observer::RunObserver;
use crate::report::{Outcome, RunReport};
use crate::suite::{TestId, TestSuite};
use gauntlet_browser::DriverFactory;
use gauntlet_core::config::KEY_DRIVERS;
use gauntlet_core::{DriverProfile, TestConfig};
use std::sync::Arc;

/// Profiles assumed when the configuration defines none: the browsers that
/// may be available on any OS.
const DEFAULT_PROFILES: [&str; 4] = ["FF", "Chrome", "HU_FF", "HU_IE"];

/// Expands one logical test suite into one run per configured browser
/// profile and drives the shared execution context through it.
pub struct MultiBrowserRunner {
    suite: TestSuite,
    children: Vec<ProfileChild>,
    context: ExecutionContext,
    observers: Vec<Box<dyn RunObserver>>,
}

impl std::fmt::Debug for MultiBrowserRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiBrowserRunner").finish_non_exhaustive()
    }
}

/// One per-profile view of the suite: the profile plus the indices of the
/// cases still selected after filtering.
struct ProfileChild {
    profile: DriverProfile,
    selected: Vec<usize>,
}

impl MultiBrowserRunner {
    /// Build a runner for the suite against the configured profiles.
    ///
    /// An absent `drivers` key falls back to the default profile set (`FF`,
    /// `Chrome`, `HU_FF`, `HU_IE`); a present but empty one is a
    /// configuration error: the suite cannot run.
    pub fn new(
        suite: TestSuite,
        config: Arc<TestConfig>,
        factory: Box<dyn DriverFactory>,
    ) -> Result<Self> {
        let mut profiles = config.driver_profiles();
        if profiles.is_empty() && config.get(KEY_DRIVERS).is_none() {
            profiles = DEFAULT_PROFILES
                .into_iter()
                .map(DriverProfile::new)
                .collect();
        }
        if profiles.is_empty() {
            return Err(Error::NoDriversConfigured);
        }

        let selected: Vec<usize> = (0..suite.cases.len()).collect();
        let children = profiles
            .into_iter()
            .map(|profile| ProfileChild {
                profile,
                selected: selected.clone(),
            })
            .collect();

        Ok(Self {
            suite,
            children,
            context: ExecutionContext::new(config, factory),
            observers: Vec::new(),
        })
    }

    pub fn with_observer(mut self, observer: Box<dyn RunObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn RunObserver>) {
        self.observers.push(observer);
    }

    /// Every test identity this runner would execute, in run order.
    pub fn test_ids(&self) -> Vec<TestId> {
        self.children
            .iter()
            .flat_map(|child| {
                child
                    .selected
                    .iter()
                    .map(|&index| id_for(&self.suite, &child.profile, index))
            })
            .collect()
    }

    /// Keep only the tests the filter selects.
    ///
    /// Applied per profile child; a child left with no tests is tolerated as
    /// long as at least one child still has matches (a profile-suffixed
    /// pattern legitimately empties every other child).
    pub fn filter(&mut self, filter: &NameFilter) -> Result<()> {
        let suite = &self.suite;
        let mut any_remaining = false;
        for child in &mut self.children {
            child
                .selected
                .retain(|&index| filter.matches(&id_for(suite, &child.profile, index)));
            any_remaining |= !child.selected.is_empty();
        }
        if any_remaining {
            Ok(())
        } else {
            Err(Error::NoTestsRemain)
        }
    }

    /// Run every selected test under every profile, sequentially.
    ///
    /// The driver handle is positioned before each test and reused across
    /// consecutive tests of the same profile; whatever happens, the active
    /// handle is closed when the composed run is over.
    pub fn run(&mut self) -> RunReport {
        let Self {
            suite,
            children,
            context,
            observers,
        } = self;

        tracing::info!(
            suite = suite.name(),
            profiles = children.len(),
            "running suite"
        );

        let mut report = RunReport::default();
        for child in children.iter() {
            for &index in &child.selected {
                let case = &suite.cases[index];
                let id = id_for(suite, &child.profile, index);

                if let Some(reason) = &case.meta.ignored {
                    for observer in observers.iter_mut() {
                        observer.test_ignored(&id, reason);
                    }
                    report.record(id, Outcome::Ignored(reason.clone()));
                    continue;
                }

                context.set_next_profile(child.profile.clone());
                for observer in observers.iter_mut() {
                    observer.test_started(&id);
                }

                let result = decorate::execute(&id, case, context);

                for observer in observers.iter_mut() {
                    observer.test_finished(&id, result.as_ref().err());
                }
                let outcome = match result {
                    Ok(()) => Outcome::Passed,
                    Err(err) => Outcome::Failed(err),
                };
                report.record(id, outcome);
            }
        }

        context.close_quietly();
        tracing::info!(%report, "suite finished");
        report
    }

    /// The shared execution context, for inspection between runs.
    pub fn context(&mut self) -> &mut ExecutionContext {
        &mut self.context
    }
}

fn id_for(suite: &TestSuite, profile: &DriverProfile, index: usize) -> TestId {
    let case = &suite.cases[index];
    TestId {
        method: case.name.clone(),
        profile: profile.name().to_string(),
        not_yet_implemented: case.meta.not_yet_implemented,
    }
}
