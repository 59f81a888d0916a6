//! End-to-end orchestrator behavior against a recording fake driver factory:
//! suite expansion, driver lifecycle across profile switches, retry and
//! not-yet-implemented semantics, filtering, and end-of-run cleanup.

use gauntlet_browser::{DriverFactory, DriverHandle};
use gauntlet_core::{DriverProfile, TestConfig};
use gauntlet_runner::{
    MultiBrowserRunner, NameFilter, Outcome, RunObserver, TestCase, TestId, TestSuite,
    WorksAlreadyError,
};
use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct FakeDriver {
    profile: String,
    log: EventLog,
}

impl DriverHandle for FakeDriver {
    fn goto(&mut self, _url: &str) -> gauntlet_browser::Result<()> {
        Ok(())
    }

    fn execute_script(
        &mut self,
        _script: &str,
        _args: Vec<Value>,
    ) -> gauntlet_browser::Result<Value> {
        Ok(Value::Null)
    }

    fn screenshot(&mut self) -> gauntlet_browser::Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn current_url(&mut self) -> gauntlet_browser::Result<String> {
        Ok("about:blank".to_string())
    }

    fn quit(&mut self) -> gauntlet_browser::Result<()> {
        self.log.push(format!("quit {}", self.profile));
        Ok(())
    }
}

#[derive(Default)]
struct FakeFactory {
    log: EventLog,
    fail_for: Option<String>,
}

impl DriverFactory for FakeFactory {
    fn build(&self, profile: &DriverProfile) -> gauntlet_browser::Result<Box<dyn DriverHandle>> {
        if self.fail_for.as_deref() == Some(profile.name()) {
            return Err(gauntlet_browser::Error::UnknownDriver(
                profile.name().to_string(),
            ));
        }
        self.log.push(format!("build {}", profile.name()));
        Ok(Box::new(FakeDriver {
            profile: profile.name().to_string(),
            log: self.log.clone(),
        }))
    }
}

struct RecordingObserver {
    log: EventLog,
}

impl RunObserver for RecordingObserver {
    fn test_started(&mut self, id: &TestId) {
        self.log.push(format!("started {id}"));
    }

    fn test_finished(&mut self, id: &TestId, failure: Option<&anyhow::Error>) {
        let verdict = if failure.is_some() { "failed" } else { "passed" };
        self.log.push(format!("finished {id} {verdict}"));
    }

    fn test_ignored(&mut self, id: &TestId, reason: &str) {
        self.log.push(format!("ignored {id} ({reason})"));
    }
}

fn runner_with(
    suite: TestSuite,
    config_text: &str,
    log: &EventLog,
) -> MultiBrowserRunner {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    MultiBrowserRunner::new(
        suite,
        Arc::new(TestConfig::parse(config_text)),
        Box::new(FakeFactory {
            log: log.clone(),
            fail_for: None,
        }),
    )
    .unwrap()
}

fn driver_using_case(name: &str) -> TestCase {
    TestCase::new(name, |ctx| {
        ctx.driver()?;
        Ok(())
    })
}

#[test]
fn test_expansion_produces_one_identity_per_method_and_profile() {
    let suite = TestSuite::new("session")
        .case(driver_using_case("login"))
        .case(driver_using_case("logout"));
    let log = EventLog::default();
    let runner = runner_with(suite, "drivers=FF,Chrome\n", &log);

    let names: Vec<String> = runner.test_ids().iter().map(TestId::display_name).collect();
    assert_eq!(
        names,
        vec!["login [FF]", "logout [FF]", "login [Chrome]", "logout [Chrome]"]
    );
}

#[test]
fn test_driver_reused_within_profile_and_swapped_between_profiles() {
    let suite = TestSuite::new("session")
        .case(driver_using_case("login"))
        .case(driver_using_case("logout"));
    let log = EventLog::default();
    let mut runner = runner_with(suite, "drivers=FF,Chrome\n", &log);

    let report = runner.run();
    assert!(report.is_success());
    assert_eq!(report.passed(), 4);

    // one build per profile, exactly one disposal per switch, final disposal
    // at end of suite; never a quit between two methods of the same profile
    assert_eq!(
        log.events(),
        vec!["build FF", "quit FF", "build Chrome", "quit Chrome"]
    );
}

#[test]
fn test_no_driver_built_for_tests_that_never_ask_for_one() {
    let suite = TestSuite::new("pure").case(TestCase::new("arithmetic", |_| Ok(())));
    let log = EventLog::default();
    let mut runner = runner_with(suite, "drivers=FF\n", &log);

    let report = runner.run();
    assert!(report.is_success());
    assert!(log.events().is_empty());
}

#[test]
fn test_end_of_suite_closes_handle_even_after_panic() {
    let suite = TestSuite::new("session")
        .case(TestCase::new("explodes", |ctx| {
            ctx.driver()?;
            panic!("browser state corrupted");
        }));
    let log = EventLog::default();
    let mut runner = runner_with(suite, "drivers=FF\n", &log);

    let report = runner.run();
    assert_eq!(report.failed(), 1);
    let failure = report.find("explodes [FF]").unwrap().outcome.failure().unwrap();
    assert!(failure.to_string().contains("browser state corrupted"));

    assert_eq!(log.events(), vec!["build FF", "quit FF"]);
    assert!(runner.context().current_driver().is_none());
}

#[test]
fn test_factory_failure_fails_the_test_but_not_the_run() {
    let suite = TestSuite::new("session").case(driver_using_case("login"));
    let log = EventLog::default();
    let mut runner = MultiBrowserRunner::new(
        suite,
        Arc::new(TestConfig::parse("drivers=Netscape,FF\n")),
        Box::new(FakeFactory {
            log: log.clone(),
            fail_for: Some("Netscape".to_string()),
        }),
    )
    .unwrap();

    let report = runner.run();
    assert_eq!(report.failed(), 1);
    assert_eq!(report.passed(), 1);
    assert!(report.find("login [FF]").unwrap().outcome.is_pass());
    assert_eq!(log.events(), vec!["build FF", "quit FF"]);
}

#[test]
fn test_retry_passes_on_third_attempt_with_single_pass_reported() {
    static ATTEMPTS: AtomicU32 = AtomicU32::new(0);
    let suite = TestSuite::new("flaky").case(
        TestCase::new("eventually_works", |_| {
            if ATTEMPTS.fetch_add(1, Ordering::SeqCst) < 2 {
                anyhow::bail!("transient failure");
            }
            Ok(())
        })
        .with_retry(3),
    );
    let log = EventLog::default();
    let mut runner = runner_with(suite, "drivers=FF\n", &log);

    let report = runner.run();
    assert_eq!(ATTEMPTS.load(Ordering::SeqCst), 3);
    assert_eq!(report.passed(), 1);
    assert_eq!(report.failed(), 0);
}

#[test]
fn test_retry_exhaustion_reports_only_the_last_failure() {
    static ATTEMPTS: AtomicU32 = AtomicU32::new(0);
    let suite = TestSuite::new("broken").case(
        TestCase::new("never_works", |_| {
            let attempt = ATTEMPTS.fetch_add(1, Ordering::SeqCst) + 1;
            anyhow::bail!("failure on attempt {attempt}")
        })
        .with_retry(3),
    );
    let log = EventLog::default();
    let mut runner = runner_with(suite, "drivers=FF\n", &log);

    let report = runner.run();
    assert_eq!(ATTEMPTS.load(Ordering::SeqCst), 3);
    assert_eq!(report.failed(), 1);

    let failure = report
        .find("never_works [FF]")
        .unwrap()
        .outcome
        .failure()
        .unwrap();
    assert_eq!(failure.to_string(), "failure on attempt 3");
}

#[test]
fn test_not_yet_implemented_failure_reports_as_pass() {
    let suite = TestSuite::new("pending").case(
        TestCase::new("upload", |_| anyhow::bail!("feature missing")).not_yet_implemented(),
    );
    let log = EventLog::default();
    let mut runner = runner_with(suite, "drivers=FF\n", &log);

    let report = runner.run();
    assert!(report.is_success());
    assert!(report.find("upload [FF] [NYI]").unwrap().outcome.is_pass());
}

#[test]
fn test_not_yet_implemented_pass_raises_works_already() {
    let suite = TestSuite::new("pending")
        .case(TestCase::new("upload", |_| Ok(())).not_yet_implemented());
    let log = EventLog::default();
    let mut runner = runner_with(suite, "drivers=FF\n", &log);

    let report = runner.run();
    assert_eq!(report.failed(), 1);
    let failure = report
        .find("upload [FF] [NYI]")
        .unwrap()
        .outcome
        .failure()
        .unwrap();
    assert!(failure.downcast_ref::<WorksAlreadyError>().is_some());
}

#[test]
fn test_filter_by_bare_name_selects_the_method_in_every_profile() {
    let suite = TestSuite::new("session")
        .case(driver_using_case("login"))
        .case(driver_using_case("logout"));
    let log = EventLog::default();
    let mut runner = runner_with(suite, "drivers=FF,Chrome\n", &log);

    runner.filter(&NameFilter::new("login")).unwrap();
    let names: Vec<String> = runner.test_ids().iter().map(TestId::display_name).collect();
    assert_eq!(names, vec!["login [FF]", "login [Chrome]"]);
}

#[test]
fn test_filter_by_suffixed_name_tolerates_emptied_children() {
    let suite = TestSuite::new("session")
        .case(driver_using_case("login"))
        .case(driver_using_case("logout"));
    let log = EventLog::default();
    let mut runner = runner_with(suite, "drivers=FF,Chrome\n", &log);

    // empties the Chrome child entirely, which is fine
    runner.filter(&NameFilter::new("login [FF]")).unwrap();
    let names: Vec<String> = runner.test_ids().iter().map(TestId::display_name).collect();
    assert_eq!(names, vec!["login [FF]"]);

    let report = runner.run();
    assert_eq!(report.passed(), 1);
    assert_eq!(log.events(), vec!["build FF", "quit FF"]);
}

#[test]
fn test_filter_matching_nothing_anywhere_is_an_error() {
    let suite = TestSuite::new("session").case(driver_using_case("login"));
    let log = EventLog::default();
    let mut runner = runner_with(suite, "drivers=FF,Chrome\n", &log);

    let err = runner.filter(&NameFilter::new("no_such_test")).unwrap_err();
    assert!(matches!(err, gauntlet_runner::Error::NoTestsRemain));
}

#[test]
fn test_ignored_test_is_reported_without_touching_the_driver() {
    let suite = TestSuite::new("session")
        .case(driver_using_case("login").ignored("blocked by server bug 1234"))
        .case(driver_using_case("logout"));
    let log = EventLog::default();
    let observer_log = EventLog::default();
    let mut runner = runner_with(suite, "drivers=FF\n", &log);
    runner.add_observer(Box::new(RecordingObserver {
        log: observer_log.clone(),
    }));

    let report = runner.run();
    assert_eq!(report.ignored(), 1);
    assert_eq!(report.passed(), 1);
    assert!(matches!(
        report.find("login [FF]").unwrap().outcome,
        Outcome::Ignored(_)
    ));

    // the driver was only ever built for the test that ran
    assert_eq!(log.events(), vec!["build FF", "quit FF"]);
    assert_eq!(
        observer_log.events(),
        vec![
            "ignored login [FF] (blocked by server bug 1234)",
            "started logout [FF]",
            "finished logout [FF] passed",
        ]
    );
}
