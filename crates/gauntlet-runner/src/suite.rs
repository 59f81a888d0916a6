use crate::context::ExecutionContext;
use std::fmt;

/// A registered test body. Receives the shared execution context, through
/// which it reaches the driver positioned for its profile.
pub type TestFn = Box<dyn Fn(&mut ExecutionContext) -> anyhow::Result<()>>;

/// Per-test metadata attached at registration time.
///
/// This replaces runtime annotation introspection: retry counts and the
/// not-yet-implemented marker are plain data on the test case.
#[derive(Debug, Clone)]
pub struct TestMeta {
    /// Number of attempts; the test fails only if all of them fail.
    pub retry: u32,
    /// Inverts the outcome: a failure passes, a pass raises
    /// [`WorksAlreadyError`](crate::WorksAlreadyError).
    pub not_yet_implemented: bool,
    /// Skip the test entirely, with a reason.
    pub ignored: Option<String>,
}

impl Default for TestMeta {
    fn default() -> Self {
        Self {
            retry: 1,
            not_yet_implemented: false,
            ignored: None,
        }
    }
}

/// One logical test method: a name, its metadata, and its body.
pub struct TestCase {
    pub(crate) name: String,
    pub(crate) meta: TestMeta,
    pub(crate) body: TestFn,
}

impl TestCase {
    pub fn new(
        name: impl Into<String>,
        body: impl Fn(&mut ExecutionContext) -> anyhow::Result<()> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            meta: TestMeta::default(),
            body: Box::new(body),
        }
    }

    /// Run the test up to `attempts` times, passing on the first success.
    pub fn with_retry(mut self, attempts: u32) -> Self {
        self.meta.retry = attempts.max(1);
        self
    }

    /// Mark the test as expected to fail until the functionality exists.
    pub fn not_yet_implemented(mut self) -> Self {
        self.meta.not_yet_implemented = true;
        self
    }

    /// Skip the test, recording the reason.
    pub fn ignored(mut self, reason: impl Into<String>) -> Self {
        self.meta.ignored = Some(reason.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(&self) -> &TestMeta {
        &self.meta
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// An ordered collection of test cases sharing one logical subject,
/// the moral equivalent of a test class.
#[derive(Debug, Default)]
pub struct TestSuite {
    name: String,
    pub(crate) cases: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
        }
    }

    /// Add a case, builder style.
    pub fn case(mut self, case: TestCase) -> Self {
        self.cases.push(case);
        self
    }

    pub fn add(&mut self, case: TestCase) {
        self.cases.push(case);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }
}

/// A test method bound to the profile it runs under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestId {
    pub method: String,
    pub profile: String,
    pub not_yet_implemented: bool,
}

impl TestId {
    pub fn new(method: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            profile: profile.into(),
            not_yet_implemented: false,
        }
    }

    /// The display name, unique across profiles: `method [profile]`, with a
    /// trailing ` [NYI]` marker for not-yet-implemented tests.
    pub fn display_name(&self) -> String {
        let marker = if self.not_yet_implemented { " [NYI]" } else { "" };
        format!("{} [{}]{}", self.method, self.profile, marker)
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}
