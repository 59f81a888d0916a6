use crate::suite::TestId;
use std::fmt;

/// Terminal state of one executed test identity.
#[derive(Debug)]
pub enum Outcome {
    Passed,
    Failed(anyhow::Error),
    Ignored(String),
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    pub fn failure(&self) -> Option<&anyhow::Error> {
        match self {
            Outcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct TestResult {
    pub id: TestId,
    pub outcome: Outcome,
}

/// The collected results of a whole multi-browser run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub results: Vec<TestResult>,
}

impl RunReport {
    pub(crate) fn record(&mut self, id: TestId, outcome: Outcome) {
        self.results.push(TestResult { id, outcome });
    }

    pub fn passed(&self) -> usize {
        self.results
            .iter()
            .filter(|result| result.outcome.is_pass())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|result| matches!(result.outcome, Outcome::Failed(_)))
            .count()
    }

    pub fn ignored(&self) -> usize {
        self.results
            .iter()
            .filter(|result| matches!(result.outcome, Outcome::Ignored(_)))
            .count()
    }

    /// Whether every non-ignored test passed.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Find a result by its display name.
    pub fn find(&self, display_name: &str) -> Option<&TestResult> {
        self.results
            .iter()
            .find(|result| result.id.display_name() == display_name)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} run, {} passed, {} failed, {} ignored",
            self.results.len(),
            self.passed(),
            self.failed(),
            self.ignored()
        )
    }
}
