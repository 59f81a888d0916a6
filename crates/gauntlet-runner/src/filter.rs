use crate::suite::TestId;

/// Selects tests by name for "run only this test" workflows.
///
/// External tools supply either form depending on where the re-run was
/// triggered from, so a pattern matches when it equals the bare method name
/// or the full profile-suffixed display name.
#[derive(Debug, Clone)]
pub struct NameFilter {
    pattern: String,
}

impl NameFilter {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn matches(&self, id: &TestId) -> bool {
        self.pattern == id.method || self.pattern == id.display_name()
    }
}
