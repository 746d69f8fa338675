/// The subset of an app metadata record the update trigger looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRecord {
    pub app_id: String,
    pub name: String,
    pub version: String,
    pub icon: Option<String>,
}

/// An update event on an app metadata record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppChange {
    pub before: AppRecord,
    pub after: AppRecord,
}

impl AppChange {
    /// Only the version attribute matters; edits to other fields never fire a notification.
    #[must_use]
    pub fn version_changed(&self) -> bool {
        self.before.version != self.after.version
    }
}
