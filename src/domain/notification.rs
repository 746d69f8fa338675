use std::collections::BTreeMap;

/// Values of the `type` data field understood by the client.
pub mod message_type {
    pub const APP_DOWNLOAD_AVAILABLE: &str = "APP_DOWNLOAD_AVAILABLE";
    pub const DOWNLOAD_PROGRESS: &str = "DOWNLOAD_PROGRESS";
    pub const TEST: &str = "TEST";
}

/// Delivery priority hint passed through to the push provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    #[default]
    Normal,
    High,
}

impl Priority {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

/// The content of one notification.
///
/// Built once per send through [`PayloadBuilder`] and never mutated afterwards. The data map is flat and
/// string-valued because provider transports only carry string key/value pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    title: String,
    body: String,
    icon: Option<String>,
    data: BTreeMap<String, String>,
    priority: Priority,
}

impl NotificationPayload {
    #[must_use]
    pub fn builder(title: impl Into<String>, body: impl Into<String>) -> PayloadBuilder {
        PayloadBuilder {
            payload: Self {
                title: title.into(),
                body: body.into(),
                icon: None,
                data: BTreeMap::new(),
                priority: Priority::default(),
            },
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    #[must_use]
    pub const fn data(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Shortcut for the `type` data field.
    #[must_use]
    pub fn message_type(&self) -> Option<&str> {
        self.data.get("type").map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    payload: NotificationPayload,
}

impl PayloadBuilder {
    #[must_use]
    pub fn icon(mut self, icon: Option<impl Into<String>>) -> Self {
        self.payload.icon = icon.map(Into::into).filter(|i: &String| !i.is_empty());
        self
    }

    #[must_use]
    pub fn data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload.data.insert(key.into(), value.into());
        self
    }

    /// Adds a data entry only when a value is present.
    #[must_use]
    pub fn data_opt(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.data(key, value),
            None => self,
        }
    }

    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.payload.priority = priority;
        self
    }

    #[must_use]
    pub fn build(self) -> NotificationPayload {
        self.payload
    }
}
