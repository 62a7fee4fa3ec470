use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// A transient user-facing message, shown once and not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of a user-initiated operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// State changed and was persisted.
    Applied { value: T, notice: Notice },
    /// The request was valid but changed nothing.
    Unchanged(Notice),
    /// The request was refused; state is untouched.
    Rejected(Notice),
}

impl<T> Outcome<T> {
    pub fn applied(value: T, notice: Notice) -> Self {
        Outcome::Applied { value, notice }
    }

    #[must_use]
    pub fn notice(&self) -> &Notice {
        match self {
            Outcome::Applied { notice, .. } | Outcome::Unchanged(notice) | Outcome::Rejected(notice) => {
                notice
            }
        }
    }

    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied { .. })
    }

    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Applied { value, .. } => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Applied { value, .. } => Some(value),
            _ => None,
        }
    }
}
