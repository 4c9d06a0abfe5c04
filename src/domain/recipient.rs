use crate::error::SendError;

/// Concrete dispatch target resolved from free-text input. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientTarget {
    ByAddress(String),
    ByHandle(String),
}

impl RecipientTarget {
    /// Classifies raw input: `@` plus at least one character is a handle,
    /// any other non-empty input is an address, everything else is invalid.
    pub fn classify(input: &str) -> Result<Self, SendError> {
        if input.is_empty() {
            return Err(SendError::InvalidRecipient(input.to_string()));
        }
        match input.strip_prefix('@') {
            Some("") => Err(SendError::InvalidRecipient(input.to_string())),
            Some(handle) => Ok(Self::ByHandle(handle.to_string())),
            None => Ok(Self::ByAddress(input.to_string())),
        }
    }

    /// The recipient as it appears in a dispatch request.
    pub fn dispatch_key(&self) -> &str {
        match self {
            Self::ByAddress(address) => address,
            Self::ByHandle(handle) => handle,
        }
    }
}

/// The set of known handles, replaced wholesale on each directory poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySnapshot {
    handles: Vec<String>,
}

impl DirectorySnapshot {
    pub fn new(handles: Vec<String>) -> Self {
        Self { handles }
    }

    pub fn handles(&self) -> &[String] {
        &self.handles
    }

    /// Case-insensitive prefix matches, in directory order. Suggestions only
    /// appear once the input is `@` followed by at least one character.
    pub fn suggest(&self, partial: &str) -> Vec<String> {
        let Some(prefix) = partial.strip_prefix('@') else {
            return Vec::new();
        };
        if prefix.is_empty() {
            return Vec::new();
        }
        let prefix = prefix.to_lowercase();
        self.handles
            .iter()
            .filter(|handle| handle.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect()
    }
}

/// Input form produced by picking a suggestion.
pub fn canonical_handle(handle: &str) -> String {
    format!("@{handle}")
}
