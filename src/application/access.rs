//! Access Guard
//!
//! Allow-list of chat usernames. An empty list admits everyone.

/// Username allow-list, compared case-insensitively
#[derive(Debug, Clone, Default)]
pub struct AccessGuard {
    allowed: Vec<String>,
}

impl AccessGuard {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = allowed
            .into_iter()
            .map(|u| normalize(u.as_ref()))
            .filter(|u| !u.is_empty())
            .collect();
        Self { allowed }
    }

    /// Guard that admits every caller
    pub fn open() -> Self {
        Self::default()
    }

    pub fn is_restricted(&self) -> bool {
        !self.allowed.is_empty()
    }

    /// Whether a caller may use the bot. Callers without a username are
    /// only admitted when the list is empty.
    pub fn is_allowed(&self, username: Option<&str>) -> bool {
        if self.allowed.is_empty() {
            return true;
        }
        match username {
            Some(name) => {
                let name = normalize(name);
                self.allowed.iter().any(|u| *u == name)
            }
            None => false,
        }
    }
}

fn normalize(username: &str) -> String {
    username.trim().trim_start_matches('@').to_lowercase()
}
