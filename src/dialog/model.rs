//! User profile collected by the flows.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Display format for birthdates in replies.
pub const BIRTHDATE_FORMAT: &str = "%Y/%m/%d";

/// Per-user profile built up as answers arrive.
///
/// Stored in user-scoped state under key `"{channel}/users/{user_id}"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<NaiveDate>,
}

impl UserProfile {
    /// The birthdate rendered for replies, if one was captured.
    pub fn birthdate_display(&self) -> Option<String> {
        self.birthdate
            .map(|d| d.format(BIRTHDATE_FORMAT).to_string())
    }

    /// Age in whole years as `current_year - birth_year`.
    ///
    /// Month and day are ignored.
    pub fn age_in(&self, current_year: i32) -> Option<i32> {
        self.birthdate.map(|d| current_year - d.year())
    }

    /// One-line summary used at the end of a flow.
    pub fn summary(&self) -> String {
        match self.birthdate_display() {
            Some(date) => format!(
                "I have your name as {} and birthdate as {}.",
                self.name, date
            ),
            None => format!("I have your name as {}.", self.name),
        }
    }
}
