//! Spam types and data structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary message label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Label {
    /// Legitimate mail
    Ham = 0,
    /// Unsolicited mail
    Spam = 1,
}

impl Label {
    pub const ALL: [Label; 2] = [Label::Ham, Label::Spam];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_spam(self) -> bool {
        self == Label::Spam
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> Self {
        label.as_u8()
    }
}

impl TryFrom<u8> for Label {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Label::Ham),
            1 => Ok(Label::Spam),
            other => Err(format!("invalid label {}, expected 0 or 1", other)),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Ham => write!(f, "ham"),
            Label::Spam => write!(f, "spam"),
        }
    }
}

/// One labeled row of the training dataset
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Message body, `None` when the cell was empty
    pub text: Option<String>,
    /// Ground-truth label
    pub label: Label,
}

/// Classification result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Most probable label
    pub label: Label,
    /// Posterior probability of spam, in [0, 1]
    pub score: f64,
}

/// Action to take on a classified message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpamAction {
    /// Deliver normally
    Deliver,
    /// Move to spam folder
    Quarantine,
    /// Drop the message
    Delete,
}

/// How aggressively spam predictions are acted upon
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    #[default]
    Medium,
    High,
}

impl Sensitivity {
    /// Minimum spam score before a spam prediction triggers an action
    pub fn threshold(self) -> f64 {
        match self {
            Sensitivity::Low => 0.8,
            Sensitivity::Medium => 0.7,
            Sensitivity::High => 0.6,
        }
    }
}

/// Per-deployment filtering policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub sensitivity: Sensitivity,
    /// Delete instead of quarantining
    #[serde(default)]
    pub auto_delete: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            sensitivity: Sensitivity::Medium,
            auto_delete: false,
        }
    }
}

impl FilterSettings {
    /// Decide what to do with a message given its prediction
    pub fn decide(&self, prediction: &Prediction) -> SpamAction {
        if !self.enabled || !prediction.label.is_spam() {
            return SpamAction::Deliver;
        }

        if prediction.score >= self.sensitivity.threshold() {
            if self.auto_delete {
                SpamAction::Delete
            } else {
                SpamAction::Quarantine
            }
        } else {
            SpamAction::Deliver
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Label::Spam).unwrap(), "1");
        assert_eq!(serde_json::from_str::<Label>("0").unwrap(), Label::Ham);
        assert!(serde_json::from_str::<Label>("2").is_err());
    }

    #[test]
    fn test_decide_respects_sensitivity() {
        let settings = FilterSettings::default();
        let weak = Prediction { label: Label::Spam, score: 0.65 };
        let strong = Prediction { label: Label::Spam, score: 0.95 };
        let ham = Prediction { label: Label::Ham, score: 0.1 };

        assert_eq!(settings.decide(&weak), SpamAction::Deliver);
        assert_eq!(settings.decide(&strong), SpamAction::Quarantine);
        assert_eq!(settings.decide(&ham), SpamAction::Deliver);

        let high = FilterSettings {
            sensitivity: Sensitivity::High,
            auto_delete: true,
            ..FilterSettings::default()
        };
        assert_eq!(high.decide(&weak), SpamAction::Delete);
    }

    #[test]
    fn test_disabled_filter_always_delivers() {
        let settings = FilterSettings {
            enabled: false,
            ..FilterSettings::default()
        };
        let spam = Prediction { label: Label::Spam, score: 1.0 };
        assert_eq!(settings.decide(&spam), SpamAction::Deliver);
    }
}
