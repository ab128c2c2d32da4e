//! Opportunity extraction from free-text analyst reports.
//!
//! The analyst is asked to describe each opportunity with four labelled
//! lines. Those labels are the only structure in its output:
//!
//! ```text
//! User ID: user_42
//! Opportunity type: Premium upgrade
//! Reasoning: Hit the export limit three times this week
//! Recommended action: Offer a discounted annual plan
//! ```
//!
//! Anything else in the report is ignored.

use serde::{Deserialize, Serialize};

pub const USER_ID_PREFIX: &str = "User ID:";
pub const OPPORTUNITY_TYPE_PREFIX: &str = "Opportunity type:";
pub const REASONING_PREFIX: &str = "Reasoning:";
pub const RECOMMENDED_ACTION_PREFIX: &str = "Recommended action:";

/// A suggestion that a user may be receptive to an upsell.
///
/// Fields the report never mentioned stay `None` and are omitted when
/// serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_action: Option<String>,
}

impl OpportunityRecord {
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.opportunity_type.is_none()
            && self.reasoning.is_none()
            && self.recommended_action.is_none()
    }
}

/// Extract opportunity records from an analyst report.
///
/// A `User ID:` line closes the record in progress and opens a new one; the
/// other labels fill fields of the open record, the last occurrence winning.
/// Never fails: text without any labels yields an empty list.
pub fn extract_opportunities(text: &str) -> Vec<OpportunityRecord> {
    let mut records = Vec::new();
    let mut current = OpportunityRecord::default();

    for line in text.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix(USER_ID_PREFIX) {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            current.user_id = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix(OPPORTUNITY_TYPE_PREFIX) {
            current.opportunity_type = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix(REASONING_PREFIX) {
            current.reasoning = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix(RECOMMENDED_ACTION_PREFIX) {
            current.recommended_action = Some(rest.trim().to_string());
        }
    }

    if !current.is_empty() {
        records.push(current);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        user_id: Option<&str>,
        opportunity_type: Option<&str>,
        reasoning: Option<&str>,
        recommended_action: Option<&str>,
    ) -> OpportunityRecord {
        OpportunityRecord {
            user_id: user_id.map(String::from),
            opportunity_type: opportunity_type.map(String::from),
            reasoning: reasoning.map(String::from),
            recommended_action: recommended_action.map(String::from),
        }
    }

    #[test]
    fn test_user_id_starts_new_record() {
        let text = "User ID: u1\nOpportunity type: upgrade\nUser ID: u2\nReasoning: heavy usage\n";
        assert_eq!(
            extract_opportunities(text),
            vec![
                record(Some("u1"), Some("upgrade"), None, None),
                record(Some("u2"), None, Some("heavy usage"), None),
            ]
        );
    }

    #[test]
    fn test_full_record_with_surrounding_prose() {
        let text = "\
Here is what I found:

  User ID:   user_42
  Opportunity type: Premium upgrade
  Reasoning: Hit the export limit three times
  Recommended action: Offer annual plan

Let me know if you need more.";
        assert_eq!(
            extract_opportunities(text),
            vec![record(
                Some("user_42"),
                Some("Premium upgrade"),
                Some("Hit the export limit three times"),
                Some("Offer annual plan"),
            )]
        );
    }

    #[test]
    fn test_last_occurrence_wins() {
        let text = "User ID: u1\nReasoning: first\nReasoning: second";
        assert_eq!(extract_opportunities(text)[0].reasoning.as_deref(), Some("second"));
    }

    #[test]
    fn test_prefixes_are_case_sensitive() {
        assert!(extract_opportunities("user id: u1\nREASONING: loud").is_empty());
    }

    #[test]
    fn test_labels_before_first_user_id_form_their_own_record() {
        let text = "Opportunity type: upsell\nUser ID: u1";
        assert_eq!(
            extract_opportunities(text),
            vec![record(None, Some("upsell"), None, None), record(Some("u1"), None, None, None)]
        );
    }

    #[test]
    fn test_empty_user_id_still_opens_record() {
        let records = extract_opportunities("User ID:\nUser ID: u2");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].user_id.as_deref(), Some(""));
    }

    #[test]
    fn test_crlf_line_endings() {
        let records = extract_opportunities("User ID: u1\r\nRecommended action: call\r\n");
        assert_eq!(records, vec![record(Some("u1"), None, None, Some("call"))]);
    }

    #[test]
    fn test_absent_fields_are_omitted_from_json() {
        let json = serde_json::to_value(record(Some("u1"), None, Some("r"), None)).unwrap();
        assert_eq!(json, serde_json::json!({"user_id": "u1", "reasoning": "r"}));
    }
}
