//! Priority scoring heuristics.
//!
//! Importance scoring is deliberately pluggable: the email agent takes
//! any [`MessageScorer`], and the defaults here are one documented
//! policy, not fixed business logic.

use chrono::{DateTime, Utc};
use daybreak_core::{Finding, Priority, RawMessage};

/// Scoring function mapping a message to a numeric importance score.
pub type MessageScorer = Box<dyn Fn(&RawMessage, DateTime<Utc>) -> u32 + Send + Sync>;

/// Keywords that raise a message's importance score.
const URGENT_KEYWORDS: &[&str] = &[
    "urgent",
    "asap",
    "action required",
    "deadline",
    "blocker",
    "today",
];

/// Default message scorer.
///
/// Signals and weights:
/// - provider importance flag: +40
/// - urgency keyword in the subject: +15 each
/// - urgency keyword in the snippet: +5 each
/// - recency: +20 within the last hour, +10 within four hours,
///   +5 within a day
pub fn default_message_scorer(message: &RawMessage, now: DateTime<Utc>) -> u32 {
    let mut score = 0u32;

    if message.flagged {
        score += 40;
    }

    let subject = message.subject.to_lowercase();
    let snippet = message.snippet.to_lowercase();
    for keyword in URGENT_KEYWORDS {
        if subject.contains(keyword) {
            score += 15;
        }
        if snippet.contains(keyword) {
            score += 5;
        }
    }

    let age = now - message.received_at;
    if age <= chrono::Duration::hours(1) {
        score += 20;
    } else if age <= chrono::Duration::hours(4) {
        score += 10;
    } else if age <= chrono::Duration::hours(24) {
        score += 5;
    }

    score
}

/// Map a numeric importance score to a digest priority tier.
pub fn score_to_priority(score: u32) -> Priority {
    match score {
        60.. => Priority::Urgent,
        35..=59 => Priority::High,
        15..=34 => Priority::Normal,
        _ => Priority::Low,
    }
}

/// Cap a set of findings, keeping the highest-priority entries.
///
/// Ties within a priority tier are broken most-recent-first, so a full
/// digest favors what just happened.
pub fn cap_findings(mut findings: Vec<Finding>, cap: usize) -> Vec<Finding> {
    if findings.len() <= cap {
        return findings;
    }
    findings.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.timestamp.cmp(&a.timestamp))
    });
    findings.truncate(cap);
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybreak_core::FindingKind;
    use proptest::prelude::*;
    use test_case::test_case;

    fn message(subject: &str, snippet: &str, flagged: bool, age_hours: i64) -> RawMessage {
        RawMessage {
            id: "m1".into(),
            sender: "alice@example.com".into(),
            subject: subject.into(),
            snippet: snippet.into(),
            flagged,
            received_at: Utc::now() - chrono::Duration::hours(age_hours),
        }
    }

    fn finding(priority: Priority, age_hours: i64, key: &str) -> Finding {
        Finding {
            source_agent: "email".into(),
            kind: FindingKind::Summary,
            title: key.into(),
            body: String::new(),
            priority,
            timestamp: Utc::now() - chrono::Duration::hours(age_hours),
            dedup_key: key.into(),
        }
    }

    #[test_case(0 => Priority::Low)]
    #[test_case(14 => Priority::Low)]
    #[test_case(15 => Priority::Normal)]
    #[test_case(34 => Priority::Normal)]
    #[test_case(35 => Priority::High)]
    #[test_case(59 => Priority::High)]
    #[test_case(60 => Priority::Urgent)]
    #[test_case(200 => Priority::Urgent)]
    fn score_thresholds(score: u32) -> Priority {
        score_to_priority(score)
    }

    #[test]
    fn flagged_recent_message_scores_urgent() {
        let msg = message("Deadline today", "please respond asap", true, 0);
        let score = default_message_scorer(&msg, Utc::now());
        assert_eq!(score_to_priority(score), Priority::Urgent);
    }

    #[test]
    fn stale_plain_message_scores_low() {
        let msg = message("Newsletter", "this week in ferrets", false, 48);
        let score = default_message_scorer(&msg, Utc::now());
        assert_eq!(score_to_priority(score), Priority::Low);
    }

    #[test]
    fn cap_keeps_highest_priority() {
        let findings = vec![
            finding(Priority::Low, 1, "low"),
            finding(Priority::Urgent, 5, "urgent"),
            finding(Priority::Normal, 2, "normal"),
        ];

        let capped = cap_findings(findings, 2);
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].dedup_key, "urgent");
        assert_eq!(capped[1].dedup_key, "normal");
    }

    #[test]
    fn cap_breaks_ties_most_recent_first() {
        let findings = vec![
            finding(Priority::High, 10, "older"),
            finding(Priority::High, 1, "newer"),
        ];

        let capped = cap_findings(findings, 1);
        assert_eq!(capped[0].dedup_key, "newer");
    }

    proptest! {
        // Capping never exceeds the cap and never invents findings
        #[test]
        fn cap_bounds_output(len in 0usize..20, cap in 0usize..20) {
            let findings: Vec<Finding> = (0..len)
                .map(|i| finding(Priority::Normal, i as i64, &format!("k{}", i)))
                .collect();

            let capped = cap_findings(findings.clone(), cap);
            prop_assert_eq!(capped.len(), len.min(cap));
            for kept in &capped {
                prop_assert!(findings.iter().any(|f| f.dedup_key == kept.dedup_key));
            }
        }

        // Every dropped finding has priority <= every kept finding
        #[test]
        fn cap_drops_only_lower_priority(cap in 1usize..5) {
            let findings = vec![
                finding(Priority::Low, 1, "a"),
                finding(Priority::Urgent, 2, "b"),
                finding(Priority::High, 3, "c"),
                finding(Priority::Normal, 4, "d"),
                finding(Priority::Urgent, 5, "e"),
            ];

            let capped = cap_findings(findings.clone(), cap);
            let min_kept = capped.iter().map(|f| f.priority).min();

            if let Some(min_kept) = min_kept {
                for f in &findings {
                    let kept = capped.iter().any(|k| k.dedup_key == f.dedup_key);
                    if !kept {
                        prop_assert!(f.priority <= min_kept);
                    }
                }
            }
        }
    }
}
