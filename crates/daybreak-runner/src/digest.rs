//! Digest assembly from settled agent results.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use daybreak_core::{AgentResult, Digest, Finding};
use uuid::Uuid;

/// Builds one digest from the results of a run.
///
/// `build` is a pure function of its inputs: no I/O, no clock reads,
/// deterministic ordering. Calling it twice with the same inputs yields
/// an identical digest.
pub struct DigestBuilder;

impl DigestBuilder {
    /// Merge agent results into an ordered, deduplicated digest.
    ///
    /// Findings from successful results are flattened, deduplicated by
    /// `dedup_key` (the earliest timestamp wins; input order breaks
    /// exact ties), and sorted by priority descending then timestamp
    /// ascending. Failures are attached for audit.
    pub fn build(run_id: Uuid, generated_at: DateTime<Utc>, results: &[AgentResult]) -> Digest {
        let mut findings: Vec<Finding> = Vec::new();
        let mut by_key: HashMap<String, usize> = HashMap::new();

        for result in results {
            let Some(batch) = result.findings() else {
                continue;
            };
            for finding in batch {
                match by_key.get(&finding.dedup_key) {
                    Some(&slot) => {
                        if finding.timestamp < findings[slot].timestamp {
                            findings[slot] = finding.clone();
                        }
                    }
                    None => {
                        by_key.insert(finding.dedup_key.clone(), findings.len());
                        findings.push(finding.clone());
                    }
                }
            }
        }

        // Stable sort: ties beyond the comparator keep insertion order
        findings.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.timestamp.cmp(&b.timestamp))
        });

        let failures = results
            .iter()
            .filter_map(|result| result.failure())
            .cloned()
            .collect();

        Digest {
            run_id,
            generated_at,
            findings,
            failures,
        }
    }
}
