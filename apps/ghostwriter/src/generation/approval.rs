//! Approval Parser: turns a free-text screening verdict into a decision.
//!
//! Only the first non-empty line counts, lower-cased. It approves when it
//! contains `yes` and does not contain `no`; everything else is Rejected
//! (fail-closed). Matching is by substring, so "Not sure" and "nothing" read
//! as `no`.

use crate::models::content::ApprovalStatus;

pub fn parse_verdict(verdict: &str) -> ApprovalStatus {
    let Some(first_line) = verdict.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return ApprovalStatus::Rejected;
    };

    let first_line = first_line.to_lowercase();
    if first_line.contains("yes") && !first_line.contains("no") {
        ApprovalStatus::Approved
    } else {
        ApprovalStatus::Rejected
    }
}
