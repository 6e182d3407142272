//! Project invariants and platform advisories.

use sigm_model::Project;

use crate::issue::{IssueCode, ValidationIssue};

/// Every broken invariant, project-level first, then signals in order.
pub fn check_invariants(project: &Project) -> Vec<ValidationIssue> {
    project
        .invariant_violations()
        .iter()
        .map(ValidationIssue::from)
        .collect()
}

/// The selected SoC has no cores. Allowed, but nothing can be routed.
pub fn check_selected_soc_has_cores(project: &Project) -> Option<ValidationIssue> {
    let has_cores = project
        .core_info
        .get(&project.soc_type)
        .is_some_and(|cores| !cores.is_empty());
    (!has_cores).then(|| {
        ValidationIssue::new(
            IssueCode::SocTypeWithoutCores,
            "soc_type",
            format!("selected SoC '{}' has no cores configured", project.soc_type),
        )
    })
}

/// Signal values the file held but the loader could not read. The editor
/// default stands in for each one until the next save.
pub fn check_unreadable_values(project: &Project) -> Vec<ValidationIssue> {
    project
        .signals
        .iter()
        .flat_map(|(name, signal)| {
            signal.unreadable.iter().map(move |(field, raw)| {
                ValidationIssue::new(
                    IssueCode::UnreadableValue,
                    format!("signals.{name}.{field}"),
                    format!("'{raw}' is not a valid {field}; the default will be saved"),
                )
            })
        })
        .collect()
}
