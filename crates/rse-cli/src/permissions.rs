/// The closed set of permissions this control plane's API boundary checks:
/// tenant-access allowance at job admission, plus ruleset and
/// scheduled-job management. Enumerated here, not derived from a registry,
/// since full RBAC policy evaluation is out of scope — this is the closed
/// list an external authorization layer is expected to enforce against.
pub const PERMISSIONS: &[&str] = &[
    "JOB:SUBMIT",
    "JOB:TERMINATE",
    "JOB:DESCRIBE",
    "RULESET:CREATE",
    "RULESET:UPDATE",
    "RULESET:DELETE",
    "RULESET:RELEASE",
    "SCHEDULED_JOB:REGISTER",
    "SCHEDULED_JOB:UPDATE",
    "SCHEDULED_JOB:DELETE",
    "SCHEDULED_JOB:DESCRIBE",
    "EXCEPTION:CREATE",
    "EXCEPTION:DELETE",
    "TENANT:DESCRIBE",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissions_are_unique() {
        let mut sorted = PERMISSIONS.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), PERMISSIONS.len());
    }
}
