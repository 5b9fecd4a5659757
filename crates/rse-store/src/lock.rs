use serde::{Deserialize, Serialize};

use rse_domain::JobId;

/// A tenant-setting entry (`CUSTODIAN_JOB_LOCK`) encoding the currently-held
/// regions/platforms for a tenant. Holder is a single Job id plus its claimed
/// regions/platforms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobLock {
    pub holder_job_id: JobId,
    pub regions: Vec<String>,
    pub platform_id: Option<String>,
}

impl JobLock {
    /// Two locks collide when they claim overlapping regions, or either
    /// claims the same platform id (K8s jobs lock by platform, not region).
    pub fn intersects(&self, regions: &[String], platform_id: Option<&str>) -> bool {
        if let (Some(a), Some(b)) = (self.platform_id.as_deref(), platform_id) {
            if a == b {
                return true;
            }
        }
        self.regions.iter().any(|r| regions.iter().any(|other| other == r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_regions_intersect() {
        let lock = JobLock {
            holder_job_id: JobId::new("j1"),
            regions: vec!["us-east-1".into(), "eu-west-1".into()],
            platform_id: None,
        };
        assert!(lock.intersects(&["us-east-1".into()], None));
        assert!(!lock.intersects(&["ap-south-1".into()], None));
    }

    #[test]
    fn matching_platform_ids_intersect_regardless_of_regions() {
        let lock = JobLock {
            holder_job_id: JobId::new("j1"),
            regions: vec![],
            platform_id: Some("platform-1".into()),
        };
        assert!(lock.intersects(&[], Some("platform-1")));
        assert!(!lock.intersects(&[], Some("platform-2")));
    }
}
