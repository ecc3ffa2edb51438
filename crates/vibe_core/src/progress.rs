//! Per-role progress projected from the overall pipeline progress.
//!
//! The projection holds no state: the same overall value always yields the
//! same snapshot, so observers can recompute it on every tick.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::roles::{AgentRole, Stage};

/// Status of a single role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoleStatus {
    Idle,
    Working,
    Done,
}

/// Progress of a single role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleProgress {
    pub status: RoleStatus,
    /// Percent of the role's active band completed
    pub progress: f64,
    /// What the role is doing right now
    pub task: String,
}

/// Overall progress with every role's projected state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressSnapshot {
    pub overall: f64,
    #[serde(rename = "perRole")]
    pub per_role: BTreeMap<AgentRole, RoleProgress>,
}

impl ProgressSnapshot {
    /// Progress of one role, missing only from hand-built snapshots.
    pub fn role(&self, role: AgentRole) -> Option<&RoleProgress> {
        self.per_role.get(&role)
    }

    /// The role currently working, if any.
    pub fn active_role(&self) -> Option<AgentRole> {
        self.per_role
            .iter()
            .find(|(_, p)| p.status == RoleStatus::Working)
            .map(|(role, _)| *role)
    }
}

/// Project an overall progress value onto every role.
///
/// `overall` is clamped to `0..=100`; NaN counts as zero.
pub fn project(overall: impl Into<f64>) -> ProgressSnapshot {
    let overall = clamp_overall(overall.into());
    let per_role = AgentRole::ALL
        .iter()
        .map(|role| (*role, project_role(*role, overall)))
        .collect();

    ProgressSnapshot { overall, per_role }
}

fn clamp_overall(overall: f64) -> f64 {
    if overall.is_nan() {
        0.0
    } else {
        overall.clamp(0.0, 100.0)
    }
}

/// A role is working while `overall` sits in one of its bands, idle before
/// its first band and done otherwise. The coordinator's gap between planning
/// and synthesis therefore reads as done.
fn project_role(role: AgentRole, overall: f64) -> RoleProgress {
    let mut stages = Stage::ALL.iter().filter(|stage| stage.role() == role).peekable();

    let first_lo = stages.peek().map_or(0, |stage| stage.band().lo);
    if overall < f64::from(first_lo) {
        return RoleProgress {
            status: RoleStatus::Idle,
            progress: 0.0,
            task: "Waiting...".to_string(),
        };
    }

    for stage in stages {
        let band = stage.band();
        if band.contains(overall) {
            return RoleProgress {
                status: RoleStatus::Working,
                progress: band.fraction(overall),
                task: stage.activity().to_string(),
            };
        }
    }

    RoleProgress {
        status: RoleStatus::Done,
        progress: 100.0,
        task: "Task complete".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_role_is_none() {
        let mut snapshot = project(50u8);
        snapshot.per_role.remove(&AgentRole::Backend);
        let restored: ProgressSnapshot =
            serde_json::from_str(&serde_json::to_string(&snapshot).unwrap()).unwrap();
        assert!(restored.role(AgentRole::Backend).is_none());
        assert!(restored.role(AgentRole::Frontend).is_some());
    }

    #[test]
    fn test_start_of_run() {
        let snapshot = project(0u8);
        let coordinator = snapshot.role(AgentRole::Coordinator).unwrap();
        assert_eq!(coordinator.status, RoleStatus::Working);
        assert_eq!(coordinator.progress, 0.0);
        for role in &AgentRole::ALL[1..] {
            assert_eq!(snapshot.role(*role).unwrap().status, RoleStatus::Idle);
            assert_eq!(snapshot.role(*role).unwrap().progress, 0.0);
        }
    }

    #[test]
    fn test_band_edge_at_25() {
        let snapshot = project(25u8);
        let architect = snapshot.role(AgentRole::Architect).unwrap();
        assert_eq!(architect.status, RoleStatus::Working);
        assert_eq!(architect.progress, 0.0);

        let coordinator = snapshot.role(AgentRole::Coordinator).unwrap();
        assert_eq!(coordinator.status, RoleStatus::Done);
        assert_eq!(coordinator.progress, 100.0);
        assert_eq!(snapshot.active_role(), Some(AgentRole::Architect));
    }

    #[test]
    fn test_mid_band() {
        let snapshot = project(50u8);
        let frontend = snapshot.role(AgentRole::Frontend).unwrap();
        assert_eq!(frontend.status, RoleStatus::Working);
        assert_eq!(frontend.progress, 50.0);
        assert_eq!(frontend.task, "Building React components...");
        assert_eq!(snapshot.role(AgentRole::Architect).unwrap().status, RoleStatus::Done);
        assert_eq!(snapshot.role(AgentRole::Backend).unwrap().status, RoleStatus::Idle);
    }

    #[test]
    fn test_coordinator_synthesis_band() {
        let snapshot = project(95u8);
        let coordinator = snapshot.role(AgentRole::Coordinator).unwrap();
        assert_eq!(coordinator.status, RoleStatus::Working);
        assert_eq!(coordinator.progress, 50.0);
        assert_eq!(coordinator.task, "Synthesizing final output...");
        assert_eq!(snapshot.role(AgentRole::Reviewer).unwrap().status, RoleStatus::Done);
    }

    #[test]
    fn test_everything_done_at_100() {
        let snapshot = project(100u8);
        for role in AgentRole::ALL {
            let state = snapshot.role(role).unwrap();
            assert_eq!(state.status, RoleStatus::Done, "{} not done", role);
            assert_eq!(state.progress, 100.0);
        }
        assert_eq!(snapshot.active_role(), None);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(project(150.0), project(100u8));
        assert_eq!(project(-3.0), project(0u8));
        assert_eq!(project(f64::NAN), project(0u8));
    }

    #[test]
    fn test_projection_is_stateless() {
        let first = project(67.5);
        let _ = project(10u8);
        assert_eq!(project(67.5), first);
    }

    #[test]
    fn test_snapshot_serialization() {
        let json = serde_json::to_value(project(40u8)).unwrap();
        assert_eq!(json["overall"], 40.0);
        assert_eq!(json["perRole"]["frontend"]["status"], "working");
        assert_eq!(json["perRole"]["coordinator"]["status"], "done");
    }
}
