//! Agent roles, pipeline stages and their progress bands.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed set of agent roles taking part in a pipeline run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Coordinator,
    Architect,
    Frontend,
    Backend,
    Reviewer,
}

impl AgentRole {
    /// All roles in pipeline order.
    pub const ALL: [AgentRole; 5] = [
        Self::Coordinator,
        Self::Architect,
        Self::Frontend,
        Self::Backend,
        Self::Reviewer,
    ];

    /// Stable lowercase identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coordinator => "coordinator",
            Self::Architect => "architect",
            Self::Frontend => "frontend",
            Self::Backend => "backend",
            Self::Reviewer => "reviewer",
        }
    }

    /// Display name for this role
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Coordinator => "Coordinator",
            Self::Architect => "Architect",
            Self::Frontend => "Frontend Developer",
            Self::Backend => "Backend Developer",
            Self::Reviewer => "Code Reviewer",
        }
    }

    /// Progress bands owned by this role, in pipeline order.
    pub fn bands(&self) -> &'static [Band] {
        match self {
            Self::Coordinator => &COORDINATOR_BANDS,
            Self::Architect => &ARCHITECT_BANDS,
            Self::Frontend => &FRONTEND_BANDS,
            Self::Backend => &BACKEND_BANDS,
            Self::Reviewer => &REVIEWER_BANDS,
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static COORDINATOR_BANDS: [Band; 2] = [Stage::Planning.band(), Stage::Synthesis.band()];
static ARCHITECT_BANDS: [Band; 1] = [Stage::Architecture.band()];
static FRONTEND_BANDS: [Band; 1] = [Stage::Frontend.band()];
static BACKEND_BANDS: [Band; 1] = [Stage::Backend.band()];
static REVIEWER_BANDS: [Band; 1] = [Stage::Review.band()];

/// Half-open interval `[lo, hi)` of overall progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub lo: u8,
    pub hi: u8,
}

impl Band {
    pub const fn new(lo: u8, hi: u8) -> Self {
        Self { lo, hi }
    }

    /// Whether `overall` falls inside the band.
    pub fn contains(&self, overall: f64) -> bool {
        overall >= f64::from(self.lo) && overall < f64::from(self.hi)
    }

    /// Position of `overall` within the band, in percent.
    pub fn fraction(&self, overall: f64) -> f64 {
        let lo = f64::from(self.lo);
        let span = f64::from(self.hi) - lo;
        ((overall - lo) / span * 100.0).clamp(0.0, 100.0)
    }
}

/// Stages of a pipeline run, strictly sequential.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Coordinator breaks the request into a plan
    Planning,
    /// Architect designs components and file layout
    Architecture,
    /// Frontend builds the UI files
    Frontend,
    /// Backend adds supporting logic, if any
    Backend,
    /// Reviewer checks both outputs
    Review,
    /// Coordinator merges the final file set
    Synthesis,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 6] = [
        Self::Planning,
        Self::Architecture,
        Self::Frontend,
        Self::Backend,
        Self::Review,
        Self::Synthesis,
    ];

    /// Stable lowercase identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Architecture => "architecture",
            Self::Frontend => "frontend",
            Self::Backend => "backend",
            Self::Review => "review",
            Self::Synthesis => "synthesis",
        }
    }

    /// Role that runs this stage.
    pub fn role(&self) -> AgentRole {
        match self {
            Self::Planning | Self::Synthesis => AgentRole::Coordinator,
            Self::Architecture => AgentRole::Architect,
            Self::Frontend => AgentRole::Frontend,
            Self::Backend => AgentRole::Backend,
            Self::Review => AgentRole::Reviewer,
        }
    }

    /// Overall-progress band of this stage.
    pub const fn band(&self) -> Band {
        match self {
            Self::Planning => Band::new(0, 25),
            Self::Architecture => Band::new(25, 40),
            Self::Frontend => Band::new(40, 60),
            Self::Backend => Band::new(60, 80),
            Self::Review => Band::new(80, 90),
            Self::Synthesis => Band::new(90, 100),
        }
    }

    /// Text describing the stage while it is active.
    pub fn activity(&self) -> &'static str {
        match self {
            Self::Planning => "Analyzing request and creating plan...",
            Self::Architecture => "Designing component architecture...",
            Self::Frontend => "Building React components...",
            Self::Backend => "Implementing business logic...",
            Self::Review => "Reviewing code quality...",
            Self::Synthesis => "Synthesizing final output...",
        }
    }

    /// Status text reported once the stage has completed.
    pub fn completion(&self) -> &'static str {
        match self {
            Self::Planning => "Plan ready, architect designing structure...",
            Self::Architecture => "Architecture ready, frontend building UI components...",
            Self::Frontend => "UI built, backend implementing logic...",
            Self::Backend => "Logic ready, reviewer checking code quality...",
            Self::Review => "Review done, synthesizing final project...",
            Self::Synthesis => "Complete!",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands_tile_the_range() {
        let mut expected_lo = 0;
        for stage in Stage::ALL {
            let band = stage.band();
            assert_eq!(band.lo, expected_lo, "gap before {:?}", stage);
            assert!(band.hi > band.lo);
            expected_lo = band.hi;
        }
        assert_eq!(expected_lo, 100);
    }

    #[test]
    fn test_coordinator_owns_two_bands() {
        assert_eq!(AgentRole::Coordinator.bands().len(), 2);
        for role in &AgentRole::ALL[1..] {
            assert_eq!(role.bands().len(), 1);
        }
    }

    #[test]
    fn test_band_fraction() {
        let band = Stage::Frontend.band();
        assert!(band.contains(40.0));
        assert!(!band.contains(60.0));
        assert_eq!(band.fraction(50.0), 50.0);
        assert_eq!(band.fraction(10.0), 0.0);
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&AgentRole::Frontend).unwrap(), "\"frontend\"");
        assert_eq!(AgentRole::Reviewer.to_string(), "reviewer");
    }
}
