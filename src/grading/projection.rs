use crate::grading::aggregate::compute;
use crate::grading::types::{AssignmentGroup, Overrides, Submission};
use serde::Serialize;

/// Current grade next to the grade projected under hypothetical scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WhatIf {
    pub current: Option<f64>,
    pub projected: Option<f64>,
}

impl WhatIf {
    pub fn project(
        submissions: &[Submission],
        groups: &[AssignmentGroup],
        overrides: &Overrides,
    ) -> Self {
        Self {
            current: compute(submissions, groups, None),
            projected: compute(submissions, groups, Some(overrides)),
        }
    }

    /// Projected minus current, when both grades exist.
    pub fn change(&self) -> Option<f64> {
        Some(self.projected? - self.current?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::types::Assignment;

    fn quiz(score: Option<f64>) -> Submission {
        Submission::new(
            score,
            Assignment { points_possible: Some(10.0), ..Default::default() },
        )
    }

    #[test]
    fn test_projection_reports_change() {
        let submissions = vec![quiz(Some(5.0)), quiz(Some(5.0))];
        let overrides: Overrides = [(1, 10.0)].into_iter().collect();

        let what_if = WhatIf::project(&submissions, &[], &overrides);

        assert_eq!(what_if.current, Some(50.0));
        assert_eq!(what_if.projected, Some(75.0));
        assert_eq!(what_if.change(), Some(25.0));
    }

    #[test]
    fn test_projection_of_ungraded_course() {
        let submissions = vec![quiz(None), quiz(None)];
        let overrides: Overrides = [(0, 8.0)].into_iter().collect();

        let what_if = WhatIf::project(&submissions, &[], &overrides);

        assert_eq!(what_if.current, None);
        assert_eq!(what_if.projected, Some(80.0));
        assert_eq!(what_if.change(), None);
    }
}
