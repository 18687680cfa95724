use crate::grading::aggregate::Counted;

/// `earned / possible` as a percentage.
pub fn percent(earned: f64, possible: f64) -> f64 {
    earned / possible * 100.0
}

/// Sums earned and possible points over counted items.
pub(crate) fn sum_points(items: &[Counted]) -> (f64, f64) {
    items
        .iter()
        .fold((0.0, 0.0), |(earned, possible), c| (earned + c.earned, possible + c.possible))
}
