use super::domain::{ProblemSummary, UserProgress};

/// Credits a solved problem to the user's progress aggregate.
///
/// Idempotent on the solved set: re-solving a problem (including
/// resubmitting an already-accepted one) never re-grants points. Returns
/// whether points were actually awarded.
pub fn record_solve(progress: &mut UserProgress, problem: &ProblemSummary) -> bool {
    if progress.has_solved(&problem.id) {
        return false;
    }

    progress.solved_problem_ids.insert(problem.id.clone());
    progress.total_points += problem.points;
    progress.problems_solved += 1;
    true
}
