use chrono::NaiveDate;

use super::domain::UserProgress;

/// Outcome of folding one activity day into the streak state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakUpdate {
    /// Activity already counted for `today`; nothing changed.
    AlreadyCounted,
    /// Consecutive-day activity; streak grew to the contained value.
    Extended(u32),
    /// First-ever activity or a gap of two or more days; streak restarted at 1.
    Started,
}

/// Advances the daily streak for one activity event on `today`.
///
/// Runs for every admitted submission regardless of verdict: the streak
/// rewards showing up, not being correct. The streak never rests at 0 while
/// activity is happening — a gap restarts it at exactly 1.
pub fn advance(progress: &mut UserProgress, today: NaiveDate) -> StreakUpdate {
    let update = match progress.last_active_date {
        Some(last) if last == today => return StreakUpdate::AlreadyCounted,
        Some(last) if today.signed_duration_since(last).num_days() == 1 => {
            progress.current_streak += 1;
            StreakUpdate::Extended(progress.current_streak)
        }
        _ => {
            progress.current_streak = 1;
            StreakUpdate::Started
        }
    };

    progress.longest_streak = progress.longest_streak.max(progress.current_streak);
    progress.last_active_date = Some(today);
    update
}
