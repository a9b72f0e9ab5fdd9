//! Scripted submission session for stakeholder walkthroughs. Everything runs
//! against in-memory stores with a scripted clock, so the cooldown and streak
//! behavior shows up without real waiting.

use chrono::{DateTime, Duration, TimeZone, Utc};
use clap::Args;
use std::sync::{Arc, Mutex};

use crate::infra::{
    seed_starter_data, InMemoryProblemCatalog, InMemoryProgressStore, InMemorySubmissionStore,
};
use codeclub::error::AppError;
use codeclub::submissions::{
    AdmissionPolicy, Clock, IntakeError, ProblemId, SubmissionEvent, SubmissionIntake, UserId,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Number of simulated days of activity
    #[arg(long, default_value_t = 3)]
    pub(crate) days: u32,
}

struct ScriptedClock {
    now: Mutex<DateTime<Utc>>,
}

impl ScriptedClock {
    fn starting_at(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    fn advance(&self, by: Duration) {
        *self.now.lock().expect("clock mutex poisoned") += by;
    }
}

impl Clock for ScriptedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

fn attempt(problem: &str, status: i32) -> SubmissionEvent {
    SubmissionEvent {
        problem_id: ProblemId(problem.to_string()),
        code: "fn solve() { /* walkthrough */ }".to_string(),
        language: "rust".to_string(),
        judge_status_code: Some(status),
        reported_verdict: None,
        output: None,
        runtime_ms: Some(25),
        memory_bytes: Some(1 << 20),
        error_text: None,
        stderr: None,
        passed_test_cases: None,
        total_test_cases: None,
        execution_details: None,
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let submissions = Arc::new(InMemorySubmissionStore::default());
    let progress = Arc::new(InMemoryProgressStore::default());
    let catalog = Arc::new(InMemoryProblemCatalog::default());
    seed_starter_data(&progress, &catalog);

    let clock = Arc::new(ScriptedClock::starting_at(
        Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now),
    ));
    let intake = SubmissionIntake::with_clock(
        submissions,
        progress,
        catalog,
        AdmissionPolicy::default(),
        clock.clone(),
    );

    let user = UserId("demo-user".to_string());
    let rotation = [
        "two-sum",
        "valid-parentheses",
        "merge-intervals",
        "lru-cache",
        "word-ladder",
    ];

    println!("== scripted session for {} ==", user.0);

    for day in 0..args.days.max(1) {
        let problem = rotation[day as usize % rotation.len()];
        println!("-- day {} ({problem}) --", day + 1);

        // First attempt misses, the retry lands.
        report(intake.submit(user.clone(), attempt(problem, 4)));

        if day == 0 {
            // Back-to-back attempt to show the cooldown rejection.
            report(intake.submit(user.clone(), attempt(problem, 3)));
        }

        clock.advance(Duration::seconds(30));
        report(intake.submit(user.clone(), attempt(problem, 3)));

        clock.advance(Duration::days(1));
    }

    match intake.progress(&user) {
        Ok(snapshot) => {
            println!("== final progress ==");
            println!("total points:    {}", snapshot.total_points);
            println!("problems solved: {}", snapshot.problems_solved);
            println!("current streak:  {}", snapshot.current_streak);
            println!("longest streak:  {}", snapshot.longest_streak);
        }
        Err(err) => println!("progress unavailable: {err}"),
    }

    Ok(())
}

fn report(result: Result<codeclub::submissions::SubmissionOutcome, IntakeError>) {
    match result {
        Ok(outcome) => println!(
            "  {} -> {} (points {}, streak {})",
            outcome.submission.id.0,
            outcome.submission.verdict.label(),
            outcome.progress.total_points,
            outcome.progress.current_streak,
        ),
        Err(IntakeError::Rejected(rejection)) => println!("  rejected: {rejection:?}"),
        Err(err) => println!("  submission failed: {err}"),
    }
}
