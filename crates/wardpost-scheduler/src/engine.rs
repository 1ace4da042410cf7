//! The poll loop — ticks, checks the timetable, runs due jobs to
//! completion. Single-flight by construction: the loop awaits each job
//! (settle pauses included) before it polls again, and job-level failures
//! never escape past the `RunReport`.

use std::time::Duration;

use wardpost_dispatch::Dispatcher;

use crate::timetable::Timetable;

/// Run the scheduler loop forever. Termination is external (signal/kill).
pub async fn run_loop(mut timetable: Timetable, dispatcher: Dispatcher, tick: Duration) {
    tracing::info!(
        "⏰ Scheduler started (tick every {}s): {}",
        tick.as_secs(),
        timetable.describe()
    );

    let mut interval = tokio::time::interval(tick);

    loop {
        interval.tick().await;

        let now = chrono::Local::now().naive_local();
        for job in timetable.due(now) {
            tracing::info!("🔔 Job due: {}", job.as_str());
            let report = dispatcher.run(job).await;
            tracing::info!(
                "📣 Job {} done: {} sent, {} outcomes",
                report.job.as_str(),
                report.sent_count(),
                report.outcomes.len()
            );
        }
    }
}
