//! Dispatch jobs — the orchestrator that turns portal rows into sends.
//!
//! Two jobs exist: the group announcement and the per-leader task
//! reminders. Neither tracks sent state: re-running the group job re-sends
//! the latest announcement, and reminders repeat until the dashboard marks
//! the task done. That is the contract the ward relies on ("latest wins,
//! always resend on trigger"), so it is preserved here.
//!
//! Failure containment: a failed store read means the run ends with
//! nothing to send; an unresolved or failed recipient ends only that
//! recipient's branch. A job run always reaches its end.

use std::time::Duration;

use wardpost_core::messenger::Messenger;
use wardpost_store::{PortalReader, TaskItem};

use crate::compose;
use crate::directory::{Directory, normalize_name};

/// Which scheduled job to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    GroupAnnouncement,
    TaskReminders,
}

impl JobKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "group_announcement" => Some(Self::GroupAnnouncement),
            "task_reminders" => Some(Self::TaskReminders),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GroupAnnouncement => "group_announcement",
            Self::TaskReminders => "task_reminders",
        }
    }
}

/// Outcome of one target's branch within a job run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Message delivered to the channel (not a delivery receipt).
    Sent { recipient: String, target: String },
    /// The directory has no entry for this recipient; branch skipped.
    RecipientUnresolved { recipient: String },
    /// The channel reported failure for this target; branch ended.
    SendFailed {
        recipient: String,
        target: String,
        reason: String,
    },
    /// The store could not be read; treated as nothing to send.
    StoreUnavailable { reason: String },
    /// Nothing pending for this run.
    NothingToSend,
}

/// What one job run did, in order.
#[derive(Debug)]
pub struct RunReport {
    pub job: JobKind,
    pub outcomes: Vec<Outcome>,
}

impl RunReport {
    pub fn sent_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Sent { .. }))
            .count()
    }
}

/// The dispatch orchestrator. Holds the read side of the store, the
/// directory, and the send capability; all injected at startup and
/// immutable afterwards.
pub struct Dispatcher {
    store: Box<dyn PortalReader>,
    messenger: Box<dyn Messenger>,
    directory: Directory,
    group_id: String,
    /// End-of-turn pause between recipients.
    recipient_pause: Duration,
}

impl Dispatcher {
    pub fn new(
        store: Box<dyn PortalReader>,
        messenger: Box<dyn Messenger>,
        directory: Directory,
        group_id: String,
        recipient_pause: Duration,
    ) -> Self {
        Self {
            store,
            messenger,
            directory,
            group_id,
            recipient_pause,
        }
    }

    /// Run one job to completion. Never returns an error: every failure
    /// mode is contained and reported in the `RunReport`.
    pub async fn run(&self, job: JobKind) -> RunReport {
        match job {
            JobKind::GroupAnnouncement => self.run_group_announcement().await,
            JobKind::TaskReminders => self.run_task_reminders().await,
        }
    }

    /// Send the most recent announcement to the ward group.
    pub async fn run_group_announcement(&self) -> RunReport {
        tracing::info!("🚀 Group announcement job starting");
        let announcement = match self.store.latest_announcement() {
            Ok(Some(a)) => a,
            Ok(None) => {
                tracing::info!("⚠️ No announcements in the portal; nothing to send");
                return report(JobKind::GroupAnnouncement, vec![Outcome::NothingToSend]);
            }
            Err(e) => {
                tracing::warn!("❌ Announcement read failed: {e}");
                return report(
                    JobKind::GroupAnnouncement,
                    vec![Outcome::StoreUnavailable {
                        reason: e.to_string(),
                    }],
                );
            }
        };

        let text = compose::group_message(&announcement);
        let outcome = match self.messenger.send(&self.group_id, &text).await {
            Ok(()) => {
                tracing::info!("✅ Group notified (announcement id={})", announcement.id);
                Outcome::Sent {
                    recipient: "group".into(),
                    target: self.group_id.clone(),
                }
            }
            Err(e) => {
                tracing::warn!("❌ Group send failed ({}): {e}", self.group_id);
                Outcome::SendFailed {
                    recipient: "group".into(),
                    target: self.group_id.clone(),
                    reason: e.to_string(),
                }
            }
        };
        report(JobKind::GroupAnnouncement, vec![outcome])
    }

    /// Send each leader their pending tasks, one message per leader.
    pub async fn run_task_reminders(&self) -> RunReport {
        tracing::info!("📋 Task reminder job starting");
        let tasks = match self.store.pending_tasks() {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::warn!("❌ Task read failed: {e}");
                return report(
                    JobKind::TaskReminders,
                    vec![Outcome::StoreUnavailable {
                        reason: e.to_string(),
                    }],
                );
            }
        };
        if tasks.is_empty() {
            tracing::info!("✅ No pending tasks in the portal");
            return report(JobKind::TaskReminders, vec![Outcome::NothingToSend]);
        }

        let groups = group_by_assignee(tasks);
        let mut outcomes = Vec::with_capacity(groups.len());
        let last = groups.len() - 1;

        for (idx, (recipient, group)) in groups.into_iter().enumerate() {
            let Some(target) = self.directory.resolve(&recipient) else {
                tracing::warn!("⚠️ Recipient '{recipient}' not in the directory; skipping");
                outcomes.push(Outcome::RecipientUnresolved { recipient });
                continue;
            };
            let target = target.to_string();

            let text = compose::reminder_message(&recipient, &group);
            match self.messenger.send(&target, &text).await {
                Ok(()) => {
                    tracing::info!("✅ Reminder sent to {recipient} ({} tasks)", group.len());
                    outcomes.push(Outcome::Sent {
                        recipient,
                        target,
                    });
                }
                Err(e) => {
                    tracing::warn!("❌ Reminder to {recipient} ({target}) failed: {e}");
                    outcomes.push(Outcome::SendFailed {
                        recipient,
                        target,
                        reason: e.to_string(),
                    });
                }
            }

            // Let the surface finish the turn before the next recipient.
            if idx != last && !self.recipient_pause.is_zero() {
                tokio::time::sleep(self.recipient_pause).await;
            }
        }

        report(JobKind::TaskReminders, outcomes)
    }
}

/// Group tasks by normalized assignee, preserving both the recipients'
/// first-appearance order and each recipient's task order.
pub fn group_by_assignee(tasks: Vec<TaskItem>) -> Vec<(String, Vec<TaskItem>)> {
    let mut groups: Vec<(String, Vec<TaskItem>)> = Vec::new();
    for task in tasks {
        let name = normalize_name(&task.assignee);
        match groups.iter_mut().find(|(n, _)| *n == name) {
            Some((_, group)) => group.push(task),
            None => groups.push((name, vec![task])),
        }
    }
    groups
}

fn report(job: JobKind, outcomes: Vec<Outcome>) -> RunReport {
    for outcome in &outcomes {
        tracing::debug!("{} outcome: {:?}", job.as_str(), outcome);
    }
    RunReport { job, outcomes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};
    use wardpost_core::error::{Result, WardpostError};
    use wardpost_store::Announcement;

    struct FakeStore {
        announcement: Option<Announcement>,
        tasks: Vec<TaskItem>,
        unavailable: bool,
    }

    impl PortalReader for FakeStore {
        fn latest_announcement(&self) -> Result<Option<Announcement>> {
            if self.unavailable {
                return Err(WardpostError::Store("unable to open database".into()));
            }
            Ok(self.announcement.clone())
        }

        fn pending_tasks(&self) -> Result<Vec<TaskItem>> {
            if self.unavailable {
                return Err(WardpostError::Store("unable to open database".into()));
            }
            Ok(self.tasks.clone())
        }
    }

    type SentLog = Arc<Mutex<Vec<(String, String)>>>;

    struct RecordingMessenger {
        sent: SentLog,
        fail_targets: Vec<String>,
    }

    impl RecordingMessenger {
        fn new() -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                fail_targets: Vec::new(),
            }
        }

        fn failing_for(targets: &[&str]) -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                fail_targets: targets.iter().map(|s| s.to_string()).collect(),
            }
        }

        fn log(&self) -> SentLog {
            Arc::clone(&self.sent)
        }
    }

    #[async_trait]
    impl Messenger for RecordingMessenger {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send(&self, target: &str, text: &str) -> Result<()> {
            if self.fail_targets.iter().any(|t| t == target) {
                return Err(WardpostError::Channel(format!("refused send to {target}")));
            }
            self.sent
                .lock()
                .unwrap()
                .push((target.to_string(), text.to_string()));
            Ok(())
        }
    }

    fn task(description: &str, assignee: &str, priority: &str) -> TaskItem {
        TaskItem {
            id: 0,
            description: description.into(),
            assignee: assignee.into(),
            priority: priority.into(),
        }
    }

    fn leadership_directory() -> Directory {
        let mut entries = BTreeMap::new();
        entries.insert("WEIMER".to_string(), "id1".to_string());
        entries.insert("PAZ".to_string(), "id2".to_string());
        Directory::from_config(&entries)
    }

    fn dispatcher(store: FakeStore, messenger: RecordingMessenger) -> Dispatcher {
        Dispatcher::new(
            Box::new(store),
            Box::new(messenger),
            leadership_directory(),
            "group-id".into(),
            Duration::ZERO,
        )
    }

    fn sent_of(report: &RunReport) -> Vec<String> {
        report
            .outcomes
            .iter()
            .filter_map(|o| match o {
                Outcome::Sent { target, .. } => Some(target.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_grouping_preserves_first_appearance_and_task_order() {
        let groups = group_by_assignee(vec![
            task("Limpar salão", "Weimer", "Alta"),
            task("Revisar som", "Paz", "Média"),
            task("Comprar flores", " weimer ", "Baixa"),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "WEIMER");
        assert_eq!(groups[0].1[0].description, "Limpar salão");
        assert_eq!(groups[0].1[1].description, "Comprar flores");
        assert_eq!(groups[1].0, "PAZ");
    }

    #[tokio::test]
    async fn test_reminders_send_per_recipient_in_order() {
        let store = FakeStore {
            announcement: None,
            tasks: vec![
                task("Limpar salão", "Weimer", "Alta"),
                task("Comprar flores", "Weimer", "Baixa"),
                task("Revisar som", "Paz", "Média"),
            ],
            unavailable: false,
        };
        let messenger = RecordingMessenger::new();
        let dispatcher = dispatcher(store, messenger);

        let report = dispatcher.run(JobKind::TaskReminders).await;
        assert_eq!(report.sent_count(), 2);
        assert_eq!(sent_of(&report), vec!["id1", "id2"]);

        // Both Weimer tasks in one message, store order, priority-tagged.
        let Outcome::Sent { recipient, .. } = &report.outcomes[0] else {
            panic!("expected Sent, got {:?}", report.outcomes[0]);
        };
        assert_eq!(recipient, "WEIMER");
    }

    #[tokio::test]
    async fn test_reminder_text_contains_ordered_tagged_tasks() {
        let store = FakeStore {
            announcement: None,
            tasks: vec![
                task("Limpar salão", "Weimer", "Alta"),
                task("Comprar flores", "Weimer", "Baixa"),
            ],
            unavailable: false,
        };
        let messenger = RecordingMessenger::new();
        let log = messenger.log();

        let dispatcher = Dispatcher::new(
            Box::new(store),
            Box::new(messenger),
            leadership_directory(),
            "group-id".into(),
            Duration::ZERO,
        );
        let report = dispatcher.run_task_reminders().await;
        assert_eq!(report.sent_count(), 1);

        let sent = log.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (target, text) = &sent[0];
        assert_eq!(target, "id1");
        let alta = text.find("*[Alta]* Limpar salão").unwrap();
        let baixa = text.find("*[Baixa]* Comprar flores").unwrap();
        assert!(alta < baixa);
    }

    #[tokio::test]
    async fn test_unmapped_recipient_is_skipped_not_fatal() {
        let store = FakeStore {
            announcement: None,
            tasks: vec![
                task("Organizar batismo", "Oliveira", "Alta"),
                task("Revisar som", "Paz", "Média"),
            ],
            unavailable: false,
        };
        let dispatcher = dispatcher(store, RecordingMessenger::new());

        let report = dispatcher.run(JobKind::TaskReminders).await;
        assert_eq!(report.sent_count(), 1);
        assert_eq!(
            report.outcomes[0],
            Outcome::RecipientUnresolved {
                recipient: "OLIVEIRA".into()
            }
        );
        assert_eq!(sent_of(&report), vec!["id2"]);
    }

    #[tokio::test]
    async fn test_one_failed_send_does_not_abort_the_loop() {
        let store = FakeStore {
            announcement: None,
            tasks: vec![
                task("Limpar salão", "Weimer", "Alta"),
                task("Revisar som", "Paz", "Média"),
            ],
            unavailable: false,
        };
        let dispatcher = dispatcher(store, RecordingMessenger::failing_for(&["id1"]));

        let report = dispatcher.run(JobKind::TaskReminders).await;
        assert_eq!(report.outcomes.len(), 2);
        assert!(matches!(
            &report.outcomes[0],
            Outcome::SendFailed { target, .. } if target == "id1"
        ));
        assert_eq!(sent_of(&report), vec!["id2"]);
    }

    #[tokio::test]
    async fn test_no_pending_tasks_means_no_sends() {
        let store = FakeStore {
            announcement: None,
            tasks: vec![],
            unavailable: false,
        };
        let dispatcher = dispatcher(store, RecordingMessenger::new());

        let report = dispatcher.run(JobKind::TaskReminders).await;
        assert_eq!(report.outcomes, vec![Outcome::NothingToSend]);
        assert_eq!(report.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_no_announcement_means_no_group_send() {
        let store = FakeStore {
            announcement: None,
            tasks: vec![],
            unavailable: false,
        };
        let dispatcher = dispatcher(store, RecordingMessenger::new());

        let report = dispatcher.run(JobKind::GroupAnnouncement).await;
        assert_eq!(report.outcomes, vec![Outcome::NothingToSend]);
    }

    #[tokio::test]
    async fn test_group_announcement_sends_to_group_identity() {
        let store = FakeStore {
            announcement: Some(Announcement {
                id: 7,
                title: "Mutirão".into(),
                body: "Sábado cedo.".into(),
                link: None,
                posted_at: "2026-08-22".into(),
            }),
            tasks: vec![],
            unavailable: false,
        };
        let dispatcher = dispatcher(store, RecordingMessenger::new());

        let report = dispatcher.run(JobKind::GroupAnnouncement).await;
        assert_eq!(sent_of(&report), vec!["group-id"]);
    }

    #[tokio::test]
    async fn test_store_unavailable_is_contained() {
        let store = FakeStore {
            announcement: None,
            tasks: vec![],
            unavailable: true,
        };
        let dispatcher = dispatcher(store, RecordingMessenger::new());

        let report = dispatcher.run(JobKind::TaskReminders).await;
        assert!(matches!(
            &report.outcomes[0],
            Outcome::StoreUnavailable { .. }
        ));
        assert_eq!(report.sent_count(), 0);
    }

    #[test]
    fn test_job_kind_round_trip() {
        for kind in [JobKind::GroupAnnouncement, JobKind::TaskReminders] {
            assert_eq!(JobKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(JobKind::parse("sweep_chapel"), None);
    }
}
