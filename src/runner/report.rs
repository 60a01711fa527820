use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::modules::{ModuleResult, Outcome};

/// One (host, task, outcome) record.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRecord {
    pub host: String,
    pub task: String,
    pub outcome: Outcome,
    pub msg: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnreachableHost {
    pub host: String,
    pub reason: String,
}

/// Structured result of one manifest run, in execution order.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub records: Vec<TaskRecord>,
    pub unreachable: Vec<UnreachableHost>,
    pub fatal: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RunSummary {
    pub changed: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            unreachable: Vec::new(),
            fatal: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record(&mut self, host: &str, task: &str, result: ModuleResult) {
        self.records.push(TaskRecord {
            host: host.to_string(),
            task: task.to_string(),
            outcome: result.outcome,
            msg: result.msg,
        });
    }

    pub fn record_unreachable(&mut self, host: &str, reason: String) {
        self.unreachable.push(UnreachableHost {
            host: host.to_string(),
            reason,
        });
    }

    pub fn set_fatal(&mut self, reason: String) {
        self.fatal = Some(reason);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for record in &self.records {
            match record.outcome {
                Outcome::Changed => summary.changed += 1,
                Outcome::Unchanged => summary.unchanged += 1,
                Outcome::Failed => summary.failed += 1,
            }
        }
        summary
    }

    /// True when every task converged and every host was reached.
    pub fn success(&self) -> bool {
        self.fatal.is_none()
            && self.unreachable.is_empty()
            && self.summary().failed == 0
    }

    /// Print the report to the console.
    pub fn render(&self) {
        println!();
        println!("📋 Run Report");
        println!("==============================================");

        let mut current_host: Option<&str> = None;
        for record in &self.records {
            if current_host != Some(record.host.as_str()) {
                println!();
                println!("Host: {}", record.host);
                current_host = Some(record.host.as_str());
            }

            let icon = match record.outcome {
                Outcome::Changed => "✅",
                Outcome::Unchanged => "•",
                Outcome::Failed => "❌",
            };

            match &record.msg {
                Some(msg) => println!("  {} {}: {} - {}", icon, record.task, record.outcome, msg),
                None => println!("  {} {}: {}", icon, record.task, record.outcome),
            }
        }

        if !self.unreachable.is_empty() {
            println!();
            println!("⚠️  Unreachable hosts:");
            for entry in &self.unreachable {
                println!("  • {}: {}", entry.host, entry.reason);
            }
        }

        if let Some(fatal) = &self.fatal {
            println!();
            println!("❌ Run halted: {fatal}");
        }

        let summary = self.summary();
        println!();
        println!(
            "Summary: {} changed, {} unchanged, {} failed",
            summary.changed, summary.unchanged, summary.failed
        );
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}
