//! Presentation of job state
//!
//! Rendering is injected into the job handle so pollers never touch a
//! terminal directly. [`TerminalRenderer`] prints colored tables;
//! [`NullRenderer`] keeps everything quiet.

use colored::*;
use hpcjob_core::domain::event::{EventType, JobEvent};
use hpcjob_core::domain::job::JobSnapshot;
use hpcjob_core::domain::transfer::{TransferStatus, TransferTask};
use std::io::{self, Stdout, Write};

/// Sink for everything the job handle shows to a user
pub trait Renderer: Send {
    /// Wipes the previous frame before a polling loop redraws
    fn clear(&mut self);

    /// Shows a job snapshot
    fn render_job(&mut self, snapshot: &JobSnapshot);

    /// Shows the selected events of a snapshot
    fn render_events(&mut self, snapshot: &JobSnapshot, events: &[&JobEvent]);

    /// Shows the logs of a snapshot
    fn render_logs(&mut self, snapshot: &JobSnapshot);

    /// Shows the state of a result transfer
    fn render_transfer(&mut self, task: &TransferTask);

    /// Shows a one-line status message
    fn notice(&mut self, message: &str);
}

/// Renderer that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn clear(&mut self) {}
    fn render_job(&mut self, _snapshot: &JobSnapshot) {}
    fn render_events(&mut self, _snapshot: &JobSnapshot, _events: &[&JobEvent]) {}
    fn render_logs(&mut self, _snapshot: &JobSnapshot) {}
    fn render_transfer(&mut self, _task: &TransferTask) {}
    fn notice(&mut self, _message: &str) {}
}

/// Renderer writing colored text tables to a terminal
pub struct TerminalRenderer<W: Write + Send = Stdout> {
    out: W,
    clear_screen: bool,
}

impl TerminalRenderer<Stdout> {
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            clear_screen: true,
        }
    }
}

impl Default for TerminalRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    /// Renders into any writer, without screen clearing
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            clear_screen: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn clear(&mut self) {
        if self.clear_screen {
            self.emit("\x1B[2J\x1B[1;1H");
        }
    }

    fn render_job(&mut self, snapshot: &JobSnapshot) {
        let mut text = format!("{}\n", "Job Details:".bold());
        text.push_str(&format!("  ID:                {}\n", snapshot.id.cyan()));
        text.push_str(&format!(
            "  Slurm ID:          {}\n",
            display_or_dash(snapshot.slurm_id.as_deref())
        ));
        text.push_str(&format!(
            "  HPC:               {}\n",
            display_or_dash(snapshot.hpc.as_deref())
        ));
        text.push_str(&format!(
            "  Executable folder: {}\n",
            display_or_dash(snapshot.executable_folder.as_ref().map(|f| f.as_str()))
        ));
        text.push_str(&format!(
            "  Data folder:       {}\n",
            display_or_dash(snapshot.data_folder.as_ref().map(|f| f.as_str()))
        ));
        text.push_str(&format!(
            "  Result folder:     {}\n",
            display_or_dash(snapshot.result_folder.as_ref().map(|f| f.as_str()))
        ));
        text.push_str(&format!(
            "  Param:             {}\n",
            serde_json::Value::Object(snapshot.param.clone())
        ));
        text.push_str(&format!(
            "  Slurm:             {}\n",
            serde_json::Value::Object(snapshot.slurm.clone())
        ));
        text.push_str(&format!(
            "  User:              {}\n",
            display_or_dash(snapshot.user_id.as_deref())
        ));
        text.push_str(&format!(
            "  Maintainer:        {}\n",
            display_or_dash(snapshot.maintainer.as_deref())
        ));
        if let Some(created) = snapshot.created_at {
            text.push_str(&format!(
                "  Created:           {}\n",
                created.format("%Y-%m-%d %H:%M:%S")
            ));
        }
        self.emit(&text);
    }

    fn render_events(&mut self, snapshot: &JobSnapshot, events: &[&JobEvent]) {
        let mut text = job_header(snapshot);
        text.push_str(&format!("{}\n", "─".repeat(80).dimmed()));
        for event in events {
            text.push_str(&format!(
                "{} [{}] {}\n",
                event
                    .created_at
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
                    .dimmed(),
                colorize_event_type(&event.event_type),
                event.message
            ));
        }
        text.push_str(&format!("{}\n", "─".repeat(80).dimmed()));
        self.emit(&text);
    }

    fn render_logs(&mut self, snapshot: &JobSnapshot) {
        let mut text = job_header(snapshot);
        text.push_str(&format!("{}\n", "─".repeat(80).dimmed()));
        for log in &snapshot.logs {
            text.push_str(&format!(
                "{} {}\n",
                log.created_at
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
                    .dimmed(),
                log.message
            ));
        }
        text.push_str(&format!("{}\n", "─".repeat(80).dimmed()));
        self.emit(&text);
    }

    fn render_transfer(&mut self, task: &TransferTask) {
        let status = task.status.to_string();
        let status = match task.status {
            TransferStatus::Succeeded => status.green(),
            TransferStatus::Failed => status.red(),
            TransferStatus::Pending | TransferStatus::Unknown => status.yellow(),
        };
        self.emit(&format!(
            "⏳ Transfer of folder {} to {}:{} is {}\n",
            task.folder_id.dimmed(),
            task.destination_endpoint,
            task.destination_path,
            status
        ));
    }

    fn notice(&mut self, message: &str) {
        self.emit(&format!("{}\n", message));
    }
}

fn job_header(snapshot: &JobSnapshot) -> String {
    let mut text = format!("📮 Job ID: {}\n", snapshot.id.cyan());
    if let Some(slurm_id) = &snapshot.slurm_id {
        text.push_str(&format!("🤖 Slurm ID: {}\n", slurm_id));
    }
    text
}

fn display_or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

/// Colorize event types for display
fn colorize_event_type(event_type: &EventType) -> ColoredString {
    let label = event_type.as_str().to_string();
    match event_type {
        EventType::JobEnded => label.green(),
        EventType::JobFailed => label.red(),
        EventType::Other(_) => label.dimmed(),
        _ => label.cyan(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> JobSnapshot {
        serde_json::from_value(json!({
            "id": "j1",
            "slurmId": "4242",
            "hpc": "h1",
            "events": [
                {"type": "JOB_QUEUED", "message": "queued", "createdAt": "2024-03-01T12:00:00Z"},
                {"type": "JOB_ENDED", "message": "done", "createdAt": "2024-03-01T13:00:00Z"}
            ],
            "logs": [
                {"message": "step 1 of 3", "createdAt": "2024-03-01T12:30:00Z"}
            ]
        }))
        .unwrap()
    }

    fn rendered(render: impl FnOnce(&mut TerminalRenderer<Vec<u8>>)) -> String {
        let mut renderer = TerminalRenderer::with_writer(Vec::new());
        render(&mut renderer);
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn test_events_table_lists_selected_events() {
        let snap = snapshot();
        let selected: Vec<&JobEvent> = snap.events.iter().take(1).collect();
        let out = rendered(|r| r.render_events(&snap, &selected));

        assert!(out.contains("j1"));
        assert!(out.contains("4242"));
        assert!(out.contains("JOB_QUEUED"));
        assert!(!out.contains("JOB_ENDED"));
    }

    #[test]
    fn test_logs_table_shows_messages() {
        let snap = snapshot();
        let out = rendered(|r| r.render_logs(&snap));
        assert!(out.contains("step 1 of 3"));
    }

    #[test]
    fn test_writer_renderer_never_clears() {
        let out = rendered(|r| r.clear());
        assert!(out.is_empty());
    }

    #[test]
    fn test_job_details_fill_missing_fields() {
        let snap = snapshot();
        let out = rendered(|r| r.render_job(&snap));
        assert!(out.contains("Job Details:"));
        assert!(out.contains("Result folder:     -"));
    }
}
