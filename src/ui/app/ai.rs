use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use std::thread;

use super::{App, Mode};
use crate::core::{AiService, AiTask};

impl App {
    /// Enable the AI menu backed by `service`.
    pub fn with_ai(mut self, service: AiService) -> Self {
        self.ai = Some(Arc::new(service));
        self
    }

    /// Open the AI action menu.
    pub fn open_ai_menu(&mut self) {
        self.ui.dirty = true;
        if self.ai.is_none() {
            self.ui.error = Some("AI unavailable: OPENAI_API_KEY is not set".to_string());
            return;
        }
        if let Some((task, _)) = &self.ai_state.pending {
            self.ui.status = Some(format!("{} request still running", task.title()));
            return;
        }
        if self.files.is_empty() {
            self.ui.status = Some("No changes to send".to_string());
            return;
        }
        self.ui.error = None;
        self.ui.mode = Mode::AiMenu;
    }

    /// Leave the AI menu or reply overlay.
    pub fn close_ai_overlay(&mut self) {
        if matches!(self.ui.mode, Mode::AiMenu | Mode::AiResult) {
            self.ui.mode = Mode::Normal;
            self.ui.dirty = true;
        }
    }

    /// Run `task` over every file of the current mode on a worker thread.
    pub fn start_ai_task(&mut self, task: AiTask) {
        self.close_ai_overlay();
        let Some(service) = self.ai.clone() else {
            return;
        };
        let files = self.files.clone();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = task.run(&service, &files).map_err(|e| e.to_string());
            let _ = tx.send(result);
        });
        self.ai_state.pending = Some((task, rx));
        self.ui.dirty = true;
    }

    /// Apply a finished AI reply, if one arrived.
    pub fn poll_ai_worker(&mut self) {
        let Some((task, rx)) = self.ai_state.pending.take() else {
            return;
        };
        match rx.try_recv() {
            Ok(Ok(text)) => {
                self.ai_state.output = Some((task, text));
                self.ai_state.scroll = 0;
                if self.ui.mode == Mode::Normal {
                    self.ui.mode = Mode::AiResult;
                }
            }
            Ok(Err(message)) => {
                self.ui.error = Some(format!("{} failed: {message}", task.title()));
            }
            Err(TryRecvError::Empty) => {
                self.ai_state.pending = Some((task, rx));
                return;
            }
            Err(TryRecvError::Disconnected) => {
                self.ui.error = Some(format!("{} request ended without a reply", task.title()));
            }
        }
        self.ui.dirty = true;
    }

    /// Reopen the last reply.
    pub fn show_ai_result(&mut self) {
        if self.ai_state.output.is_some() {
            self.ui.mode = Mode::AiResult;
            self.ui.dirty = true;
        }
    }

    /// Scroll the reply overlay by `delta` lines.
    pub fn scroll_ai_result(&mut self, delta: isize) {
        let lines = self
            .ai_state
            .output
            .as_ref()
            .map_or(0, |(_, text)| text.lines().count());
        self.ai_state.scroll = self
            .ai_state
            .scroll
            .saturating_add_signed(delta)
            .min(lines.saturating_sub(1));
        self.ui.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::core::{AiError, Completion};
    use crate::ui::app::tests::{app_with, TWO_FILES};

    struct Reply(Result<&'static str, u16>);

    impl Completion for Reply {
        fn complete(&self, prompt: &str) -> Result<String, AiError> {
            assert!(prompt.contains("README.md"));
            self.0.map(str::to_string).map_err(AiError::Status)
        }
    }

    fn wait_for_reply(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.ai_state.pending.is_some() {
            assert!(Instant::now() < deadline, "AI worker never replied");
            app.poll_ai_worker();
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn menu_needs_a_service() {
        let mut app = app_with(TWO_FILES, "", "");
        app.open_ai_menu();
        assert_eq!(app.ui.mode, Mode::Normal);
        assert!(app.ui.error.as_deref().unwrap().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn menu_needs_changes() {
        let mut app = app_with("", "", "").with_ai(AiService::new(Reply(Ok(""))));
        app.open_ai_menu();
        assert_eq!(app.ui.mode, Mode::Normal);
        assert_eq!(app.ui.status.as_deref(), Some("No changes to send"));
    }

    #[test]
    fn reply_opens_result_overlay() {
        let mut app = app_with(TWO_FILES, "", "")
            .with_ai(AiService::new(Reply(Ok("  fix: rename b to c\n"))));
        app.open_ai_menu();
        assert_eq!(app.ui.mode, Mode::AiMenu);

        app.start_ai_task(AiTask::CommitMessage);
        assert_eq!(app.ui.mode, Mode::Normal);
        wait_for_reply(&mut app);

        assert_eq!(app.ui.mode, Mode::AiResult);
        assert_eq!(
            app.ai_state.output,
            Some((AiTask::CommitMessage, "fix: rename b to c".to_string()))
        );
        app.close_ai_overlay();
        assert_eq!(app.ui.mode, Mode::Normal);
        app.show_ai_result();
        assert_eq!(app.ui.mode, Mode::AiResult);
    }

    #[test]
    fn failed_request_sets_error() {
        let mut app = app_with(TWO_FILES, "", "").with_ai(AiService::new(Reply(Err(500))));
        app.start_ai_task(AiTask::Explain);
        wait_for_reply(&mut app);

        assert_eq!(app.ui.mode, Mode::Normal);
        assert!(app.ai_state.output.is_none());
        assert_eq!(
            app.ui.error.as_deref(),
            Some("Explanation failed: API returned HTTP 500")
        );
    }

    #[test]
    fn result_scroll_is_clamped() {
        let mut app = app_with(TWO_FILES, "", "");
        app.ai_state.output = Some((AiTask::Explain, "a\nb\nc".to_string()));
        app.scroll_ai_result(10);
        assert_eq!(app.ai_state.scroll, 2);
        app.scroll_ai_result(-5);
        assert_eq!(app.ai_state.scroll, 0);
    }
}
