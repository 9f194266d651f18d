use std::path::PathBuf;

use engine::{ConfigStore, ConflictOutcome, EngineError, TransferEvent, TransferSession};
use tracing::{info, warn};

use crate::conflict::ConflictPrompt;
use crate::display_types::DisplayMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warning(String),
    Error(String),
}

/// Application state, holding all UI and run-related data.
#[derive(Debug)]
pub struct AppState {
    // Input fields
    pub destination: String,
    pub mode: DisplayMode,

    // Run state
    pub session: TransferSession,
    /// Names shown in the file list. Kept while the batch is lent to a run.
    pub listed: Vec<String>,
    pub progress: f32,
    pub current_file_name: String,
    pub conflict: Option<ConflictPrompt>,

    // UI state
    pub notice: Option<Notice>,
    config: ConfigStore,
}

impl AppState {
    pub fn new(config: ConfigStore) -> Self {
        let destination = config.load_or_default().last_destination;
        AppState {
            destination,
            mode: DisplayMode::default(),
            session: TransferSession::new(),
            listed: Vec::new(),
            progress: 0.0,
            current_file_name: String::new(),
            conflict: None,
            notice: None,
            config,
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    /// Add dropped or picked files. Directories are ignored; duplicates are
    /// kept in order.
    pub fn add_files<I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        for path in paths {
            match self.session.add_file(&path) {
                Ok(true) => self.refresh_listed(),
                Ok(false) => {}
                Err(EngineError::RunInProgress) => {
                    self.notice = Some(Notice::Warning(
                        "Cannot change the selection while files are being transferred".to_string(),
                    ));
                    return;
                }
                Err(e) => {
                    self.notice = Some(Notice::Error(e.to_string()));
                    return;
                }
            }
        }
    }

    pub fn clear_files(&mut self) {
        match self.session.clear() {
            Ok(()) => self.refresh_listed(),
            Err(e) => self.notice = Some(Notice::Warning(e.to_string())),
        }
    }

    pub fn set_destination(&mut self, destination: String) {
        self.destination = destination;
    }

    /// Destination picked from the folder dialog; remembered right away.
    pub fn browse_destination(&mut self, folder: PathBuf) {
        self.destination = folder.display().to_string();
        self.save_config();
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        if !self.is_running() {
            self.mode = mode;
        }
    }

    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let destination = self.destination.trim().to_string();
        if self.session.batch().is_empty() || destination.is_empty() {
            self.notice = Some(Notice::Warning("Select files and destination".to_string()));
            return;
        }

        self.save_config();
        match self.session.start(&destination, self.mode.to_engine_mode()) {
            Ok(()) => {
                info!(destination = %destination, mode = %self.mode, "transfer started");
                self.progress = 0.0;
                self.current_file_name.clear();
                self.notice = None;
            }
            Err(e) => self.notice = Some(Notice::Error(e.to_string())),
        }
    }

    /// Drain run events and pick up a pending conflict, if any.
    pub fn tick(&mut self) {
        for event in self.session.poll_events() {
            self.handle_event(event);
        }
        if self.conflict.is_none() {
            if let Some(request) = self.session.next_conflict() {
                self.conflict = Some(ConflictPrompt::new(request.file_name));
            }
        }
    }

    pub fn handle_event(&mut self, event: TransferEvent) {
        match event {
            TransferEvent::RunStarted { total, mode, .. } => {
                info!(total, %mode, "run started");
                self.mode = DisplayMode::from_engine_mode(mode);
            }
            TransferEvent::ItemStarted { name, .. } => {
                self.current_file_name = name;
            }
            TransferEvent::ItemCompleted { .. } => {}
            TransferEvent::Progress(progress) => {
                self.progress = progress.ratio();
            }
            TransferEvent::Completed(summary) => {
                info!(files = summary.total(), "run completed");
                self.conflict = None;
                self.current_file_name.clear();
                self.refresh_listed();
                self.notice = Some(Notice::Info("Operation completed".to_string()));
            }
            TransferEvent::Failed { message, remaining } => {
                warn!(%message, remaining, "run stopped");
                self.conflict = None;
                self.current_file_name.clear();
                self.refresh_listed();
                self.notice = Some(Notice::Error(format!("Transfer stopped: {}", message)));
            }
        }
    }

    pub fn select_conflict_outcome(&mut self, outcome: ConflictOutcome) {
        if let Some(prompt) = &mut self.conflict {
            prompt.outcome = outcome;
        }
    }

    pub fn toggle_apply_to_all(&mut self, apply_to_all: bool) {
        if let Some(prompt) = &mut self.conflict {
            prompt.apply_to_all = apply_to_all;
        }
    }

    pub fn confirm_conflict(&mut self) {
        let Some(prompt) = self.conflict.take() else {
            return;
        };
        if let Err(e) = self.session.resolve_conflict(prompt.decision()) {
            self.notice = Some(Notice::Error(e.to_string()));
        }
    }

    pub fn save_config(&self) {
        self.config.remember_destination(self.destination.trim());
    }

    fn refresh_listed(&mut self) {
        self.listed = self.session.batch().iter().map(|item| item.file_name()).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn state_in(dir: &Path) -> AppState {
        AppState::new(ConfigStore::new(dir.join("config.json")))
    }

    fn write(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, name).expect("Failed to write test file");
        path
    }

    /// Tick until the run ends, answering each conflict with `answer`.
    fn drive(state: &mut AppState, mut answer: impl FnMut(&mut AppState)) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while state.is_running() {
            assert!(Instant::now() < deadline, "run did not finish in time");
            state.tick();
            if state.conflict.is_some() {
                answer(state);
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        state.tick();
    }

    #[test]
    fn test_start_requires_files_and_destination() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut state = state_in(temp_dir.path());

        state.start();
        assert_eq!(
            state.notice,
            Some(Notice::Warning("Select files and destination".to_string()))
        );

        state.add_files(vec![write(temp_dir.path(), "a.jpg")]);
        state.set_destination("   ".to_string());
        state.start();
        assert!(!state.is_running());
    }

    #[test]
    fn test_add_files_ignores_directories_and_keeps_duplicates() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut state = state_in(temp_dir.path());
        let a = write(temp_dir.path(), "a.jpg");

        state.add_files(vec![a.clone(), temp_dir.path().to_path_buf(), a]);
        assert_eq!(state.listed, vec!["a.jpg".to_string(), "a.jpg".to_string()]);

        state.clear_files();
        assert!(state.listed.is_empty());
    }

    #[test]
    fn test_run_started_shows_the_run_mode() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut state = state_in(temp_dir.path());
        state.add_files(vec![write(temp_dir.path(), "a.jpg")]);
        assert_eq!(state.mode, DisplayMode::Move);

        state
            .session
            .start(temp_dir.path().join("out"), engine::Mode::Copy)
            .expect("Failed to start run");
        drive(&mut state, |_| panic!("no conflict expected"));

        assert_eq!(state.mode, DisplayMode::Copy);
        assert!(temp_dir.path().join("a.jpg").exists());
    }

    #[test]
    fn test_copy_run_completes_and_remembers_destination() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dest = temp_dir.path().join("out");
        let mut state = state_in(temp_dir.path());
        state.add_files(vec![write(temp_dir.path(), "a.jpg"), write(temp_dir.path(), "b.png")]);
        state.set_destination(dest.display().to_string());
        state.set_mode(DisplayMode::Copy);

        state.start();
        assert!(state.is_running());
        state.add_files(vec![write(temp_dir.path(), "c.gif")]);
        assert!(matches!(state.notice, Some(Notice::Warning(_))));

        drive(&mut state, |_| panic!("no conflict expected"));

        assert_eq!(state.notice, Some(Notice::Info("Operation completed".to_string())));
        assert!(state.listed.is_empty());
        assert!(dest.join("a.jpg").exists());
        assert!(temp_dir.path().join("a.jpg").exists());

        let reopened = state_in(temp_dir.path());
        assert_eq!(reopened.destination, dest.display().to_string());
    }

    #[test]
    fn test_conflict_prompt_defaults_to_keep_both() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let src = temp_dir.path().join("src");
        let dest = temp_dir.path().join("out");
        fs::create_dir_all(&src).expect("Failed to create source dir");
        fs::create_dir_all(&dest).expect("Failed to create dest dir");
        write(&dest, "a.jpg");

        let mut state = state_in(temp_dir.path());
        state.add_files(vec![write(&src, "a.jpg")]);
        state.set_destination(dest.display().to_string());
        state.start();

        let mut prompts = Vec::new();
        drive(&mut state, |state| {
            let prompt = state.conflict.clone().expect("Failed to get prompt");
            prompts.push(prompt.file_name.clone());
            assert_eq!(prompt.outcome, ConflictOutcome::KeepBoth);
            state.confirm_conflict();
        });

        assert_eq!(prompts, vec!["a.jpg".to_string()]);
        assert!(dest.join("a_1.jpg").exists());
        assert!(!src.join("a.jpg").exists());
    }

    #[test]
    fn test_apply_to_all_asks_once() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let src = temp_dir.path().join("src");
        let dest = temp_dir.path().join("out");
        fs::create_dir_all(&src).expect("Failed to create source dir");
        fs::create_dir_all(&dest).expect("Failed to create dest dir");
        for name in ["a.jpg", "b.jpg"] {
            fs::write(dest.join(name), "old").expect("Failed to write existing file");
        }

        let mut state = state_in(temp_dir.path());
        state.add_files(vec![write(&src, "a.jpg"), write(&src, "b.jpg")]);
        state.set_destination(dest.display().to_string());
        state.set_mode(DisplayMode::Copy);
        state.start();

        let mut asked = 0;
        drive(&mut state, |state| {
            asked += 1;
            state.select_conflict_outcome(ConflictOutcome::Replace);
            state.toggle_apply_to_all(true);
            state.confirm_conflict();
        });

        assert_eq!(asked, 1);
        for name in ["a.jpg", "b.jpg"] {
            let content = fs::read_to_string(dest.join(name)).expect("Failed to read file");
            assert_eq!(content, name);
        }
    }

    #[test]
    fn test_failed_run_keeps_remaining_files_listed() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dest = temp_dir.path().join("out");
        fs::create_dir_all(&dest).expect("Failed to create dest dir");
        write(&dest, "a.jpg");

        let mut state = state_in(temp_dir.path());
        let b = write(temp_dir.path(), "b.txt");
        state.add_files(vec![write(temp_dir.path(), "a.jpg"), b.clone()]);
        state.set_destination(dest.display().to_string());
        state.set_mode(DisplayMode::Copy);
        state.start();

        drive(&mut state, |state| {
            fs::remove_file(&b).expect("Failed to remove source");
            state.select_conflict_outcome(ConflictOutcome::Skip);
            state.confirm_conflict();
        });

        assert!(matches!(&state.notice, Some(Notice::Error(m)) if m.starts_with("Transfer stopped")));
        assert_eq!(state.listed, vec!["b.txt".to_string()]);
    }
}
