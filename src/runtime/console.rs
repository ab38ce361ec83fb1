use tracing::info;

use crate::app::DisplayConfig;
use crate::constants::{CMD_EXIT, CMD_MENU, CMD_STATUS};
use crate::display::{render_catalog, render_history, render_status, DisplayTheme};
use crate::models::ProviderId;
use crate::routing::{ExecutionEngine, StatusProbe};
use crate::session::{RoutingMode, Session};
use crate::vault::{AuthGate, Prompter};

/// What the run loop should do after one input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interactive prompt loop with the management menu
pub struct Console<'a, P: Prompter> {
    engine: &'a ExecutionEngine,
    probe: &'a StatusProbe,
    prompter: &'a mut P,
    display: DisplayConfig,
    theme: DisplayTheme,
}

impl<'a, P: Prompter> Console<'a, P> {
    pub fn new(
        engine: &'a ExecutionEngine,
        probe: &'a StatusProbe,
        prompter: &'a mut P,
        display: DisplayConfig,
    ) -> Self {
        let theme = display.theme();
        Self {
            engine,
            probe,
            prompter,
            display,
            theme,
        }
    }

    /// Read and handle prompts until the operator quits or input ends
    pub async fn run(&mut self, session: &mut Session) {
        loop {
            println!("\n{}", self.theme.rule());
            println!(
                "SYSTEM: {} | [{}] [{}] [{}]",
                self.theme.mode(session.mode()),
                CMD_MENU,
                CMD_STATUS,
                CMD_EXIT[0]
            );
            println!("{}", self.theme.rule());

            // Ctrl-D or a closed terminal ends the session like `exit`
            let Some(input) = self.ask("You") else {
                return;
            };

            if self.handle_input(session, &input).await == Flow::Quit {
                return;
            }
        }
    }

    /// Dispatch one line of operator input
    pub async fn handle_input(&mut self, session: &mut Session, input: &str) -> Flow {
        let input = input.trim();
        if input.is_empty() {
            return Flow::Continue;
        }

        let lowered = input.to_lowercase();
        if lowered == CMD_MENU {
            self.menu(session);
        } else if lowered == CMD_STATUS {
            self.show_status(session).await;
        } else if CMD_EXIT.contains(&lowered.as_str()) {
            return Flow::Quit;
        } else {
            self.execute(session, input).await;
        }
        Flow::Continue
    }

    /// Read a line; a closed input reads as `None`
    fn ask(&mut self, prompt: &str) -> Option<String> {
        match self.prompter.line(prompt) {
            Ok(input) => Some(input),
            Err(e) => {
                info!("Input closed at '{}': {}", prompt, e);
                None
            }
        }
    }

    async fn execute(&mut self, session: &mut Session, prompt: &str) {
        if let RoutingMode::Auto = session.mode() {
            println!("{}", self.theme.muted("Routing..."));
        }

        match self.engine.execute(session, prompt).await {
            Ok(outcome) => {
                println!(
                    "\n{}\n{}",
                    self.theme
                        .ai_label(&format!("AI ({}):", outcome.model.display_name)),
                    outcome.response
                );
                if let Some(e) = outcome.persist_error {
                    eprintln!(
                        "{}",
                        self.theme.warning(&format!("History not saved: {}", e))
                    );
                }
            }
            Err(e) => eprintln!("{}", self.theme.error(&format!("Request failed: {}", e))),
        }
    }

    async fn show_status(&mut self, session: &Session) {
        println!("{}", self.theme.muted("Pinging registries..."));
        let status = self.probe.probe(session.credentials()).await;
        print!(
            "{}",
            render_status(self.engine.registry(), &status, &self.theme)
        );
    }

    /// Closed input at any menu prompt behaves like `[0] Back`
    fn menu(&mut self, session: &mut Session) {
        println!("\n{}", self.theme.warning("--- SYSTEM MANAGEMENT ---"));
        println!(
            "[1] Switch Model [2] Auto-Mode [3] View History \
             [4] Update Keys [5] Reset Passcode [0] Back"
        );

        let Some(choice) = self.ask("Select") else {
            return;
        };
        match choice.trim() {
            "1" => self.switch_model(session),
            "2" => {
                session.set_auto();
                println!("{}", self.theme.success("Automatic routing enabled."));
            }
            "3" => self.view_history(session),
            "4" => self.update_keys(session),
            "5" => self.reset_passcode(session),
            _ => {}
        }
    }

    fn switch_model(&mut self, session: &mut Session) {
        let engine = self.engine;
        let registry = engine.registry();
        print!("{}", render_catalog(registry, &self.theme));

        let Some(raw) = self.ask("ID") else {
            return;
        };
        match raw.trim().parse::<usize>().ok().and_then(|i| registry.get(i)) {
            Some(model) => {
                println!(
                    "{}",
                    self.theme.success(&format!("Pinned {}.", model.display_name))
                );
                session.pin(model.clone());
            }
            None => println!(
                "{}",
                self.theme
                    .error(&format!("No model with index '{}'.", raw.trim()))
            ),
        }
    }

    fn view_history(&mut self, session: &Session) {
        let recent = session.recent_history(self.display.history_limit);
        print!(
            "{}",
            render_history(recent, self.display.preview_chars, &self.theme)
        );
        // Any answer (or none) returns to the prompt
        let _ = self.ask("Press Enter to return");
    }

    fn update_keys(&mut self, session: &mut Session) {
        println!("\n[1] Update Google Key [2] Update Groq Key [0] Cancel");
        let provider = match self.ask("Choice").as_deref().map(str::trim) {
            Some("1") => ProviderId::Google,
            Some("2") => ProviderId::Groq,
            _ => return,
        };

        let key = match AuthGate::new(&mut *self.prompter).read_key(provider) {
            Ok(key) => key,
            Err(e) => {
                info!("Key entry abandoned: {}", e);
                return;
            }
        };
        session.set_key(provider, &key);
        info!("Updated {} key", provider);

        if self.save(session) {
            println!("{}", self.theme.success("Keys updated successfully."));
        }
    }

    fn reset_passcode(&mut self, session: &mut Session) {
        let passcode = match AuthGate::new(&mut *self.prompter).read_new_passcode() {
            Ok(passcode) => passcode,
            Err(e) => {
                info!("Passcode entry abandoned: {}", e);
                return;
            }
        };
        session.set_passcode(&passcode);
        info!("Passcode changed");

        if self.save(session) {
            println!("{}", self.theme.success("Passcode updated."));
        }
    }

    /// Persist the record, reporting a failure inline
    ///
    /// The change stays in the session and goes out with the next write.
    fn save(&self, session: &Session) -> bool {
        match self.engine.store().persist(session.record()) {
            Ok(()) => true,
            Err(e) => {
                eprintln!(
                    "{}",
                    self.theme
                        .error(&format!("Change kept for this session but not saved: {}", e))
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testing::ScriptedCaller;
    use crate::models::{CallError, MockModelLister, ModelRegistry};
    use crate::routing::Router;
    use crate::vault::{CredentialStore, Credentials, Record, ScriptedPrompter};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Harness {
        _dir: TempDir,
        store: CredentialStore,
        engine: ExecutionEngine,
        probe: StatusProbe,
    }

    fn harness(caller: ScriptedCaller) -> Harness {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("record.json"));
        harness_with_store(dir, store, caller)
    }

    /// The record path is a directory, so every persist fails
    fn unwritable_harness() -> Harness {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("record.json");
        std::fs::create_dir_all(&path).unwrap();
        harness_with_store(dir, CredentialStore::new(path), ScriptedCaller::new())
    }

    fn harness_with_store(
        dir: TempDir,
        store: CredentialStore,
        caller: ScriptedCaller,
    ) -> Harness {
        let registry = Arc::new(ModelRegistry::default());
        let router = Router::new(registry.clone(), Duration::from_secs(1));
        let engine = ExecutionEngine::new(
            registry.clone(),
            router,
            Arc::new(caller),
            store.clone(),
            Duration::from_secs(1),
        );

        let mut lister = MockModelLister::new();
        lister
            .expect_list_models()
            .returning(|_, _, t| Err(CallError::Timeout(t)));
        let probe = StatusProbe::new(registry, Arc::new(lister), Duration::from_secs(1));

        Harness {
            _dir: dir,
            store,
            engine,
            probe,
        }
    }

    fn plain() -> DisplayConfig {
        DisplayConfig {
            color: false,
            ..DisplayConfig::default()
        }
    }

    #[tokio::test]
    async fn test_switch_model_then_prompt_uses_pinned_model() {
        let h = harness(ScriptedCaller::new().reply("gemini-2.5-flash", "fast answer"));
        let mut session = Session::new(h.store.initialize("abc123", "g", "q").unwrap());
        let mut prompter = ScriptedPrompter::new(&["menu", "1", "7", "quick question", "exit"]);

        Console::new(&h.engine, &h.probe, &mut prompter, plain())
            .run(&mut session)
            .await;

        assert!(matches!(
            session.mode(),
            RoutingMode::Manual(m) if m.model_id == "gemini-2.5-flash"
        ));
        assert_eq!(session.history().len(), 1);
        assert_eq!(h.store.load().unwrap().unwrap().history.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_model_index_keeps_mode() {
        let h = harness(ScriptedCaller::new());
        let mut session = Session::new(h.store.initialize("abc123", "g", "q").unwrap());
        let mut prompter = ScriptedPrompter::new(&["menu", "1", "42", "quit"]);

        Console::new(&h.engine, &h.probe, &mut prompter, plain())
            .run(&mut session)
            .await;

        assert_eq!(session.mode(), &RoutingMode::Auto);
    }

    #[tokio::test]
    async fn test_key_update_is_persisted() {
        let h = harness(ScriptedCaller::new());
        let mut session = Session::new(h.store.initialize("abc123", "", "").unwrap());
        let mut prompter = ScriptedPrompter::new(&["menu", "4", "2", "gsk_new", "exit"]);

        Console::new(&h.engine, &h.probe, &mut prompter, plain())
            .run(&mut session)
            .await;

        let stored = h.store.load().unwrap().unwrap();
        assert_eq!(stored.credentials.key_for(ProviderId::Groq), "gsk_new");
        assert_eq!(stored.credentials.key_for(ProviderId::Google), "");
    }

    #[tokio::test]
    async fn test_passcode_reset_keeps_keys_and_history() {
        let h = harness(ScriptedCaller::new().reply("gemini-2.5-pro", "ok"));
        let mut session = Session::new(h.store.initialize("abc123", "g", "q").unwrap());
        session.pin(ModelRegistry::default().find_by_id("gemini-2.5-pro").unwrap().clone());
        let mut prompter = ScriptedPrompter::new(&[
            "hello", "menu", "5", "new-pass", "typo", "new-pass", "new-pass", "exit",
        ]);

        Console::new(&h.engine, &h.probe, &mut prompter, plain())
            .run(&mut session)
            .await;

        let stored = h.store.load().unwrap().unwrap();
        assert!(stored.credentials.passcode_hash.verify("new-pass"));
        assert!(!stored.credentials.passcode_hash.verify("abc123"));
        assert_eq!(stored.credentials.key_for(ProviderId::Google), "g");
        assert_eq!(stored.history.len(), 1);
    }

    #[tokio::test]
    async fn test_reserved_words_are_not_prompts() {
        let h = harness(ScriptedCaller::new());
        let mut session = Session::new(h.store.initialize("abc123", "g", "q").unwrap());
        let mut console_prompter = ScriptedPrompter::new(&[]);
        let mut console = Console::new(&h.engine, &h.probe, &mut console_prompter, plain());

        assert_eq!(console.handle_input(&mut session, "   ").await, Flow::Continue);
        assert_eq!(console.handle_input(&mut session, "//MDS").await, Flow::Continue);
        assert_eq!(console.handle_input(&mut session, "QUIT").await, Flow::Quit);
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_end_of_input_ends_loop() {
        let h = harness(ScriptedCaller::new());
        let mut session = Session::new(h.store.initialize("abc123", "g", "q").unwrap());
        let mut prompter = ScriptedPrompter::new(&[]);

        Console::new(&h.engine, &h.probe, &mut prompter, plain())
            .run(&mut session)
            .await;

        assert_eq!(prompter.prompts, vec!["You".to_string()]);
    }

    #[tokio::test]
    async fn test_end_of_input_inside_menu_backs_out() {
        for script in [
            &["menu"][..],
            &["menu", "1"][..],
            &["menu", "4"][..],
            &["menu", "4", "2"][..],
            &["menu", "5", "new-pass"][..],
        ] {
            let h = harness(ScriptedCaller::new());
            let mut session = Session::new(h.store.initialize("abc123", "g", "q").unwrap());
            let before = std::fs::read(h.store.path()).unwrap();
            let mut prompter = ScriptedPrompter::new(script);

            Console::new(&h.engine, &h.probe, &mut prompter, plain())
                .run(&mut session)
                .await;

            assert_eq!(session.mode(), &RoutingMode::Auto);
            assert_eq!(session.api_key(ProviderId::Groq), "q");
            assert_eq!(std::fs::read(h.store.path()).unwrap(), before);
        }
    }

    #[tokio::test]
    async fn test_unsaved_key_update_keeps_session_running() {
        let h = unwritable_harness();
        let mut session = Session::new(Record::new(Credentials::new("abc123", "", "")));
        let mut prompter = ScriptedPrompter::new(&[
            "menu", "4", "1", "g-new", "menu", "5", "p", "p", "menu", "2", "exit",
        ]);

        Console::new(&h.engine, &h.probe, &mut prompter, plain())
            .run(&mut session)
            .await;

        // The loop kept reading after both failed writes
        assert_eq!(prompter.prompts.iter().filter(|p| *p == "Select").count(), 3);
        assert_eq!(session.api_key(ProviderId::Google), "g-new");
        assert!(session.credentials().passcode_hash.verify("p"));
    }
}
