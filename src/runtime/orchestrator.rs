use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

use super::console::Console;
use super::non_interactive::NonInteractiveRunner;
use crate::{
    app::{load_config, load_config_from, Config},
    cli::{handle_command, Cli, Commands},
    display::{render_history, render_status, DisplayTheme},
    models::{CallError, ModelDescriptor, ModelRegistry, ProviderClient},
    routing::{ExecutionEngine, Router, StatusProbe},
    session::Session,
    vault::{AuthError, AuthGate, CredentialStore, Prompter, TerminalPrompter},
};

/// Main runtime orchestrator
pub struct Orchestrator {
    cli: Cli,
    config: Config,
    theme: DisplayTheme,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => load_config_from(path)?,
            None => match load_config() {
                Ok(cfg) => cfg,
                Err(e) => {
                    eprintln!("Failed to load config: {}. Using defaults.", e);
                    Config::default()
                }
            },
        };

        if let Some(record) = &cli.record {
            config.storage.record_path = Some(record.clone());
        }
        if cli.no_color {
            config.display.color = false;
        }
        let theme = config.display.theme();

        Ok(Self { cli, config, theme })
    }

    /// Run the orchestrator
    pub async fn run(self) -> Result<()> {
        if let Some(command) = &self.cli.command {
            if handle_command(command, &self.config, &self.theme)? {
                return Ok(());
            }
        }

        let registry = Arc::new(ModelRegistry::new(self.config.registry.clone())?);
        let pinned = self.pinned_model(&registry)?;

        let store = match &self.config.storage.record_path {
            Some(path) => CredentialStore::new(path),
            None => CredentialStore::at_default_location()?,
        };

        let mut prompter = TerminalPrompter;
        let mut session = match open_session(&store, &mut prompter, &self.theme) {
            Ok(session) => session,
            Err(e) => match e.downcast_ref::<AuthError>() {
                Some(AuthError::Denied { attempts }) => {
                    eprintln!(
                        "{}",
                        self.theme
                            .error(&format!("Access denied after {} attempts.", attempts))
                    );
                    std::process::exit(1);
                }
                _ => return Err(e),
            },
        };
        if let Some(model) = pinned {
            session.pin(model);
        }

        let client = Arc::new(ProviderClient::new(
            &self.config.providers.google_base_url,
            &self.config.providers.groq_base_url,
        ));
        let routing = &self.config.routing;
        let router = Router::new(registry.clone(), routing.classifier_timeout());
        let theme = self.theme;
        let engine = ExecutionEngine::new(
            registry.clone(),
            router,
            client.clone(),
            store,
            routing.generation_timeout(),
        )
        .with_failover_callback(Arc::new(move |model: &ModelDescriptor, err: &CallError| {
            eprintln!(
                "{}",
                theme.error(&format!(
                    "Error on {}: {}. Healing...",
                    model.display_name, err
                ))
            );
        }));
        let probe = StatusProbe::new(registry.clone(), client, routing.probe_timeout());

        match &self.cli.command {
            Some(Commands::Status) => {
                let status = probe.probe(session.credentials()).await;
                print!("{}", render_status(&registry, &status, &self.theme));
                Ok(())
            }
            Some(Commands::History { limit }) => {
                let limit = limit.unwrap_or(self.config.display.history_limit);
                print!(
                    "{}",
                    render_history(
                        session.recent_history(limit),
                        self.config.display.preview_chars,
                        &self.theme
                    )
                );
                Ok(())
            }
            _ => match self.cli.prompt.clone() {
                Some(prompt) => self.run_once(&engine, &mut session, &prompt).await,
                None => {
                    Console::new(&engine, &probe, &mut prompter, self.config.display.clone())
                        .run(&mut session)
                        .await;
                    Ok(())
                }
            },
        }
    }

    /// Resolve `--model`, or the registry default when automatic start is off
    fn pinned_model(&self, registry: &ModelRegistry) -> Result<Option<ModelDescriptor>> {
        if let Some(id) = &self.cli.model {
            let model = registry.find_by_id(id).with_context(|| {
                format!("Unknown model '{}'. Run `neurolink models` to list ids.", id)
            })?;
            return Ok(Some(model.clone()));
        }

        if !self.config.routing.start_in_auto {
            return Ok(Some(registry.default_model().clone()));
        }
        Ok(None)
    }

    async fn run_once(
        &self,
        engine: &ExecutionEngine,
        session: &mut Session,
        prompt: &str,
    ) -> Result<()> {
        let runner = NonInteractiveRunner::new(engine);
        let result = runner.execute(session, prompt).await;
        println!("{}", runner.format_result(&result, self.cli.output_format));

        if result.failed() {
            std::process::exit(1);
        }
        Ok(())
    }
}

/// First-run setup or passcode unlock
///
/// A successful unlock rewrites the record, which also moves older documents
/// to the current schema. `AuthError::Denied` is returned unwrapped so the
/// caller can tell it apart from other failures.
fn open_session<P: Prompter>(
    store: &CredentialStore,
    prompter: &mut P,
    theme: &DisplayTheme,
) -> Result<Session> {
    let record = store.load().with_context(|| {
        format!(
            "Cannot read credential record at {}",
            store.path().display()
        )
    })?;

    let record = match record {
        None => {
            println!("{}", theme.heading("=== INITIAL NEURAL SETUP ==="));
            let record = AuthGate::new(prompter)
                .setup(store)
                .context("Setup did not complete")?;
            info!("First-run setup complete");
            record
        }
        Some(record) => {
            println!("{}", theme.heading("=== NEURAL LINK LOCKED ==="));
            match AuthGate::new(prompter).unlock(&record) {
                Ok(_) => debug!("Record unlocked"),
                Err(e @ AuthError::Denied { .. }) => return Err(e.into()),
                Err(e) => return Err(e).context("Unlock failed"),
            }
            store.persist(&record).context("Failed to save record")?;
            record
        }
    };

    Ok(Session::new(record))
}
