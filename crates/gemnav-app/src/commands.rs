//! Plugin command registry and the `gem` command.

use gemnav_client::config::ClientConfig;
use gemnav_client::engine::{Engine, VisitOutcome};
use gemnav_client::state::{FileLinkStore, LinkStore};
use gemnav_client::style::Styler;
use gemnav_client::transport::{Fetch, GeminiTransport};
use gemnav_net::{GeminiTlsProvider, StdNetworkBackend};
use gemnav_types::error::{GemError, Result};

/// A command exposed through the plugin surface.
pub trait Command {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn usage(&self) -> &str;
    fn execute(&self, args: &[&str]) -> Result<String>;
}

/// Registry of plugin commands.
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    pub fn register(&mut self, command: Box<dyn Command>) {
        self.commands.push(command);
    }

    /// The `capabilities` listing consumed by the host shell: one
    /// command per line; name, description, and usage tab-separated.
    pub fn capabilities(&self) -> String {
        let mut out = String::new();
        for c in &self.commands {
            out.push_str(&format!("{}\t{}\t{}\n", c.name(), c.description(), c.usage()));
        }
        out
    }

    pub fn help(&self) -> String {
        let mut out =
            String::from("usage: gemnav capabilities | help | run <command> [args...]\n\ncommands:\n");
        for c in &self.commands {
            out.push_str(&format!("  {}\n      {}\n", c.usage(), c.description()));
        }
        out
    }

    pub fn run(&self, name: &str, args: &[&str]) -> Result<String> {
        let cmd = self
            .commands
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| GemError::Command(format!("unknown command: {name}")))?;
        cmd.execute(args)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the default registry.
pub fn registry() -> CommandRegistry {
    let mut reg = CommandRegistry::new();
    reg.register(Box::new(GemCmd));
    reg
}

// -------------------------------------------------------------------
// gem
// -------------------------------------------------------------------

/// `gem <url>` visits a page, `gem <n>` follows link n from the
/// previous invocation, `gem search <query>` asks every configured
/// engine.
struct GemCmd;

impl Command for GemCmd {
    fn name(&self) -> &str {
        "gem"
    }

    fn description(&self) -> &str {
        "Browse Gemini capsules"
    }

    fn usage(&self) -> &str {
        "gem <url | link-number | search <query>>"
    }

    fn execute(&self, args: &[&str]) -> Result<String> {
        let config = ClientConfig::load()?;
        let mut store = FileLinkStore::new(config.state_file.clone());
        let mut fetch = GeminiTransport::new(
            Box::new(StdNetworkBackend),
            Box::new(GeminiTlsProvider::new()),
        );
        run_gem(args, &mut fetch, &mut store, &config, Styler::auto())
    }
}

/// Argument classification and outcome formatting, separated from the
/// production wiring so tests can drive it with scripted transports.
fn run_gem(
    args: &[&str],
    fetch: &mut dyn Fetch,
    store: &mut dyn LinkStore,
    config: &ClientConfig,
    styler: Styler,
) -> Result<String> {
    let mut engine = Engine::new(fetch, store, config, styler);

    match args {
        [] => Err(GemError::Command(
            "usage: gem <url | link-number | search <query>>".to_string(),
        )),
        ["search"] => Err(GemError::Command("usage: gem search <query>".to_string())),
        ["search", query @ ..] => {
            let outcome = engine.search(&query.join(" "))?;
            log::debug!("search matched {} links", outcome.link_count);
            Ok(outcome.text)
        },
        [target, ..] => {
            // A bare positive integer follows a link from the last
            // page; anything else is treated as a URL.
            let outcome = match target.parse::<usize>() {
                Ok(n) => engine.follow(n)?,
                Err(_) => engine.visit(target)?,
            };
            Ok(format_outcome(outcome))
        },
    }
}

fn format_outcome(outcome: VisitOutcome) -> String {
    match outcome {
        VisitOutcome::Page { text, .. } => text,
        VisitOutcome::Raw { text } => text,
        VisitOutcome::Input { prompt, template } => {
            format!("{prompt}\nanswer with: gem \"{template}?<answer>\"")
        },
    }
}
