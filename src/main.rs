//! Application entry point: a terminal communication board.
//!
//! # Startup sequence
//!
//! 1. Initialise logging and parse the command line.
//! 2. Load [`AppConfig`] from disk (writes the defaults on first run).
//! 3. Create the [`tokio`] runtime.
//! 4. Open the key-value store (`FileStore`, or `MemoryStore` with
//!    `--ephemeral`).
//! 5. Build the platform adapters and the feedback pipeline.
//! 6. Read commands from stdin until `:quit` or end of input.
//!
//! Typing an item's id or label presses it; lines starting with `:` are
//! commands (`:help` lists them).  Each press runs as its own task, so a new
//! press interrupts one that is still speaking.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use echo_kids::config::{AppConfig, AppPaths};
use echo_kids::diagnostics::run_diagnostics;
use echo_kids::feedback::{FeedbackPipeline, StageResult};
use echo_kids::model::{
    favorites, find_item, toggle_favorite, visible_items, AppSettings, ButtonMode, Category,
    VocabularyItem,
};
use echo_kids::platform::{CpalAudio, SystemSpeech, TerminalHaptics};
use echo_kids::press::{PressHandler, PressReport};
use echo_kids::storage::{
    clear_all_data, FileStore, KeyValueStore, MemoryStore, SettingsStore, VocabularyStore,
};
use echo_kids::voice::{
    available_voices, build_voice_options, default_voice, filter_voices, VoiceCategory,
    VoiceFilter,
};

const HELP: &str = "\
<id or label>        press an item
:list                show visible items (* marks favourites)
:favs                show favourites
:fav <id>            toggle favourite
:long <id>           long press (item details; ignored in child mode)
:categories          show categories and whether they are hidden
:hide <category>     hide a category
:show <category>     show a hidden category
:mode [<mode>]       show or set button mode (one-word, two-word, sentence)
:volume <0..1>       set volume
:rate <rate>         set speech rate
:voice [<id>]        show or set the voice
:voices [all|female|male]  list voices
:child on|off        toggle child mode
:test                run audio diagnostics
:reset               delete all saved data
:quit                exit";

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// Terminal communication board with spoken feedback.
#[derive(Debug, Parser)]
#[command(name = "echo-kids", version, about)]
struct Args {
    /// Keep all data in memory; nothing is written to disk
    #[arg(long)]
    ephemeral: bool,

    /// Path to a config.toml to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// Front-end state: the loaded vocabulary plus handles to the core.
struct Board {
    kv: Arc<dyn KeyValueStore>,
    settings: Arc<SettingsStore>,
    vocabulary: VocabularyStore,
    handler: Arc<PressHandler>,
    items: Vec<VocabularyItem>,
    categories: Vec<Category>,
}

impl Board {
    async fn open(
        kv: Arc<dyn KeyValueStore>,
        handler: Arc<PressHandler>,
        settings: Arc<SettingsStore>,
    ) -> Self {
        let vocabulary = VocabularyStore::new(Arc::clone(&kv));
        let items = vocabulary.load().await;
        let categories = vocabulary.load_categories().await;
        Self {
            kv,
            settings,
            vocabulary,
            handler,
            items,
            categories,
        }
    }

    /// Returns `false` when the user asked to quit.
    async fn handle_line(&mut self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return true;
        }
        let Some(command) = line.strip_prefix(':') else {
            self.press(line);
            return true;
        };

        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };

        match name {
            "quit" | "q" => return false,
            "help" | "h" => println!("{HELP}"),
            "list" => self.list().await,
            "favs" => self.print_items(&self.vocabulary.load_favorites().await),
            "fav" => self.toggle_favorite(arg).await,
            "long" => self.long_press(arg),
            "categories" => self.print_categories().await,
            "hide" => self.set_category_hidden(arg, true).await,
            "show" => self.set_category_hidden(arg, false).await,
            "mode" => self.mode(arg).await,
            "volume" => self.volume(arg).await,
            "rate" => self.rate(arg).await,
            "voice" => self.voice(arg).await,
            "voices" => self.voices(arg).await,
            "child" => self.child(arg),
            "test" => self.diagnostics().await,
            "reset" => self.reset().await,
            other => println!("unknown command :{other} (try :help)"),
        }
        true
    }

    fn press(&self, query: &str) {
        let Some(item) = find_item(&self.items, query) else {
            println!("no item called {query:?}");
            return;
        };

        let press = self
            .handler
            .spawn_press(item.clone(), |activated| println!("> {}", activated.text));
        tokio::spawn(async move {
            match press.await {
                Ok(report) => print_report(&report),
                Err(e) => log::error!("press task failed: {e}"),
            }
        });
    }

    async fn list(&self) {
        let settings = self.settings.load().await;
        let visible: Vec<VocabularyItem> = visible_items(&self.items, &settings)
            .into_iter()
            .cloned()
            .collect();
        self.print_items(&visible);
    }

    fn print_items(&self, items: &[VocabularyItem]) {
        if items.is_empty() {
            println!("(none)");
        }
        for item in items {
            let star = if item.is_favorite { "*" } else { " " };
            let category = item.category.as_deref().unwrap_or("-");
            println!("{star} {:<12} {:<14} [{category}]", item.id, item.text);
        }
    }

    async fn toggle_favorite(&mut self, id: &str) {
        match toggle_favorite(&mut self.items, id) {
            Ok(now) => {
                self.vocabulary.save(&self.items).await;
                self.vocabulary.save_favorites(&favorites(&self.items)).await;
                println!("{id} {}", if now { "added to favourites" } else { "removed from favourites" });
            }
            Err(e) => println!("{e}"),
        }
    }

    fn long_press(&self, query: &str) {
        let Some(item) = find_item(&self.items, query) else {
            println!("no item called {query:?}");
            return;
        };
        let shown = self.handler.on_long_press(item, |item| {
            println!("{}: {}", item.id, item.text);
            if let Some(two) = &item.two_word {
                println!("  two-word: {two}");
            }
            if let Some(message) = &item.message {
                println!("  sentence: {message}");
            }
        });
        if !shown {
            println!("long press is disabled in child mode");
        }
    }

    async fn print_categories(&self) {
        let settings = self.settings.load().await;
        for category in &self.categories {
            let hidden = !settings.is_category_visible(Some(&category.id));
            println!(
                "{:<12} {:<12}{}",
                category.id,
                category.name,
                if hidden { " (hidden)" } else { "" }
            );
        }
    }

    async fn set_category_hidden(&self, id: &str, hidden: bool) {
        if !self.categories.iter().any(|c| c.id == id) {
            println!("no category called {id:?}");
            return;
        }
        let id = id.to_string();
        self.settings
            .update(move |s| {
                if hidden {
                    s.hidden_categories.insert(id);
                } else {
                    s.hidden_categories.remove(&id);
                }
            })
            .await;
    }

    async fn mode(&self, arg: &str) {
        if arg.is_empty() {
            let settings = self.settings.load().await;
            println!("button mode: {}", settings.button_mode);
            return;
        }
        match arg.parse::<ButtonMode>() {
            Ok(mode) => {
                self.settings.update(|s| s.button_mode = mode).await;
                println!("button mode: {mode}");
            }
            Err(e) => println!("{e}"),
        }
    }

    async fn volume(&self, arg: &str) {
        match arg.parse::<f32>() {
            Ok(v) if (0.0..=1.0).contains(&v) => {
                self.settings.update(|s| s.volume = v).await;
            }
            _ => println!("volume must be a number between 0 and 1"),
        }
    }

    async fn rate(&self, arg: &str) {
        match arg.parse::<f32>() {
            Ok(r) if r.is_finite() && r > 0.0 => {
                self.settings.update(|s| s.speech_rate = r).await;
            }
            _ => println!("rate must be a positive number"),
        }
    }

    async fn voice(&self, arg: &str) {
        if arg.is_empty() {
            println!("voice: {}", self.settings.load().await.tts_voice);
            return;
        }
        let voice = arg.to_string();
        self.settings.update(move |s| s.tts_voice = voice).await;
    }

    async fn voices(&self, arg: &str) {
        let filter = match arg {
            "" | "all" => VoiceFilter::All,
            "female" => VoiceFilter::Only(VoiceCategory::AdultFemale),
            "male" => VoiceFilter::Only(VoiceCategory::AdultMale),
            other => {
                println!("unknown filter {other:?}");
                return;
            }
        };
        let voices = available_voices(self.handler.pipeline().speech().as_ref()).await;
        let current = self.settings.load().await.tts_voice;
        for option in filter_voices(&build_voice_options(&voices), filter) {
            let mark = if option.id == current { "*" } else { " " };
            println!(
                "{mark} {:<8} {:<24} {} ({})",
                option.language,
                option.name,
                option.id,
                option.category.as_str()
            );
        }
        println!("default: {}", default_voice(&voices));
    }

    fn child(&self, arg: &str) {
        match arg {
            "on" => self.handler.set_child_mode(true),
            "off" => self.handler.set_child_mode(false),
            _ => {}
        }
        println!(
            "child mode: {}",
            if self.handler.is_child_mode() { "on" } else { "off" }
        );
    }

    async fn diagnostics(&self) {
        let report = run_diagnostics(self.handler.pipeline()).await;
        for (name, result) in report.checks() {
            println!("{name:<16} {result}");
        }
    }

    async fn reset(&mut self) {
        clear_all_data(self.kv.as_ref()).await;
        self.items = self.vocabulary.load().await;
        self.categories = self.vocabulary.load_categories().await;
        self.handler.pipeline().session().reset().await;
        println!("all data cleared");
    }
}

fn print_report(report: &PressReport) {
    match report.outcome.delivered_by() {
        Some(stage) => println!("  \"{}\" via {}", report.utterance, stage.label()),
        None => println!("  \"{}\" produced no feedback", report.utterance),
    }
    for (stage, result) in &report.outcome.stages {
        if let StageResult::Failed(e) = result {
            println!("  {} failed: {e}", stage.label());
        }
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Echo Kids starting up");

    let args = Args::parse();

    // 2. Configuration
    let first_run = args.config.is_none() && !AppPaths::new().config_file.exists();
    let loaded = match &args.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let config = loaded.unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    if first_run {
        match config.save() {
            Ok(()) => log::info!(
                "Wrote default config to {}",
                AppPaths::new().config_file.display()
            ),
            Err(e) => log::warn!("Failed to write default config: {e}"),
        }
    }

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(run(config, args.ephemeral))
}

async fn run(config: AppConfig, ephemeral: bool) -> Result<()> {
    // 4. Storage
    let kv: Arc<dyn KeyValueStore> = if ephemeral {
        log::info!("storage: in-memory (nothing is saved)");
        Arc::new(MemoryStore::new())
    } else {
        let store = FileStore::new(config.data_dir());
        log::info!("storage: {}", store.dir().display());
        Arc::new(store)
    };
    let settings = Arc::new(SettingsStore::new(Arc::clone(&kv)));
    log_settings(&settings.load().await);

    // 5. Platform + pipeline
    let pipeline = Arc::new(
        FeedbackPipeline::new(
            Arc::new(SystemSpeech::new(config.speech.backend)),
            Arc::new(CpalAudio::new()),
            Arc::new(TerminalHaptics::new(config.haptics.enabled)),
        )
        .with_tone(config.tone.source(), config.tone.volume)
        .with_fallback_pattern(config.haptics.fallback())
        .with_default_language(config.speech.default_language.clone()),
    );
    let handler = Arc::new(
        PressHandler::new(pipeline, Arc::clone(&settings))
            .with_press_pattern(config.haptics.press())
            .with_highlight(Duration::from_millis(config.press.highlight_ms)),
    );

    let mut board = Board::open(kv, handler, settings).await;

    // 6. Command loop
    println!("Echo Kids. Type an item to speak it, :help for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if !board.handle_line(&line).await {
            break;
        }
    }

    log::info!("Echo Kids shutting down");
    Ok(())
}

fn log_settings(settings: &AppSettings) {
    log::info!(
        "settings: mode={} volume={} rate={} voice={}",
        settings.button_mode,
        settings.volume,
        settings.speech_rate,
        settings.tts_voice
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn flags_parse() {
        let args =
            Args::try_parse_from(["echo-kids", "--ephemeral", "--config", "/tmp/c.toml"]).unwrap();
        assert!(args.ephemeral);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.toml")));

        let args = Args::try_parse_from(["echo-kids"]).unwrap();
        assert!(!args.ephemeral);
        assert!(args.config.is_none());
    }

    #[test]
    fn unknown_flag_and_missing_path_are_rejected() {
        assert!(Args::try_parse_from(["echo-kids", "--loud"]).is_err());
        assert!(Args::try_parse_from(["echo-kids", "--config"]).is_err());
    }
}
