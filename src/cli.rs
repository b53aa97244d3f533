use std::io::{self, Write};
use std::path::PathBuf;

use async_trait::async_trait;
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use futures::executor::block_on;

use crate::app::{AppState, CUSTOM_RANGE_NAME};
use crate::config::{init_logging, Config, DEFAULT_STORE_DIR, DRILL_BATCH};
use crate::display::{
    presets_table, print_error, print_success, print_warning, range_grid, saved_ranges_table,
    stats_line,
};
use crate::error::{TrainerError, TrainerResult};
use crate::export::to_preset_json;
use crate::presets::PresetCatalog;
use crate::ranges::{selection_from_exprs, Action};
use crate::saved::{Always, Confirm, SaveOutcome, SavedRangeRepository};
use crate::session::{prompt_yn, run_drill_session, run_recall_session};
use crate::storage::FileStore;

#[derive(Parser)]
#[command(
    name = "range-trainer",
    version = "1.0.0",
    about = "Preflop range trainer: paint ranges, save them and drill them."
)]
struct Cli {
    /// Directory holding saved ranges
    #[arg(long, global = true, default_value = DEFAULT_STORE_DIR)]
    store: PathBuf,
    /// Presets document (defaults to the bundled presets)
    #[arg(long, global = true)]
    presets: Option<PathBuf>,
    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// No log output
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

/// Where the starting range comes from.
#[derive(Args, Clone, Default)]
struct Source {
    /// Preset key (see `presets`)
    #[arg(long, conflicts_with = "saved")]
    preset: Option<String>,
    /// Saved range name (see `list`)
    #[arg(long)]
    saved: Option<String>,
}

/// Hands painted on top of the source, as range expressions.
#[derive(Args, Clone, Default)]
struct Paint {
    /// Hands to raise (e.g. "TT+,AQs+")
    #[arg(long, default_value = "")]
    raise: String,
    /// Hands to call
    #[arg(long, default_value = "")]
    call: String,
    /// Hands to mix
    #[arg(long, default_value = "")]
    mix: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a range on the 13x13 grid
    Grid {
        #[command(flatten)]
        source: Source,
        #[command(flatten)]
        paint: Paint,
    },
    /// List available presets
    Presets,
    /// Save a range under a name
    Save {
        name: String,
        #[command(flatten)]
        source: Source,
        #[command(flatten)]
        paint: Paint,
        /// Overwrite an existing range without asking
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// List saved ranges, newest first
    List,
    /// Delete a saved range
    Delete {
        name: String,
        /// Delete without asking
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Print a saved range as a presets.json entry
    Export { name: String },
    /// Repaint a range from memory and get scored
    Recall {
        #[command(flatten)]
        source: Source,
    },
    /// Quiz individual hands from a range
    Drill {
        #[command(flatten)]
        source: Source,
        /// Hands per batch
        #[arg(short, long, default_value_t = DRILL_BATCH)]
        batch: usize,
        /// Seed for a reproducible hand order
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Asks on the terminal.
struct StdinConfirm;

#[async_trait]
impl Confirm for StdinConfirm {
    async fn confirm(&self, message: &str) -> bool {
        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut reader = stdin.lock();
        let mut writer = stdout.lock();
        prompt_yn(message, "n", &mut reader, &mut writer).unwrap_or(false)
    }
}

fn confirmer(yes: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(Always(true))
    } else {
        Box::new(StdinConfirm)
    }
}

pub fn run() {
    let cli = Cli::parse();
    dispatch(cli);
}

fn config_from(cli: &Cli) -> Config {
    Config {
        store_dir: cli.store.clone(),
        presets_path: cli.presets.clone(),
        log_level: Config::level_from_flags(cli.verbose, cli.quiet),
        ..Config::default()
    }
}

fn dispatch(cli: Cli) {
    let mut config = config_from(&cli);
    init_logging(config.log_level);

    let catalog = match &config.presets_path {
        Some(path) => PresetCatalog::from_file(path),
        None => PresetCatalog::bundled(),
    };
    let mut repo = SavedRangeRepository::new(FileStore::new(&config.store_dir));

    let result = match cli.command {
        Commands::Grid { source, paint } => cmd_grid(catalog, &repo, &source, &paint),
        Commands::Presets => {
            println!();
            println!("{}", presets_table(&catalog));
            Ok(())
        }
        Commands::Save {
            name,
            source,
            paint,
            yes,
        } => cmd_save(catalog, &mut repo, &name, &source, &paint, yes),
        Commands::List => {
            println!();
            println!("{}", saved_ranges_table(&repo.list()));
            Ok(())
        }
        Commands::Delete { name, yes } => cmd_delete(&mut repo, &name, yes),
        Commands::Export { name } => cmd_export(&repo, &name),
        Commands::Recall { source } => cmd_train(catalog, &repo, &source, &config, None, false),
        Commands::Drill {
            source,
            batch,
            seed,
        } => {
            config.drill_batch = batch;
            cmd_train(catalog, &repo, &source, &config, seed, true)
        }
    };

    if let Err(e) = result {
        match e {
            TrainerError::Storage(_) => print_warning(&e.to_string()),
            _ => print_error(&e.to_string()),
        }
    }
}

/// Loads the source range and paints any extra hands on top.
fn prepare(
    app: &mut AppState,
    repo: &SavedRangeRepository<FileStore>,
    source: &Source,
    paint: &Paint,
) -> TrainerResult<()> {
    if let Some(key) = &source.preset {
        app.load_preset(key)?;
    } else if let Some(name) = &source.saved {
        app.load_saved(repo, name)?;
    }
    let extra = selection_from_exprs(&[
        (Action::Raise, paint.raise.as_str()),
        (Action::Call, paint.call.as_str()),
        (Action::Mix, paint.mix.as_str()),
    ])?;
    for (hand, action) in extra {
        app.grid_mut().set_hand_action(hand, action);
    }
    Ok(())
}

fn source_title(app: &AppState, source: &Source) -> String {
    if let Some(preset) = app.loaded_preset().and_then(|k| app.presets().get(k)) {
        return preset.name.clone();
    }
    source.saved.clone().unwrap_or_else(|| CUSTOM_RANGE_NAME.to_string())
}

fn cmd_grid(
    catalog: PresetCatalog,
    repo: &SavedRangeRepository<FileStore>,
    source: &Source,
    paint: &Paint,
) -> TrainerResult<()> {
    let mut app = AppState::new(catalog);
    prepare(&mut app, repo, source, paint)?;
    let title = source_title(&app, source);

    println!();
    println!("{}", range_grid(&app.grid().current_selection(), &title));
    println!();
    println!("{}", stats_line(&app.stats()));
    println!();
    Ok(())
}

fn cmd_save(
    catalog: PresetCatalog,
    repo: &mut SavedRangeRepository<FileStore>,
    name: &str,
    source: &Source,
    paint: &Paint,
    yes: bool,
) -> TrainerResult<()> {
    let mut app = AppState::new(catalog);
    prepare(&mut app, repo, source, paint)?;
    let confirm = confirmer(yes);
    match block_on(app.save_current(repo, name, confirm.as_ref()))? {
        SaveOutcome::Created | SaveOutcome::Overwritten => {
            print_success(&format!("Range \"{}\" saved successfully!", name.trim()));
        }
        SaveOutcome::Declined => println!("  {}", "Nothing saved.".dimmed()),
    }
    Ok(())
}

fn cmd_delete(repo: &mut SavedRangeRepository<FileStore>, name: &str, yes: bool) -> TrainerResult<()> {
    let confirm = confirmer(yes);
    if block_on(repo.delete(name, confirm.as_ref()))? {
        print_success(&format!("Range \"{}\" deleted successfully.", name));
    }
    Ok(())
}

fn cmd_export(repo: &SavedRangeRepository<FileStore>, name: &str) -> TrainerResult<()> {
    let range = repo
        .find(name)
        .ok_or_else(|| TrainerError::UnknownSavedRange(name.to_string()))?;
    println!("{}", to_preset_json(&range)?);
    Ok(())
}

fn cmd_train(
    catalog: PresetCatalog,
    repo: &SavedRangeRepository<FileStore>,
    source: &Source,
    config: &Config,
    seed: Option<u64>,
    drill: bool,
) -> TrainerResult<()> {
    let mut app = AppState::new(catalog).with_drill_batch(config.drill_batch);
    if let Some(seed) = seed {
        app = app.with_drill_seed(seed);
    }
    prepare(&mut app, repo, source, &Paint::default())?;
    app.enter_train()?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut reader = stdin.lock();
    let mut writer = stdout.lock();
    if drill {
        run_drill_session(&mut app, &mut reader, &mut writer, config.reveal_delay)?;
    } else {
        run_recall_session(&mut app, &mut reader, &mut writer)?;
    }
    writeln!(writer).ok();
    app.exit_train()
}
