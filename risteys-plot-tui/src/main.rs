mod tui;

use clap::{CommandFactory, Parser, Subcommand};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use notify::{RecursiveMode, Watcher};
use ratatui::{backend::CrosstermBackend, Terminal};
use risteys_plot_common::Config;
use risteys_plot_core::svg::surface_svg;
use risteys_plot_core::{ActionRegistry, DisplayMode, Page, PageState, PlotSettings, SurfaceGeometry};
use std::path::{Path, PathBuf};
use std::{io, time::Duration};
use tui::app::App;
use tui::events::{handle_key, handle_mouse};
use tui::session::Session;
use tui::ui::render;

#[derive(Parser)]
#[command(name = "risteys-plot", version, about = "Endpoint distribution plots in the terminal")]
struct Cli {
    /// env_logger filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a page in the interactive viewer
    View {
        page: String,
        /// JSON-lines file of channel messages to apply
        #[arg(long)]
        messages: Option<String>,
        /// Re-read the messages file whenever it changes
        #[arg(long, requires = "messages")]
        watch: bool,
    },
    /// Write one panel as a standalone SVG
    Export {
        page: String,
        #[arg(long)]
        mount: String,
        #[arg(long)]
        output: Option<String>,
        #[arg(long)]
        cumulative: bool,
        #[arg(long)]
        debug_grid: bool,
    },
    /// Print what each panel would draw
    Summary { page: String },
    /// Shell completion script
    Completions { shell: clap_complete::Shell },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level.as_str())).init();
    let config = Config::load().unwrap_or_default();
    match cli.command {
        Commands::View { page, messages, watch } => run_view(page, messages, watch, config)?,
        Commands::Export { page, mount, output, cumulative, debug_grid } => {
            run_export(&page, &mount, output, cumulative, debug_grid || config.display.debug_grid, &config)?
        }
        Commands::Summary { page } => run_summary(&page, &config)?,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "risteys-plot", &mut io::stdout());
        }
    }
    Ok(())
}

fn load_state(page_path: &str, config: &Config) -> anyhow::Result<PageState> {
    let page = Page::load(Path::new(page_path)).map_err(|e| anyhow::anyhow!("{page_path}: {e}"))?;
    let state = PageState::from_page(&page, PlotSettings::from_config(&config.plot), config.search.max_results);
    log::info!("{page_path}: {} panel(s), {} comparison box(es)", state.surfaces.len(), state.compboxes.len());
    Ok(state)
}

fn run_summary(page_path: &str, config: &Config) -> anyhow::Result<()> {
    let state = load_state(page_path, config)?;
    if !state.title.is_empty() {
        println!("{:<24} {}", "title:", state.title);
    }
    for s in state.surfaces.iter() {
        let kind = match s.geometry() {
            SurfaceGeometry::Interval(_) => "interval",
            SurfaceGeometry::Band(_) => "discrete",
            SurfaceGeometry::Cumulinc(_) => "cumulinc",
            SurfaceGeometry::NoData => "no data",
        };
        let note = s.geometry().subtitle().unwrap_or("");
        println!(
            "{:<24} {:<10} {:>4} bins  {:<12} {}",
            s.mount(),
            kind,
            s.geometry().bin_count(),
            s.mode().label(),
            note
        );
    }
    for (id, g) in &state.compboxes {
        println!("{:<24} compbox    dot at {:.1}px of {:.0}px", id, g.dot_x, g.svg_width);
    }
    Ok(())
}

fn run_export(
    page_path: &str,
    mount: &str,
    output: Option<String>,
    cumulative: bool,
    debug_grid: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let mut state = load_state(page_path, config)?;
    if state.surfaces.get(mount).is_none() {
        let known: Vec<&str> = state.surfaces.iter().map(|s| s.mount()).collect();
        anyhow::bail!("no panel {mount} on {page_path} (have: {})", known.join(", "));
    }
    if cumulative {
        ActionRegistry::default().invoke("showCumulative", &mut state, mount)?;
        if state.surfaces.get(mount).map(|s| s.mode()) != Some(DisplayMode::Cumulative) {
            log::warn!("{mount}: cumulative view unavailable, exporting per period");
        }
    }
    let Some(surface) = state.surfaces.get(mount) else {
        anyhow::bail!("no panel {mount}");
    };
    let out = output
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(&config.export.output_dir).join(format!("{mount}.svg")));
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&out, surface_svg(surface, debug_grid))?;
    println!("{}", out.display());
    Ok(())
}

fn run_view(page_path: String, messages: Option<String>, watch: bool, config: Config) -> anyhow::Result<()> {
    let state = load_state(&page_path, &config)?;
    let mut app = App::new(page_path, state, config);
    if let Some(m) = &messages {
        app.messages_path = Some(PathBuf::from(m));
        app.pump_messages();
    }
    if let Some(session) = Session::load() {
        app.restore(&session);
    }

    // watcher must outlive the loop
    let _watcher = match (&messages, watch) {
        (Some(m), true) => {
            let (tx, rx) = std::sync::mpsc::channel();
            let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
                Ok(ev) if ev.kind.is_modify() || ev.kind.is_create() => {
                    let _ = tx.send(());
                }
                Ok(_) => {}
                Err(e) => log::warn!("watch error: {e}"),
            })?;
            watcher.watch(Path::new(m), RecursiveMode::NonRecursive)?;
            app.watch_rx = Some(rx);
            Some(watcher)
        }
        _ => None,
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let tick = Duration::from_millis(66); // 15Hz
    loop {
        let area = terminal.draw(|f| render(f, &app))?.area;
        let changed = match &app.watch_rx {
            Some(rx) => {
                let mut any = false;
                while rx.try_recv().is_ok() {
                    any = true;
                }
                any
            }
            None => false,
        };
        if changed {
            app.pump_messages();
        }
        if event::poll(tick)? {
            match event::read()? {
                Event::Key(key) => handle_key(&mut app, key),
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse, area),
                _ => {}
            }
        }
        if app.should_quit {
            break;
        }
    }
    let _ = app.to_session().save();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}
