//! src/main.rs
//! Terminal console for mass-reassigning CRM contacts between directory users

use std::io::{self, Stdout};
use std::panic::PanicHookInfo;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::{Notify, mpsc};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use handoff_core::{
    cli::Cli,
    config::Config,
    controller::{
        actions::Action,
        dispatcher::{ActionDispatcher, DispatchResult},
        event_loop::{EventLoop, LoopEvent},
        keymap,
    },
    directory::{client::DirectoryClient, http::HttpDirectoryClient, memory::InMemoryDirectory},
    logging,
    model::app_state::AppState,
    view::ui::UiRenderer,
};

type AppTerminal = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    setup_panic_handler();

    let cli = Cli::parse();
    let app = App::new(cli)
        .await
        .context("Failed to initialize application")?;
    app.run().await.context("Application runtime error")?;

    info!("Exited cleanly");
    Ok(())
}

struct App {
    terminal: AppTerminal,
    event_loop: EventLoop,
    dispatcher: ActionDispatcher,
    renderer: UiRenderer,
    shutdown: Arc<Notify>,
    /// Keeps the non-blocking log writer alive until the app drops.
    _log_guard: WorkerGuard,
}

impl App {
    async fn new(cli: Cli) -> Result<Self> {
        let mut config = Config::load(cli.config.as_deref())
            .await
            .context("Failed to load configuration")?;
        cli.apply_to(&mut config);

        let log_dir = config.log_dir().context("Failed to resolve log directory")?;
        let log_guard = logging::init_logging(&config.logging.level, &log_dir)
            .context("Failed to initialize logging")?;
        info!(
            version = env!("CARGO_PKG_VERSION"),
            "starting mass transfer console"
        );

        let (client, backend_label): (Arc<dyn DirectoryClient>, String) = if cli.demo {
            info!("using the built-in sample directory");
            (
                Arc::new(InMemoryDirectory::with_sample_data()),
                "demo directory".to_string(),
            )
        } else {
            (
                Arc::new(
                    HttpDirectoryClient::new(&config.remote.base_url)
                        .context("Failed to build directory client")?,
                ),
                config.remote.base_url.clone(),
            )
        };

        let terminal = setup_terminal().context("Failed to initialize terminal")?;

        let (action_tx, action_rx) = mpsc::unbounded_channel::<Action>();
        let shutdown = Arc::new(Notify::new());

        let state = AppState::new(Arc::new(config));
        let dispatcher = ActionDispatcher::new(state, client, action_tx);
        let event_loop = EventLoop::new(action_rx, shutdown.clone());
        let renderer = UiRenderer::new(backend_label);

        info!("application initialized");

        Ok(Self {
            terminal,
            event_loop,
            dispatcher,
            renderer,
            shutdown,
            _log_guard: log_guard,
        })
    }

    async fn run(mut self) -> Result<()> {
        self.spawn_signal_handler();
        info!("starting event loop");

        loop {
            self.render()?;

            match self.event_loop.next_event().await {
                LoopEvent::Shutdown => {
                    info!("shutdown signal received");
                    break;
                }
                LoopEvent::Input(event) => {
                    let Some(action) = keymap::map_event(self.dispatcher.state(), &event) else {
                        continue;
                    };
                    if self.dispatcher.handle(action) == DispatchResult::Quit {
                        break;
                    }
                }
                LoopEvent::Action(action) => {
                    if self.dispatcher.handle(action) == DispatchResult::Quit {
                        break;
                    }
                }
                LoopEvent::Tick => {
                    self.dispatcher.handle(Action::Tick);
                }
            }
        }

        info!("event loop terminated");
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        if !self.dispatcher.state().ui.needs_redraw() {
            return Ok(());
        }

        self.terminal
            .draw(|frame| self.renderer.render(frame, self.dispatcher.state()))
            .context("Failed to draw terminal")?;
        self.dispatcher.state_mut().ui.clear_redraw();

        Ok(())
    }

    /// SIGTERM and Ctrl+C both resolve to the shutdown notify; in raw mode
    /// Ctrl+C usually arrives as a key event first, this covers the rest.
    fn spawn_signal_handler(&self) {
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{SignalKind, signal};

                match signal(SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        tokio::select! {
                            _ = sigterm.recv() => info!("received SIGTERM"),
                            _ = tokio::signal::ctrl_c() => info!("received Ctrl+C"),
                        }
                    }
                    Err(error) => {
                        warn!(%error, "no SIGTERM handler; listening for Ctrl+C only");
                        if tokio::signal::ctrl_c().await.is_err() {
                            return;
                        }
                    }
                }
            }

            #[cfg(not(unix))]
            {
                if let Err(error) = tokio::signal::ctrl_c().await {
                    warn!(%error, "failed to listen for Ctrl+C");
                    return;
                }
                info!("received Ctrl+C");
            }

            shutdown.notify_one();
        });
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Err(error) = cleanup_terminal(&mut self.terminal) {
            warn!(%error, "failed to clean up terminal");
        }
    }
}

fn setup_terminal() -> Result<AppTerminal> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut AppTerminal) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    Ok(())
}

fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);

        error!("Application panicked: {panic_info}");
        original_hook(panic_info);
    }));
}
