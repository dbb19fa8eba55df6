use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{Event, KeyEventKind};
use tokio::sync::{mpsc, watch};

use market_pulse::analysis::{export, AnalysisRequester};
use market_pulse::backend::rest::MarketRestClient;
use market_pulse::backend::MarketSource;
use market_pulse::config::Config;
use market_pulse::event::AppEvent;
use market_pulse::input::{parse_main_command, UiCommand};
use market_pulse::poller::Poller;
use market_pulse::ui::{self, AppState};

fn restart_polling(poller: &mut Poller, app_state: &mut AppState, symbol: &str) {
    let generation = poller.start(symbol);
    app_state.set_poll_generation(generation);
}

fn request_analysis(requester: &mut AnalysisRequester, app_state: &mut AppState) {
    let symbol = app_state.selected_symbol.clone();
    let request_id = requester.request(&symbol);
    app_state.analysis.begin(request_id, &symbol);
    app_state.push_log(format!("Requesting analysis for {}", symbol));
}

fn export_analysis(app_state: &mut AppState, config: &Config) {
    let Some(symbol) = app_state.analysis.symbol.clone() else {
        app_state.push_log("[WARN] No analysis to export".to_string());
        return;
    };
    let Some(html) = app_state.analysis.exportable_html() else {
        app_state.push_log("[WARN] No completed analysis to export".to_string());
        return;
    };
    match export::write_html(&config.ui.export_dir, &symbol, &html) {
        Ok(path) => {
            tracing::info!(path = %path.display(), "Analysis exported");
            app_state.push_log(format!("Exported {}", path.display()));
        }
        Err(e) => {
            tracing::warn!(error = %e, "Analysis export failed");
            app_state.push_log(format!("[ERR] Export failed: {}", e));
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required by rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            std::process::exit(1);
        }
    };

    // Log to file so it doesn't interfere with the TUI
    let log_file = std::fs::File::create(&config.logging.file)
        .with_context(|| format!("failed to create {}", config.logging.file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::try_new(&config.logging.level)
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    tracing::info!(
        api_url = %config.api.base_url,
        poll_ms = config.poll.interval_ms,
        symbol = %config.ui.default_symbol,
        "Starting market-pulse"
    );

    let (app_tx, mut app_rx) = mpsc::channel::<AppEvent>(256);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let client: Arc<dyn MarketSource> = Arc::new(
        MarketRestClient::new(&config.api.base_url, config.api.timeout())
            .context("failed to build backend client")?
            .with_analyze_timeout(config.api.analyze_timeout()),
    );
    let mut poller = Poller::new(
        client.clone(),
        app_tx.clone(),
        config.poll.interval(),
        config.api.history_limit,
    );
    let mut requester = AnalysisRequester::new(client, app_tx.clone());

    // Ctrl+C handler
    let ctrl_c_shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Ctrl+C received");
        let _ = ctrl_c_shutdown.send(true);
    });

    let mut app_state = AppState::new(&config.ui.default_symbol, config.reveal.tick());
    app_state.push_log(format!(
        "market-pulse started | {} | {}",
        config.ui.default_symbol, config.api.base_url
    ));
    let initial_symbol = app_state.selected_symbol.clone();
    restart_polling(&mut poller, &mut app_state, &initial_symbol);

    // TUI main loop
    let mut terminal = ratatui::init();
    let frame_timeout = Duration::from_millis(config.ui.refresh_rate_ms);

    let result: Result<()> = loop {
        app_state.tick(Instant::now());
        if let Err(e) = terminal.draw(|frame| ui::render(frame, &app_state)) {
            break Err(e.into());
        }

        // Keep frames short while text is being revealed.
        let timeout = if app_state.analysis.is_revealing() {
            frame_timeout.min(config.reveal.tick())
        } else {
            frame_timeout
        };
        match crossterm::event::poll(timeout) {
            Ok(true) => match crossterm::event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    match parse_main_command(&key.code) {
                        Some(UiCommand::Quit) => {
                            tracing::info!("User quit");
                            let _ = shutdown_tx.send(true);
                            break Ok(());
                        }
                        Some(UiCommand::RequestAnalysis) => {
                            request_analysis(&mut requester, &mut app_state);
                        }
                        Some(UiCommand::CloseAnalysis) => {
                            requester.cancel();
                            app_state.analysis.close();
                        }
                        Some(UiCommand::ExportAnalysis) => {
                            export_analysis(&mut app_state, &config);
                        }
                        Some(UiCommand::RefreshNow) => {
                            let symbol = app_state.selected_symbol.clone();
                            restart_polling(&mut poller, &mut app_state, &symbol);
                            app_state.push_log(format!("Refreshing {}", symbol));
                        }
                        Some(UiCommand::PrevSymbol) => {
                            app_state.cycle_selection(-1);
                        }
                        Some(UiCommand::NextSymbol) => {
                            app_state.cycle_selection(1);
                        }
                        Some(UiCommand::SelectCard(index)) => {
                            app_state.select_index(index);
                        }
                        None => {}
                    }
                }
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            },
            Ok(false) => {}
            Err(e) => break Err(e.into()),
        }

        // Drain events from channel
        while let Ok(evt) = app_rx.try_recv() {
            app_state.apply(evt);
        }

        if let Some(symbol) = app_state.take_symbol_change() {
            tracing::info!(symbol = %symbol, "Selected symbol changed");
            restart_polling(&mut poller, &mut app_state, &symbol);
        }

        if *shutdown_rx.borrow() {
            break Ok(());
        }
    };

    poller.stop();
    requester.cancel();
    ratatui::restore();
    match &result {
        Ok(()) => tracing::info!("Shutdown complete"),
        Err(e) => tracing::error!(error = %e, "Terminal loop failed"),
    }
    println!(
        "Goodbye! Check {} for details.",
        config.logging.file.display()
    );
    result
}
