use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{Event as CEvent, EventStream, MouseEventKind};
use futures_util::StreamExt;
use ratatui::layout::Position;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::backend::{DiagramBackend, HttpBackend};
use crate::config::TerminalConfig;
use crate::input::{self, InputAction};
use crate::protocol::BackendEvent;
use crate::request;
use crate::settings::{MouseCapture, PointerOutcome, SettingsMenu};
use crate::state::AppState;
use crate::theme::store::MemoryStorage;
use crate::theme::{FileStorage, PreferenceStorage, PreferenceStore, SystemColorScheme};
use crate::ui::{self, Hitboxes};

const TICK_RATE: Duration = Duration::from_millis(250);
const LOADING_PHRASE_INTERVAL: Duration = Duration::from_secs(2);

pub async fn run(config: TerminalConfig) -> anyhow::Result<()> {
    let backend_url = config.generate_url();
    let backend: Arc<dyn DiagramBackend> = Arc::new(HttpBackend::new(backend_url.clone()));

    let storage: Box<dyn PreferenceStorage> = match config.preferences_path() {
        Some(path) => Box::new(FileStorage::new(path)),
        None => {
            warn!("no home directory, theme preference will not persist");
            Box::new(MemoryStorage::default())
        }
    };
    let mut store = PreferenceStore::init(storage, Box::new(SystemColorScheme));
    info!(url = %backend_url, theme = %store.preference(), "starting");

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, backend, &backend_url, &mut store).await;
    ratatui::restore();
    result
}

async fn event_loop(
    terminal: &mut DefaultTerminal,
    backend: Arc<dyn DiagramBackend>,
    backend_url: &str,
    store: &mut PreferenceStore,
) -> anyhow::Result<()> {
    terminal.clear()?;

    // Mouse reporting backs the settings menu's outside-click handling
    let _mouse = MouseCapture::acquire(std::io::stdout())?;

    let mut state = AppState::new();
    let mut menu = SettingsMenu::new(store.preference());
    let mut hitboxes = Hitboxes::default();

    let (settle_tx, mut settle_rx) = mpsc::unbounded_channel::<BackendEvent>();
    let mut reader = EventStream::new();

    let mut last_tick = Instant::now();
    let mut last_phrase_change = Instant::now();

    loop {
        terminal.draw(|f| {
            hitboxes = ui::render(f, &state, store, &menu, backend_url);
        })?;
        if let Some(region) = hitboxes.menu {
            menu.set_region(region);
        }

        if state.should_quit {
            break;
        }

        let tick_timeout = TICK_RATE.checked_sub(last_tick.elapsed()).unwrap_or(Duration::ZERO);

        tokio::select! {
            // Terminal events
            maybe_event = reader.next() => {
                match maybe_event {
                    Some(Ok(CEvent::Key(key))) => {
                        let action = input::handle_key(key, &mut state, menu.is_open());
                        handle_action(action, &mut state, &mut menu, store, &backend, &settle_tx);
                    }
                    Some(Ok(CEvent::Mouse(mouse))) => {
                        if let MouseEventKind::Down(_) = mouse.kind {
                            handle_pointer_down(mouse.column, mouse.row, &hitboxes, &mut menu, store);
                        }
                    }
                    Some(Ok(_)) => {
                        // Resize and focus: redrawn on next loop
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "terminal event error");
                    }
                    None => {
                        info!("terminal event stream ended");
                        break;
                    }
                }
            }

            // Request settlements
            Some(event) = settle_rx.recv() => {
                handle_backend_event(event, &mut state);
            }

            // Tick
            _ = tokio::time::sleep(tick_timeout) => {
                last_tick = Instant::now();
                if state.request.is_pending() {
                    state.spinner_tick = state.spinner_tick.wrapping_add(1);
                    if last_phrase_change.elapsed() >= LOADING_PHRASE_INTERVAL {
                        state.next_loading_phrase();
                        last_phrase_change = Instant::now();
                    }
                }
            }
        }
    }

    Ok(())
}

fn handle_action(
    action: InputAction,
    state: &mut AppState,
    menu: &mut SettingsMenu,
    store: &mut PreferenceStore,
    backend: &Arc<dyn DiagramBackend>,
    settle_tx: &mpsc::UnboundedSender<BackendEvent>,
) {
    match action {
        InputAction::Submit(text) => {
            if let Some(submission) = state.request.submit(&text) {
                state.spinner_tick = 0;
                request::dispatch(Arc::clone(backend), submission, settle_tx.clone());
            }
        }
        InputAction::Quit => {
            state.should_quit = true;
        }
        InputAction::ToggleSettings => menu.toggle(),
        InputAction::CloseSettings => menu.close(),
        InputAction::MenuNext => menu.highlight_next(),
        InputAction::MenuPrev => menu.highlight_prev(),
        InputAction::MenuSelect => {
            menu.select_highlighted(store);
        }
        InputAction::SelectTheme(preference) => menu.select_theme(preference, store),
        InputAction::None => {}
    }
}

fn handle_pointer_down(
    column: u16,
    row: u16,
    hitboxes: &Hitboxes,
    menu: &mut SettingsMenu,
    store: &mut PreferenceStore,
) {
    match menu.handle_pointer_down(column, row, store) {
        PointerOutcome::Inert => {
            if hitboxes.settings_button.contains(Position::new(column, row)) {
                menu.toggle();
            }
        }
        outcome => debug!(?outcome, "pointer handled by settings menu"),
    }
}

fn handle_backend_event(event: BackendEvent, state: &mut AppState) {
    match event {
        BackendEvent::Settled {
            request_id,
            outcome,
        } => {
            if !state.request.settle(request_id, outcome) {
                return;
            }
            if state.request.markup().is_some() {
                state.mark_generated();
            } else if let Some(message) = state.request.error() {
                debug!(error = message, "showing error banner");
            }
        }
    }
}
