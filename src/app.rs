use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::action::{Action, Tab};
use crate::config::Config;
use crate::effects::Effects;
use crate::error::{AzError, Disposition, ErrorPolicy};
use crate::event::Event;
use crate::fetch::Fetcher;
use crate::markdown::Renderer;
use crate::theme::Theme;
use crate::types::Item;
use crate::widgets::{ItemList, Preview};

/// Columns reserved around each pane.
pub const MARGIN: u16 = 4;
/// Rows taken by the tab bar and the status line.
pub const HEADER_HEIGHT: u16 = 4;

/// Pane sizes derived from the terminal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub list_width: u16,
    pub preview_width: u16,
    pub pane_height: u16,
}

impl Geometry {
    pub fn new(width: u16, height: u16) -> Self {
        let list_width = (width / 2).saturating_sub(MARGIN);
        let preview_width = width.saturating_sub(list_width).saturating_sub(MARGIN * 2);
        Self {
            list_width,
            preview_width,
            pane_height: height.saturating_sub(HEADER_HEIGHT),
        }
    }
}

pub struct App {
    pub tab: Tab,
    pub list: ItemList,
    pub preview: Preview,
    pub geometry: Geometry,
    pub theme: Theme,
    pub banner: Option<String>,
    pub should_quit: bool,
    /// Set when an error stops the dashboard; `main` reports it.
    pub fatal: Option<AzError>,
    renderer: Renderer,
    /// Bumped per dispatched fetch; completions carrying an older value are stale.
    generation: u64,
    /// Id of the item currently shown in the preview.
    previewed: Option<u64>,
    error_policy: ErrorPolicy,
    copy_url_on_open: bool,
    fetcher: Fetcher,
    effects: Box<dyn Effects>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        config: &Config,
        tab: Tab,
        fetcher: Fetcher,
        effects: Box<dyn Effects>,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        let theme = Theme::default();
        Self {
            tab,
            list: ItemList::new(),
            preview: Preview::new(),
            geometry: Geometry::default(),
            theme,
            banner: None,
            should_quit: false,
            fatal: None,
            renderer: Renderer::new(config.general.wrap_width, theme),
            generation: 0,
            previewed: None,
            error_policy: config.general.error_policy,
            copy_url_on_open: config.general.copy_url_on_open,
            fetcher,
            effects,
            action_tx,
        }
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => Action::LoadTab(self.tab),
            Event::Tick => Action::Tick,
            Event::Resize(width, height) => Action::Resize(width, height),
            Event::Mouse(mouse) => Action::ListMouse(mouse),
            Event::Key(key) if self.list.is_filtering() => Action::ListKey(key),
            Event::Key(_) if event.is_quit() => Action::Quit,
            Event::Key(key) => self.handle_key(key),
            Event::Render => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('w') if !ctrl => Action::LoadTab(Tab::WorkItems),
            KeyCode::Char('p') if !ctrl => Action::LoadTab(Tab::PullRequests),
            KeyCode::Char('y') if ctrl => Action::CopyId,
            KeyCode::Char('d') if ctrl => Action::PreviewDown,
            KeyCode::Char('u') if ctrl => Action::PreviewUp,
            KeyCode::Enter => Action::OpenSelected,
            _ => Action::ListKey(key),
        }
    }

    pub fn update(&mut self, action: Action) {
        if matches!(
            action,
            Action::LoadTab(_)
                | Action::OpenSelected
                | Action::CopyId
                | Action::PreviewDown
                | Action::PreviewUp
                | Action::ListKey(_)
                | Action::ListMouse(_)
        ) {
            self.banner = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Tick => self.list.tick(),
            Action::Resize(width, height) => {
                self.geometry = Geometry::new(width, height);
                self.list
                    .set_size(self.geometry.list_width, self.geometry.pane_height);
                self.preview
                    .set_size(self.geometry.preview_width, self.geometry.pane_height);
            }

            Action::LoadTab(tab) => {
                self.tab = tab;
                self.spawn_fetch(tab);
            }
            Action::Loaded {
                tab,
                generation,
                result,
            } => {
                if generation != self.generation {
                    tracing::debug!(
                        ?tab,
                        generation,
                        current = self.generation,
                        "discarding stale fetch"
                    );
                    return;
                }
                self.list.stop_loading();
                match result {
                    Ok(items) => {
                        tracing::info!(?tab, count = items.len(), "items loaded");
                        self.install(items);
                    }
                    Err(e) => self.fail(e),
                }
            }

            Action::OpenSelected => self.open_selected(),
            Action::CopyId => {
                if let Some(id) = self.list.selected_item().map(Item::id) {
                    if let Err(e) = self.effects.copy_to_clipboard(&id.to_string()) {
                        self.fail(e);
                    }
                }
            }

            Action::PreviewDown => self.preview.half_page_down(),
            Action::PreviewUp => self.preview.half_page_up(),

            Action::ListKey(key) => {
                self.list.handle_key(key);
                self.sync_preview();
            }
            Action::ListMouse(mouse) => {
                self.list.handle_mouse(mouse);
                self.sync_preview();
            }

            Action::None => {}
        }
    }

    /// Replace the list contents. An empty result leaves the preview as it was.
    fn install(&mut self, items: Vec<Item>) {
        self.list.set_items(Vec::new());
        self.list.reset_filter();
        self.list.set_items(items);
        self.previewed = None;
        self.refresh_preview();
    }

    fn sync_preview(&mut self) {
        let selected = self.list.selected_item().map(Item::id);
        if selected.is_some() && selected != self.previewed {
            self.refresh_preview();
        }
    }

    fn refresh_preview(&mut self) {
        if let Some(item) = self.list.selected_item() {
            self.preview.set_content(item.preview(&self.renderer));
            self.previewed = Some(item.id());
        }
    }

    fn open_selected(&mut self) {
        let Some(item) = self.list.selected_item() else {
            return;
        };
        let url = item.url();
        if url.is_empty() {
            tracing::debug!(id = item.id(), "selected item has no web url");
            self.banner = Some(format!("{} has no web url", item.title()));
            return;
        }

        if self.copy_url_on_open {
            if let Err(e) = self.effects.copy_to_clipboard(&url) {
                self.fail(e);
                return;
            }
        }
        if let Err(e) = self.effects.open_in_browser(&url) {
            self.fail(e);
        }
    }

    fn fail(&mut self, err: AzError) {
        match self.error_policy.classify(&err) {
            Disposition::Banner => {
                tracing::warn!(error = %err, "recoverable error");
                self.banner = Some(err.to_string());
            }
            Disposition::Fatal => {
                tracing::error!(error = %err, "fatal error");
                self.fatal = Some(err);
                self.should_quit = true;
            }
        }
    }

    fn spawn_fetch(&mut self, tab: Tab) {
        self.generation += 1;
        let generation = self.generation;
        self.list.start_loading();
        tracing::debug!(?tab, generation, "dispatching fetch");

        let tx = self.action_tx.clone();
        let fetcher = self.fetcher.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch(tab).await;
            tx.send(Action::Loaded {
                tab,
                generation,
                result,
            })
            .ok();
        });
    }
}
