use crossterm::event::{KeyEvent, MouseEvent};

use crate::error::AzError;
use crate::types::Item;

/// Dashboard tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Tab {
    #[default]
    WorkItems,
    PullRequests,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::WorkItems, Tab::PullRequests];

    pub fn label(self) -> &'static str {
        match self {
            Tab::WorkItems => "(W) Work Items",
            Tab::PullRequests => "(P) Pull Requests",
        }
    }
}

#[derive(Debug)]
pub enum Action {
    Quit,
    Tick,
    Resize(u16, u16),

    // Tabs
    LoadTab(Tab),
    Loaded {
        tab: Tab,
        generation: u64,
        result: Result<Vec<Item>, AzError>,
    },

    // Selected record
    OpenSelected,
    CopyId,

    // Preview
    PreviewDown,
    PreviewUp,

    // Delegated to the list widget
    ListKey(KeyEvent),
    ListMouse(MouseEvent),

    None,
}
