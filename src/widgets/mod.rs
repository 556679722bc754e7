mod item_list;
mod preview;

pub use item_list::{FilterState, ItemList};
pub use preview::Preview;
