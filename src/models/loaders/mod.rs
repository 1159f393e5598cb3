pub mod toml_loader;

pub use toml_loader::{load_all_note_sets, load_note_set};
