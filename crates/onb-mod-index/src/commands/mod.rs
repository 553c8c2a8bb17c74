mod index;

pub use index::{index_mods, IndexModsArgs};
