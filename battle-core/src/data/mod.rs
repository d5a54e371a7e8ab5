pub mod effects;
pub mod items;
pub mod moves;
pub mod species;
pub mod store;
pub mod types;

pub use store::{ContentStore, Dex};
