pub mod asset_context;
pub mod assets;
pub mod search;
pub mod uploads;
