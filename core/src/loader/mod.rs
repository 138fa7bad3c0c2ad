pub mod mrio;
pub mod scenario;

pub use mrio::{SECTOR_MAP, load_country_matrix};
pub use scenario::load_scenario;
