pub mod flat_map;
pub mod last;
