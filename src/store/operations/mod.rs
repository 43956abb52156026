pub mod builds;
pub mod coverage;
pub mod work_items;
