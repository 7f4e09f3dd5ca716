pub mod loco_split;
pub mod standardize;
pub mod stratified_split;
pub mod table;

pub use loco_split::{LocoManifest, run_loco_split};
pub use standardize::run_standardize;
pub use stratified_split::{SplitManifest, StratifiedSplitOptions, run_stratified_split};
pub use table::CsvTable;
