//! crm-segmenter - Batch segmentation engine for CRM user data
//!
//! Classifies a customer roster into named marketing segments from three
//! tabular inputs (current roster, behavior log, optional prior snapshot)
//! through a deterministic pipeline: load → normalize → enrich → segment
//! → export.
//!
//! ## Modules
//!
//! - **loader**: delimited-text bytes → raw tables, with UTF-8/Shift-JIS
//!   fallback decoding
//! - **normalizer**: raw tables → typed rows; parse failures degrade to
//!   null/zero instead of aborting
//! - **enricher**: wager aggregation, left join, tenure derivation
//! - **segmenter**: the eight membership rules
//! - **exporter**: per-segment CSV (BOM-prefixed) and a ZIP of the non-empty
//!   segments

pub mod enricher;
pub mod error;
pub mod exporter;
pub mod loader;
pub mod normalizer;
pub mod pipeline;
pub mod segmenter;
pub mod types;

pub use error::SegmentError;
pub use pipeline::{run_segmentation, SegmentationPipeline};
pub use segmenter::SegmentMap;
pub use types::{BehaviorRecord, EnrichedRecord, PriorUserRecord, RawTable, UserRecord};

/// Engine version embedded in CLI output
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
