//! iocscan Scanner
//!
//! The scan pipeline: enumerate headers under the configured roots, parse
//! each one, keep macro definitions whose name looks like an ioctl request
//! code, and report their tokens.
//!
//! ## Modules
//!
//! - `headers` - recursive header enumeration
//! - `filter` - ioctl name heuristic
//! - `scan` - per-file parse, acceptance gate and token collection
//! - `report` - output of collected macros

pub mod filter;
pub mod headers;
pub mod report;
pub mod scan;

pub use filter::{candidate_cursors, is_ioctl_name};
pub use headers::HeaderEnumerator;
pub use report::write_macros;
pub use scan::{collect_candidates, ScanReport, ScanStats, Scanner};
