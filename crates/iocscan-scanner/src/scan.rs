//! Scan pipeline
//!
//! Files are handled strictly one after another: parse, check diagnostics,
//! filter, collect. A header whose diagnostics include anything worse than a
//! warning is dropped whole. Every other failure aborts the scan.

use iocscan_core::{CandidateMacro, Result, ScanConfig};
use iocscan_parser::{create_frontend, Frontend, ParseOptions, TranslationUnit};
use std::path::Path;
use tracing::{debug, info};

use crate::filter::candidate_cursors;
use crate::headers::HeaderEnumerator;

/// Counters for one scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Header files handed to the front end
    pub headers: usize,
    /// Headers that parsed without errors
    pub accepted: usize,
    /// Headers dropped because of error diagnostics
    pub rejected: usize,
    /// Candidate macros collected
    pub macros: usize,
}

/// Result of a completed scan
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Candidates in walk order, then pre-order within each file
    pub macros: Vec<CandidateMacro>,
    pub stats: ScanStats,
}

/// Drives a front end over every enumerated header
pub struct Scanner {
    frontend: Box<dyn Frontend>,
    options: ParseOptions,
    headers: HeaderEnumerator,
}

impl Scanner {
    pub fn new(
        frontend: Box<dyn Frontend>,
        options: ParseOptions,
        headers: HeaderEnumerator,
    ) -> Self {
        Self {
            frontend,
            options,
            headers,
        }
    }

    /// Build a scanner with the front end, options and roots from `config`
    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        config.validate()?;
        let frontend = create_frontend(config)?;
        Ok(Self::new(
            frontend,
            ParseOptions::from_config(config),
            HeaderEnumerator::from_config(config),
        ))
    }

    /// Scan every header. Nothing is returned unless the whole walk succeeds.
    pub fn scan(&mut self) -> Result<ScanReport> {
        let mut report = ScanReport::default();
        let headers = self.headers.clone();
        debug!("Scanning {:?} for *{}", headers.roots(), headers.suffix());

        for path in headers.iter() {
            let path = path?;
            report.stats.headers += 1;

            match self.scan_file(&path)? {
                Some(found) => {
                    report.stats.accepted += 1;
                    report.stats.macros += found.len();
                    report.macros.extend(found);
                }
                None => report.stats.rejected += 1,
            }
        }

        info!(
            "Scanned {} headers with {}: {} accepted, {} rejected, {} candidate macros",
            report.stats.headers,
            self.frontend.name(),
            report.stats.accepted,
            report.stats.rejected,
            report.stats.macros
        );

        Ok(report)
    }

    /// Parse one header and collect its candidates.
    ///
    /// Returns `Ok(None)` when the header carries an error diagnostic.
    pub fn scan_file(&mut self, path: &Path) -> Result<Option<Vec<CandidateMacro>>> {
        let unit = self.frontend.parse(path, &self.options)?;

        if let Some(diag) = unit.diagnostics().iter().find(|d| d.severity.is_error()) {
            debug!("Skipping {}: {}", unit.path().display(), diag);
            return Ok(None);
        }

        let found = collect_candidates(&unit);
        debug!("Found {} candidates in {:?}", found.len(), path);
        Ok(Some(found))
    }
}

/// Materialize the tokens of every candidate macro in `unit`
pub fn collect_candidates(unit: &TranslationUnit) -> Vec<CandidateMacro> {
    candidate_cursors(unit)
        .map(|cursor| {
            let tokens = unit
                .tokens(cursor)
                .into_iter()
                .map(|t| t.spelling)
                .collect();
            CandidateMacro::new(cursor.spelling(), tokens)
        })
        .collect()
}
