// Session-scoped state: which years the user is looking at, what has been
// parsed, and from which set of files.
use crate::error::IngestError;
use crate::loader;
use crate::taxonomy::Taxonomy;
use crate::types::{DroppedColumns, ScenarioResult, Year};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// One uploaded workbook.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NoYearsSelected,
    AwaitingFiles,
    FilesParsed { complete: bool },
    DashboardRendered,
}

/// What one call to [`Session::ingest`] did.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    /// False when the file set matched the previous one and nothing was re-read.
    pub reprocessed: bool,
    pub parsed: Vec<Year>,
    pub warnings: Vec<IngestError>,
    pub dropped: Vec<(String, DroppedColumns)>,
}

#[derive(Debug)]
pub struct Session<'t> {
    taxonomy: &'t Taxonomy,
    selected: BTreeSet<Year>,
    results: BTreeMap<Year, ScenarioResult>,
    last_files: Option<BTreeSet<String>>,
    rendered: bool,
}

impl<'t> Session<'t> {
    pub fn new(taxonomy: &'t Taxonomy) -> Self {
        Session {
            taxonomy,
            selected: BTreeSet::new(),
            results: BTreeMap::new(),
            last_files: None,
            rendered: false,
        }
    }

    pub fn selected_years(&self) -> &BTreeSet<Year> {
        &self.selected
    }

    /// Parsed results in ascending year order.
    pub fn results(&self) -> &BTreeMap<Year, ScenarioResult> {
        &self.results
    }

    /// Replace the year selection. Results for deselected years are dropped
    /// and the next ingest re-reads its files even if the names are unchanged.
    pub fn select_years<I: IntoIterator<Item = Year>>(&mut self, years: I) {
        let years: BTreeSet<Year> = years.into_iter().collect();
        if years == self.selected {
            return;
        }
        self.results.retain(|y, _| years.contains(y));
        self.selected = years;
        self.last_files = None;
        self.rendered = false;
        info!(years = ?self.selected, "year selection changed");
    }

    pub fn phase(&self) -> SessionPhase {
        if self.selected.is_empty() {
            SessionPhase::NoYearsSelected
        } else if self.results.is_empty() {
            SessionPhase::AwaitingFiles
        } else if self.rendered {
            SessionPhase::DashboardRendered
        } else {
            SessionPhase::FilesParsed {
                complete: self.selected.iter().all(|y| self.results.contains_key(y)),
            }
        }
    }

    pub fn mark_rendered(&mut self) {
        if !self.results.is_empty() {
            self.rendered = true;
        }
    }

    /// Parse a batch of uploads. A batch whose file names differ from the
    /// last one clears every cached result first; an identical batch is
    /// skipped. Per-file failures are collected, never raised.
    pub fn ingest(&mut self, uploads: &[Upload]) -> IngestOutcome {
        let mut outcome = IngestOutcome::default();
        if self.selected.is_empty() {
            warn!("no years selected; ignoring {} file(s)", uploads.len());
            return outcome;
        }

        let names: BTreeSet<String> = uploads.iter().map(|u| u.name.clone()).collect();
        if self.last_files.as_ref() == Some(&names) {
            info!("file set unchanged; keeping cached results");
            return outcome;
        }

        self.results.clear();
        self.rendered = false;
        outcome.reprocessed = true;

        for upload in uploads {
            let Some(year) = year_for_file(&upload.name, &self.selected) else {
                let err = IngestError::AmbiguousYear {
                    file: upload.name.clone(),
                    years: self.selected.iter().copied().collect(),
                };
                warn!(file = err.file(), "{}", err);
                outcome.warnings.push(err);
                continue;
            };
            match loader::parse_workbook(&upload.name, &upload.bytes, year, self.taxonomy) {
                Ok(result) => {
                    for d in &result.dropped {
                        if d.has_data {
                            outcome.dropped.push((upload.name.clone(), d.clone()));
                        }
                    }
                    if let Some(prev) = self.results.insert(year, result) {
                        warn!(
                            %year,
                            replaced = %prev.source_file,
                            by = %upload.name,
                            "two files for the same year; keeping the later one"
                        );
                        outcome.parsed.retain(|y| *y != year);
                    }
                    outcome.parsed.push(year);
                }
                Err(err) => {
                    warn!(file = err.file(), "{}", err);
                    outcome.warnings.push(err);
                }
            }
        }

        self.last_files = Some(names);
        outcome.parsed.sort();
        if !outcome.parsed.is_empty() {
            let list: Vec<String> = outcome.parsed.iter().map(|y| y.to_string()).collect();
            info!("Successfully parsed results for: {}", list.join(", "));
        }
        outcome
    }
}

/// The smallest selected year whose digits appear in `file_name`.
pub fn year_for_file(file_name: &str, selected: &BTreeSet<Year>) -> Option<Year> {
    selected.iter().copied().find(|y| file_name.contains(&y.to_string()))
}
