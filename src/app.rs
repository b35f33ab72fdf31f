use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::info;

use crate::config::ResolvedConfig;
use crate::domain::{BarcodeRecord, SheetSelector};
use crate::error::ConvertError;
use crate::filter::{FilterStats, filter_table_with_stats};
use crate::loader::load_table;
use crate::table::MissingTokens;
use crate::taxonomy::{Classifier, KingdomTable};
use crate::writer::{OutputFiles, OutputLayout, prepare_output_dir, write_outputs};

/// Label used in summaries for records whose kingdom could not be inferred.
pub const UNASSIGNED_KINGDOM: &str = "unassigned";

#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub input: Utf8PathBuf,
    pub sheet: Option<SheetSelector>,
    pub output_name: Utf8PathBuf,
    /// Overrides the configured kingdom when set.
    pub kingdom: Option<String>,
    pub overwrite: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConvertSummary {
    pub input: String,
    pub rows_loaded: usize,
    pub rows_retained: usize,
    pub dropped_marker: usize,
    pub dropped_duplicates: usize,
    pub dropped_sequence: usize,
    pub kingdoms: BTreeMap<String, usize>,
    pub output_dir: String,
    pub files: OutputFiles,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

/// Forwards progress to the tracing subscriber.
pub struct LogSink;

impl ProgressSink for LogSink {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => info!(elapsed_ms = elapsed.as_millis() as u64, "{}", event.message),
            None => info!("{}", event.message),
        }
    }
}

/// Records loaded and cleaned, ready to be classified and written.
#[derive(Debug, Clone)]
pub struct PreparedBatch {
    pub input: Utf8PathBuf,
    pub records: Vec<BarcodeRecord>,
    pub stats: FilterStats,
}

pub struct Converter {
    config: ResolvedConfig,
    reference: KingdomTable,
    missing: MissingTokens,
}

impl Converter {
    pub fn new(config: ResolvedConfig) -> Self {
        let missing = MissingTokens::with_extra(config.missing_tokens.iter().cloned());
        Self {
            config,
            reference: KingdomTable::default(),
            missing,
        }
    }

    /// Runs every stage: load, filter, classify and write.
    pub fn convert(
        &self,
        request: &ConvertRequest,
        sink: &dyn ProgressSink,
    ) -> Result<ConvertSummary, ConvertError> {
        let batch = self.prepare(&request.input, request.sheet.as_ref(), sink)?;
        self.emit(
            &batch,
            &request.output_name,
            request.kingdom.clone(),
            request.overwrite,
            sink,
        )
    }

    /// Loads and filters the input without touching the output directory.
    pub fn prepare(
        &self,
        input: &Utf8Path,
        sheet: Option<&SheetSelector>,
        sink: &dyn ProgressSink,
    ) -> Result<PreparedBatch, ConvertError> {
        let started = Instant::now();
        sink.event(ProgressEvent {
            message: format!("phase=Load; reading {input}"),
            elapsed: None,
        });
        let table = load_table(input, sheet, &self.missing)?;
        sink.event(ProgressEvent {
            message: format!("phase=Load; {} rows", table.len()),
            elapsed: Some(started.elapsed()),
        });

        let started = Instant::now();
        let (table, stats) = filter_table_with_stats(table, &self.config.marker_code)?;
        let records = BarcodeRecord::from_table(&table)?;
        sink.event(ProgressEvent {
            message: format!(
                "phase=Filter; kept {} of {} rows",
                records.len(),
                stats.input
            ),
            elapsed: Some(started.elapsed()),
        });

        Ok(PreparedBatch {
            input: input.to_path_buf(),
            records,
            stats,
        })
    }

    /// Classifies a prepared batch and writes the three output files.
    pub fn emit(
        &self,
        batch: &PreparedBatch,
        output_name: &Utf8Path,
        kingdom: Option<String>,
        overwrite: bool,
        sink: &dyn ProgressSink,
    ) -> Result<ConvertSummary, ConvertError> {
        let layout = OutputLayout::new(output_name)?;
        let classifier = Classifier::new(
            &self.reference,
            kingdom.or_else(|| self.config.kingdom.clone()),
        );

        let started = Instant::now();
        let kingdoms = kingdom_counts(&batch.records, &classifier);
        sink.event(ProgressEvent {
            message: format!(
                "phase=Classify; {} kingdoms across {} records",
                kingdoms.len(),
                batch.records.len()
            ),
            elapsed: Some(started.elapsed()),
        });

        let started = Instant::now();
        prepare_output_dir(&layout, overwrite)?;
        let files = write_outputs(&batch.records, &classifier, &layout)?;
        sink.event(ProgressEvent {
            message: format!("phase=Write; wrote {}", layout.dir()),
            elapsed: Some(started.elapsed()),
        });

        Ok(ConvertSummary {
            input: batch.input.to_string(),
            rows_loaded: batch.stats.input,
            rows_retained: batch.records.len(),
            dropped_marker: batch.stats.marker_dropped,
            dropped_duplicates: batch.stats.duplicates_dropped,
            dropped_sequence: batch.stats.sequence_dropped,
            kingdoms,
            output_dir: layout.dir().to_string(),
            files,
        })
    }
}

fn kingdom_counts(
    records: &[BarcodeRecord],
    classifier: &Classifier<'_>,
) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        let kingdom = classifier.kingdom_for(record);
        let key = if kingdom.is_empty() {
            UNASSIGNED_KINGDOM.to_string()
        } else {
            kingdom
        };
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}
