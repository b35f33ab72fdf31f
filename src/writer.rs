use std::fs;
use std::io::{BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use csv::{QuoteStyle, WriterBuilder};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::domain::BarcodeRecord;
use crate::error::ConvertError;
use crate::taxonomy::Classifier;

/// Where the three output files of one conversion go.
///
/// `output_name` is both the directory and, through its final component,
/// the file name prefix: `out/run1` yields `out/run1/run1_fasta.fasta`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    dir: Utf8PathBuf,
    prefix: String,
}

impl OutputLayout {
    pub fn new(output_name: &Utf8Path) -> Result<Self, ConvertError> {
        let prefix = output_name.file_name().ok_or_else(|| {
            ConvertError::InvalidArgument(format!(
                "output name has no final component: {output_name}"
            ))
        })?;
        Ok(Self {
            dir: output_name.to_path_buf(),
            prefix: prefix.to_string(),
        })
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn fasta_path(&self) -> Utf8PathBuf {
        self.dir.join(format!("{}_fasta.fasta", self.prefix))
    }

    pub fn taxonomy_path(&self) -> Utf8PathBuf {
        self.dir.join(format!("{}_taxonomy.tsv", self.prefix))
    }

    pub fn sampleid_map_path(&self) -> Utf8PathBuf {
        self.dir.join(format!("{}_sampleid_map.tsv", self.prefix))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputFiles {
    pub fasta: String,
    pub taxonomy: String,
    pub sampleid_map: String,
}

/// Creates the output directory. An existing directory is removed first when
/// `overwrite` is set and is an error otherwise.
pub fn prepare_output_dir(layout: &OutputLayout, overwrite: bool) -> Result<(), ConvertError> {
    let dir = layout.dir().as_std_path();
    if dir.exists() {
        if !overwrite {
            return Err(ConvertError::OutputExists(layout.dir().to_string()));
        }
        debug!(dir = %layout.dir(), "removing existing output directory");
        fs::remove_dir_all(dir).map_err(|err| ConvertError::Filesystem(err.to_string()))?;
    }
    fs::create_dir_all(dir).map_err(|err| ConvertError::Filesystem(err.to_string()))
}

/// Writes FASTA, taxonomy and sample-id map files into a prepared directory.
pub fn write_outputs(
    records: &[BarcodeRecord],
    classifier: &Classifier<'_>,
    layout: &OutputLayout,
) -> Result<OutputFiles, ConvertError> {
    let fasta = layout.fasta_path();
    write_atomic(&fasta, |out| write_fasta(records, out))?;

    let taxonomy = layout.taxonomy_path();
    write_atomic(&taxonomy, |out| write_taxonomy(records, classifier, out))?;

    let sampleid_map = layout.sampleid_map_path();
    write_atomic(&sampleid_map, |out| write_sampleid_map(records, out))?;

    Ok(OutputFiles {
        fasta: fasta.to_string(),
        taxonomy: taxonomy.to_string(),
        sampleid_map: sampleid_map.to_string(),
    })
}

/// One `>sampleid` header line and one unwrapped sequence line per record.
pub fn write_fasta<W: Write>(records: &[BarcodeRecord], out: W) -> Result<(), ConvertError> {
    let mut out = BufWriter::new(out);
    for record in records {
        writeln!(out, ">{}", record.sampleid)
            .and_then(|_| writeln!(out, "{}", record.nucleotides))
            .map_err(|err| ConvertError::Filesystem(err.to_string()))?;
    }
    out.flush().map_err(|err| ConvertError::Filesystem(err.to_string()))
}

pub fn write_taxonomy<W: Write>(
    records: &[BarcodeRecord],
    classifier: &Classifier<'_>,
    out: W,
) -> Result<(), ConvertError> {
    let mut writer = tsv_writer(out);
    write_row(&mut writer, ["sampleid", "taxonomy"])?;
    for record in records {
        let lineage = classifier.lineage(record).to_string();
        write_row(&mut writer, [record.sampleid.as_str(), lineage.as_str()])?;
    }
    writer
        .flush()
        .map_err(|err| ConvertError::Filesystem(err.to_string()))
}

pub fn write_sampleid_map<W: Write>(
    records: &[BarcodeRecord],
    out: W,
) -> Result<(), ConvertError> {
    let mut writer = tsv_writer(out);
    write_row(&mut writer, ["sampleid", "bin_uri"])?;
    for record in records {
        write_row(
            &mut writer,
            [record.sampleid.as_str(), record.bin_uri.as_str()],
        )?;
    }
    writer
        .flush()
        .map_err(|err| ConvertError::Filesystem(err.to_string()))
}

fn tsv_writer<W: Write>(out: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Necessary)
        .from_writer(out)
}

fn write_row<W: Write>(writer: &mut csv::Writer<W>, row: [&str; 2]) -> Result<(), ConvertError> {
    writer
        .write_record(row)
        .map_err(|err| ConvertError::Filesystem(err.to_string()))
}

/// Writes through a temp file in the destination directory, then renames it
/// into place so a failed write never leaves a truncated output behind.
fn write_atomic<F>(path: &Utf8Path, write: F) -> Result<(), ConvertError>
where
    F: FnOnce(&mut NamedTempFile) -> Result<(), ConvertError>,
{
    let parent = path
        .parent()
        .ok_or_else(|| ConvertError::Filesystem("invalid destination path".to_string()))?;
    let mut temp = tempfile::Builder::new()
        .prefix("bold2qiime-out")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| ConvertError::Filesystem(err.to_string()))?;
    write(&mut temp)?;
    temp.persist(path.as_std_path())
        .map_err(|err| ConvertError::Filesystem(err.to_string()))?;
    debug!(%path, "output written");
    Ok(())
}
