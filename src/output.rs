use std::io::{self, Write};

use serde::Serialize;

use crate::app::{ConvertSummary, ProgressEvent, ProgressSink};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_summary(summary: &ConvertSummary) -> io::Result<()> {
        Self::print_json(summary)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

pub struct TextOutput;

impl TextOutput {
    pub fn print_summary(summary: &ConvertSummary) -> io::Result<()> {
        let mut stdout = io::stdout();
        Self::write_summary(&mut stdout, summary)
    }

    pub fn write_summary<W: Write>(out: &mut W, summary: &ConvertSummary) -> io::Result<()> {
        let green = "\x1b[32m";
        let yellow = "\x1b[33m";
        let cyan = "\x1b[36m";
        let reset = "\x1b[0m";

        writeln!(out, "{cyan}bold2qiime summary{reset}")?;
        writeln!(
            out,
            "{green}records written: {} of {} loaded{reset}",
            summary.rows_retained, summary.rows_loaded
        )?;
        writeln!(
            out,
            "{yellow}dropped: {} marker, {} duplicate, {} sequence{reset}",
            summary.dropped_marker, summary.dropped_duplicates, summary.dropped_sequence
        )?;
        for (kingdom, count) in &summary.kingdoms {
            writeln!(out, "  {kingdom}: {count}")?;
        }
        writeln!(out, "{cyan}fasta:        {}{reset}", summary.files.fasta)?;
        writeln!(out, "{cyan}taxonomy:     {}{reset}", summary.files.taxonomy)?;
        writeln!(out, "{cyan}sampleid map: {}{reset}", summary.files.sampleid_map)?;
        Ok(())
    }
}
