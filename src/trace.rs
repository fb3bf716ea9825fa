//! Optional structured recording of parser entries and exits.
//!
//! A collector records one open entry when a parser is entered and one
//! closed entry when it exits, so the listing reflects the depth-first
//! left-to-right traversal of the composed parser tree. Collectors are
//! plain single-parse state: pair each parse with its own collector.

use crate::position::Position;
use std::fmt::Write;
use std::time::Duration;

/// One recorded parser entry or exit.
#[derive(Debug, Clone)]
pub struct TraceEntry {
    pub parser_name: String,
    pub start: Position,
    /// `None` for the entry recorded on the way in.
    pub end: Option<Position>,
    pub success: bool,
    pub depth: usize,
    pub value_preview: Option<String>,
    pub error_preview: Option<String>,
    pub elapsed: Option<Duration>,
}

/// An ordered sequence of trace entries with a current-depth counter.
#[derive(Debug, Clone)]
pub struct TraceCollector {
    entries: Vec<TraceEntry>,
    depth: usize,
    max_entries: usize,
}

pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

impl TraceCollector {
    pub fn new() -> TraceCollector {
        TraceCollector::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_entries(max_entries: usize) -> TraceCollector {
        TraceCollector {
            entries: Vec::new(),
            depth: 0,
            max_entries,
        }
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Record entering a parser. Entries past the cap are dropped silently;
    /// the depth counter still moves so later entries stay aligned.
    pub fn enter(&mut self, name: &str, pos: Position) {
        if self.entries.len() < self.max_entries {
            self.entries.push(TraceEntry {
                parser_name: name.to_owned(),
                start: pos,
                end: None,
                success: false,
                depth: self.depth,
                value_preview: None,
                error_preview: None,
                elapsed: None,
            });
        }
        self.depth += 1;
    }

    /// Record leaving a parser.
    #[allow(clippy::too_many_arguments)]
    pub fn exit(
        &mut self,
        name: &str,
        start: Position,
        end: Position,
        success: bool,
        value_preview: Option<String>,
        error_preview: Option<String>,
        elapsed: Option<Duration>,
    ) {
        self.depth = self.depth.saturating_sub(1);
        if self.entries.len() < self.max_entries {
            self.entries.push(TraceEntry {
                parser_name: name.to_owned(),
                start,
                end: Some(end),
                success,
                depth: self.depth,
                value_preview,
                error_preview,
                elapsed,
            });
        }
    }

    /// A multi-line listing: indentation proportional to depth, a glyph for
    /// the outcome, positions, previews, and elapsed time where measured.
    pub fn to_report(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let indent = 2 * entry.depth;
            match &entry.end {
                None => {
                    let _ = writeln!(
                        out,
                        "{:indent$}> {} @ {}",
                        "", entry.parser_name, entry.start,
                    );
                }
                Some(end) => {
                    let glyph = if entry.success { "✓" } else { "✗" };
                    let _ = write!(
                        out,
                        "{:indent$}{} {} {}..{}",
                        "", glyph, entry.parser_name, entry.start, end,
                    );
                    if let Some(preview) = &entry.value_preview {
                        let _ = write!(out, " = {}", preview);
                    }
                    if let Some(preview) = &entry.error_preview {
                        let _ = write!(out, " ! {}", preview);
                    }
                    if let Some(elapsed) = entry.elapsed {
                        let _ = write!(out, " ({:?})", elapsed);
                    }
                    out.push('\n');
                }
            }
        }
        out
    }
}

impl Default for TraceCollector {
    fn default() -> TraceCollector {
        TraceCollector::new()
    }
}

#[test]
fn test_depth_and_cap() {
    let pos = Position::initial("t");
    let mut trace = TraceCollector::with_max_entries(3);
    trace.enter("outer", pos.clone());
    trace.enter("inner", pos.clone());
    trace.exit("inner", pos.clone(), pos.clone(), true, None, None, None);
    // The cap is reached; this exit is dropped but depth still unwinds.
    trace.exit("outer", pos.clone(), pos.clone(), false, None, None, None);
    assert_eq!(trace.entries().len(), 3);
    assert_eq!(trace.entries()[0].depth, 0);
    assert_eq!(trace.entries()[1].depth, 1);
    assert_eq!(trace.entries()[2].depth, 1);

    let report = trace.to_report();
    assert!(report.contains("> outer @ t:1:1"));
    assert!(report.contains("✓ inner"));
}
