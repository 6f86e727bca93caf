//! Forward scanner locating fenced diagram blocks.
//!
//! [`DiagramScanner`] walks the document once, left to right, and yields a
//! lazy sequence of [`Segment`]s: verbatim text runs and the diagram blocks
//! found between them. The scan is an explicit state machine:
//!
//! ```text
//! Scanning --start marker--> FoundBlock --end marker--> Emitting --> Scanning
//!     |                          |
//!     +--no marker--> Done       +--no end marker--> error, Done
//! ```
//!
//! Running out of start markers is the only normal termination, so a
//! document with no diagrams yields a single text segment. An opening fence
//! without a closing one yields [`DiagramError::UnclosedBlock`] and ends the
//! scan.

use crate::cache::DiagramId;
use crate::consts::FENCE;
use crate::error::DiagramError;

/// A diagram block discovered by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock<'a> {
    /// Zero-based position among the document's diagram blocks.
    pub ordinal: usize,
    /// 1-based line of the opening fence.
    pub line: usize,
    /// Diagram source between the fences, trimmed.
    pub source: &'a str,
    /// Content hash of `source`.
    pub id: DiagramId,
}

/// One piece of the scanned document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text outside any diagram block, copied verbatim.
    Text(&'a str),
    /// A diagram block to be replaced by its rendered image.
    Diagram(DiagramBlock<'a>),
}

impl<'a> Segment<'a> {
    /// The diagram block, if this segment is one.
    #[must_use]
    pub fn as_diagram(&self) -> Option<&DiagramBlock<'a>> {
        match self {
            Self::Diagram(block) => Some(block),
            Self::Text(_) => None,
        }
    }
}

enum ScanState<'a> {
    Scanning,
    FoundBlock { start: usize },
    Emitting(DiagramBlock<'a>),
    Done,
}

/// Lazy single-pass scanner over a document.
pub struct DiagramScanner<'a> {
    input: &'a str,
    language: String,
    start_marker: String,
    cursor: usize,
    ordinal: usize,
    state: ScanState<'a>,
}

impl<'a> DiagramScanner<'a> {
    /// Scan `input` for blocks fenced as `` ```{language} `` ... `` ``` ``.
    #[must_use]
    pub fn new(input: &'a str, language: &str) -> Self {
        Self {
            input,
            language: language.to_owned(),
            start_marker: format!("{FENCE}{language}"),
            cursor: 0,
            ordinal: 0,
            state: ScanState::Scanning,
        }
    }
}

impl<'a> Iterator for DiagramScanner<'a> {
    type Item = Result<Segment<'a>, DiagramError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, ScanState::Done) {
                ScanState::Scanning => {
                    let rest = &self.input[self.cursor..];
                    if let Some(offset) = rest.find(&self.start_marker) {
                        let start = self.cursor + offset;
                        self.state = ScanState::FoundBlock { start };
                        if offset > 0 {
                            return Some(Ok(Segment::Text(&rest[..offset])));
                        }
                    } else {
                        self.cursor = self.input.len();
                        if !rest.is_empty() {
                            return Some(Ok(Segment::Text(rest)));
                        }
                    }
                }
                ScanState::FoundBlock { start } => {
                    let code_start = start + self.start_marker.len();
                    let line = line_number(self.input, start);
                    let Some(offset) = self.input[code_start..].find(FENCE) else {
                        return Some(Err(DiagramError::UnclosedBlock {
                            language: self.language.clone(),
                            line,
                        }));
                    };
                    let code_end = code_start + offset;
                    let source = self.input[code_start..code_end].trim();
                    let block = DiagramBlock {
                        ordinal: self.ordinal,
                        line,
                        source,
                        id: DiagramId::from_source(source),
                    };
                    self.ordinal += 1;
                    self.cursor = code_end + FENCE.len();
                    self.state = ScanState::Emitting(block);
                }
                ScanState::Emitting(block) => {
                    self.state = ScanState::Scanning;
                    return Some(Ok(Segment::Diagram(block)));
                }
                ScanState::Done => return None,
            }
        }
    }
}

/// 1-based line number of byte offset `pos`.
fn line_number(input: &str, pos: usize) -> usize {
    input[..pos].matches('\n').count() + 1
}
