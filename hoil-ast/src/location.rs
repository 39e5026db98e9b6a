use std::fmt;
use std::rc::Rc;

/// A source location owned well enough to outlive parsing: `filename` is a cheaply cloned
/// `Rc<str>` shared by every node from the same file, rather than a raw pointer into a source
/// buffer that could be freed out from under a later diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub line: u32,
    pub column: u32,
    pub filename: Rc<str>,
}

impl Location {
    pub fn new(line: u32, column: u32, filename: Rc<str>) -> Self {
        Self { line, column, filename }
    }

    /// Borrow this location as a [`hoil_diag::Location`] for reporting.
    pub fn as_diag(&self) -> hoil_diag::Location<'_> {
        hoil_diag::Location::new(self.line, self.column, &self.filename)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}
