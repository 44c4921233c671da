#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningCode {
    EmptyPage,
    PageSkipped,
    IncompleteColumnGrid,
    MalformedRow,
    UnrecognizedMatchup,
    UnrecognizedStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseWarning {
    pub code: WarningCode,
    pub message: String,
    pub page: Option<u32>,
    pub row: Option<usize>,
}

impl ParseWarning {
    #[must_use]
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            page: None,
            row: None,
        }
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}
