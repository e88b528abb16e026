#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningCode {
    CellClipped,
    CellOutOfBounds,
    HeaderRowFallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridWarning {
    pub code: WarningCode,
    pub message: String,
    pub row: Option<i64>,
    pub col: Option<i64>,
}

impl GridWarning {
    #[must_use]
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            row: None,
            col: None,
        }
    }

    #[must_use]
    pub fn at(mut self, row: i64, col: i64) -> Self {
        self.row = Some(row);
        self.col = Some(col);
        self
    }
}
