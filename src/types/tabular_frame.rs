//! Row-oriented results, wrapped around a polars `LazyFrame`.

use polars::frame::DataFrame;
use polars::prelude::{Expr, IntoLazy, LazyFrame, PolarsError};

/// A tabular result: one row per observation, named columns, server row
/// order. Fresh from the loader every column is text; call
/// [`TabularFrame::normalize`] to assign semantic types.
///
/// Operations return a new `TabularFrame` and leave the receiver untouched,
/// so each pipeline stage consumes its input and produces a derived table.
#[derive(Clone)]
pub struct TabularFrame {
    /// The underlying polars LazyFrame.
    pub frame: LazyFrame,
}

impl TabularFrame {
    pub fn new(frame: LazyFrame) -> Self {
        Self { frame }
    }

    pub fn from_dataframe(df: DataFrame) -> Self {
        Self::new(df.lazy())
    }

    /// Applies an arbitrary polars predicate lazily, returning a new frame.
    pub fn filter(&self, predicate: Expr) -> TabularFrame {
        TabularFrame::new(self.frame.clone().filter(predicate))
    }

    /// Materializes the frame.
    pub fn collect(&self) -> Result<DataFrame, PolarsError> {
        self.frame.clone().collect()
    }
}
