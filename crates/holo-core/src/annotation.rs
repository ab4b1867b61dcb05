//! Caller-supplied annotation inputs and their normalized form.

use std::collections::BTreeMap;

use ndarray::{Array1, ArrayD};
use polars::prelude::{AnyValue, DataFrame, NamedFrom, PlSmallStr, Series};

/// Raw annotation data to attach trial-wise or cell-wise.
///
/// Positional inputs (everything except a table carrying a key column) map
/// entry *i* onto the *i*-th smallest distinct key of the target table.
#[derive(Debug, Clone)]
pub enum Annotation {
    /// Bare one-dimensional values; needs a column name.
    Values(Series),
    /// Dense array; must be one-dimensional and needs a column name.
    Array(ArrayD<f64>),
    /// Column name to sequence, one output column per entry.
    Mapping(Vec<(String, Series)>),
    /// Single named column, attached under its own name.
    Column(Series),
    /// Multi-column table. A column named like the join key holds explicit keys.
    Table(DataFrame),
    /// A lone scalar, which is not an attachable shape.
    Scalar(AnyValue<'static>),
}

impl Annotation {
    /// Short description of the variant for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Values(_) => "values",
            Self::Array(_) => "array",
            Self::Mapping(_) => "mapping",
            Self::Column(_) => "column",
            Self::Table(_) => "table",
            Self::Scalar(_) => "scalar",
        }
    }
}

impl<T> From<Vec<T>> for Annotation
where
    Series: NamedFrom<Vec<T>, [T]>,
{
    fn from(values: Vec<T>) -> Self {
        Self::Values(Series::new(PlSmallStr::EMPTY, values))
    }
}

impl From<Series> for Annotation {
    fn from(series: Series) -> Self {
        Self::Column(series)
    }
}

impl From<DataFrame> for Annotation {
    fn from(df: DataFrame) -> Self {
        Self::Table(df)
    }
}

impl From<ArrayD<f64>> for Annotation {
    fn from(array: ArrayD<f64>) -> Self {
        Self::Array(array)
    }
}

impl From<Array1<f64>> for Annotation {
    fn from(array: Array1<f64>) -> Self {
        Self::Array(array.into_dyn())
    }
}

impl From<BTreeMap<String, Series>> for Annotation {
    fn from(mapping: BTreeMap<String, Series>) -> Self {
        Self::Mapping(mapping.into_iter().collect())
    }
}

impl From<AnyValue<'static>> for Annotation {
    fn from(value: AnyValue<'static>) -> Self {
        Self::Scalar(value)
    }
}

/// Normalized annotation ready to merge: one row per key.
#[derive(Debug, Clone)]
pub struct AnnotationUnit {
    data: DataFrame,
}

impl AnnotationUnit {
    pub(crate) fn new(data: DataFrame) -> Self {
        Self { data }
    }

    /// Number of annotation rows (one per key).
    pub fn height(&self) -> usize {
        self.data.height()
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn column_names(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn into_inner(self) -> DataFrame {
        self.data
    }
}
