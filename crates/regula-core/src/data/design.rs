//! Design matrix construction from records

use ndarray::{Array1, Array2, Axis};

use super::{DataError, DataResult, FloatArray, Matrix, Record};
use crate::formula::Formula;

/// Response vector and predictor matrix materialised from a formula
///
/// When the model has an intercept it occupies column 0 and is 1.0 on every
/// row. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    response: FloatArray,
    predictors: Matrix,
    response_name: String,
    column_names: Vec<String>,
    has_intercept: bool,
}

impl DesignMatrix {
    /// Build the response vector and predictor matrix for `formula`
    ///
    /// Field accessors are resolved once per name, then `records` is
    /// consumed in order.
    pub fn build<'a, R, I>(formula: &Formula, records: I) -> DataResult<Self>
    where
        R: Record + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let response = resolve::<R>(formula, &formula.response)?;
        let accessors = resolve_predictors::<R>(formula)?;

        let mut y = Vec::new();
        let mut values = Vec::new();
        let mut nrows = 0;

        for (row, record) in records.into_iter().enumerate() {
            y.push(read_value(formula, record, &response, &formula.response, row)?);
            push_row(formula, &accessors, record, row, &mut values)?;
            nrows += 1;
        }

        let ncols = formula.predictors.len() + formula.k_constant();
        let predictors = to_matrix(values, nrows, ncols)?;

        tracing::debug!(
            formula = %formula.original,
            rows = nrows,
            columns = ncols,
            "materialized design matrix"
        );

        Ok(Self {
            response: Array1::from(y),
            predictors,
            response_name: formula.response.clone(),
            column_names: formula.column_names(),
            has_intercept: formula.has_intercept,
        })
    }

    /// Build only the predictor matrix, e.g. for prediction on new records
    pub fn build_predictors<'a, R, I>(formula: &Formula, records: I) -> DataResult<Matrix>
    where
        R: Record + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let accessors = resolve_predictors::<R>(formula)?;

        let mut values = Vec::new();
        let mut nrows = 0;
        for (row, record) in records.into_iter().enumerate() {
            push_row(formula, &accessors, record, row, &mut values)?;
            nrows += 1;
        }

        to_matrix(values, nrows, formula.predictors.len() + formula.k_constant())
    }

    /// Assemble a design matrix from arrays that are already materialised
    pub fn from_arrays(
        response: FloatArray,
        predictors: Matrix,
        response_name: impl Into<String>,
        column_names: Vec<String>,
        has_intercept: bool,
    ) -> DataResult<Self> {
        if predictors.nrows() != response.len() {
            return Err(DataError::DimensionMismatch {
                expected: format!("{} predictor rows", response.len()),
                actual: format!("{} rows", predictors.nrows()),
            });
        }

        if column_names.len() != predictors.ncols() {
            return Err(DataError::DimensionMismatch {
                expected: format!("{} column names", predictors.ncols()),
                actual: format!("{} names", column_names.len()),
            });
        }

        if has_intercept {
            let constant = predictors.ncols() > 0
                && predictors.index_axis(Axis(1), 0).iter().all(|&v| v == 1.0);
            if !constant {
                return Err(DataError::DimensionMismatch {
                    expected: "a constant column of ones at index 0 for the intercept".to_string(),
                    actual: "a non-constant first column".to_string(),
                });
            }
        }

        Ok(Self {
            response,
            predictors,
            response_name: response_name.into(),
            column_names,
            has_intercept,
        })
    }

    /// Response vector (y)
    pub const fn response(&self) -> &FloatArray {
        &self.response
    }

    /// Predictor matrix (X), intercept column first when present
    pub const fn predictors(&self) -> &Matrix {
        &self.predictors
    }

    /// Name of the response variable
    pub fn response_name(&self) -> &str {
        &self.response_name
    }

    /// Names of the predictor matrix columns
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Whether column 0 is the intercept
    pub const fn has_intercept(&self) -> bool {
        self.has_intercept
    }

    /// Number of observations
    pub fn nobs(&self) -> usize {
        self.response.len()
    }

    /// Number of predictor columns, intercept included
    pub fn ncols(&self) -> usize {
        self.predictors.ncols()
    }

    /// Number of constant columns (0 or 1)
    pub const fn k_constant(&self) -> usize {
        if self.has_intercept { 1 } else { 0 }
    }

    /// Model degrees of freedom: predictors excluding the intercept
    pub fn df_model(&self) -> usize {
        self.ncols() - self.k_constant()
    }

    /// Residual degrees of freedom: observations minus columns
    ///
    /// Negative or zero when there are not enough observations to fit.
    pub fn df_resid(&self) -> isize {
        self.nobs() as isize - self.ncols() as isize
    }
}

fn resolve<R: Record>(formula: &Formula, name: &str) -> DataResult<R::Accessor> {
    R::accessor(name).ok_or_else(|| DataError::FieldNotFound {
        formula: formula.original.clone(),
        field: name.to_string(),
    })
}

fn resolve_predictors<R: Record>(formula: &Formula) -> DataResult<Vec<R::Accessor>> {
    formula
        .predictors
        .iter()
        .map(|name| resolve::<R>(formula, name))
        .collect()
}

fn push_row<R: Record>(
    formula: &Formula,
    accessors: &[R::Accessor],
    record: &R,
    row: usize,
    values: &mut Vec<f64>,
) -> DataResult<()> {
    if formula.has_intercept {
        values.push(1.0);
    }
    for (accessor, name) in accessors.iter().zip(&formula.predictors) {
        values.push(read_value(formula, record, accessor, name, row)?);
    }
    Ok(())
}

fn read_value<R: Record>(
    formula: &Formula,
    record: &R,
    accessor: &R::Accessor,
    field: &str,
    row: usize,
) -> DataResult<f64> {
    let value = record.read(accessor).ok_or_else(|| {
        tracing::debug!(field, row, "record lacks formula field");
        DataError::FieldNotFound {
            formula: formula.original.clone(),
            field: field.to_string(),
        }
    })?;

    match value.to_f64() {
        Some(v) if v.is_nan() => Err(DataError::MissingValue {
            field: field.to_string(),
            row,
        }),
        Some(v) => Ok(v),
        None => Err(DataError::NonNumericField {
            field: field.to_string(),
            row,
            value: value.to_string(),
        }),
    }
}

fn to_matrix(values: Vec<f64>, nrows: usize, ncols: usize) -> DataResult<Matrix> {
    Array2::from_shape_vec((nrows, ncols), values).map_err(|e| DataError::DimensionMismatch {
        expected: format!("{} x {} design matrix", nrows, ncols),
        actual: e.to_string(),
    })
}
