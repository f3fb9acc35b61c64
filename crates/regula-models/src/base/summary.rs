//! Fixed-width text summary of a regression fit
//!
//! The layout follows the usual statistical package report: a title, paired
//! header rows, the coefficient table and a residual diagnostics block, each
//! separated by `=` or `-` rules.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::base::{ModelError, Result};
use crate::lm::RegressionResult;

/// Default report title
pub const DEFAULT_TITLE: &str = "OLS Regression Results";

/// Narrowest report, in characters
const MIN_WIDTH: usize = 78;

/// Gap between coefficient table columns
const COLUMN_SEPARATOR: &str = "   ";

/// Gap between the left and right halves of a paired row
const PAIR_GAP: &str = "   ";

/// Display options for [`render`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryOptions {
    /// Displayed name of the response, defaults to the fitted name
    pub response_label: Option<String>,
    /// Displayed names of the design columns
    ///
    /// Either one label per column, or, for a model with an intercept, one
    /// per column after the intercept.
    pub predictor_labels: Option<Vec<String>>,
    /// Report title
    pub title: String,
    /// Significance level of the confidence intervals
    pub alpha: f64,
    /// Omit the method, date, time and degrees-of-freedom rows and the
    /// diagnostics block
    pub compact: bool,
    /// Timestamp shown in the Date and Time rows, defaults to now
    pub timestamp: Option<NaiveDateTime>,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            response_label: None,
            predictor_labels: None,
            title: DEFAULT_TITLE.to_string(),
            alpha: 0.05,
            compact: false,
            timestamp: None,
        }
    }
}

impl SummaryOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the report title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the significance level
    pub const fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Override the displayed response name
    pub fn with_response_label(mut self, label: impl Into<String>) -> Self {
        self.response_label = Some(label.into());
        self
    }

    /// Override the displayed column names
    pub fn with_predictor_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predictor_labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// Toggle compact output
    pub const fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Fix the Date and Time rows
    pub const fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Check the options against a result
    pub fn validate(&self, result: &RegressionResult) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ModelError::invalid_config(format!(
                "significance level must lie strictly between 0 and 1, got {}",
                self.alpha
            )));
        }
        self.column_labels(result).map(|_| ())
    }

    fn column_labels(&self, result: &RegressionResult) -> Result<Vec<String>> {
        let names = result.column_names();
        let Some(labels) = &self.predictor_labels else {
            return Ok(names.to_vec());
        };

        if labels.len() == names.len() {
            Ok(labels.clone())
        } else if result.has_intercept() && labels.len() + 1 == names.len() {
            Ok(std::iter::once(names[0].clone())
                .chain(labels.iter().cloned())
                .collect())
        } else {
            Err(ModelError::invalid_config(format!(
                "{} predictor labels given for {} design columns ({})",
                labels.len(),
                names.len(),
                names.join(", ")
            )))
        }
    }
}

/// Render the summary report of `result`
pub fn render(result: &RegressionResult, options: &SummaryOptions) -> Result<String> {
    options.validate(result)?;

    let labels = options.column_labels(result)?;
    let table = coefficient_table(result, &labels, options.alpha)?;
    let width = table.width.max(MIN_WIDTH);
    let timestamp = options
        .timestamp
        .unwrap_or_else(|| Local::now().naive_local());

    let mut lines = Vec::new();
    lines.push(center(&options.title, width));
    lines.push("=".repeat(width));
    lines.extend(paired_rows(
        &header_left(result, options, timestamp),
        &header_right(result),
        width,
    ));
    lines.push("=".repeat(width));
    lines.push(table.header);
    lines.push("-".repeat(width));
    lines.extend(table.rows);
    lines.push("=".repeat(width));

    if !options.compact {
        lines.extend(paired_rows(&diagnostics_left(result), &diagnostics_right(result), width));
        lines.push("=".repeat(width));
    }

    Ok(lines.join("\n"))
}

type Cell = (&'static str, String);

fn header_left(
    result: &RegressionResult,
    options: &SummaryOptions,
    timestamp: NaiveDateTime,
) -> Vec<Cell> {
    let response = options
        .response_label
        .clone()
        .unwrap_or_else(|| result.response_name().to_string());

    let mut cells = vec![("Dep. Variable:", response), ("Model:", "OLS".to_string())];
    if !options.compact {
        cells.push(("Method:", "Least Squares".to_string()));
        cells.push(("Date:", timestamp.format("%a, %d %b %Y").to_string()));
        cells.push(("Time:", timestamp.format("%H:%M:%S").to_string()));
    }
    cells.push(("No. Observations:", result.nobs().to_string()));
    if !options.compact {
        cells.push(("Df Residuals:", result.df_resid().to_string()));
        cells.push(("Df Model:", result.df_model().to_string()));
    }
    cells.push(("Covariance Type:", "nonrobust".to_string()));
    cells
}

fn header_right(result: &RegressionResult) -> Vec<Cell> {
    vec![
        ("R-squared:", format!("{:.3}", result.r_squared())),
        ("Adj. R-squared:", format!("{:.3}", result.r_squared_adj())),
        ("F-statistic:", format_significant(result.f_statistic(), 4)),
        ("Prob (F-statistic):", format_significant(result.f_p_value(), 3)),
        ("Log-Likelihood:", format_significant(result.log_likelihood(), 5)),
        ("AIC:", format_significant(result.aic(), 4)),
        ("BIC:", format_significant(result.bic(), 4)),
    ]
}

fn diagnostics_left(result: &RegressionResult) -> Vec<Cell> {
    let stats = result.residual_statistics();
    vec![
        ("Skew:", format!("{:.3}", stats.skewness)),
        ("Kurtosis:", format!("{:.3}", stats.kurtosis)),
        ("Residual Std. Error:", format_significant(result.residual_std_error(), 4)),
    ]
}

fn diagnostics_right(result: &RegressionResult) -> Vec<Cell> {
    let stats = result.residual_statistics();
    vec![
        ("Durbin-Watson:", format!("{:.3}", stats.durbin_watson)),
        ("Jarque-Bera (JB):", format!("{:.3}", stats.jarque_bera)),
        ("Prob(JB):", format_significant(stats.jarque_bera_p_value, 3)),
    ]
}

/// Lay out two columns of label/value cells side by side
fn paired_rows(left: &[Cell], right: &[Cell], width: usize) -> Vec<String> {
    let left_width = (width - PAIR_GAP.len()) / 2;
    let right_width = width - PAIR_GAP.len() - left_width;

    (0..left.len().max(right.len()))
        .map(|i| {
            let l = left.get(i).map_or_else(String::new, |(label, value)| pair(label, value, left_width));
            let r = right.get(i).map_or_else(String::new, |(label, value)| pair(label, value, right_width));
            format!("{:<left_width$}{PAIR_GAP}{:<right_width$}", l, r)
                .trim_end()
                .to_string()
        })
        .collect()
}

/// Label flush left and value flush right within `width`
fn pair(label: &str, value: &str, width: usize) -> String {
    let used = label.chars().count() + value.chars().count();
    let padding = width.saturating_sub(used).max(1);
    format!("{label}{}{value}", " ".repeat(padding))
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let left = width.saturating_sub(len) / 2;
    format!("{}{text}", " ".repeat(left))
}

struct Table {
    header: String,
    rows: Vec<String>,
    width: usize,
}

fn coefficient_table(result: &RegressionResult, labels: &[String], alpha: f64) -> Result<Table> {
    let coefficients = result.coefficient_table(alpha)?;

    let mut columns: Vec<Vec<String>> = vec![
        std::iter::once(String::new()).chain(labels.iter().cloned()).collect(),
        vec!["coef".to_string()],
        vec!["std err".to_string()],
        vec!["t".to_string()],
        vec!["P>|t|".to_string()],
        vec![format!("[{}", format_level(alpha / 2.0))],
        vec![format!("{}]", format_level(1.0 - alpha / 2.0))],
    ];

    for coefficient in &coefficients {
        columns[1].push(format_number(coefficient.estimate, 4));
        columns[2].push(format_number(coefficient.std_error, 3));
        columns[3].push(format!("{:.3}", coefficient.t_stat));
        columns[4].push(format!("{:.3}", coefficient.p_value));
        columns[5].push(format_number(coefficient.ci_lower, 3));
        columns[6].push(format_number(coefficient.ci_upper, 3));
    }

    let widths: Vec<usize> = columns
        .iter()
        .map(|column| column.iter().map(|s| s.chars().count()).max().unwrap_or(0))
        .collect();

    let mut lines = (0..=coefficients.len()).map(|row| {
        columns
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(c, (column, &w))| {
                if c == 0 {
                    format!("{:<w$}", column[row])
                } else {
                    format!("{COLUMN_SEPARATOR}{:>w$}", column[row])
                }
            })
            .collect::<String>()
    });

    let header = lines.next().unwrap_or_default();
    let rows: Vec<String> = lines.collect();
    let width = widths[0] + widths[1..].iter().map(|w| w + COLUMN_SEPARATOR.len()).sum::<usize>();

    Ok(Table { header, rows, width })
}

/// Fixed-point with `decimals` digits, scientific for very large or very small magnitudes
///
/// ```
/// use regula_models::base::summary::format_number;
///
/// assert_eq!(format_number(-0.035819, 4), "-0.0358");
/// assert_eq!(format_number(-3482258.6346, 4), "-3.4823e+06");
/// assert_eq!(format_number(0.0, 3), "0.000");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    let magnitude = value.abs();
    if value.is_finite() && (magnitude >= 1e4 || (magnitude != 0.0 && magnitude < 1e-4)) {
        format_scientific(value, decimals)
    } else {
        format!("{value:.decimals$}")
    }
}

/// Scientific notation with a signed, two-digit exponent (`1.2346e+06`)
pub fn format_scientific(value: f64, decimals: usize) -> String {
    let text = format!("{value:.decimals$e}");
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.abs())
        }
        None => text,
    }
}

/// `digits` significant digits, switching to scientific notation like `%g`
///
/// Trailing zeros are kept.
pub fn format_significant(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }
    let digits = digits.max(1);
    if value == 0.0 {
        return format!("{value:.prec$}", prec = digits - 1);
    }

    let rounded = format!("{value:.prec$e}", prec = digits - 1);
    let exponent: i32 = rounded
        .split_once('e')
        .and_then(|(_, e)| e.parse().ok())
        .unwrap_or(0);

    if exponent < -4 || exponent >= digits as i32 {
        format_scientific(value, digits - 1)
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        format!("{value:.decimals$}")
    }
}

/// Quantile label for the interval columns
fn format_level(level: f64) -> String {
    let text = format!("{level:.10}");
    let trimmed = text.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_string()
    }
}
