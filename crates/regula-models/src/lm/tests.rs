//! Tests for linear regression models

use approx::{assert_abs_diff_eq, assert_relative_eq};
use chrono::NaiveDate;
use indexmap::IndexMap;
use ndarray::array;
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};
use std::collections::HashMap;

use regula_core::data::{DataError, DesignMatrix};
use regula_core::formula::{Formula, FormulaError};
use regula_core::impl_record;

use crate::base::{ModelError, SummaryOptions};
use crate::lm::{OlsEstimator, OlsModel, ols};

// ==================== Test Fixtures ====================

#[derive(Debug, Clone)]
struct Observation {
    y: f64,
    x1: f64,
    x2: f64,
}

impl_record!(Observation {
    y => "y",
    x1 => "x1",
    x2 => "x2",
});

/// Noiseless: y = 1 + 2 x1 + 3 x2
fn exact_data() -> Vec<Observation> {
    [(1.0, 2.0), (2.0, 1.0), (3.0, 4.0), (4.0, 3.0), (5.0, 6.0), (6.0, 8.0)]
        .into_iter()
        .map(|(x1, x2)| Observation {
            y: 1.0 + 2.0 * x1 + 3.0 * x2,
            x1,
            x2,
        })
        .collect()
}

/// y = 10 + 2 x1 - 1.5 x2 + N(0, 0.5), seeded
fn noisy_data() -> Vec<Observation> {
    let mut rng = StdRng::seed_from_u64(42);
    let noise = Normal::new(0.0, 0.5).unwrap();

    (0..100)
        .map(|i| {
            let x1 = i as f64 * 0.1;
            let x2 = (i as f64).sin() * 3.0;
            Observation {
                y: 10.0 + 2.0 * x1 - 1.5 * x2 + noise.sample(&mut rng),
                x1,
                x2,
            }
        })
        .collect()
}

fn map_rows(columns: &[(&str, &[f64])]) -> Vec<HashMap<String, f64>> {
    let n = columns[0].1.len();
    (0..n)
        .map(|i| {
            columns
                .iter()
                .map(|(name, values)| (name.to_string(), values[i]))
                .collect()
        })
        .collect()
}

fn normalized(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fixed_options() -> SummaryOptions {
    let timestamp = NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|d| d.and_hms_opt(9, 30, 0))
        .unwrap();
    SummaryOptions::default().with_timestamp(timestamp)
}

// ==================== Estimation ====================

#[test]
fn test_exact_recovery_of_noiseless_coefficients() {
    let result = ols("y ~ x1 + x2", &exact_data()).unwrap();

    assert_abs_diff_eq!(result.coefficients(), &array![1.0, 2.0, 3.0], epsilon = 1e-10);
    assert_abs_diff_eq!(result.r_squared(), 1.0, epsilon = 1e-12);
    assert!(result.residuals().iter().all(|r| r.abs() < 1e-10));
    assert_abs_diff_eq!(
        result.fitted_values(),
        &exact_data().iter().map(|o| o.y).collect::<ndarray::Array1<f64>>(),
        epsilon = 1e-10
    );
    assert_eq!(result.column_names(), ["Intercept", "x1", "x2"]);
    assert_eq!(result.df_model(), 2);
    assert_eq!(result.df_resid(), 3);
    assert_eq!(result.nobs(), 6);
}

#[test]
fn test_simple_regression_closed_form() {
    let x = [1.0, 2.0, 3.0, 4.0, 5.0];
    let y = [2.1, 3.9, 6.2, 7.8, 10.1];
    let rows = map_rows(&[("x", &x), ("y", &y)]);
    let result = ols("y ~ x", &rows).unwrap();

    let n = x.len() as f64;
    let x_mean = x.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;
    let sxx: f64 = x.iter().map(|v| (v - x_mean).powi(2)).sum();
    let sxy: f64 = x.iter().zip(&y).map(|(a, b)| (a - x_mean) * (b - y_mean)).sum();
    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let rss: f64 = x
        .iter()
        .zip(&y)
        .map(|(a, b)| (b - intercept - slope * a).powi(2))
        .sum();
    let sigma2 = rss / (n - 2.0);

    assert_relative_eq!(result.coefficients()[0], intercept, max_relative = 1e-10);
    assert_relative_eq!(result.coefficients()[1], slope, max_relative = 1e-10);
    assert_relative_eq!(result.residual_sum_of_squares(), rss, max_relative = 1e-8);
    assert_relative_eq!(
        result.standard_errors()[1],
        (sigma2 / sxx).sqrt(),
        max_relative = 1e-8
    );
    assert_relative_eq!(
        result.standard_errors()[0],
        (sigma2 * (1.0 / n + x_mean * x_mean / sxx)).sqrt(),
        max_relative = 1e-8
    );
    // With one regressor, F = t^2
    assert_relative_eq!(
        result.f_statistic(),
        result.t_statistics()[1].powi(2),
        max_relative = 1e-8
    );
    assert_relative_eq!(result.f_p_value(), result.p_values()[1], max_relative = 1e-6);
}

#[test]
fn test_statistics_are_consistent() {
    let result = ols("y ~ x1 + x2", &noisy_data()).unwrap();
    let stats = result.statistics();
    let n = result.nobs() as f64;
    let k = result.column_names().len() as f64;

    assert_relative_eq!(stats.ess + stats.rss, stats.tss, max_relative = 1e-10);
    assert_relative_eq!(stats.r_squared, 1.0 - stats.rss / stats.tss, max_relative = 1e-12);
    assert_relative_eq!(
        result.r_squared_adj(),
        1.0 - (n - 1.0) / (n - k) * (1.0 - result.r_squared()),
        max_relative = 1e-12
    );
    assert_relative_eq!(result.model_mean_squared_error(), stats.ess / 2.0, max_relative = 1e-12);
    assert_relative_eq!(result.residual_mean_squared_error(), stats.rss / (n - k), max_relative = 1e-12);
    assert_relative_eq!(result.total_mean_squared_error(), stats.tss / (n - 1.0), max_relative = 1e-12);
    assert_relative_eq!(
        result.f_statistic(),
        result.model_mean_squared_error() / result.residual_mean_squared_error(),
        max_relative = 1e-12
    );
    assert_relative_eq!(
        result.residual_std_error(),
        result.residual_mean_squared_error().sqrt(),
        max_relative = 1e-12
    );

    let llf = -n / 2.0 * (2.0 * std::f64::consts::PI).ln() - n / 2.0 * (stats.rss / n).ln() - n / 2.0;
    assert_relative_eq!(result.log_likelihood(), llf, max_relative = 1e-12);
    assert_relative_eq!(result.aic(), -2.0 * llf + 2.0 * k, max_relative = 1e-12);
    assert_relative_eq!(result.bic(), -2.0 * llf + n.ln() * k, max_relative = 1e-12);

    for i in 0..3 {
        let se = result.standard_errors()[i];
        assert_relative_eq!(se * se, result.cov_params()[(i, i)], max_relative = 1e-12);
        assert_relative_eq!(
            result.t_statistics()[i],
            result.coefficients()[i] / se,
            max_relative = 1e-12
        );
        assert!((0.0..=1.0).contains(&result.p_values()[i]));
    }
    assert_relative_eq!(result.cov_params()[(0, 1)], result.cov_params()[(1, 0)], max_relative = 1e-10);
}

#[test]
fn test_noisy_data_recovers_parameters() {
    let result = ols("y ~ x1 + x2", &noisy_data()).unwrap();
    let params = result.params();

    assert_eq!(params.keys().collect::<Vec<_>>(), ["Intercept", "x1", "x2"]);
    assert_abs_diff_eq!(params["Intercept"], 10.0, epsilon = 0.5);
    assert_abs_diff_eq!(params["x1"], 2.0, epsilon = 0.1);
    assert_abs_diff_eq!(params["x2"], -1.5, epsilon = 0.1);
    assert!(result.p_values()[1] < 1e-6);
    assert!(result.p_values()[2] < 1e-6);
    assert!(result.f_p_value() < 1e-6);
    assert!(result.r_squared() > 0.9);

    let x1 = result.coefficient("x1").unwrap();
    assert_eq!(x1.estimate, params["x1"]);
    assert!(x1.ci_lower < x1.estimate && x1.estimate < x1.ci_upper);
    assert!(x1.is_significant());
    assert!(!x1.is_intercept);
    assert!(result.coefficient("Intercept").unwrap().is_intercept);
    assert!(result.coefficient("x3").is_none());
}

#[test]
fn test_r_squared_invariant_to_column_order() {
    let data = noisy_data();
    let forward = ols("y ~ x1 + x2", &data).unwrap();
    let backward = ols("y ~ x2 + x1", &data).unwrap();

    assert_relative_eq!(forward.r_squared(), backward.r_squared(), max_relative = 1e-12);
    assert_relative_eq!(forward.f_statistic(), backward.f_statistic(), max_relative = 1e-10);
    assert_relative_eq!(forward.params()["x1"], backward.params()["x1"], max_relative = 1e-10);
    assert_relative_eq!(forward.params()["x2"], backward.params()["x2"], max_relative = 1e-10);
}

#[test]
fn test_intercept_removal_changes_r_squared() {
    let data = noisy_data();
    let with_intercept = ols("y ~ x1 + x2", &data).unwrap();
    let without = ols("y ~ x1 + x2 - 1", &data).unwrap();

    assert!(!without.has_intercept());
    assert_eq!(without.column_names(), ["x1", "x2"]);
    assert_eq!(without.df_model(), 2);
    assert_eq!(without.df_resid(), 98);
    assert!((with_intercept.r_squared() - without.r_squared()).abs() > 1e-3);

    // Uncentred total sum of squares
    let tss: f64 = data.iter().map(|o| o.y * o.y).sum();
    assert_relative_eq!(without.total_sum_of_squares(), tss, max_relative = 1e-12);
}

#[test]
fn test_intercept_only_model() {
    let rows = map_rows(&[("y", &[1.0, 2.0, 4.0, 5.0])]);
    let result = ols("y ~", &rows).unwrap();

    assert_abs_diff_eq!(result.coefficients()[0], 3.0, epsilon = 1e-12);
    assert_eq!(result.df_model(), 0);
    assert_eq!(result.df_resid(), 3);
    assert!(result.f_statistic().is_nan());
    assert!(result.f_p_value().is_nan());
    assert_abs_diff_eq!(result.r_squared(), 0.0, epsilon = 1e-12);

    let text = result.summary(&fixed_options()).unwrap();
    assert!(text.contains("Intercept"));
}

#[test]
fn test_fit_is_idempotent() {
    let model = OlsModel::new("y ~ x1 + x2", &noisy_data()).unwrap();
    let first = model.fit().unwrap();
    let second = model.fit().unwrap();
    assert_eq!(first, second);
}

// ==================== Failure Modes ====================

#[test]
fn test_identical_columns_are_singular() {
    let x = [1.0, 2.0, 3.0, 5.0, 8.0];
    let rows = map_rows(&[("x", &x), ("z", &x), ("y", &[2.0, 1.0, 4.0, 3.0, 6.0])]);
    let err = ols("y ~ x + z", &rows).unwrap_err();

    assert_eq!(
        err,
        ModelError::SingularMatrix {
            column: "z".to_string()
        }
    );
    assert!(err.to_string().contains("'z'"));
}

#[test]
fn test_rank_tolerance_is_configurable() {
    let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let z: Vec<f64> = x
        .iter()
        .enumerate()
        .map(|(i, v)| v + if i % 2 == 0 { 1e-6 } else { -1e-6 })
        .collect();
    let rows = map_rows(&[("x", &x), ("z", &z), ("y", &[1.0, 3.0, 2.0, 5.0, 4.0, 6.0])]);

    let model = OlsModel::new("y ~ x + z", &rows).unwrap();
    assert!(model.fit().is_ok());

    let strict = model.with_estimator(OlsEstimator::new().with_tolerance(1e-4));
    assert_eq!(
        strict.fit().unwrap_err(),
        ModelError::SingularMatrix {
            column: "z".to_string()
        }
    );

    let invalid = strict.with_estimator(OlsEstimator::new().with_tolerance(-1.0));
    assert!(matches!(invalid.fit(), Err(ModelError::InvalidConfig { .. })));
}

#[test]
fn test_insufficient_data() {
    let data = exact_data();
    let model = OlsModel::new("y ~ x1 + x2", &data[..3]).unwrap();
    assert_eq!(model.df_resid(), 0);

    assert_eq!(
        model.fit().unwrap_err(),
        ModelError::InsufficientData {
            n_samples: 3,
            n_predictors: 3,
        }
    );
}

#[test]
fn test_construction_errors_propagate() {
    let err = OlsModel::new("y ~ y", &exact_data()).unwrap_err();
    assert!(matches!(
        err,
        ModelError::Formula(FormulaError::ResponseInPredictors { ref name, .. }) if name == "y"
    ));

    let err = OlsModel::new("y ~ x1 + x3", &exact_data()).unwrap_err();
    assert_eq!(
        err,
        ModelError::Data(DataError::FieldNotFound {
            formula: "y ~ x1 + x3".to_string(),
            field: "x3".to_string(),
        })
    );
}

#[test]
fn test_unknown_column_in_text_rows() {
    let rows: Vec<IndexMap<String, String>> = exact_data()
        .iter()
        .map(|o| {
            IndexMap::from([
                ("x".to_string(), o.x1.to_string()),
                ("y".to_string(), o.y.to_string()),
            ])
        })
        .collect();

    let err = ols("y ~ x + Literacy", &rows).unwrap_err();
    assert_eq!(
        err,
        ModelError::Data(DataError::FieldNotFound {
            formula: "y ~ x + Literacy".to_string(),
            field: "Literacy".to_string(),
        })
    );
    assert!(err.to_string().contains("formula 'y ~ x + Literacy'"), "{err}");

    assert!(ols("y ~ x", &rows).is_ok());
}

// ==================== Model Metadata ====================

#[test]
fn test_model_metadata_before_fitting() {
    let model = OlsModel::new("y ~ x2 + x1 + x2", &exact_data()).unwrap();

    assert_eq!(model.formula_text(), "y ~ x2 + x1 + x2");
    assert_eq!(model.formula().predictors, vec!["x2", "x1"]);
    assert_eq!(model.endog_name(), "y");
    assert_eq!(model.exog_names(), ["Intercept", "x2", "x1"]);
    assert_eq!(model.k_constant(), 1);
    assert_eq!(model.nobs(), 6);
    assert_eq!(model.df_model(), 2);
    assert_eq!(model.df_resid(), 3);

    let model = OlsModel::new("y ~ x1 - 1", &exact_data()).unwrap();
    assert_eq!(model.k_constant(), 0);
    assert_eq!(model.df_model(), 1);
    assert_eq!(model.df_resid(), 5);
}

#[test]
fn test_from_design() {
    let formula = Formula::parse("y ~ x1").unwrap();
    let design = DesignMatrix::build(&formula, &exact_data()).unwrap();
    let model = OlsModel::from_design(formula.clone(), design).unwrap();
    assert_eq!(model.formula_text(), "y ~ x1");
    assert!(model.fit().is_ok());

    let other = Formula::parse("y ~ x2").unwrap();
    let design = DesignMatrix::build(&other, &exact_data()).unwrap();
    let err = OlsModel::from_design(formula, design).unwrap_err();
    assert!(matches!(err, ModelError::Data(DataError::DimensionMismatch { .. })));
}

// ==================== Prediction ====================

#[test]
fn test_predict_new_records() {
    let result = ols("y ~ x1 + x2", &exact_data()).unwrap();
    let new_rows = map_rows(&[("x1", &[10.0, 0.0]), ("x2", &[1.0, 0.0])]);

    let predicted = result.predict(&new_rows).unwrap();
    assert_abs_diff_eq!(predicted, array![24.0, 1.0], epsilon = 1e-9);

    let err = result.predict_matrix(&array![[1.0, 2.0]]).unwrap_err();
    assert!(matches!(err, ModelError::Data(DataError::DimensionMismatch { .. })));
}

#[test]
fn test_predict_requires_formula() {
    let design = DesignMatrix::from_arrays(
        array![1.0, 2.9, 5.1, 7.0],
        array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]],
        "y",
        vec!["Intercept".to_string(), "x".to_string()],
        true,
    )
    .unwrap();
    let result = OlsEstimator::new().estimate(&design).unwrap();

    assert!(result.formula().is_none());
    let rows = map_rows(&[("x", &[4.0])]);
    assert!(matches!(result.predict(&rows), Err(ModelError::InvalidConfig { .. })));

    let predicted = result.predict_matrix(&array![[1.0, 4.0]]).unwrap();
    assert_abs_diff_eq!(
        predicted[0],
        result.coefficients()[0] + 4.0 * result.coefficients()[1],
        epsilon = 1e-12
    );
}

// ==================== Confidence Intervals ====================

#[test]
fn test_conf_int_widens_with_confidence() {
    let result = ols("y ~ x1 + x2", &noisy_data()).unwrap();
    let ci95 = result.conf_int(0.05).unwrap();
    let ci99 = result.conf_int(0.01).unwrap();

    for i in 0..3 {
        let coef = result.coefficients()[i];
        assert_relative_eq!((ci95[(i, 0)] + ci95[(i, 1)]) / 2.0, coef, max_relative = 1e-12);
        assert!(ci99[(i, 0)] < ci95[(i, 0)]);
        assert!(ci99[(i, 1)] > ci95[(i, 1)]);
    }

    // Large df: close to the normal quantile
    assert_abs_diff_eq!(result.critical_value(0.05).unwrap(), 1.96, epsilon = 0.05);
    assert!(matches!(result.conf_int(0.0), Err(ModelError::InvalidConfig { .. })));
    assert!(matches!(result.conf_int(1.5), Err(ModelError::InvalidConfig { .. })));
}

// ==================== Summary ====================

#[test]
fn test_summary_layout() {
    let result = ols("y ~ x1 + x2", &noisy_data()).unwrap();
    let text = result.summary(&fixed_options()).unwrap();
    let flat = normalized(&text);

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0].trim(), "OLS Regression Results");
    assert!(lines[1].chars().all(|c| c == '='));
    assert!(lines[1].len() >= 78);

    assert!(flat.contains("Dep. Variable: y"));
    assert!(flat.contains("Model: OLS"));
    assert!(flat.contains("Method: Least Squares"));
    assert!(flat.contains("Date: Fri, 01 Mar 2024"));
    assert!(flat.contains("Time: 09:30:00"));
    assert!(flat.contains("No. Observations: 100"));
    assert!(flat.contains("Df Residuals: 97"));
    assert!(flat.contains("Df Model: 2"));
    assert!(flat.contains("Covariance Type: nonrobust"));
    assert!(flat.contains(&format!("R-squared: {:.3}", result.r_squared())));
    assert!(flat.contains("coef std err t P>|t| [0.025 0.975]"));
    assert!(flat.contains(&format!("x1 {:.4}", result.coefficients()[1])));
    assert!(flat.contains("Durbin-Watson:"));
    assert!(flat.contains("Prob(JB):"));

    // Every coefficient row has the same width as the table header
    let header = lines.iter().position(|l| l.contains("std err")).unwrap();
    let width = lines[header].len();
    for line in &lines[header + 2..header + 5] {
        assert_eq!(line.len(), width, "misaligned row: {line}");
    }
}

#[test]
fn test_summary_compact_and_labels() {
    let result = ols("y ~ x1 + x2", &noisy_data()).unwrap();
    let options = fixed_options()
        .with_title("Custom Title")
        .with_response_label("Outcome")
        .with_predictor_labels(["Trend", "Cycle"])
        .with_alpha(0.1)
        .compact(true);
    let flat = normalized(&result.summary(&options).unwrap());

    assert!(flat.starts_with("Custom Title"));
    assert!(flat.contains("Dep. Variable: Outcome"));
    assert!(flat.contains("Intercept"));
    assert!(flat.contains("Trend"));
    assert!(flat.contains("Cycle"));
    assert!(!flat.contains("x1"));
    assert!(flat.contains("[0.05 0.95]"));
    assert!(!flat.contains("Method:"));
    assert!(!flat.contains("Df Residuals:"));
    assert!(!flat.contains("Durbin-Watson"));
    assert!(flat.contains("No. Observations: 100"));
}

#[test]
fn test_summary_interval_headers_for_small_alpha() {
    let result = ols("y ~ x1 + x2", &noisy_data()).unwrap();
    let flat = normalized(&result.summary(&fixed_options().with_alpha(0.0001)).unwrap());

    assert!(flat.contains("[0.00005 0.99995]"), "{flat}");
}

#[test]
fn test_summary_rejects_invalid_options() {
    let result = ols("y ~ x1 + x2", &noisy_data()).unwrap();

    let err = result.summary(&SummaryOptions::default().with_alpha(1.0)).unwrap_err();
    assert!(matches!(err, ModelError::InvalidConfig { .. }));

    let err = result
        .summary(&SummaryOptions::default().with_predictor_labels(["only one"]))
        .unwrap_err();
    assert!(matches!(err, ModelError::InvalidConfig { ref message } if message.contains("1 predictor labels")));

    let all = SummaryOptions::default().with_predictor_labels(["const", "a", "b"]);
    assert!(result.summary(&all).unwrap().contains("const"));
}

#[test]
fn test_display_uses_default_summary() {
    let result = ols("y ~ x1 + x2", &exact_data()).unwrap();
    let text = result.to_string();
    assert!(text.contains("OLS Regression Results"));
    assert!(text.contains("x2"));
}
