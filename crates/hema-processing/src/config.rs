//! Configuration types for dataset loading and cleaning.
//!
//! Both configs use the builder pattern and validate on `build()`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default location of the dataset, relative to the working directory.
pub const DEFAULT_PRIMARY_PATH: &str = "Blood Cancer Diseases dataset  - Sheet1.csv";

/// Location tried when the primary path does not exist.
pub const DEFAULT_FALLBACK_PATH: &str = "data/Blood Cancer Diseases dataset  - Sheet1.csv";

/// Label written into categorical cells that have no value to impute from.
pub const DEFAULT_FALLBACK_LABEL: &str = "Unknown";

/// Columns the dataset declares as numeric even when the CSV stores them as text.
pub const DEFAULT_NUMERIC_COLUMNS: [&str; 5] = ["Age", "WBC", "RBC", "Hemoglobin", "Platelets"];

/// Cell contents read as missing.
pub const DEFAULT_NULL_VALUES: [&str; 8] = ["NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "#N/A"];

/// Strategy for imputing missing numeric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NumericImputation {
    /// Use the median of non-null values
    #[default]
    Median,
    /// Use the mean of non-null values
    Mean,
}

impl NumericImputation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Median => "median",
            Self::Mean => "mean",
        }
    }
}

/// Strategy for imputing missing categorical values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CategoricalImputation {
    /// Use the most frequent value, falling back to the label when none exists
    #[default]
    Mode,
    /// Always use the fallback label
    Constant,
}

impl CategoricalImputation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mode => "mode",
            Self::Constant => "constant",
        }
    }
}

/// Options for a single cleaning run.
///
/// Use [`CleaningConfig::builder()`] to create a configuration with the
/// fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use hema_processing::config::{CleaningConfig, NumericImputation};
///
/// let config = CleaningConfig::builder()
///     .numeric_imputation(NumericImputation::Median)
///     .normalize_text(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Whether to remove exact-duplicate rows.
    /// Default: true
    pub remove_duplicates: bool,

    /// Whether to fill missing cells.
    /// Default: true
    pub impute_missing: bool,

    /// Strategy for numeric columns.
    /// Default: Median
    pub numeric_imputation: NumericImputation,

    /// Strategy for categorical columns.
    /// Default: Mode
    pub categorical_imputation: CategoricalImputation,

    /// Whether to trim and title-case categorical values.
    /// Default: true
    pub normalize_text: bool,

    /// Whether to count IQR outliers.
    /// Default: true
    pub flag_outliers: bool,

    /// Multiplier applied to the IQR when computing outlier bounds.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Label used when a categorical column has nothing to impute from.
    /// Default: "Unknown"
    pub fallback_label: String,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            remove_duplicates: true,
            impute_missing: true,
            numeric_imputation: NumericImputation::default(),
            categorical_imputation: CategoricalImputation::default(),
            normalize_text: true,
            flag_outliers: true,
            iqr_multiplier: 1.5,
            fallback_label: DEFAULT_FALLBACK_LABEL.to_string(),
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.iqr_multiplier.is_finite() && self.iqr_multiplier > 0.0) {
            return Err(ConfigValidationError::InvalidIqrMultiplier(
                self.iqr_multiplier,
            ));
        }

        if self.fallback_label.trim().is_empty() {
            return Err(ConfigValidationError::EmptyFallbackLabel);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid IQR multiplier: {0} (must be a positive number)")]
    InvalidIqrMultiplier(f64),

    #[error("Fallback label must not be empty")]
    EmptyFallbackLabel,

    #[error("Dataset path must not be empty")]
    EmptyPath,
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    remove_duplicates: Option<bool>,
    impute_missing: Option<bool>,
    numeric_imputation: Option<NumericImputation>,
    categorical_imputation: Option<CategoricalImputation>,
    normalize_text: Option<bool>,
    flag_outliers: Option<bool>,
    iqr_multiplier: Option<f64>,
    fallback_label: Option<String>,
}

impl CleaningConfigBuilder {
    /// Enable or disable duplicate row removal.
    pub fn remove_duplicates(mut self, remove: bool) -> Self {
        self.remove_duplicates = Some(remove);
        self
    }

    /// Enable or disable missing value imputation.
    pub fn impute_missing(mut self, impute: bool) -> Self {
        self.impute_missing = Some(impute);
        self
    }

    /// Set the numeric imputation strategy.
    pub fn numeric_imputation(mut self, strategy: NumericImputation) -> Self {
        self.numeric_imputation = Some(strategy);
        self
    }

    /// Set the categorical imputation strategy.
    pub fn categorical_imputation(mut self, strategy: CategoricalImputation) -> Self {
        self.categorical_imputation = Some(strategy);
        self
    }

    /// Enable or disable text normalization.
    pub fn normalize_text(mut self, normalize: bool) -> Self {
        self.normalize_text = Some(normalize);
        self
    }

    /// Enable or disable outlier counting.
    pub fn flag_outliers(mut self, flag: bool) -> Self {
        self.flag_outliers = Some(flag);
        self
    }

    /// Set the IQR multiplier used for outlier bounds.
    ///
    /// # Arguments
    /// * `multiplier` - Positive value (1.5 is the conventional Tukey fence)
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the label used when no categorical value can be imputed.
    pub fn fallback_label(mut self, label: impl Into<String>) -> Self {
        self.fallback_label = Some(label.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let config = CleaningConfig {
            remove_duplicates: self.remove_duplicates.unwrap_or(true),
            impute_missing: self.impute_missing.unwrap_or(true),
            numeric_imputation: self.numeric_imputation.unwrap_or_default(),
            categorical_imputation: self.categorical_imputation.unwrap_or_default(),
            normalize_text: self.normalize_text.unwrap_or(true),
            flag_outliers: self.flag_outliers.unwrap_or(true),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(1.5),
            fallback_label: self
                .fallback_label
                .unwrap_or_else(|| DEFAULT_FALLBACK_LABEL.to_string()),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Where and how to read the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path tried first.
    pub primary: PathBuf,

    /// Path tried when `primary` does not exist.
    pub fallback: Option<PathBuf>,

    /// Columns converted to Float64 after reading; unparseable cells become null.
    pub numeric_columns: Vec<String>,

    /// Cell contents treated as missing.
    pub null_values: Vec<String>,

    /// Number of rows sampled for schema inference.
    pub infer_schema_length: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            primary: PathBuf::from(DEFAULT_PRIMARY_PATH),
            fallback: Some(PathBuf::from(DEFAULT_FALLBACK_PATH)),
            numeric_columns: DEFAULT_NUMERIC_COLUMNS.iter().map(|s| s.to_string()).collect(),
            null_values: DEFAULT_NULL_VALUES.iter().map(|s| s.to_string()).collect(),
            infer_schema_length: 1000,
        }
    }
}

impl SourceConfig {
    /// Create a new source configuration builder.
    pub fn builder() -> SourceConfigBuilder {
        SourceConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.primary.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyPath);
        }
        if let Some(fallback) = &self.fallback
            && fallback.as_os_str().is_empty()
        {
            return Err(ConfigValidationError::EmptyPath);
        }
        Ok(())
    }
}

/// Builder for [`SourceConfig`].
#[derive(Debug, Default)]
pub struct SourceConfigBuilder {
    primary: Option<PathBuf>,
    fallback: Option<Option<PathBuf>>,
    numeric_columns: Option<Vec<String>>,
    null_values: Option<Vec<String>>,
    infer_schema_length: Option<usize>,
}

impl SourceConfigBuilder {
    /// Set the primary dataset path.
    pub fn primary(mut self, path: impl Into<PathBuf>) -> Self {
        self.primary = Some(path.into());
        self
    }

    /// Set the fallback dataset path.
    pub fn fallback(mut self, path: impl Into<PathBuf>) -> Self {
        self.fallback = Some(Some(path.into()));
        self
    }

    /// Disable the fallback path.
    pub fn no_fallback(mut self) -> Self {
        self.fallback = Some(None);
        self
    }

    /// Replace the declared numeric columns.
    pub fn numeric_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numeric_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the null tokens.
    pub fn null_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    pub fn build(self) -> Result<SourceConfig, ConfigValidationError> {
        let defaults = SourceConfig::default();
        let config = SourceConfig {
            primary: self.primary.unwrap_or(defaults.primary),
            fallback: self.fallback.unwrap_or(defaults.fallback),
            numeric_columns: self.numeric_columns.unwrap_or(defaults.numeric_columns),
            null_values: self.null_values.unwrap_or(defaults.null_values),
            infer_schema_length: self
                .infer_schema_length
                .unwrap_or(defaults.infer_schema_length),
        };

        config.validate()?;
        Ok(config)
    }
}
