//! Labeled URL Dataset
//!
//! In-memory table of (url, label, features) rows with CSV persistence.
//! The on-disk layout is `url,is_phishing,<feature columns>` with the
//! feature columns in canonical [`FEATURE_NAMES`] order. Reading resolves
//! feature columns by header name, so column order in foreign files does
//! not matter as long as every canonical column is present.

use std::fs;
use std::path::Path;

use crate::error::{DetectorError, Result};
use crate::features::{self, FeatureSchema, UrlFeatures, FEATURE_NAMES};

/// A single labeled training sample.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSample {
    pub url: String,
    pub is_phishing: bool,
    pub features: UrlFeatures,
}

/// Labeled dataset with CSV persistence.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    samples: Vec<LabeledSample>,
}

impl Dataset {
    /// Build a dataset from (url, label) pairs, extracting features for
    /// each URL.
    pub fn from_labeled_urls(pairs: Vec<(String, bool)>) -> Self {
        let samples = pairs
            .into_iter()
            .map(|(url, is_phishing)| {
                let features = features::extract(&url);
                LabeledSample {
                    url,
                    is_phishing,
                    features,
                }
            })
            .collect();
        Self { samples }
    }

    pub fn samples(&self) -> &[LabeledSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of phishing-labeled samples.
    pub fn phishing_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_phishing).count()
    }

    /// Feature matrix in schema order plus the label column.
    pub fn matrix(&self, schema: &FeatureSchema) -> (Vec<Vec<f64>>, Vec<u8>) {
        let rows = self
            .samples
            .iter()
            .map(|s| schema.project(&s.features))
            .collect();
        let labels = self
            .samples
            .iter()
            .map(|s| u8::from(s.is_phishing))
            .collect();
        (rows, labels)
    }

    /// Write the dataset as CSV.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut out = String::new();
        out.push_str("url,is_phishing,");
        out.push_str(&FEATURE_NAMES.join(","));
        out.push('\n');

        for sample in &self.samples {
            out.push_str(&csv_escape(&sample.url));
            out.push(',');
            out.push(if sample.is_phishing { '1' } else { '0' });
            for (_, value) in sample.features.named() {
                out.push(',');
                out.push_str(&value.to_string());
            }
            out.push('\n');
        }

        fs::write(path, out).map_err(|source| DetectorError::DatasetIo {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a dataset from CSV, resolving feature columns by header name.
    pub fn read_csv(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| DetectorError::DatasetIo {
            path: path.to_path_buf(),
            source,
        })?;

        let mut lines = raw.lines().enumerate();
        let (_, header) = lines.next().ok_or(DetectorError::DatasetParse {
            line: 1,
            message: "file is empty".to_string(),
        })?;
        let columns = split_csv_line(header);
        let column_index = |name: &str| -> Result<usize> {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| DetectorError::DatasetParse {
                    line: 1,
                    message: format!("missing column `{name}`"),
                })
        };

        let url_col = column_index("url")?;
        let label_col = column_index("is_phishing")?;
        let mut feature_cols = [0usize; 10];
        for (slot, name) in feature_cols.iter_mut().zip(FEATURE_NAMES) {
            *slot = column_index(name)?;
        }

        let mut samples = Vec::new();
        for (idx, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            let line_no = idx + 1;
            let fields = split_csv_line(line);
            if fields.len() != columns.len() {
                return Err(DetectorError::DatasetParse {
                    line: line_no,
                    message: format!(
                        "expected {} fields, found {}",
                        columns.len(),
                        fields.len()
                    ),
                });
            }

            let numeric = |col: usize| -> Result<u32> {
                let field = &fields[col];
                field
                    .parse::<f64>()
                    .map(|v| v as u32)
                    .map_err(|_| DetectorError::DatasetParse {
                        line: line_no,
                        message: format!("`{field}` is not numeric"),
                    })
            };

            let is_phishing = match fields[label_col].trim() {
                "0" | "false" | "False" => false,
                "1" | "true" | "True" => true,
                other => {
                    return Err(DetectorError::DatasetParse {
                        line: line_no,
                        message: format!("`{other}` is not a 0/1 label"),
                    })
                }
            };

            samples.push(LabeledSample {
                url: fields[url_col].clone(),
                is_phishing,
                features: UrlFeatures {
                    url_length: numeric(feature_cols[0])?,
                    has_ip_address: numeric(feature_cols[1])?,
                    has_at_symbol: numeric(feature_cols[2])?,
                    has_double_slash_redirect: numeric(feature_cols[3])?,
                    has_dash_in_domain: numeric(feature_cols[4])?,
                    has_multiple_subdomains: numeric(feature_cols[5])?,
                    uses_https: numeric(feature_cols[6])?,
                    domain_registration_length: numeric(feature_cols[7])?,
                    has_suspicious_words: numeric(feature_cols[8])?,
                    url_shortening_service: numeric(feature_cols[9])?,
                },
            });
        }

        Ok(Self { samples })
    }
}

/// Quote a field when it contains a comma, quote, or line break.
pub fn csv_escape(input: &str) -> String {
    if input.contains(',') || input.contains('"') || input.contains('\n') || input.contains('\r') {
        format!("\"{}\"", input.replace('"', "\"\""))
    } else {
        input.to_string()
    }
}

/// Split one CSV line into fields, honoring double-quoted fields with
/// doubled-quote escapes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
            }
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_fields_with_separators() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn splits_quoted_fields() {
        assert_eq!(split_csv_line("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_csv_line("\"a,b\",c"), vec!["a,b", "c"]);
        assert_eq!(split_csv_line("\"say \"\"hi\"\"\",x"), vec!["say \"hi\"", "x"]);
    }

    #[test]
    fn matrix_follows_schema_order() {
        let data = Dataset::from_labeled_urls(vec![
            ("https://www.google.com".to_string(), false),
            ("http://192.168.1.1/login.php".to_string(), true),
        ]);
        let (rows, labels) = data.matrix(&FeatureSchema::canonical());
        assert_eq!(rows.len(), 2);
        assert_eq!(labels, vec![0, 1]);
        // has_ip_address is column 1
        assert_eq!(rows[0][1], 0.0);
        assert_eq!(rows[1][1], 1.0);
    }
}
