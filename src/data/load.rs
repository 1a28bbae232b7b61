//! CSV loading

use crate::{Error, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A CSV file loaded into memory with its header row
///
/// Columns are accessed by name; numeric extraction parses on demand so a
/// label column can stay textual.
#[derive(Debug, Clone)]
pub struct CsvTable {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
}

impl CsvTable {
    /// Read a headered CSV file
    ///
    /// Fails with [`Error::EmptyBatch`] when the file has no data rows.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(BufReader::new(file));

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

        let mut records = Vec::new();
        for record in reader.records() {
            let record = record?;
            records.push(record.iter().map(|f| f.to_string()).collect());
        }

        if records.is_empty() {
            return Err(Error::EmptyBatch);
        }

        Ok(Self { headers, records })
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column names in file order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// A column's raw string values
    pub fn string_column(&self, name: &str) -> Result<Vec<String>> {
        let idx = self.column_index(name)?;
        Ok(self.records.iter().map(|r| r[idx].clone()).collect())
    }

    /// A column parsed as `f32`
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f32>> {
        let idx = self.column_index(name)?;
        self.records
            .iter()
            .map(|r| {
                r[idx].trim().parse::<f32>().map_err(|_| {
                    Error::InvalidParameter(format!(
                        "column {name:?} holds non-numeric value {:?}",
                        r[idx]
                    ))
                })
            })
            .collect()
    }

    /// All columns except `label` parsed into a flattened row-major feature
    /// matrix
    ///
    /// Returns `(features, n_features, feature_names)`.
    pub fn numeric_features_except(&self, label: &str) -> Result<(Vec<f32>, usize, Vec<String>)> {
        // Resolve the label first so a typo surfaces as MissingColumn
        let label_idx = self.column_index(label)?;

        let feature_names: Vec<String> = self
            .headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != label_idx)
            .map(|(_, h)| h.clone())
            .collect();

        if feature_names.is_empty() {
            return Err(Error::InvalidParameter(
                "CSV has no feature columns besides the label".to_string(),
            ));
        }

        let mut features = Vec::with_capacity(self.records.len() * feature_names.len());
        for record in &self.records {
            for (i, field) in record.iter().enumerate() {
                if i == label_idx {
                    continue;
                }
                let value = field.trim().parse::<f32>().map_err(|_| {
                    Error::InvalidParameter(format!(
                        "feature column {:?} holds non-numeric value {:?}",
                        self.headers[i], field
                    ))
                })?;
                features.push(value);
            }
        }

        Ok((features, feature_names.len(), feature_names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_basic() {
        let file = write_csv("x,y\n1.0,2.0\n3.0,4.0\n");
        let table = CsvTable::read(file.path()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.headers(), &["x".to_string(), "y".to_string()]);
        assert_eq!(table.numeric_column("x").unwrap(), vec![1.0, 3.0]);
        assert_eq!(table.numeric_column("y").unwrap(), vec![2.0, 4.0]);
    }

    #[test]
    fn test_read_empty_fails() {
        let file = write_csv("x,y\n");
        let result = CsvTable::read(file.path());
        assert!(matches!(result, Err(Error::EmptyBatch)));
    }

    #[test]
    fn test_missing_column() {
        let file = write_csv("x,y\n1,2\n");
        let table = CsvTable::read(file.path()).unwrap();
        assert!(matches!(
            table.numeric_column("z"),
            Err(Error::MissingColumn(_))
        ));
    }

    #[test]
    fn test_non_numeric_field() {
        let file = write_csv("x,y\n1.0,abc\n");
        let table = CsvTable::read(file.path()).unwrap();
        assert!(matches!(
            table.numeric_column("y"),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_numeric_features_except_label() {
        let file = write_csv("a,b,species\n1,2,setosa\n3,4,virginica\n");
        let table = CsvTable::read(file.path()).unwrap();

        let (features, n_features, names) = table.numeric_features_except("species").unwrap();
        assert_eq!(n_features, 2);
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(features, vec![1.0, 2.0, 3.0, 4.0]);

        let labels = table.string_column("species").unwrap();
        assert_eq!(labels, vec!["setosa".to_string(), "virginica".to_string()]);
    }

    #[test]
    fn test_features_need_label_column_present() {
        let file = write_csv("a,b\n1,2\n");
        let table = CsvTable::read(file.path()).unwrap();
        assert!(matches!(
            table.numeric_features_except("species"),
            Err(Error::MissingColumn(_))
        ));
    }
}
