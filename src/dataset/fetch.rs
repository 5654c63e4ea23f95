//! Downloading the canonical iris CSV and rewriting it in our schema.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use super::csv::{parse_row, write_csv};
use super::{DatasetError, IrisRecord, Result};

/// Outcome of a fetch: where the file landed and what it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSummary {
    pub rows: usize,
    pub digest: String,
    pub path: PathBuf,
}

/// Blocking HTTP downloader for the raw dataset.
pub struct DatasetFetcher {
    client: reqwest::blocking::Client,
}

impl DatasetFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("cultivar/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DatasetError::Http(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Download `url`, rewrite the rows under the canonical column names,
    /// and save them to `output` (parent directories are created).
    ///
    /// The source format is scikit-learn's bundled iris CSV: a provenance
    /// header line followed by `<4 floats>,<class>` rows. Only the header
    /// line changes; every data row is carried over unmodified.
    pub fn fetch(&self, url: &str, output: impl AsRef<Path>) -> Result<FetchSummary> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| DatasetError::Http(format!("download failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DatasetError::Status { url: url.to_string(), status: status.as_u16() });
        }

        let body = response
            .text()
            .map_err(|e| DatasetError::Http(format!("failed to read response body: {e}")))?;

        let records = parse_source_csv(&body)?;
        write_output(&records, output)
    }
}

impl std::fmt::Debug for DatasetFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetFetcher").finish_non_exhaustive()
    }
}

/// Parse the upstream CSV. The first line is provenance
/// (`150,4,setosa,versicolor,virginica`), not data, and is discarded.
fn parse_source_csv(content: &str) -> Result<Vec<IrisRecord>> {
    if content.trim().is_empty() {
        return Err(DatasetError::EmptyFile);
    }

    let mut records = Vec::new();
    for (idx, line) in content.lines().enumerate().skip(1) {
        records.push(parse_row(line, idx + 1)?);
    }

    if records.is_empty() {
        return Err(DatasetError::NoDataRows);
    }
    Ok(records)
}

fn write_output(records: &[IrisRecord], output: impl AsRef<Path>) -> Result<FetchSummary> {
    let output = output.as_ref();
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    write_csv(output, records)?;

    let bytes = std::fs::read(output)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = format!("sha256:{:x}", hasher.finalize());

    Ok(FetchSummary { rows: records.len(), digest, path: output.to_path_buf() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::read_csv;
    use tempfile::tempdir;

    const SOURCE: &str = "150,4,setosa,versicolor,virginica\n\
                          5.1,3.5,1.4,0.2,0\n\
                          7.0,3.2,4.7,1.4,1\n\
                          6.3,3.3,6.0,2.5,2\n";

    #[test]
    fn test_parse_source_skips_provenance_header() {
        let records = parse_source_csv(SOURCE).expect("parse should succeed");
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].features.sepal_length, 5.1);
        assert_eq!(records[0].target, 0);
        assert_eq!(records[2].target, 2);
    }

    #[test]
    fn test_parse_source_empty_body_is_an_error() {
        assert!(matches!(parse_source_csv(""), Err(DatasetError::EmptyFile)));
    }

    #[test]
    fn test_parse_source_header_only_is_an_error() {
        let result = parse_source_csv("150,4,setosa,versicolor,virginica\n");
        assert!(matches!(result, Err(DatasetError::NoDataRows)));
    }

    #[test]
    fn test_parse_source_malformed_row_names_the_line() {
        let body = "150,4,setosa,versicolor,virginica\n5.1,3.5,1.4,0.2,0\nbroken\n";
        assert!(matches!(
            parse_source_csv(body),
            Err(DatasetError::ColumnCount { line: 3, found: 1 })
        ));
    }

    #[test]
    fn test_write_output_creates_parent_directories() {
        let dir = tempdir().expect("temp dir creation should succeed");
        let path = dir.path().join("data").join("raw").join("iris.csv");

        let records = parse_source_csv(SOURCE).expect("parse should succeed");
        let summary = write_output(&records, &path).expect("write should succeed");

        assert_eq!(summary.rows, 3);
        assert_eq!(summary.path, path);
        assert!(summary.digest.starts_with("sha256:"));
        assert_eq!(summary.digest.len(), "sha256:".len() + 64);
    }

    #[test]
    fn test_written_output_reads_back_in_canonical_schema() {
        let dir = tempdir().expect("temp dir creation should succeed");
        let path = dir.path().join("iris.csv");

        let records = parse_source_csv(SOURCE).expect("parse should succeed");
        write_output(&records, &path).expect("write should succeed");

        let loaded = read_csv(&path).expect("read should succeed");
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_digest_is_stable_for_identical_content() {
        let dir = tempdir().expect("temp dir creation should succeed");
        let records = parse_source_csv(SOURCE).expect("parse should succeed");

        let first = write_output(&records, dir.path().join("a.csv")).expect("write should succeed");
        let second =
            write_output(&records, dir.path().join("b.csv")).expect("write should succeed");
        assert_eq!(first.digest, second.digest);
    }

    #[test]
    fn test_fetch_rejects_malformed_url() {
        let dir = tempdir().expect("temp dir creation should succeed");
        let fetcher = DatasetFetcher::new().expect("client build should succeed");

        let result = fetcher.fetch("not a url", dir.path().join("iris.csv"));
        assert!(matches!(result, Err(DatasetError::Http(_))));
    }
}
