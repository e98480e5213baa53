//! Precomputed similarity index
//!
//! Holds the movie catalog together with the square matrix of pairwise
//! similarity scores. Both are loaded once at startup and never mutated, so
//! the index is shared across requests behind an `Arc` without locking.

use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{DataLoadError, IndexOutOfRange};

pub mod catalog;

pub use catalog::Catalog;

pub(crate) use catalog::CatalogFile;

/// A neighboring catalog entry and its similarity score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub score: f32,
}

/// Square matrix of similarity scores, `rows[i][j]` is the similarity of i to j
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct SimilarityMatrix {
    rows: Vec<Vec<f32>>,
}

impl SimilarityMatrix {
    /// Builds a matrix, rejecting ragged or non-square input
    pub fn new(rows: Vec<Vec<f32>>) -> Result<Self, DataLoadError> {
        let matrix = Self { rows };
        matrix.check_square()?;
        Ok(matrix)
    }

    pub(crate) fn check_square(&self) -> Result<(), DataLoadError> {
        let expected = self.rows.len();
        for (row, values) in self.rows.iter().enumerate() {
            if values.len() != expected {
                return Err(DataLoadError::NotSquare {
                    row,
                    expected,
                    found: values.len(),
                });
            }
        }
        Ok(())
    }

    pub fn dimension(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        self.rows.get(index).map(Vec::as_slice)
    }
}

/// Catalog plus matrix with matching dimensions
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    catalog: Catalog,
    matrix: SimilarityMatrix,
}

impl SimilarityIndex {
    /// Pairs a catalog with a matrix of the same dimension
    pub fn new(catalog: Catalog, matrix: SimilarityMatrix) -> Result<Self, DataLoadError> {
        if catalog.len() != matrix.dimension() {
            return Err(DataLoadError::DimensionMismatch {
                catalog: catalog.len(),
                matrix: matrix.dimension(),
            });
        }

        Ok(Self { catalog, matrix })
    }

    /// Deserializes the catalog and matrix from local JSON files
    pub fn load(catalog_path: &Path, matrix_path: &Path) -> Result<Self, DataLoadError> {
        let catalog_file: CatalogFile = read_json(catalog_path)?;
        let catalog = catalog_file.into_catalog().map_err(|reason| {
            DataLoadError::Malformed {
                path: catalog_path.to_path_buf(),
                source: serde::de::Error::custom(reason),
            }
        })?;

        let matrix: SimilarityMatrix = read_json(matrix_path)?;
        matrix.check_square()?;

        let index = Self::new(catalog, matrix)?;

        tracing::info!(
            movies = index.len(),
            catalog = %catalog_path.display(),
            matrix = %matrix_path.display(),
            "Similarity index loaded"
        );

        Ok(index)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Returns the `k` entries most similar to `index`, excluding `index` itself
    ///
    /// Scores are sorted in descending order; equal scores keep ascending
    /// column order so results are deterministic.
    pub fn top_k(&self, index: usize, k: usize) -> Result<Vec<Neighbor>, IndexOutOfRange> {
        let row = self.matrix.row(index).ok_or(IndexOutOfRange {
            index,
            len: self.len(),
        })?;

        let mut scored: Vec<Neighbor> = row
            .iter()
            .enumerate()
            .map(|(column, &score)| Neighbor {
                index: column,
                score,
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));

        Ok(scored
            .into_iter()
            .filter(|neighbor| neighbor.index != index)
            .take(k)
            .collect())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => DataLoadError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    serde_json::from_str(&contents).map_err(|e| DataLoadError::Malformed {
        path: path.to_path_buf(),
        source: e,
    })
}
