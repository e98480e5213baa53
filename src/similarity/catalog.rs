use serde::Deserialize;
use std::collections::BTreeMap;

use crate::models::{Movie, MovieId};

/// Ordered list of known movies
///
/// Positions match the rows of the similarity matrix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    movies: Vec<Movie>,
}

impl Catalog {
    /// Builds a catalog from `(id, title)` pairs, assigning positions in order
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (MovieId, S)>,
        S: Into<String>,
    {
        let movies = entries
            .into_iter()
            .enumerate()
            .map(|(index, (id, title))| Movie {
                id,
                title: title.into(),
                index,
            })
            .collect();

        Self { movies }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Movie> {
        self.movies.get(index)
    }

    /// Exact title match, first match wins
    pub fn position(&self, title: &str) -> Option<usize> {
        self.movies.iter().position(|movie| movie.title == title)
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.movies.iter().map(|movie| movie.title.as_str())
    }
}

/// On-disk catalog representations
///
/// Accepts either a list of records or the column-oriented dictionary a
/// dataframe export produces, where each column maps row keys to values.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CatalogFile {
    Records(Vec<CatalogRecord>),
    Columns {
        movie_id: BTreeMap<String, MovieId>,
        title: BTreeMap<String, String>,
    },
}

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogRecord {
    #[serde(alias = "id")]
    movie_id: MovieId,
    title: String,
}

impl CatalogFile {
    /// Converts the file into a catalog, or describes why the columns disagree
    pub(crate) fn into_catalog(self) -> Result<Catalog, String> {
        match self {
            CatalogFile::Records(records) => Ok(Catalog::new(
                records.into_iter().map(|r| (r.movie_id, r.title)),
            )),
            CatalogFile::Columns { movie_id, title } => {
                let mut rows = Vec::with_capacity(title.len());
                for (key, name) in title {
                    let row: usize = key
                        .parse()
                        .map_err(|_| format!("row key '{}' is not a number", key))?;
                    let id = movie_id
                        .get(&key)
                        .copied()
                        .ok_or_else(|| format!("row '{}' has a title but no movie_id", key))?;
                    rows.push((row, id, name));
                }

                if rows.len() != movie_id.len() {
                    return Err(format!(
                        "column lengths differ: {} movie_id values, {} titles",
                        movie_id.len(),
                        rows.len()
                    ));
                }

                // BTreeMap orders keys as strings ("10" < "2")
                rows.sort_by_key(|(row, _, _)| *row);
                Ok(Catalog::new(rows.into_iter().map(|(_, id, name)| (id, name))))
            }
        }
    }
}
