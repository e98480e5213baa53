use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDb API key. Missing or empty disables metadata enrichment.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Remote blob ID of the serialized movie catalog
    #[serde(default)]
    pub movies_file_id: Option<String>,

    /// Remote blob ID of the serialized similarity matrix
    #[serde(default)]
    pub similarity_file_id: Option<String>,

    /// Local path of the movie catalog
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Local path of the similarity matrix
    #[serde(default = "default_similarity_path")]
    pub similarity_path: PathBuf,

    /// TMDb API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// TMDb image base URL, the size variant is appended per request
    #[serde(default = "default_tmdb_image_base_url")]
    pub tmdb_image_base_url: String,

    /// Timeout applied to each metadata request
    #[serde(default = "default_metadata_timeout_secs")]
    pub metadata_timeout_secs: u64,

    /// Timeout applied to each data file download
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,

    /// Download endpoint for data files referenced by file ID
    #[serde(default = "default_blob_base_url")]
    pub blob_base_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("movie_dict.json")
}

fn default_similarity_path() -> PathBuf {
    PathBuf::from("similarity.json")
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_metadata_timeout_secs() -> u64 {
    5
}

fn default_download_timeout_secs() -> u64 {
    300
}

fn default_blob_base_url() -> String {
    "https://drive.google.com/uc".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_iter(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_iter<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Returns the API key, treating blank values as absent
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_iter(Vec::new()).unwrap();
        assert_eq!(config.api_key(), None);
        assert_eq!(config.catalog_path, PathBuf::from("movie_dict.json"));
        assert_eq!(config.similarity_path, PathBuf::from("similarity.json"));
        assert_eq!(config.metadata_timeout(), Duration::from_secs(5));
        assert_eq!(config.download_timeout(), Duration::from_secs(300));
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_named_options() {
        let config = Config::from_iter(vars(&[
            ("API_KEY", "secret"),
            ("MOVIES_FILE_ID", "movies-blob"),
            ("SIMILARITY_FILE_ID", "similarity-blob"),
            ("PORT", "8080"),
        ]))
        .unwrap();

        assert_eq!(config.api_key(), Some("secret"));
        assert_eq!(config.movies_file_id.as_deref(), Some("movies-blob"));
        assert_eq!(config.similarity_file_id.as_deref(), Some("similarity-blob"));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let config = Config::from_iter(vars(&[("API_KEY", "  ")])).unwrap();
        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn test_invalid_port_is_error() {
        tokio_test::assert_err!(Config::from_iter(vars(&[("PORT", "not-a-port")])));
    }
}
