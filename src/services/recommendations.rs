use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{MovieMetadata, Recommendation},
    services::providers::{fallback_metadata, FetchError, MetadataProvider},
    similarity::{Neighbor, SimilarityIndex},
};

/// Number of recommendations returned per request
pub const RECOMMENDATION_COUNT: usize = 5;

/// Turns a selected title into ranked, display-ready recommendations
///
/// Built once at startup from the loaded similarity index and an optional
/// metadata provider, then shared read-only by every request.
pub struct RecommendationService {
    index: Arc<SimilarityIndex>,
    provider: Option<Arc<dyn MetadataProvider>>,
}

impl RecommendationService {
    pub fn new(index: Arc<SimilarityIndex>, provider: Option<Arc<dyn MetadataProvider>>) -> Self {
        Self { index, provider }
    }

    pub fn metadata_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// All catalog titles, in catalog order
    pub fn titles(&self) -> Vec<String> {
        self.index.catalog().titles().map(str::to_string).collect()
    }

    /// Recommends the movies most similar to `title`
    ///
    /// The title must match a catalog entry exactly. Metadata failures never
    /// fail the call; affected entries carry the placeholder poster and the
    /// default rating instead.
    pub async fn recommend(&self, title: &str) -> AppResult<Vec<Recommendation>> {
        let position = self
            .index
            .catalog()
            .position(title)
            .ok_or_else(|| AppError::TitleNotFound(title.to_string()))?;

        let neighbors = self.index.top_k(position, RECOMMENDATION_COUNT)?;

        tracing::info!(
            title = %title,
            index = position,
            neighbors = neighbors.len(),
            "Resolved similar movies"
        );

        self.enrich(neighbors).await
    }

    /// Fetches metadata for every neighbor concurrently and keeps rank order
    async fn enrich(&self, neighbors: Vec<Neighbor>) -> AppResult<Vec<Recommendation>> {
        let mut entries = Vec::with_capacity(neighbors.len());
        for neighbor in neighbors {
            let movie = self.index.catalog().get(neighbor.index).ok_or_else(|| {
                AppError::Internal(format!("No catalog entry at index {}", neighbor.index))
            })?;
            entries.push((movie.clone(), neighbor.score));
        }

        let tasks: Vec<_> = entries
            .iter()
            .map(|(movie, _)| {
                self.provider.clone().map(|provider| {
                    let title = movie.title.clone();
                    tokio::spawn(async move { provider.fetch(&title).await })
                })
            })
            .collect();

        let mut recommendations = Vec::with_capacity(entries.len());
        let mut degraded = 0;
        for ((movie, score), task) in entries.into_iter().zip(tasks) {
            let fetched = match task {
                Some(handle) => match handle.await {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            title = %movie.title,
                            "Metadata task join error"
                        );
                        Err(FetchError::Task(e))
                    }
                },
                None => Err(FetchError::NoResults(movie.title.clone())),
            };

            if fetched.is_err() {
                degraded += 1;
            }
            let metadata = self.resolve_metadata(&movie.title, fetched);

            recommendations.push(Recommendation {
                movie_id: movie.id,
                title: movie.title,
                poster_url: metadata.poster_url,
                rating: format!("{:.1}", metadata.rating),
                score,
            });
        }

        if degraded > 0 {
            tracing::warn!(
                degraded,
                total = recommendations.len(),
                "Some recommendations use placeholder metadata"
            );
        }

        Ok(recommendations)
    }

    /// Applies the placeholder fallback to a failed fetch
    fn resolve_metadata(
        &self,
        title: &str,
        fetched: Result<MovieMetadata, FetchError>,
    ) -> MovieMetadata {
        match fetched {
            Ok(metadata) => metadata,
            Err(e) => {
                if self.provider.is_some() {
                    tracing::warn!(
                        title = %title,
                        error = %e,
                        timeout = e.is_timeout(),
                        "Metadata fetch degraded, using placeholder"
                    );
                }
                fallback_metadata(title)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::{MockMetadataProvider, DEFAULT_RATING};
    use crate::similarity::{Catalog, SimilarityMatrix};
    use mockall::predicate::eq;

    fn sample_index() -> Arc<SimilarityIndex> {
        let catalog = Catalog::new([(1, "Avatar"), (2, "Titanic"), (3, "Inception")]);
        let matrix = SimilarityMatrix::new(vec![
            vec![1.0, 0.8, 0.3],
            vec![0.8, 1.0, 0.5],
            vec![0.3, 0.5, 1.0],
        ])
        .unwrap();
        Arc::new(SimilarityIndex::new(catalog, matrix).unwrap())
    }

    /// Eight movies where movie i is most similar to its closest neighbors by position
    fn larger_index() -> Arc<SimilarityIndex> {
        let titles = [
            "Alien",
            "Aliens",
            "Heat",
            "Ronin",
            "Se7en",
            "Zodiac",
            "Arrival",
            "Avatar",
        ];
        let catalog = Catalog::new(titles.iter().enumerate().map(|(i, t)| (i as u64 + 1, *t)));
        let rows = (0..8)
            .map(|i: i32| {
                (0..8)
                    .map(|j: i32| 1.0 - ((i - j).abs() as f32) / 10.0)
                    .collect()
            })
            .collect();
        let matrix = SimilarityMatrix::new(rows).unwrap();
        Arc::new(SimilarityIndex::new(catalog, matrix).unwrap())
    }

    fn metadata(poster: &str, rating: f32) -> MovieMetadata {
        MovieMetadata {
            poster_url: poster.to_string(),
            rating,
        }
    }

    #[tokio::test]
    async fn test_recommend_scenario() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch()
            .with(eq("Titanic"))
            .returning(|_| Ok(metadata("https://img/titanic.jpg", 7.9)));
        provider
            .expect_fetch()
            .with(eq("Inception"))
            .returning(|_| Ok(metadata("https://img/inception.jpg", 8.37)));

        let service = RecommendationService::new(sample_index(), Some(Arc::new(provider)));
        let recommendations = service.recommend("Avatar").await.unwrap();

        assert_eq!(recommendations.len(), 2);
        assert_eq!(recommendations[0].title, "Titanic");
        assert_eq!(recommendations[0].movie_id, 2);
        assert_eq!(recommendations[0].poster_url, "https://img/titanic.jpg");
        assert_eq!(recommendations[0].rating, "7.9");
        assert_eq!(recommendations[0].score, 0.8);
        assert_eq!(recommendations[1].title, "Inception");
        assert_eq!(recommendations[1].rating, "8.4");
    }

    #[tokio::test]
    async fn test_recommend_matches_top_k_order() {
        let index = larger_index();
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch()
            .times(RECOMMENDATION_COUNT)
            .returning(|title| Ok(metadata(&format!("https://img/{}.jpg", title), 8.0)));

        let service = RecommendationService::new(index.clone(), Some(Arc::new(provider)));
        let recommendations = service.recommend("Ronin").await.unwrap();

        let expected: Vec<String> = index
            .top_k(3, RECOMMENDATION_COUNT)
            .unwrap()
            .iter()
            .map(|n| index.catalog().get(n.index).unwrap().title.clone())
            .collect();
        let actual: Vec<String> = recommendations.iter().map(|r| r.title.clone()).collect();

        assert_eq!(actual.len(), RECOMMENDATION_COUNT);
        assert_eq!(actual, expected);
        assert!(!actual.contains(&"Ronin".to_string()));
    }

    #[tokio::test]
    async fn test_recommend_unknown_title() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_fetch().never();

        let service = RecommendationService::new(sample_index(), Some(Arc::new(provider)));
        let result = service.recommend("Unknown Movie").await;

        assert!(matches!(result, Err(AppError::TitleNotFound(t)) if t == "Unknown Movie"));
    }

    #[tokio::test]
    async fn test_single_provider_failure_only_degrades_that_entry() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch()
            .with(eq("Heat"))
            .returning(|title| Err(FetchError::NoResults(title.to_string())));
        provider
            .expect_fetch()
            .returning(|title| Ok(metadata(&format!("https://img/{}.jpg", title), 8.5)));

        let service = RecommendationService::new(larger_index(), Some(Arc::new(provider)));
        let recommendations = service.recommend("Ronin").await.unwrap();

        assert_eq!(recommendations.len(), RECOMMENDATION_COUNT);
        for recommendation in &recommendations {
            if recommendation.title == "Heat" {
                assert!(!recommendation.poster_url.is_empty());
                assert_eq!(
                    recommendation.poster_url,
                    fallback_metadata("Heat").poster_url
                );
                assert_eq!(recommendation.rating, "7.0");
            } else {
                assert_eq!(
                    recommendation.poster_url,
                    format!("https://img/{}.jpg", recommendation.title)
                );
                assert_eq!(recommendation.rating, "8.5");
            }
        }
        assert!(recommendations.iter().any(|r| r.title == "Heat"));
    }

    #[tokio::test]
    async fn test_all_failures_still_return_full_list() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch()
            .returning(|_| Err(FetchError::Status(503)));

        let service = RecommendationService::new(larger_index(), Some(Arc::new(provider)));
        let recommendations = service.recommend("Alien").await.unwrap();

        assert_eq!(recommendations.len(), RECOMMENDATION_COUNT);
        assert!(recommendations.iter().all(|r| r.rating == "7.0"));
        assert!(recommendations.iter().all(|r| !r.poster_url.is_empty()));
    }

    #[tokio::test]
    async fn test_without_provider_uses_fallback() {
        let service = RecommendationService::new(sample_index(), None);
        assert!(!service.metadata_enabled());

        let recommendations = service.recommend("Titanic").await.unwrap();
        let titles: Vec<_> = recommendations.iter().map(|r| r.title.as_str()).collect();

        assert_eq!(titles, vec!["Avatar", "Inception"]);
        assert!(recommendations
            .iter()
            .all(|r| r.rating == format!("{:.1}", DEFAULT_RATING)));
    }

    /// Provider whose task panics for one title
    struct PanickingProvider {
        panics_on: &'static str,
    }

    #[async_trait::async_trait]
    impl MetadataProvider for PanickingProvider {
        async fn fetch(&self, title: &str) -> Result<MovieMetadata, FetchError> {
            if title == self.panics_on {
                panic!("provider crashed on {}", title);
            }
            Ok(metadata(&format!("https://img/{}.jpg", title), 8.0))
        }

        fn name(&self) -> &'static str {
            "panicking"
        }
    }

    #[tokio::test]
    async fn test_panicked_fetch_task_falls_back() {
        let provider = PanickingProvider { panics_on: "Inception" };
        let service = RecommendationService::new(sample_index(), Some(Arc::new(provider)));

        let recommendations = service.recommend("Avatar").await.unwrap();

        assert_eq!(recommendations.len(), 2);
        assert_eq!(recommendations[0].poster_url, "https://img/Titanic.jpg");
        assert_eq!(
            recommendations[1].poster_url,
            fallback_metadata("Inception").poster_url
        );
        assert_eq!(recommendations[1].rating, "7.0");
    }

    #[tokio::test]
    async fn test_join_error_is_task_failure() {
        let join_error = tokio::spawn(async { panic!("boom") }).await.unwrap_err();
        let error = FetchError::from(join_error);

        assert!(matches!(error, FetchError::Task(_)));
        assert!(error.to_string().starts_with("Metadata task failed"));
        assert!(!error.is_timeout());
    }

    #[test]
    fn test_titles_in_catalog_order() {
        let service = RecommendationService::new(sample_index(), None);
        assert_eq!(service.titles(), vec!["Avatar", "Titanic", "Inception"]);
    }
}
