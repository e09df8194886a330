use std::sync::Arc;

use bookmirror_core::{
    BestsellerScraper, CatalogStore, CategoryCrawler, Config, NavigationSync, ProductEnricher,
    SanitizedConfig,
};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn CatalogStore>,
    navigation: Arc<NavigationSync>,
    crawler: Arc<CategoryCrawler>,
    bestsellers: Arc<BestsellerScraper>,
    enricher: Arc<ProductEnricher>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn CatalogStore>,
        navigation: Arc<NavigationSync>,
        crawler: Arc<CategoryCrawler>,
        bestsellers: Arc<BestsellerScraper>,
        enricher: Arc<ProductEnricher>,
    ) -> Self {
        Self {
            config,
            store,
            navigation,
            crawler,
            bestsellers,
            enricher,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn store(&self) -> &dyn CatalogStore {
        self.store.as_ref()
    }

    pub fn navigation(&self) -> &NavigationSync {
        self.navigation.as_ref()
    }

    pub fn crawler(&self) -> &CategoryCrawler {
        self.crawler.as_ref()
    }

    pub fn bestsellers(&self) -> &BestsellerScraper {
        self.bestsellers.as_ref()
    }

    pub fn enricher(&self) -> &ProductEnricher {
        self.enricher.as_ref()
    }
}
