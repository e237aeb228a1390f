use tracity_client::CompletionProviderEnum;
use tracity_core::{CollectionCatalog, DataService};
use tracity_db::DocumentRepository;

/// Shared application state for all handlers.
///
/// Axum clones this per request; every field is cheap to clone
/// (the pool and HTTP clients are reference counted).
#[derive(Clone)]
pub struct AppState {
    /// Read operations over the dataset collections
    pub data_service: DataService<DocumentRepository, CompletionProviderEnum>,

    /// Document repository for direct store checks
    pub repo: DocumentRepository,

    /// Upper bound applied to requested page sizes
    pub max_filter_limit: usize,
}

impl AppState {
    /// Creates a new application state with all services initialized.
    pub fn new(
        pool: sqlx::PgPool,
        provider: CompletionProviderEnum,
        catalog: CollectionCatalog,
        max_filter_limit: usize,
    ) -> Self {
        let repo = DocumentRepository::new(pool);

        Self {
            data_service: DataService::new(repo.clone(), provider, catalog),
            repo,
            max_filter_limit,
        }
    }

    /// Name of the configured completion provider.
    pub fn completion_provider(&self) -> &'static str {
        use tracity_core::traits::CompletionProvider;
        self.data_service.insight_provider().name()
    }
}
