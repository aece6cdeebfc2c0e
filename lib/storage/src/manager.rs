use crate::store::IndexStore;
use assessmatch_core::{
    load_catalog, Corpus, Error, Recommender, RecommendationRecord, Result, TfidfConfig,
};
use parking_lot::{Mutex, RwLock};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_CATALOG_PATH: &str = "assessments.csv";
pub const DEFAULT_INDEX_PATH: &str = "assessment_index.bin";

/// Where the catalog and the index artifact live, and how to fit.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub catalog_path: PathBuf,
    pub index_path: PathBuf,
    pub tfidf: TfidfConfig,
    /// Ignore any artifact on disk and fit from the catalog.
    pub force_rebuild: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            index_path: PathBuf::from(DEFAULT_INDEX_PATH),
            tfidf: TfidfConfig::default(),
            force_rebuild: false,
        }
    }
}

/// Owns the current index generation.
///
/// Readers take a cheap `Arc` clone of the current [`Recommender`] and query
/// it without further locking. Builds are serialized by `build_lock`; a
/// finished build replaces the handle wholesale.
pub struct IndexManager {
    config: StorageConfig,
    store: IndexStore,
    current: RwLock<Option<Arc<Recommender>>>,
    build_lock: Mutex<()>,
}

impl IndexManager {
    /// Create a manager with nothing loaded yet.
    pub fn new(config: StorageConfig) -> Self {
        let store = IndexStore::new(&config.index_path);
        Self {
            config,
            store,
            current: RwLock::new(None),
            build_lock: Mutex::new(()),
        }
    }

    /// Create a manager and bring an index generation online.
    pub fn open(config: StorageConfig) -> Result<Self> {
        let manager = Self::new(config);
        manager.initialize()?;
        Ok(manager)
    }

    /// Load the artifact if it is present and usable, otherwise fit from the
    /// catalog and persist the result before first use.
    pub fn initialize(&self) -> Result<Arc<Recommender>> {
        if self.config.force_rebuild {
            info!("Rebuild requested, ignoring {:?}", self.store.path());
            return self.rebuild();
        }

        match self.store.load().and_then(Recommender::from_index) {
            Ok(recommender) if recommender.index().model.config() != &self.config.tfidf => {
                info!("Index at {:?} was fitted with a different configuration, rebuilding", self.store.path());
                self.rebuild()
            }
            Ok(recommender) => {
                info!(
                    "Loaded index generation built {} ({} assessments)",
                    recommender.index().built_at,
                    recommender.index().len()
                );
                Ok(self.install(recommender))
            }
            Err(Error::IndexNotFound(path)) => {
                info!("No index at {:?}, building from catalog", path);
                self.rebuild()
            }
            Err(e) if e.requires_rebuild() => {
                warn!("Discarding unusable index: {}", e);
                self.rebuild()
            }
            Err(e) => Err(e),
        }
    }

    /// Fit a new generation from the catalog file and persist it.
    pub fn rebuild(&self) -> Result<Arc<Recommender>> {
        let _guard = self.build_lock.lock();
        let corpus = load_catalog(&self.config.catalog_path)?;
        self.build_locked(corpus)
    }

    /// Fit a new generation from an in-memory corpus and persist it.
    pub fn rebuild_from_corpus(&self, corpus: Corpus) -> Result<Arc<Recommender>> {
        let _guard = self.build_lock.lock();
        self.build_locked(corpus)
    }

    fn build_locked(&self, corpus: Corpus) -> Result<Arc<Recommender>> {
        let recommender = Recommender::fit(corpus, self.config.tfidf.clone())?;
        self.store.save(recommender.index())?;
        Ok(self.install(recommender))
    }

    fn install(&self, recommender: Recommender) -> Arc<Recommender> {
        let recommender = Arc::new(recommender);
        *self.current.write() = Some(recommender.clone());
        recommender
    }

    /// Current generation, if one is loaded.
    pub fn recommender(&self) -> Option<Arc<Recommender>> {
        self.current.read().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    pub fn recommend(&self, job_description: &str, top_n: Option<usize>) -> Result<Vec<RecommendationRecord>> {
        let recommender = self.recommender().ok_or(Error::NotInitialized)?;
        recommender.recommend(job_description, top_n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assessmatch_core::PersistedIndex;
    use std::path::Path;

    const CATALOG: &str = "\
Assessment Name,URL,Duration,Remote Testing,Adaptive Support,Job Level
Verify Numerical Reasoning,https://example.com/num,24 minutes,Yes,No,Entry
Verify Verbal Reasoning,https://example.com/verbal,20 minutes,No,No,Entry
Java 8 (New),https://example.com/java,18 minutes,Yes,Yes,Professional
";

    fn config(dir: &Path) -> StorageConfig {
        let catalog_path = dir.join("catalog.csv");
        std::fs::write(&catalog_path, CATALOG).unwrap();
        StorageConfig {
            catalog_path,
            index_path: dir.join("index.bin"),
            ..Default::default()
        }
    }

    #[test]
    fn test_recommend_before_initialize() {
        let dir = tempfile::tempdir().unwrap();
        let manager = IndexManager::new(config(dir.path()));
        assert!(!manager.is_loaded());
        assert!(matches!(
            manager.recommend("numerical", None),
            Err(Error::NotInitialized)
        ));
    }

    #[test]
    fn test_open_builds_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let manager = IndexManager::open(config(dir.path())).unwrap();
        assert!(manager.is_loaded());
        assert!(manager.store().exists());

        let results = manager.recommend("java developer", None).unwrap();
        assert_eq!(results[0].title, "Java 8 (New)");
    }

    #[test]
    fn test_open_reuses_existing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let first = IndexManager::open(config(dir.path())).unwrap();
        let built_at = first.recommender().unwrap().index().built_at;

        // Catalog removed: a second open must come from the artifact.
        std::fs::remove_file(dir.path().join("catalog.csv")).unwrap();
        let cfg = StorageConfig {
            catalog_path: dir.path().join("catalog.csv"),
            index_path: dir.path().join("index.bin"),
            ..Default::default()
        };
        let second = IndexManager::open(cfg).unwrap();
        assert_eq!(second.recommender().unwrap().index().built_at, built_at);
    }

    #[test]
    fn test_corrupt_artifact_triggers_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        std::fs::write(&cfg.index_path, b"garbage").unwrap();

        let manager = IndexManager::open(cfg).unwrap();
        assert!(manager.is_loaded());
        assert!(manager.store().load().is_ok());
        assert_eq!(manager.recommender().unwrap().index().len(), 3);
    }

    #[test]
    fn test_inconsistent_artifact_triggers_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let index = IndexManager::open(cfg.clone())
            .unwrap()
            .recommender()
            .unwrap()
            .index()
            .clone();

        let mut value = serde_json::to_value(&index).unwrap();
        value["model"]["idf"] = serde_json::json!([]);
        let tampered: PersistedIndex = serde_json::from_value(value).unwrap();
        IndexStore::new(&cfg.index_path).save(&tampered).unwrap();

        let manager = IndexManager::open(cfg).unwrap();
        let results = manager.recommend("numerical", None).unwrap();
        assert_eq!(results[0].title, "Verify Numerical Reasoning");
        assert!(manager.store().load().is_ok());
    }

    #[test]
    fn test_config_change_triggers_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        IndexManager::open(config(dir.path())).unwrap();

        let cfg = StorageConfig {
            tfidf: TfidfConfig::default().with_max_features(3),
            ..config(dir.path())
        };
        let manager = IndexManager::open(cfg).unwrap();
        let recommender = manager.recommender().unwrap();
        let model = &recommender.index().model;
        assert_eq!(model.config().max_features, 3);
        assert!(model.dim() <= 3);
    }

    #[test]
    fn test_missing_catalog_surfaces_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = StorageConfig {
            catalog_path: dir.path().join("nope.csv"),
            index_path: dir.path().join("index.bin"),
            ..Default::default()
        };
        assert!(matches!(IndexManager::open(cfg), Err(Error::Catalog(_))));
    }

    #[test]
    fn test_rebuild_replaces_generation() {
        let dir = tempfile::tempdir().unwrap();
        let manager = IndexManager::open(config(dir.path())).unwrap();
        let old = manager.recommender().unwrap();

        let corpus = Corpus::new(vec![assessmatch_core::CatalogRecord::new("Sales Simulation", "Manager")]);
        let new = manager.rebuild_from_corpus(corpus).unwrap();

        assert_eq!(old.index().len(), 3);
        assert_eq!(new.index().len(), 1);
        assert_eq!(manager.recommender().unwrap().index().len(), 1);
        assert_eq!(manager.store().load().unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_rebuilds_are_serialized() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Arc::new(IndexManager::open(config(dir.path())).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let m = manager.clone();
                std::thread::spawn(move || m.rebuild().map(|r| r.index().len()))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap().unwrap(), 3);
        }
        assert_eq!(manager.store().load().unwrap().len(), 3);
    }
}
