use std::sync::Arc;

use stockroom_core::UnitNouns;
use stockroom_infra::{open_store, InMemoryStockStore, LedgerError, StockLedger, StockStore, StoreConfig};

/// Ledger over whichever backend the configuration selected.
pub type Ledger = StockLedger<Arc<dyn StockStore>>;

/// Everything the handlers need: the ledger and the display rules.
#[derive(Clone)]
pub struct AppServices {
    pub ledger: Arc<Ledger>,
    pub nouns: Arc<UnitNouns>,
}

impl AppServices {
    pub fn new(ledger: Ledger, nouns: UnitNouns) -> Self {
        Self {
            ledger: Arc::new(ledger),
            nouns: Arc::new(nouns),
        }
    }

    /// Fresh in-memory ledger (dev/test).
    pub async fn in_memory(nouns: UnitNouns) -> Result<Self, LedgerError> {
        let store: Arc<dyn StockStore> = Arc::new(InMemoryStockStore::new());
        let ledger = StockLedger::new(store);
        ledger.initialize().await?;
        Ok(Self::new(ledger, nouns))
    }
}

/// Open the configured store and make sure the product table exists.
pub async fn build_services(store: &StoreConfig, nouns: UnitNouns) -> Result<AppServices, LedgerError> {
    let store = open_store(store).await?;
    let ledger = StockLedger::new(store);
    ledger.initialize().await?;

    tracing::info!("stock ledger ready");
    Ok(AppServices::new(ledger, nouns))
}
