use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::models::{ModelLister, ModelRegistry, ProviderId};
use crate::vault::Credentials;

/// Live availability of every catalog entry, keyed by model id
pub type Availability = BTreeMap<String, bool>;

/// Diagnostic check of which catalog models each provider currently serves
pub struct StatusProbe {
    registry: Arc<ModelRegistry>,
    lister: Arc<dyn ModelLister>,
    timeout: Duration,
}

impl StatusProbe {
    pub fn new(
        registry: Arc<ModelRegistry>,
        lister: Arc<dyn ModelLister>,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            lister,
            timeout,
        }
    }

    /// One listing call per provider; a failed provider marks all its models offline
    pub async fn probe(&self, credentials: &Credentials) -> Availability {
        let mut listed: BTreeMap<ProviderId, HashSet<String>> = BTreeMap::new();

        for provider in ProviderId::ALL {
            let served = match self
                .lister
                .list_models(provider, credentials.key_for(provider), self.timeout)
                .await
            {
                Ok(served) => served,
                Err(e) => {
                    warn!("Status check for {} failed: {}", provider, e);
                    HashSet::new()
                }
            };
            listed.insert(provider, served);
        }

        self.registry
            .all()
            .iter()
            .map(|m| {
                let online = listed
                    .get(&m.provider)
                    .is_some_and(|served| served.contains(&m.model_id));
                (m.model_id.clone(), online)
            })
            .collect()
    }
}
