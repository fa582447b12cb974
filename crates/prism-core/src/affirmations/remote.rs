//! Remote affirmation list with cached fallback.
//!
//! Structurally a miniature of the art pipeline's caching contract: fetch,
//! cache on success, serve the cached copy on failure. No image, no retry,
//! no downsampling.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::AffirmationStore;
use crate::storage::SharedDefaults;

const REMOTE_CACHE_KEY: &str = "cached_affirmations_remote";

/// Wire shape of one remote entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteAffirmation {
    pub text: String,
}

/// Fetch the remote list, caching it for offline use.
///
/// On any network or parse failure the last cached copy is returned
/// instead (empty on true first run).
pub async fn fetch_remote(
    client: &reqwest::Client,
    url: &str,
    defaults: &SharedDefaults,
) -> Vec<String> {
    match try_fetch(client, url).await {
        Ok(phrases) => {
            if let Err(e) = defaults.set(REMOTE_CACHE_KEY, &phrases) {
                tracing::warn!("remote affirmation cache write failed: {e}");
            }
            phrases
        }
        Err(e) => {
            tracing::debug!("remote affirmations unavailable, using cache: {e}");
            defaults.get(REMOTE_CACHE_KEY).unwrap_or_default()
        }
    }
}

async fn try_fetch(client: &reqwest::Client, url: &str) -> Result<Vec<String>, reqwest::Error> {
    let entries: Vec<RemoteAffirmation> = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(entries.into_iter().map(|e| e.text).collect())
}

/// The list the widget renders: user phrases first, then the remote set,
/// deduplicated and shuffled. Never empty -- placeholder lines stand in
/// when there is nothing at all to show.
pub async fn fetch_combined(
    client: &reqwest::Client,
    url: &str,
    store: &AffirmationStore,
    defaults: &SharedDefaults,
) -> Vec<String> {
    let user: Vec<String> = store.load().into_iter().map(|i| i.text).collect();
    let remote = fetch_remote(client, url, defaults).await;

    let mut seen = HashSet::new();
    let mut combined: Vec<String> = user
        .into_iter()
        .chain(remote)
        .filter(|phrase| seen.insert(phrase.clone()))
        .collect();

    if combined.is_empty() {
        return vec![
            "Ajoute tes phrases dans l'app ! ✏️".into(),
            "Aucune connexion détectée 📡".into(),
        ];
    }

    combined.shuffle(&mut rand::thread_rng());
    combined
}
