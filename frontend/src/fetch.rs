use futures::try_join;
use serde::de::DeserializeOwned;

use timeline_core::store::{
    CONNECTIONS_DOC, DYNASTY_DOC, GLOSSARY_DOC, KINGS_DOC, OTHER_DOC, PART_DOC, TIMELINE_DOC,
};
use timeline_core::{AppState, Config, ContentStore};

async fn fetch_document<T: DeserializeOwned>(config: &Config, name: &str) -> Result<T, String> {
    let resp = gloo_net::http::Request::get(&config.document_url(name))
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.ok() {
        return Err(format!("{name}: HTTP {}", resp.status()));
    }
    let text = resp.text().await.map_err(|e| e.to_string())?;
    serde_json::from_str(&text).map_err(|e| format!("cannot parse {name}: {e}"))
}

/// Fetch all seven documents concurrently; any failure fails the load.
pub async fn fetch_store(config: &Config) -> Result<ContentStore, String> {
    let (part, dynasty, kings, other, glossary, connections, timeline_data) = try_join!(
        fetch_document(config, PART_DOC),
        fetch_document(config, DYNASTY_DOC),
        fetch_document(config, KINGS_DOC),
        fetch_document(config, OTHER_DOC),
        fetch_document(config, GLOSSARY_DOC),
        fetch_document(config, CONNECTIONS_DOC),
        fetch_document(config, TIMELINE_DOC),
    )?;
    Ok(ContentStore {
        part,
        dynasty,
        kings,
        other,
        glossary,
        connections,
        timeline_data,
    })
}

pub async fn load_state(config: Config) -> Result<AppState, String> {
    let store = fetch_store(&config).await?;
    AppState::new(store, config).map_err(|e| e.to_string())
}
