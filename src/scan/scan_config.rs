use std::sync::mpsc;
use std::sync::{atomic::AtomicBool, Arc};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::scan::event::ScanEvent;
use crate::schema::ProjectMeta;

/// Which tags get a presence column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagSelection {
    /// Every tag of the schema, in declaration order.
    All,
    /// Exactly these tags, in this order. Empty skips tag statistics.
    Only(Vec<String>),
}

/// Configuration for a `run_scan` call.
///
/// # Fields
/// - `batch_size`: images fetched and emitted together
/// - `top_resolutions`: resolutions kept by name in the histogram
/// - `parallel_render`: render the images of a batch on the rayon pool
/// - `fetch_retries`: extra attempts for failed catalog requests
/// - `retry_delay_ms`: pause between those attempts
/// - `tags`: which tags to report
/// - `progress_tx`: optional channel receiving one `ScanEvent::Batch`
///   per completed batch, then the final charts. If
///   the receiver is dropped the scan stops after the
///   current batch.
/// - `stop_flag`: optional flag; when set the scan stops before the
///   next batch. Batches already emitted stand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub batch_size: usize,
    pub top_resolutions: usize,
    pub parallel_render: bool,
    pub fetch_retries: u32,
    pub retry_delay_ms: u64,
    pub tags: TagSelection,
    #[serde(skip)]
    pub progress_tx: Option<mpsc::Sender<ScanEvent>>,
    #[serde(skip)]
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            batch_size: 50,
            top_resolutions: 10,
            parallel_render: true,
            fetch_retries: 0,
            retry_delay_ms: 200,
            tags: TagSelection::All,
            progress_tx: None,
            stop_flag: None,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".into()));
        }
        if let TagSelection::Only(names) = &self.tags {
            for (i, name) in names.iter().enumerate() {
                if names[..i].contains(name) {
                    return Err(Error::Config(format!("tag {:?} is selected more than once", name)));
                }
            }
        }
        Ok(())
    }

    /// Tag names to report for this schema.
    pub fn tag_names(&self, meta: &ProjectMeta) -> Vec<String> {
        match &self.tags {
            TagSelection::All => meta.tags().iter().map(|t| t.name.clone()).collect(),
            TagSelection::Only(names) => names.clone(),
        }
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `ScanConfig` from a JSON file; missing fields keep
    /// their defaults.
    pub fn load_json(path: &str) -> Result<ScanConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{MetaPayload, Rgb, TagPayload};

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ScanConfig = serde_json::from_str(r#"{"batch_size": 8, "tags": {"only": ["rain"]}}"#).unwrap();
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.top_resolutions, 10);
        assert_eq!(config.tags, TagSelection::Only(vec!["rain".into()]));
        assert!(config.progress_tx.is_none());
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let config = ScanConfig { batch_size: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_duplicate_tag_selection_is_rejected() {
        let config = ScanConfig { tags: TagSelection::Only(vec!["rain".into(), "night".into(), "rain".into()]), ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::Config(ref msg)) if msg.contains("rain")));
        let distinct = ScanConfig { tags: TagSelection::Only(vec!["rain".into(), "night".into()]), ..Default::default() };
        assert!(distinct.validate().is_ok());
    }

    #[test]
    fn test_tag_names_from_schema() {
        let meta = ProjectMeta::from_payload(&MetaPayload {
            classes: vec![],
            tags: vec![
                TagPayload { name: "night".into(), color: Rgb::new(0, 0, 0) },
                TagPayload { name: "rain".into(), color: Rgb::new(1, 1, 1) },
            ],
        })
        .unwrap();
        assert_eq!(ScanConfig::default().tag_names(&meta), vec!["night", "rain"]);
        let none = ScanConfig { tags: TagSelection::Only(vec![]), ..Default::default() };
        assert!(none.tag_names(&meta).is_empty());
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.json");
        let path = path.to_str().unwrap();
        let config = ScanConfig { batch_size: 3, fetch_retries: 2, ..Default::default() };
        config.save_json(path).unwrap();
        let back = ScanConfig::load_json(path).unwrap();
        assert_eq!(back.batch_size, 3);
        assert_eq!(back.fetch_retries, 2);
    }
}
