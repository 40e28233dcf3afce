//! Data Directory Loader
//!
//! Reads the interview configuration from a directory laid out as:
//!
//! ```text
//! data/
//!   roles.json        {"roles": {...}, "personas": {...}}
//!   rubric.json       {"guidance": {"strength_starters": [...], "improvement_starters": [...]}}
//!   prompts/
//!     interviewer.txt
//!     followup.txt
//!     feedback.txt
//!     summary.txt
//! ```

use crate::error::ConfigError;
use crate::profile::{Catalog, ProfileStore, PromptTemplates, Rubric};
use crate::template::TemplateKind;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::info;

/// Loads and validates a [`ProfileStore`] from `dir`.
pub fn load_from_dir(dir: &Path) -> Result<ProfileStore, ConfigError> {
    let catalog: Catalog = read_json(&dir.join("roles.json"))?;
    let rubric: Rubric = read_json(&dir.join("rubric.json"))?;

    let prompts_dir = dir.join("prompts");
    let read_prompt = |kind: TemplateKind| read_text(&prompts_dir.join(format!("{}.txt", kind.name())));
    let templates = PromptTemplates {
        interviewer: read_prompt(TemplateKind::Interviewer)?,
        followup: read_prompt(TemplateKind::Followup)?,
        feedback: read_prompt(TemplateKind::Feedback)?,
        summary: read_prompt(TemplateKind::Summary)?,
    };

    let store = ProfileStore::load(catalog, rubric, templates)?;
    info!(path = %dir.display(), roles = store.role_ids().count(), "Interview data loaded");
    Ok(store)
}

fn read_text(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|e| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        ConfigError::malformed(name, e.to_string())
    })
}
