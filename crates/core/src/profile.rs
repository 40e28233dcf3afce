//! Profile Store
//!
//! The read-only catalog every interview session draws its prompt ingredients
//! from: roles with their domains, technical axes and question seeds, persona
//! style descriptors, the rubric's fallback guidance, and the compiled prompt
//! templates. It is validated once at load and never mutated afterwards, so a
//! single store can be shared by any number of concurrent sessions.

use crate::error::{ConfigError, NotFoundError};
use crate::template::{PromptTemplate, TemplateKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Normalizes a user-facing id ("Software Engineer") to its canonical key
/// form ("software_engineer").
pub fn normalize_id(raw: &str) -> String {
    raw.split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// The role pack for a single job role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleProfile {
    /// Valid domains for this role. The first entry is the fallback domain.
    pub domains: Vec<String>,
    /// Topics the interviewer should probe, in priority order.
    pub technical_axes: Vec<String>,
    #[serde(default)]
    pub question_seeds: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaProfile {
    /// Natural-language style descriptor, inserted verbatim into prompts.
    pub style: String,
}

/// The role and persona catalogs, as read from `roles.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub roles: BTreeMap<String, RoleProfile>,
    pub personas: BTreeMap<String, PersonaProfile>,
}

/// Fallback statements used when the generator omits strengths or improvements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricGuidance {
    pub strength_starters: Vec<String>,
    pub improvement_starters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
    pub guidance: RubricGuidance,
}

/// Raw template sources, before validation.
#[derive(Debug, Clone, Default)]
pub struct PromptTemplates {
    pub interviewer: String,
    pub followup: String,
    pub feedback: String,
    pub summary: String,
}

impl PromptTemplates {
    pub fn source(&self, kind: TemplateKind) -> &str {
        match kind {
            TemplateKind::Interviewer => &self.interviewer,
            TemplateKind::Followup => &self.followup,
            TemplateKind::Feedback => &self.feedback,
            TemplateKind::Summary => &self.summary,
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledTemplates {
    interviewer: PromptTemplate,
    followup: PromptTemplate,
    feedback: PromptTemplate,
    summary: PromptTemplate,
}

#[derive(Debug, Clone)]
pub struct ProfileStore {
    catalog: Catalog,
    guidance: RubricGuidance,
    templates: CompiledTemplates,
}

impl ProfileStore {
    /// Validates the configuration and builds the store.
    ///
    /// Role, persona and domain ids are normalized to their canonical form so
    /// that lookups with normalized session ids always agree with the catalog.
    pub fn load(
        catalog: Catalog,
        rubric: Rubric,
        templates: PromptTemplates,
    ) -> Result<Self, ConfigError> {
        if catalog.roles.is_empty() {
            return Err(ConfigError::malformed("role catalog", "no roles defined"));
        }
        if catalog.personas.is_empty() {
            return Err(ConfigError::malformed("persona catalog", "no personas defined"));
        }

        let mut roles = BTreeMap::new();
        for (id, mut role) in catalog.roles {
            if role.domains.is_empty() {
                return Err(ConfigError::malformed(
                    format!("role '{id}'"),
                    "at least one domain is required",
                ));
            }
            role.domains = role.domains.iter().map(|d| normalize_id(d)).collect();
            if roles.insert(normalize_id(&id), role).is_some() {
                return Err(ConfigError::malformed(
                    "role catalog",
                    format!("role '{id}' collides with another role after normalization"),
                ));
            }
        }
        let mut personas = BTreeMap::new();
        for (id, persona) in catalog.personas {
            if personas.insert(normalize_id(&id), persona).is_some() {
                return Err(ConfigError::malformed(
                    "persona catalog",
                    format!("persona '{id}' collides with another persona after normalization"),
                ));
            }
        }

        let guidance = rubric.guidance;
        if guidance.strength_starters.is_empty() {
            return Err(ConfigError::malformed(
                "rubric",
                "guidance.strength_starters must not be empty",
            ));
        }
        if guidance.improvement_starters.is_empty() {
            return Err(ConfigError::malformed(
                "rubric",
                "guidance.improvement_starters must not be empty",
            ));
        }

        let compile = |kind: TemplateKind| {
            PromptTemplate::parse(kind.name(), templates.source(kind), kind.placeholders())
        };
        let templates = CompiledTemplates {
            interviewer: compile(TemplateKind::Interviewer)?,
            followup: compile(TemplateKind::Followup)?,
            feedback: compile(TemplateKind::Feedback)?,
            summary: compile(TemplateKind::Summary)?,
        };

        let catalog = Catalog { roles, personas };
        debug!(
            roles = catalog.roles.len(),
            personas = catalog.personas.len(),
            "Profile store loaded"
        );

        Ok(Self {
            catalog,
            guidance,
            templates,
        })
    }

    pub fn role(&self, role_id: &str) -> Result<&RoleProfile, NotFoundError> {
        self.catalog
            .roles
            .get(role_id)
            .ok_or_else(|| NotFoundError::role(role_id))
    }

    pub fn role_axes(&self, role_id: &str) -> Result<&[String], NotFoundError> {
        Ok(&self.role(role_id)?.technical_axes)
    }

    pub fn role_domains(&self, role_id: &str) -> Result<&[String], NotFoundError> {
        Ok(&self.role(role_id)?.domains)
    }

    pub fn question_seeds(&self, role_id: &str) -> Result<&[String], NotFoundError> {
        Ok(&self.role(role_id)?.question_seeds)
    }

    /// Looks up a persona's style descriptor. There is deliberately no
    /// fallback persona.
    pub fn persona_style(&self, persona_id: &str) -> Result<&str, NotFoundError> {
        self.catalog
            .personas
            .get(persona_id)
            .map(|p| p.style.as_str())
            .ok_or_else(|| NotFoundError::persona(persona_id))
    }

    pub fn strength_defaults(&self) -> &[String] {
        &self.guidance.strength_starters
    }

    pub fn improvement_defaults(&self) -> &[String] {
        &self.guidance.improvement_starters
    }

    pub fn template(&self, kind: TemplateKind) -> &PromptTemplate {
        match kind {
            TemplateKind::Interviewer => &self.templates.interviewer,
            TemplateKind::Followup => &self.templates.followup,
            TemplateKind::Feedback => &self.templates.feedback,
            TemplateKind::Summary => &self.templates.summary,
        }
    }

    pub fn role_ids(&self) -> impl Iterator<Item = &str> {
        self.catalog.roles.keys().map(String::as_str)
    }

    pub fn persona_ids(&self) -> impl Iterator<Item = &str> {
        self.catalog.personas.keys().map(String::as_str)
    }
}
