//! The JSON contract of the workflow backend.
//!
//! Field names are the backend's and must match exactly: the backend silently
//! ignores fields it does not know.

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::warn;

use crate::domain::Tools;

/// Reads a field that may be absent or `null` as its default.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Reads a list, skipping entries that do not match `T` with a warning.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            serde_json::from_value(entry)
                .inspect_err(|e| warn!("skipping entry {index}: {e}"))
                .ok()
        })
        .collect())
}

/// Which backend flow a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Decompose a prompt into indicators.
    Section,
    /// Produce planning suggestions for confirmed indicators.
    Planning,
}

/// Body element of both endpoints. The body itself is a one-element array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Prompt text, or the JSON-encoded [`ConfirmPayload`] for planning.
    pub search_text: String,
    /// Which flow to run.
    pub search_type: SearchType,
    /// Generation options; only sent with decompositions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Tools>,
}

impl SearchRequest {
    /// A decomposition request for `prompt`.
    #[must_use]
    pub fn decompose(prompt: &str, tools: Tools) -> Self {
        Self {
            search_text: prompt.to_string(),
            search_type: SearchType::Section,
            tools: Some(tools),
        }
    }

    /// A planning request carrying `payload`.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be encoded as JSON.
    pub fn plan(payload: &ConfirmPayload) -> serde_json::Result<Self> {
        Ok(Self {
            search_text: serde_json::to_string(payload)?,
            search_type: SearchType::Planning,
            tools: None,
        })
    }

    /// The request body: this request wrapped in a one-element array.
    #[must_use]
    pub fn into_body(self) -> [Self; 1] {
        [self]
    }
}

/// An introduction phrase as exchanged with the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPhrase {
    /// Position of the phrase.
    #[serde(default, deserialize_with = "nullable")]
    pub orden: i64,
    /// The phrase.
    #[serde(default, deserialize_with = "nullable")]
    pub frase: String,
    /// Id of the indicator the phrase refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_indicador_relacionado: Option<String>,
}

/// Text wrapper used by the indicator breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawText {
    /// The text.
    #[serde(default, deserialize_with = "nullable")]
    pub texto: String,
}

/// Skill/method/context breakdown of an indicator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawBreakdown {
    /// Skill.
    #[serde(default, deserialize_with = "nullable")]
    pub habilidad: RawText,
    /// Method.
    #[serde(default, deserialize_with = "nullable")]
    pub metodo: RawText,
    /// Context.
    #[serde(default, deserialize_with = "nullable")]
    pub contexto: RawText,
}

/// An indicator as exchanged with the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawIndicator {
    /// Hierarchical id.
    #[serde(default, deserialize_with = "nullable")]
    pub id_indicador: String,
    /// Module name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre_modulo: Option<String>,
    /// Description.
    #[serde(default, deserialize_with = "nullable")]
    pub descripcion: String,
    /// Indicator statement (the title).
    #[serde(default, deserialize_with = "nullable")]
    pub texto_indicador: String,
    /// Syllabus content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texto_contenido: Option<String>,
    /// Pedagogical justification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justificacion_pedagogica: Option<String>,
    /// Skill/method/context breakdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicador_desglosado: Option<RawBreakdown>,
}

/// Indicators grouped under one learning outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGroup {
    /// The learning outcome.
    #[serde(default, deserialize_with = "nullable")]
    pub oa: String,
    /// Its indicators.
    #[serde(default, deserialize_with = "lenient_list")]
    pub indicadores: Vec<RawIndicator>,
}

/// Name of the introduction list in a decomposition response.
pub const INTRODUCTION_KEY: &str = "introduccion_curso";

/// Name of the grouping list in a decomposition response.
pub const GROUPS_KEY: &str = "silabo_curso_agrupado_por_oa";

/// Confirmed review material sent to the planning endpoint.
///
/// Mirrors the shape of a decomposition response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmPayload {
    /// Introduction phrases, in order.
    pub introduccion_curso: Vec<RawPhrase>,
    /// Groups, without deleted indicators.
    pub silabo_curso_agrupado_por_oa: Vec<RawGroup>,
}

/// A learning resource of a suggested section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RawModule {
    /// Resource type.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Resource URL.
    #[serde(rename = "moduleUrl", default)]
    pub url: String,
    /// Resource name.
    #[serde(rename = "moduleName", default)]
    pub name: String,
}

/// One sub-requirement and whether a suggestion covers it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawDecomposition {
    /// Category.
    #[serde(default)]
    pub decomposition_type: String,
    /// Text.
    #[serde(default)]
    pub decomposition_text: String,
    /// Whether it is covered.
    #[serde(default)]
    pub is_covered: bool,
    /// Why it is not covered.
    #[serde(default)]
    pub reason: String,
}

/// A suggested section.
///
/// Any coverage figures the backend might add are ignored; coverage is always
/// recomputed from `sectiondescomposition`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawSuggestedSection {
    /// Name.
    #[serde(default)]
    pub sectionname: String,
    /// Long profile.
    #[serde(default)]
    pub sectionprofile: String,
    /// Short profile.
    #[serde(default)]
    pub sectionprofile_summary: String,
    /// Learning resources.
    #[serde(default)]
    pub modulesdata: Vec<RawModule>,
    /// Similarity score.
    pub score: f64,
    /// Curriculum tag.
    #[serde(default)]
    pub ds_curriculum_tag: String,
    /// Course name.
    #[serde(default)]
    pub coursename: String,
    /// Coverage decomposition.
    #[serde(default)]
    pub sectiondescomposition: Vec<RawDecomposition>,
}

/// A required section and its suggestions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPlanningResult {
    /// Name.
    #[serde(default)]
    pub requiredsectionname: String,
    /// Expected indicator.
    #[serde(default)]
    pub requiredsection: String,
    /// Description.
    #[serde(default)]
    pub requiredsectiondescription: String,
    /// Candidate sections.
    #[serde(default)]
    pub suggestedsections: Vec<RawSuggestedSection>,
    /// Topic.
    #[serde(default)]
    pub topic: String,
    /// Content summary.
    #[serde(default)]
    pub texto_contenido: String,
    /// Pedagogical justification.
    #[serde(default)]
    pub justificacion_pedagogica: Option<String>,
}

/// Response of the planning endpoint.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PlanResponse {
    /// One entry per required section; absent means none.
    #[serde(default)]
    pub planningdata: Vec<RawPlanningResult>,
}
