//! Conversion between the backend contract and the domain model.
//!
//! Decomposition responses are read leniently: a missing or malformed grouping
//! list yields no indicators and a warning, never an error. Planning responses
//! are decoded strictly by [`PlanResponse`] before reaching this module.

use serde_json::Value;
use tracing::warn;

use super::wire::{
    ConfirmPayload, GROUPS_KEY, INTRODUCTION_KEY, PlanResponse, RawBreakdown, RawDecomposition,
    RawGroup, RawIndicator, RawPhrase, RawPlanningResult, RawSuggestedSection, RawText,
};
use crate::domain::{
    Conversation, Decomposition, Indicator, IndicatorBreakdown, IndicatorGroup,
    IntroductionPhrase, ModuleResource, PlanningResult, RequiredSection, Review, SuggestedSection,
};

/// Reads the review material out of a decomposition response.
#[must_use]
pub fn review(response: &Value) -> Review {
    Review {
        introduction: introduction(response),
        groups: indicator_groups(response),
    }
}

/// Maps the grouping list of a decomposition response.
///
/// Returns an empty list, with a warning, if the list is missing or is not a
/// list. Absent or `null` fields read as empty; groups and indicators that
/// still do not match the contract are skipped with a warning.
#[must_use]
pub fn indicator_groups(response: &Value) -> Vec<IndicatorGroup> {
    let Some(groups) = response.get(GROUPS_KEY).and_then(Value::as_array) else {
        warn!("decomposition response has no '{GROUPS_KEY}' list; showing no indicators");
        return Vec::new();
    };

    groups
        .iter()
        .enumerate()
        .filter_map(|(index, group)| {
            serde_json::from_value::<RawGroup>(group.clone())
                .inspect_err(|e| warn!("skipping indicator group {index}: {e}"))
                .ok()
        })
        .map(IndicatorGroup::from)
        .collect()
}

/// Maps the introduction list of a decomposition response.
///
/// A missing or malformed list yields no phrases.
#[must_use]
pub fn introduction(response: &Value) -> Vec<IntroductionPhrase> {
    response
        .get(INTRODUCTION_KEY)
        .and_then(Value::as_array)
        .map(|phrases| {
            phrases
                .iter()
                .filter_map(|phrase| serde_json::from_value::<RawPhrase>(phrase.clone()).ok())
                .map(IntroductionPhrase::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Builds the planning request payload from a conversation.
///
/// Deleted indicators are left out; everything else keeps its order.
#[must_use]
pub fn confirm_payload(conversation: &Conversation) -> ConfirmPayload {
    ConfirmPayload {
        introduccion_curso: conversation
            .introduction()
            .iter()
            .map(RawPhrase::from)
            .collect(),
        silabo_curso_agrupado_por_oa: conversation
            .groups()
            .map(|group| RawGroup {
                oa: group.title.clone(),
                indicadores: group.visible().map(RawIndicator::from).collect(),
            })
            .collect(),
    }
}

/// Builds ranked and assigned planning results from a planning response.
#[must_use]
pub fn planning_results(response: PlanResponse) -> Vec<PlanningResult> {
    response
        .planningdata
        .into_iter()
        .map(PlanningResult::from)
        .collect()
}

impl From<RawPhrase> for IntroductionPhrase {
    fn from(raw: RawPhrase) -> Self {
        Self {
            order: raw.orden,
            phrase: raw.frase,
            related_indicator: raw.id_indicador_relacionado,
        }
    }
}

impl From<&IntroductionPhrase> for RawPhrase {
    fn from(phrase: &IntroductionPhrase) -> Self {
        Self {
            orden: phrase.order,
            frase: phrase.phrase.clone(),
            id_indicador_relacionado: phrase.related_indicator.clone(),
        }
    }
}

impl From<RawBreakdown> for IndicatorBreakdown {
    fn from(raw: RawBreakdown) -> Self {
        Self {
            skill: raw.habilidad.texto,
            method: raw.metodo.texto,
            context: raw.contexto.texto,
        }
    }
}

impl From<&IndicatorBreakdown> for RawBreakdown {
    fn from(breakdown: &IndicatorBreakdown) -> Self {
        let text = |texto: &String| RawText {
            texto: texto.clone(),
        };
        Self {
            habilidad: text(&breakdown.skill),
            metodo: text(&breakdown.method),
            contexto: text(&breakdown.context),
        }
    }
}

impl From<RawIndicator> for Indicator {
    fn from(raw: RawIndicator) -> Self {
        let mut indicator = Self::new(raw.id_indicador, raw.texto_indicador);
        indicator.description = raw.descripcion;
        indicator.module = raw.nombre_modulo;
        indicator.content = raw.texto_contenido;
        indicator.justification = raw.justificacion_pedagogica;
        indicator.breakdown = raw.indicador_desglosado.map(IndicatorBreakdown::from);
        indicator
    }
}

impl From<&Indicator> for RawIndicator {
    fn from(indicator: &Indicator) -> Self {
        Self {
            id_indicador: indicator.id.clone(),
            nombre_modulo: indicator.module.clone(),
            descripcion: indicator.description.clone(),
            texto_indicador: indicator.title.clone(),
            texto_contenido: indicator.content.clone(),
            justificacion_pedagogica: indicator.justification.clone(),
            indicador_desglosado: indicator.breakdown.as_ref().map(RawBreakdown::from),
        }
    }
}

impl From<RawGroup> for IndicatorGroup {
    fn from(raw: RawGroup) -> Self {
        Self::new(
            raw.oa,
            raw.indicadores.into_iter().map(Indicator::from).collect(),
        )
    }
}

impl From<RawDecomposition> for Decomposition {
    fn from(raw: RawDecomposition) -> Self {
        Self {
            kind: raw.decomposition_type,
            text: raw.decomposition_text,
            covered: raw.is_covered,
            reason: raw.reason,
        }
    }
}

impl From<RawSuggestedSection> for SuggestedSection {
    fn from(raw: RawSuggestedSection) -> Self {
        let decomposition = raw
            .sectiondescomposition
            .into_iter()
            .map(Decomposition::from)
            .collect();
        let mut section = Self::new(raw.sectionname, raw.score, decomposition);
        section.profile = raw.sectionprofile;
        section.profile_summary = raw.sectionprofile_summary;
        section.modules = raw
            .modulesdata
            .into_iter()
            .map(|module| ModuleResource {
                kind: module.kind,
                url: module.url,
                name: module.name,
            })
            .collect();
        section.curriculum_tag = raw.ds_curriculum_tag;
        section.course_name = raw.coursename;
        section
    }
}

impl From<RawPlanningResult> for PlanningResult {
    fn from(raw: RawPlanningResult) -> Self {
        let required = RequiredSection {
            name: raw.requiredsectionname,
            expected_indicator: raw.requiredsection,
            description: raw.requiredsectiondescription,
            topic: raw.topic,
            content: raw.texto_contenido,
            justification: raw.justificacion_pedagogica,
        };
        let suggestions = raw
            .suggestedsections
            .into_iter()
            .map(SuggestedSection::from)
            .collect();
        Self::new(required, suggestions)
    }
}

#[cfg(test)]
mod tests {
    use non_empty_string::NonEmptyString;
    use serde_json::json;

    use super::*;
    use crate::domain::{IndicatorField, IndicatorStatus};

    fn decomposition_response() -> Value {
        json!({
            "introduccion_curso": [
                {"orden": 1, "frase": "Students read complex texts", "id_indicador_relacionado": "1.1"},
                {"orden": 2, "frase": "and write essays."},
            ],
            "silabo_curso_agrupado_por_oa": [
                {
                    "oa": "Comprehension",
                    "indicadores": [
                        {
                            "id_indicador": "1.1",
                            "texto_indicador": "Identifies the main idea",
                            "descripcion": "In argumentative texts",
                            "nombre_modulo": "Reading",
                            "texto_contenido": "Argumentative texts",
                            "justificacion_pedagogica": "Foundation for analysis",
                            "indicador_desglosado": {
                                "habilidad": {"texto": "identify"},
                                "metodo": {"texto": "close reading"},
                                "contexto": {"texto": "essays"},
                            },
                        },
                        {"id_indicador": "1.2", "texto_indicador": "Infers meaning", "descripcion": ""},
                    ],
                },
                {
                    "oa": "Writing",
                    "indicadores": [{"id_indicador": "2.1", "texto_indicador": "Writes an essay", "descripcion": ""}],
                },
            ],
        })
    }

    fn conversation() -> Conversation {
        let mut conversation =
            Conversation::new(NonEmptyString::new("Read and write".to_string()).unwrap());
        conversation.populate(review(&decomposition_response()));
        conversation
    }

    #[test]
    fn maps_groups_and_indicators() {
        let groups = indicator_groups(&decomposition_response());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].title, "Comprehension");

        let first = groups[0].indicators().next().unwrap();
        assert_eq!(first.id, "1.1");
        assert_eq!(first.title, "Identifies the main idea");
        assert_eq!(first.description, "In argumentative texts");
        assert_eq!(first.module.as_deref(), Some("Reading"));
        assert_eq!(first.breakdown.as_ref().unwrap().method, "close reading");
        assert_eq!(first.status(), IndicatorStatus::Original);
        assert!(!first.is_manual());
    }

    #[test]
    fn null_field_keeps_the_whole_group() {
        let response = json!({
            "silabo_curso_agrupado_por_oa": [{
                "oa": "Comprehension",
                "indicadores": [
                    {"id_indicador": "1.1", "texto_indicador": "Reads", "descripcion": null},
                    {"id_indicador": "1.2", "texto_indicador": "Infers", "descripcion": "From context"},
                ],
            }],
        });
        let groups = indicator_groups(&response);
        assert_eq!(groups.len(), 1);
        let ids: Vec<_> = groups[0].indicators().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["1.1", "1.2"]);
        assert_eq!(groups[0].indicators().next().unwrap().description, "");
    }

    #[test]
    fn missing_optional_fields_map_to_none() {
        let groups = indicator_groups(&decomposition_response());
        let sparse = groups[0].indicators().nth(1).unwrap();
        assert_eq!(sparse.description, "");
        assert!(sparse.module.is_none());
        assert!(sparse.content.is_none());
        assert!(sparse.justification.is_none());
        assert!(sparse.breakdown.is_none());
    }

    #[test]
    fn missing_grouping_list_yields_nothing() {
        assert!(indicator_groups(&json!({"introduccion_curso": []})).is_empty());
        assert!(indicator_groups(&json!({"silabo_curso_agrupado_por_oa": "not a list"})).is_empty());
        assert!(indicator_groups(&Value::Null).is_empty());
        assert!(introduction(&Value::Null).is_empty());
    }

    #[test]
    fn malformed_group_is_skipped() {
        let response = json!({
            "silabo_curso_agrupado_por_oa": [
                {"oa": 42, "indicadores": []},
                {"oa": "Writing", "indicadores": []},
            ],
        });
        let titles: Vec<_> = indicator_groups(&response)
            .into_iter()
            .map(|group| group.title)
            .collect();
        assert_eq!(titles, ["Writing"]);
    }

    #[test]
    fn maps_introduction_with_cross_references() {
        let phrases = introduction(&decomposition_response());
        assert_eq!(phrases.len(), 2);
        assert_eq!(phrases[0].related_indicator.as_deref(), Some("1.1"));
        assert!(phrases[1].related_indicator.is_none());
    }

    #[test]
    fn payload_is_inverse_of_mapping() {
        let payload = serde_json::to_value(confirm_payload(&conversation())).unwrap();
        assert_eq!(payload, decomposition_response());
    }

    #[test]
    fn deleted_indicators_are_left_out_of_the_payload() {
        let mut conversation = conversation();
        conversation.delete_indicator("1.1").unwrap();

        let payload = confirm_payload(&conversation);
        let ids: Vec<_> = payload
            .silabo_curso_agrupado_por_oa
            .iter()
            .flat_map(|group| group.indicadores.iter().map(|i| i.id_indicador.as_str()))
            .collect();
        assert_eq!(ids, ["1.2", "2.1"]);

        // still in memory, flagged deleted
        let kept = conversation.group(0).unwrap().indicators().next().unwrap();
        assert_eq!(kept.id, "1.1");
        assert_eq!(kept.status(), IndicatorStatus::Deleted);
        assert!(conversation.visible_indicators().all(|i| i.id != "1.1"));
    }

    #[test]
    fn payload_carries_edits_and_manual_indicators() {
        let mut conversation = conversation();
        conversation
            .edit_indicator("2.1", IndicatorField::Title, "Writes a short essay".to_string())
            .unwrap();
        conversation.add_indicator(1).unwrap();

        let payload = serde_json::to_value(confirm_payload(&conversation)).unwrap();
        let writing = &payload[GROUPS_KEY][1]["indicadores"];
        assert_eq!(writing[0]["texto_indicador"], "Writes a short essay");
        assert_eq!(writing[1]["id_indicador"], "2.2");
        assert_eq!(writing[1]["texto_contenido"], "New syllabus content");
        assert!(writing[1].get("nombre_modulo").is_none());
    }

    #[test]
    fn planning_results_are_ranked_and_assigned() {
        let response: PlanResponse = serde_json::from_value(json!({
            "planningdata": [{
                "requiredsectionname": "1. Reading",
                "requiredsection": "Identifies the main idea",
                "requiredsectiondescription": "Argumentative texts",
                "topic": "Comprehension",
                "texto_contenido": "Texts",
                "suggestedsections": [
                    {
                        "sectionname": "Partial",
                        "score": 0.92,
                        "sectiondescomposition": [
                            {"decomposition_type": "skill", "decomposition_text": "a", "is_covered": true, "reason": ""},
                            {"decomposition_type": "context", "decomposition_text": "b", "is_covered": false, "reason": "no essays"},
                        ],
                    },
                    {
                        "sectionname": "Full",
                        "score": 0.71,
                        "coursename": "Language I",
                        "sectiondescomposition": [
                            {"decomposition_type": "skill", "decomposition_text": "a", "is_covered": true, "reason": ""},
                        ],
                    },
                ],
            }],
        }))
        .unwrap();

        let results = planning_results(response);
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.required().expected_indicator, "Identifies the main idea");
        assert!(result.required().justification.is_none());
        assert_eq!(result.suggestions()[0].name, "Partial");
        assert_eq!(result.suggestions()[0].coverage().rate(), 50);
        assert_eq!(result.suggestions()[0].coverage().uncovered_reasons(), "no essays");

        let assigned = result.assigned().unwrap();
        assert_eq!(assigned.name, "Full");
        assert_eq!(assigned.course_name, "Language I");
    }
}
