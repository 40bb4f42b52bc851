use crate::browser::driver::PageDriver;
use crate::dom::listing::tags;
use crate::error::Result;
use crate::locators::{annotation, record};
use crate::workflows::{Workflow, WorkflowContext, WorkflowResult, open_window, open_with_actions, set_checkbox};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the edit_annotation workflow
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EditAnnotationParams {
    /// Record number
    pub record: String,

    /// New annotation text; empty clears the annotation
    #[serde(default)]
    pub text: String,

    /// Flag the annotation as priority (default: false)
    #[serde(default)]
    pub priority: bool,
}

/// Workflow for replacing a record's annotation ("post-it")
#[derive(Default)]
pub struct EditAnnotationWorkflow;

impl Workflow for EditAnnotationWorkflow {
    type Params = EditAnnotationParams;

    fn name(&self) -> &str {
        "edit_annotation"
    }

    fn execute_typed<D: PageDriver>(
        &self,
        params: EditAnnotationParams,
        context: &mut WorkflowContext<'_, D>,
    ) -> Result<WorkflowResult> {
        let sei = &mut *context.sei;
        let (target, actions) = open_with_actions(sei, &params.record)?;
        let link = actions.require_href(record::ANNOTATION_ACTION)?.to_string();

        {
            let (mut window, config) = open_window(sei, &link)?;
            let timeout = config.timeouts.element();
            window.wait_and_fill(&annotation::TEXT, &params.text, timeout)?;
            set_checkbox(&mut *window, &annotation::PRIORITY, params.priority, timeout)?;
            window.wait_and_click(&annotation::SAVE, timeout)?;
        }

        sei.update_tag(&target.id, tags::ANNOTATION, &params.text);
        sei.update_tag(&target.id, tags::ANNOTATION_LINK, "");
        log::info!("Updated annotation of record {}", target.id);

        Ok(WorkflowResult::success_with(serde_json::json!({
            "record": target.id,
            "annotation": params.text,
            "priority": params.priority,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakeDriver, FakePage};
    use crate::error::SeiError;
    use crate::session::Record;
    use crate::session::testing::{portal, session};

    const ANNOTATION: &str = "https://sei.test/sei/controlador.php?acao=anotacao_registrar&id=1";

    fn annotation_portal(priority_checked: bool) -> FakeDriver {
        let mut fake = portal();
        let checked = if priority_checked { " checked" } else { "" };
        fake.add_page(
            ANNOTATION,
            FakePage::new(
                "SEI - Anotações",
                format!(
                    r#"<textarea id="txaDescricao">antiga</textarea>
                       <input type="checkbox" id="chkSinPrioridade"{}>
                       <button id="sbmRegistrarAnotacao">Salvar</button>"#,
                    checked
                ),
            ),
        );
        fake
    }

    fn params(text: &str, priority: bool) -> EditAnnotationParams {
        EditAnnotationParams { record: "53500.000001/2024-01".to_string(), text: text.to_string(), priority }
    }

    #[test]
    fn test_edit_annotation_updates_tags() {
        let mut sei = session(annotation_portal(false));
        let mut indexed = Record::new("53500.000001/2024-01");
        indexed.set_tag(tags::ANNOTATION_LINK, "controlador.php?acao=anotacao_registrar&id=1");
        sei.records_mut().insert(indexed.with_link("controlador.php?acao=procedimento_trabalhar&id=1"));

        let params = params("Aguardando resposta", true);
        EditAnnotationWorkflow.execute_typed(params, &mut WorkflowContext::new(&mut sei)).unwrap();

        assert!(sei.driver().logged("fill id=txaDescricao=Aguardando resposta"));
        assert!(sei.driver().logged("click id=chkSinPrioridade"));
        assert!(sei.driver().logged("click id=sbmRegistrarAnotacao"));
        let record = sei.records().get("53500.000001/2024-01").unwrap();
        assert_eq!(record.annotation(), Some("Aguardando resposta"));
        assert_eq!(record.tag(tags::ANNOTATION_LINK), Some(""));
        assert_eq!(sei.driver().window_handles().unwrap().len(), 1);
    }

    #[test]
    fn test_edit_annotation_clears_priority() {
        let mut sei = session(annotation_portal(true));
        EditAnnotationWorkflow.execute_typed(params("", false), &mut WorkflowContext::new(&mut sei)).unwrap();
        assert!(sei.driver().logged("click id=chkSinPrioridade"));

        let mut sei = session(annotation_portal(true));
        EditAnnotationWorkflow.execute_typed(params("", true), &mut WorkflowContext::new(&mut sei)).unwrap();
        assert!(!sei.driver().logged("click id=chkSinPrioridade"));
    }

    #[test]
    fn test_edit_annotation_window_missing_save() {
        let mut fake = annotation_portal(false);
        fake.set_html(ANNOTATION, None, r#"<textarea id="txaDescricao"></textarea><input type="checkbox" id="chkSinPrioridade">"#);
        let mut sei = session(fake);

        let result = EditAnnotationWorkflow.execute_typed(params("x", false), &mut WorkflowContext::new(&mut sei));
        assert!(matches!(result, Err(SeiError::ElementTimeout(_))));
        assert_eq!(sei.driver().current_window().unwrap(), "w0");
        assert_eq!(sei.driver().window_handles().unwrap().len(), 1);
    }

    #[test]
    fn test_step_failures_restore_origin() {
        crate::workflows::testing::assert_step_failures_restore_origin::<EditAnnotationWorkflow>(
            || annotation_portal(false),
            params("Aguardando resposta", true),
        );
    }
}
