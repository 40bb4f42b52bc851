use crate::browser::driver::PageDriver;
use crate::dom::listing::tags;
use crate::error::Result;
use crate::locators::{record, tracking};
use crate::workflows::{Workflow, WorkflowContext, WorkflowResult, open_window, open_with_actions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the remove_special_tracking workflow
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RemoveSpecialTrackingParams {
    /// Record number
    pub record: String,
}

/// Workflow for deleting a record's special tracking ("Acompanhamento Especial")
///
/// Records without tracking are left alone and reported with `removed: false`.
#[derive(Default)]
pub struct RemoveSpecialTrackingWorkflow;

impl Workflow for RemoveSpecialTrackingWorkflow {
    type Params = RemoveSpecialTrackingParams;

    fn name(&self) -> &str {
        "remove_special_tracking"
    }

    fn execute_typed<D: PageDriver>(
        &self,
        params: RemoveSpecialTrackingParams,
        context: &mut WorkflowContext<'_, D>,
    ) -> Result<WorkflowResult> {
        let sei = &mut *context.sei;
        let (target, actions) = open_with_actions(sei, &params.record)?;

        let removed = match actions.get(record::TRACKING_ACTION).and_then(|entry| entry.action.href()) {
            None => false,
            Some(link) => {
                let link = link.to_string();
                let (mut window, _) = open_window(sei, &link)?;
                if window.element_exists(&tracking::DELETE)? {
                    window.accept_dialogs()?;
                    window.click(&tracking::DELETE)?;
                    true
                } else {
                    false
                }
            }
        };

        if removed {
            sei.update_tag(&target.id, tags::SPECIAL_TRACKING, "");
            log::info!("Removed special tracking of record {}", target.id);
        } else {
            log::debug!("Record {} has no special tracking", target.id);
        }

        Ok(WorkflowResult::success_with(serde_json::json!({
            "record": target.id,
            "removed": removed,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::FakePage;
    use crate::session::Record;
    use crate::session::testing::{RECORD, actions_html, portal, session};

    const TRACKING: &str = "https://sei.test/sei/controlador.php?acao=acompanhamento_gerenciar&id=1";

    fn params() -> RemoveSpecialTrackingParams {
        RemoveSpecialTrackingParams { record: "53500.000001/2024-01".to_string() }
    }

    #[test]
    fn test_remove_special_tracking() {
        let mut fake = portal();
        fake.add_page(TRACKING, FakePage::new("SEI - Acompanhamento Especial", r#"<button id="btnExcluir">Excluir</button>"#));
        let mut sei = session(fake);
        let mut indexed = Record::new("53500.000001/2024-01");
        indexed.set_tag(tags::SPECIAL_TRACKING, "Acompanhamento Especial");
        sei.records_mut().insert(indexed);

        let result = RemoveSpecialTrackingWorkflow.execute_typed(params(), &mut WorkflowContext::new(&mut sei)).unwrap();

        assert_eq!(result.data.unwrap()["removed"], true);
        let log = sei.driver().log();
        let dialogs = log.iter().rposition(|e| e == "accept dialogs").unwrap();
        let delete = log.iter().position(|e| e == "click id=btnExcluir").unwrap();
        assert!(dialogs < delete);
        assert_eq!(sei.records().get("53500.000001/2024-01").unwrap().tag(tags::SPECIAL_TRACKING), Some(""));
        assert_eq!(sei.driver().window_handles().unwrap(), vec!["w0".to_string()]);
    }

    #[test]
    fn test_without_tracking_action() {
        let mut fake = portal();
        let without = actions_html().replace(
            r#"<a href="controlador.php?acao=acompanhamento_gerenciar&id=1"><img title="Acompanhamento Especial"></a>"#,
            "",
        );
        fake.set_html(RECORD, Some("ifrVisualizacao"), without);
        let mut sei = session(fake);

        let result = RemoveSpecialTrackingWorkflow.execute_typed(params(), &mut WorkflowContext::new(&mut sei)).unwrap();
        assert_eq!(result.data.unwrap()["removed"], false);
        assert!(!sei.driver().log().iter().any(|e| e.starts_with("open ")));
    }

    #[test]
    fn test_tracking_window_without_delete_button() {
        let mut fake = portal();
        fake.add_page(TRACKING, FakePage::new("SEI - Acompanhamento Especial", "<p>Nenhum acompanhamento</p>"));
        let mut sei = session(fake);

        let result = RemoveSpecialTrackingWorkflow.execute_typed(params(), &mut WorkflowContext::new(&mut sei)).unwrap();
        assert_eq!(result.data.unwrap()["removed"], false);
        assert_eq!(sei.driver().current_window().unwrap(), "w0");
    }

    #[test]
    fn test_step_failures_restore_origin() {
        let tracking_portal = || {
            let mut fake = portal();
            fake.add_page(TRACKING, FakePage::new("SEI - Acompanhamento Especial", r#"<button id="btnExcluir">Excluir</button>"#));
            fake
        };
        crate::workflows::testing::assert_step_failures_restore_origin::<RemoveSpecialTrackingWorkflow>(tracking_portal, params());
    }
}
