use crate::browser::driver::PageDriver;
use crate::dom::actions::ActionMap;
use crate::error::Result;
use crate::locators::{progress, record};
use crate::session::SeiSession;
use crate::workflows::{Workflow, WorkflowContext, WorkflowResult, open_window, open_with_actions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the update_progress workflow
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateProgressParams {
    /// Record number
    pub record: String,

    /// Progress note ("andamento") to register
    pub text: String,
}

/// Workflow for registering a progress note on a record
#[derive(Default)]
pub struct UpdateProgressWorkflow;

impl Workflow for UpdateProgressWorkflow {
    type Params = UpdateProgressParams;

    fn name(&self) -> &str {
        "update_progress"
    }

    fn execute_typed<D: PageDriver>(
        &self,
        params: UpdateProgressParams,
        context: &mut WorkflowContext<'_, D>,
    ) -> Result<WorkflowResult> {
        let sei = &mut *context.sei;
        let (target, actions) = open_with_actions(sei, &params.record)?;
        register_progress(sei, &actions, &params.text)?;

        Ok(WorkflowResult::success_with(serde_json::json!({
            "record": target.id,
            "text": params.text,
        })))
    }
}

/// Submit `text` through the "Atualizar Andamento" window of the record page shown
pub(crate) fn register_progress<D: PageDriver>(sei: &mut SeiSession<D>, actions: &ActionMap, text: &str) -> Result<()> {
    sei.require_record_page()?;
    let link = actions.require_href(record::PROGRESS_ACTION)?.to_string();

    let (mut window, config) = open_window(sei, &link)?;
    let timeout = config.timeouts.element();
    window.wait_and_fill(&progress::TEXT, text, timeout)?;
    window.wait_and_click(&progress::SAVE, timeout)?;
    log::debug!("Registered progress note '{}'", text);
    Ok(())
}
