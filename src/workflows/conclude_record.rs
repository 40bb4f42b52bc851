use crate::browser::driver::PageDriver;
use crate::browser::scope::FrameScope;
use crate::error::Result;
use crate::locators::record;
use crate::workflows::{Workflow, WorkflowContext, WorkflowResult, open_with_actions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the conclude_record workflow
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConcludeRecordParams {
    /// Record number
    pub record: String,
}

/// Workflow for concluding a record in the current unit
#[derive(Default)]
pub struct ConcludeRecordWorkflow;

impl Workflow for ConcludeRecordWorkflow {
    type Params = ConcludeRecordParams;

    fn name(&self) -> &str {
        "conclude_record"
    }

    fn execute_typed<D: PageDriver>(
        &self,
        params: ConcludeRecordParams,
        context: &mut WorkflowContext<'_, D>,
    ) -> Result<WorkflowResult> {
        let sei = &mut *context.sei;
        let (target, actions) = open_with_actions(sei, &params.record)?;
        let script = actions.require_script(record::CONCLUDE_ACTION)?.to_string();

        {
            let (driver, config) = sei.split();
            let mut central = FrameScope::enter(driver, &config.frames.central, config.timeouts.frame())?;
            central.accept_dialogs()?;
            central.execute_script(&script)?;
        }

        let unindexed = sei.records_mut().remove(&target.id).is_some();
        log::info!("Concluded record {}", target.id);

        Ok(WorkflowResult::success_with(serde_json::json!({
            "record": target.id,
            "removed_from_index": unindexed,
        })))
    }
}
