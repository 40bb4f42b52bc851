use crate::browser::driver::PageDriver;
use crate::dom::listing::tags;
use crate::error::Result;
use crate::locators::{Locator, marker, record};
use crate::workflows::{Workflow, WorkflowContext, WorkflowResult, open_window, open_with_actions, return_to_record};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the edit_marker workflow
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EditMarkerParams {
    /// Record number
    pub record: String,

    /// Marker name as listed in the marker dropdown
    pub marker: String,

    /// Marker text
    #[serde(default)]
    pub text: String,
}

/// Workflow for setting a record's marker
#[derive(Default)]
pub struct EditMarkerWorkflow;

impl Workflow for EditMarkerWorkflow {
    type Params = EditMarkerParams;

    fn name(&self) -> &str {
        "edit_marker"
    }

    fn execute_typed<D: PageDriver>(
        &self,
        params: EditMarkerParams,
        context: &mut WorkflowContext<'_, D>,
    ) -> Result<WorkflowResult> {
        let sei = &mut *context.sei;
        let (target, actions) = open_with_actions(sei, &params.record)?;
        let link = actions.require_href(record::MARKER_ACTION)?.to_string();

        {
            let (mut window, config) = open_window(sei, &link)?;
            let timeout = config.timeouts.element();
            window.wait_and_click(&marker::SELECT, timeout)?;
            window.wait_and_click(&Locator::link_text(params.marker.as_str()), timeout)?;
            window.wait_and_fill(&marker::TEXT, &params.text, timeout)?;
            window.wait_and_click(&marker::SAVE, timeout)?;
        }

        return_to_record(sei, &target)?;
        sei.update_tag(&target.id, tags::MARKER, &params.marker);
        log::info!("Marked record {} as '{}'", target.id, params.marker);

        Ok(WorkflowResult::success_with(serde_json::json!({
            "record": target.id,
            "marker": params.marker,
        })))
    }
}
