use crate::browser::driver::PageDriver;
use crate::error::Result;
use crate::session::{Record, SeiSession};
use crate::workflows::send_to_unit::{Destination, send_record};
use crate::workflows::update_progress::register_progress;
use crate::workflows::{Workflow, WorkflowContext, WorkflowResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the expedite_letter workflow
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExpediteLetterParams {
    /// Record number
    pub record: String,

    /// Document number of the signed letter (e.g. "1234567")
    pub document: String,
}

/// Workflow for dispatching a signed letter through the seat unit
///
/// Registers a progress note naming the letter, then sends the record to the
/// configured seat unit, kept open, with the configured return deadline.
#[derive(Default)]
pub struct ExpediteLetterWorkflow;

impl Workflow for ExpediteLetterWorkflow {
    type Params = ExpediteLetterParams;

    fn name(&self) -> &str {
        "expedite_letter"
    }

    fn execute_typed<D: PageDriver>(
        &self,
        params: ExpediteLetterParams,
        context: &mut WorkflowContext<'_, D>,
    ) -> Result<WorkflowResult> {
        let sei = &mut *context.sei;
        let mut target = sei.open_record(&params.record)?;
        let note = expedite(sei, &mut target, &params.document)?;

        Ok(WorkflowResult::success_with(serde_json::json!({
            "record": target.id,
            "document": params.document,
            "progress_note": note,
        })))
    }
}

/// Expedite `document` of the record page currently shown; returns the progress note
pub(crate) fn expedite<D: PageDriver>(sei: &mut SeiSession<D>, target: &mut Record, document: &str) -> Result<String> {
    let label = sei.document_label(document)?;
    let note = {
        let progress_note = &sei.config().progress_note;
        format!("{}{}{}", progress_note.prefix, label, progress_note.suffix)
    };

    let actions = sei.actions_for(target, None)?;
    register_progress(sei, &actions, &note)?;

    let seat = sei.config().seat.clone();
    let destination = Destination {
        acronym: &seat.acronym,
        title: &seat.title,
        keep_open: true,
        return_days: Some(sei.config().return_days),
    };
    send_record(sei, &actions, &destination)?;

    log::info!("Expedited {} of record {} to {}", label, target.id, seat.acronym);
    Ok(note)
}
