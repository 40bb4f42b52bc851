use crate::browser::driver::{PageDriver, poll_until};
use crate::browser::scope::WindowScope;
use crate::dom::snapshot::{HtmlSnapshot, text};
use crate::error::Result;
use crate::locators::{interested, record};
use crate::session::fold_accents;
use crate::workflows::{Workflow, WorkflowContext, WorkflowResult, open_with_actions, return_to_record};
use schemars::JsonSchema;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static FIRST_RESULT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#chkInfraItem0").expect("valid selector"));

/// Parameters for the add_interested workflow
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AddInterestedParams {
    /// Record number
    pub record: String,

    /// Search terms of the interested parties (name or CPF/CNPJ)
    pub parties: Vec<String>,

    /// Only add parties already present in the contact directory (default: false)
    #[serde(default)]
    pub check_contacts: bool,
}

/// Workflow for adding interested parties to a record
///
/// Each party is searched in the contact picker and its first result is
/// transferred once that row names the party; parties without such a result
/// are reported in `not_found`.
#[derive(Default)]
pub struct AddInterestedWorkflow;

impl Workflow for AddInterestedWorkflow {
    type Params = AddInterestedParams;

    fn name(&self) -> &str {
        "add_interested"
    }

    fn execute_typed<D: PageDriver>(
        &self,
        params: AddInterestedParams,
        context: &mut WorkflowContext<'_, D>,
    ) -> Result<WorkflowResult> {
        let sei = &mut *context.sei;

        let mut not_found = Vec::new();
        let mut parties = Vec::new();
        for party in params.parties {
            if params.check_contacts && sei.search_contact(&party)?.is_none() {
                log::warn!("'{}' is not in the contact directory", party);
                not_found.push(party);
            } else {
                parties.push(party);
            }
        }

        let (target, actions) = open_with_actions(sei, &params.record)?;
        let link = actions.require_href(record::EDIT_RECORD_ACTION)?.to_string();
        sei.go(&link)?;

        let mut added = Vec::new();
        {
            let (driver, config) = sei.split();
            let timeout = config.timeouts.element();
            let mut picker =
                WindowScope::follow(driver, config.timeouts.popup(), |d| d.wait_and_click(&interested::PICKER, timeout))?;

            for party in parties {
                picker.wait_and_fill(&interested::SEARCH_INPUT, &party, timeout)?;
                picker.wait_and_click(&interested::SEARCH, timeout)?;
                // the previous party's rows stay on screen until the search reloads the list
                let listed = poll_until(timeout, picker.poll_interval(), || {
                    let source = picker.page_source().ok()?;
                    first_result_names(&source, &party).then_some(())
                });
                if listed.is_some() {
                    picker.click(&interested::FIRST_RESULT)?;
                    picker.wait_and_click(&interested::TRANSFER, timeout)?;
                    added.push(party);
                } else {
                    log::warn!("No picker result for '{}'", party);
                    not_found.push(party);
                }
            }
            picker.wait_and_click(&interested::CLOSE, timeout)?;
        }

        let timeout = sei.config().timeouts.element();
        sei.driver_mut().wait_and_click(&interested::SAVE, timeout)?;
        return_to_record(sei, &target)?;
        log::info!("Added {} interested parties to record {}", added.len(), target.id);

        Ok(WorkflowResult::success_with(serde_json::json!({
            "record": target.id,
            "added": added,
            "not_found": not_found,
        })))
    }
}

/// Whether the picker's first result row names `party`
///
/// Names are compared without accents or case; CPF/CNPJ terms also match on
/// their digits alone.
fn first_result_names(html: &str, party: &str) -> bool {
    let snapshot = HtmlSnapshot::parse(html);
    let Ok(rows) = snapshot.select(interested::RESULT_ROWS) else {
        return false;
    };
    let Some(row) = rows.into_iter().find(|row| row.select(&FIRST_RESULT).next().is_some()) else {
        return false;
    };

    let row = text(row);
    if fold_accents(&row).to_lowercase().contains(&fold_accents(party.trim()).to_lowercase()) {
        return true;
    }
    let digits = |s: &str| s.chars().filter(char::is_ascii_digit).collect::<String>();
    let wanted = digits(party);
    !wanted.is_empty() && digits(&row).contains(&wanted)
}
