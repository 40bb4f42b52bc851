use crate::browser::driver::{PageDriver, poll_until};
use crate::browser::scope::WindowScope;
use crate::dom::actions::ActionMap;
use crate::dom::snapshot::HtmlSnapshot;
use crate::error::{Result, SeiError};
use crate::locators::{By, Locator, record, send};
use crate::session::{SeiSession, expect_title};
use crate::workflows::{Workflow, WorkflowContext, WorkflowResult, open_window, open_with_actions, set_checkbox};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters for the send_to_unit workflow
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SendToUnitParams {
    /// Record number
    pub record: String,

    /// Acronym typed into the unit picker
    pub unit_acronym: String,

    /// Exact title of the unit in the picker results
    pub unit_title: String,

    /// Keep the record open in the current unit (default: false)
    #[serde(default)]
    pub keep_open: bool,

    /// Return deadline, in business days
    #[serde(default)]
    pub return_days: Option<u32>,
}

/// Workflow for sending a record to another unit
#[derive(Default)]
pub struct SendToUnitWorkflow;

impl Workflow for SendToUnitWorkflow {
    type Params = SendToUnitParams;

    fn name(&self) -> &str {
        "send_to_unit"
    }

    fn execute_typed<D: PageDriver>(
        &self,
        params: SendToUnitParams,
        context: &mut WorkflowContext<'_, D>,
    ) -> Result<WorkflowResult> {
        let sei = &mut *context.sei;
        let (target, actions) = open_with_actions(sei, &params.record)?;

        let destination = Destination {
            acronym: &params.unit_acronym,
            title: &params.unit_title,
            keep_open: params.keep_open,
            return_days: params.return_days,
        };
        send_record(sei, &actions, &destination)?;
        log::info!("Sent record {} to {}", target.id, params.unit_acronym);

        Ok(WorkflowResult::success_with(serde_json::json!({
            "record": target.id,
            "unit": params.unit_acronym,
            "keep_open": params.keep_open,
            "return_days": params.return_days,
        })))
    }
}

/// Where and how a record is sent
pub(crate) struct Destination<'a> {
    pub acronym: &'a str,
    pub title: &'a str,
    pub keep_open: bool,
    pub return_days: Option<u32>,
}

/// Fill and submit the "Enviar Processo" window of the record page currently shown
pub(crate) fn send_record<D: PageDriver>(
    sei: &mut SeiSession<D>,
    actions: &ActionMap,
    destination: &Destination<'_>,
) -> Result<()> {
    sei.require_record_page()?;
    let link = actions.require_href(record::SEND_ACTION)?.to_string();

    let (mut window, config) = open_window(sei, &link)?;
    let timeout = config.timeouts.element();
    expect_title(&*window, &config.titles.send, timeout)?;

    {
        let mut picker =
            WindowScope::follow(&mut *window, config.timeouts.popup(), |d| d.wait_and_click(&send::UNIT_PICKER, timeout))?;
        expect_title(&*picker, &config.titles.unit_picker, timeout)?;
        picker.wait_and_fill(&send::UNIT_ACRONYM, destination.acronym, timeout)?;
        picker.press_enter(&send::UNIT_ACRONYM)?;
        pick_unit(&mut *picker, destination.title, timeout)?;
        picker.wait_and_click(&send::TRANSFER, timeout)?;
    }

    if destination.keep_open {
        set_checkbox(&mut *window, &send::KEEP_OPEN, true, timeout)?;
    }
    if let Some(days) = destination.return_days {
        window.wait_and_click(&send::RETURN_DAYS_OPTION, timeout)?;
        window.wait_and_fill(&send::RETURN_DAYS, &days.to_string(), timeout)?;
        set_checkbox(&mut *window, &send::BUSINESS_DAYS, true, timeout)?;
    }
    window.wait_and_click(&send::SEND, timeout)
}

/// Click the picker result whose `title` is exactly `title`
fn pick_unit<D: PageDriver + ?Sized>(driver: &mut D, title: &str, timeout: Duration) -> Result<()> {
    let target = poll_until(timeout, driver.poll_interval(), || {
        let snapshot = HtmlSnapshot::parse(&driver.page_source().ok()?);
        let candidate = snapshot
            .select(send::UNIT_CANDIDATES)
            .ok()?
            .into_iter()
            .find(|element| element.value().attr("title") == Some(title))?;
        Some(match candidate.value().attr("id") {
            Some(id) => Locator::element_id(id),
            None => Locator::owned(By::Css, format!("[title=\"{}\"]", title.replace('"', "\\\""))),
        })
    })
    .ok_or_else(|| SeiError::UnitNotFound(title.to_string()))?;

    log::debug!("Unit '{}' found at {}", title, target);
    driver.click(&target)
}
