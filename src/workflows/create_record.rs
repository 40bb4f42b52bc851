use crate::browser::driver::PageDriver;
use crate::error::{Result, SeiError};
use crate::locators::{Locator, create_record, menu};
use crate::session::expect_title;
use crate::workflows::access::{AccessLevel, RECORD_FORM};
use crate::workflows::{Workflow, WorkflowContext, WorkflowResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the create_record workflow
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateRecordParams {
    /// Record type, one of the configured record types
    pub record_type: String,

    /// Short description ("Especificação")
    #[serde(default)]
    pub description: Option<String>,

    /// Access level (default: public)
    #[serde(default)]
    pub access: AccessLevel,

    /// Legal hypothesis, required for restricted records
    #[serde(default)]
    pub legal_hypothesis: Option<String>,
}

/// Workflow for starting a new record from the side menu
///
/// Returns the number the portal assigned, read from the new record's tree.
#[derive(Default)]
pub struct CreateRecordWorkflow;

impl Workflow for CreateRecordWorkflow {
    type Params = CreateRecordParams;

    fn name(&self) -> &str {
        "create_record"
    }

    fn execute_typed<D: PageDriver>(
        &self,
        params: CreateRecordParams,
        context: &mut WorkflowContext<'_, D>,
    ) -> Result<WorkflowResult> {
        let sei = &mut *context.sei;
        let hypothesis = params.legal_hypothesis.as_deref();
        {
            let allowed = &sei.config().allowed;
            allowed.check_record_type(&params.record_type)?;
            params.access.validate(&RECORD_FORM, hypothesis, allowed)?;
        }

        if !sei.is_init_page()? {
            sei.go_to_init_page()?;
        }
        sei.show_side_menu()?;

        {
            let (driver, config) = sei.split();
            let timeout = config.timeouts.element();
            driver.wait_and_click(&menu::START_RECORD, timeout)?;
            driver.wait_and_fill(&create_record::TYPE_FILTER, &params.record_type, timeout)?;
            driver.wait_and_click(&Locator::link_text(params.record_type.as_str()), timeout)?;
            if let Some(description) = &params.description {
                driver.wait_and_fill(&create_record::DESCRIPTION, description, timeout)?;
            }
            params.access.apply(driver, &RECORD_FORM, hypothesis, timeout)?;
            driver.wait_and_click(&create_record::SAVE, timeout)?;
            expect_title(driver, &config.titles.record, timeout)?;
        }

        let number = sei
            .record_tree()?
            .nodes()
            .first()
            .map(|node| node.label.clone())
            .ok_or_else(|| SeiError::NotFound("new record in the tree".to_string()))?;
        log::info!("Created record {} ({})", number, params.record_type);

        Ok(WorkflowResult::success_with(serde_json::json!({
            "record": number,
            "record_type": params.record_type,
        })))
    }
}
