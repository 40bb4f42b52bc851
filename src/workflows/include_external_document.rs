use crate::browser::driver::PageDriver;
use crate::error::{Result, SeiError};
use crate::locators::external_document;
use crate::workflows::access::{AccessLevel, EXTERNAL_DOCUMENT_FORM};
use crate::workflows::include_document::open_document_form;
use crate::workflows::{Workflow, WorkflowContext, WorkflowResult, open_with_actions, return_to_record};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Date format of the "Data do Documento" field
const DATE_FORMAT: &str = "%d%m%Y";

/// Parameters for the include_external_document workflow
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IncludeExternalDocumentParams {
    /// Record number
    pub record: String,

    /// Series of the external document as listed in the type select (e.g. "Requerimento")
    pub document_type: String,

    /// Local path of the file to upload
    pub file: String,

    /// Text shown next to the document in the tree
    #[serde(default)]
    pub tree_label: Option<String>,

    /// Mark the file as born digital (default: true)
    #[serde(default = "default_born_digital")]
    pub born_digital: bool,

    /// Access level; confidential documents are refused (default: public)
    #[serde(default)]
    pub access: AccessLevel,

    /// Legal hypothesis, required for restricted documents
    #[serde(default)]
    pub legal_hypothesis: Option<String>,
}

fn default_born_digital() -> bool {
    true
}

/// Workflow for uploading an external document to a record
#[derive(Default)]
pub struct IncludeExternalDocumentWorkflow;

impl Workflow for IncludeExternalDocumentWorkflow {
    type Params = IncludeExternalDocumentParams;

    fn name(&self) -> &str {
        "include_external_document"
    }

    fn execute_typed<D: PageDriver>(
        &self,
        params: IncludeExternalDocumentParams,
        context: &mut WorkflowContext<'_, D>,
    ) -> Result<WorkflowResult> {
        let sei = &mut *context.sei;
        let hypothesis = params.legal_hypothesis.as_deref();
        {
            let allowed = &sei.config().allowed;
            allowed.check_document_type(external_document::DOCUMENT_TYPE)?;
            params.access.validate(&EXTERNAL_DOCUMENT_FORM, hypothesis, allowed)?;
        }
        if !Path::new(&params.file).is_file() {
            return Err(SeiError::NotFound(format!("file {}", params.file)));
        }

        let (target, actions) = open_with_actions(sei, &params.record)?;
        open_document_form(sei, &actions, external_document::DOCUMENT_TYPE)?;

        let today = chrono::Local::now().format(DATE_FORMAT).to_string();
        {
            let (driver, config) = sei.split();
            let timeout = config.timeouts.element();
            driver.wait_and_select(&external_document::TYPE, &params.document_type, timeout)?;
            driver.wait_and_fill(&external_document::DATE, &today, timeout)?;
            if let Some(label) = &params.tree_label {
                driver.wait_and_fill(&external_document::TREE_LABEL, label, timeout)?;
            }
            if params.born_digital {
                driver.wait_and_click(&external_document::BORN_DIGITAL, timeout)?;
            }
            params.access.apply(driver, &EXTERNAL_DOCUMENT_FORM, hypothesis, timeout)?;

            driver.wait_for_element(&external_document::FILE, timeout)?;
            driver.upload_file(&external_document::FILE, &params.file)?;
            driver.wait_and_click(&external_document::SUBMIT, timeout)?;
        }

        return_to_record(sei, &target)?;
        log::info!("Uploaded {} to record {}", params.file, target.id);

        Ok(WorkflowResult::success_with(serde_json::json!({
            "record": target.id,
            "document_type": params.document_type,
            "date": today,
        })))
    }
}
