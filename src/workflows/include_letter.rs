use crate::browser::driver::PageDriver;
use crate::browser::scope::{FrameScope, WindowScope};
use crate::error::{Result, SeiError};
use crate::locators::letter;
use crate::workflows::access::{AccessLevel, LETTER_FORM};
use crate::workflows::include_document::open_document_form;
use crate::workflows::{Workflow, WorkflowContext, WorkflowResult, open_with_actions, return_to_record};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Parameters for the include_letter workflow
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IncludeLetterParams {
    /// Record number
    pub record: String,

    /// Standard text the letter starts from, one of the configured templates
    pub template: String,

    /// Access level; confidential letters are refused (default: public)
    #[serde(default)]
    pub access: AccessLevel,

    /// Legal hypothesis, required for restricted letters
    #[serde(default)]
    pub legal_hypothesis: Option<String>,

    /// Placeholder text → replacement for paragraphs of the template
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

/// Workflow for adding an internal letter ("Ofício") to a record
#[derive(Default)]
pub struct IncludeLetterWorkflow;

impl Workflow for IncludeLetterWorkflow {
    type Params = IncludeLetterParams;

    fn name(&self) -> &str {
        "include_letter"
    }

    fn execute_typed<D: PageDriver>(
        &self,
        params: IncludeLetterParams,
        context: &mut WorkflowContext<'_, D>,
    ) -> Result<WorkflowResult> {
        let sei = &mut *context.sei;
        let hypothesis = params.legal_hypothesis.as_deref();
        {
            let allowed = &sei.config().allowed;
            allowed.check_letter_template(&params.template)?;
            allowed.check_document_type(letter::DOCUMENT_TYPE)?;
            params.access.validate(&LETTER_FORM, hypothesis, allowed)?;
        }

        let (target, actions) = open_with_actions(sei, &params.record)?;
        open_document_form(sei, &actions, letter::DOCUMENT_TYPE)?;

        {
            let (driver, config) = sei.split();
            let timeout = config.timeouts.element();
            driver.wait_and_click(&letter::STANDARD_TEXT, timeout)?;
            driver.wait_and_select(&letter::TEMPLATES, &params.template, timeout)?;
            params.access.apply(driver, &LETTER_FORM, hypothesis, timeout)?;

            let mut editor =
                WindowScope::follow(driver, config.timeouts.popup(), |d| d.wait_and_click(&letter::SUBMIT, timeout))?;
            if !params.fields.is_empty() {
                editor.wait_for_element(&letter::EDITOR, timeout)?;
                {
                    let mut body = FrameScope::enter(&mut *editor, &config.frames.editor_body, config.timeouts.frame())?;
                    for (placeholder, value) in &params.fields {
                        fill_placeholder(&mut *body, placeholder, value)?;
                    }
                }
                editor.wait_and_click(&letter::EDITOR_SAVE, timeout)?;
            }
        }

        return_to_record(sei, &target)?;
        log::info!("Included letter '{}' in record {}", params.template, target.id);

        Ok(WorkflowResult::success_with(serde_json::json!({
            "record": target.id,
            "template": params.template,
            "fields": params.fields.len(),
        })))
    }
}

/// Replace the paragraph containing `placeholder` with `value`
fn fill_placeholder<D: PageDriver + ?Sized>(driver: &mut D, placeholder: &str, value: &str) -> Result<()> {
    let script = placeholder_script(placeholder, value)?;
    match driver.execute_script(&script)? {
        Value::Bool(false) => Err(SeiError::NotFound(format!("placeholder '{}'", placeholder))),
        _ => {
            log::debug!("Filled placeholder '{}'", placeholder);
            Ok(())
        }
    }
}

fn placeholder_script(placeholder: &str, value: &str) -> Result<String> {
    let quote = |text: &str| serde_json::to_string(text).map_err(|e| SeiError::EvaluationFailed(e.to_string()));
    Ok(format!(
        "(function(placeholder, value) {{ \
            const paragraph = Array.from(document.querySelectorAll('p')).find(p => p.textContent.includes(placeholder)); \
            if (!paragraph) {{ return false; }} \
            paragraph.innerHTML = value; \
            return true; \
        }})({}, {})",
        quote(placeholder)?,
        quote(value)?
    ))
}
