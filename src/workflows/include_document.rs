use crate::browser::driver::PageDriver;
use crate::dom::actions::ActionMap;
use crate::error::Result;
use crate::locators::{Locator, record};
use crate::session::SeiSession;
use crate::workflows::{Workflow, WorkflowContext, WorkflowResult, open_with_actions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the include_document workflow
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IncludeDocumentParams {
    /// Record number
    pub record: String,

    /// Document type, one of the configured document types
    pub document_type: String,
}

/// Workflow for opening the form of a new document in a record
#[derive(Default)]
pub struct IncludeDocumentWorkflow;

impl Workflow for IncludeDocumentWorkflow {
    type Params = IncludeDocumentParams;

    fn name(&self) -> &str {
        "include_document"
    }

    fn execute_typed<D: PageDriver>(
        &self,
        params: IncludeDocumentParams,
        context: &mut WorkflowContext<'_, D>,
    ) -> Result<WorkflowResult> {
        let sei = &mut *context.sei;
        sei.config().allowed.check_document_type(&params.document_type)?;

        let (target, actions) = open_with_actions(sei, &params.record)?;
        open_document_form(sei, &actions, &params.document_type)?;

        Ok(WorkflowResult::success_with(serde_json::json!({
            "record": target.id,
            "document_type": params.document_type,
        })))
    }
}

/// Follow "Incluir Documento" and pick `document_type` from the type list
///
/// The type must already be validated against the allowed set.
pub(crate) fn open_document_form<D: PageDriver>(
    sei: &mut SeiSession<D>,
    actions: &ActionMap,
    document_type: &str,
) -> Result<()> {
    let link = actions.require_href(record::INCLUDE_DOCUMENT_ACTION)?.to_string();
    sei.go(&link)?;

    let timeout = sei.config().timeouts.element();
    sei.driver_mut().wait_and_click(&Locator::link_text(document_type), timeout)?;
    log::debug!("Opened '{}' document form", document_type);
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::browser::fake::{FakeDriver, FakePage, Reaction};
    use crate::locators::Locator;
    use crate::workflows::testing::record_portal;

    pub const CHOOSE_TYPE: &str = "https://sei.test/sei/controlador.php?acao=documento_escolher_tipo&id=1";

    /// Record portal with the document type list; each type links to `forms[type]`
    pub fn document_portal(forms: &[(&str, &str, FakePage)]) -> FakeDriver {
        let mut fake = record_portal();
        let links: String = ["Ofício", "Externo", "Despacho"]
            .iter()
            .map(|kind| format!(r##"<li><a href="#">{}</a></li>"##, kind))
            .collect();
        fake.add_page(CHOOSE_TYPE, FakePage::new("SEI - Gerar Documento", format!("<ul>{}</ul>", links)));
        for (kind, url, page) in forms {
            fake.add_page(*url, page.clone());
            fake.on_click(&Locator::link_text(*kind), Reaction::Navigate(url.to_string()));
        }
        fake
    }
}
