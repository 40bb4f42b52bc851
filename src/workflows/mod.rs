//! Portal workflows
//!
//! Each workflow is a multi-step routine over one [`SeiSession`], typed by its
//! parameters and runnable by name with JSON parameters through a
//! [`WorkflowRegistry`]. Secondary windows are always held by a
//! [`WindowScope`], so a failing step leaves the cursor on the window the
//! workflow started from.

pub mod access;
pub mod add_interested;
pub mod conclude_record;
pub mod contacts;
pub mod create_record;
pub mod edit_annotation;
pub mod edit_marker;
pub mod expedite_block;
pub mod expedite_letter;
pub mod include_document;
pub mod include_external_document;
pub mod include_letter;
pub mod remove_special_tracking;
pub mod send_to_unit;
pub mod update_progress;

pub use access::AccessLevel;
pub use add_interested::{AddInterestedParams, AddInterestedWorkflow};
pub use conclude_record::{ConcludeRecordParams, ConcludeRecordWorkflow};
pub use contacts::{
    ContactData, Gender, SearchContactParams, SearchContactWorkflow, UpsertContactParams, UpsertContactWorkflow,
};
pub use create_record::{CreateRecordParams, CreateRecordWorkflow};
pub use edit_annotation::{EditAnnotationParams, EditAnnotationWorkflow};
pub use edit_marker::{EditMarkerParams, EditMarkerWorkflow};
pub use expedite_block::{ExpediteBlockParams, ExpediteBlockWorkflow};
pub use expedite_letter::{ExpediteLetterParams, ExpediteLetterWorkflow};
pub use include_document::{IncludeDocumentParams, IncludeDocumentWorkflow};
pub use include_external_document::{IncludeExternalDocumentParams, IncludeExternalDocumentWorkflow};
pub use include_letter::{IncludeLetterParams, IncludeLetterWorkflow};
pub use remove_special_tracking::{RemoveSpecialTrackingParams, RemoveSpecialTrackingWorkflow};
pub use send_to_unit::{SendToUnitParams, SendToUnitWorkflow};
pub use update_progress::{UpdateProgressParams, UpdateProgressWorkflow};

use crate::browser::driver::PageDriver;
use crate::browser::scope::WindowScope;
use crate::config::SeiConfig;
use crate::dom::actions::ActionMap;
use crate::error::{Result, SeiError};
use crate::locators::Locator;
use crate::session::{Record, SeiSession};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Session a workflow runs against
pub struct WorkflowContext<'a, D: PageDriver> {
    pub sei: &'a mut SeiSession<D>,
}

impl<'a, D: PageDriver> WorkflowContext<'a, D> {
    pub fn new(sei: &'a mut SeiSession<D>) -> Self {
        Self { sei }
    }
}

/// Outcome of a workflow run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkflowResult {
    pub fn success() -> Self {
        Self { success: true, data: None, error: None }
    }

    pub fn success_with(data: Value) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()) }
    }
}

/// A named portal routine with typed parameters
pub trait Workflow: Default {
    type Params: Serialize + DeserializeOwned + JsonSchema;

    fn name(&self) -> &str;

    /// JSON schema of [`Workflow::Params`]
    fn parameters_schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(Self::Params)).unwrap_or_default()
    }

    fn execute_typed<D: PageDriver>(
        &self,
        params: Self::Params,
        context: &mut WorkflowContext<'_, D>,
    ) -> Result<WorkflowResult>;

    /// Deserialize `params` and run the workflow
    fn execute<D: PageDriver>(&self, params: Value, context: &mut WorkflowContext<'_, D>) -> Result<WorkflowResult> {
        let params: Self::Params = serde_json::from_value(params)
            .map_err(|e| SeiError::InvalidParams(format!("{}: {}", self.name(), e)))?;
        self.execute_typed(params, context)
    }
}

/// Object-safe view of a [`Workflow`] for one driver type
pub trait DynWorkflow<D: PageDriver> {
    fn name(&self) -> &str;

    fn parameters_schema(&self) -> Value;

    fn execute(&self, params: Value, context: &mut WorkflowContext<'_, D>) -> Result<WorkflowResult>;
}

impl<D: PageDriver, W: Workflow> DynWorkflow<D> for W {
    fn name(&self) -> &str {
        Workflow::name(self)
    }

    fn parameters_schema(&self) -> Value {
        Workflow::parameters_schema(self)
    }

    fn execute(&self, params: Value, context: &mut WorkflowContext<'_, D>) -> Result<WorkflowResult> {
        Workflow::execute(self, params, context)
    }
}

/// Workflows by name, in registration order
pub struct WorkflowRegistry<D: PageDriver> {
    workflows: IndexMap<String, Box<dyn DynWorkflow<D>>>,
}

impl<D: PageDriver + 'static> Default for WorkflowRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: PageDriver + 'static> WorkflowRegistry<D> {
    pub fn new() -> Self {
        Self { workflows: IndexMap::new() }
    }

    /// Registry with every portal workflow
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(SendToUnitWorkflow);
        registry.register(IncludeDocumentWorkflow);
        registry.register(IncludeLetterWorkflow);
        registry.register(IncludeExternalDocumentWorkflow);
        registry.register(ConcludeRecordWorkflow);
        registry.register(EditAnnotationWorkflow);
        registry.register(EditMarkerWorkflow);
        registry.register(RemoveSpecialTrackingWorkflow);
        registry.register(AddInterestedWorkflow);
        registry.register(UpdateProgressWorkflow);
        registry.register(ExpediteLetterWorkflow);
        registry.register(ExpediteBlockWorkflow);
        registry.register(CreateRecordWorkflow);
        registry.register(SearchContactWorkflow);
        registry.register(UpsertContactWorkflow);
        registry
    }

    /// Add a workflow, replacing any workflow with the same name
    pub fn register<W: Workflow + 'static>(&mut self, workflow: W) {
        let name = Workflow::name(&workflow).to_string();
        self.workflows.insert(name, Box::new(workflow));
    }

    pub fn get(&self, name: &str) -> Option<&dyn DynWorkflow<D>> {
        self.workflows.get(name).map(|w| w.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.workflows.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }

    /// Run the workflow `name` with JSON parameters
    pub fn execute(&self, name: &str, params: Value, context: &mut WorkflowContext<'_, D>) -> Result<WorkflowResult> {
        let workflow = self.get(name).ok_or_else(|| SeiError::NotFound(format!("workflow '{}'", name)))?;
        log::info!("Running workflow '{}'", name);
        workflow.execute(params, context)
    }
}

/// Open record `id` and build the action map of its root node
pub(crate) fn open_with_actions<D: PageDriver>(sei: &mut SeiSession<D>, id: &str) -> Result<(Record, ActionMap)> {
    let mut record = sei.open_record(id)?;
    let actions = sei.actions_for(&mut record, None)?;
    Ok((record, actions))
}

/// Open a portal link in a secondary window
pub(crate) fn open_window<'s, D: PageDriver>(
    sei: &'s mut SeiSession<D>,
    link: &str,
) -> Result<(WindowScope<'s, D>, &'s SeiConfig)> {
    let (driver, config) = sei.split();
    let url = config.absolute_url(link);
    let window = WindowScope::open(driver, &url)?;
    Ok((window, config))
}

/// Reload the record page after a workflow left it
pub(crate) fn return_to_record<D: PageDriver>(sei: &mut SeiSession<D>, record: &Record) -> Result<()> {
    match &record.link {
        Some(link) => sei.go(link),
        None => Ok(()),
    }
}

/// Click a checkbox until its state is `checked`
pub(crate) fn set_checkbox<D: PageDriver + ?Sized>(
    driver: &mut D,
    locator: &Locator,
    checked: bool,
    timeout: Duration,
) -> Result<()> {
    driver.wait_for_element(locator, timeout)?;
    if driver.is_selected(locator)? != checked {
        driver.click(locator)?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fake portal screens reached from the record page

    use crate::browser::driver::PageDriver;
    use crate::browser::fake::{FakeDriver, FakePage, Reaction};
    use crate::error::SeiError;
    use crate::locators::send;
    use crate::session::testing::{portal, session};
    use crate::workflows::{Workflow, WorkflowContext};

    pub const SEND: &str = "https://sei.test/sei/controlador.php?acao=procedimento_enviar&id=1";
    pub const UNIT_PICKER: &str = "https://sei.test/sei/controlador.php?acao=unidade_selecionar_envio";
    pub const PROGRESS: &str = "https://sei.test/sei/controlador.php?acao=procedimento_atualizar_andamento&id=1";

    pub fn send_page() -> FakePage {
        FakePage::new(
            "SEI - Enviar Processo",
            r#"<img id="imgLupaUnidades">
               <input type="checkbox" id="chkSinManterAberto">
               <input type="radio" id="optDias"><input id="txtDias">
               <input type="checkbox" id="chkSinDiasUteis">
               <button id="sbmEnviar">Enviar</button>"#,
        )
    }

    pub fn unit_picker_page() -> FakePage {
        FakePage::new(
            "SEI - Selecionar Unidades",
            r#"<input id="txtSiglaUnidade">
               <table><tr class="infraTrClara"><td><input type="checkbox" id="chkInfraItem0" title="Protocolo da Sede"></td>
               <td>Protocolo.Sede</td></tr></table>
               <button id="btnTransportarSelecao">Transportar</button>"#,
        )
    }

    pub fn progress_page() -> FakePage {
        FakePage::new(
            "SEI - Atualizar Andamento",
            r#"<textarea id="txaDescricao"></textarea><button id="sbmSalvar">Salvar</button>"#,
        )
    }

    /// Portal with the send and progress windows wired up
    pub fn record_portal() -> FakeDriver {
        let mut fake = portal();
        fake.add_page(SEND, send_page());
        fake.add_page(UNIT_PICKER, unit_picker_page());
        fake.add_page(PROGRESS, progress_page());
        fake.on_click(&send::UNIT_PICKER, Reaction::OpenWindow(UNIT_PICKER.to_string()));
        fake
    }

    /// Fail each element action of a successful run in turn and check that the
    /// workflow aborts with `ElementTimeout` on the origin window, with no frame
    /// selected and no secondary window left open
    pub fn assert_step_failures_restore_origin<W: Workflow>(build: impl Fn() -> FakeDriver, params: W::Params)
    where
        W::Params: Clone,
    {
        let mut sei = session(build());
        W::default()
            .execute_typed(params.clone(), &mut WorkflowContext::new(&mut sei))
            .expect("workflow succeeds without injected failures");
        let steps = sei.driver().steps();
        assert!(steps > 0);

        for step in 0..steps {
            let mut fake = build();
            fake.fail_at_step(step);
            let mut sei = session(fake);
            let result = W::default().execute_typed(params.clone(), &mut WorkflowContext::new(&mut sei));

            assert!(matches!(result, Err(SeiError::ElementTimeout(_))), "step {}: {:?}", step, result);
            let fake = sei.driver();
            assert_eq!(fake.current_window().unwrap(), "w0", "step {}", step);
            assert_eq!(fake.window_handles().unwrap(), vec!["w0".to_string()], "step {}", step);
            assert_eq!(fake.current_frame(), None, "step {}", step);
        }
    }
}
