use crate::browser::driver::PageDriver;
use crate::dom::listing::BlockEntry;
use crate::dom::snapshot::HtmlSnapshot;
use crate::error::{Result, SeiError};
use crate::locators::{Locator, blocks};
use crate::session::{Record, SeiSession, expect_title};
use crate::workflows::expedite_letter::expedite;
use crate::workflows::{Workflow, WorkflowContext, WorkflowResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the expedite_block workflow
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExpediteBlockParams {
    /// Signature block number
    pub block: String,
}

/// Workflow for expediting every signed document of a signature block
///
/// Unsigned documents are skipped and reported; the block page is reloaded
/// between documents.
#[derive(Default)]
pub struct ExpediteBlockWorkflow;

impl Workflow for ExpediteBlockWorkflow {
    type Params = ExpediteBlockParams;

    fn name(&self) -> &str {
        "expedite_block"
    }

    fn execute_typed<D: PageDriver>(
        &self,
        params: ExpediteBlockParams,
        context: &mut WorkflowContext<'_, D>,
    ) -> Result<WorkflowResult> {
        let sei = &mut *context.sei;
        let entries = open_block(sei, &params.block)?;
        let block_url = sei.driver().current_url()?;

        let mut expedited = Vec::new();
        let mut skipped = Vec::new();
        for entry in entries {
            if !entry.is_expeditable() {
                log::info!("Skipping unsigned document {} of block {}", entry.document, params.block);
                skipped.push(entry.document);
                continue;
            }

            sei.go(&entry.record_link)?;
            let timeout = sei.config().timeouts.element();
            expect_title(sei.driver(), &sei.config().titles.record, timeout)?;
            let mut target = Record::new(entry.record.as_str()).with_link(sei.driver().current_url()?);
            expedite(sei, &mut target, &entry.document)?;
            expedited.push(serde_json::json!({ "record": entry.record, "document": entry.document }));

            sei.driver_mut().navigate(&block_url)?;
        }

        log::info!("Block {}: {} expedited, {} skipped", params.block, expedited.len(), skipped.len());
        Ok(WorkflowResult::success_with(serde_json::json!({
            "block": params.block,
            "expedited": expedited,
            "skipped": skipped,
        })))
    }
}

/// Open the page of signature block `block` and parse its document rows
fn open_block<D: PageDriver>(sei: &mut SeiSession<D>, block: &str) -> Result<Vec<BlockEntry>> {
    if sei.driver().title()? != sei.config().titles.blocks {
        let snapshot = HtmlSnapshot::parse(&sei.driver().page_source()?);
        let link = snapshot
            .select(&blocks::MENU.value)?
            .first()
            .and_then(|anchor| anchor.value().attr("href"))
            .map(str::to_string)
            .ok_or_else(|| SeiError::NotFound("signature blocks menu entry".to_string()))?;
        sei.go(&link)?;
    }

    let (driver, config) = sei.split();
    let timeout = config.timeouts.element();
    expect_title(driver, &config.titles.blocks, timeout)?;
    driver.wait_and_click(&Locator::link_text(block), timeout)?;
    expect_title(driver, &format!("{} {}", config.titles.block, block), timeout)?;

    let snapshot = HtmlSnapshot::parse(&driver.page_source()?);
    snapshot.select(blocks::ROWS)?.into_iter().map(BlockEntry::parse).collect()
}
