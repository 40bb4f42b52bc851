use crate::browser::driver::PageDriver;
use crate::config::AllowedValues;
use crate::error::{Result, SeiError};
use crate::locators::{Locator, create_record, external_document, letter};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Access level of a new document or record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    #[default]
    Public,
    /// Requires a legal hypothesis from the allowed set
    Restricted,
    Confidential,
}

/// Radio group and legal-hypothesis select of a form
pub(crate) struct AccessForm {
    pub public: Locator,
    pub restricted: Locator,
    /// `None` when the form must not be used for confidential content
    pub confidential: Option<Locator>,
    pub hypothesis: Locator,
}

pub(crate) const LETTER_FORM: AccessForm = AccessForm {
    public: letter::PUBLIC,
    restricted: letter::RESTRICTED,
    confidential: None,
    hypothesis: letter::LEGAL_HYPOTHESIS,
};

pub(crate) const EXTERNAL_DOCUMENT_FORM: AccessForm = AccessForm {
    public: external_document::PUBLIC,
    restricted: external_document::RESTRICTED,
    confidential: None,
    hypothesis: external_document::LEGAL_HYPOTHESIS,
};

pub(crate) const RECORD_FORM: AccessForm = AccessForm {
    public: create_record::PUBLIC,
    restricted: create_record::RESTRICTED,
    confidential: Some(create_record::CONFIDENTIAL),
    hypothesis: create_record::LEGAL_HYPOTHESIS,
};

impl AccessLevel {
    /// Check the level against `form` and the hypothesis against the allowed set
    pub(crate) fn validate(self, form: &AccessForm, hypothesis: Option<&str>, allowed: &AllowedValues) -> Result<()> {
        match self {
            AccessLevel::Public => Ok(()),
            AccessLevel::Restricted => allowed.check_legal_hypothesis(hypothesis.unwrap_or_default()),
            AccessLevel::Confidential if form.confidential.is_some() => Ok(()),
            AccessLevel::Confidential => {
                Err(SeiError::InvalidOption("confidential access is not available for this form".to_string()))
            }
        }
    }

    /// Select the level (and hypothesis) on the form of the current page
    pub(crate) fn apply<D: PageDriver + ?Sized>(
        self,
        driver: &mut D,
        form: &AccessForm,
        hypothesis: Option<&str>,
        timeout: Duration,
    ) -> Result<()> {
        match self {
            AccessLevel::Public => driver.wait_and_click(&form.public, timeout),
            AccessLevel::Restricted => {
                driver.wait_and_click(&form.restricted, timeout)?;
                match hypothesis {
                    Some(hypothesis) => driver.wait_and_select(&form.hypothesis, hypothesis, timeout),
                    None => Ok(()),
                }
            }
            AccessLevel::Confidential => match &form.confidential {
                Some(locator) => driver.wait_and_click(locator, timeout),
                None => Err(SeiError::InvalidOption("confidential access is not available for this form".to_string())),
            },
        }
    }
}
