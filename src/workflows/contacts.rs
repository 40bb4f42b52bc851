//! Contact directory workflows

use crate::browser::driver::PageDriver;
use crate::error::{Result, SeiError};
use crate::locators::contact;
use crate::session::{SeiSession, fold_accents};
use crate::workflows::{Workflow, WorkflowContext, WorkflowResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters for the search_contact workflow
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchContactParams {
    /// Name, CPF or CNPJ to look for; accents are ignored
    pub term: String,
}

/// Workflow for looking up a contact
#[derive(Default)]
pub struct SearchContactWorkflow;

impl Workflow for SearchContactWorkflow {
    type Params = SearchContactParams;

    fn name(&self) -> &str {
        "search_contact"
    }

    fn execute_typed<D: PageDriver>(
        &self,
        params: SearchContactParams,
        context: &mut WorkflowContext<'_, D>,
    ) -> Result<WorkflowResult> {
        let found = context.sei.search_contact(&params.term)?;
        Ok(WorkflowResult::success_with(serde_json::json!({
            "term": params.term,
            "found": found,
        })))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    #[default]
    Male,
}

/// Values of the "Pessoa Física" contact form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ContactData {
    pub name: String,
    /// CPF or CNPJ, digits only or already formatted; also used as the contact acronym
    pub document: String,
    pub gender: Gender,
    pub street: String,
    pub number: String,
    pub complement: String,
    pub district: String,
    /// Two-letter state code
    pub state: String,
    /// City name; matched against the city options ignoring accents and case
    pub city: String,
    pub zip: String,
    /// CPF of the legal representative
    pub representative_cpf: String,
    pub rg: String,
    pub issuer: String,
    pub birth_date: String,
    pub phone: String,
    pub mobile: String,
    pub email: String,
}

impl ContactData {
    /// Normalize the values the way the directory stores them
    ///
    /// Names and places are title-cased, the state is upper-cased and the
    /// document gets its CPF/CNPJ punctuation.
    pub fn normalized(&self) -> Self {
        Self {
            name: title_case(&self.name),
            document: format_document(&self.document),
            street: title_case(&self.street),
            complement: title_case(&self.complement),
            district: title_case(&self.district),
            state: self.state.trim().to_uppercase(),
            city: title_case(&self.city),
            issuer: title_case(&self.issuer),
            ..self.clone()
        }
    }

    /// Street and number, as typed in the address field
    pub fn address(&self) -> String {
        format!("{} {}", self.street, self.number).trim().to_string()
    }
}

/// Upper-case the first letter of every word and lower-case the rest
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Punctuate an 11-digit CPF or a 14-digit CNPJ; anything else is returned trimmed
pub fn format_document(document: &str) -> String {
    let digits: String = document.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        11 => format!("{}.{}.{}-{}", &digits[..3], &digits[3..6], &digits[6..9], &digits[9..]),
        14 => format!("{}.{}.{}/{}-{}", &digits[..2], &digits[2..5], &digits[5..8], &digits[8..12], &digits[12..]),
        _ => document.trim().to_string(),
    }
}

/// Parameters for the upsert_contact workflow
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpsertContactParams {
    /// Term identifying an existing contact (defaults to the contact's name)
    #[serde(default)]
    pub term: Option<String>,

    pub contact: ContactData,
}

/// Workflow for creating a contact, or updating it when the directory already has it
#[derive(Default)]
pub struct UpsertContactWorkflow;

impl Workflow for UpsertContactWorkflow {
    type Params = UpsertContactParams;

    fn name(&self) -> &str {
        "upsert_contact"
    }

    fn execute_typed<D: PageDriver>(
        &self,
        params: UpsertContactParams,
        context: &mut WorkflowContext<'_, D>,
    ) -> Result<WorkflowResult> {
        let sei = &mut *context.sei;
        let term = params.term.as_deref().unwrap_or(&params.contact.name);
        let data = params.contact.normalized();

        let created = match sei.search_contact(term)? {
            Some(existing) => {
                let link = existing
                    .edit_link
                    .ok_or_else(|| SeiError::NotFound(format!("edit link of contact '{}'", term)))?;
                sei.go(&link)?;
                fill_contact_form(sei, &data)?;
                false
            }
            None => {
                let timeout = sei.config().timeouts.element();
                sei.driver_mut().wait_and_click(&contact::NEW, timeout)?;
                fill_contact_form(sei, &data)?;
                true
            }
        };

        let timeout = sei.config().timeouts.element();
        let save = if created { &contact::SAVE_NEW } else { &contact::SAVE };
        sei.driver_mut().wait_and_click(save, timeout)?;
        log::info!("{} contact {}", if created { "Created" } else { "Updated" }, data.name);

        Ok(WorkflowResult::success_with(serde_json::json!({
            "name": data.name,
            "created": created,
        })))
    }
}

fn fill_contact_form<D: PageDriver>(sei: &mut SeiSession<D>, data: &ContactData) -> Result<()> {
    let (driver, config) = sei.split();
    let timeout = config.timeouts.element();

    driver.wait_and_select(&contact::KIND, contact::PERSON_KIND_TEXT, timeout)?;
    driver.wait_and_click(&contact::PERSON, timeout)?;
    driver.wait_and_fill(&contact::ACRONYM, &data.document, timeout)?;
    let gender = match data.gender {
        Gender::Female => &contact::FEMALE,
        Gender::Male => &contact::MALE,
    };
    driver.wait_and_click(gender, timeout)?;

    let address = data.address();
    let fields = [
        (&contact::NAME, data.name.as_str()),
        (&contact::ADDRESS, address.as_str()),
        (&contact::COMPLEMENT, data.complement.as_str()),
        (&contact::DISTRICT, data.district.as_str()),
    ];
    for (locator, value) in fields {
        driver.wait_and_fill(locator, value, timeout)?;
    }

    driver.wait_and_select(&contact::COUNTRY, contact::COUNTRY_TEXT, timeout)?;
    driver.wait_and_select(&contact::STATE, &data.state, timeout)?;

    let fields = [
        (&contact::ZIP, data.zip.as_str()),
        (&contact::CPF, data.representative_cpf.as_str()),
        (&contact::RG, data.rg.as_str()),
        (&contact::ISSUER, data.issuer.as_str()),
        (&contact::BIRTH_DATE, data.birth_date.as_str()),
        (&contact::PHONE, data.phone.as_str()),
        (&contact::MOBILE, data.mobile.as_str()),
        (&contact::EMAIL, data.email.as_str()),
    ];
    for (locator, value) in fields {
        driver.wait_and_fill(locator, value, timeout)?;
    }

    // The city list is loaded after the state is chosen
    select_city(driver, &data.city, timeout)
}

fn select_city<D: PageDriver + ?Sized>(driver: &mut D, city: &str, timeout: Duration) -> Result<()> {
    if city.is_empty() {
        return Ok(());
    }
    driver.wait_for_element(&contact::CITY, timeout)?;
    let wanted = fold_accents(city).to_lowercase();
    let option = driver
        .select_options(&contact::CITY)?
        .into_iter()
        .find(|option| fold_accents(option).to_lowercase() == wanted);
    match option {
        Some(option) => driver.select_by_text(&contact::CITY, &option),
        None => {
            log::warn!("City '{}' is not offered for this state", city);
            Ok(())
        }
    }
}
