//! Portal configuration
//!
//! Everything that is portal data rather than logic: base URL, wait budgets, frame
//! names, page titles and the allowed-value sets that workflow arguments are validated
//! against. Every section has defaults, so an empty TOML document is a valid config.

use crate::error::{Result, SeiError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration for a portal session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeiConfig {
    /// Prefix prepended to relative portal links
    pub base_url: String,
    pub timeouts: Timeouts,
    pub frames: Frames,
    pub titles: Titles,
    pub allowed: AllowedValues,
    pub progress_note: ProgressNote,
    /// Unit records are expedited to
    pub seat: Unit,
    /// Return deadline (business days) used when expediting
    pub return_days: u32,
}

impl Default for SeiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sei.anatel.gov.br/sei/".to_string(),
            timeouts: Timeouts::default(),
            frames: Frames::default(),
            titles: Titles::default(),
            allowed: AllowedValues::default(),
            progress_note: ProgressNote::default(),
            seat: Unit::default(),
            return_days: 5,
        }
    }
}

impl SeiConfig {
    /// Prefix a relative portal link with the base URL
    ///
    /// Links that already contain the base URL, and absolute `http(s)` links, are returned unchanged.
    pub fn absolute_url(&self, link: &str) -> String {
        let link = link.trim();
        if link.contains(&self.base_url) || link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else {
            format!("{}{}", self.base_url, link.trim_start_matches('/'))
        }
    }
}

/// Wait budgets, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Element presence for workflow steps
    pub element_ms: u64,
    /// Reaching a named frame
    pub frame_ms: u64,
    /// Locating the listing page-size control
    pub listing_ms: u64,
    /// Upper bound for a listing re-render after a page-size change
    pub settle_ms: u64,
    /// A popup window opened by a click
    pub popup_ms: u64,
    /// Poll interval used by every bounded wait
    pub poll_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { element_ms: 10_000, frame_ms: 10_000, listing_ms: 30_000, settle_ms: 10_000, popup_ms: 10_000, poll_ms: 100 }
    }
}

impl Timeouts {
    pub fn element(&self) -> Duration {
        Duration::from_millis(self.element_ms)
    }

    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    pub fn listing(&self) -> Duration {
        Duration::from_millis(self.listing_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn popup(&self) -> Duration {
        Duration::from_millis(self.popup_ms)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms.max(1))
    }
}

/// Frame identifiers (id, name or CSS selector of the `iframe`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frames {
    pub tree: String,
    pub central: String,
    pub editor_body: String,
}

impl Default for Frames {
    fn default() -> Self {
        Self {
            tree: "ifrArvore".to_string(),
            central: "ifrVisualizacao".to_string(),
            editor_body: "iframe.cke_wysiwyg_frame".to_string(),
        }
    }
}

/// Page titles used as page-state signals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Titles {
    pub home: String,
    pub record: String,
    pub contacts: String,
    pub send: String,
    pub unit_picker: String,
    pub blocks: String,
    /// Prefix of a single signature block page, followed by the block number
    pub block: String,
}

impl Default for Titles {
    fn default() -> Self {
        Self {
            home: "SEI - Controle de Processos".to_string(),
            record: "SEI - Processo".to_string(),
            contacts: "SEI - Contatos".to_string(),
            send: "SEI - Enviar Processo".to_string(),
            unit_picker: "SEI - Selecionar Unidades".to_string(),
            blocks: "SEI - Blocos de Assinatura".to_string(),
            block: "SEI - Documentos do Bloco de Assinatura".to_string(),
        }
    }
}

/// Enumerated sets that workflow arguments must belong to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllowedValues {
    pub document_types: Vec<String>,
    pub record_types: Vec<String>,
    pub letter_templates: Vec<String>,
    pub legal_hypotheses: Vec<String>,
}

impl Default for AllowedValues {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            document_types: strings(&["Ofício", "Externo", "Informe", "Despacho", "Nota Técnica", "Certidão"]),
            record_types: strings(&[
                "Outorga: Serviço de Interesse Coletivo",
                "Outorga: Serviço de Interesse Restrito",
                "Fiscalização: Processo de Apuração",
                "Gestão: Demanda Interna",
            ]),
            letter_templates: strings(&["Ofício Padrão", "Ofício de Notificação", "Ofício de Exigência"]),
            legal_hypotheses: strings(&[
                "Informação Pessoal (Art. 31 da Lei nº 12.527/2011)",
                "Sigilo Fiscal (Art. 198 da Lei nº 5.172/1966)",
                "Controle Interno (Art. 26, § 3º, da Lei nº 10.180/2001)",
            ]),
        }
    }
}

impl AllowedValues {
    pub fn check_document_type(&self, value: &str) -> Result<()> {
        check_member(&self.document_types, value, |v| SeiError::InvalidType(format!("document type '{}'", v)))
    }

    pub fn check_record_type(&self, value: &str) -> Result<()> {
        check_member(&self.record_types, value, |v| SeiError::InvalidType(format!("record type '{}'", v)))
    }

    pub fn check_letter_template(&self, value: &str) -> Result<()> {
        check_member(&self.letter_templates, value, |v| SeiError::InvalidOption(format!("letter template '{}'", v)))
    }

    pub fn check_legal_hypothesis(&self, value: &str) -> Result<()> {
        check_member(&self.legal_hypotheses, value, |v| SeiError::InvalidOption(format!("legal hypothesis '{}'", v)))
    }
}

fn check_member(set: &[String], value: &str, err: impl FnOnce(&str) -> SeiError) -> Result<()> {
    if set.iter().any(|item| item == value) { Ok(()) } else { Err(err(value)) }
}

/// Text wrapped around the letter info in a progress note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressNote {
    pub prefix: String,
    pub suffix: String,
}

impl Default for ProgressNote {
    fn default() -> Self {
        Self { prefix: "Expedição do ".to_string(), suffix: " via Protocolo.Sede".to_string() }
    }
}

/// An organizational unit, by acronym and the exact title shown in the unit picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Unit {
    pub acronym: String,
    pub title: String,
}

impl Default for Unit {
    fn default() -> Self {
        Self { acronym: "Protocolo.Sede".to_string(), title: "Protocolo da Sede".to_string() }
    }
}

/// Loads [`SeiConfig`] from TOML
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<SeiConfig> {
        let content = fs::read_to_string(path)
            .map_err(|e| SeiError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::load_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn load_str(content: &str) -> Result<SeiConfig> {
        toml::from_str(content).map_err(|e| SeiError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config, SeiConfig::default());
        assert_eq!(config.frames.tree, "ifrArvore");
    }

    #[test]
    fn test_load_partial_sections() {
        let content = r#"
            base_url = "https://sei.example.gov.br/sei/"

            [timeouts]
            element_ms = 500

            [seat]
            acronym = "PRSEDE"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.base_url, "https://sei.example.gov.br/sei/");
        assert_eq!(config.timeouts.element(), Duration::from_millis(500));
        assert_eq!(config.timeouts.frame_ms, 10_000);
        assert_eq!(config.seat.acronym, "PRSEDE");
        assert_eq!(config.seat.title, "Protocolo da Sede");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[allowed]\ndocument_types = [\"Ofício\"]").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.allowed.document_types, vec!["Ofício".to_string()]);
    }

    #[test]
    fn test_load_missing_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/sei.toml"));
        assert!(matches!(result, Err(SeiError::Config(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        assert!(matches!(ConfigLoader::load_str("timeouts = 3"), Err(SeiError::Config(_))));
    }

    #[test]
    fn test_absolute_url() {
        let config = SeiConfig::default();
        assert_eq!(
            config.absolute_url("controlador.php?acao=procedimento_trabalhar"),
            "https://sei.anatel.gov.br/sei/controlador.php?acao=procedimento_trabalhar"
        );
        assert_eq!(
            config.absolute_url("https://sei.anatel.gov.br/sei/controlador.php"),
            "https://sei.anatel.gov.br/sei/controlador.php"
        );
        assert_eq!(config.absolute_url(""), "https://sei.anatel.gov.br/sei/");
    }

    #[test]
    fn test_allowed_values() {
        let allowed = AllowedValues::default();
        assert!(allowed.check_document_type("Ofício").is_ok());
        assert!(matches!(allowed.check_document_type("Memorando"), Err(SeiError::InvalidType(_))));
        assert!(matches!(allowed.check_letter_template("Carta"), Err(SeiError::InvalidOption(_))));
        assert!(matches!(allowed.check_legal_hypothesis(""), Err(SeiError::InvalidOption(_))));
    }
}
