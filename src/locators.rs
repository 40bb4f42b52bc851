//! Element locator table
//!
//! Static mapping from logical field names to locator strategies, grouped by portal
//! screen. Nothing here carries logic; the values mirror the portal's markup and are
//! consumed read-only by the session and the workflows.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Strategy used to find an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum By {
    /// `id` attribute
    Id,
    /// `name` attribute
    Name,
    /// CSS selector
    Css,
    /// Anchor whose trimmed text equals the value
    LinkText,
    /// Anchor whose text contains the value
    PartialLinkText,
}

/// A locator strategy paired with its value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    pub by: By,
    pub value: Cow<'static, str>,
}

impl Locator {
    /// Create a locator from a static value
    pub const fn new(by: By, value: &'static str) -> Self {
        Self { by, value: Cow::Borrowed(value) }
    }

    pub const fn id(value: &'static str) -> Self {
        Self::new(By::Id, value)
    }

    pub const fn name(value: &'static str) -> Self {
        Self::new(By::Name, value)
    }

    pub const fn css(value: &'static str) -> Self {
        Self::new(By::Css, value)
    }

    /// Create a locator from a runtime value
    pub fn owned(by: By, value: impl Into<String>) -> Self {
        Self { by, value: Cow::Owned(value.into()) }
    }

    /// Locator for an element id only known at runtime (tree nodes, picker rows)
    pub fn element_id(value: impl Into<String>) -> Self {
        Self::owned(By::Id, value)
    }

    pub fn link_text(value: impl Into<String>) -> Self {
        Self::owned(By::LinkText, value)
    }

    pub fn partial_link_text(value: impl Into<String>) -> Self {
        Self::owned(By::PartialLinkText, value)
    }

    /// Equivalent CSS selector, when the strategy has one
    ///
    /// Link-text strategies have no CSS form and return `None`.
    pub fn as_css(&self) -> Option<String> {
        match self.by {
            By::Id => Some(format!("[id=\"{}\"]", escape_attr(&self.value))),
            By::Name => Some(format!("[name=\"{}\"]", escape_attr(&self.value))),
            By::Css => Some(self.value.to_string()),
            By::LinkText | By::PartialLinkText => None,
        }
    }
}

fn escape_attr(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategy = match self.by {
            By::Id => "id",
            By::Name => "name",
            By::Css => "css",
            By::LinkText => "link_text",
            By::PartialLinkText => "partial_link_text",
        };
        write!(f, "{}={}", strategy, self.value)
    }
}

pub mod login {
    use super::Locator;

    pub const USER: Locator = Locator::id("txtUsuario");
    pub const PASSWORD: Locator = Locator::id("pwdSenha");
    pub const SUBMIT: Locator = Locator::id("sbmLogin");
}

/// Header, side menu and the home listing ("Controle de Processos")
pub mod home {
    use super::Locator;

    pub const QUICK_SEARCH: Locator = Locator::id("txtPesquisaRapida");
    pub const HOME_LINK: Locator = Locator::id("lnkControleProcessos");
    pub const MENU_TOGGLE: Locator = Locator::id("lnkInfraMenuSistema");
    pub const UNIT_SELECT: Locator = Locator::id("selInfraUnidades");
    pub const SEE_ALL: Locator = Locator::id("ancVerTodosProcessos");
    pub const DETAILED_VIEW: Locator = Locator::id("ancTipoVisualizacao");
    pub const PAGE_SIZE: Locator = Locator::id("selInfraPaginacaoSuperior");
    pub const LISTING_ROWS: &str = "tr.infraTrClara";

    pub const SEE_ALL_TEXT: &str = "Ver todos os processos";
    pub const DETAILED_VIEW_TEXT: &str = "Visualização detalhada";
    pub const MENU_HIDDEN_TITLE: &str = "Exibir Menu do Sistema";
}

pub mod menu {
    use super::Locator;

    pub const START_RECORD: Locator = Locator::css("a[href*='procedimento_escolher_tipo']");
    pub const CONTACTS_LIST_TEXT: &str = "Listar";
}

/// Record page: tree frame and central frame
pub mod record {
    use super::Locator;

    pub const ACTIONS: Locator = Locator::id("divArvoreAcoes");
    pub const ACTIONS_ID: &str = "divArvoreAcoes";
    pub const UNIT_INFO_ID: &str = "divInformacao";
    pub const OPEN_ALL_FOLDERS: &str = "Abrir todas as Pastas";

    pub const SEND_ACTION: &str = "Enviar Processo";
    pub const PROGRESS_ACTION: &str = "Atualizar Andamento";
    pub const CONCLUDE_ACTION: &str = "Concluir Processo";
    pub const ANNOTATION_ACTION: &str = "Anotações";
    pub const MARKER_ACTION: &str = "Gerenciar Marcador";
    pub const TRACKING_ACTION: &str = "Acompanhamento Especial";
    pub const EDIT_RECORD_ACTION: &str = "Consultar/Alterar Processo";
    pub const INCLUDE_DOCUMENT_ACTION: &str = "Incluir Documento";
}

pub mod create_record {
    use super::Locator;

    pub const TYPE_FILTER: Locator = Locator::id("txtFiltro");
    pub const DESCRIPTION: Locator = Locator::id("txtDescricao");
    pub const PUBLIC: Locator = Locator::id("optPublico");
    pub const RESTRICTED: Locator = Locator::id("optRestrito");
    pub const CONFIDENTIAL: Locator = Locator::id("optSigiloso");
    pub const LEGAL_HYPOTHESIS: Locator = Locator::id("selHipoteseLegal");
    pub const SAVE: Locator = Locator::id("btnSalvar");
}

pub mod contact {
    use super::Locator;

    pub const SEARCH: Locator = Locator::id("txtPalavrasPesquisaContatos");
    pub const SEARCH_BUTTON: Locator = Locator::id("sbmPesquisar");
    pub const NEW: Locator = Locator::id("btnNovo");
    pub const KIND: Locator = Locator::id("selTipoContato");
    pub const PERSON: Locator = Locator::id("optTipoPessoaFisica");
    pub const ACRONYM: Locator = Locator::id("txtSigla");
    pub const FEMALE: Locator = Locator::id("optFeminino");
    pub const MALE: Locator = Locator::id("optMasculino");
    pub const NAME: Locator = Locator::id("txtNome");
    pub const ADDRESS: Locator = Locator::id("txtEndereco");
    pub const COMPLEMENT: Locator = Locator::id("txtComplemento");
    pub const DISTRICT: Locator = Locator::id("txtBairro");
    pub const COUNTRY: Locator = Locator::id("selPais");
    pub const STATE: Locator = Locator::id("selUf");
    pub const CITY: Locator = Locator::id("selCidade");
    pub const ZIP: Locator = Locator::id("txtCep");
    pub const CPF: Locator = Locator::id("txtCpf");
    pub const RG: Locator = Locator::id("txtRg");
    pub const ISSUER: Locator = Locator::id("txtOrgaoExpedidor");
    pub const BIRTH_DATE: Locator = Locator::id("txtDataNascimento");
    pub const PHONE: Locator = Locator::id("txtTelefoneFixo");
    pub const MOBILE: Locator = Locator::id("txtTelefoneCelular");
    pub const EMAIL: Locator = Locator::id("txtEmail");
    pub const SAVE: Locator = Locator::id("sbmAlterarContato");
    pub const SAVE_NEW: Locator = Locator::id("sbmCadastrarContato");
    pub const RESULT_ROWS: &str = "tr.infraTrClara";
    pub const EDIT_TITLE: &str = "Alterar Contato";

    pub const PERSON_KIND_TEXT: &str = "Pessoa Física";
    pub const COUNTRY_TEXT: &str = "Brasil";
}

/// "Enviar Processo" window and its unit picker
pub mod send {
    use super::Locator;

    pub const UNIT_PICKER: Locator = Locator::id("imgLupaUnidades");
    pub const UNIT_ACRONYM: Locator = Locator::id("txtSiglaUnidade");
    pub const UNIT_CANDIDATES: &str = "input[title], a[title]";
    pub const TRANSFER: Locator = Locator::id("btnTransportarSelecao");
    pub const KEEP_OPEN: Locator = Locator::id("chkSinManterAberto");
    pub const RETURN_DAYS_OPTION: Locator = Locator::id("optDias");
    pub const RETURN_DAYS: Locator = Locator::id("txtDias");
    pub const BUSINESS_DAYS: Locator = Locator::id("chkSinDiasUteis");
    pub const SEND: Locator = Locator::id("sbmEnviar");
}

pub mod progress {
    use super::Locator;

    pub const TEXT: Locator = Locator::id("txaDescricao");
    pub const SAVE: Locator = Locator::id("sbmSalvar");
}

pub mod annotation {
    use super::Locator;

    pub const TEXT: Locator = Locator::id("txaDescricao");
    pub const PRIORITY: Locator = Locator::id("chkSinPrioridade");
    pub const SAVE: Locator = Locator::id("sbmRegistrarAnotacao");
}

pub mod marker {
    use super::Locator;

    pub const SELECT: Locator = Locator::id("selMarcador");
    pub const TEXT: Locator = Locator::id("txaTexto");
    pub const SAVE: Locator = Locator::id("sbmSalvar");
}

pub mod tracking {
    use super::Locator;

    pub const DELETE: Locator = Locator::id("btnExcluir");
}

pub mod interested {
    use super::Locator;

    pub const PICKER: Locator = Locator::id("imgSelecionarInteressados");
    pub const SEARCH_INPUT: Locator = Locator::id("txtPalavrasPesquisa");
    pub const SEARCH: Locator = Locator::id("btnPesquisar");
    pub const FIRST_RESULT: Locator = Locator::id("chkInfraItem0");
    pub const RESULT_ROWS: &str = "tr.infraTrClara, tr.infraTrEscura";
    pub const TRANSFER: Locator = Locator::id("btnTransportarSelecao");
    pub const CLOSE: Locator = Locator::id("btnFecharSelecao");
    pub const SAVE: Locator = Locator::id("btnSalvar");
}

/// "Gerar Documento" form for internal letters ("Ofício")
pub mod letter {
    use super::Locator;

    pub const STANDARD_TEXT: Locator = Locator::id("optTextoPadrao");
    pub const TEMPLATES: Locator = Locator::id("selTextoPadrao");
    pub const PUBLIC: Locator = Locator::id("optPublico");
    pub const RESTRICTED: Locator = Locator::id("optRestrito");
    pub const LEGAL_HYPOTHESIS: Locator = Locator::id("selHipoteseLegal");
    pub const SUBMIT: Locator = Locator::id("btnSalvar");
    pub const EDITOR: Locator = Locator::css("div.cke_contents");
    pub const EDITOR_SAVE: Locator = Locator::css("a.cke_button__save");

    pub const DOCUMENT_TYPE: &str = "Ofício";
}

pub mod external_document {
    use super::Locator;

    pub const TYPE: Locator = Locator::id("selSerie");
    pub const DATE: Locator = Locator::id("txtDataElaboracao");
    pub const TREE_LABEL: Locator = Locator::id("txtNumero");
    pub const BORN_DIGITAL: Locator = Locator::id("optNato");
    pub const PUBLIC: Locator = Locator::id("optPublico");
    pub const RESTRICTED: Locator = Locator::id("optRestrito");
    pub const LEGAL_HYPOTHESIS: Locator = Locator::id("selHipoteseLegal");
    pub const FILE: Locator = Locator::id("filArquivo");
    pub const SUBMIT: Locator = Locator::id("btnSalvar");

    pub const DOCUMENT_TYPE: &str = "Externo";
}

pub mod blocks {
    use super::Locator;

    pub const MENU: Locator = Locator::css("a[href*='bloco_assinatura_listar']");
    pub const ROWS: &str = "tr.infraTrClara, tr.infraTrEscura";
}
