//! Record page: tree frame and action panel

use super::{Record, SeiSession};
use crate::browser::driver::PageDriver;
use crate::browser::scope::FrameScope;
use crate::dom::actions::ActionMap;
use crate::dom::snapshot::HtmlSnapshot;
use crate::dom::tree::{NavigationNode, NavigationTree};
use crate::error::{Result, SeiError};
use crate::locators::{Locator, record};

impl<D: PageDriver> SeiSession<D> {
    /// Snapshot the tree frame of the current record page
    pub fn record_tree(&mut self) -> Result<NavigationTree> {
        let (driver, config) = self.split();
        let scope = FrameScope::enter(driver, &config.frames.tree, config.timeouts.frame())?;
        let tree = NavigationTree::from_html(&scope.page_source()?);
        log::debug!("Tree frame has {} nodes", tree.len());
        Ok(tree)
    }

    /// First tree node whose label contains `label`
    ///
    /// The tree is re-read on every call. Matching is by substring in render order,
    /// so overlapping labels resolve to the earliest node; see
    /// [`SeiSession::resolve_unique`].
    pub fn resolve(&mut self, label: &str) -> Result<NavigationNode> {
        self.record_tree()?.resolve(label).cloned()
    }

    /// Like [`SeiSession::resolve`], failing with `AmbiguousMatch` instead of guessing
    pub fn resolve_unique(&mut self, label: &str) -> Result<NavigationNode> {
        self.record_tree()?.resolve_unique(label).cloned()
    }

    /// Click the first tree node whose label contains `label`
    pub fn click_in_tree(&mut self, label: &str) -> Result<NavigationNode> {
        let (driver, config) = self.split();
        let mut scope = FrameScope::enter(driver, &config.frames.tree, config.timeouts.frame())?;
        let tree = NavigationTree::from_html(&scope.page_source()?);
        let node = tree.resolve(label)?.clone();
        scope.wait_and_click(&Locator::element_id(node.locator_id.clone()), config.timeouts.element())?;
        log::debug!("Clicked tree node '{}'", node.label);
        Ok(node)
    }

    /// Expand every folder of the tree
    ///
    /// Returns `false` when the tree has no folders. If the expander does not become
    /// clickable in time, its link is loaded directly instead.
    pub fn open_all_folders(&mut self) -> Result<bool> {
        let (driver, config) = self.split();
        let mut scope = FrameScope::enter(driver, &config.frames.tree, config.timeouts.frame())?;
        let tree = NavigationTree::from_html(&scope.page_source()?);
        let Some(node) = tree.get(record::OPEN_ALL_FOLDERS).cloned() else {
            return Ok(false);
        };

        let fallback = match scope.wait_and_click(&Locator::element_id(node.locator_id), config.timeouts.element()) {
            Ok(()) => return Ok(true),
            Err(SeiError::ElementTimeout(target)) => match node.href {
                Some(href) => href,
                None => return Err(SeiError::ElementTimeout(target)),
            },
            Err(e) => return Err(e),
        };
        drop(scope);

        log::warn!("Folder expander not clickable, loading {}", fallback);
        self.go(&fallback)?;
        Ok(true)
    }

    /// Build the action map of the record currently displayed
    ///
    /// Fails with `WrongPageState` off a record page and with `Timeout` when the
    /// action panel does not appear. The map replaces `record.action_cache`.
    pub fn build_actions(&mut self, target: &mut Record) -> Result<ActionMap> {
        self.require_record_page()?;

        let (driver, config) = self.split();
        let scope = FrameScope::enter(driver, &config.frames.central, config.timeouts.frame())?;
        scope.wait_for_element(&record::ACTIONS, config.timeouts.element()).map_err(|e| match e {
            SeiError::ElementTimeout(what) => SeiError::Timeout(what),
            other => other,
        })?;
        let snapshot = HtmlSnapshot::parse(&scope.page_source()?);
        let actions = ActionMap::from_container(&snapshot, record::ACTIONS_ID)?;
        drop(scope);

        log::debug!("Record {} offers {} actions", target.id, actions.len());
        target.action_cache = actions.clone();
        Ok(actions)
    }

    /// Select `node` (the record itself by default) in the tree and rebuild its actions
    pub fn actions_for(&mut self, target: &mut Record, node: Option<&str>) -> Result<ActionMap> {
        let label = node.unwrap_or(&target.id).to_string();
        self.click_in_tree(&label)?;
        self.build_actions(target)
    }

    /// Whether the record page lists `unit` among the units the record is open in
    pub fn is_open_in(&mut self, unit: &str) -> Result<bool> {
        let (driver, config) = self.split();
        let scope = FrameScope::enter(driver, &config.frames.central, config.timeouts.frame())?;
        let snapshot = HtmlSnapshot::parse(&scope.page_source()?);
        let info = snapshot
            .text_of(record::UNIT_INFO_ID)
            .ok_or_else(|| SeiError::NotFound(format!("#{}", record::UNIT_INFO_ID)))?;
        Ok(info.split_whitespace().any(|word| word.trim_matches([',', ';', '.']) == unit))
    }

    /// Full tree label of the document `document` (e.g. "Ofício 12 (1234567)")
    pub fn document_label(&mut self, document: &str) -> Result<String> {
        self.require_record_page()?;
        let node = self.resolve(document)?;
        Ok(node.label)
    }
}

#[cfg(test)]
mod tests {
    use crate::browser::fake::{FakeDriver, FakePage};
    use crate::browser::driver::PageDriver;
    use crate::error::SeiError;
    use crate::session::Record;
    use crate::session::testing::*;

    fn at_record() -> FakeDriver {
        let mut fake = portal();
        fake.navigate(RECORD).unwrap();
        fake
    }

    #[test]
    fn test_resolve_restores_frame() {
        let mut sei = session(at_record());
        let node = sei.resolve("1234567").unwrap();
        assert_eq!(node.locator_id, "anchor1");
        assert_eq!(sei.driver().current_frame(), None);

        assert!(matches!(sei.resolve("99999"), Err(SeiError::NotFound(_))));
        assert_eq!(sei.driver().current_frame(), None);
    }

    #[test]
    fn test_resolve_without_tree_frame_times_out() {
        let mut sei = session(portal());
        assert!(matches!(sei.resolve("1234567"), Err(SeiError::Timeout(_))));
    }

    #[test]
    fn test_resolve_unique() {
        let mut sei = session(at_record());
        assert!(matches!(sei.resolve_unique("1"), Err(SeiError::AmbiguousMatch { .. })));
        assert_eq!(sei.resolve_unique("Ofício 12").unwrap().locator_id, "anchor1");
    }

    #[test]
    fn test_click_in_tree() {
        let mut sei = session(at_record());
        sei.click_in_tree("53500.000001").unwrap();
        assert!(sei.driver().logged("click id=anchor0"));
        assert_eq!(sei.driver().current_frame(), None);
    }

    #[test]
    fn test_open_all_folders_clicks_expander() {
        let mut sei = session(at_record());
        assert!(sei.open_all_folders().unwrap());
        assert!(sei.driver().logged("click id=joinPASTA"));
    }

    #[test]
    fn test_open_all_folders_falls_back_to_link() {
        let mut fake = at_record();
        fake.add_page("https://sei.test/sei/controlador.php?acao=arvore_pastas", FakePage::new("SEI - Processo", ""));
        fake.fail_at_step(0);
        let mut sei = session(fake);

        assert!(sei.open_all_folders().unwrap());
        assert_eq!(sei.driver().current_url().unwrap(), "https://sei.test/sei/controlador.php?acao=arvore_pastas");
        assert_eq!(sei.driver().current_frame(), None);
    }

    #[test]
    fn test_open_all_folders_without_folders() {
        let mut fake = at_record();
        fake.set_html(RECORD, Some("ifrArvore"), r#"<a id="a0"><span>Processo</span></a>"#);
        let mut sei = session(fake);
        assert!(!sei.open_all_folders().unwrap());
    }

    #[test]
    fn test_build_actions() {
        let mut sei = session(at_record());
        let mut record = Record::new("53500.000001/2024-01");
        let actions = sei.build_actions(&mut record).unwrap();

        assert_eq!(actions.len(), 8);
        assert_eq!(actions.require_script("Concluir Processo").unwrap(), "concluirProcesso();");
        assert_eq!(record.action_cache, actions);
        assert_eq!(sei.driver().current_frame(), None);
    }

    #[test]
    fn test_build_actions_wrong_page() {
        let mut sei = session(portal());
        let mut record = Record::new("1");
        assert!(matches!(sei.build_actions(&mut record), Err(SeiError::WrongPageState { .. })));
    }

    #[test]
    fn test_build_actions_panel_timeout() {
        let mut fake = at_record();
        fake.set_html(RECORD, Some("ifrVisualizacao"), "<div>carregando</div>");
        let mut sei = session(fake);
        let mut record = Record::new("1");
        assert!(matches!(sei.build_actions(&mut record), Err(SeiError::Timeout(_))));
        assert_eq!(sei.driver().current_frame(), None);
    }

    #[test]
    fn test_actions_for_clicks_record_node() {
        let mut sei = session(at_record());
        let mut record = Record::new("53500.000001/2024-01");
        let actions = sei.actions_for(&mut record, None).unwrap();
        assert!(sei.driver().logged("click id=anchor0"));
        assert!(actions.contains("Enviar Processo"));
    }

    #[test]
    fn test_is_open_in() {
        let mut sei = session(at_record());
        assert!(sei.is_open_in("ORCN").unwrap());
        assert!(!sei.is_open_in("ORC").unwrap());
    }

    #[test]
    fn test_document_label() {
        let mut sei = session(at_record());
        assert_eq!(sei.document_label("1234567").unwrap(), "Ofício 12 (1234567)");
    }
}
