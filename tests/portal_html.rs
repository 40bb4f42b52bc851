use sei_driver::dom::snapshot::HtmlSnapshot;
use sei_driver::{Action, ActionMap, BlockEntry, ConfigLoader, ListingRow, NavigationTree, RecordRegistry, SeiError};
use std::io::Write;
use tempfile::NamedTempFile;

const TREE: &str = r#"
    <html><body><div id="divArvore">
      <a id="anchor0" href="controlador.php?acao=arvore_visualizar&id=1"><span>Processo 00001</span></a>
      <a id="anchor1" href="controlador.php?acao=documento_visualizar&id=2"><span>Documento 00001-A</span></a>
      <a href="controlador.php?acao=ajuda"><span>Ajuda 00001</span></a>
    </div></body></html>
"#;

const ACTIONS: &str = r#"
    <html><body><div id="divArvoreAcoes">
      <a href="javascript:concluirProcesso();"><img title="Concluir Processo"></a>
      <a href="controlador.php?acao=anotacao_registrar&id=1"><img title="Anotações"></a>
    </div></body></html>
"#;

fn listing_row(number: &str) -> String {
    format!(
        r#"<tr class="infraTrClara">
             <td><input type="checkbox"></td><td></td>
             <td><a href="controlador.php?acao=procedimento_trabalhar&id={0}">{0}</a></td>
             <td>fulano</td><td>Outorga</td><td>Empresa X</td>
           </tr>"#,
        number
    )
}

#[test]
fn test_tree_resolution() {
    let tree = NavigationTree::from_html(TREE);

    assert_eq!(tree.len(), 2);
    let node = tree.resolve("00001-A").unwrap();
    assert_eq!(node.label, "Documento 00001-A");
    assert_eq!(node.locator_id, "anchor1");

    assert_eq!(tree.resolve("00001").unwrap().locator_id, "anchor0");
    assert!(matches!(tree.resolve("99999"), Err(SeiError::NotFound(_))));
    assert!(matches!(tree.resolve("Ajuda"), Err(SeiError::NotFound(_))));
}

#[test]
fn test_action_panel() {
    let snapshot = HtmlSnapshot::parse(ACTIONS);
    let actions = ActionMap::from_container(&snapshot, "divArvoreAcoes").unwrap();

    assert_eq!(actions.labels().collect::<Vec<_>>(), vec!["Concluir Processo", "Anotações"]);
    assert!(matches!(actions.require("Concluir Processo").unwrap().action, Action::Script(_)));
    assert_eq!(actions.require_href("Anotações").unwrap(), "controlador.php?acao=anotacao_registrar&id=1");
}

#[test]
fn test_listing_rows_build_registry() {
    let html = format!(
        "<table>{}<tr class=\"infraTrClara\"><td colspan=\"6\">-</td></tr>{}{}</table>",
        listing_row("53500.000001/2024-01"),
        listing_row("53500.000002/2024-02"),
        listing_row("53500.000001/2024-01"),
    );
    let snapshot = HtmlSnapshot::parse(&html);
    let rows = snapshot
        .select("tr.infraTrClara")
        .unwrap()
        .into_iter()
        .filter_map(|row| ListingRow::parse(row).ok())
        .collect::<Vec<_>>();
    assert_eq!(rows.len(), 3);

    let registry = RecordRegistry::from_rows(rows);
    assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["53500.000001/2024-01", "53500.000002/2024-02"]);
}

#[test]
fn test_block_rows() {
    let html = r#"<table><tr class="infraTrEscura">
        <td></td><td>1</td><td><a href="p">53500.000009/2024-11</a></td><td>1234567</td>
        <td>01/02/2024</td><td>Ofício</td><td>Beltrano</td><td></td><td></td>
    </tr></table>"#;
    let snapshot = HtmlSnapshot::parse(html);
    let rows = snapshot.select("tr.infraTrClara, tr.infraTrEscura").unwrap();

    let entry = BlockEntry::parse(rows[0]).unwrap();
    assert_eq!(entry.record, "53500.000009/2024-11");
    assert_eq!(entry.record_link, "p");
    assert!(entry.is_expeditable());
}

#[test]
fn test_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "base_url = \"https://sei.example.gov.br/sei/\"\n[seat]\nacronym = \"PRSEDE\"").unwrap();

    let config = ConfigLoader::load(file.path()).unwrap();
    assert_eq!(config.seat.acronym, "PRSEDE");
    assert_eq!(
        config.absolute_url("controlador.php?acao=procedimento_trabalhar"),
        "https://sei.example.gov.br/sei/controlador.php?acao=procedimento_trabalhar"
    );
}
