use sei_driver::browser::{ChromeDriver, FrameScope, LaunchOptions, PageDriver, WindowScope};
use sei_driver::{Locator, NavigationTree};
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

fn data_url(html: &str) -> String {
    format!("data:text/html,{}", urlencoding::encode(html))
}

fn launch() -> ChromeDriver {
    let _ = env_logger::builder().is_test(true).try_init();
    ChromeDriver::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser")
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_form_primitives() {
    let mut driver = launch();
    driver
        .navigate(&data_url(
            r#"<html><head><title>SEI - Enviar Processo</title></head><body>
                 <input id="txtSiglaUnidade">
                 <select id="selUf"><option>DF</option><option>SP</option></select>
                 <input type="checkbox" id="chkSinManterAberto">
                 <img id="imgLupa" title="Selecionar Unidade">
               </body></html>"#,
        ))
        .expect("Failed to navigate");

    driver.wait_for_title("SEI - Enviar Processo", TIMEOUT).unwrap();
    driver.wait_and_fill(&Locator::id("txtSiglaUnidade"), "ORCN", TIMEOUT).unwrap();
    assert!(driver.page_source().unwrap().contains("txtSiglaUnidade"));

    assert_eq!(driver.select_options(&Locator::id("selUf")).unwrap(), vec!["DF", "SP"]);
    driver.select_by_text(&Locator::id("selUf"), "SP").unwrap();
    assert!(driver.select_by_text(&Locator::id("selUf"), "RJ").is_err());

    assert!(!driver.is_selected(&Locator::id("chkSinManterAberto")).unwrap());
    driver.click(&Locator::id("chkSinManterAberto")).unwrap();
    assert!(driver.is_selected(&Locator::id("chkSinManterAberto")).unwrap());

    assert_eq!(driver.attribute(&Locator::id("imgLupa"), "title").unwrap().as_deref(), Some("Selecionar Unidade"));
    assert!(!driver.element_exists(&Locator::id("missing")).unwrap());
}

#[test]
#[ignore]
fn test_frame_scope_restores_top_document() {
    let mut driver = launch();
    driver
        .navigate(&data_url(
            r#"<html><body><p>topo</p>
                 <iframe name="ifrArvore" srcdoc="<div id=&quot;divArvore&quot;><a id=&quot;anchor0&quot; href=&quot;#&quot;><span>Processo 00001</span></a></div>"></iframe>
               </body></html>"#,
        ))
        .expect("Failed to navigate");

    {
        let scope = FrameScope::enter(&mut driver, "ifrArvore", TIMEOUT).unwrap();
        let tree = NavigationTree::from_html(&scope.page_source().unwrap());
        assert_eq!(tree.resolve("00001").unwrap().locator_id, "anchor0");
    }

    assert_eq!(driver.current_frame(), None);
    assert!(driver.page_source().unwrap().contains("topo"));
}

#[test]
#[ignore]
fn test_window_scope_closes_secondary_window() {
    let mut driver = launch();
    driver.navigate(&data_url("<html><body><p>origem</p></body></html>")).expect("Failed to navigate");
    let origin = driver.current_window().unwrap();
    let before = driver.window_handles().unwrap().len();

    {
        let window = WindowScope::open(&mut driver, &data_url("<html><body><p>janela</p></body></html>")).unwrap();
        assert_ne!(window.handle(), origin);
        assert!(window.page_source().unwrap().contains("janela"));
    }

    assert_eq!(driver.current_window().unwrap(), origin);
    assert_eq!(driver.window_handles().unwrap().len(), before);
}
