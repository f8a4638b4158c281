mod common;

use assist_core::{SelectorList, SurfaceKind};
use assist_engine::{ComposeBoxLocator, ComposeToolbarLocator, EmailContentLocator, HostDocument};
use common::{find, init_logging, GMAIL_REPLY_PAGE};
use pretty_assertions::assert_eq;

#[test]
fn earlier_selector_wins_over_earlier_document_position() {
    init_logging();
    // The role toolbar comes first in the document, but `.btC` is tried first.
    let doc = HostDocument::parse(
        r#"<body><div role="toolbar" id="generic"></div><div class="btC" id="compose"></div></body>"#,
    );
    let locator = ComposeToolbarLocator::new(&SelectorList::toolbar()).unwrap();
    assert_eq!(locator.locate(&doc), Some(find(&doc, "#compose")));
}

#[test]
fn toolbar_is_absent_on_a_page_without_compose() {
    let doc = HostDocument::parse("<body><div class=\"nH\">Inbox</div></body>");
    let locator = ComposeToolbarLocator::new(&SelectorList::toolbar()).unwrap();
    assert_eq!(locator.locate(&doc), None);
}

#[test]
fn compose_box_is_classified_by_editability() {
    let rich = HostDocument::parse(GMAIL_REPLY_PAGE);
    let locator = ComposeBoxLocator::new(&SelectorList::compose_box()).unwrap();
    let surface = locator.locate(&rich).unwrap();
    assert_eq!(surface.kind, SurfaceKind::RichText);
    assert_eq!(surface.node, find(&rich, "[role=\"textbox\"]"));

    let plain = HostDocument::parse(r#"<body><textarea aria-label="Message Body"></textarea></body>"#);
    let custom = SelectorList::new(["textarea[aria-label=\"Message Body\"]"]).unwrap();
    let surface = ComposeBoxLocator::new(&custom).unwrap().locate(&plain).unwrap();
    assert_eq!(surface.kind, SurfaceKind::PlainText);
}

#[test]
fn content_extraction_skips_candidates_without_text() {
    let doc = HostDocument::parse(
        r#"<body>
             <div class="h7">   </div>
             <div class="a3s aiL">
                Thanks for the update.<br>See you soon.
             </div>
           </body>"#,
    );
    let locator = EmailContentLocator::new(&SelectorList::email_content()).unwrap();
    assert_eq!(
        locator.extract(&doc),
        "Thanks for the update.\nSee you soon."
    );
}

#[test]
fn content_extraction_keeps_block_lines_apart() {
    let doc = HostDocument::parse(
        r#"<body><div class="a3s aiL"><div>Hi Alex,</div><div>Can we meet Tuesday?</div><p>Sam</p></div></body>"#,
    );
    let locator = EmailContentLocator::new(&SelectorList::email_content()).unwrap();
    assert_eq!(locator.extract(&doc), "Hi Alex,\nCan we meet Tuesday?\nSam");
}

#[test]
fn content_extraction_returns_empty_when_nothing_matches() {
    let doc = HostDocument::parse("<body><p>unrelated</p></body>");
    let locator = EmailContentLocator::new(&SelectorList::email_content()).unwrap();
    assert_eq!(locator.extract(&doc), "");
}

#[test]
fn invalid_selector_is_reported_with_its_source() {
    let list = SelectorList::new(["div[", ".ok"]).unwrap();
    let err = ComposeToolbarLocator::new(&list).unwrap_err();
    assert_eq!(err.selector, "div[");
}
