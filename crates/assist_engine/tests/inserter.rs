mod common;

use assist_core::{InsertionStrategy, SelectorList};
use assist_engine::{ComposeBoxLocator, DomEventKind, DomRange, HostDocument, TextInserter};
use common::{find, init_logging, GMAIL_REPLY_PAGE};
use pretty_assertions::assert_eq;

fn locator_for(css: &str) -> ComposeBoxLocator {
    ComposeBoxLocator::new(&SelectorList::new([css]).unwrap()).unwrap()
}

#[test]
fn rich_text_without_selection_appends_once() {
    init_logging();
    let mut doc = HostDocument::parse(GMAIL_REPLY_PAGE);
    let locator = ComposeBoxLocator::new(&SelectorList::compose_box()).unwrap();
    let inserter = TextInserter::new(&locator);

    let strategy = inserter.insert_with_strategy(&mut doc, "Sure, Tuesday works for me.");

    let compose = find(&doc, "[role=\"textbox\"]");
    assert_eq!(strategy, Some(InsertionStrategy::Append));
    assert_eq!(doc.rendered_text(compose), "Sure, Tuesday works for me.");
    assert_eq!(doc.focused(), Some(compose));
}

#[test]
fn rich_text_selection_is_replaced_at_the_caret() {
    init_logging();
    let mut doc = HostDocument::parse(
        r#"<body><div id="c" contenteditable="true">Dear Sam, regards</div></body>"#,
    );
    let compose = find(&doc, "#c");
    let text = doc.first_child(compose).unwrap();
    doc.set_selection(DomRange::collapsed(text, 10)).unwrap();

    let locator = locator_for("#c");
    let strategy = TextInserter::new(&locator).insert_with_strategy(&mut doc, "thanks! ");

    assert_eq!(strategy, Some(InsertionStrategy::RangeInsert));
    assert_eq!(doc.rendered_text(compose), "Dear Sam, thanks! regards");
    let caret = doc.selection().unwrap();
    assert!(caret.is_collapsed());
    assert_eq!(caret.container, compose);
}

#[test]
fn selection_outside_the_surface_is_ignored() {
    let mut doc = HostDocument::parse(
        r#"<body><p id="other">elsewhere</p><div id="c" contenteditable="true">Hi</div></body>"#,
    );
    let other = find(&doc, "#other");
    doc.set_selection(DomRange::collapsed(other, 0)).unwrap();

    let locator = locator_for("#c");
    let strategy = TextInserter::new(&locator).insert_with_strategy(&mut doc, " there");

    assert_eq!(strategy, Some(InsertionStrategy::Append));
    assert_eq!(doc.rendered_text(find(&doc, "#c")), "Hi there");
    assert_eq!(doc.rendered_text(other), "elsewhere");
}

#[test]
fn textarea_splices_over_the_selection() {
    let mut doc = HostDocument::parse(r#"<body><textarea id="t">Hello world</textarea></body>"#);
    let field = find(&doc, "#t");
    doc.set_field_selection(field, 6, 11).unwrap();

    let locator = locator_for("#t");
    let strategy = TextInserter::new(&locator).insert_with_strategy(&mut doc, "team");

    assert_eq!(strategy, Some(InsertionStrategy::Splice));
    assert_eq!(doc.field_value(field), "Hello team");
    assert_eq!(doc.field_selection(field), Some((10, 10)));
}

#[test]
fn field_without_selection_range_is_replaced() {
    let mut doc = HostDocument::parse(r#"<body><input id="e" type="email" value="old@example.com"></body>"#);
    let field = find(&doc, "#e");

    let locator = locator_for("#e");
    let strategy = TextInserter::new(&locator).insert_with_strategy(&mut doc, "new@example.com");

    assert_eq!(strategy, Some(InsertionStrategy::Replace));
    assert_eq!(doc.field_value(field), "new@example.com");
}

#[test]
fn prepend_puts_text_ahead_of_existing_content() {
    let mut doc = HostDocument::parse(
        r#"<body><div id="c" contenteditable="true">My draft</div></body>"#,
    );
    let locator = locator_for("#c");

    let strategy = TextInserter::new(&locator).prepend_with_strategy(&mut doc, "Summary:\n\nshort\n\n---\n\n");

    assert_eq!(strategy, Some(InsertionStrategy::Prepend));
    assert_eq!(
        doc.rendered_text(find(&doc, "#c")),
        "Summary:\n\nshort\n\n---\n\nMy draft"
    );
}

#[test]
fn appending_keeps_the_line_structure_of_a_multi_line_draft() {
    init_logging();
    let mut doc = HostDocument::parse(
        r#"<body><div id="c" contenteditable="true"><div>Hi Sam,</div><div>Thanks for the note.</div></div></body>"#,
    );
    let locator = locator_for("#c");

    assert!(TextInserter::new(&locator).insert(&mut doc, "\nSure."));

    assert_eq!(
        doc.rendered_text(find(&doc, "#c")),
        "Hi Sam,\nThanks for the note.\nSure."
    );
}

#[test]
fn prepending_keeps_the_line_structure_of_a_multi_line_draft() {
    let mut doc = HostDocument::parse(
        r#"<body><div id="c" contenteditable="true"><p>First line</p><p>Second line</p></div></body>"#,
    );
    let locator = locator_for("#c");

    assert!(TextInserter::new(&locator).prepend(&mut doc, "Summary:\n\nok\n\n---\n\n"));

    assert_eq!(
        doc.rendered_text(find(&doc, "#c")),
        "Summary:\n\nok\n\n---\n\nFirst line\nSecond line"
    );
}

#[test]
fn each_strategy_performs_exactly_one_content_write() {
    init_logging();
    let mut doc = HostDocument::parse(
        r#"<body>
             <div id="rich" contenteditable="true">Hello</div>
             <div id="ranged" contenteditable="true">Hello</div>
             <textarea id="area">Hello</textarea>
             <input id="mail" type="email" value="a@b.c">
           </body>"#,
    );
    let ranged = find(&doc, "#ranged");
    let ranged_text = doc.first_child(ranged).unwrap();

    let cases: [(&str, bool, InsertionStrategy); 5] = [
        ("#rich", false, InsertionStrategy::Append),
        ("#rich", true, InsertionStrategy::Prepend),
        ("#ranged", false, InsertionStrategy::RangeInsert),
        ("#area", false, InsertionStrategy::Splice),
        ("#mail", false, InsertionStrategy::Replace),
    ];
    for (css, prepend, expected) in cases {
        if expected == InsertionStrategy::RangeInsert {
            doc.set_selection(DomRange::collapsed(ranged_text, 5)).unwrap();
        }
        let locator = locator_for(css);
        let inserter = TextInserter::new(&locator);
        let writes_before = doc.content_writes();
        doc.take_events();

        let strategy = if prepend {
            inserter.prepend_with_strategy(&mut doc, "!")
        } else {
            inserter.insert_with_strategy(&mut doc, "!")
        };

        assert_eq!(strategy, Some(expected), "{css}");
        assert_eq!(doc.content_writes() - writes_before, 1, "{css} {expected:?}");
        assert_eq!(doc.events().len(), 2, "{css}");
    }
}

#[test]
fn every_insertion_fires_input_then_keyup() {
    let mut doc = HostDocument::parse(GMAIL_REPLY_PAGE);
    let locator = ComposeBoxLocator::new(&SelectorList::compose_box()).unwrap();
    assert!(TextInserter::new(&locator).insert(&mut doc, "ok"));

    let compose = find(&doc, "[role=\"textbox\"]");
    let kinds: Vec<_> = doc.events().iter().map(|e| (e.target, e.kind)).collect();
    assert_eq!(
        kinds,
        vec![(compose, DomEventKind::Input), (compose, DomEventKind::KeyUp)]
    );
}

#[test]
fn missing_compose_box_inserts_nothing() {
    init_logging();
    let mut doc = HostDocument::parse("<body><div class=\"nH\"></div></body>");
    let locator = ComposeBoxLocator::new(&SelectorList::compose_box()).unwrap();

    assert!(!TextInserter::new(&locator).insert(&mut doc, "lost"));
    assert!(doc.events().is_empty());
    assert!(!doc.document_html().contains("lost"));
}
