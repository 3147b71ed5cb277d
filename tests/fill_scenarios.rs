//! Integration tests for filling title blocks across documents

use pretty_assertions::assert_eq;

use titleblock_filler::filler::{FillWarningKind, NO_PAGE_MESSAGE};
use titleblock_filler::notify::RecordingNotifier;
use titleblock_filler::{
    fill_title_block, plan_fill, Document, EditableTexts, FillError, FillOptions, Grid,
    MemoryDocument, Page, PageId,
};

fn texts(pairs: &[(&str, &str)]) -> EditableTexts {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// DocNo is increment-flagged, Author is not
fn basic_sheet() -> Grid {
    Grid::from_rows(vec![
        vec!["Property name", "Value", "Increase"],
        vec!["DocNo", "12", "y"],
        vec!["Author", "Jane Doe", "n"],
    ])
}

fn document(pages: usize, sheet: Grid) -> MemoryDocument {
    let mut doc = MemoryDocument::new().with_spreadsheet("TitleBlock", sheet);
    for i in 0..pages {
        doc.add_page(Page::new(format!("Page{:03}", i + 1)).with_text("DocNo", "").with_text("Author", ""));
    }
    doc
}

fn page_texts(doc: &MemoryDocument, page: usize) -> EditableTexts {
    doc.editable_texts(PageId(page)).unwrap()
}

#[test]
fn test_single_page() {
    let mut doc = document(1, basic_sheet());
    let mut notifier = RecordingNotifier::new();

    let report = fill_title_block(&mut doc, &mut notifier).unwrap();

    assert_eq!(page_texts(&doc, 0), texts(&[("Author", "Jane Doe"), ("DocNo", "12")]));
    assert!(report.warnings.is_empty());
    assert!(notifier.notices.is_empty());
}

#[test]
fn test_two_pages_increment() {
    let mut doc = document(2, basic_sheet());
    fill_title_block(&mut doc, &mut RecordingNotifier::new()).unwrap();

    assert_eq!(page_texts(&doc, 0), texts(&[("Author", "Jane Doe"), ("DocNo", "12")]));
    assert_eq!(page_texts(&doc, 1), texts(&[("Author", "Jane Doe"), ("DocNo", "13")]));
}

#[test]
fn test_non_numeric_flagged_value_falls_back() {
    let sheet = Grid::from_rows(vec![
        vec!["Property name", "Value", "Increase"],
        vec!["Rev", "A", "y"],
        vec!["Author", "Jane Doe", ""],
    ]);
    let mut doc = document(1, sheet);
    let mut notifier = RecordingNotifier::new();

    let report = fill_title_block(&mut doc, &mut notifier).unwrap();

    let filled = page_texts(&doc, 0);
    assert_eq!(filled["Rev"], "A");
    // The run continued past the bad row
    assert_eq!(filled["Author"], "Jane Doe");
    assert_eq!(report.warnings.len(), 1);
    let warning = &report.warnings[0];
    assert_eq!(warning.kind, FillWarningKind::ValueNotNumeric);
    assert_eq!((warning.page.as_str(), warning.row), ("Page001", 2));
    assert_eq!(warning.to_string(), "Page001: row 2 (Rev = \"A\"): this is not a number!");
    // Non-fatal: no dialog
    assert!(notifier.notices.is_empty());
}

#[test]
fn test_missing_spreadsheet() {
    let mut doc = MemoryDocument::new()
        .with_page(Page::new("Page001").with_text("Author", "old"))
        .with_page(Page::new("Page002").with_text("Author", "old"));
    let mut notifier = RecordingNotifier::new();

    let err = fill_title_block(&mut doc, &mut notifier).unwrap_err();

    assert!(matches!(err, FillError::SpreadsheetNotFound { ref name } if name == "TitleBlock"));
    assert_eq!(notifier.messages(), vec!["No spreadsheet named 'TitleBlock'!!!"]);
    for page in doc.pages() {
        assert_eq!(doc.write_count(page), 0);
        assert_eq!(doc.editable_texts(page).unwrap()["Author"], "old");
    }
}

#[test]
fn test_no_pages() {
    let mut doc = MemoryDocument::new().with_spreadsheet("TitleBlock", basic_sheet());
    let mut notifier = RecordingNotifier::new();

    let err = fill_title_block(&mut doc, &mut notifier).unwrap_err();

    assert!(matches!(err, FillError::NoPagesFound));
    assert_eq!(notifier.messages(), vec![NO_PAGE_MESSAGE]);
}

#[test]
fn test_no_pages_reported_before_missing_spreadsheet() {
    let mut doc = MemoryDocument::new();
    let mut notifier = RecordingNotifier::new();

    let err = fill_title_block(&mut doc, &mut notifier).unwrap_err();

    assert!(matches!(err, FillError::NoPagesFound));
    assert_eq!(notifier.notices.len(), 1);
}

#[test]
fn test_rows_visited_once_in_order() {
    for populated in [0usize, 1, 2, 17, 500, 998] {
        let mut rows = vec![vec!["Property name".to_string(), "Value".into(), "Increase".into()]];
        for i in 0..populated {
            rows.push(vec![format!("key{}", i), i.to_string(), String::new()]);
        }
        let doc = document(1, Grid::from_rows(rows));

        let report = plan_fill(&doc, &FillOptions::default()).unwrap();
        let visited = &report.pages[0].rows;

        let expected: Vec<u32> = (2..2 + populated.max(1) as u32).collect();
        assert_eq!(visited, &expected, "{} populated rows", populated);
        assert!(visited.iter().all(|r| *r <= 1001));
    }
}

#[test]
fn test_counter_follows_page_order() {
    let sheet = Grid::from_rows(vec![
        vec!["Property name", "Value", "Increase"],
        vec!["Sheet", "0", "Yes"],
    ]);
    let mut doc = document(5, sheet);

    let report = fill_title_block(&mut doc, &mut RecordingNotifier::new()).unwrap();

    let offsets: Vec<i64> = report.pages.iter().map(|p| p.offset).collect();
    assert_eq!(offsets, vec![0, 1, 2, 3, 4]);
    for i in 0..5 {
        assert_eq!(page_texts(&doc, i)["Sheet"], i.to_string());
    }
}

#[test]
fn test_second_run_restarts_counter() {
    let mut doc = document(3, basic_sheet());

    fill_title_block(&mut doc, &mut RecordingNotifier::new()).unwrap();
    let first: Vec<EditableTexts> = (0..3).map(|i| page_texts(&doc, i)).collect();
    fill_title_block(&mut doc, &mut RecordingNotifier::new()).unwrap();
    let second: Vec<EditableTexts> = (0..3).map(|i| page_texts(&doc, i)).collect();

    // Non-flagged rows are stable and the counter starts from zero again,
    // so flagged rows are recomputed from the sheet rather than accumulated
    assert_eq!(first, second);
    assert_eq!(second[2]["DocNo"], "14");
}

#[test]
fn test_empty_value_clears_field() {
    let sheet = Grid::from_rows(vec![
        vec!["Property name", "Value", "Increase"],
        vec!["Author", "", "n"],
    ]);
    let mut doc = MemoryDocument::new()
        .with_spreadsheet("TitleBlock", sheet)
        .with_page(Page::new("Page001").with_text("Author", "Someone"));

    fill_title_block(&mut doc, &mut RecordingNotifier::new()).unwrap();

    assert_eq!(page_texts(&doc, 0)["Author"], "");
}

#[test]
fn test_each_page_written_once() {
    let mut doc = document(3, basic_sheet());
    fill_title_block(&mut doc, &mut RecordingNotifier::new()).unwrap();
    for page in doc.pages() {
        assert_eq!(doc.write_count(page), 1);
    }
}

#[test]
fn test_plan_does_not_touch_document() {
    let doc = document(2, basic_sheet());
    let report = plan_fill(&doc, &FillOptions::default()).unwrap();

    assert_eq!(report.pages[1].texts["DocNo"], "13");
    assert_eq!(page_texts(&doc, 1)["DocNo"], "");
    assert_eq!(doc.write_count(PageId(1)), 0);
}
