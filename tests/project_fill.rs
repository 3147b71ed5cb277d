//! End-to-end tests: manifest + SVG templates + spreadsheet on disk

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;

use titleblock_filler::notify::RecordingNotifier;
use titleblock_filler::{
    fill_title_block, fill_title_block_with, populate_spreadsheet, Document, FillOptions, Grid,
    PageId, Project, Settings, SvgTemplate,
};

const TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" xmlns:freecad="http://www.freecad.org/wiki/index.php?title=Svg_Namespace">
  <text freecad:editable="DocNo" x="350" y="280"><tspan>0</tspan></text>
  <text freecad:editable="Author" x="300" y="280">
    <tspan>Author name</tspan>
  </text>
  <text freecad:editable="Date" x="300" y="270"><tspan>2024-01-01</tspan></text>
</svg>
"#;

const MANIFEST: &str = r#"
[spreadsheet]
path = "titleblock.csv"

[[page]]
name = "Page001"
template = "sheet1.svg"

[[page]]
name = "Page002"
template = "sheet2.svg"
"#;

fn write_project(dir: &Path, csv: &str) {
    fs::write(dir.join("project.toml"), MANIFEST).unwrap();
    fs::write(dir.join("sheet1.svg"), TEMPLATE).unwrap();
    fs::write(dir.join("sheet2.svg"), TEMPLATE).unwrap();
    fs::write(dir.join("titleblock.csv"), csv).unwrap();
}

fn fields(path: &Path) -> titleblock_filler::EditableTexts {
    SvgTemplate::from_file(path).unwrap().editable_texts().unwrap()
}

#[test]
fn test_fill_project_in_place() {
    let dir = tempfile::tempdir().unwrap();
    write_project(
        dir.path(),
        "Property name,Value,Increase\nDocNo,100,Yes\nAuthor,Jane Doe,No\n",
    );

    let mut project = Project::load(&dir.path().join("project.toml")).unwrap();
    let report = fill_title_block(project.document_mut(), &mut RecordingNotifier::new()).unwrap();
    assert_eq!(report.pages.len(), 2);
    project.save(None).unwrap();

    let first = fields(&dir.path().join("sheet1.svg"));
    let second = fields(&dir.path().join("sheet2.svg"));
    assert_eq!(first["DocNo"], "100");
    assert_eq!(second["DocNo"], "101");
    assert_eq!(first["Author"], "Jane Doe");
    // Fields absent from the spreadsheet are untouched
    assert_eq!(second["Date"], "2024-01-01");
}

#[test]
fn test_external_source_overrides_project_sheet() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), "Property name,Value,Increase\nAuthor,From project,No\n");
    fs::write(
        dir.path().join("settings.toml"),
        "use_external_source = true\nexternal_source_path = \"external.csv\"\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("external.csv"),
        "Property name,Value,Increase\nAuthor,From external,No\n",
    )
    .unwrap();

    let settings = Settings::from_file(&dir.path().join("settings.toml")).unwrap();
    let mut project = Project::load(&dir.path().join("project.toml")).unwrap();
    let source = settings.external_source().unwrap().to_path_buf();
    project
        .load_spreadsheet(&settings.sheet_name, &source, &settings.sheet_name)
        .unwrap();

    let options = FillOptions::new().with_sheet_name(settings.sheet_name.clone());
    fill_title_block_with(project.document_mut(), &mut RecordingNotifier::new(), &options)
        .unwrap();

    let texts = project.document().editable_texts(PageId(0)).unwrap();
    assert_eq!(texts["Author"], "From external");
}

#[test]
fn test_save_into_output_directory_keeps_sources() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), "Property name,Value,Increase\nDocNo,7,y\n");

    let mut project = Project::load(&dir.path().join("project.toml")).unwrap();
    fill_title_block(project.document_mut(), &mut RecordingNotifier::new()).unwrap();
    let out = dir.path().join("filled");
    let written = project.save(Some(&out)).unwrap();

    assert_eq!(written, vec![out.join("sheet1.svg"), out.join("sheet2.svg")]);
    assert_eq!(fields(&out.join("sheet2.svg"))["DocNo"], "8");
    assert_eq!(fs::read_to_string(dir.path().join("sheet1.svg")).unwrap(), TEMPLATE);
}

#[test]
fn test_populated_sheet_fills_back_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), "Property name,Value,Increase\n");

    let project = Project::load(&dir.path().join("project.toml")).unwrap();
    let original = project.document().editable_texts(PageId(0)).unwrap();
    let grid = populate_spreadsheet(&original);
    grid.write_csv(&dir.path().join("titleblock.csv")).unwrap();
    assert_eq!(
        Grid::from_csv_path(&dir.path().join("titleblock.csv")).unwrap(),
        grid
    );

    let mut project = Project::load(&dir.path().join("project.toml")).unwrap();
    fill_title_block(project.document_mut(), &mut RecordingNotifier::new()).unwrap();
    for page in project.document().pages() {
        assert_eq!(project.document().editable_texts(page).unwrap(), original);
    }
}
