use focus_veil::config::{Config, ConfigError};
use focus_veil::editor::{Editor, PointerButton};

fn draw_area(editor: &mut Editor, x1: f32, y1: f32, x2: f32, y2: f32) {
    editor.pointer_press(x1, y1, PointerButton::Left);
    editor.pointer_drag(x2, y2);
    editor.pointer_release();
}

#[test]
fn editor_state_survives_a_save_load_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("focus_veil_config.json");

    let mut editor = Editor::new();
    draw_area(&mut editor, 10.0, 20.0, 110.0, 220.0);
    draw_area(&mut editor, 300.0, 300.0, 500.0, 450.0);
    editor.set_veil_color("#102030".to_string());
    editor.set_veil_opacity(0.66);
    editor.set_peek_through_opacity(0.25);
    editor.set_show_quick_start_on_startup(false);

    editor.snapshot().save(&path).unwrap();

    let mut restored = Editor::new();
    restored.apply(&Config::load(&path).unwrap());
    assert_eq!(restored.areas().len(), 2);
    assert_eq!(restored.veil_color(), "#102030");
    assert_eq!(restored.veil_opacity(), 0.66);
    assert_eq!(restored.peek_through_opacity(), 0.25);
    assert!(!restored.show_quick_start_on_startup());
    for (a, b) in editor.areas().iter().zip(restored.areas()) {
        assert_eq!(a.bounds(), b.bounds());
    }
}

#[test]
fn hand_written_config_with_extra_fields_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg.json");
    std::fs::write(
        &path,
        r##"{
            "veil_color": "#000000",
            "veil_opacity": 0.9,
            "focus_areas": [[0, 0, 640, 480]],
            "some_future_field": true
        }"##,
    )
    .unwrap();

    let cfg = Config::load(&path).unwrap();
    assert_eq!(cfg.veil_color, "#000000");
    assert_eq!(cfg.veil_opacity, 0.9);
    assert_eq!(cfg.peek_through_opacity, 0.55);
    assert_eq!(cfg.focus_areas, vec![[0.0, 0.0, 640.0, 480.0]]);
}

#[test]
fn malformed_file_reports_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "[1, 2").unwrap();

    match Config::load(&path) {
        Err(err @ ConfigError::Parse { .. }) => {
            assert!(err.to_string().contains("broken.json"));
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn save_creates_readable_pretty_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg.json");
    Config::default().save(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"veil_color\": \"#0C0000\""));
    assert!(text.lines().count() > 1);
}
