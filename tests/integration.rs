use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use cmdtab::config_file::{ConfigError, ConfigStore, LoadSource};
use cmdtab::form::FormError;
use cmdtab::form::row::{ParameterRow, RowKind};
use cmdtab::form::tab::TabPage;
use cmdtab::launch::ShellFamily;
use cmdtab::session::{Session, SessionError};
use cmdtab::tui::app::App;
use cmdtab::tui::log_state::LogBuffer;

fn store_in(dir: &std::path::Path) -> ConfigStore {
    ConfigStore::new(dir.join("cmdtab.json"))
}

fn write_example(dir: &std::path::Path, content: &str) {
    std::fs::write(dir.join("cmdtab.json.example"), content).unwrap();
}

#[test]
fn test_save_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());

    let mut session = Session::new();
    let index = session.add_tab(Some("Vision"));
    let tab = session.tab_mut(index).unwrap();
    tab.work_dir = "vision".to_string();
    tab.rows = vec![
        ParameterRow::new(RowKind::Toggle, "-m", "qwen-vl-max").with_options(["qwen-vl-max", "x"]),
        ParameterRow::new(RowKind::File, "-i", "./cat.png"),
        ParameterRow::new(RowKind::Directory, "-o", "out dir"),
        ParameterRow::new(RowKind::Text, "-dq", "describe\nthis"),
    ];
    session.select(0).unwrap();

    store.save(&session).unwrap();
    let loaded = store.load();

    assert!(loaded.error.is_none());
    assert_eq!(
        loaded.source,
        LoadSource::Primary(dir.path().join("cmdtab.json"))
    );
    assert_eq!(loaded.session, session);
}

#[test]
fn test_saved_file_keeps_type_tags_unescaped() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());
    store.save(&Session::new()).unwrap();

    let text = std::fs::read_to_string(store.path()).unwrap();
    assert!(text.contains(r#""type": "开关""#));
    assert!(text.contains(r#""type": "文本""#));
    assert!(text.contains(r#""last_selected_tab": 0"#));
}

#[test]
fn test_load_without_files_gives_default_tab() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = store_in(dir.path()).load();

    assert!(loaded.error.is_none());
    assert_eq!(loaded.source, LoadSource::Default);
    assert_eq!(loaded.session, Session::new());
}

#[test]
fn test_load_falls_back_to_example() {
    let dir = tempfile::tempdir().unwrap();
    write_example(
        dir.path(),
        r#"{"tabs": [{"name": "From example", "config": {"main_cmd": "ls"}}], "last_selected_tab": 0}"#,
    );
    let loaded = store_in(dir.path()).load();

    assert!(loaded.error.is_none());
    assert!(matches!(loaded.source, LoadSource::Example(_)));
    assert_eq!(loaded.session.current().name, "From example");
    assert_eq!(loaded.session.current().main_cmd, "ls");
    assert!(loaded.session.current().rows.is_empty());
}

#[test]
fn test_primary_file_wins_over_example() {
    let dir = tempfile::tempdir().unwrap();
    write_example(dir.path(), r#"{"tabs": [{"name": "example"}]}"#);
    std::fs::write(
        dir.path().join("cmdtab.json"),
        r#"{"tabs": [{"name": "primary"}]}"#,
    )
    .unwrap();

    let loaded = store_in(dir.path()).load();
    assert_eq!(loaded.session.current().name, "primary");
}

#[test]
fn test_malformed_file_reports_error_and_uses_default() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("cmdtab.json"), "{ not json").unwrap();

    let loaded = store_in(dir.path()).load();
    assert!(matches!(loaded.error, Some(ConfigError::Json { .. })));
    assert_eq!(loaded.source, LoadSource::Default);
    assert_eq!(loaded.session, Session::new());
}

#[test]
fn test_missing_fields_take_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("cmdtab.json"),
        r#"{"tabs": [{"name": "a", "config": {"rows": [{"key": "-v"}, {"type": "bogus", "value": "x"}]}}, {}], "last_selected_tab": 7}"#,
    )
    .unwrap();

    let session = store_in(dir.path()).load().session;
    assert_eq!(session.len(), 2);
    assert_eq!(session.selected(), 0);
    let rows = &session.current().rows;
    assert_eq!(rows[0], ParameterRow::new(RowKind::Toggle, "-v", ""));
    assert_eq!(rows[1], ParameterRow::new(RowKind::Toggle, "", "x"));
    assert_eq!(session.tabs()[1].name, "Tab");
}

#[test]
fn test_bad_fields_keep_saved_tabs() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("cmdtab.json"),
        r#"{"tabs": [
            {"name": "a", "config": {"rows": [{"type": "开关", "key": null, "value": "-l"}]}},
            {"name": "b"}
        ], "last_selected_tab": null}"#,
    )
    .unwrap();

    let loaded = store_in(dir.path()).load();
    assert!(loaded.error.is_none());
    assert!(matches!(loaded.source, LoadSource::Primary(_)));
    let names: Vec<&str> = loaded.session.tabs().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(loaded.session.selected(), 0);
    assert_eq!(
        loaded.session.current().rows,
        vec![ParameterRow::new(RowKind::Toggle, "", "-l")]
    );
}

#[test]
fn test_init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());

    store.init(&Session::new(), false).unwrap();
    assert!(matches!(
        store.init(&Session::new(), false),
        Err(ConfigError::AlreadyExists(_))
    ));
    store.init(&Session::new(), true).unwrap();
}

#[test]
fn test_reset_all_reloads_example() {
    let dir = tempfile::tempdir().unwrap();
    write_example(
        dir.path(),
        r#"{"tabs": [{"name": "one"}, {"name": "two"}], "last_selected_tab": 1}"#,
    );
    let store = store_in(dir.path());
    let loaded = cmdtab::config_file::LoadOutcome {
        session: Session::new(),
        source: LoadSource::Default,
        error: None,
    };
    let mut app = App::new(store, loaded, LogBuffer::new());

    app.reset_all();
    let names: Vec<&str> = app.session.tabs().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["one", "two"]);
    assert_eq!(app.session.selected(), 1);
}

#[test]
fn test_tab_lifecycle() {
    let mut session = Session::new();
    assert_eq!(session.remove_tab(0), Err(SessionError::LastTab));

    let copy = session.copy_tab(0).unwrap();
    assert_eq!(session.tabs()[copy].name, "Tab 1 (copy)");
    let copy = session.copy_tab(0).unwrap();
    assert_eq!(session.tabs()[copy].name, "Tab 1 (copy) (1)");
    assert_eq!(session.selected(), copy);

    assert_eq!(session.rename_tab(0, "  "), Err(SessionError::EmptyName));
    session.rename_tab(0, " Main ").unwrap();
    assert_eq!(session.tabs()[0].name, "Main");

    session.remove_tab(copy).unwrap();
    assert_eq!(session.len(), 2);
    assert!(session.selected() < session.len());
}

#[test]
fn test_preview_and_execution_commands() {
    let mut tab = TabPage::empty("t");
    tab.main_cmd = "bash qwen".to_string();
    tab.rows = vec![
        ParameterRow::new(RowKind::Toggle, "-m", "qwen-max-latest"),
        ParameterRow::new(RowKind::Text, "-dq", "  tell me a joke  "),
    ];

    assert_eq!(
        tab.build_preview().unwrap(),
        "bash qwen -m qwen-max-latest -dq 'tell me a joke'"
    );

    let execution = tab.build_execution().unwrap();
    let encoded = execution.rsplit(' ').next().unwrap();
    assert_eq!(STANDARD.decode(encoded).unwrap(), b"tell me a joke");

    tab.work_dir = "a_qwen_cli".to_string();
    assert_eq!(
        tab.preview_script(ShellFamily::Posix).unwrap(),
        "cd \"a_qwen_cli\"\nbash qwen -m qwen-max-latest -dq 'tell me a joke'"
    );

    tab.main_cmd = "   ".to_string();
    assert_eq!(tab.build_preview(), Err(FormError::MissingMainCommand));
}
