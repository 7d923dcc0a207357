//! Navigator behavior over generated record sets and real files.

use pairview_navigator::{Direction, Labels, Navigator, NavigatorError, NavigatorEvent};
use proptest::prelude::*;

fn records_json(n: usize) -> String {
    let items: Vec<String> = (0..n)
        .map(|i| format!(r#"{{"section_1_id": "s{i}", "section_1_content": "line\nline"}}"#))
        .collect();
    format!("[{}]", items.join(","))
}

proptest! {
    #[test]
    fn load_sets_total_and_first_index(n in 0usize..40) {
        let mut nav = Navigator::default();
        nav.load(&records_json(n)).unwrap();

        let pos = nav.position();
        prop_assert_eq!(pos.total, n);
        prop_assert_eq!(pos.index, if n > 0 { Some(0) } else { None });
    }

    #[test]
    fn select_changes_index_only_in_range(n in 1usize..30, start in 0usize..30, target in 0usize..60) {
        let mut nav = Navigator::default();
        nav.load(&records_json(n)).unwrap();
        nav.select(start);
        let before = nav.active_index();

        nav.select(target);
        if target < n {
            prop_assert_eq!(nav.active_index(), Some(target));
        } else {
            prop_assert_eq!(nav.active_index(), before);
        }
    }

    #[test]
    fn stepping_saturates_at_both_ends(n in 1usize..30, extra in 0usize..5) {
        let mut nav = Navigator::default();
        nav.load(&records_json(n)).unwrap();

        for _ in 0..(n + extra) {
            nav.step(Direction::Next);
        }
        prop_assert_eq!(nav.active_index(), Some(n - 1));
        prop_assert!(!nav.step(Direction::Next));

        for _ in 0..(n + extra) {
            nav.step(Direction::Previous);
        }
        prop_assert_eq!(nav.active_index(), Some(0));
        prop_assert!(!nav.step(Direction::Previous));
    }

    #[test]
    fn progress_is_a_fraction(n in 1usize..50, target in 0usize..50) {
        let mut nav = Navigator::default();
        nav.load(&records_json(n)).unwrap();
        nav.select(target);

        let index = nav.active_index().unwrap();
        let fraction = nav.progress_fraction();
        prop_assert!((0.0..=1.0).contains(&fraction));
        prop_assert!((fraction - (index + 1) as f64 / n as f64).abs() < 1e-12);
    }

    #[test]
    fn rejected_input_leaves_state(n in 1usize..20, target in 0usize..20, bad in prop_oneof![
        Just("{}".to_string()),
        Just("3".to_string()),
        Just("\"text\"".to_string()),
        Just("[{".to_string()),
        Just(String::new()),
    ]) {
        let mut nav = Navigator::default();
        nav.load(&records_json(n)).unwrap();
        nav.select(target);
        let before = nav.position();

        prop_assert!(nav.load(&bad).is_err());
        prop_assert_eq!(nav.position(), before);
    }
}

#[tokio::test]
async fn test_load_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sections.json");
    std::fs::write(&path, records_json(3)).unwrap();

    let mut nav = Navigator::new(Labels::english());
    let total = nav.load_file(&path).await.unwrap();
    assert_eq!(total, 3);

    let view = nav.current_view().unwrap();
    assert_eq!(view.label, "Compare s0 and Section 2");
    assert_eq!(view.sections[0].body_html, "line<br>line");
}

#[tokio::test]
async fn test_load_file_rejects_non_json_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sections.txt");
    std::fs::write(&path, records_json(2)).unwrap();

    let mut nav = Navigator::default();
    let err = nav.load_file(&path).await.unwrap_err();
    assert!(matches!(err, NavigatorError::UnsupportedFile { .. }));
    assert_eq!(nav.position().total, 0);
    assert!(nav.drain_events().is_empty());
}

#[tokio::test]
async fn test_load_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let mut nav = Navigator::new(Labels::english());
    nav.load(&records_json(2)).unwrap();
    nav.drain_events();

    let err = nav
        .load_file(dir.path().join("absent.json"))
        .await
        .unwrap_err();
    assert!(matches!(err, NavigatorError::Io { .. }));
    assert_eq!(nav.position().total, 2);

    let events = nav.drain_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], NavigatorEvent::LoadFailed { .. }));
    let note = events[0].notification(nav.labels()).unwrap();
    assert!(note.message.contains("absent.json"));
}

#[tokio::test]
async fn test_invalid_file_reports_parse_message() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, r#"{"section_1_id": "A"}"#).unwrap();

    let mut nav = Navigator::new(Labels::english());
    assert!(nav.load_file(&path).await.is_err());

    let events = nav.drain_events();
    let note = events[0].notification(nav.labels()).unwrap();
    assert!(note.message.starts_with("Invalid JSON file:"));
    assert!(note.message.contains("not an array"));
    assert!(matches!(events[0], NavigatorEvent::LoadFailed { .. }));
}
