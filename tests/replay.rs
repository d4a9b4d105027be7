use std::path::Path;

use sweatshares::replay::{replay_session, run_script, snapshot, ReplayScript};
use sweatshares::EditorSettings;
use sweatshares_signing::SubmissionError;
use tempfile::TempDir;
use uuid::Uuid;

const RECEIVER: &str = "5f0e3a0c-2b7a-4e35-9d3f-7c1b8e2f4a61";

fn script(events: &str) -> ReplayScript {
    let json = format!(
        r#"{{
            "document_url": "https://vault.example/term-sheet.pdf",
            "pages": [
                {{ "width": 612, "height": 792 }},
                {{ "width": 612, "height": 792 }}
            ],
            "container": {{ "width": 612, "height": 792 }},
            "events": {events},
            "request": {{ "receiver_id": "{RECEIVER}", "message": "Please sign" }}
        }}"#
    );
    serde_json::from_str(&json).unwrap()
}

#[tokio::test]
async fn test_replay_add_and_drag() {
    let script = script(
        r#"[
            { "type": "pointer_down", "x": 150, "y": 100 },
            { "type": "pointer_up", "x": 150, "y": 100 },
            { "type": "pointer_down", "x": 150, "y": 100 },
            { "type": "pointer_move", "x": 200, "y": 100 },
            { "type": "pointer_up", "x": 200, "y": 100 }
        ]"#,
    );

    let request = run_script(&script, EditorSettings::default()).await.unwrap();
    assert_eq!(request.receiver_id, Uuid::parse_str(RECEIVER).unwrap());
    assert_eq!(request.fields.len(), 1);
    let field = &request.fields[0];
    assert_eq!(field.page_number, 1);
    assert!((field.x_position - 50.0).abs() < 1e-9);
    assert!((field.y_position - 617.0).abs() < 1e-9);
    assert_eq!(field.width, 300.0);
    assert_eq!(field.height, 150.0);
    assert_eq!(field.field_label, "Signature");
}

#[tokio::test]
async fn test_replay_across_pages_and_zoom() {
    let script = script(
        r#"[
            { "type": "pointer_down", "x": 306, "y": 396 },
            { "type": "pointer_up", "x": 306, "y": 396 },
            { "type": "set_label", "page": 1, "label": "Founder" },
            { "type": "next_page" },
            { "type": "wheel", "delta_y": -1, "modifier": true },
            { "type": "pointer_down", "x": 306, "y": 396 },
            { "type": "pointer_up", "x": 306, "y": 396 },
            { "type": "set_required", "page": 2, "required": false }
        ]"#,
    );

    let request = run_script(&script, EditorSettings::default()).await.unwrap();
    assert_eq!(request.fields.len(), 2);
    assert_eq!(request.fields[0].field_label, "Founder");
    assert!(request.fields[0].required);
    assert_eq!(request.fields[1].page_number, 2);
    assert!(!request.fields[1].required);
    // Placed at zoom 1.1, so the default size is smaller in PDF units.
    assert!((request.fields[1].scale - 1.1).abs() < 1e-9);
    assert!((request.fields[1].width - 300.0 / 1.1).abs() < 1e-9);
}

#[tokio::test]
async fn test_replay_delete_leaves_nothing_to_send() {
    let script = script(
        r#"[
            { "type": "pointer_down", "x": 150, "y": 100 },
            { "type": "pointer_up", "x": 150, "y": 100 },
            { "type": "key", "key": "delete" }
        ]"#,
    );

    let err = run_script(&script, EditorSettings::default()).await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<SubmissionError>(),
        Some(&SubmissionError::NoFields)
    );
}

#[tokio::test]
async fn test_replay_unknown_field_page_fails() {
    let script = script(r#"[ { "type": "set_label", "page": 2, "label": "CFO" } ]"#);
    let err = run_script(&script, EditorSettings::default()).await.unwrap_err();
    assert!(err.to_string().contains("page 2"), "{err}");
}

#[tokio::test]
async fn test_snapshot_outlines_field() {
    let script = script(
        r#"[
            { "type": "pointer_down", "x": 150, "y": 100 },
            { "type": "pointer_up", "x": 150, "y": 100 }
        ]"#,
    );
    let editor = replay_session(&script, EditorSettings::default()).await.unwrap();
    let bitmap = snapshot(&editor).unwrap();

    assert_eq!(bitmap.dimensions(), (612, 792));
    // Top-left corner of the field at viewer (0, 25).
    assert_ne!(bitmap.get_pixel(0, 25).0, [255, 255, 255, 255]);
    assert_eq!(bitmap.get_pixel(300, 400).0, [255, 255, 255, 255]);
}

#[tokio::test]
async fn test_script_and_settings_from_files() {
    let dir = TempDir::new().unwrap();
    let script_path = dir.path().join("session.json");
    let json = serde_json::to_string(&script(
        r#"[
            { "type": "pointer_down", "x": 150, "y": 100 },
            { "type": "pointer_up", "x": 150, "y": 100 }
        ]"#,
    ))
    .unwrap();
    std::fs::write(&script_path, json).unwrap();

    let mut settings = EditorSettings::default();
    settings.fields.default_label = "Sign here".to_string();
    settings.request.default_expiration_days = 30;
    let settings_path = dir.path().join("editor.toml");
    settings.save_to_file(&settings_path).unwrap();

    let loaded = ReplayScript::load(&script_path).unwrap();
    let settings = EditorSettings::load_from_file(&settings_path).unwrap();
    let request = run_script(&loaded, settings).await.unwrap();
    assert_eq!(request.fields[0].field_label, "Sign here");
    assert_eq!(request.expires_in_days, 30);

    assert!(ReplayScript::load(Path::new("/nonexistent/session.json")).is_err());
}
