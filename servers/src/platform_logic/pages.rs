//! Public pages served behind the access gate: the home page rendering the
//! content tree, the read-only JSON views and the health probe.

use axum::{
    Extension, Json,
    extract::State,
    response::Html,
};
use serde_json::{Value, json};

use lib_platform::access::{AccessState, inject_ad_markup};
use lib_platform::models::{Batch, LiveClass};

use crate::platform_logic::state::AppState;

/// Home page: the batch catalogue rendered from the current snapshot. In
/// ads mode the ad script and placeholder panel are appended to the page.
pub async fn home(
    State(state): State<AppState>,
    Extension(access): Extension<AccessState>,
) -> Html<String> {
    let snapshot = state.snapshot().await;
    let page = render_home(&snapshot.batches, &snapshot.live_classes);

    match access {
        AccessState::Ads => Html(inject_ad_markup(&page, state.config().ad_script_url())),
        _ => Html(page),
    }
}

/// Read-only JSON view of the content tree, served from the in-memory
/// snapshot without touching the database.
pub async fn api_batches(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.snapshot().await;
    Json(json!({ "batches": snapshot.batches }))
}

/// Read-only JSON view of the live-class schedule, soonest first.
pub async fn api_live_classes(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.snapshot().await;
    Json(json!({ "live_classes": snapshot.live_classes }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn render_home(batches: &[Batch], live_classes: &[LiveClass]) -> String {
    let mut body = String::new();

    body.push_str("<h1>Batches</h1>");
    if batches.is_empty() {
        body.push_str("<p>No batches available yet.</p>");
    }
    for batch in batches {
        body.push_str(&format!(
            r#"<section class="batch"><h2>{}</h2>"#,
            escape_html(&batch.name)
        ));
        if let Some(description) = &batch.description {
            body.push_str(&format!("<p>{}</p>", escape_html(description)));
        }
        for subject in &batch.subjects {
            body.push_str(&format!(
                r#"<div class="subject {}"><h3>{}</h3><ul>"#,
                escape_html(&subject.color),
                escape_html(&subject.name)
            ));
            for chapter in &subject.chapters {
                body.push_str(&format!(
                    "<li>{} ({} lectures)</li>",
                    escape_html(&chapter.title),
                    chapter.lectures.len()
                ));
            }
            body.push_str("</ul></div>");
        }
        body.push_str("</section>");
    }

    body.push_str("<h1>Live Classes</h1>");
    if live_classes.is_empty() {
        body.push_str("<p>No live classes scheduled.</p>");
    }
    for class in live_classes {
        body.push_str(&format!(
            r#"<div class="live-class"><span>{}</span> <span>{}</span> <span>{}</span></div>"#,
            escape_html(&class.title),
            class.scheduled_at.format("%Y-%m-%d %H:%M UTC"),
            class.status.as_str()
        ));
    }

    format!(
        concat!(
            "<!DOCTYPE html><html><head><title>Study Platform</title></head>",
            "<body>{}</body></html>"
        ),
        body
    )
}

// Titles and descriptions are operator input but still end up in markup.
fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use lib_platform::models::{Chapter, LiveStatus, Subject};
    use uuid::Uuid;

    fn sample_batch() -> Batch {
        let now = Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 0).unwrap();
        let batch_id = Uuid::new_v4();
        let subject_id = Uuid::new_v4();
        Batch {
            id: batch_id,
            name: "JEE 2027 <Alpha>".to_string(),
            description: Some("Physics & Maths".to_string()),
            assigned_uploaders: vec![],
            subjects: vec![Subject {
                id: subject_id,
                batch_id,
                name: "Physics".to_string(),
                color: "bg-blue-500".to_string(),
                chapters: vec![Chapter {
                    id: Uuid::new_v4(),
                    subject_id,
                    title: "Kinematics".to_string(),
                    order_index: 1,
                    lectures: vec![],
                    created_at: now,
                    updated_at: now,
                }],
                created_at: now,
                updated_at: now,
            }],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn home_page_escapes_operator_input() {
        let page = render_home(&[sample_batch()], &[]);
        assert!(page.contains("JEE 2027 &lt;Alpha&gt;"));
        assert!(page.contains("Physics &amp; Maths"));
        assert!(!page.contains("<Alpha>"));
        assert!(page.contains("Kinematics (0 lectures)"));
    }

    #[test]
    fn empty_snapshot_renders_placeholders() {
        let page = render_home(&[], &[]);
        assert!(page.contains("No batches available yet."));
        assert!(page.contains("No live classes scheduled."));
    }

    #[test]
    fn live_classes_render_schedule_and_status() {
        let now = Utc.with_ymd_and_hms(2026, 9, 1, 14, 30, 0).unwrap();
        let class = LiveClass {
            id: Uuid::new_v4(),
            batch_id: Uuid::new_v4(),
            subject_id: Uuid::new_v4(),
            chapter_id: Uuid::new_v4(),
            title: "Doubt session".to_string(),
            live_url: "https://meet.example/abc".to_string(),
            scheduled_at: now,
            status: LiveStatus::Live,
            created_at: now,
            updated_at: now,
        };
        let page = render_home(&[], &[class]);
        assert!(page.contains("Doubt session"));
        assert!(page.contains("2026-09-01 14:30 UTC"));
        assert!(page.contains("live"));
    }

    #[test]
    fn escape_html_covers_the_special_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }
}
