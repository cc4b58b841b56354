//! Page-title stamp
//!
//! A text-box visual whose paragraphs read `<label><page name>` gets the page
//! name run rewritten for each target page.

use serde_json::Value;

/// Set the second text run of every paragraph to `page_name`
///
/// Walks `visual.objects.general[*].properties.paragraphs[*].textRuns`.
/// Paragraphs with fewer than two runs are left alone. Returns the number of
/// runs changed.
pub fn stamp_page_title(doc: &mut Value, page_name: &str) -> usize {
    let Some(general) = doc
        .pointer_mut("/visual/objects/general")
        .and_then(Value::as_array_mut)
    else {
        return 0;
    };

    let mut changed = 0;
    for entry in general {
        let Some(paragraphs) = entry
            .pointer_mut("/properties/paragraphs")
            .and_then(Value::as_array_mut)
        else {
            continue;
        };
        for paragraph in paragraphs {
            let Some(run) = paragraph
                .get_mut("textRuns")
                .and_then(Value::as_array_mut)
                .and_then(|runs| runs.get_mut(1))
                .and_then(Value::as_object_mut)
            else {
                continue;
            };
            if run.get("value").and_then(Value::as_str) != Some(page_name) {
                run.insert("value".to_string(), Value::String(page_name.to_string()));
                changed += 1;
            }
        }
    }
    changed
}
