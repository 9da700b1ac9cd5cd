use playgrab_core::TriggerControl;
use serde::Deserialize;
use serde_json::Value;

use crate::{ControlMarker, EngineError, PageDriver, ProtocolStage};

/// Synthetic ids are `play0`, `play1`, ... in document order.
pub const CONTROL_ID_PREFIX: &str = "play";

#[derive(Debug, Deserialize)]
struct RawControl {
    id: String,
    #[serde(rename = "ariaLabel", default)]
    aria_label: Option<String>,
}

/// In-page script that tags every control matching `selector` with
/// `marker_attribute = "play<i>"` and returns `[{id, ariaLabel}]`.
///
/// The label is the `aria-label` of the closest enclosing link, or empty.
pub fn extraction_script(selector: &str, marker_attribute: &str) -> String {
    format!(
        r#"(() => {{
    const out = [];
    document.querySelectorAll({selector}).forEach((el, i) => {{
        const id = {prefix} + i;
        el.setAttribute({attribute}, id);
        const anchor = el.closest("a");
        const label = anchor ? anchor.getAttribute("aria-label") : "";
        out.push({{ id: id, ariaLabel: label ? label : "" }});
    }});
    return out;
}})()"#,
        selector = js_string(selector),
        prefix = js_string(CONTROL_ID_PREFIX),
        attribute = js_string(marker_attribute),
    )
}

/// In-page script that clicks the marked control. Evaluates to `false` when
/// the element is no longer in the document.
pub fn activation_script(marker: &ControlMarker) -> String {
    format!(
        r#"(() => {{
    const el = document.querySelector({selector});
    if (!el) {{
        return false;
    }}
    el.click();
    return true;
}})()"#,
        selector = js_string(&marker.selector()),
    )
}

/// Runs the extraction script once and returns the controls in document order.
pub async fn extract_controls(
    driver: &dyn PageDriver,
    selector: &str,
    marker_attribute: &str,
) -> Result<Vec<TriggerControl>, EngineError> {
    let value = driver
        .evaluate(&extraction_script(selector, marker_attribute))
        .await?;
    parse_controls(value)
}

/// Converts the extraction script's result into controls.
///
/// `null` (an engine that returns nothing for an empty result) maps to no controls.
pub fn parse_controls(value: Value) -> Result<Vec<TriggerControl>, EngineError> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    let raw: Vec<RawControl> = serde_json::from_value(value)
        .map_err(|err| EngineError::protocol(ProtocolStage::Extract, err.to_string()))?;
    Ok(raw
        .into_iter()
        .map(|control| TriggerControl::new(control.id, control.aria_label.unwrap_or_default()))
        .collect())
}

fn js_string(text: &str) -> String {
    Value::from(text).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_controls_in_order() {
        let controls = parse_controls(json!([
            { "id": "play0", "ariaLabel": "Play First" },
            { "id": "play1", "ariaLabel": "" },
            { "id": "play2" },
        ]))
        .unwrap();

        assert_eq!(
            controls,
            vec![
                TriggerControl::new("play0", "Play First"),
                TriggerControl::new("play1", ""),
                TriggerControl::new("play2", ""),
            ]
        );
    }

    #[test]
    fn null_and_empty_results_mean_no_controls() {
        assert!(parse_controls(Value::Null).unwrap().is_empty());
        assert!(parse_controls(json!([])).unwrap().is_empty());
    }

    #[test]
    fn malformed_result_is_an_extract_error() {
        let err = parse_controls(json!({ "id": "play0" })).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Protocol {
                stage: ProtocolStage::Extract,
                ..
            }
        ));
    }

    #[test]
    fn scripts_quote_their_inputs() {
        let script = extraction_script("div.play_status", "data-ccid");
        assert!(script.contains(r#"document.querySelectorAll("div.play_status")"#));
        assert!(script.contains(r#"el.setAttribute("data-ccid", id)"#));

        let click = activation_script(&ControlMarker::new("data-ccid", "play4"));
        assert!(click.contains(r#"document.querySelector("[data-ccid=\"play4\"]")"#));
    }
}
