use geojson::{Feature, GeoJson};
use live_model::{LatLng, StopInfo};
use serde_json::Value;

const DEFAULT_STOP_COLOR: &str = "#4a5568";
const DEFAULT_LINE_COLOR: &str = "#808080";

fn is_digit_prefixed(s: &str, prefix: &str) -> bool {
    s.strip_prefix(prefix)
        .and_then(|rest| rest.chars().next())
        .map_or(false, |c| c.is_ascii_digit())
}

/// Colour of a stop marker from its `desserte` property, a comma-separated
/// list of `LINE:DIRECTION` entries. The most significant mode served wins.
pub fn stop_color(desserte: Option<&str>) -> &'static str {
    let Some(desserte) = desserte else {
        return DEFAULT_STOP_COLOR;
    };
    let lines: Vec<&str> = desserte
        .split(',')
        .map(|entry| entry.split(':').next().unwrap_or_default())
        .collect();
    let any = |pred: fn(&str) -> bool| lines.iter().any(|l| pred(l));

    if any(|l| l == "A") {
        "#e63375"
    } else if any(|l| l == "B") {
        "#5688bf"
    } else if any(|l| l == "C") {
        "#f0ac00"
    } else if any(|l| l == "D") {
        "#24a858"
    } else if any(|l| l.starts_with('F')) {
        "#5e6e30"
    } else if any(|l| is_digit_prefixed(l, "T")) {
        "#864098"
    } else if any(|l| is_digit_prefixed(l, "TB")) {
        "#fdc210"
    } else if any(|l| l == "RX") {
        "#c9151d"
    } else if any(|l| is_digit_prefixed(l, "C")) {
        "#697a84"
    } else if any(|l| is_digit_prefixed(l, "")) {
        "#ea2e2e"
    } else {
        DEFAULT_STOP_COLOR
    }
}

/// Stroke colour of a line feature. Upstream sends `couleur` as `"R G B"`.
pub fn line_color(feature: &Feature) -> String {
    let Some(color) = feature.property("couleur").and_then(Value::as_str) else {
        return DEFAULT_LINE_COLOR.to_string();
    };
    if color.is_empty() {
        return DEFAULT_LINE_COLOR.to_string();
    }

    let parts: Vec<&str> = color.split(' ').collect();
    match parts.as_slice() {
        [r, g, b] => format!("rgb({r}, {g}, {b})"),
        _ => color.to_string(),
    }
}

/// Popup text for a line feature, e.g. `"METRO Line A: Perrache - Vaulx-en-Velin"`.
pub fn line_label(category: &str, feature: &Feature) -> Option<String> {
    let line = match feature.property("ligne")? {
        Value::String(s) => s.clone(),
        Value::Null => return None,
        other => other.to_string(),
    };
    let trace = feature
        .property("nom_trace")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some(format!("{} Line {}: {}", category.to_uppercase(), line, trace))
}

fn feature_id(feature: &Feature) -> Option<i64> {
    match feature.property("id")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn stop_from_feature(feature: &Feature) -> Option<StopInfo> {
    let id = feature_id(feature)?;
    let position = match &feature.geometry.as_ref()?.value {
        geojson::Value::Point(point) => LatLng::from_position(point)?,
        _ => return None,
    };
    let name = feature
        .property("nom")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .unwrap_or("Unknown Stop")
        .to_string();

    Some(StopInfo { id, name, position })
}

/// Selectable stops of the `stops` overlay. Features without an id or a
/// point geometry are skipped.
pub fn stops(geojson: &GeoJson) -> Vec<StopInfo> {
    match geojson {
        GeoJson::FeatureCollection(collection) => collection
            .features
            .iter()
            .filter_map(stop_from_feature)
            .collect(),
        GeoJson::Feature(feature) => stop_from_feature(feature).into_iter().collect(),
        GeoJson::Geometry(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STOPS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [4.8320, 45.7578]},
                "properties": {"id": 30004, "nom": "Bellecour", "desserte": "A:A,D:R,C20:A"}
            },
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [4.86, 45.76]},
                "properties": {"id": "1717", "nom": ""}
            },
            {
                "type": "Feature",
                "geometry": {"type": "LineString", "coordinates": [[4.8, 45.7], [4.9, 45.8]]},
                "properties": {"id": 5}
            },
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [4.8, 45.7]},
                "properties": {"nom": "No id"}
            }
        ]
    }"#;

    #[test]
    fn extracts_stops() {
        let geojson: GeoJson = STOPS.parse().unwrap();
        let stops = stops(&geojson);
        assert_eq!(2, stops.len());

        assert_eq!(30004, stops[0].id);
        assert_eq!("Bellecour", stops[0].name);
        assert_eq!(45.7578, stops[0].position.latitude);
        assert_eq!(4.8320, stops[0].position.longitude);

        assert_eq!(1717, stops[1].id);
        assert_eq!("Unknown Stop", stops[1].name);
    }

    #[test]
    fn stop_colors_follow_mode_priority() {
        assert_eq!("#e63375", stop_color(Some("C20:A,A:R")));
        assert_eq!("#24a858", stop_color(Some("D:A")));
        assert_eq!("#5e6e30", stop_color(Some("F1:A")));
        assert_eq!("#864098", stop_color(Some("T1:A,86:R")));
        assert_eq!("#fdc210", stop_color(Some("TB11:A")));
        assert_eq!("#c9151d", stop_color(Some("RX:A")));
        assert_eq!("#697a84", stop_color(Some("C3:A,86:R")));
        assert_eq!("#ea2e2e", stop_color(Some("86:A")));
        assert_eq!(DEFAULT_STOP_COLOR, stop_color(Some("S1:A")));
        assert_eq!(DEFAULT_STOP_COLOR, stop_color(None));
    }

    fn feature(properties: &str) -> Feature {
        let raw = format!(r#"{{"type": "Feature", "geometry": null, "properties": {properties}}}"#);
        match raw.parse::<GeoJson>().unwrap() {
            GeoJson::Feature(feature) => feature,
            other => panic!("expected a feature, got {other:?}"),
        }
    }

    #[test]
    fn line_colors() {
        assert_eq!("rgb(230, 51, 117)", line_color(&feature(r#"{"couleur": "230 51 117"}"#)));
        assert_eq!("#ff0000", line_color(&feature(r##"{"couleur": "#ff0000"}"##)));
        assert_eq!(DEFAULT_LINE_COLOR, line_color(&feature("{}")));
    }

    #[test]
    fn line_labels() {
        let f = feature(r#"{"ligne": "A", "nom_trace": "Perrache - Vaulx-en-Velin La Soie"}"#);
        assert_eq!(
            Some("METRO Line A: Perrache - Vaulx-en-Velin La Soie".to_string()),
            line_label("metro", &f)
        );
        assert_eq!(None, line_label("tram", &feature("{}")));
    }
}
