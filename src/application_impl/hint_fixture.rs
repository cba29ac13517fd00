use crate::application_port::HintError;
use crate::domain_model::NewHint;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct PointOfInterest {
    name: PoiName,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PoiName {
    en: String,
    fr: String,
    es: String,
    de: String,
    pt: String,
}

/// Parse a `{"x,y": [{"name": {"en": .., "fr": ..}}, ..]}` fixture. Extra POI fields
/// are ignored and missing translations become empty strings.
pub fn parse_hint_fixture(json: &str) -> Result<Vec<NewHint>, HintError> {
    let cells: BTreeMap<String, Vec<PointOfInterest>> =
        serde_json::from_str(json).map_err(|e| HintError::Fixture(e.to_string()))?;

    let mut hints = Vec::new();
    for (coord, pois) in cells {
        let (x, y) = parse_coord(&coord)?;
        hints.extend(pois.into_iter().map(|poi| NewHint {
            pos_x: x,
            pos_y: y,
            hint_en: poi.name.en,
            hint_fr: poi.name.fr,
            hint_es: poi.name.es,
            hint_de: poi.name.de,
            hint_pt: poi.name.pt,
        }));
    }
    Ok(hints)
}

fn parse_coord(coord: &str) -> Result<(i32, i32), HintError> {
    let bad = || HintError::Fixture(format!("bad coordinate {coord:?}"));
    let (x, y) = coord.split_once(',').ok_or_else(bad)?;
    let x = x.trim().parse().map_err(|_| bad())?;
    let y = y.trim().parse().map_err(|_| bad())?;
    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_cells_into_hints() {
        let json = r#"{
            "3,-4": [
                {"id": 1, "className": "x", "name": {"en": "Well", "fr": "Puits", "es": "Pozo", "de": "Brunnen", "pt": "Poco"}},
                {"id": 2, "name": {"en": "Tree"}}
            ],
            "0,0": []
        }"#;

        let hints = parse_hint_fixture(json).unwrap();

        assert_eq!(hints.len(), 2);
        assert_eq!((hints[0].pos_x, hints[0].pos_y), (3, -4));
        assert_eq!(hints[0].hint_de, "Brunnen");
        assert_eq!(hints[1].hint_en, "Tree");
        assert_eq!(hints[1].hint_fr, "");
    }

    #[test]
    fn rejects_malformed_coordinates() {
        let err = parse_hint_fixture(r#"{"3;4": []}"#).unwrap_err();
        assert!(matches!(err, HintError::Fixture(_)));
    }
}
