//! Conversion between droppable container ids / sortable payloads and `Locator`s.
//!
//! Every column renders as a droppable container keyed `"{page}.{column}"`, and every
//! section as a sortable item carrying a `SortablePayload` that names its container and
//! its index inside it.

use serde::{Deserialize, Serialize};

use crate::layout::model::{ColumnKind, LayoutError, Locator};

/// Drag payload attached to a sortable section node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortablePayload {
    pub container_id: String,
    pub index: usize,
}

pub fn encode_column_id(page: usize, column: ColumnKind) -> String {
    format!("{page}.{}", column.index())
}

pub fn decode_column_id(id: &str) -> Result<(usize, ColumnKind), LayoutError> {
    let invalid = || LayoutError::InvalidColumnId(id.to_string());

    let (page, column) = id.split_once('.').ok_or_else(invalid)?;
    let page: usize = page.parse().map_err(|_| invalid())?;
    let column: u8 = column.parse().map_err(|_| invalid())?;
    let column = ColumnKind::try_from(column).map_err(|_| invalid())?;
    Ok((page, column))
}

/// Decodes the locator carried by a sortable item.
///
/// A missing payload or an undecodable container id is `MalformedPayload`; callers abort
/// the gesture without touching the layout.
pub fn parse_layout_locator(payload: Option<&SortablePayload>) -> Result<Locator, LayoutError> {
    let payload =
        payload.ok_or_else(|| LayoutError::MalformedPayload("payload is missing".to_string()))?;
    let (page, column) = decode_column_id(&payload.container_id)
        .map_err(|e| LayoutError::MalformedPayload(e.to_string()))?;
    Ok(Locator::new(page, column, payload.index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_id_round_trip() {
        for page in [0usize, 1, 7, 120] {
            for column in ColumnKind::ALL {
                let id = encode_column_id(page, column);
                assert_eq!(decode_column_id(&id).unwrap(), (page, column));
            }
        }
    }

    #[test]
    fn test_encode_column_id_format() {
        assert_eq!(encode_column_id(3, ColumnKind::Sidebar), "3.1");
        assert_eq!(encode_column_id(0, ColumnKind::Main), "0.0");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        for bad in ["", "0", "a.0", "0.b", "0.2", "-1.0", "0.0.0"] {
            assert!(
                matches!(decode_column_id(bad), Err(LayoutError::InvalidColumnId(_))),
                "'{bad}' should not decode"
            );
        }
    }

    #[test]
    fn test_parse_locator_from_payload() {
        let payload = SortablePayload {
            container_id: "1.0".to_string(),
            index: 4,
        };
        let loc = parse_layout_locator(Some(&payload)).unwrap();
        assert_eq!(loc, Locator::new(1, ColumnKind::Main, 4));
    }

    #[test]
    fn test_parse_locator_missing_payload_is_malformed() {
        assert!(matches!(
            parse_layout_locator(None),
            Err(LayoutError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_parse_locator_bad_container_is_malformed() {
        let payload = SortablePayload {
            container_id: "sidebar".to_string(),
            index: 0,
        };
        assert!(matches!(
            parse_layout_locator(Some(&payload)),
            Err(LayoutError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_payload_wire_format_is_camel_case() {
        let payload: SortablePayload =
            serde_json::from_value(serde_json::json!({"containerId": "0.1", "index": 2}))
                .unwrap();
        assert_eq!(payload.container_id, "0.1");
        assert_eq!(payload.index, 2);
    }
}
