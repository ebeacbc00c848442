//! The webhook wire format.
//!
//! The remote stores events in a sheet-backed workflow whose JSON uses the
//! literal key `"nama acara"` (with a space) and, on fetched rows, a
//! `row_number` index. List responses come in three shapes: a bare array,
//! or an object wrapping the array under `data` or `events`.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::event::{Dresscode, Event};

/// One event as the webhook sends and accepts it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEvent {
    #[serde(default, deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(rename = "nama acara", alias = "namaAcara", default)]
    pub nama_acara: String,
    #[serde(default)]
    pub tanggal: String,
    #[serde(default)]
    pub waktu: String,
    #[serde(default)]
    pub lokasi: String,
    #[serde(default)]
    pub dresscode: String,
    #[serde(default)]
    pub note: String,
    /// Server-side row index. Read on fetch, never sent back on create.
    #[serde(default, skip_serializing)]
    pub row_number: Option<i64>,
}

impl ApiEvent {
    /// Map a wire record into the internal model.
    pub fn into_event(self) -> Event {
        Event {
            id: self.id,
            nama_acara: self.nama_acara,
            tanggal: self.tanggal,
            waktu: self.waktu,
            lokasi: self.lokasi,
            dresscode: Dresscode::parse(&self.dresscode),
            note: self.note,
            row_number: self.row_number,
        }
    }

    /// Map an internal event into the wire shape for a create call.
    pub fn from_event(event: &Event) -> ApiEvent {
        ApiEvent {
            id: event.id.clone(),
            nama_acara: event.nama_acara.clone(),
            tanggal: event.tanggal.clone(),
            waktu: event.waktu.clone(),
            lokasi: event.lokasi.clone(),
            dresscode: event
                .dresscode
                .map(|d| d.label().to_string())
                .unwrap_or_default(),
            note: event.note.clone(),
            row_number: None,
        }
    }
}

/// Sheet rows sometimes carry numeric ids; the internal model keys on strings.
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
    })
}

/// Accepted list-response shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListPayload {
    Bare(Vec<ApiEvent>),
    Data { data: Vec<ApiEvent> },
    Events { events: Vec<ApiEvent> },
}

/// Decode a list-response body.
///
/// Unrecognized shapes decode to an empty list, with the failure logged so
/// a contract change on the webhook side does not pass unnoticed.
pub fn decode_list(body: &serde_json::Value) -> Vec<ApiEvent> {
    match ListPayload::deserialize(body) {
        Ok(ListPayload::Bare(events)) => events,
        Ok(ListPayload::Data { data }) => data,
        Ok(ListPayload::Events { events }) => events,
        Err(err) => {
            warn!(%err, "unrecognized list payload shape, treating as empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // --- deserialization ---

    #[test]
    fn reads_spaced_title_key() {
        let event: ApiEvent = serde_json::from_value(json!({
            "row_number": 2,
            "id": "482913",
            "nama acara": "Resepsi",
            "tanggal": "2026-06-14",
            "waktu": "19:00",
            "lokasi": "Bandung",
            "dresscode": "Formal",
            "note": "Undangan keluarga"
        }))
        .unwrap();

        assert_eq!(event.nama_acara, "Resepsi");
        assert_eq!(event.row_number, Some(2));
    }

    #[test]
    fn falls_back_to_camel_case_title_key() {
        let event: ApiEvent =
            serde_json::from_value(json!({ "id": "1", "namaAcara": "Halal Bihalal" })).unwrap();
        assert_eq!(event.nama_acara, "Halal Bihalal");
    }

    #[test]
    fn coerces_numeric_ids_to_strings() {
        let event: ApiEvent = serde_json::from_value(json!({ "id": 482913 })).unwrap();
        assert_eq!(event.id, "482913");
    }

    #[test]
    fn absent_fields_default_to_empty() {
        let event: ApiEvent = serde_json::from_value(json!({ "id": "9" })).unwrap();
        assert_eq!(event.nama_acara, "");
        assert_eq!(event.tanggal, "");
        assert_eq!(event.waktu, "");
        assert_eq!(event.lokasi, "");
        assert_eq!(event.dresscode, "");
        assert_eq!(event.note, "");
        assert_eq!(event.row_number, None);
    }

    // --- serialization ---

    #[test]
    fn serializes_with_spaced_key_and_no_row_number() {
        let event = Event {
            id: "123456".to_string(),
            nama_acara: "Syukuran".to_string(),
            tanggal: "2026-08-17".to_string(),
            waktu: "10:00".to_string(),
            lokasi: "Jakarta".to_string(),
            dresscode: Some(Dresscode::Casual),
            note: String::new(),
            row_number: Some(7),
        };

        let value = serde_json::to_value(ApiEvent::from_event(&event)).unwrap();
        assert_eq!(value["nama acara"], "Syukuran");
        assert_eq!(value["dresscode"], "Casual");
        assert!(value.get("row_number").is_none());
        assert!(value.get("namaAcara").is_none());
    }

    #[test]
    fn round_trips_through_the_wire_shape() {
        let wire = json!({
            "id": "777777",
            "nama acara": "Gala Dinner",
            "tanggal": "2026-12-01",
            "waktu": "18:30",
            "lokasi": "Surabaya",
            "dresscode": "Semi-Formal",
            "note": "Bawa undangan"
        });

        let event: ApiEvent = serde_json::from_value(wire.clone()).unwrap();
        let back = serde_json::to_value(ApiEvent::from_event(&event.into_event())).unwrap();
        assert_eq!(back, wire);
    }

    // --- list payload shapes ---

    #[test]
    fn decodes_bare_array() {
        let body = json!([{ "id": "1" }, { "id": "2" }]);
        assert_eq!(decode_list(&body).len(), 2);
    }

    #[test]
    fn decodes_data_wrapper() {
        let body = json!({ "data": [{ "id": "1" }] });
        assert_eq!(decode_list(&body).len(), 1);
    }

    #[test]
    fn decodes_events_wrapper() {
        let body = json!({ "events": [{ "id": "1" }, { "id": "2" }, { "id": "3" }] });
        assert_eq!(decode_list(&body).len(), 3);
    }

    #[test]
    fn unrecognized_shapes_decode_to_empty() {
        assert!(decode_list(&json!({ "rows": [] })).is_empty());
        assert!(decode_list(&json!("not a list")).is_empty());
        assert!(decode_list(&json!(42)).is_empty());
    }
}
