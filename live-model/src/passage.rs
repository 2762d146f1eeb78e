use crate::LatLng;
use serde::{Deserialize, Serialize};

/// One predicted arrival at a stop, as relayed from the upstream feed.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Passage {
    pub id: String,
    #[serde(rename = "ligne")]
    pub line: String,
    pub direction: String,
    /// Human countdown, e.g. `"4 min"`.
    #[serde(rename = "delaipassage")]
    pub countdown: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "heurepassage")]
    pub scheduled_time: String,
    #[serde(rename = "idtarretdestination")]
    pub destination_stop_id: i64,
    #[serde(rename = "coursetheorique")]
    pub theoretical_course: String,
    pub gid: i64,
    pub last_update_fme: String,
}

impl Passage {
    pub fn is_due(&self) -> bool {
        self.countdown.trim() == "0 min"
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct StopInfo {
    pub id: i64,
    pub name: String,
    pub position: LatLng,
}

#[cfg(test)]
mod tests {
    use super::Passage;

    #[test]
    fn decode_passages() {
        let body = r#"[{
            "id": "1",
            "ligne": "T1",
            "direction": "IUT-Feyssine",
            "delaipassage": "0 min",
            "type": "E",
            "heurepassage": "2026-10-19 08:15:00",
            "idtarretdestination": 34129,
            "coursetheorique": "T1A-021AM:5:2:7",
            "gid": 77,
            "last_update_fme": "2026-10-19 08:14:10"
        }, {
            "ligne": "C3",
            "delaipassage": "6 min"
        }]"#;

        let passages: Vec<Passage> = serde_json::from_str(body).unwrap();
        assert_eq!(2, passages.len());
        assert_eq!(34129, passages[0].destination_stop_id);
        assert!(passages[0].is_due());
        assert!(!passages[1].is_due());
        assert_eq!("", passages[1].direction);
    }
}
