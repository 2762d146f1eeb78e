use std::fmt::{Display, Formatter};

const LINE_PREFIX: &str = "ActIV:Line::";
const LINE_SUFFIX: &str = ":SYTRAL";
pub const UNKNOWN_CODE: &str = "?";

#[derive(Hash, PartialEq, Eq, Copy, Clone, Debug)]
pub enum LineCategory {
    Tramway,
    BusChrono,
    Trambus,
    Rhonexpress,
    BusStandard,
    Other,
}

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum MarkerShape {
    Circle,
    /// Square marker with the given corner radius in pixels.
    Rounded(u8),
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct LineInfo {
    pub code: String,
    pub category: LineCategory,
}

impl LineCategory {
    pub fn label(&self) -> &'static str {
        match self {
            LineCategory::Tramway => "Tramway",
            LineCategory::BusChrono => "Bus Chrono",
            LineCategory::Trambus => "Trambus",
            LineCategory::Rhonexpress => "Rhônexpress",
            LineCategory::BusStandard => "Bus Standard",
            LineCategory::Other => "Other",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            LineCategory::Tramway => "#864098",
            LineCategory::BusChrono => "#697a84",
            LineCategory::Trambus => "#fdc210",
            LineCategory::Rhonexpress => "#c9151d",
            LineCategory::BusStandard => "#ea2e2e",
            LineCategory::Other => "#808080",
        }
    }

    pub fn shape(&self) -> MarkerShape {
        match self {
            LineCategory::BusChrono => MarkerShape::Rounded(8),
            LineCategory::Rhonexpress => MarkerShape::Rounded(4),
            _ => MarkerShape::Circle,
        }
    }
}

impl Display for LineCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// `"ActIV:Line::C3:SYTRAL"` -> `"C3"`.
pub fn extract_line_code(line_id: &str) -> Option<&str> {
    let start = line_id.find(LINE_PREFIX)? + LINE_PREFIX.len();
    let rest = &line_id[start..];
    let end = rest.find(LINE_SUFFIX)?;
    Some(&rest[..end])
}

fn prefixed_number(code: &str, prefix: &str) -> bool {
    code.strip_prefix(prefix).map_or(false, is_number)
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

// Order matters: the bare-number rule has to come after every lettered prefix.
pub fn classify_code(code: &str) -> LineCategory {
    if prefixed_number(code, "T") {
        LineCategory::Tramway
    } else if prefixed_number(code, "C") {
        LineCategory::BusChrono
    } else if prefixed_number(code, "TB") {
        LineCategory::Trambus
    } else if code == "RX" {
        LineCategory::Rhonexpress
    } else if is_number(code) {
        LineCategory::BusStandard
    } else {
        LineCategory::Other
    }
}

pub fn classify_line_id(line_id: &str) -> LineInfo {
    match extract_line_code(line_id) {
        Some(code) => LineInfo {
            code: code.to_string(),
            category: classify_code(code),
        },
        None => LineInfo {
            code: UNKNOWN_CODE.to_string(),
            category: LineCategory::Other,
        },
    }
}
