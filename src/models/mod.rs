// Estructuras de datos principales

use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Orden canónico de la semana (lunes primero).
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Separador usado al agrupar secciones equivalentes ("ENG-103-101, ENG-103-102").
pub const GROUP_SEPARATOR: &str = ", ";

/// Clase de duración dentro del término.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermDuration {
    #[default]
    FullTerm,
    FirstHalf,
    SecondHalf,
    Partial,
}

impl TermDuration {
    /// Interpreta la etiqueta libre que trae el catálogo ("Full Semester", "1st 8 Weeks"...).
    pub fn from_label(label: &str) -> TermDuration {
        let l = label.trim().to_lowercase();
        if l.is_empty() || l.starts_with("full") {
            TermDuration::FullTerm
        } else if l.contains("first") || l.contains("1st") {
            TermDuration::FirstHalf
        } else if l.contains("second") || l.contains("2nd") {
            TermDuration::SecondHalf
        } else {
            TermDuration::Partial
        }
    }
}

/// Una sección ofertada, tal como la entrega el catálogo normalizado.
///
/// Los campos de hora/fecha/días se guardan en crudo; su versión parseada vive
/// en `algorithm::conflict::ConflictDetector`, nunca dentro del registro.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Section {
    pub course_code: String,
    /// Identificador de la sección, p.ej. "ENG-103-101". En secciones agrupadas
    /// es la lista de miembros unida por `GROUP_SEPARATOR`.
    pub name: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    /// "M, W, F"
    #[serde(default)]
    pub meeting_days: Option<String>,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub building: Option<String>,
    #[serde(default)]
    pub credits: Option<f64>,
    #[serde(default)]
    pub fraction_full: Option<f64>,
    #[serde(default)]
    pub fraction_full_deviation: Option<f64>,
    #[serde(default)]
    pub coreq_sections: Vec<String>,
    #[serde(default)]
    pub restricted: Option<String>,
    #[serde(default)]
    pub cohorted: bool,
    #[serde(default)]
    pub duration: TermDuration,
    #[serde(default)]
    pub faculty: Option<String>,
}

impl Section {
    /// Identificadores de los miembros (uno solo si la sección no está agrupada).
    pub fn member_ids(&self) -> Vec<String> {
        expand_id(&self.name)
    }

    pub fn is_grouped(&self) -> bool {
        self.name.contains(',')
    }

    pub fn has_coreqs(&self) -> bool {
        self.coreq_sections.iter().any(|c| !c.trim().is_empty())
    }

    /// Sección sin horario definido (asíncrona).
    pub fn is_async(&self) -> bool {
        blank(&self.start_time) || blank(&self.end_time)
    }
}

fn blank(v: &Option<String>) -> bool {
    v.as_deref().map_or(true, |s| s.trim().is_empty())
}

/// Divide un identificador (posiblemente agrupado) en sus miembros.
pub fn expand_id(id: &str) -> Vec<String> {
    id.split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Normaliza un identificador de sección para comparaciones.
pub fn normalize_id(id: &str) -> String {
    id.trim().to_uppercase()
}

/// Curso al que pertenece un identificador de sección: "ESL-116-101" -> "ESL-116".
pub fn course_of(section_id: &str) -> String {
    let id = section_id.trim();
    match id.rsplit_once('-') {
        Some((course, _)) if !course.is_empty() => course.to_string(),
        _ => id.to_string(),
    }
}

/// Conjunto de días de reunión como máscara de bits (bit 0 = lunes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DaySet(u8);

impl DaySet {
    pub const EMPTY: DaySet = DaySet(0);

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn intersects(&self, other: &DaySet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Días en orden de la semana.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        WEEK.iter().copied().filter(move |d| self.contains(*d))
    }

    /// Parsea "M, W, TH" (o nombres completos). Devuelve `None` si algún token no es un día.
    pub fn parse(raw: &str) -> Option<DaySet> {
        let mut set = DaySet::EMPTY;
        for tok in raw.split(|c: char| c == ',' || c.is_whitespace()) {
            let tok = tok.trim();
            if tok.is_empty() {
                continue;
            }
            set.insert(parse_day(tok)?);
        }
        Some(set)
    }
}

impl FromIterator<Weekday> for DaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = DaySet::EMPTY;
        for d in iter {
            set.insert(d);
        }
        set
    }
}

/// Convierte un código de día del catálogo ("M", "TH", "SU") o un nombre en `Weekday`.
pub fn parse_day(token: &str) -> Option<Weekday> {
    let t = token.trim().to_uppercase();
    let day = match t.as_str() {
        "M" | "MO" | "MON" | "MONDAY" => Weekday::Mon,
        "T" | "TU" | "TUE" | "TUES" | "TUESDAY" => Weekday::Tue,
        "W" | "WE" | "WED" | "WEDNESDAY" => Weekday::Wed,
        "TH" | "R" | "THU" | "THUR" | "THURS" | "THURSDAY" => Weekday::Thu,
        "F" | "FR" | "FRI" | "FRIDAY" => Weekday::Fri,
        "S" | "SA" | "SAT" | "SATURDAY" => Weekday::Sat,
        "SU" | "SUN" | "SUNDAY" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

/// Un horario candidato: una sección (posiblemente agrupada) por curso más
/// los correquisitos que hayan sido necesarios.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Combination {
    pub sections: Vec<Section>,
}

impl Combination {
    pub fn new(sections: Vec<Section>) -> Self {
        Combination { sections }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    /// Todos los identificadores de miembro (expandiendo grupos), normalizados.
    pub fn member_ids(&self) -> Vec<String> {
        self.sections
            .iter()
            .flat_map(|s| s.member_ids())
            .map(|id| normalize_id(&id))
            .collect()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        let wanted = normalize_id(id);
        self.member_ids().iter().any(|m| *m == wanted)
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.sections.iter().map(|s| s.name.as_str()).collect();
        write!(f, "[{}]", names.join(" | "))
    }
}
