// Funciones para detectar conflictos y parsear horas/fechas de las secciones.
use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::errors::ScheduleError;
use crate::models::{DaySet, Section};

/// Convierte "08:30 AM", "1:30 PM" o "13:30" a minutos desde medianoche.
pub fn parse_clock(t: &str) -> Option<u32> {
    let tok = t.trim().to_uppercase();
    if tok.is_empty() {
        return None;
    }
    // "08:30AM" -> "08:30 AM"
    let tok = if (tok.ends_with("AM") || tok.ends_with("PM")) && !tok.contains(' ') {
        let (h, p) = tok.split_at(tok.len() - 2);
        format!("{} {}", h, p)
    } else {
        tok
    };
    for fmt in ["%I:%M %p", "%H:%M", "%H:%M:%S"] {
        if let Ok(time) = NaiveTime::parse_from_str(&tok, fmt) {
            return Some(time.hour() * 60 + time.minute());
        }
    }
    None
}

/// Parsea un rango "11:00 AM - 10:00 PM" a (inicio, fin) en minutos.
pub fn parse_clock_range(range: &str) -> Option<(u32, u32)> {
    let (a, b) = range.split_once('-')?;
    Some((parse_clock(a)?, parse_clock(b)?))
}

/// Acepta "2024-01-15 00:00:00" o "2024-01-15".
pub fn parse_date(d: &str) -> Option<NaiveDate> {
    let d = d.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(d, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()
}

/// Campos derivados de una sección: horas en minutos, fechas y días.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedSection {
    /// `None` si la sección es asíncrona.
    pub start: Option<u32>,
    pub end: Option<u32>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: DaySet,
}

impl ParsedSection {
    pub fn parse(section: &Section) -> Result<ParsedSection, ScheduleError> {
        let malformed = |field: &'static str, value: &str| ScheduleError::Parse {
            section: section.name.clone(),
            field,
            value: value.to_string(),
        };

        let (start, end) = if section.is_async() {
            (None, None)
        } else {
            let s = section.start_time.as_deref().unwrap_or_default();
            let e = section.end_time.as_deref().unwrap_or_default();
            let start = parse_clock(s).ok_or_else(|| malformed("start time", s))?;
            let end = parse_clock(e).ok_or_else(|| malformed("end time", e))?;
            (Some(start), Some(end))
        };

        let start_date = match section.start_date.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => parse_date(d).ok_or_else(|| malformed("start date", d))?,
            _ => NaiveDate::MIN,
        };
        let end_date = match section.end_date.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => parse_date(d).ok_or_else(|| malformed("end date", d))?,
            _ => NaiveDate::MAX,
        };

        let days = match section.meeting_days.as_deref() {
            Some(raw) => DaySet::parse(raw).ok_or_else(|| malformed("meeting days", raw))?,
            None => DaySet::EMPTY,
        };

        Ok(ParsedSection { start, end, start_date, end_date, days })
    }

    pub fn has_time(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

/// True si dos secciones ya parseadas chocan: fechas que se solapan, algún día
/// en común, ambas con horario y solapamiento semiabierto de horas.
pub fn parsed_conflict(a: &ParsedSection, b: &ParsedSection) -> bool {
    if a.start_date > b.end_date || b.start_date > a.end_date {
        return false;
    }
    if !a.days.intersects(&b.days) {
        return false;
    }
    match (a.start, a.end, b.start, b.end) {
        (Some(sa), Some(ea), Some(sb), Some(eb)) => sa < eb && ea > sb,
        _ => false,
    }
}

/// Tabla lateral: identificador de sección -> campos parseados.
pub type ParseCache = HashMap<String, ParsedSection>;

/// Detector de conflictos con tabla lateral de campos parseados.
///
/// La tabla se llena de forma perezosa (clave = identificador de la sección) y
/// nunca toca los registros `Section`. No es compartible entre corridas
/// concurrentes; cada corrida crea la suya.
#[derive(Debug, Default)]
pub struct ConflictDetector {
    parsed: ParseCache,
}

impl ConflictDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Campos parseados de `section`, calculados una sola vez.
    pub fn parsed(&mut self, section: &Section) -> Result<ParsedSection, ScheduleError> {
        if let Some(p) = self.parsed.get(&section.name) {
            return Ok(*p);
        }
        let p = ParsedSection::parse(section)?;
        self.parsed.insert(section.name.clone(), p);
        Ok(p)
    }

    pub fn cached_len(&self) -> usize {
        self.parsed.len()
    }

    pub fn pair_conflicts(&mut self, a: &Section, b: &Section) -> Result<bool, ScheduleError> {
        let pa = self.parsed(a)?;
        let pb = self.parsed(b)?;
        Ok(parsed_conflict(&pa, &pb))
    }

    /// Revisa una combinación completa. Ordena por (fecha inicio, fecha fin,
    /// hora inicio o medianoche) y deja de comparar un miembro en cuanto el
    /// siguiente empieza después de que éste termina.
    pub fn has_conflict(&mut self, sections: &[Section]) -> Result<bool, ScheduleError> {
        let mut parsed: Vec<ParsedSection> = Vec::with_capacity(sections.len());
        for s in sections {
            parsed.push(self.parsed(s)?);
        }
        parsed.sort_by_key(|p| (p.start_date, p.end_date, p.start.unwrap_or(0)));

        for (i, s1) in parsed.iter().enumerate() {
            for s2 in &parsed[i + 1..] {
                if s2.start_date > s1.end_date {
                    break;
                }
                if parsed_conflict(s1, s2) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Agregar una sección a un conjunto ya validado: sólo pares contra los existentes.
    pub fn conflicts_with(
        &mut self,
        existing: &[Section],
        candidate: &Section,
    ) -> Result<bool, ScheduleError> {
        let pc = self.parsed(candidate)?;
        for s in existing {
            let ps = self.parsed(s)?;
            if parsed_conflict(&ps, &pc) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("08:30 AM"), Some(510));
        assert_eq!(parse_clock("1:30 PM"), Some(810));
        assert_eq!(parse_clock("12:00 AM"), Some(0));
        assert_eq!(parse_clock("12:15 PM"), Some(735));
        assert_eq!(parse_clock("14:00"), Some(840));
        assert_eq!(parse_clock("10:15PM"), Some(1335));
        assert_eq!(parse_clock("nope"), None);
        assert_eq!(parse_clock(""), None);
    }

    #[test]
    fn test_parse_clock_range() {
        assert_eq!(parse_clock_range("11:00 AM - 10:00 PM"), Some((660, 1320)));
        assert_eq!(parse_clock_range("11:00 AM"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date("2024-01-15 00:00:00"), Some(d));
        assert_eq!(parse_date("2024-01-15"), Some(d));
        assert_eq!(parse_date("15/01/2024"), None);
    }
}
