// Catálogo respaldado por la tabla `schedule` de SQLite (ya normalizada).
use std::path::Path;

use rusqlite::{params, Connection, OpenFlags};

use super::{annotate_fill_deviation, SectionLookup};
use crate::errors::CatalogError;
use crate::models::{Section, TermDuration};

const SECTION_QUERY: &str = "
    SELECT Course_Name, Name, STime, ETime, SDate, EDate, Mtg_Days, Method,
           Location, Building, Credits, Fraction_Full, Fraction_Full_Deviation,
           Coreq_Sections, Restricted_section, Cohorted_section, Duration,
           Faculty_Full_Name
    FROM schedule
    WHERE Course_Name = ?1 AND Status = 'A' AND Avail_Seats > 0
    ORDER BY rowid";

pub struct SqliteCatalog {
    conn: Connection,
}

impl std::fmt::Debug for SqliteCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteCatalog(..)")
    }
}

impl SqliteCatalog {
    /// Abre la base en modo sólo lectura.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(SqliteCatalog { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        SqliteCatalog { conn }
    }

    fn query_course(&self, course_code: &str) -> rusqlite::Result<Vec<Section>> {
        let mut stmt = self.conn.prepare_cached(SECTION_QUERY)?;
        let rows = stmt.query_map(params![course_code.trim()], |row| {
            let coreqs: Option<String> = row.get(13)?;
            let cohorted: Option<i64> = row.get(15)?;
            let duration: Option<String> = row.get(16)?;
            Ok(Section {
                course_code: row.get::<_, String>(0)?,
                name: row.get::<_, String>(1)?.trim().to_string(),
                start_time: row.get(2)?,
                end_time: row.get(3)?,
                start_date: row.get(4)?,
                end_date: row.get(5)?,
                meeting_days: row.get(6)?,
                method: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
                location: row.get(8)?,
                building: row.get(9)?,
                credits: row.get(10)?,
                fraction_full: row.get(11)?,
                fraction_full_deviation: row.get(12)?,
                coreq_sections: coreqs
                    .map(|c| {
                        c.split(',')
                            .map(|p| p.trim().to_string())
                            .filter(|p| !p.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
                restricted: row.get(14)?,
                cohorted: cohorted.unwrap_or(0) != 0,
                duration: duration
                    .as_deref()
                    .map(TermDuration::from_label)
                    .unwrap_or_default(),
                faculty: row.get(17)?,
            })
        })?;
        rows.collect()
    }
}

impl SectionLookup for SqliteCatalog {
    fn lookup(&mut self, course_code: &str) -> Result<Vec<Section>, CatalogError> {
        let mut sections = self
            .query_course(course_code)
            .map_err(|e| CatalogError::Query {
                course: course_code.to_string(),
                message: e.to_string(),
            })?;
        annotate_fill_deviation(&mut sections);
        Ok(sections)
    }
}
