//! Assessment history: a newest-first list of results stored as one JSON
//! array under a single key.

use rusqlite::Connection;

use super::sqlite::{get_value, remove_value, set_value};
use super::DatabaseError;
use crate::models::AssessmentResult;

pub const HISTORY_KEY: &str = "cvd_assessments";

/// Prepend `assessment` to the stored history.
pub fn save_assessment(conn: &Connection, assessment: &AssessmentResult) -> Result<(), DatabaseError> {
    let mut assessments = get_assessments(conn)?;
    assessments.insert(0, assessment.clone());
    let json = serde_json::to_string(&assessments).map_err(|e| DatabaseError::Corrupt {
        key: HISTORY_KEY.into(),
        reason: e.to_string(),
    })?;
    set_value(conn, HISTORY_KEY, &json)?;
    tracing::debug!(id = %assessment.id, total = assessments.len(), "Assessment saved");
    Ok(())
}

/// All stored assessments, newest first. Empty when nothing is stored.
pub fn get_assessments(conn: &Connection) -> Result<Vec<AssessmentResult>, DatabaseError> {
    match get_value(conn, HISTORY_KEY)? {
        Some(json) => serde_json::from_str(&json).map_err(|e| DatabaseError::Corrupt {
            key: HISTORY_KEY.into(),
            reason: e.to_string(),
        }),
        None => Ok(Vec::new()),
    }
}

pub fn get_latest_assessment(conn: &Connection) -> Result<Option<AssessmentResult>, DatabaseError> {
    Ok(get_assessments(conn)?.into_iter().next())
}

pub fn clear_assessments(conn: &Connection) -> Result<(), DatabaseError> {
    remove_value(conn, HISTORY_KEY)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::models::HealthRecord;

    fn assessment(risk: f64) -> AssessmentResult {
        AssessmentResult::new(HealthRecord::default(), risk)
    }

    #[test]
    fn empty_history() {
        let conn = open_memory_database().unwrap();
        assert!(get_assessments(&conn).unwrap().is_empty());
        assert_eq!(get_latest_assessment(&conn).unwrap(), None);
    }

    #[test]
    fn newest_first() {
        let conn = open_memory_database().unwrap();
        let first = assessment(12.0);
        let second = assessment(25.0);
        save_assessment(&conn, &first).unwrap();
        save_assessment(&conn, &second).unwrap();

        let all = get_assessments(&conn).unwrap();
        assert_eq!(all, vec![second.clone(), first]);
        assert_eq!(get_latest_assessment(&conn).unwrap(), Some(second));
    }

    #[test]
    fn clear_removes_everything() {
        let conn = open_memory_database().unwrap();
        save_assessment(&conn, &assessment(5.0)).unwrap();
        clear_assessments(&conn).unwrap();
        assert!(get_assessments(&conn).unwrap().is_empty());
        // Clearing twice is fine.
        clear_assessments(&conn).unwrap();
    }

    #[test]
    fn history_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("history.db");
        let saved = assessment(31.0);
        {
            let conn = crate::db::open_database(&path).unwrap();
            save_assessment(&conn, &saved).unwrap();
        }
        let conn = crate::db::open_database(&path).unwrap();
        assert_eq!(get_latest_assessment(&conn).unwrap(), Some(saved));
    }

    #[test]
    fn corrupt_json_is_reported() {
        let conn = open_memory_database().unwrap();
        set_value(&conn, HISTORY_KEY, "{not json").unwrap();
        assert!(matches!(
            get_assessments(&conn),
            Err(DatabaseError::Corrupt { .. })
        ));
    }

    #[test]
    fn stored_json_is_a_plain_array() {
        let conn = open_memory_database().unwrap();
        save_assessment(&conn, &assessment(8.0)).unwrap();
        let raw = get_value(&conn, HISTORY_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["riskLevel"], "Low");
    }
}
