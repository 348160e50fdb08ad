use chrono::{Duration, Utc};
use diesel::prelude::*;

use crate::{error::Result, models::sessions::SessionData, schema::sessions};

fn cutoff(ttl_secs: i64) -> String {
    crate::utils::format_time_str(&(Utc::now().naive_utc() - Duration::seconds(ttl_secs)))
}

/// Loads a live session. Expired rows are removed and reported as absent.
pub fn load(conn: &mut SqliteConnection, id: &str, ttl_secs: i64) -> Result<Option<SessionData>> {
    let data = sessions::table
        .find(id)
        .select(SessionData::as_select())
        .first(conn)
        .optional()?;

    match data {
        Some(data) if data.updated_at >= cutoff(ttl_secs) => Ok(Some(data)),
        Some(_) => {
            delete(conn, id)?;
            Ok(None)
        }
        None => Ok(None),
    }
}

pub fn save(conn: &mut SqliteConnection, id: &str, data: &str) -> Result<()> {
    let row = SessionData {
        id: id.to_string(),
        data: data.to_string(),
        updated_at: crate::utils::now_str(),
    };
    diesel::insert_into(sessions::table)
        .values(&row)
        .on_conflict(sessions::id)
        .do_update()
        .set(&row)
        .execute(conn)?;
    Ok(())
}

/// Restarts the idle timer of a session whose data did not change.
pub fn touch(conn: &mut SqliteConnection, id: &str) -> Result<()> {
    diesel::update(sessions::table.find(id))
        .set(sessions::updated_at.eq(crate::utils::now_str()))
        .execute(conn)?;
    Ok(())
}

/// Whether a session last written at `updated_at` is due for a `touch`.
pub fn is_stale(updated_at: &str, interval_secs: i64) -> bool {
    updated_at < cutoff(interval_secs).as_str()
}

pub fn delete(conn: &mut SqliteConnection, id: &str) -> Result<()> {
    diesel::delete(sessions::table.find(id)).execute(conn)?;
    Ok(())
}

pub fn purge_expired(conn: &mut SqliteConnection, ttl_secs: i64) -> Result<usize> {
    Ok(diesel::delete(sessions::table.filter(sessions::updated_at.lt(cutoff(ttl_secs))))
        .execute(conn)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support;

    #[test]
    fn saved_session_loads_until_it_expires() {
        let (_dir, pool) = test_support::pool();
        let mut conn = pool.get().unwrap();

        save(&mut conn, "abc", r#"{"user_id":1}"#).unwrap();
        assert_eq!(
            load(&mut conn, "abc", 3600).unwrap().map(|row| row.data).as_deref(),
            Some(r#"{"user_id":1}"#)
        );

        save(&mut conn, "abc", r#"{"user_id":2}"#).unwrap();
        assert_eq!(
            load(&mut conn, "abc", 3600).unwrap().map(|row| row.data).as_deref(),
            Some(r#"{"user_id":2}"#)
        );

        diesel::update(sessions::table.find("abc"))
            .set(sessions::updated_at.eq("2000-01-01 00:00:00"))
            .execute(&mut conn)
            .unwrap();
        assert!(load(&mut conn, "abc", 3600).unwrap().is_none());
        let left: i64 = sessions::table.count().get_result(&mut conn).unwrap();
        assert_eq!(left, 0);
    }

    #[test]
    fn purge_expired_keeps_live_sessions() {
        let (_dir, pool) = test_support::pool();
        let mut conn = pool.get().unwrap();
        save(&mut conn, "live", "{}").unwrap();
        save(&mut conn, "stale", "{}").unwrap();
        diesel::update(sessions::table.find("stale"))
            .set(sessions::updated_at.eq("2000-01-01 00:00:00"))
            .execute(&mut conn)
            .unwrap();

        assert_eq!(purge_expired(&mut conn, 3600).unwrap(), 1);
        assert!(load(&mut conn, "live", 3600).unwrap().is_some());
        assert!(load(&mut conn, "missing", 3600).unwrap().is_none());
    }

    #[test]
    fn touch_restarts_the_idle_timer() {
        let (_dir, pool) = test_support::pool();
        let mut conn = pool.get().unwrap();
        save(&mut conn, "busy", "{}").unwrap();
        diesel::update(sessions::table.find("busy"))
            .set(sessions::updated_at.eq(cutoff(3590)))
            .execute(&mut conn)
            .unwrap();

        let row = load(&mut conn, "busy", 3600).unwrap().unwrap();
        assert!(is_stale(&row.updated_at, 60));

        touch(&mut conn, "busy").unwrap();
        let row = load(&mut conn, "busy", 60).unwrap().unwrap();
        assert!(!is_stale(&row.updated_at, 60));
    }
}
