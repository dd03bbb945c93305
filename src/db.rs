//! SQLite gateway for the two source tables.
//!
//! Read side: `layout(id, parent)` and `movement(source, destination,
//! size, tag)`. Write side: schema setup and inserts used by the `load`
//! subcommand. The connection is an explicit argument everywhere; there is
//! no process-wide database selection.

use crate::aggregate::MovementRecord;
use crate::error::{MoveError, Result};
use crate::path::NodePath;
use rusqlite::{Connection, params};
use std::path::Path;

/// Legacy null-parent marker: the original loader wrote the root itself
/// into `layout` with this parent instead of omitting the row.
const NULL_PARENT: &str = ".";

pub fn open(db_path: impl AsRef<Path>) -> Result<Connection> {
    let db_path = db_path.as_ref();
    let conn = Connection::open(db_path).map_err(|err| {
        MoveError::data_source(format!("cannot open database {}", db_path.display()))
            .with_source(err)
    })?;
    Ok(conn)
}

/// Fetch the layout pairs. A row whose parent is the legacy `"."` marker
/// declares the root and contributes no pair.
pub fn fetch_layout(conn: &Connection) -> Result<Vec<(NodePath, NodePath)>> {
    let mut stmt = conn.prepare("SELECT id, parent FROM layout")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut pairs = Vec::new();
    for row in rows {
        let (id, parent) = row?;
        if parent == NULL_PARENT {
            continue;
        }
        pairs.push((NodePath::parse(&id)?, NodePath::parse(&parent)?));
    }
    Ok(pairs)
}

/// Fetch movement records, optionally restricted to one tag.
pub fn fetch_movement(conn: &Connection, tag: Option<&str>) -> Result<Vec<MovementRecord>> {
    let base = "SELECT source, destination, size, tag FROM movement";
    let mut records = Vec::new();

    let mut push = |source: String, destination: String, size: i64, tag: Option<String>| {
        records.push(MovementRecord {
            source: NodePath::parse(&source)?,
            destination: NodePath::parse(&destination)?,
            size: size.max(0) as u64,
            tag,
        });
        Ok::<_, MoveError>(())
    };

    match tag {
        Some(tag) => {
            let mut stmt = conn.prepare(&format!("{} WHERE tag = ?1", base))?;
            let rows = stmt.query_map(params![tag], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?;
            for row in rows {
                let (s, d, size, t) = row?;
                push(s, d, size, t)?;
            }
        }
        None => {
            let mut stmt = conn.prepare(base)?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?;
            for row in rows {
                let (s, d, size, t) = row?;
                push(s, d, size, t)?;
            }
        }
    }
    Ok(records)
}

/// Distinct tags present in `movement`, ordered, for the selector UI.
pub fn list_tags(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT DISTINCT tag FROM movement WHERE tag IS NOT NULL ORDER BY tag")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut tags = Vec::new();
    for row in rows {
        tags.push(row?);
    }
    Ok(tags)
}

/// Drop and recreate both tables. The loader always replaces a database
/// wholesale; there is no incremental append.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute("DROP TABLE IF EXISTS layout", [])?;
    conn.execute(
        "CREATE TABLE layout (
            id TEXT PRIMARY KEY,
            parent TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute("DROP TABLE IF EXISTS movement", [])?;
    conn.execute(
        "CREATE TABLE movement (
            source TEXT NOT NULL,
            destination TEXT NOT NULL,
            size INTEGER NOT NULL,
            tag TEXT
        )",
        [],
    )?;
    Ok(())
}

pub fn insert_layout(conn: &Connection, pairs: &[(NodePath, NodePath)]) -> Result<()> {
    let mut stmt = conn.prepare("INSERT INTO layout (id, parent) VALUES (?1, ?2)")?;
    for (child, parent) in pairs {
        stmt.execute(params![child.to_string(), parent.to_string()])?;
    }
    Ok(())
}

pub fn insert_movement(conn: &Connection, records: &[MovementRecord]) -> Result<()> {
    let mut stmt = conn
        .prepare("INSERT INTO movement (source, destination, size, tag) VALUES (?1, ?2, ?3, ?4)")?;
    for r in records {
        stmt.execute(params![
            r.source.to_string(),
            r.destination.to_string(),
            r.size as i64,
            &r.tag,
        ])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn p(s: &str) -> NodePath {
        NodePath::parse(s).unwrap()
    }

    fn seeded_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        insert_layout(
            &conn,
            &[
                (p("1"), NodePath::root()),
                (p("2"), NodePath::root()),
                (p("1.1"), p("1")),
                (p("1.2"), p("1")),
            ],
        )
        .unwrap();
        insert_movement(
            &conn,
            &[
                MovementRecord {
                    source: p("1.1"),
                    destination: p("1.2"),
                    size: 100,
                    tag: Some("edt_main".into()),
                },
                MovementRecord {
                    source: p("2"),
                    destination: p("1.1"),
                    size: 32,
                    tag: Some("edt_init".into()),
                },
            ],
        )
        .unwrap();
        conn
    }

    #[test]
    fn layout_rows_round_trip() {
        let conn = seeded_conn();
        let pairs = fetch_layout(&conn).unwrap();
        assert_eq!(pairs.len(), 4);
        assert!(pairs.contains(&(p("1.2"), p("1"))));
    }

    #[test]
    fn legacy_root_row_is_skipped() {
        let conn = seeded_conn();
        conn.execute("INSERT INTO layout (id, parent) VALUES ('b', '.')", [])
            .unwrap();
        let pairs = fetch_layout(&conn).unwrap();
        assert_eq!(pairs.len(), 4);
        assert!(pairs.iter().all(|(child, _)| !child.is_root()));
    }

    #[test]
    fn malformed_stored_path_aborts_the_fetch() {
        let conn = seeded_conn();
        conn.execute("INSERT INTO layout (id, parent) VALUES ('1.x', '1')", [])
            .unwrap();
        let err = fetch_layout(&conn).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedPath);
    }

    #[test]
    fn movement_fetch_honors_tag_filter() {
        let conn = seeded_conn();
        assert_eq!(fetch_movement(&conn, None).unwrap().len(), 2);

        let filtered = fetch_movement(&conn, Some("edt_init")).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].source, p("2"));
        assert_eq!(filtered[0].size, 32);

        assert!(fetch_movement(&conn, Some("no_such_tag")).unwrap().is_empty());
    }

    #[test]
    fn tags_are_distinct_and_ordered() {
        let conn = seeded_conn();
        insert_movement(
            &conn,
            &[MovementRecord {
                source: p("1.1"),
                destination: p("1.2"),
                size: 1,
                tag: Some("edt_main".into()),
            }],
        )
        .unwrap();
        assert_eq!(list_tags(&conn).unwrap(), vec!["edt_init", "edt_main"]);
    }

    #[test]
    fn missing_table_is_a_data_source_error() {
        let conn = Connection::open_in_memory().unwrap();
        let err = fetch_layout(&conn).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DataSource);
    }
}
