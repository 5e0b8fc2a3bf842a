//! SQLite-backed element store.
//!
//! Elements live in one table per kind, with ordered child tables for tags,
//! way node lists and relation members. The reverse-reference indices are
//! plain SQL indexes over the child tables.

use crate::{Snapshot, StoreError, StoreResult};
use adiff_types::{
    EditMetadata, ElementKind, Location, StoredMember, StoredNode, StoredRelation, StoredWay, Tags,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Transaction};
use std::path::Path;
use tracing::debug;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS nodes (
        id INTEGER PRIMARY KEY,
        lat INTEGER NOT NULL,
        lon INTEGER NOT NULL,
        version INTEGER NOT NULL,
        user TEXT,
        uid INTEGER,
        timestamp INTEGER,
        changeset INTEGER
    );

    CREATE TABLE IF NOT EXISTS ways (
        id INTEGER PRIMARY KEY,
        version INTEGER NOT NULL,
        user TEXT,
        uid INTEGER,
        timestamp INTEGER,
        changeset INTEGER
    );

    CREATE TABLE IF NOT EXISTS relations (
        id INTEGER PRIMARY KEY,
        version INTEGER NOT NULL,
        user TEXT,
        uid INTEGER,
        timestamp INTEGER,
        changeset INTEGER
    );

    CREATE TABLE IF NOT EXISTS tags (
        kind TEXT NOT NULL,
        element_id INTEGER NOT NULL,
        seq INTEGER NOT NULL,
        k TEXT NOT NULL,
        v TEXT NOT NULL,
        PRIMARY KEY (kind, element_id, seq)
    );

    CREATE TABLE IF NOT EXISTS way_nodes (
        way_id INTEGER NOT NULL,
        seq INTEGER NOT NULL,
        node_id INTEGER NOT NULL,
        PRIMARY KEY (way_id, seq)
    );

    CREATE INDEX IF NOT EXISTS way_nodes_by_node ON way_nodes (node_id);

    CREATE TABLE IF NOT EXISTS relation_members (
        relation_id INTEGER NOT NULL,
        seq INTEGER NOT NULL,
        member_type TEXT NOT NULL,
        member_id INTEGER NOT NULL,
        role TEXT NOT NULL,
        PRIMARY KEY (relation_id, seq)
    );

    CREATE INDEX IF NOT EXISTS relation_members_by_member
        ON relation_members (member_type, member_id);
";

/// Counts of elements written by [`ElementStore::import`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub nodes: usize,
    pub ways: usize,
    pub relations: usize,
}

/// Persistent element store backed by SQLite.
pub struct ElementStore {
    conn: Connection,
}

impl ElementStore {
    /// Opens (or creates) a writable store at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Opens an existing store read-only, as a diff run does.
    pub fn open_read_only(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            return Err(StoreError::NotFound(path.display().to_string()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let tables: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type = 'table' AND name IN ('nodes', 'ways', 'relations')",
            [],
            |row| row.get(0),
        )?;
        if tables != 3 {
            return Err(StoreError::NotAStore(path.display().to_string()));
        }
        debug!("Opened element store {} read-only", path.display());
        Ok(Self { conn })
    }

    fn init_schema(&self) -> StoreResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Begins a read transaction. Every lookup through the returned snapshot
    /// sees the same state; the transaction is rolled back on drop.
    pub fn snapshot(&self) -> StoreResult<SqliteSnapshot<'_>> {
        let tx = self.conn.unchecked_transaction()?;
        // SQLite starts the read snapshot lazily at the first read.
        tx.query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get::<_, i64>(0))?;
        Ok(SqliteSnapshot { tx })
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Inserts or replaces a node.
    pub fn put_node(&self, node: &StoredNode) -> StoreResult<()> {
        write_node(&self.conn, node)
    }

    /// Inserts or replaces a way and its node list.
    pub fn put_way(&self, way: &StoredWay) -> StoreResult<()> {
        write_way(&self.conn, way)
    }

    /// Inserts or replaces a relation and its members.
    pub fn put_relation(&self, relation: &StoredRelation) -> StoreResult<()> {
        write_relation(&self.conn, relation)
    }

    /// Writes a batch of elements in one transaction.
    pub fn import(
        &self,
        nodes: &[StoredNode],
        ways: &[StoredWay],
        relations: &[StoredRelation],
    ) -> StoreResult<ImportStats> {
        let tx = self.conn.unchecked_transaction()?;
        for node in nodes {
            write_node(&tx, node)?;
        }
        for way in ways {
            write_way(&tx, way)?;
        }
        for relation in relations {
            write_relation(&tx, relation)?;
        }
        tx.commit()?;
        let stats = ImportStats {
            nodes: nodes.len(),
            ways: ways.len(),
            relations: relations.len(),
        };
        debug!("Imported {:?}", stats);
        Ok(stats)
    }
}

/// A consistent read view over an [`ElementStore`].
pub struct SqliteSnapshot<'conn> {
    tx: Transaction<'conn>,
}

impl Snapshot for SqliteSnapshot<'_> {
    fn node(&self, id: i64) -> StoreResult<Option<StoredNode>> {
        let row = self
            .tx
            .prepare_cached(
                "SELECT lat, lon, version, user, uid, timestamp, changeset FROM nodes WHERE id = ?1",
            )?
            .query_row(params![id], |row| {
                Ok((
                    Location::from_fixed(row.get(0)?, row.get(1)?),
                    row.get::<_, i64>(2)?,
                    MetadataRow::read(row, 3)?,
                ))
            })
            .optional()?;

        let Some((location, version, metadata)) = row else {
            return Ok(None);
        };
        Ok(Some(StoredNode {
            id,
            location,
            version: to_u64(version, "version")?,
            metadata: metadata.into_metadata()?,
            tags: read_tags(&self.tx, ElementKind::Node, id)?,
        }))
    }

    fn way(&self, id: i64) -> StoreResult<Option<StoredWay>> {
        let Some((version, metadata)) = read_header(&self.tx, ElementKind::Way, id)? else {
            return Ok(None);
        };
        let nodes = self
            .tx
            .prepare_cached("SELECT node_id FROM way_nodes WHERE way_id = ?1 ORDER BY seq")?
            .query_map(params![id], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(Some(StoredWay {
            id,
            version,
            metadata,
            nodes,
            tags: read_tags(&self.tx, ElementKind::Way, id)?,
        }))
    }

    fn relation(&self, id: i64) -> StoreResult<Option<StoredRelation>> {
        let Some((version, metadata)) = read_header(&self.tx, ElementKind::Relation, id)? else {
            return Ok(None);
        };
        let rows = self
            .tx
            .prepare_cached(
                "SELECT member_type, member_id, role FROM relation_members
                 WHERE relation_id = ?1 ORDER BY seq",
            )?
            .query_map(params![id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?, row.get::<_, String>(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut members = Vec::with_capacity(rows.len());
        for (member_type, member_id, role) in rows {
            let kind = member_type
                .parse::<ElementKind>()
                .map_err(|e| StoreError::InvalidData(format!("relation {id}: {e}")))?;
            members.push(StoredMember {
                kind,
                id: member_id,
                role,
            });
        }
        Ok(Some(StoredRelation {
            id,
            version,
            metadata,
            members,
            tags: read_tags(&self.tx, ElementKind::Relation, id)?,
        }))
    }

    fn location(&self, id: i64) -> StoreResult<Option<Location>> {
        Ok(self
            .tx
            .prepare_cached("SELECT lat, lon FROM nodes WHERE id = ?1")?
            .query_row(params![id], |row| Ok(Location::from_fixed(row.get(0)?, row.get(1)?)))
            .optional()?)
    }

    fn node_ways(&self, node_id: i64) -> StoreResult<Vec<i64>> {
        read_ids(
            &self.tx,
            "SELECT DISTINCT way_id FROM way_nodes WHERE node_id = ?1 ORDER BY way_id",
            node_id,
        )
    }

    fn node_relations(&self, node_id: i64) -> StoreResult<Vec<i64>> {
        read_ids(
            &self.tx,
            "SELECT DISTINCT relation_id FROM relation_members
             WHERE member_type = 'node' AND member_id = ?1 ORDER BY relation_id",
            node_id,
        )
    }

    fn way_relations(&self, way_id: i64) -> StoreResult<Vec<i64>> {
        read_ids(
            &self.tx,
            "SELECT DISTINCT relation_id FROM relation_members
             WHERE member_type = 'way' AND member_id = ?1 ORDER BY relation_id",
            way_id,
        )
    }
}

// ── Row helpers ──────────────────────────────────────────────────

/// Raw metadata columns, converted after the row closure returns.
struct MetadataRow {
    user: Option<String>,
    uid: Option<i64>,
    timestamp: Option<i64>,
    changeset: Option<i64>,
}

impl MetadataRow {
    fn read(row: &rusqlite::Row<'_>, first: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            user: row.get(first)?,
            uid: row.get(first + 1)?,
            timestamp: row.get(first + 2)?,
            changeset: row.get(first + 3)?,
        })
    }

    fn into_metadata(self) -> StoreResult<Option<EditMetadata>> {
        let metadata = EditMetadata {
            user: self.user,
            uid: self.uid.map(|v| to_u64(v, "uid")).transpose()?,
            timestamp: self.timestamp.map(format_timestamp).transpose()?,
            changeset: self.changeset.map(|v| to_u64(v, "changeset")).transpose()?,
        };
        Ok((!metadata.is_empty()).then_some(metadata))
    }
}

fn table_for(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Node => "nodes",
        ElementKind::Way => "ways",
        ElementKind::Relation => "relations",
    }
}

fn read_header(
    conn: &Connection,
    kind: ElementKind,
    id: i64,
) -> StoreResult<Option<(u64, Option<EditMetadata>)>> {
    let sql = format!(
        "SELECT version, user, uid, timestamp, changeset FROM {} WHERE id = ?1",
        table_for(kind)
    );
    let row = conn
        .prepare_cached(&sql)?
        .query_row(params![id], |row| Ok((row.get::<_, i64>(0)?, MetadataRow::read(row, 1)?)))
        .optional()?;
    match row {
        Some((version, metadata)) => Ok(Some((to_u64(version, "version")?, metadata.into_metadata()?))),
        None => Ok(None),
    }
}

fn read_tags(conn: &Connection, kind: ElementKind, id: i64) -> StoreResult<Tags> {
    let mut stmt =
        conn.prepare_cached("SELECT k, v FROM tags WHERE kind = ?1 AND element_id = ?2 ORDER BY seq")?;
    let rows = stmt.query_map(params![kind.as_str(), id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    let mut tags = Tags::new();
    for row in rows {
        let (k, v) = row?;
        tags.insert(k, v);
    }
    Ok(tags)
}

fn read_ids(conn: &Connection, sql: &str, id: i64) -> StoreResult<Vec<i64>> {
    Ok(conn
        .prepare_cached(sql)?
        .query_map(params![id], |row| row.get(0))?
        .collect::<Result<Vec<i64>, _>>()?)
}

fn write_node(conn: &Connection, node: &StoredNode) -> StoreResult<()> {
    let meta = MetadataColumns::from_metadata(node.metadata.as_ref())?;
    conn.prepare_cached(
        "INSERT OR REPLACE INTO nodes (id, lat, lon, version, user, uid, timestamp, changeset)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?
    .execute(params![
        node.id,
        node.location.lat_fixed(),
        node.location.lon_fixed(),
        to_i64(node.version, "version")?,
        meta.user,
        meta.uid,
        meta.timestamp,
        meta.changeset,
    ])?;
    write_tags(conn, ElementKind::Node, node.id, &node.tags)
}

fn write_way(conn: &Connection, way: &StoredWay) -> StoreResult<()> {
    write_header(conn, ElementKind::Way, way.id, way.version, way.metadata.as_ref())?;
    conn.prepare_cached("DELETE FROM way_nodes WHERE way_id = ?1")?
        .execute(params![way.id])?;
    let mut insert =
        conn.prepare_cached("INSERT INTO way_nodes (way_id, seq, node_id) VALUES (?1, ?2, ?3)")?;
    for (seq, node_id) in way.nodes.iter().enumerate() {
        insert.execute(params![way.id, seq as i64, node_id])?;
    }
    write_tags(conn, ElementKind::Way, way.id, &way.tags)
}

fn write_relation(conn: &Connection, relation: &StoredRelation) -> StoreResult<()> {
    write_header(
        conn,
        ElementKind::Relation,
        relation.id,
        relation.version,
        relation.metadata.as_ref(),
    )?;
    conn.prepare_cached("DELETE FROM relation_members WHERE relation_id = ?1")?
        .execute(params![relation.id])?;
    let mut insert = conn.prepare_cached(
        "INSERT INTO relation_members (relation_id, seq, member_type, member_id, role)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for (seq, member) in relation.members.iter().enumerate() {
        insert.execute(params![
            relation.id,
            seq as i64,
            member.kind.as_str(),
            member.id,
            member.role,
        ])?;
    }
    write_tags(conn, ElementKind::Relation, relation.id, &relation.tags)
}

fn write_header(
    conn: &Connection,
    kind: ElementKind,
    id: i64,
    version: u64,
    metadata: Option<&EditMetadata>,
) -> StoreResult<()> {
    let meta = MetadataColumns::from_metadata(metadata)?;
    let sql = format!(
        "INSERT OR REPLACE INTO {} (id, version, user, uid, timestamp, changeset)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        table_for(kind)
    );
    conn.prepare_cached(&sql)?.execute(params![
        id,
        to_i64(version, "version")?,
        meta.user,
        meta.uid,
        meta.timestamp,
        meta.changeset,
    ])?;
    Ok(())
}

fn write_tags(conn: &Connection, kind: ElementKind, id: i64, tags: &Tags) -> StoreResult<()> {
    conn.prepare_cached("DELETE FROM tags WHERE kind = ?1 AND element_id = ?2")?
        .execute(params![kind.as_str(), id])?;
    let mut insert = conn.prepare_cached(
        "INSERT INTO tags (kind, element_id, seq, k, v) VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for (seq, (k, v)) in tags.iter().enumerate() {
        insert.execute(params![kind.as_str(), id, seq as i64, k, v])?;
    }
    Ok(())
}

/// Metadata converted to column values.
struct MetadataColumns<'a> {
    user: Option<&'a str>,
    uid: Option<i64>,
    timestamp: Option<i64>,
    changeset: Option<i64>,
}

impl<'a> MetadataColumns<'a> {
    fn from_metadata(metadata: Option<&'a EditMetadata>) -> StoreResult<Self> {
        let Some(m) = metadata else {
            return Ok(Self {
                user: None,
                uid: None,
                timestamp: None,
                changeset: None,
            });
        };
        Ok(Self {
            user: m.user.as_deref(),
            uid: m.uid.map(|v| to_i64(v, "uid")).transpose()?,
            timestamp: m.timestamp.as_deref().map(parse_timestamp).transpose()?,
            changeset: m.changeset.map(|v| to_i64(v, "changeset")).transpose()?,
        })
    }
}

fn to_u64(value: i64, column: &str) -> StoreResult<u64> {
    u64::try_from(value).map_err(|_| StoreError::InvalidData(format!("negative {column}: {value}")))
}

fn to_i64(value: u64, column: &str) -> StoreResult<i64> {
    i64::try_from(value).map_err(|_| StoreError::InvalidData(format!("{column} out of range: {value}")))
}

/// Epoch seconds → `2024-01-02T03:04:05Z`.
fn format_timestamp(secs: i64) -> StoreResult<String> {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .ok_or_else(|| StoreError::InvalidData(format!("timestamp out of range: {secs}")))
}

fn parse_timestamp(value: &str) -> StoreResult<i64> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.timestamp())
        .map_err(|e| StoreError::InvalidData(format!("invalid timestamp {value:?}: {e}")))
}
