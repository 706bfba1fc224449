//! Folio Storage Layer
//!
//! SQLite implementation of every persistence seam the core reads or writes:
//! agents, knowledge sources, knowledge chunks, leads and telemetry events.
//!
//! # Concurrency
//!
//! SQLite connections are not shared across threads. Callers keep one
//! `SqliteStore` behind a `Mutex`; every chunk replacement runs inside a single
//! transaction, so a reader holding the lock sees either the old or the new
//! chunk set of a source, never a mix.
//!
//! # Examples
//!
//! ```no_run
//! use folio_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for knowledge, lead and telemetry operations
//! ```

#![warn(missing_docs)]

pub mod embedding;

use embedding::{decode_embedding, encode_embedding};
use folio_domain::traits::{
    AgentDirectory, ChunkStore, LeadStore, SourceCatalog, TelemetryLog,
};
use folio_domain::{
    now_millis, AgentConfig, BehaviorType, KnowledgeChunk, KnowledgeSource, LeadRecord,
    NewChunk, NewLead, Outcome, Persona, RecordId, SourceKind, SourceStatus, StrategyMode,
    TelemetryEvent,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A lead already exists for this session
    #[error("Duplicate lead for session")]
    Duplicate,

    /// Store lock was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// SQLite-based implementation of the persistence traits
pub struct SqliteStore {
    conn: Connection,
}

const CHUNK_COLUMNS: &str = "c.id, c.source_id, c.ordinal, c.text, c.embedding";

const LEAD_COLUMNS: &str = "id, portfolio_id, session_key, name, email, phone, website, \
                            project_details, budget, is_read, created_at";

const AGENT_COLUMNS: &str = "agent_id, portfolio_id, handle, is_enabled, model, behavior_type, \
                             custom_prompt, temperature, strategy_mode, display_name, avatar_url, \
                             intro, role_label";

impl SqliteStore {
    /// Open (or create) a store at the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Insert or update an agent configuration
    ///
    /// Agents are owned by the dashboard; this exists for seeding and tests.
    pub fn upsert_agent(&mut self, agent: &AgentConfig) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO agents (agent_id, portfolio_id, handle, is_enabled, model, behavior_type,
                                 custom_prompt, temperature, strategy_mode, display_name, avatar_url,
                                 intro, role_label)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             ON CONFLICT(agent_id) DO UPDATE SET
                portfolio_id = excluded.portfolio_id, handle = excluded.handle,
                is_enabled = excluded.is_enabled, model = excluded.model,
                behavior_type = excluded.behavior_type, custom_prompt = excluded.custom_prompt,
                temperature = excluded.temperature, strategy_mode = excluded.strategy_mode,
                display_name = excluded.display_name, avatar_url = excluded.avatar_url,
                intro = excluded.intro, role_label = excluded.role_label",
            params![
                &agent.agent_id,
                &agent.portfolio_id,
                agent.handle.trim().to_lowercase(),
                agent.is_enabled,
                &agent.model,
                agent.behavior_type.as_str(),
                &agent.custom_prompt,
                agent.temperature as f64,
                agent.strategy_mode.as_str(),
                &agent.persona.display_name,
                &agent.persona.avatar_url,
                &agent.persona.intro,
                &agent.persona.role_label,
            ],
        )?;
        Ok(())
    }

    /// Register an uploaded knowledge source
    pub fn register_source(&mut self, source: &KnowledgeSource) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO knowledge_sources (id, portfolio_id, kind, location, status, last_error,
                                            chunk_count, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &source.id,
                &source.portfolio_id,
                source.kind.as_str(),
                &source.location,
                source.status.as_str(),
                &source.last_error,
                source.chunk_count as i64,
                now_millis() as i64,
            ],
        )?;
        Ok(())
    }

    /// Delete a source together with its chunks
    pub fn delete_source(&mut self, source_id: &str) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM knowledge_chunks WHERE source_id = ?1", params![source_id])?;
        let removed = tx.execute("DELETE FROM knowledge_sources WHERE id = ?1", params![source_id])?;
        tx.commit()?;

        if removed == 0 {
            return Err(StoreError::NotFound(format!("knowledge source {}", source_id)));
        }
        Ok(())
    }

    /// All leads of a portfolio, newest first
    pub fn list_leads(&self, portfolio_id: &str) -> Result<Vec<LeadRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM leads WHERE portfolio_id = ?1 ORDER BY created_at DESC, id DESC",
            LEAD_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let leads = stmt
            .query_map(params![portfolio_id], row_to_lead)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(leads)
    }

    fn record_id_to_bytes(id: RecordId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    fn bytes_to_record_id(bytes: &[u8]) -> Result<RecordId, StoreError> {
        if bytes.len() != 16 {
            return Err(StoreError::InvalidData(format!(
                "Expected 16 bytes for RecordId, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(RecordId::from_value(u128::from_be_bytes(arr)))
    }

    fn query_chunks(&self, sql: &str, key: &str) -> Result<Vec<KnowledgeChunk>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let chunks = stmt
            .query_map(params![key], row_to_chunk)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(chunks)
    }

    fn query_agent(&self, column: &str, key: &str) -> Result<Option<AgentConfig>, StoreError> {
        let sql = format!("SELECT {} FROM agents WHERE {} = ?1", AGENT_COLUMNS, column);
        let agent = self.conn.query_row(&sql, params![key], row_to_agent).optional()?;
        Ok(agent)
    }
}

/// Wrap a conversion error so it can travel through rusqlite's row mapping
fn conversion_error(column: usize, e: StoreError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
}

fn row_to_chunk(row: &Row<'_>) -> rusqlite::Result<KnowledgeChunk> {
    let id_bytes: Vec<u8> = row.get(0)?;
    let id = SqliteStore::bytes_to_record_id(&id_bytes).map_err(|e| conversion_error(0, e))?;
    let raw_embedding: String = row.get(4)?;
    let embedding = decode_embedding(&raw_embedding).map_err(|e| conversion_error(4, e))?;

    Ok(KnowledgeChunk {
        id,
        source_id: row.get(1)?,
        ordinal: row.get::<_, i64>(2)? as usize,
        text: row.get(3)?,
        embedding,
    })
}

fn row_to_lead(row: &Row<'_>) -> rusqlite::Result<LeadRecord> {
    let id_bytes: Vec<u8> = row.get(0)?;
    let id = SqliteStore::bytes_to_record_id(&id_bytes).map_err(|e| conversion_error(0, e))?;

    Ok(LeadRecord {
        id,
        portfolio_id: row.get(1)?,
        session_key: row.get(2)?,
        name: row.get(3)?,
        email: row.get(4)?,
        phone: row.get(5)?,
        website: row.get(6)?,
        project_details: row.get(7)?,
        budget: row.get(8)?,
        is_read: row.get(9)?,
        created_at: row.get::<_, i64>(10)? as u64,
    })
}

fn row_to_source(row: &Row<'_>) -> rusqlite::Result<KnowledgeSource> {
    let kind_str: String = row.get(2)?;
    let kind = SourceKind::parse(&kind_str).ok_or_else(|| {
        conversion_error(2, StoreError::InvalidData(format!("Unknown source kind: {}", kind_str)))
    })?;
    let status_str: String = row.get(4)?;
    let status = SourceStatus::parse(&status_str).ok_or_else(|| {
        conversion_error(4, StoreError::InvalidData(format!("Unknown source status: {}", status_str)))
    })?;

    Ok(KnowledgeSource {
        id: row.get(0)?,
        portfolio_id: row.get(1)?,
        kind,
        location: row.get(3)?,
        status,
        last_error: row.get(5)?,
        chunk_count: row.get::<_, i64>(6)? as usize,
    })
}

fn row_to_agent(row: &Row<'_>) -> rusqlite::Result<AgentConfig> {
    let behavior_str: String = row.get(5)?;
    let behavior_type = BehaviorType::parse(&behavior_str).ok_or_else(|| {
        conversion_error(5, StoreError::InvalidData(format!("Unknown behavior type: {}", behavior_str)))
    })?;
    let strategy_str: String = row.get(8)?;
    let strategy_mode = StrategyMode::parse(&strategy_str).ok_or_else(|| {
        conversion_error(8, StoreError::InvalidData(format!("Unknown strategy mode: {}", strategy_str)))
    })?;

    Ok(AgentConfig {
        agent_id: row.get(0)?,
        portfolio_id: row.get(1)?,
        handle: row.get(2)?,
        is_enabled: row.get(3)?,
        model: row.get(4)?,
        behavior_type,
        custom_prompt: row.get(6)?,
        temperature: row.get::<_, f64>(7)? as f32,
        strategy_mode,
        persona: Persona {
            display_name: row.get(9)?,
            avatar_url: row.get(10)?,
            intro: row.get(11)?,
            role_label: row.get(12)?,
        },
    })
}

impl ChunkStore for SqliteStore {
    type Error = StoreError;

    fn replace_source_chunks(
        &mut self,
        source_id: &str,
        chunks: Vec<NewChunk>,
    ) -> Result<usize, Self::Error> {
        // Encode everything before opening the transaction so a bad vector
        // cannot leave the source half-replaced.
        let encoded = chunks
            .iter()
            .map(|c| encode_embedding(&c.embedding))
            .collect::<Result<Vec<_>, _>>()?;

        let tx = self.conn.transaction()?;
        let removed = tx.execute(
            "DELETE FROM knowledge_chunks WHERE source_id = ?1",
            params![source_id],
        )?;

        for (chunk, embedding) in chunks.iter().zip(encoded.iter()) {
            tx.execute(
                "INSERT INTO knowledge_chunks (id, source_id, ordinal, text, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    Self::record_id_to_bytes(RecordId::new()),
                    source_id,
                    chunk.ordinal as i64,
                    &chunk.text,
                    embedding,
                ],
            )?;
        }
        tx.commit()?;

        debug!(
            "Replaced chunks for source {}: {} removed, {} inserted",
            source_id,
            removed,
            chunks.len()
        );
        Ok(chunks.len())
    }

    fn source_chunks(&self, source_id: &str) -> Result<Vec<KnowledgeChunk>, Self::Error> {
        let sql = format!(
            "SELECT {} FROM knowledge_chunks c WHERE c.source_id = ?1 ORDER BY c.ordinal, c.seq",
            CHUNK_COLUMNS
        );
        self.query_chunks(&sql, source_id)
    }

    fn portfolio_chunks(&self, portfolio_id: &str) -> Result<Vec<KnowledgeChunk>, Self::Error> {
        let sql = format!(
            "SELECT {} FROM knowledge_chunks c
             JOIN knowledge_sources s ON s.id = c.source_id
             WHERE s.portfolio_id = ?1
             ORDER BY c.seq",
            CHUNK_COLUMNS
        );
        self.query_chunks(&sql, portfolio_id)
    }
}

impl SourceCatalog for SqliteStore {
    type Error = StoreError;

    fn get_source(&self, source_id: &str) -> Result<Option<KnowledgeSource>, Self::Error> {
        let source = self
            .conn
            .query_row(
                "SELECT id, portfolio_id, kind, location, status, last_error, chunk_count
                 FROM knowledge_sources WHERE id = ?1",
                params![source_id],
                row_to_source,
            )
            .optional()?;
        Ok(source)
    }

    fn set_source_status(
        &mut self,
        source_id: &str,
        status: SourceStatus,
        error: Option<&str>,
        chunk_count: Option<usize>,
    ) -> Result<(), Self::Error> {
        let updated = self.conn.execute(
            "UPDATE knowledge_sources
             SET status = ?2, last_error = ?3, chunk_count = COALESCE(?4, chunk_count), updated_at = ?5
             WHERE id = ?1",
            params![
                source_id,
                status.as_str(),
                error,
                chunk_count.map(|c| c as i64),
                now_millis() as i64,
            ],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound(format!("knowledge source {}", source_id)));
        }
        Ok(())
    }
}

impl LeadStore for SqliteStore {
    type Error = StoreError;

    fn create_lead(&mut self, lead: NewLead) -> Result<LeadRecord, Self::Error> {
        let record = LeadRecord {
            id: RecordId::new(),
            portfolio_id: lead.portfolio_id,
            session_key: lead.session_key,
            name: lead.candidate.name,
            email: lead.candidate.channels.email,
            phone: lead.candidate.channels.phone,
            website: lead.candidate.channels.website,
            project_details: lead.candidate.project_details,
            budget: lead.candidate.budget,
            is_read: false,
            created_at: now_millis(),
        };

        let result = self.conn.execute(
            "INSERT INTO leads (id, portfolio_id, session_key, name, email, phone, website,
                                project_details, budget, is_read, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                Self::record_id_to_bytes(record.id),
                &record.portfolio_id,
                &record.session_key,
                &record.name,
                &record.email,
                &record.phone,
                &record.website,
                &record.project_details,
                &record.budget,
                record.is_read,
                record.created_at as i64,
            ],
        );

        match result {
            Ok(_) => Ok(record),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Duplicate)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn find_lead_by_session(
        &self,
        portfolio_id: &str,
        session_key: &str,
    ) -> Result<Option<LeadRecord>, Self::Error> {
        let sql = format!(
            "SELECT {} FROM leads WHERE portfolio_id = ?1 AND session_key = ?2",
            LEAD_COLUMNS
        );
        let lead = self
            .conn
            .query_row(&sql, params![portfolio_id, session_key], row_to_lead)
            .optional()?;
        Ok(lead)
    }
}

impl TelemetryLog for SqliteStore {
    type Error = StoreError;

    fn record_event(&mut self, event: &TelemetryEvent) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT INTO telemetry_events (timestamp, outcome, model_id, portfolio_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                event.timestamp as i64,
                event.outcome.as_str(),
                &event.model_id,
                &event.portfolio_id,
            ],
        )?;
        Ok(())
    }

    fn events_since(&self, since: u64) -> Result<Vec<TelemetryEvent>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT timestamp, outcome, model_id, portfolio_id
             FROM telemetry_events WHERE timestamp >= ?1
             ORDER BY timestamp, seq",
        )?;

        let events = stmt
            .query_map(params![since as i64], |row| {
                let outcome_str: String = row.get(1)?;
                let outcome = Outcome::parse(&outcome_str).ok_or_else(|| {
                    conversion_error(
                        1,
                        StoreError::InvalidData(format!("Unknown outcome: {}", outcome_str)),
                    )
                })?;
                Ok(TelemetryEvent {
                    timestamp: row.get::<_, i64>(0)? as u64,
                    outcome,
                    model_id: row.get(2)?,
                    portfolio_id: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(events)
    }
}

impl AgentDirectory for SqliteStore {
    type Error = StoreError;

    fn find_agent_by_id(&self, agent_id: &str) -> Result<Option<AgentConfig>, Self::Error> {
        self.query_agent("agent_id", agent_id)
    }

    fn find_agent_by_handle(&self, handle: &str) -> Result<Option<AgentConfig>, Self::Error> {
        self.query_agent("handle", &handle.trim().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_bytes_round_trip() {
        let id = RecordId::new();
        let bytes = SqliteStore::record_id_to_bytes(id);
        assert_eq!(SqliteStore::bytes_to_record_id(&bytes).unwrap(), id);
    }

    #[test]
    fn test_record_id_bad_length() {
        assert!(SqliteStore::bytes_to_record_id(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_schema_initializes_twice() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        assert!(store.initialize_schema().is_ok());
    }
}
