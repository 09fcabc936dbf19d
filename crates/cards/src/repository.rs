use crate::models::{Card, CardFilter, CardPayload, Rarity};
use database::{self, RepositoryError};
use sqlx::{FromRow, QueryBuilder};

const CARD_COLUMNS: &str = "id, name, rarity, card_type, description, arena, elixir_cost";

#[derive(FromRow)]
struct CardRecord {
    id: i64,
    name: String,
    rarity: Rarity,
    card_type: String,
    description: String,
    arena: String,
    elixir_cost: i64,
}

impl From<CardRecord> for Card {
    fn from(record: CardRecord) -> Self {
        Card {
            id: record.id,
            name: record.name,
            rarity: record.rarity,
            card_type: record.card_type,
            description: record.description,
            arena: record.arena,
            elixir_cost: record.elixir_cost,
        }
    }
}

pub(crate) struct CardRepository<'a> {
    conn: &'a mut database::Connection,
}

impl<'a> CardRepository<'a> {
    pub fn new(conn: &'a mut database::Connection) -> Self {
        Self { conn }
    }

    pub async fn create(&mut self, req: &CardPayload) -> Result<i64, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO cards (name, rarity, card_type, description, arena, elixir_cost) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(&req.name)
        .bind(req.rarity)
        .bind(&req.card_type)
        .bind(&req.description)
        .bind(&req.arena)
        .bind(req.elixir_cost)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(id)
    }

    pub async fn list(&mut self, filter: &CardFilter) -> Result<Vec<Card>, RepositoryError> {
        let mut query = QueryBuilder::<database::Driver>::new(format!(
            "SELECT {} FROM cards WHERE 1 = 1",
            CARD_COLUMNS
        ));

        if let Some(name) = &filter.name {
            query.push(" AND name = ").push_bind(name.clone());
        }
        if let Some(rarity) = filter.rarity {
            query.push(" AND rarity = ").push_bind(rarity);
        }
        if let Some(card_type) = &filter.card_type {
            query.push(" AND card_type = ").push_bind(card_type.clone());
        }
        if let Some(description) = &filter.description {
            query.push(" AND description = ").push_bind(description.clone());
        }
        if let Some(arena) = &filter.arena {
            query.push(" AND arena = ").push_bind(arena.clone());
        }
        if let Some(elixir_cost) = filter.elixir_cost {
            query.push(" AND elixir_cost = ").push_bind(elixir_cost);
        }
        query.push(" ORDER BY id");

        let records = query
            .build_query_as::<CardRecord>()
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(records.into_iter().map(|r| r.into()).collect())
    }

    pub async fn find_by_id(&mut self, id: i64) -> Result<Option<Card>, RepositoryError> {
        let record = sqlx::query_as::<_, CardRecord>(&format!(
            "SELECT {} FROM cards WHERE id = $1",
            CARD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(record.map(|r| r.into()))
    }

    pub async fn update(&mut self, id: i64, req: &CardPayload) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE cards SET name = $1, rarity = $2, card_type = $3, description = $4, \
             arena = $5, elixir_cost = $6 WHERE id = $7",
        )
        .bind(&req.name)
        .bind(req.rarity)
        .bind(&req.card_type)
        .bind(&req.description)
        .bind(&req.arena)
        .bind(req.elixir_cost)
        .bind(id)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    pub async fn delete(&mut self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
