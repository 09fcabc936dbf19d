use crate::models::{Card, CardFilter, CardPayload};
use crate::repository::CardRepository;
use database::{RepositoryError, Database};
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Database error: {0}")]
    Infrastructure(String),
    #[error("Card not found")]
    NotFound,
    #[error("Card name already exists: {0}")]
    DuplicateName(String),
}

impl From<RepositoryError> for CardError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => CardError::NotFound,
            RepositoryError::UniqueViolation(msg) => CardError::DuplicateName(msg),
            RepositoryError::CheckViolation(msg) => CardError::InvalidInput(msg),
            RepositoryError::Infrastructure(e) => CardError::Infrastructure(e.to_string()),
        }
    }
}

pub struct CardService;

impl CardService {
    #[instrument(skip(db))]
    pub async fn create_card(db: &Database, payload: CardPayload) -> Result<Card, CardError> {
        let req = payload.normalize().map_err(CardError::InvalidInput)?;

        let mut uow = db.begin().await?;
        let mut repo = CardRepository::new(uow.connection());

        let id = repo.create(&req).await?;
        let card = repo.find_by_id(id).await?.ok_or(CardError::NotFound)?;

        uow.commit().await?;

        tracing::info!(card_id = card.id, "Card created");
        Ok(card)
    }

    #[instrument(skip(db))]
    pub async fn list_cards(db: &Database, filter: &CardFilter) -> Result<Vec<Card>, CardError> {
        let mut uow = db.begin().await?;
        let mut repo = CardRepository::new(uow.connection());

        let cards = repo.list(filter).await?;
        Ok(cards)
    }

    #[instrument(skip(db))]
    pub async fn get_card(db: &Database, id: i64) -> Result<Card, CardError> {
        let mut uow = db.begin().await?;
        let mut repo = CardRepository::new(uow.connection());

        repo.find_by_id(id).await?.ok_or(CardError::NotFound)
    }

    /// Replaces every field of card `id` with `payload`. The id itself never changes.
    #[instrument(skip(db))]
    pub async fn update_card(db: &Database, id: i64, payload: CardPayload) -> Result<Card, CardError> {
        let req = payload.normalize().map_err(CardError::InvalidInput)?;

        let mut uow = db.begin().await?;
        let mut repo = CardRepository::new(uow.connection());

        repo.update(id, &req).await?;
        let card = repo.find_by_id(id).await?.ok_or(CardError::NotFound)?;

        uow.commit().await?;
        Ok(card)
    }

    #[instrument(skip(db))]
    pub async fn delete_card(db: &Database, id: i64) -> Result<(), CardError> {
        let mut uow = db.begin().await?;
        let mut repo = CardRepository::new(uow.connection());

        repo.delete(id).await?;

        uow.commit().await?;
        tracing::info!(card_id = id, "Card deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rarity;
    use database::get_test_db;

    fn knight() -> CardPayload {
        CardPayload {
            name: "Knight".to_string(),
            rarity: Rarity::Common,
            card_type: "Troop".to_string(),
            description: "A tough melee fighter.".to_string(),
            arena: "Training Camp".to_string(),
            elixir_cost: 3,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_round_trip() {
        let db = get_test_db().await;

        let created = CardService::create_card(&db, knight()).await.unwrap();
        let fetched = CardService::get_card(&db, created.id).await.unwrap();

        assert_eq!(created, fetched);
        assert_eq!(fetched.name, "Knight");
        assert_eq!(fetched.elixir_cost, 3);
    }

    #[tokio::test]
    async fn test_create_duplicate_is_reported() {
        let db = get_test_db().await;

        CardService::create_card(&db, knight()).await.unwrap();
        let result = CardService::create_card(&db, knight()).await;

        assert!(matches!(result, Err(CardError::DuplicateName(_))));
        let all = CardService::list_cards(&db, &CardFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_create_validation_failure() {
        let db = get_test_db().await;
        let mut payload = knight();
        payload.name = "  ".to_string();

        let result = CardService::create_card(&db, payload).await;
        assert!(matches!(result, Err(CardError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_update_replaces_fields_keeps_id() {
        let db = get_test_db().await;
        let created = CardService::create_card(&db, knight()).await.unwrap();

        let mut replacement = knight();
        replacement.name = "New Name".to_string();
        let updated = CardService::update_card(&db, created.id, replacement).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.rarity, created.rarity);
        assert_eq!(updated.card_type, created.card_type);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.arena, created.arena);
        assert_eq!(updated.elixir_cost, created.elixir_cost);
    }

    #[tokio::test]
    async fn test_update_to_existing_name() {
        let db = get_test_db().await;
        CardService::create_card(&db, knight()).await.unwrap();
        let mut archers = knight();
        archers.name = "Archers".to_string();
        let archers = CardService::create_card(&db, archers).await.unwrap();

        let result = CardService::update_card(&db, archers.id, knight()).await;
        assert!(matches!(result, Err(CardError::DuplicateName(_))));
    }

    #[tokio::test]
    async fn test_missing_card_not_found() {
        let db = get_test_db().await;

        assert!(matches!(CardService::get_card(&db, 42).await, Err(CardError::NotFound)));
        assert!(matches!(CardService::update_card(&db, 42, knight()).await, Err(CardError::NotFound)));
        assert!(matches!(CardService::delete_card(&db, 42).await, Err(CardError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let db = get_test_db().await;
        let created = CardService::create_card(&db, knight()).await.unwrap();

        CardService::delete_card(&db, created.id).await.unwrap();
        assert!(matches!(CardService::delete_card(&db, created.id).await, Err(CardError::NotFound)));
        assert!(matches!(CardService::get_card(&db, created.id).await, Err(CardError::NotFound)));
    }
}
