use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Champion,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    pub rarity: Rarity,
    #[serde(rename = "type")]
    pub card_type: String,
    pub description: String,
    pub arena: String,
    pub elixir_cost: i64,
}

/// Body of create and update requests. Updates replace every field, so
/// there are no optional members. Unknown keys (an echoed `_id`, say) are ignored.
#[derive(Debug, Serialize, Deserialize, Validate, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CardPayload {
    #[validate(length(min = 1, message = "Card name cannot be empty"))]
    pub name: String,
    pub rarity: Rarity,
    #[serde(rename = "type")]
    pub card_type: String,
    pub description: String,
    pub arena: String,
    pub elixir_cost: i64,
}

impl CardPayload {
    /// Trims the name and checks field constraints.
    pub fn normalize(mut self) -> Result<Self, String> {
        self.name = self.name.trim().to_string();
        self.validate().map_err(|e| e.to_string())?;
        Ok(self)
    }
}

/// Exact-match filters for listing. Set fields are AND-ed together.
/// Keys naming no card field are rejected rather than silently dropped.
#[derive(Debug, Default, Deserialize, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CardFilter {
    pub name: Option<String>,
    pub rarity: Option<Rarity>,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    pub description: Option<String>,
    pub arena: Option<String>,
    pub elixir_cost: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

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

    #[test]
    fn test_payload_wire_names() {
        let payload: CardPayload = serde_json::from_value(json!({
            "name": "Knight",
            "rarity": "Common",
            "type": "Troop",
            "description": "A tough melee fighter.",
            "arena": "Training Camp",
            "elixirCost": 3,
            "_id": "ignored"
        }))
        .unwrap();
        assert_eq!(payload, knight());
    }

    #[test]
    fn test_card_serializes_camel_case() {
        let card = Card {
            id: 7,
            name: "Knight".to_string(),
            rarity: Rarity::Common,
            card_type: "Troop".to_string(),
            description: String::new(),
            arena: "Training Camp".to_string(),
            elixir_cost: 3,
        };
        let value = serde_json::to_value(&card).unwrap();
        assert_eq!(value["_id"], 7);
        assert!(value.get("id").is_none());
        assert_eq!(value["type"], "Troop");
        assert_eq!(value["elixirCost"], 3);
        assert_eq!(value["rarity"], "Common");
    }

    #[test]
    fn test_unknown_rarity_rejected() {
        let result = serde_json::from_value::<Rarity>(json!("Mythic"));
        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_trims_name() {
        let mut payload = knight();
        payload.name = "  Knight  ".to_string();
        assert_eq!(payload.normalize().unwrap().name, "Knight");
    }

    #[test]
    fn test_normalize_rejects_blank_name() {
        let mut payload = knight();
        payload.name = "   ".to_string();
        assert!(payload.normalize().is_err());
    }

    #[test]
    fn test_normalize_accepts_any_elixir_cost_and_long_names() {
        let mut payload = knight();
        payload.elixir_cost = 12;
        payload.name = "K".repeat(65);
        let normalized = payload.normalize().unwrap();
        assert_eq!(normalized.elixir_cost, 12);
        assert_eq!(normalized.name.len(), 65);
    }

    #[test]
    fn test_filter_rejects_unknown_keys() {
        let result = serde_json::from_value::<CardFilter>(json!({ "raity": "Rare" }));
        assert!(result.is_err());

        let filter: CardFilter = serde_json::from_value(json!({ "description": "Slow but durable" })).unwrap();
        assert_eq!(filter.description.as_deref(), Some("Slow but durable"));
    }
}
