// Static model catalog served by the listing endpoint
// Author: kelexine (https://github.com/kelexine)

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// One entry in the OpenAI-compatible model listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelEntry {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
    pub model_name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelList {
    pub object: String,
    pub data: Vec<ModelEntry>,
}

/// Lazily initialized catalog using OnceLock (zero-cost, panic-free)
static MODEL_LIST: OnceLock<ModelList> = OnceLock::new();

/// The fixed catalog the proxy advertises. Loaded once, never mutated,
/// shared read-only across requests.
pub fn listing() -> &'static ModelList {
    MODEL_LIST.get_or_init(|| ModelList {
        object: "list".to_string(),
        data: vec![
            entry("openai/gpt-oss-120b", "openai", "OpenAI GPT OSS 120B"),
            entry("moonshotai/Kimi-K2-Instruct", "moonshotai", "Kimi K2"),
            entry("zai-org/GLM-4.5", "zai-org", "GLM 4.5"),
            entry(
                "Qwen/Qwen3-Coder-480B-A35B-Instruct-Turbo",
                "Qwen",
                "Qwen3 Coder Turbo",
            ),
            entry(
                "deepseek-ai/DeepSeek-R1-0528-Turbo",
                "deepseek-ai",
                "DeepSeek R1 0528 Turbo",
            ),
            entry(
                "deepseek-ai/DeepSeek-V3-0324-Turbo",
                "deepseek-ai",
                "DeepSeek V3 0324 Turbo",
            ),
            entry(
                "meta-llama/Llama-4-Maverick-17B-128E-Instruct-Turbo",
                "meta-llama",
                "Llama 4 Maverick Turbo",
            ),
        ],
    })
}

fn entry(id: &str, owned_by: &str, display_name: &str) -> ModelEntry {
    ModelEntry {
        id: id.to_string(),
        object: "model".to_string(),
        created: 1_700_000_000,
        owned_by: owned_by.to_string(),
        model_name: id.to_string(),
        display_name: display_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_has_the_fixed_catalog() {
        let list = listing();
        assert_eq!(list.object, "list");
        assert_eq!(list.data.len(), 7);

        let ids: Vec<&str> = list.data.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "openai/gpt-oss-120b",
                "moonshotai/Kimi-K2-Instruct",
                "zai-org/GLM-4.5",
                "Qwen/Qwen3-Coder-480B-A35B-Instruct-Turbo",
                "deepseek-ai/DeepSeek-R1-0528-Turbo",
                "deepseek-ai/DeepSeek-V3-0324-Turbo",
                "meta-llama/Llama-4-Maverick-17B-128E-Instruct-Turbo",
            ]
        );
    }

    #[test]
    fn test_entries_share_the_listing_shape() {
        for model in &listing().data {
            assert_eq!(model.object, "model");
            assert_eq!(model.created, 1_700_000_000);
            assert_eq!(model.model_name, model.id);
            assert!(!model.display_name.is_empty());
        }
    }

    #[test]
    fn test_listing_is_idempotent() {
        assert_eq!(listing(), listing());
        let first = serde_json::to_string(listing()).unwrap();
        let second = serde_json::to_string(listing()).unwrap();
        assert_eq!(first, second);
    }
}
