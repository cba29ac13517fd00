use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryHintRepo {
    hints: Mutex<Vec<Hint>>,
}

impl MemoryHintRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl HintRepo for MemoryHintRepo {
    async fn find_in_window(&self, window: &HintWindow) -> Result<Vec<Hint>, StoreError> {
        let hints = self
            .hints
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(hints
            .iter()
            .filter(|h| window.contains(h.pos_x, h.pos_y))
            .cloned()
            .collect())
    }

    async fn insert_many(&self, new_hints: &[NewHint]) -> Result<u64, StoreError> {
        let mut hints = self
            .hints
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let mut next_id = hints.iter().map(|h| h.id).max().unwrap_or(0);
        for hint in new_hints {
            next_id += 1;
            hints.push(Hint {
                id: next_id,
                pos_x: hint.pos_x,
                pos_y: hint.pos_y,
                hint_en: hint.hint_en.clone(),
                hint_fr: hint.hint_fr.clone(),
                hint_es: hint.hint_es.clone(),
                hint_de: hint.hint_de.clone(),
                hint_pt: hint.hint_pt.clone(),
            });
        }
        Ok(new_hints.len() as u64)
    }
}
