use crate::application_port::{HintError, HintService};
use crate::domain_model::*;
use crate::domain_port::HintRepo;
use crate::logger::*;
use std::sync::Arc;

pub struct RealHintService {
    repo: Arc<dyn HintRepo>,
}

impl RealHintService {
    pub fn new(repo: Arc<dyn HintRepo>) -> Self {
        Self { repo }
    }
}

#[async_trait::async_trait]
impl HintService for RealHintService {
    async fn hints(&self, x: i32, y: i32, direction: Direction) -> Result<Vec<Hint>, HintError> {
        let window = direction.window(x, y, HINT_REACH);
        let mut hints = self.repo.find_in_window(&window).await?;
        // nearest first
        hints.sort_by_key(|h| distance((h.pos_x, h.pos_y), (x, y)));
        debug!(x, y, ?direction, found = hints.len(), "hint lookup");
        Ok(hints)
    }

    async fn import(&self, hints: Vec<NewHint>) -> Result<u64, HintError> {
        let count = self.repo.insert_many(&hints).await?;
        info!(count, "hints imported");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::MemoryHintRepo;

    fn at(x: i32, y: i32) -> NewHint {
        NewHint {
            pos_x: x,
            pos_y: y,
            hint_en: format!("{x},{y}"),
            ..NewHint::default()
        }
    }

    #[tokio::test]
    async fn only_hints_ahead_on_the_same_line_within_reach() {
        let service = RealHintService::new(Arc::new(MemoryHintRepo::new()));
        service
            .import(vec![
                at(5, 5),  // origin
                at(8, 5),  // right, 3 away
                at(6, 5),  // right, 1 away
                at(15, 5), // right, exactly 10 away
                at(16, 5), // right, too far
                at(7, 6),  // off the row
                at(2, 5),  // left
                at(5, 0),  // up
            ])
            .await
            .unwrap();

        let right = service.hints(5, 5, Direction::Right).await.unwrap();
        let xs: Vec<i32> = right.iter().map(|h| h.pos_x).collect();
        assert_eq!(xs, vec![6, 8, 15]);

        let up = service.hints(5, 5, Direction::Up).await.unwrap();
        assert_eq!(up.len(), 1);
        assert_eq!(up[0].hint_en, "5,0");

        assert!(service.hints(5, 5, Direction::Down).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn lookups_at_the_grid_edge_do_not_overflow() {
        let service = RealHintService::new(Arc::new(MemoryHintRepo::new()));
        service
            .import(vec![at(i32::MAX, 0), at(i32::MAX - 1, 0), at(i32::MIN, 0)])
            .await
            .unwrap();

        assert!(service.hints(i32::MAX, 0, Direction::Right).await.unwrap().is_empty());

        let left = service.hints(i32::MAX, 0, Direction::Left).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].pos_x, i32::MAX - 1);

        let right = service.hints(i32::MIN, 0, Direction::Right).await.unwrap();
        assert!(right.is_empty());
        assert!(service.hints(i32::MIN, 0, Direction::Left).await.unwrap().is_empty());
    }
}
