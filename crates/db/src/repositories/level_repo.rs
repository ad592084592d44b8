//! Repository for the `levels` table.

use encore_core::levels::{sort_brackets, Level};

use crate::error::StoreError;
use crate::models::decode_all;
use crate::models::level::LevelRow;
use crate::query::{Direction, Entity, Query};
use crate::store::DataStore;

pub struct LevelRepo;

impl LevelRepo {
    /// Every level bracket, ascending by `minPoints`.
    pub async fn list_ordered(store: &dyn DataStore) -> Result<Vec<Level>, StoreError> {
        let query = Query::new(Entity::Levels).order_by("minPoints", Direction::Asc);
        let rows = store.fetch_where(&query).await?;
        let mut levels: Vec<Level> = decode_all::<LevelRow>(Entity::Levels, rows)?
            .into_iter()
            .map(Level::from)
            .collect();
        // Coerced bounds can disagree with the backend's ordering.
        sort_brackets(&mut levels);
        Ok(levels)
    }
}
