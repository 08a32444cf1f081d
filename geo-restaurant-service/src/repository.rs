//! Restaurant persistence contract and its PostgreSQL implementation.
//!
//! Methods are blocking; async callers run them on the blocking pool.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use tracing::debug;

use crate::models::{NewRestaurant, Restaurant, RestaurantChangeset};
use crate::schema::restaurants;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Database connection unavailable: {0}")]
    Pool(String),
    #[error("Database query failed: {0}")]
    Query(#[from] diesel::result::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

pub trait RestaurantRepository: Send + Sync {
    /// Lists every restaurant ordered by id.
    fn list(&self) -> RepoResult<Vec<Restaurant>>;
    fn get(&self, id: i64) -> RepoResult<Option<Restaurant>>;
    fn create(&self, restaurant: &NewRestaurant) -> RepoResult<Restaurant>;
    /// Applies `changes` and returns the updated row, or `None` when `id` does
    /// not exist.
    fn update(&self, id: i64, changes: &RestaurantChangeset) -> RepoResult<Option<Restaurant>>;
    /// Returns whether a row was deleted.
    fn delete(&self, id: i64) -> RepoResult<bool>;
}

pub fn build_pool(database_url: &str, max_size: u32) -> RepoResult<PgPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(|e| RepoError::Pool(e.to_string()))
}

#[derive(Clone)]
pub struct PgRestaurantRepository {
    pool: PgPool,
}

impl PgRestaurantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepoResult<PooledConnection<ConnectionManager<PgConnection>>> {
        self.pool.get().map_err(|e| RepoError::Pool(e.to_string()))
    }
}

impl RestaurantRepository for PgRestaurantRepository {
    fn list(&self) -> RepoResult<Vec<Restaurant>> {
        use crate::schema::restaurants::dsl::*;

        let conn = &mut self.conn()?;
        let results = restaurants
            .order(id.asc())
            .select(Restaurant::as_select())
            .load(conn)?;
        Ok(results)
    }

    fn get(&self, restaurant_id: i64) -> RepoResult<Option<Restaurant>> {
        use crate::schema::restaurants::dsl::*;

        let conn = &mut self.conn()?;
        let result = restaurants
            .find(restaurant_id)
            .select(Restaurant::as_select())
            .first(conn)
            .optional()?;
        Ok(result)
    }

    fn create(&self, restaurant: &NewRestaurant) -> RepoResult<Restaurant> {
        let conn = &mut self.conn()?;
        let created = diesel::insert_into(restaurants::table)
            .values(restaurant)
            .returning(Restaurant::as_returning())
            .get_result(conn)?;
        debug!(id = created.id, "restaurant inserted");
        Ok(created)
    }

    fn update(&self, restaurant_id: i64, changes: &RestaurantChangeset) -> RepoResult<Option<Restaurant>> {
        if changes.is_empty() {
            return self.get(restaurant_id);
        }

        let conn = &mut self.conn()?;
        let updated = diesel::update(restaurants::table.find(restaurant_id))
            .set(changes)
            .returning(Restaurant::as_returning())
            .get_result(conn)
            .optional()?;
        Ok(updated)
    }

    fn delete(&self, restaurant_id: i64) -> RepoResult<bool> {
        let conn = &mut self.conn()?;
        let deleted = diesel::delete(restaurants::table.find(restaurant_id)).execute(conn)?;
        Ok(deleted > 0)
    }
}
