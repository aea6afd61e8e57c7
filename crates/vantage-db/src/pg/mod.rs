//! PostgreSQL repository implementations

mod business;
mod fact;
mod user;

pub use business::PgBusinessRepository;
pub use fact::PgFactRepository;
pub use user::PgUserRepository;

use sqlx::PgPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub users: PgUserRepository,
    pub businesses: PgBusinessRepository,
    pub facts: PgFactRepository,
}

impl Repositories {
    /// Create all repositories sharing one pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            businesses: PgBusinessRepository::new(pool.clone()),
            facts: PgFactRepository::new(pool),
        }
    }
}
