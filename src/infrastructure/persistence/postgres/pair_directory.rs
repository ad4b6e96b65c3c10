//! # PostgreSQL Pair Directory
//!
//! PostgreSQL implementation of [`PairResolver`] over the `crypto_pairs`
//! table, where base and quote are stored as separate columns.

use crate::domain::entities::TradingPair;
use crate::domain::value_objects::{PairId, Symbol};
use crate::infrastructure::persistence::traits::{PairResolver, RepositoryError, RepositoryResult};
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgreSQL implementation of [`PairResolver`].
#[derive(Debug, Clone)]
pub struct PostgresPairDirectory {
    pool: PgPool,
}

impl PostgresPairDirectory {
    /// Creates a directory over an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists a pair, returning its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Query` if the insert fails, for example
    /// because a symbol is not registered.
    pub async fn list(&self, base: &Symbol, quote: &Symbol) -> RepositoryResult<PairId> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO crypto_pairs (pair_name, base_symbol, quote_symbol)
            VALUES ($1 || $2, $1, $2)
            RETURNING id
            "#,
        )
        .bind(base.as_str())
        .bind(quote.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::query(e.to_string()))?;
        Ok(PairId::new(id))
    }
}

#[async_trait]
impl PairResolver for PostgresPairDirectory {
    async fn find_by_name(&self, pair_name: &str) -> RepositoryResult<Option<TradingPair>> {
        let row: Option<PairRow> = sqlx::query_as(
            r#"
            SELECT id, pair_name, base_symbol, quote_symbol
            FROM crypto_pairs
            WHERE pair_name = $1
            "#,
        )
        .bind(pair_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::query(e.to_string()))?;

        row.map(PairRow::try_into_pair).transpose()
    }
}

/// Row type for pair queries.
#[derive(Debug, sqlx::FromRow)]
struct PairRow {
    id: i64,
    pair_name: String,
    base_symbol: String,
    quote_symbol: String,
}

impl PairRow {
    fn try_into_pair(self) -> RepositoryResult<TradingPair> {
        let base = Symbol::new(&self.base_symbol)
            .map_err(|e| RepositoryError::internal(format!("{}: {e}", self.pair_name)))?;
        let quote = Symbol::new(&self.quote_symbol)
            .map_err(|e| RepositoryError::internal(format!("{}: {e}", self.pair_name)))?;
        Ok(TradingPair::from_parts(
            PairId::new(self.id),
            self.pair_name,
            base,
            quote,
        ))
    }
}
